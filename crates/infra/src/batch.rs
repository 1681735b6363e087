//! Batch quoting: a list of requests in, priced cart and merged BOM out.

use serde::Serialize;

use rackquote_bom::{BomLine, Cart, CartEntry};
use rackquote_core::DomainResult;
use rackquote_engine::{CartTotals, QuoteEngine, QuoteRequest};
use rackquote_events::{EventBus, PriceEvent};
use rackquote_pricing::OverrideRepository;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub items: Vec<CartEntry>,
    /// Merged, sorted material list across all items.
    pub materials: Vec<BomLine>,
    pub totals: CartTotals,
}

/// Quote every request into one cart. Requests that cannot be priced are
/// skipped with a warning; other errors abort the batch.
pub fn run_batch<R, B>(engine: &QuoteEngine<R, B>, requests: Vec<QuoteRequest>) -> DomainResult<BatchReport>
where
    R: OverrideRepository,
    B: EventBus<PriceEvent>,
{
    let mut cart = Cart::new();
    for (index, request) in requests.into_iter().enumerate() {
        if request.quantity == 0 {
            tracing::warn!(index, family = %request.family, "zero quantity request skipped");
            continue;
        }
        engine.add_to_cart(&mut cart, request)?;
    }

    let totals = engine.cart_totals(&cart);
    let materials = engine.aggregate(&cart).into_lines();
    tracing::info!(items = cart.len(), materials = materials.len(), subtotal = totals.subtotal, "batch quoted");

    Ok(BatchReport {
        items: cart.entries().to_vec(),
        materials,
        totals,
    })
}
