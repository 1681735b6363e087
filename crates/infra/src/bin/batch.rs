//! Quote a batch of requests from a JSON file (or stdin) and print the
//! priced cart, merged material list and totals as JSON.

use std::io::Read;
use std::sync::Arc;

use anyhow::Context;

use rackquote_engine::{QuoteEngine, QuoteRequest};
use rackquote_events::{InMemoryEventBus, PriceEvent};
use rackquote_infra::{EngineConfig, FileOverrideRepository, load_catalog, run_batch};

fn main() -> anyhow::Result<()> {
    rackquote_observability::init();

    let config = EngineConfig::load()?;
    let catalog = load_catalog(&config.catalog_dir)?;
    let overrides = FileOverrideRepository::open(&config.override_store_path)?;
    let bus: Arc<InMemoryEventBus<PriceEvent>> = Arc::new(InMemoryEventBus::new());
    let engine = QuoteEngine::with_settings(catalog, overrides, bus, config.engine_settings());

    let input = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
            buf
        }
    };
    let requests: Vec<QuoteRequest> = serde_json::from_str(&input).context("parsing quote requests")?;

    let report = run_batch(&engine, requests)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
