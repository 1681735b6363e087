//! Price override notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rackquote_core::{Amount, PartId};

use crate::event::Event;

/// Event: an administrator override was set, changed or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideChanged {
    pub part_id: PartId,
    /// Effective price before the change.
    pub old_price: Amount,
    /// New override price; 0 means the override was removed.
    pub new_price: Amount,
    pub actor: String,
    /// Store revision after the write (0 once removed).
    pub revision: u64,
    pub occurred_at: DateTime<Utc>,
}

impl OverrideChanged {
    pub fn is_removal(&self) -> bool {
        self.new_price == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceEvent {
    OverrideChanged(OverrideChanged),
    /// The whole override set was replaced (restore from backup, bulk import).
    OverridesReloaded { occurred_at: DateTime<Utc> },
}

impl PriceEvent {
    /// Whether a line keyed by `part_id` must be re-resolved.
    pub fn affects(&self, part_id: &PartId) -> bool {
        match self {
            PriceEvent::OverrideChanged(e) => &e.part_id == part_id,
            PriceEvent::OverridesReloaded { .. } => true,
        }
    }
}

impl Event for PriceEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PriceEvent::OverrideChanged(_) => "pricing.override.changed",
            PriceEvent::OverridesReloaded { .. } => "pricing.override.reloaded",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            PriceEvent::OverrideChanged(e) => e.occurred_at,
            PriceEvent::OverridesReloaded { occurred_at } => *occurred_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rackquote_core::RackFamily;

    fn changed(part_id: PartId, new_price: Amount) -> PriceEvent {
        PriceEvent::OverrideChanged(OverrideChanged {
            part_id,
            old_price: 1000,
            new_price,
            actor: "admin".to_string(),
            revision: 1,
            occurred_at: Utc::now(),
        })
    }

    #[test]
    fn override_change_affects_only_its_part() {
        let post = PartId::new(RackFamily::Pallet, "Post(H4500)", "Height H4500");
        let beam = PartId::new(RackFamily::Pallet, "Load Beam(2080)", "2080");
        let event = changed(post.clone(), 1200);

        assert!(event.affects(&post));
        assert!(!event.affects(&beam));
        assert_eq!(event.event_type(), "pricing.override.changed");
    }

    #[test]
    fn reload_affects_everything() {
        let event = PriceEvent::OverridesReloaded { occurred_at: Utc::now() };
        assert!(event.affects(&PartId::from_raw("anything")));
    }

    #[test]
    fn zero_price_marks_removal() {
        let PriceEvent::OverrideChanged(e) = changed(PartId::from_raw("x"), 0) else {
            panic!("expected OverrideChanged");
        };
        assert!(e.is_removal());
    }
}
