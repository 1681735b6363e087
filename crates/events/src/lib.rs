//! Price-change notifications and the pub/sub mechanics that carry them.
//!
//! The override store is owned by an external collaborator; when it changes,
//! the engine is told through a [`PriceEvent`] published on an [`EventBus`] and
//! re-resolves the affected lines.

pub mod bus;
pub mod event;
pub mod in_memory_bus;
pub mod price;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
pub use price::{OverrideChanged, PriceEvent};
