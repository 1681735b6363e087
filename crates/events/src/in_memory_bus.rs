//! Single-process price event bus.
//!
//! Every subscription gets its own channel; a publish clones the event into
//! each live channel and forgets channels whose receiver is gone.

use std::sync::{Mutex, mpsc};

use thiserror::Error;
use tracing::debug;

use crate::bus::{EventBus, Subscription};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InMemoryBusError {
    #[error("event bus subscriber list poisoned")]
    Poisoned,
}

#[derive(Debug)]
pub struct InMemoryEventBus<M> {
    subscribers: Mutex<Vec<mpsc::Sender<M>>>,
}

impl<M> InMemoryEventBus<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscriptions that were alive at the last publish, plus any added since.
    pub fn subscriber_count(&self) -> Result<usize, InMemoryBusError> {
        let subs = self.subscribers.lock().map_err(|_| InMemoryBusError::Poisoned)?;
        Ok(subs.len())
    }
}

impl<M> Default for InMemoryEventBus<M> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

impl<M> EventBus<M> for InMemoryEventBus<M>
where
    M: Clone + Send + 'static,
{
    type Error = InMemoryBusError;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        let mut subs = self.subscribers.lock().map_err(|_| InMemoryBusError::Poisoned)?;
        let before = subs.len();
        subs.retain(|tx| tx.send(message.clone()).is_ok());
        debug!(delivered = subs.len(), dropped = before - subs.len(), "price event published");
        Ok(())
    }

    fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();
        // The sender list stays valid across a poisoning panic.
        let mut subs = self.subscribers.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        subs.push(tx);
        Subscription::new(rx)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn every_subscriber_receives_each_message() {
        let bus = InMemoryEventBus::<u32>::new();
        let a = bus.subscribe();
        let b = bus.subscribe();

        bus.publish(7).unwrap();

        assert_eq!(a.try_recv().unwrap(), 7);
        assert_eq!(b.try_recv().unwrap(), 7);
    }

    #[test]
    fn dropped_subscribers_are_pruned_on_publish() {
        let bus = InMemoryEventBus::<u32>::new();
        let kept = bus.subscribe();
        drop(bus.subscribe());
        assert_eq!(bus.subscriber_count().unwrap(), 2);

        bus.publish(1).unwrap();
        bus.publish(2).unwrap();

        assert_eq!(kept.drain(), vec![1, 2]);
        assert_eq!(bus.subscriber_count().unwrap(), 1);
    }

    #[test]
    fn poisoned_bus_reports_a_typed_error_but_still_subscribes() {
        let bus = Arc::new(InMemoryEventBus::<u32>::new());
        let poisoner = Arc::clone(&bus);
        let _ = thread::spawn(move || {
            let _guard = poisoner.subscribers.lock().unwrap();
            panic!("poison the subscriber list");
        })
        .join();

        let err = bus.publish(1).unwrap_err();
        assert_eq!(err, InMemoryBusError::Poisoned);
        assert_eq!(err.to_string(), "event bus subscriber list poisoned");
        assert!(bus.subscriber_count().is_err());

        let late = bus.subscribe();
        assert!(late.try_recv().is_err());
    }
}
