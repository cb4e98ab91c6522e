//! Process-wide reload signals, keyed by entity type
//!
//! Publishing `EntityType::Work` invalidates every mounted work list or detail
//! controller without a direct reference to them. Signals carry no payload.

use std::future::Future;
use std::sync::{Arc, Weak};

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::task::JoinHandle;

use crate::types::EntityType;

/// Reload signal bus
#[derive(Debug, Clone)]
pub struct ReloadBus {
    sender: broadcast::Sender<EntityType>,
}

impl ReloadBus {
    /// Create a bus buffering up to `capacity` signals per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish a reload signal; returns how many subscriptions of any type received it.
    pub fn publish(&self, entity_type: EntityType) -> usize {
        log::debug!("publish {}", entity_type.reload_topic());
        self.sender.send(entity_type).unwrap_or(0)
    }

    /// Subscribe to one entity type's reload topic.
    pub fn subscribe(&self, entity_type: EntityType) -> ReloadSubscription {
        ReloadSubscription {
            entity_type,
            receiver: self.sender.subscribe(),
        }
    }
}

impl Default for ReloadBus {
    fn default() -> Self {
        Self::new(64)
    }
}

/// Receiver side of one reload topic
#[derive(Debug)]
pub struct ReloadSubscription {
    entity_type: EntityType,
    receiver: broadcast::Receiver<EntityType>,
}

impl ReloadSubscription {
    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Wait for the next signal on this topic.
    ///
    /// Returns `None` once the bus is gone. Lagging collapses missed signals into one.
    pub async fn recv(&mut self) -> Option<()> {
        loop {
            match self.receiver.recv().await {
                Ok(t) if t == self.entity_type => return Some(()),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    log::debug!(
                        "{} subscription lagged by {skipped}",
                        self.entity_type.reload_topic()
                    );
                    return Some(());
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Drain buffered signals without waiting; returns whether any matched.
    pub fn try_recv(&mut self) -> bool {
        let mut matched = false;
        loop {
            match self.receiver.try_recv() {
                Ok(t) => matched |= t == self.entity_type,
                Err(TryRecvError::Lagged(_)) => matched = true,
                Err(TryRecvError::Empty | TryRecvError::Closed) => return matched,
            }
        }
    }
}

/// Background task re-running a controller's reload per signal.
///
/// Holds the controller weakly and aborts on drop, so dropping either side
/// ends the subscription.
#[derive(Debug)]
pub struct ReloadWatcher {
    handle: JoinHandle<()>,
}

impl ReloadWatcher {
    pub(crate) fn spawn<C, F, Fut>(
        mut subscription: ReloadSubscription,
        target: Weak<C>,
        on_signal: F,
    ) -> Self
    where
        C: Send + Sync + 'static,
        F: Fn(Arc<C>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let handle = tokio::spawn(async move {
            while subscription.recv().await.is_some() {
                let Some(target) = target.upgrade() else {
                    break;
                };
                on_signal(target).await;
            }
        });
        Self { handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ReloadWatcher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
