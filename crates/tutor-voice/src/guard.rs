//! At-most-one synthesis per message.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tutor_core::MessageId;

use crate::sync::lock;

/// Set of message ids with a synthesis request in flight.
///
/// Membership is held by a [`GenerationPermit`]; dropping the permit releases
/// the id on every exit path, including errors and cancelled futures.
#[derive(Debug, Clone, Default)]
pub struct GenerationGuard {
    in_flight: Arc<Mutex<HashSet<MessageId>>>,
}

impl GenerationGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `id`, or `None` if a request for it is already running.
    #[must_use]
    pub fn try_acquire(&self, id: &MessageId) -> Option<GenerationPermit> {
        if !lock(&self.in_flight).insert(id.clone()) {
            return None;
        }
        Some(GenerationPermit {
            in_flight: Arc::clone(&self.in_flight),
            id: id.clone(),
        })
    }

    #[must_use]
    pub fn contains(&self, id: &MessageId) -> bool {
        lock(&self.in_flight).contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.in_flight).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.in_flight).is_empty()
    }
}

/// Proof that the holder is the only synthesis in flight for its message.
#[derive(Debug)]
pub struct GenerationPermit {
    in_flight: Arc<Mutex<HashSet<MessageId>>>,
    id: MessageId,
}

impl GenerationPermit {
    #[must_use]
    pub const fn message_id(&self) -> &MessageId {
        &self.id
    }
}

impl Drop for GenerationPermit {
    fn drop(&mut self) {
        lock(&self.in_flight).remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_is_refused() {
        let guard = GenerationGuard::new();
        let id = MessageId::from("m1");
        let permit = guard.try_acquire(&id).unwrap();
        assert!(guard.try_acquire(&id).is_none());
        assert!(guard.contains(&id));
        drop(permit);
        assert!(!guard.contains(&id));
        assert!(guard.try_acquire(&id).is_some());
    }

    #[test]
    fn test_distinct_ids_are_independent() {
        let guard = GenerationGuard::new();
        let _a = guard.try_acquire(&MessageId::from("a")).unwrap();
        let _b = guard.try_acquire(&MessageId::from("b")).unwrap();
        assert_eq!(guard.len(), 2);
    }

    #[tokio::test]
    async fn test_permit_released_when_future_cancelled() {
        let guard = GenerationGuard::new();
        let id = MessageId::from("m1");
        let (acquired_tx, acquired_rx) = tokio::sync::oneshot::channel();
        let task = {
            let guard = guard.clone();
            let id = id.clone();
            tokio::spawn(async move {
                let _permit = guard.try_acquire(&id);
                let _ = acquired_tx.send(());
                std::future::pending::<()>().await;
            })
        };
        acquired_rx.await.unwrap();
        assert!(guard.contains(&id));
        task.abort();
        let _ = task.await;
        assert!(guard.is_empty());
    }
}
