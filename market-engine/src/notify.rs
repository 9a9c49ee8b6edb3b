//! Post-commit notification dispatch
//!
//! Notifications fan out on a broadcast channel after the transaction that
//! produced them has committed. Dispatch is fire-and-forget: a missing or
//! lagging subscriber never affects order, stock or wallet state.

use shared::order::Notification;
use tokio::sync::broadcast;

/// Broadcast hub for seller and customer notifications
#[derive(Clone)]
pub struct NotificationHub {
    tx: broadcast::Sender<Notification>,
}

impl NotificationHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to notification broadcasts
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// Send a notification to all current subscribers. Failure is logged,
    /// never propagated.
    pub fn dispatch(&self, notification: Notification) {
        match self.tx.send(notification) {
            Ok(receiver_count) => {
                tracing::debug!(receiver_count, "Notification dispatched");
            }
            Err(broadcast::error::SendError(dropped)) => {
                tracing::debug!(
                    order_id = %dropped.order_id(),
                    "Notification dropped, no subscribers"
                );
            }
        }
    }
}

impl std::fmt::Debug for NotificationHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationHub")
            .field("tx", &"<broadcast::Sender>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Notification {
        Notification::CustomerOrderCancelled {
            customer_id: "cust-1".to_string(),
            order_id: "order-1".to_string(),
            total_refund: 10.0,
        }
    }

    #[tokio::test]
    async fn test_subscriber_receives_notification() {
        let hub = NotificationHub::new(16);
        let mut rx = hub.subscribe();

        hub.dispatch(sample());

        let received = rx.try_recv().unwrap();
        assert_eq!(received.order_id(), "order-1");
    }

    #[tokio::test]
    async fn test_dispatch_without_subscribers_is_silent() {
        let hub = NotificationHub::new(16);
        hub.dispatch(sample());
    }
}
