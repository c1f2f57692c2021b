//! Product change notifications.
//!
//! Every successful mutation publishes a [`ProductChange`]. Open catalog and
//! management pages subscribe over SSE and re-fetch their product fragment
//! when one arrives.

use serde::Serialize;
use tokio::sync::broadcast;

use uniq_core::ProductId;

/// Default channel capacity. Lagging subscribers skip ahead, which is harmless
/// because every event triggers the same full re-fetch.
const CHANNEL_CAPACITY: usize = 64;

/// SSE event name pages listen for.
pub const PRODUCTS_CHANGED_EVENT: &str = "products-changed";

/// A mutation that happened to the product table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProductChange {
    Added { id: ProductId },
    Updated { id: ProductId },
    Removed { id: ProductId },
}

/// Broadcast hub for product changes.
#[derive(Clone)]
pub struct ProductEvents {
    sender: broadcast::Sender<ProductChange>,
}

impl Default for ProductEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductEvents {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publish a change. Having no subscribers is not an error.
    pub fn publish(&self, change: ProductChange) {
        let receivers = self.sender.send(change).unwrap_or(0);
        tracing::debug!(?change, receivers, "Product change published");
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ProductChange> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_published_change() {
        let events = ProductEvents::new();
        let mut rx = events.subscribe();
        events.publish(ProductChange::Added {
            id: ProductId::new(1),
        });
        let change = rx.recv().await.unwrap();
        assert_eq!(
            change,
            ProductChange::Added {
                id: ProductId::new(1)
            }
        );
    }

    #[test]
    fn test_publish_without_subscribers_is_fine() {
        ProductEvents::new().publish(ProductChange::Removed {
            id: ProductId::new(2),
        });
    }

    #[test]
    fn test_change_serializes_with_kind_tag() {
        let json = serde_json::to_string(&ProductChange::Updated {
            id: ProductId::new(3),
        })
        .unwrap();
        assert_eq!(json, r#"{"kind":"updated","id":3}"#);
    }
}
