use fairway_shared::events::LiveEvent;
use std::collections::HashMap;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

/// Per-trip broadcast topics. A topic is created lazily on first use and
/// torn down when the trip reaches a terminal state; dropping the sender
/// closes every outstanding receiver.
pub struct TopicRegistry {
    capacity: usize,
    topics: RwLock<HashMap<Uuid, broadcast::Sender<LiveEvent>>>,
}

impl TopicRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            topics: RwLock::new(HashMap::new()),
        }
    }

    pub async fn subscribe(&self, trip_id: Uuid) -> broadcast::Receiver<LiveEvent> {
        let mut topics = self.topics.write().await;
        topics
            .entry(trip_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Fan an event out to the trip's subscribers. Returns how many
    /// subscribers received it; zero when nobody is listening.
    pub async fn publish(&self, trip_id: Uuid, event: LiveEvent) -> usize {
        let topics = self.topics.read().await;
        match topics.get(&trip_id) {
            Some(sender) => sender.send(event).unwrap_or(0),
            None => 0,
        }
    }

    pub async fn close(&self, trip_id: Uuid) {
        if self.topics.write().await.remove(&trip_id).is_some() {
            tracing::debug!(trip_id = %trip_id, "live topic closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_fan_out_to_every_subscriber() {
        let registry = TopicRegistry::new(16);
        let trip_id = Uuid::new_v4();
        let mut a = registry.subscribe(trip_id).await;
        let mut b = registry.subscribe(trip_id).await;

        let delivered = registry
            .publish(
                trip_id,
                LiveEvent::LocationUpdate {
                    trip_id,
                    latitude: 29.64,
                    longitude: -82.34,
                    recorded_at: 1,
                },
            )
            .await;
        assert_eq!(delivered, 2);
        assert!(matches!(
            a.recv().await.unwrap(),
            LiveEvent::LocationUpdate { .. }
        ));
        assert!(matches!(
            b.recv().await.unwrap(),
            LiveEvent::LocationUpdate { .. }
        ));
    }

    #[tokio::test]
    async fn topics_do_not_leak_across_trips() {
        let registry = TopicRegistry::new(16);
        let trip_a = Uuid::new_v4();
        let trip_b = Uuid::new_v4();
        let mut sub_b = registry.subscribe(trip_b).await;

        registry
            .publish(
                trip_a,
                LiveEvent::TripUpdate {
                    trip_id: trip_a,
                    status: "STARTED".into(),
                    timestamp: 0,
                },
            )
            .await;

        // Nothing was addressed to trip B.
        assert!(matches!(
            sub_b.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn closing_a_topic_hangs_up_subscribers() {
        let registry = TopicRegistry::new(16);
        let trip_id = Uuid::new_v4();
        let mut rx = registry.subscribe(trip_id).await;

        registry.close(trip_id).await;
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Closed)
        ));
    }
}
