//! Per-trip broadcast channels backing the chat event stream.
//!
//! A trip gets a `tokio::sync::broadcast` channel, named `trip-chat.{trip_id}`
//! in logs, when its first subscriber arrives. Publishing never waits for
//! subscribers and a subscriber never receives the events it produced itself.
//! Channels left without receivers are dropped by [`TripChannels::prune`].

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use api_types::message::RealtimeEvent;
use tokio::sync::broadcast;
use tokio_stream::{
    Stream, StreamExt,
    wrappers::{BroadcastStream, errors::BroadcastStreamRecvError},
};
use uuid::Uuid;

pub const DEFAULT_CAPACITY: usize = 64;
pub const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct TripChannels {
    capacity: usize,
    channels: Arc<Mutex<HashMap<Uuid, broadcast::Sender<RealtimeEvent>>>>,
}

impl Default for TripChannels {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl TripChannels {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            channels: Arc::default(),
        }
    }

    fn channels(&self) -> MutexGuard<'_, HashMap<Uuid, broadcast::Sender<RealtimeEvent>>> {
        match self.channels.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Fire-and-forget delivery to current subscribers. Returns how many
    /// receivers got the event.
    pub fn publish(&self, trip_id: Uuid, event: RealtimeEvent) -> usize {
        let name = event.name();
        let Some(sender) = self.channels().get(&trip_id).cloned() else {
            tracing::debug!("trip-chat.{trip_id}: {name} dropped, no channel");
            return 0;
        };
        match sender.send(event) {
            Ok(receivers) => {
                tracing::debug!("trip-chat.{trip_id}: {name} sent to {receivers} receivers");
                receivers
            }
            Err(_) => {
                tracing::debug!("trip-chat.{trip_id}: {name} dropped, no subscribers");
                0
            }
        }
    }

    /// Events of `trip_id` produced by anyone but `subscriber`.
    pub fn subscribe(
        &self,
        trip_id: Uuid,
        subscriber: Uuid,
    ) -> impl Stream<Item = RealtimeEvent> + Send + 'static + use<> {
        let receiver = self
            .channels()
            .entry(trip_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe();
        BroadcastStream::new(receiver).filter_map(move |item| match item {
            Ok(event) if event.sender() == subscriber => None,
            Ok(event) => Some(event),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!("trip-chat.{trip_id}: subscriber {subscriber} lagged, skipped {skipped} events");
                None
            }
        })
    }

    /// Drops channels nobody listens to anymore.
    pub fn prune(&self) {
        let mut channels = self.channels();
        let before = channels.len();
        channels.retain(|_, sender| sender.receiver_count() > 0);
        if channels.len() < before {
            tracing::debug!("pruned {} idle trip channels", before - channels.len());
        }
    }

    /// Prunes idle channels every `period` until the runtime shuts down.
    pub fn spawn_pruner(&self, period: Duration) -> tokio::task::JoinHandle<()> {
        let channels = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await;
            loop {
                interval.tick().await;
                channels.prune();
            }
        })
    }
}
