//! Request-deduplicating query cache
//!
//! Holds one entry per distinct `QueryKey`. Subscribing to a key either
//! reuses the existing entry or creates one and starts exactly one fetch.
//! Fetches run as tokio tasks and report back over a channel; the owner of
//! the cache applies those results from its event loop with `poll_events`,
//! which is the only place entries change after a fetch. Subscribers hold a
//! `watch` receiver, so they see each new state as soon as it is applied.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Local;
use tokio::sync::{mpsc, watch};

use super::{Fetcher, QueryData, QueryError, QueryKey, QuerySnapshot, QueryStatus};

/// Default grace period before an entry with no subscribers is evicted
pub const DEFAULT_KEEP_UNUSED_FOR: Duration = Duration::from_secs(60);

/// Cache behaviour settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    /// How long an entry survives after its last subscriber leaves
    pub keep_unused_for: Duration,
    /// Age after which fulfilled data is refetched on the next subscribe.
    /// `None` keeps data fresh for the lifetime of the entry.
    pub max_age: Option<Duration>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            keep_unused_for: DEFAULT_KEEP_UNUSED_FOR,
            max_age: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RequestId(u64);

/// Completed fetch on its way back to the event loop
#[derive(Debug)]
struct QueryEvent {
    key: QueryKey,
    request_id: RequestId,
    result: Result<QueryData, QueryError>,
}

/// Cache record for one query key
#[derive(Debug)]
struct QueryEntry {
    state: watch::Sender<QuerySnapshot>,
    in_flight: Option<RequestId>,
    fulfilled_at: Option<Instant>,
    unused_since: Option<Instant>,
}

impl QueryEntry {
    fn new() -> Self {
        let (state, _) = watch::channel(QuerySnapshot::default());
        Self {
            state,
            in_flight: None,
            fulfilled_at: None,
            unused_since: None,
        }
    }

    /// Live subscriptions are the receivers still attached to `state`
    fn subscriber_count(&self) -> usize {
        self.state.receiver_count()
    }

    /// Whether a new subscriber should trigger a fetch
    fn needs_fetch(&self, max_age: Option<Duration>) -> bool {
        if self.in_flight.is_some() {
            return false;
        }
        match &self.state.borrow().status {
            QueryStatus::Success(_) => match (max_age, self.fulfilled_at) {
                (Some(max_age), Some(at)) => at.elapsed() >= max_age,
                _ => false,
            },
            QueryStatus::Uninitialized | QueryStatus::Loading | QueryStatus::Error(_) => true,
        }
    }
}

/// Live handle on one query entry
///
/// Returned by `QueryCache::subscribe` and given back through
/// `QueryCache::unsubscribe`, which starts the grace period right away.
/// A handle that is simply dropped is noticed on the next
/// `collect_garbage` pass, and its grace period starts from there.
#[derive(Debug)]
#[must_use = "dropping a subscription releases the entry; pass it to `QueryCache::unsubscribe`"]
pub struct Subscription {
    key: QueryKey,
    receiver: watch::Receiver<QuerySnapshot>,
}

impl Subscription {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Current state of the entry
    pub fn snapshot(&self) -> QuerySnapshot {
        self.receiver.borrow().clone()
    }
}

/// Deduplicating cache of query results
pub struct QueryCache {
    fetcher: Arc<dyn Fetcher>,
    config: QueryConfig,
    entries: HashMap<QueryKey, QueryEntry>,
    next_request: u64,
    events_tx: mpsc::UnboundedSender<QueryEvent>,
    events_rx: mpsc::UnboundedReceiver<QueryEvent>,
}

impl QueryCache {
    pub fn new(fetcher: impl Fetcher, config: QueryConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            fetcher: Arc::new(fetcher),
            config,
            entries: HashMap::new(),
            next_request: 0,
            events_tx,
            events_rx,
        }
    }

    /// Registers interest in `key`
    ///
    /// Creates the entry and starts a fetch if none exists. An existing
    /// entry is reused; it is only refetched when it errored or its data
    /// is older than `max_age`, and never while a fetch is in flight.
    pub fn subscribe(&mut self, key: QueryKey) -> Subscription {
        let entry = self.entries.entry(key.clone()).or_insert_with(|| {
            tracing::debug!(%key, "creating query entry");
            QueryEntry::new()
        });
        entry.unused_since = None;
        let receiver = entry.state.subscribe();
        let needs_fetch = entry.needs_fetch(self.config.max_age);

        if needs_fetch {
            self.start_fetch(&key);
        }

        Subscription { key, receiver }
    }

    /// Releases a subscription
    ///
    /// The entry becomes eligible for eviction once it has no subscribers.
    /// A fetch in flight is not cancelled.
    pub fn unsubscribe(&mut self, subscription: Subscription) {
        let Subscription { key, receiver } = subscription;
        drop(receiver);
        let Some(entry) = self.entries.get_mut(&key) else {
            return;
        };
        if entry.subscriber_count() == 0 {
            tracing::debug!(%key, "query entry unused");
            entry.unused_since = Some(Instant::now());
        }
    }

    /// Revalidates `key` even if its data is fresh
    ///
    /// Returns `false` when there is no entry or a fetch is already in
    /// flight. Existing data stays visible until the new result arrives.
    pub fn refetch(&mut self, key: &QueryKey) -> bool {
        let idle = self
            .entries
            .get(key)
            .is_some_and(|entry| entry.in_flight.is_none());
        if idle {
            self.start_fetch(key);
        }
        idle
    }

    /// Current state of `key`, `Uninitialized` when there is no entry
    pub fn snapshot(&self, key: &QueryKey) -> QuerySnapshot {
        self.entries
            .get(key)
            .map(|entry| entry.state.borrow().clone())
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, key: &QueryKey) -> bool {
        self.entries.contains_key(key)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self, key: &QueryKey) -> usize {
        self.entries
            .get(key)
            .map(QueryEntry::subscriber_count)
            .unwrap_or(0)
    }

    #[cfg(test)]
    pub(crate) fn in_flight(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.in_flight.is_some())
            .count()
    }

    /// Evicts entries that have had no subscribers for `keep_unused_for`
    ///
    /// An entry with a fetch in flight is kept until that fetch resolves,
    /// so a later subscribe never starts a second request for the key.
    pub fn collect_garbage(&mut self, now: Instant) -> Vec<QueryKey> {
        for (key, entry) in &mut self.entries {
            if entry.subscriber_count() == 0 && entry.unused_since.is_none() {
                tracing::debug!(%key, "query entry unused after dropped subscription");
                entry.unused_since = Some(now);
            }
        }

        let keep_for = self.config.keep_unused_for;
        let expired: Vec<QueryKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| {
                entry.subscriber_count() == 0
                    && entry.in_flight.is_none()
                    && entry
                        .unused_since
                        .is_some_and(|since| now.saturating_duration_since(since) >= keep_for)
            })
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            tracing::debug!(%key, "evicting query entry");
            self.entries.remove(key);
        }
        expired
    }

    /// Applies every completed fetch without waiting
    ///
    /// Returns how many results changed an entry.
    pub fn poll_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            if self.apply(event) {
                applied += 1;
            }
        }
        applied
    }

    /// Waits for the next completed fetch and applies it
    ///
    /// Returns whether the result changed an entry.
    pub async fn next_event(&mut self) -> bool {
        match self.events_rx.recv().await {
            Some(event) => self.apply(event),
            None => false,
        }
    }

    fn start_fetch(&mut self, key: &QueryKey) {
        let request_id = RequestId(self.next_request);
        self.next_request += 1;

        let Some(entry) = self.entries.get_mut(key) else {
            return;
        };
        entry.in_flight = Some(request_id);
        entry.state.send_modify(|snapshot| {
            snapshot.is_fetching = true;
            if !snapshot.is_success() {
                snapshot.status = QueryStatus::Loading;
            }
        });

        tracing::debug!(%key, request = request_id.0, "starting fetch");
        let future = self.fetcher.fetch(key);
        let tx = self.events_tx.clone();
        let key = key.clone();
        tokio::spawn(async move {
            let result = future.await.map_err(QueryError::from);
            let _ = tx.send(QueryEvent {
                key,
                request_id,
                result,
            });
        });
    }

    fn apply(&mut self, event: QueryEvent) -> bool {
        let Some(entry) = self.entries.get_mut(&event.key) else {
            tracing::debug!(key = %event.key, "dropping result for evicted entry");
            return false;
        };
        if entry.in_flight != Some(event.request_id) {
            tracing::debug!(
                key = %event.key,
                request = event.request_id.0,
                "dropping superseded result"
            );
            return false;
        }
        entry.in_flight = None;

        let snapshot = match event.result {
            Ok(data) => {
                tracing::debug!(key = %event.key, "fetch fulfilled");
                entry.fulfilled_at = Some(Instant::now());
                QuerySnapshot {
                    status: QueryStatus::Success(data),
                    is_fetching: false,
                    updated_at: Some(Local::now()),
                }
            }
            Err(error) => {
                tracing::warn!(key = %event.key, %error, "fetch failed");
                entry.fulfilled_at = None;
                QuerySnapshot {
                    status: QueryStatus::Error(error),
                    is_fetching: false,
                    updated_at: Some(Local::now()),
                }
            }
        };
        entry.state.send_replace(snapshot);
        true
    }
}
