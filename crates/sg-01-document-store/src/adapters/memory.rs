//! In-memory document store.
//!
//! Backs tests and single-process deployments. When built with a change
//! feed, every applied change that passes the feed filter is published as a
//! [`DocumentEvent`] after the write lock has been released.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_bus::{DocumentEvent, EventFilter, EventPublisher};
use shared_types::{paths, Clock, CollectionPath, Document, DocumentPath, SystemClock};
use tracing::{debug, warn};

use crate::domain::{
    CommitSummary, Resolution, StoreError, Transaction, Versioned, WriteBatch, WriteOp,
    MAX_BATCH_WRITES,
};
use crate::ports::DocumentStore;

/// Failure modes that can be injected for tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Fail the `nth` batch commit from now (1-based), once.
    FailBatch { nth: usize },
    /// Fail every commit that writes a notification document.
    FailNotificationWrites,
    /// Fail the next `times` transaction commits with contention.
    Contention { times: u32 },
}

#[derive(Debug, Default)]
struct Faults {
    batch_countdown: Option<usize>,
    fail_notifications: bool,
    contention_remaining: u32,
}

#[derive(Debug, Clone)]
struct Stored {
    document: Document,
    version: u64,
}

#[derive(Debug, Default)]
struct State {
    docs: BTreeMap<DocumentPath, Stored>,
    next_version: u64,
    faults: Faults,
}

/// In-memory implementation of [`DocumentStore`].
pub struct InMemoryDocumentStore {
    state: Mutex<State>,
    clock: Arc<dyn Clock>,
    change_feed: Option<Arc<dyn EventPublisher>>,
    feed_filter: EventFilter,
}

impl InMemoryDocumentStore {
    /// Store without a change feed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_version: 1,
                ..State::default()
            }),
            clock: Arc::new(SystemClock),
            change_feed: None,
            feed_filter: EventFilter::all(),
        }
    }

    /// Publish every applied change to `feed`.
    #[must_use]
    pub fn with_change_feed(mut self, feed: Arc<dyn EventPublisher>) -> Self {
        self.change_feed = Some(feed);
        self
    }

    /// Publish only the changes `filter` matches.
    ///
    /// Consumers of a bounded feed drop events once they fall behind, so
    /// writes nobody subscribes to must stay off the feed.
    #[must_use]
    pub fn with_feed_filter(mut self, filter: EventFilter) -> Self {
        self.feed_filter = filter;
        self
    }

    /// Timestamp change events with `clock`.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Inject a failure mode.
    pub fn inject(&self, fault: Fault) {
        let mut state = self.state.lock();
        match fault {
            Fault::FailBatch { nth } => state.faults.batch_countdown = Some(nth.max(1)),
            Fault::FailNotificationWrites => state.faults.fail_notifications = true,
            Fault::Contention { times } => state.faults.contention_remaining = times,
        }
    }

    /// Remove all injected failure modes.
    pub fn clear_faults(&self) {
        self.state.lock().faults = Faults::default();
    }

    /// Number of documents stored (all collections).
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().docs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_faults(
        faults: &mut Faults,
        ops: &[WriteOp],
        is_transaction: bool,
    ) -> Result<(), StoreError> {
        if faults.fail_notifications
            && ops
                .iter()
                .any(|op| op.path().collection_id() == paths::NOTIFICATIONS)
        {
            return Err(StoreError::Unavailable(
                "injected notification write failure".into(),
            ));
        }

        if is_transaction {
            if faults.contention_remaining > 0 {
                faults.contention_remaining -= 1;
                let path = ops
                    .first()
                    .map(|op| op.path().to_string())
                    .unwrap_or_default();
                return Err(StoreError::Contention { path });
            }
            return Ok(());
        }

        match faults.batch_countdown {
            Some(n) if n <= 1 => {
                faults.batch_countdown = None;
                Err(StoreError::Unavailable("injected batch failure".into()))
            }
            Some(n) => {
                faults.batch_countdown = Some(n - 1);
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Validate and apply `ops` under the lock; returns the change events to
    /// publish once the lock is released.
    fn apply_locked(
        &self,
        ops: Vec<WriteOp>,
        reads: Option<&BTreeMap<DocumentPath, u64>>,
    ) -> Result<(CommitSummary, Vec<DocumentEvent>), StoreError> {
        if ops.len() > MAX_BATCH_WRITES {
            return Err(StoreError::BatchTooLarge {
                count: ops.len(),
                max: MAX_BATCH_WRITES,
            });
        }

        let mut state = self.state.lock();
        Self::check_faults(&mut state.faults, &ops, reads.is_some())?;

        if let Some(reads) = reads {
            for (path, version) in reads {
                let current = state.docs.get(path).map_or(0, |s| s.version);
                if current != *version {
                    return Err(StoreError::Contention {
                        path: path.to_string(),
                    });
                }
            }
        }

        // Stage every op against the state as seen by the ops before it.
        let mut staged: BTreeMap<DocumentPath, Option<Document>> = BTreeMap::new();
        let mut summary = CommitSummary::default();
        for op in &ops {
            let path = op.path();
            let current = match staged.get(path) {
                Some(staged_doc) => staged_doc.clone(),
                None => state.docs.get(path).map(|s| s.document.clone()),
            };
            match op.resolve(current.as_ref()) {
                Resolution::Unchanged => summary.skipped += 1,
                Resolution::Put(doc) => {
                    staged.insert(path.clone(), Some(doc));
                }
                Resolution::Remove => {
                    staged.insert(path.clone(), None);
                }
            }
        }

        let now = self.clock.now();
        let mut events = Vec::new();
        for (path, after) in staged {
            let before = state.docs.get(&path).map(|s| s.document.clone());
            if before == after {
                summary.skipped += 1;
                continue;
            }
            summary.applied += 1;

            match after {
                Some(after) => {
                    let version = state.next_version;
                    state.next_version += 1;
                    state.docs.insert(
                        path.clone(),
                        Stored {
                            document: after.clone(),
                            version,
                        },
                    );
                    events.push(match before {
                        Some(before) => DocumentEvent::updated(path, before, after, now),
                        None => DocumentEvent::created(path, after, now),
                    });
                }
                None => {
                    state.docs.remove(&path);
                    if let Some(before) = before {
                        events.push(DocumentEvent::deleted(path, before, now));
                    }
                }
            }
        }

        Ok((summary, events))
    }

    async fn publish(&self, events: Vec<DocumentEvent>) {
        let Some(feed) = &self.change_feed else {
            return;
        };
        for event in events.into_iter().filter(|e| self.feed_filter.matches(e)) {
            debug!(path = %event.path, kind = ?event.kind, "Publishing change");
            feed.publish(event).await;
        }
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get_versioned(&self, path: &DocumentPath) -> Result<Versioned, StoreError> {
        let state = self.state.lock();
        Ok(state
            .docs
            .get(path)
            .map(|s| Versioned {
                document: Some(s.document.clone()),
                version: s.version,
            })
            .unwrap_or_default())
    }

    async fn list(
        &self,
        collection: &CollectionPath,
    ) -> Result<Vec<(DocumentPath, Document)>, StoreError> {
        let state = self.state.lock();
        Ok(state
            .docs
            .iter()
            .filter(|(path, _)| collection.contains(path))
            .map(|(path, s)| (path.clone(), s.document.clone()))
            .collect())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<CommitSummary, StoreError> {
        let (summary, events) = self.apply_locked(batch.into_ops(), None).inspect_err(|e| {
            warn!(error = %e, "Batch commit failed");
        })?;
        self.publish(events).await;
        Ok(summary)
    }

    async fn commit_transaction(&self, tx: Transaction) -> Result<CommitSummary, StoreError> {
        let (reads, writes) = tx.into_parts();
        let (summary, events) = self.apply_locked(writes, Some(&reads))?;
        self.publish(events).await;
        Ok(summary)
    }
}
