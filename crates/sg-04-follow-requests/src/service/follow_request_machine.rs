//! Follow request state machine.
//!
//! ```text
//! none ──create──→ pending ──respond(accepted)──→ edges + cleanup ──→ none
//!   ↑                │    └───respond(declined)──→ cleanup ─────────→ none
//!   └────cancel──────┘
//! ```
//!
//! Terminal transitions run as one optimistic transaction (phase one) and
//! are followed by a best-effort notification to the requester (phase two).
//! Every write inside the transaction is idempotent, so a retry after
//! contention or a redelivered trigger never duplicates an edge.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use sg_01_document_store::{
    decode, run_transaction, DocumentStore, Transaction, WriteBatch, WriteOp,
};
use sg_02_notifications::{ActorDisplay, Delivery, NotificationDraft, NotificationKey, UpsertByKey};
use sg_03_relationships::{
    edge_pair_ops, EdgeSource, FollowEdge, RelationshipReader, RelationshipStore,
};
use sg_telemetry::{FOLLOW_TRANSITIONS, NOTIFICATIONS_UPSERTED, NOTIFICATION_FAILURES_SWALLOWED};
use shared_types::{paths, Clock, CollectionPath, Document, UserId};
use tracing::{debug, info, warn};

use crate::config::FollowConfig;
use crate::domain::{
    creation_defaults, pending_fields, request_path, sent_request_path, Decision, FollowError,
    FollowMode, FollowOutcome, FollowRequest, IgnoreReason, InstantFollow, RequestOutcome,
    RequestStatus, Transition,
};
use crate::ports::FollowApi;

/// What the decision transaction found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Applied {
    Committed,
    Missing,
    Superseded(RequestStatus),
    Unanswered,
}

/// Where a decision comes from, which fixes the stored statuses it may be
/// applied over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    /// The followee answered through `respond`; the request may be pending.
    Respond,
    /// A status change seen by the update trigger; the stored request must
    /// still carry that status.
    Recorded,
}

/// Owns the pending/accepted/declined lifecycle of follow requests.
pub struct FollowRequestMachine {
    store: Arc<dyn DocumentStore>,
    relationships: Arc<RelationshipStore>,
    notifications: Arc<dyn UpsertByKey>,
    clock: Arc<dyn Clock>,
    config: FollowConfig,
}

impl FollowRequestMachine {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        relationships: Arc<RelationshipStore>,
        notifications: Arc<dyn UpsertByKey>,
        clock: Arc<dyn Clock>,
        config: FollowConfig,
    ) -> Self {
        Self {
            store,
            relationships,
            notifications,
            clock,
            config,
        }
    }

    /// Display fields of `uid`; falls back to the bare id if the profile
    /// cannot be read.
    async fn actor(&self, uid: &UserId) -> ActorDisplay {
        match self.store.get(&paths::user(uid)).await {
            Ok(profile) => ActorDisplay::from_profile(uid.clone(), profile.as_ref()),
            Err(e) => {
                debug!(uid = %uid, error = %e, "Profile unavailable, using bare actor");
                ActorDisplay::bare(uid.clone())
            }
        }
    }

    /// Phase two: deliver a notification, retrying transient failures a
    /// few times. Never fails.
    async fn notify(
        &self,
        recipient: &UserId,
        key: NotificationKey,
        draft: NotificationDraft,
    ) -> Delivery {
        let attempts = self.config.notification_attempts.max(1);
        let mut attempt = 1;
        loop {
            let delivery = self.notifications.deliver(recipient, &key, &draft).await;
            match delivery {
                Delivery::Failed(ref e) if e.is_retryable() && attempt < attempts => {
                    debug!(recipient = %recipient, key = %key, attempt, "Retrying notification");
                    if !self.config.notification_backoff.is_zero() {
                        tokio::time::sleep(self.config.notification_backoff * attempt).await;
                    }
                    attempt += 1;
                }
                Delivery::Delivered => {
                    NOTIFICATIONS_UPSERTED
                        .with_label_values(&[draft.kind.as_str()])
                        .inc();
                    return delivery;
                }
                Delivery::Failed(_) => {
                    NOTIFICATION_FAILURES_SWALLOWED
                        .with_label_values(&[draft.kind.as_str()])
                        .inc();
                    return delivery;
                }
            }
        }
    }

    /// Phase one: edges (on accept) and request cleanup, atomically.
    async fn apply_decision(
        &self,
        pair: &FollowEdge,
        decision: Decision,
        origin: Origin,
    ) -> Result<Applied, FollowError> {
        let store = self.store.as_ref();
        let request = request_path(pair);
        let mirror = sent_request_path(pair);
        let now = self.clock.now();

        run_transaction(store, &self.config.transaction, || {
            let request = request.clone();
            let mirror = mirror.clone();
            async move {
                let mut tx = Transaction::new();
                let Some(current) = tx.get(store, &request).await? else {
                    return Ok((tx, Applied::Missing));
                };
                let stored = RequestStatus::of(&current);
                if let Some(status) = stored {
                    if status.decision().is_some() && status != decision.status() {
                        return Ok((tx, Applied::Superseded(status)));
                    }
                }
                // A stale or reordered event must not answer a newer request.
                if origin == Origin::Recorded && stored != Some(decision.status()) {
                    return Ok((tx, Applied::Unanswered));
                }

                if decision == Decision::Accepted {
                    for op in edge_pair_ops(pair, EdgeSource::Request, now)? {
                        tx.push(op)?;
                    }
                }
                tx.push(WriteOp::delete(request))?;
                tx.push(WriteOp::delete(mirror))?;
                Ok((tx, Applied::Committed))
            }
        })
        .await
    }

    /// Map the transaction result to a transition, running phase two when
    /// something was committed.
    async fn complete(&self, pair: &FollowEdge, decision: Decision, applied: Applied) -> Transition {
        let transition = match applied {
            Applied::Missing => Transition::Ignored(IgnoreReason::RequestMissing),
            Applied::Superseded(status) => Transition::Ignored(IgnoreReason::Superseded(status)),
            Applied::Unanswered => Transition::Ignored(IgnoreReason::Unanswered),
            Applied::Committed => {
                let followee = self.actor(pair.followee()).await;
                let (key, draft) = match decision {
                    Decision::Accepted => (
                        NotificationKey::follow_request_accepted(pair.followee(), pair.follower()),
                        NotificationDraft::follow_request_accepted(&followee),
                    ),
                    Decision::Declined => (
                        NotificationKey::follow_request_declined(pair.followee(), pair.follower()),
                        NotificationDraft::follow_request_declined(&followee),
                    ),
                };
                let notification = self.notify(pair.follower(), key, draft).await;
                Transition::Committed {
                    decision,
                    notification,
                }
            }
        };

        let label = match &transition {
            Transition::Committed { decision: Decision::Accepted, .. } => "accepted",
            Transition::Committed { decision: Decision::Declined, .. } => "declined",
            Transition::Ignored(_) => "ignored",
        };
        FOLLOW_TRANSITIONS.with_label_values(&[label]).inc();
        info!(
            follower = %pair.follower(),
            followee = %pair.followee(),
            ?decision,
            outcome = label,
            "Follow request decided"
        );
        transition
    }

    /// Copy the primary request onto its mirror if the primary still exists.
    async fn sync_mirror(&self, pair: &FollowEdge) -> Result<bool, FollowError> {
        let store = self.store.as_ref();
        let request = request_path(pair);
        let mirror = sent_request_path(pair);

        run_transaction(store, &self.config.transaction, || {
            let request = request.clone();
            let mirror = mirror.clone();
            async move {
                let mut tx = Transaction::new();
                let Some(primary) = tx.get(store, &request).await? else {
                    return Ok((tx, false));
                };
                tx.push(WriteOp::upsert(mirror, primary))?;
                Ok((tx, true))
            }
        })
        .await
    }

    async fn requests_in(&self, collection: &CollectionPath) -> Result<Vec<FollowRequest>, FollowError> {
        let mut requests = Vec::new();
        for (path, doc) in self.store.list(collection).await? {
            match decode::<FollowRequest>(&path, doc) {
                Ok(request) if request.status == RequestStatus::Pending => requests.push(request),
                Ok(_) => {}
                Err(e) => warn!(path = %path, error = %e, "Skipping malformed follow request"),
            }
        }
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    // =========================================================================
    // TRIGGER HANDLERS
    // =========================================================================

    /// A request document was created: make sure its mirror exists and tell
    /// the followee.
    ///
    /// Returns `None` if the request is not pending (nothing to announce).
    pub async fn on_request_created(
        &self,
        followee: &UserId,
        follower: &UserId,
        after: &Document,
    ) -> Result<Option<Delivery>, FollowError> {
        let pair = FollowEdge::new(follower.clone(), followee.clone())?;
        if RequestStatus::of(after) != Some(RequestStatus::Pending) {
            debug!(follower = %follower, followee = %followee, "Created request is not pending");
            return Ok(None);
        }

        self.sync_mirror(&pair).await?;

        let actor = self.actor(follower).await;
        let delivery = self
            .notify(
                followee,
                NotificationKey::follow_request(followee, follower),
                NotificationDraft::follow_request(&actor),
            )
            .await;
        Ok(Some(delivery))
    }

    /// A request document changed: apply a terminal status, or keep the
    /// mirror in step otherwise.
    pub async fn on_request_updated(
        &self,
        followee: &UserId,
        follower: &UserId,
        before: &Document,
        after: &Document,
    ) -> Result<Transition, FollowError> {
        let pair = FollowEdge::new(follower.clone(), followee.clone())?;
        let Some(status) = RequestStatus::of(after) else {
            return Err(FollowError::Malformed {
                path: request_path(&pair).to_string(),
                reason: format!("unknown status {:?}", after.get("status").unwrap_or(&Value::Null)),
            });
        };
        if RequestStatus::of(before) == Some(status) {
            return Ok(Transition::Ignored(IgnoreReason::AlreadyInState(status)));
        }

        match status.decision() {
            Some(decision) => {
                let applied = self.apply_decision(&pair, decision, Origin::Recorded).await?;
                Ok(self.complete(&pair, decision, applied).await)
            }
            None => {
                self.sync_mirror(&pair).await?;
                Ok(Transition::Ignored(IgnoreReason::NotTerminal))
            }
        }
    }

    /// A request document was deleted: remove its mirror unless the request
    /// has been re-created since.
    pub async fn on_request_deleted(&self, followee: &UserId, follower: &UserId) -> Result<bool, FollowError> {
        let pair = FollowEdge::new(follower.clone(), followee.clone())?;
        let store = self.store.as_ref();
        let request = request_path(&pair);
        let mirror = sent_request_path(&pair);

        run_transaction(store, &self.config.transaction, || {
            let request = request.clone();
            let mirror = mirror.clone();
            async move {
                let mut tx = Transaction::new();
                if tx.get(store, &request).await?.is_some() {
                    return Ok((tx, false));
                }
                let present = tx.get(store, &mirror).await?.is_some();
                if present {
                    tx.push(WriteOp::delete(mirror))?;
                }
                Ok((tx, present))
            }
        })
        .await
    }

    /// A follower record was created under `followee`: restore the
    /// following-side mirror and, for direct follows, notify the followee.
    pub async fn on_follower_created(
        &self,
        followee: &UserId,
        follower: &UserId,
        after: &Document,
    ) -> Result<InstantFollow, FollowError> {
        let pair = FollowEdge::new(follower.clone(), followee.clone())?;
        let mirror_restored = self.relationships.ensure_mirror(&pair).await?;

        let from_request = after.get("source").and_then(Value::as_str) == Some("request");
        if from_request {
            return Ok(InstantFollow {
                mirror_restored,
                notification: None,
            });
        }

        let actor = self.actor(follower).await;
        let delivery = self
            .notify(
                followee,
                NotificationKey::follow(followee, follower),
                NotificationDraft::follow(&actor),
            )
            .await;
        Ok(InstantFollow {
            mirror_restored,
            notification: Some(delivery),
        })
    }
}

#[async_trait]
impl FollowApi for FollowRequestMachine {
    async fn create(&self, follower: &UserId, followee: &UserId) -> Result<RequestOutcome, FollowError> {
        let pair = FollowEdge::new(follower.clone(), followee.clone())?;
        if self.relationships.is_following(follower, followee).await? {
            return Ok(RequestOutcome::AlreadyFollowing);
        }

        let now = self.clock.now();
        let fields = pending_fields(&pair);
        let batch = WriteBatch::from_ops(vec![
            WriteOp::upsert_with_defaults(request_path(&pair), fields.clone(), creation_defaults(now)),
            WriteOp::upsert_with_defaults(sent_request_path(&pair), fields, creation_defaults(now)),
        ])?;
        let summary = self.store.commit(batch).await?;

        FOLLOW_TRANSITIONS.with_label_values(&["requested"]).inc();
        info!(
            follower = %follower,
            followee = %followee,
            new = summary.applied > 0,
            "Follow request created"
        );
        Ok(RequestOutcome::Requested)
    }

    async fn cancel(&self, follower: &UserId, followee: &UserId) -> Result<(), FollowError> {
        let pair = FollowEdge::new(follower.clone(), followee.clone())?;
        let batch = WriteBatch::from_ops(vec![
            WriteOp::delete(request_path(&pair)),
            WriteOp::delete(sent_request_path(&pair)),
        ])?;
        let summary = self.store.commit(batch).await?;

        if summary.applied > 0 {
            FOLLOW_TRANSITIONS.with_label_values(&["cancelled"]).inc();
        }
        info!(follower = %follower, followee = %followee, removed = summary.applied, "Follow request cancelled");
        Ok(())
    }

    async fn respond(
        &self,
        followee: &UserId,
        follower: &UserId,
        decision: Decision,
    ) -> Result<Transition, FollowError> {
        let pair = FollowEdge::new(follower.clone(), followee.clone())?;
        let Some(current) = self.store.get(&request_path(&pair)).await? else {
            return Ok(Transition::Ignored(IgnoreReason::RequestMissing));
        };
        if RequestStatus::of(&current) == Some(decision.status()) {
            debug!(follower = %follower, followee = %followee, ?decision, "Already in requested state");
            return Ok(Transition::Ignored(IgnoreReason::AlreadyInState(decision.status())));
        }

        let applied = self.apply_decision(&pair, decision, Origin::Respond).await?;
        Ok(self.complete(&pair, decision, applied).await)
    }

    async fn follow(&self, follower: &UserId, followee: &UserId) -> Result<FollowOutcome, FollowError> {
        let pair = FollowEdge::new(follower.clone(), followee.clone())?;
        if self.relationships.is_following(follower, followee).await? {
            return Ok(FollowOutcome::AlreadyFollowing);
        }

        let profile = self.store.get(&paths::user(followee)).await?;
        match FollowMode::from_profile(profile.as_ref()) {
            FollowMode::RequiresApproval => match self.create(follower, followee).await? {
                RequestOutcome::Requested => Ok(FollowOutcome::Requested),
                RequestOutcome::AlreadyFollowing => Ok(FollowOutcome::AlreadyFollowing),
            },
            FollowMode::Instant => {
                self.relationships.create_pair(&pair, EdgeSource::Direct).await?;
                FOLLOW_TRANSITIONS.with_label_values(&["instant"]).inc();
                info!(follower = %follower, followee = %followee, "Followed directly");
                Ok(FollowOutcome::Followed)
            }
        }
    }

    async fn incoming(&self, followee: &UserId) -> Result<Vec<FollowRequest>, FollowError> {
        self.requests_in(&paths::follow_requests(followee)).await
    }

    async fn outgoing(&self, follower: &UserId) -> Result<Vec<FollowRequest>, FollowError> {
        self.requests_in(&paths::sent_requests(follower)).await
    }
}
