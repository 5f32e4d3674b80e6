//! Relationship store service.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use sg_01_document_store::{
    run_transaction, DocumentStore, Transaction, TransactionConfig, WriteBatch, WriteOp,
};
use shared_types::{paths, Clock, CollectionPath, Document, DocumentPath, UserId};
use tracing::{debug, info, warn};

use crate::domain::{edge_pair_ops, EdgeSource, FollowEdge, ReconcileReport, RelationshipError};
use crate::ports::RelationshipReader;

/// Reads and writes follow edge mirrors.
pub struct RelationshipStore {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    tx_config: TransactionConfig,
}

impl RelationshipStore {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            tx_config: TransactionConfig::default(),
        }
    }

    #[must_use]
    pub fn with_transaction_config(mut self, config: TransactionConfig) -> Self {
        self.tx_config = config;
        self
    }

    async fn ids_in(&self, collection: &CollectionPath) -> Result<Vec<UserId>, RelationshipError> {
        let docs = self.store.list(collection).await?;
        Ok(docs
            .into_iter()
            .filter_map(|(path, _)| match UserId::new(path.id()) {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!(path = %path, error = %e, "Skipping edge with invalid id");
                    None
                }
            })
            .collect())
    }

    /// Write both mirrors of `edge` atomically.
    ///
    /// Returns `true` if either mirror was created.
    pub async fn create_pair(
        &self,
        edge: &FollowEdge,
        source: EdgeSource,
    ) -> Result<bool, RelationshipError> {
        let ops = edge_pair_ops(edge, source, self.clock.now())?;
        let summary = self.store.commit(WriteBatch::from_ops(ops.into())?).await?;
        debug!(
            follower = %edge.follower(),
            followee = %edge.followee(),
            created = summary.applied,
            "Edge pair written"
        );
        Ok(summary.applied > 0)
    }

    /// Remove both mirrors of `follower -> followee`. Idempotent.
    ///
    /// Returns `true` if anything was removed.
    pub async fn unfollow(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<bool, RelationshipError> {
        let edge = FollowEdge::new(follower.clone(), followee.clone())?;
        let batch = WriteBatch::from_ops(vec![
            WriteOp::delete(edge.follower_path()),
            WriteOp::delete(edge.following_path()),
        ])?;
        let summary = self.store.commit(batch).await?;
        info!(follower = %follower, followee = %followee, removed = summary.applied, "Unfollowed");
        Ok(summary.applied > 0)
    }

    /// `uid` removes `follower_id` from their followers.
    pub async fn remove_follower(
        &self,
        uid: &UserId,
        follower_id: &UserId,
    ) -> Result<bool, RelationshipError> {
        self.unfollow(follower_id, uid).await
    }

    /// Make sure the follower-side mirror of an existing followee-side
    /// record exists.
    ///
    /// Does nothing when the followee-side record is gone (the edge was
    /// removed after the event that asked for the mirror). Returns `true` if
    /// the mirror was restored.
    pub async fn ensure_mirror(&self, edge: &FollowEdge) -> Result<bool, RelationshipError> {
        let restored = self
            .restore(edge.follower_path(), edge.following_path(), edge)
            .await?;
        if restored {
            info!(follower = %edge.follower(), followee = %edge.followee(), "Restored following mirror");
        } else {
            debug!(
                follower = %edge.follower(),
                followee = %edge.followee(),
                "Following mirror present or edge gone"
            );
        }
        Ok(restored)
    }

    /// Copy `source` onto `target` if `source` exists and `target` does not.
    ///
    /// Runs as a transaction over the read of `source`, so an unfollow
    /// committed in between forces a re-run instead of leaving a lone mirror.
    async fn restore(
        &self,
        source: DocumentPath,
        target: DocumentPath,
        edge: &FollowEdge,
    ) -> Result<bool, RelationshipError> {
        let store = self.store.as_ref();
        run_transaction(store, &self.tx_config, || {
            let source = source.clone();
            let target = target.clone();
            async move {
                let mut tx = Transaction::new();
                let Some(record) = tx.get(store, &source).await? else {
                    return Ok((tx, false));
                };
                if tx.get(store, &target).await?.is_some() {
                    return Ok((tx, false));
                }
                tx.push(WriteOp::create_if_absent(target, mirror_of(edge, record)))?;
                Ok((tx, true))
            }
        })
        .await
    }

    /// Restore every missing mirror for edges under `uid`, in both
    /// directions. Each edge is restored in its own transaction.
    pub async fn reconcile(&self, uid: &UserId) -> Result<ReconcileReport, RelationshipError> {
        let mut report = ReconcileReport::default();

        for (path, _) in self.store.list(&paths::followers(uid)).await? {
            report.followers_checked += 1;
            let Ok(edge) = UserId::new(path.id())
                .map_err(|e| e.to_string())
                .and_then(|f| FollowEdge::new(f, uid.clone()).map_err(|e| e.to_string()))
            else {
                warn!(path = %path, "Skipping malformed follower record");
                continue;
            };
            if self.restore(edge.follower_path(), edge.following_path(), &edge).await? {
                report.mirrors_restored += 1;
            }
        }

        for (path, _) in self.store.list(&paths::following(uid)).await? {
            report.following_checked += 1;
            let Ok(edge) = UserId::new(path.id())
                .map_err(|e| e.to_string())
                .and_then(|f| FollowEdge::new(uid.clone(), f).map_err(|e| e.to_string()))
            else {
                warn!(path = %path, "Skipping malformed following record");
                continue;
            };
            if self.restore(edge.following_path(), edge.follower_path(), &edge).await? {
                report.mirrors_restored += 1;
            }
        }

        info!(
            uid = %uid,
            followers = report.followers_checked,
            following = report.following_checked,
            restored = report.mirrors_restored,
            "Reconciled edge mirrors"
        );
        Ok(report)
    }
}

/// Copy of one mirror's record for the other side, with both ids set.
fn mirror_of(edge: &FollowEdge, mut record: Document) -> Document {
    record.insert("followerId".into(), json!(edge.follower().as_str()));
    record.insert("followeeId".into(), json!(edge.followee().as_str()));
    record
}

#[async_trait]
impl RelationshipReader for RelationshipStore {
    async fn follower_ids(&self, uid: &UserId) -> Result<Vec<UserId>, RelationshipError> {
        self.ids_in(&paths::followers(uid)).await
    }

    async fn following_ids(&self, uid: &UserId) -> Result<Vec<UserId>, RelationshipError> {
        self.ids_in(&paths::following(uid)).await
    }

    async fn is_following(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<bool, RelationshipError> {
        if follower == followee {
            return Ok(false);
        }
        Ok(self
            .store
            .get(&paths::follower(followee, follower))
            .await?
            .is_some())
    }
}
