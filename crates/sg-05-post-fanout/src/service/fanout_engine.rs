//! Post fanout engine.
//!
//! Followers of the author are split into chunks that each commit as one
//! batch. Every chunk is attempted; a failed chunk fails the invocation so
//! redelivery rewrites it, and the chunks that already landed are skipped
//! as unchanged.

use std::sync::Arc;

use async_trait::async_trait;
use sg_01_document_store::{DocumentStore, StoreError, WriteBatch};
use sg_02_notifications::{upsert_op, NotificationDraft, NotificationKey};
use sg_03_relationships::RelationshipReader;
use sg_telemetry::{FANOUT_CHUNKS, NOTIFICATIONS_UPSERTED};
use shared_types::{Clock, Document, PostId};
use tracing::{debug, error, info, warn};

use crate::config::FanoutConfig;
use crate::domain::{chunk, is_published, publish_transition, FanoutError, FanoutReport, PostRecord};
use crate::ports::PostFanout;

/// Writes `new_post` notifications in independently committed batches.
pub struct FanoutEngine {
    store: Arc<dyn DocumentStore>,
    relationships: Arc<dyn RelationshipReader>,
    clock: Arc<dyn Clock>,
    config: FanoutConfig,
}

impl FanoutEngine {
    /// Create an engine; rejects a chunk size the store cannot commit.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        relationships: Arc<dyn RelationshipReader>,
        clock: Arc<dyn Clock>,
        config: FanoutConfig,
    ) -> Result<Self, FanoutError> {
        config.validate()?;
        Ok(Self {
            store,
            relationships,
            clock,
            config,
        })
    }

    /// A post document was created. Fans out if it was created published.
    pub async fn on_post_created(
        &self,
        post_id: &PostId,
        after: &Document,
    ) -> Result<Option<FanoutReport>, FanoutError> {
        if !is_published(Some(after)) {
            debug!(post_id = %post_id, "Created post is not published");
            return Ok(None);
        }
        let post = PostRecord::normalize(post_id.clone(), after)?;
        self.fanout(&post).await.map(Some)
    }

    /// A post document changed. Fans out only on the transition into
    /// published, so unrelated edits of a published post do nothing.
    pub async fn on_post_updated(
        &self,
        post_id: &PostId,
        before: &Document,
        after: &Document,
    ) -> Result<Option<FanoutReport>, FanoutError> {
        if !publish_transition(Some(before), after) {
            debug!(post_id = %post_id, "Post update is not a publish transition");
            return Ok(None);
        }
        let post = PostRecord::normalize(post_id.clone(), after)?;
        self.fanout(&post).await.map(Some)
    }
}

#[async_trait]
impl PostFanout for FanoutEngine {
    async fn fanout(&self, post: &PostRecord) -> Result<FanoutReport, FanoutError> {
        let followers: Vec<_> = self
            .relationships
            .follower_ids(&post.author.id)
            .await?
            .into_iter()
            .filter(|f| *f != post.author.id)
            .collect();
        let chunks = chunk(&followers, self.config.chunk_size);
        let mut report = FanoutReport::new(post.id.as_str(), followers.len(), chunks.len());

        if followers.is_empty() {
            info!(post_id = %post.id, author = %post.author.id, "No followers to notify");
            return Ok(report);
        }

        let key = NotificationKey::new_post(&post.id);
        let draft = NotificationDraft::new_post(&post.id, &post.author, post.title.as_deref());
        let now = self.clock.now();
        let mut first_error: Option<StoreError> = None;

        for (index, recipients) in chunks.into_iter().enumerate() {
            let ops = recipients
                .iter()
                .map(|recipient| upsert_op(recipient, &key, &draft, now))
                .collect();
            let committed = match WriteBatch::from_ops(ops) {
                Ok(batch) => self.store.commit(batch).await,
                Err(e) => Err(e),
            };

            match committed {
                Ok(summary) => {
                    FANOUT_CHUNKS.with_label_values(&["committed"]).inc();
                    NOTIFICATIONS_UPSERTED
                        .with_label_values(&[draft.kind.as_str()])
                        .inc_by(summary.applied as f64);
                    debug!(
                        post_id = %post.id,
                        chunk = index,
                        size = recipients.len(),
                        written = summary.applied,
                        "Chunk committed"
                    );
                    report.committed_chunks.push(index);
                    report.written += summary.applied;
                }
                Err(e) => {
                    FANOUT_CHUNKS.with_label_values(&["failed"]).inc();
                    warn!(post_id = %post.id, chunk = index, error = %e, "Chunk failed");
                    report.failed_chunks.push(index);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(source) => {
                error!(
                    post_id = %post.id,
                    failed = report.failed_chunks.len(),
                    chunks = report.chunks,
                    "Fanout incomplete"
                );
                Err(FanoutError::PartialFailure { report, source })
            }
            None => {
                info!(
                    post_id = %post.id,
                    followers = report.followers,
                    chunks = report.chunks,
                    written = report.written,
                    "Fanout complete"
                );
                Ok(report)
            }
        }
    }
}
