//! Notification store service.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use sg_01_document_store::{
    decode, run_transaction, DocumentStore, Transaction, TransactionConfig, WriteBatch, WriteOp,
    MAX_BATCH_WRITES,
};
use shared_types::{paths, Clock, Document, DocumentPath, UserId};
use tracing::{debug, info, warn};

use crate::domain::{upsert_op, Notification, NotificationDraft, NotificationError, NotificationKey};
use crate::ports::UpsertByKey;

/// Writes notifications for senders and serves recipient-side reads and
/// state changes.
pub struct NotificationService {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    tx_config: TransactionConfig,
}

impl NotificationService {
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

    fn path(recipient: &UserId, key: &NotificationKey) -> DocumentPath {
        paths::notifications(recipient).doc(key.as_str())
    }

    /// Read one notification.
    pub async fn get(
        &self,
        recipient: &UserId,
        key: &NotificationKey,
    ) -> Result<Option<Notification>, NotificationError> {
        let path = Self::path(recipient, key);
        match self.store.get(&path).await? {
            Some(doc) => {
                let mut notification: Notification = decode(&path, doc)?;
                notification.id = key.to_string();
                Ok(Some(notification))
            }
            None => Ok(None),
        }
    }

    /// All notifications of `recipient`, newest first.
    pub async fn list(&self, recipient: &UserId) -> Result<Vec<Notification>, NotificationError> {
        let docs = self.store.list(&paths::notifications(recipient)).await?;
        let mut notifications = Vec::with_capacity(docs.len());
        for (path, doc) in docs {
            match decode::<Notification>(&path, doc) {
                Ok(mut notification) => {
                    notification.id = path.id().to_string();
                    notifications.push(notification);
                }
                Err(e) => warn!(path = %path, error = %e, "Skipping malformed notification"),
            }
        }
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(notifications)
    }

    /// Number of notifications `recipient` has not seen yet.
    pub async fn unseen_count(&self, recipient: &UserId) -> Result<usize, NotificationError> {
        let docs = self.store.list(&paths::notifications(recipient)).await?;
        Ok(docs.iter().filter(|(_, doc)| !is_seen(doc)).count())
    }

    /// Mark one notification seen. Returns `false` if it does not exist.
    pub async fn mark_seen(
        &self,
        recipient: &UserId,
        key: &NotificationKey,
    ) -> Result<bool, NotificationError> {
        self.update_if_present(Self::path(recipient, key), |_| {
            let mut fields = Document::new();
            fields.insert("seen".into(), json!(true));
            fields
        })
        .await
    }

    /// Mark one notification read. The first read time is kept.
    pub async fn mark_read(
        &self,
        recipient: &UserId,
        key: &NotificationKey,
    ) -> Result<bool, NotificationError> {
        let now = self.clock.now();
        self.update_if_present(Self::path(recipient, key), |current| {
            let mut fields = Document::new();
            fields.insert("seen".into(), json!(true));
            if current.get("readAt").map_or(true, Value::is_null) {
                fields.insert("readAt".into(), json!(now));
            }
            fields
        })
        .await
    }

    /// Mark every unseen notification of `recipient` seen.
    ///
    /// Returns how many were changed.
    pub async fn mark_all_seen(&self, recipient: &UserId) -> Result<usize, NotificationError> {
        let docs = self.store.list(&paths::notifications(recipient)).await?;
        let unseen: Vec<DocumentPath> = docs
            .into_iter()
            .filter(|(_, doc)| !is_seen(doc))
            .map(|(path, _)| path)
            .collect();

        let mut changed = 0;
        for chunk in unseen.chunks(MAX_BATCH_WRITES) {
            let mut fields = Document::new();
            fields.insert("seen".into(), json!(true));
            let ops = chunk
                .iter()
                .map(|path| WriteOp::upsert(path.clone(), fields.clone()))
                .collect();
            changed += self.store.commit(WriteBatch::from_ops(ops)?).await?.applied;
        }

        info!(recipient = %recipient, changed, "Marked notifications seen");
        Ok(changed)
    }

    async fn update_if_present<F>(&self, path: DocumentPath, fields_for: F) -> Result<bool, NotificationError>
    where
        F: Fn(&Document) -> Document + Sync,
    {
        let store = self.store.as_ref();
        let fields_for = &fields_for;
        run_transaction(store, &self.tx_config, || {
            let path = path.clone();
            async move {
                let mut tx = Transaction::new();
                let Some(current) = tx.get(store, &path).await? else {
                    return Ok((tx, false));
                };
                let fields = fields_for(&current);
                tx.push(WriteOp::upsert(path, fields))?;
                Ok((tx, true))
            }
        })
        .await
    }
}

fn is_seen(doc: &Document) -> bool {
    doc.get("seen").and_then(Value::as_bool).unwrap_or(false)
}

#[async_trait]
impl UpsertByKey for NotificationService {
    async fn upsert_by_key(
        &self,
        recipient: &UserId,
        key: &NotificationKey,
        draft: &NotificationDraft,
    ) -> Result<(), NotificationError> {
        let op = upsert_op(recipient, key, draft, self.clock.now());
        let summary = self.store.apply(op).await?;
        debug!(
            recipient = %recipient,
            key = %key,
            kind = %draft.kind,
            changed = summary.applied > 0,
            "Notification upserted"
        );
        Ok(())
    }
}
