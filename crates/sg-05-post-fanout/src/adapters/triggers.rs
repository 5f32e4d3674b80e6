//! Trigger adapters: `posts/{postId}` events to the fanout engine.

use std::sync::Arc;

use async_trait::async_trait;
use shared_bus::{ChangeKind, DocumentEvent, HandlerError, TriggerHandler};
use shared_types::{paths, Document, PostId};
use tracing::debug;

use crate::domain::FanoutError;
use crate::service::FanoutEngine;

fn to_handler_error(e: FanoutError) -> HandlerError {
    if e.is_retryable() {
        HandlerError::Transient(e.to_string())
    } else {
        HandlerError::Malformed(e.to_string())
    }
}

fn post_id(event: &DocumentEvent) -> Result<PostId, HandlerError> {
    match event.path.match_pattern(paths::POST_PATTERN).as_deref() {
        Some([id]) => PostId::new(*id).map_err(|e| HandlerError::Malformed(e.to_string())),
        _ => Err(HandlerError::Malformed(format!(
            "{} is not a post document",
            event.path
        ))),
    }
}

fn image<'a>(image: &'a Option<Document>, event: &DocumentEvent, which: &str) -> Result<&'a Document, HandlerError> {
    image
        .as_ref()
        .ok_or_else(|| HandlerError::Malformed(format!("{} event without {which} image", event.path)))
}

/// `posts/{postId}` created.
pub struct PostCreatedTrigger {
    engine: Arc<FanoutEngine>,
}

impl PostCreatedTrigger {
    pub fn new(engine: Arc<FanoutEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl TriggerHandler for PostCreatedTrigger {
    fn name(&self) -> &'static str {
        "post_created"
    }

    fn pattern(&self) -> &'static str {
        paths::POST_PATTERN
    }

    fn kinds(&self) -> &'static [ChangeKind] {
        &[ChangeKind::Created]
    }

    async fn handle(&self, event: &DocumentEvent) -> Result<(), HandlerError> {
        let id = post_id(event)?;
        let after = image(&event.after, event, "after")?;
        let report = self
            .engine
            .on_post_created(&id, after)
            .await
            .map_err(to_handler_error)?;
        debug!(post_id = %id, ?report, "Post creation handled");
        Ok(())
    }
}

/// `posts/{postId}` updated.
pub struct PostUpdatedTrigger {
    engine: Arc<FanoutEngine>,
}

impl PostUpdatedTrigger {
    pub fn new(engine: Arc<FanoutEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl TriggerHandler for PostUpdatedTrigger {
    fn name(&self) -> &'static str {
        "post_updated"
    }

    fn pattern(&self) -> &'static str {
        paths::POST_PATTERN
    }

    fn kinds(&self) -> &'static [ChangeKind] {
        &[ChangeKind::Updated]
    }

    async fn handle(&self, event: &DocumentEvent) -> Result<(), HandlerError> {
        let id = post_id(event)?;
        let before = image(&event.before, event, "before")?;
        let after = image(&event.after, event, "after")?;
        let report = self
            .engine
            .on_post_updated(&id, before, after)
            .await
            .map_err(to_handler_error)?;
        debug!(post_id = %id, ?report, "Post update handled");
        Ok(())
    }
}

/// Both post triggers over one engine.
pub fn triggers(engine: Arc<FanoutEngine>) -> Vec<Arc<dyn TriggerHandler>> {
    vec![
        Arc::new(PostCreatedTrigger::new(engine.clone())),
        Arc::new(PostUpdatedTrigger::new(engine)),
    ]
}
