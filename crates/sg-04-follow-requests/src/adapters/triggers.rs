//! Trigger adapters: document-change events to state machine calls.

use std::sync::Arc;

use async_trait::async_trait;
use shared_bus::{ChangeKind, DocumentEvent, HandlerError, TriggerHandler};
use shared_types::{paths, Document, UserId};
use tracing::debug;

use crate::domain::FollowError;
use crate::service::FollowRequestMachine;

fn to_handler_error(e: FollowError) -> HandlerError {
    if e.is_retryable() {
        HandlerError::Transient(e.to_string())
    } else {
        HandlerError::Malformed(e.to_string())
    }
}

/// Extract the two user ids captured by `pattern` (document owner first).
fn captured_ids(event: &DocumentEvent, pattern: &str) -> Result<(UserId, UserId), HandlerError> {
    let captures = event
        .path
        .match_pattern(pattern)
        .ok_or_else(|| HandlerError::Malformed(format!("{} does not match {pattern}", event.path)))?;
    let [owner, other] = captures.as_slice() else {
        return Err(HandlerError::Malformed(format!("unexpected captures for {}", event.path)));
    };
    let parse = |raw: &str| UserId::new(raw).map_err(|e| HandlerError::Malformed(e.to_string()));
    Ok((parse(*owner)?, parse(*other)?))
}

fn image<'a>(image: &'a Option<Document>, event: &DocumentEvent, which: &str) -> Result<&'a Document, HandlerError> {
    image
        .as_ref()
        .ok_or_else(|| HandlerError::Malformed(format!("{} event without {which} image", event.path)))
}

/// `users/{followeeId}/follow_requests/{followerId}` created.
pub struct RequestCreatedTrigger {
    machine: Arc<FollowRequestMachine>,
}

impl RequestCreatedTrigger {
    pub fn new(machine: Arc<FollowRequestMachine>) -> Self {
        Self { machine }
    }
}

#[async_trait]
impl TriggerHandler for RequestCreatedTrigger {
    fn name(&self) -> &'static str {
        "follow_request_created"
    }

    fn pattern(&self) -> &'static str {
        paths::FOLLOW_REQUEST_PATTERN
    }

    fn kinds(&self) -> &'static [ChangeKind] {
        &[ChangeKind::Created]
    }

    async fn handle(&self, event: &DocumentEvent) -> Result<(), HandlerError> {
        let (followee, follower) = captured_ids(event, self.pattern())?;
        let after = image(&event.after, event, "after")?;
        let delivery = self
            .machine
            .on_request_created(&followee, &follower, after)
            .await
            .map_err(to_handler_error)?;
        debug!(follower = %follower, followee = %followee, ?delivery, "Request created handled");
        Ok(())
    }
}

/// `users/{followeeId}/follow_requests/{followerId}` updated.
pub struct RequestUpdatedTrigger {
    machine: Arc<FollowRequestMachine>,
}

impl RequestUpdatedTrigger {
    pub fn new(machine: Arc<FollowRequestMachine>) -> Self {
        Self { machine }
    }
}

#[async_trait]
impl TriggerHandler for RequestUpdatedTrigger {
    fn name(&self) -> &'static str {
        "follow_request_updated"
    }

    fn pattern(&self) -> &'static str {
        paths::FOLLOW_REQUEST_PATTERN
    }

    fn kinds(&self) -> &'static [ChangeKind] {
        &[ChangeKind::Updated]
    }

    async fn handle(&self, event: &DocumentEvent) -> Result<(), HandlerError> {
        let (followee, follower) = captured_ids(event, self.pattern())?;
        let before = image(&event.before, event, "before")?;
        let after = image(&event.after, event, "after")?;
        let transition = self
            .machine
            .on_request_updated(&followee, &follower, before, after)
            .await
            .map_err(to_handler_error)?;
        debug!(follower = %follower, followee = %followee, ?transition, "Request update handled");
        Ok(())
    }
}

/// `users/{followeeId}/follow_requests/{followerId}` deleted.
pub struct RequestDeletedTrigger {
    machine: Arc<FollowRequestMachine>,
}

impl RequestDeletedTrigger {
    pub fn new(machine: Arc<FollowRequestMachine>) -> Self {
        Self { machine }
    }
}

#[async_trait]
impl TriggerHandler for RequestDeletedTrigger {
    fn name(&self) -> &'static str {
        "follow_request_deleted"
    }

    fn pattern(&self) -> &'static str {
        paths::FOLLOW_REQUEST_PATTERN
    }

    fn kinds(&self) -> &'static [ChangeKind] {
        &[ChangeKind::Deleted]
    }

    async fn handle(&self, event: &DocumentEvent) -> Result<(), HandlerError> {
        let (followee, follower) = captured_ids(event, self.pattern())?;
        let removed = self
            .machine
            .on_request_deleted(&followee, &follower)
            .await
            .map_err(to_handler_error)?;
        debug!(follower = %follower, followee = %followee, mirror_removed = removed, "Request deletion handled");
        Ok(())
    }
}

/// `users/{uid}/followers/{followerId}` created.
pub struct FollowerCreatedTrigger {
    machine: Arc<FollowRequestMachine>,
}

impl FollowerCreatedTrigger {
    pub fn new(machine: Arc<FollowRequestMachine>) -> Self {
        Self { machine }
    }
}

#[async_trait]
impl TriggerHandler for FollowerCreatedTrigger {
    fn name(&self) -> &'static str {
        "follower_created"
    }

    fn pattern(&self) -> &'static str {
        paths::FOLLOWER_PATTERN
    }

    fn kinds(&self) -> &'static [ChangeKind] {
        &[ChangeKind::Created]
    }

    async fn handle(&self, event: &DocumentEvent) -> Result<(), HandlerError> {
        let (followee, follower) = captured_ids(event, self.pattern())?;
        let after = image(&event.after, event, "after")?;
        let outcome = self
            .machine
            .on_follower_created(&followee, &follower, after)
            .await
            .map_err(to_handler_error)?;
        debug!(follower = %follower, followee = %followee, ?outcome, "Follower creation handled");
        Ok(())
    }
}

/// All follow triggers over one machine.
pub fn triggers(machine: Arc<FollowRequestMachine>) -> Vec<Arc<dyn TriggerHandler>> {
    vec![
        Arc::new(RequestCreatedTrigger::new(machine.clone())),
        Arc::new(RequestUpdatedTrigger::new(machine.clone())),
        Arc::new(RequestDeletedTrigger::new(machine.clone())),
        Arc::new(FollowerCreatedTrigger::new(machine)),
    ]
}
