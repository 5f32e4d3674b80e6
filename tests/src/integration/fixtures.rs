//! # Test Fixtures
//!
//! A [`Harness`] owns the full service container on a manual clock, so
//! scenarios exercise the same wiring as the runtime binary.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use sg_01_document_store::{DocumentStore, WriteOp};
use sg_03_relationships::{EdgeSource, FollowEdge};
use sg_runtime::{RuntimeConfig, ServiceContainer, SocialGraphRuntime};
use shared_types::{paths, Clock, Document, DocumentPath, ManualClock, PostId, UserId};

pub fn uid(raw: &str) -> UserId {
    UserId::new(raw).expect("valid user id")
}

pub fn pid(raw: &str) -> PostId {
    PostId::new(raw).expect("valid post id")
}

pub fn path(raw: &str) -> DocumentPath {
    DocumentPath::parse(raw).expect("valid path")
}

pub fn object(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// A post document as the authoring screens write it.
pub fn post(author: &str, status: &str) -> Document {
    object(json!({
        "authorId": author,
        "authorName": format!("{author} Name"),
        "authorRole": "student",
        "title": "Studying in Lisbon",
        "status": status,
    }))
}

/// Full service container on a manual clock.
pub struct Harness {
    pub services: Arc<ServiceContainer>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::for_testing())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        let clock = Arc::new(ManualClock::default());
        let dyn_clock: Arc<dyn Clock> = clock.clone();
        let services = ServiceContainer::with_clock(config, dyn_clock).expect("services build");
        Self {
            services: Arc::new(services),
            clock,
        }
    }

    /// The harness services driven by a started router.
    pub async fn started() -> (Self, SocialGraphRuntime) {
        let clock = Arc::new(ManualClock::default());
        let dyn_clock: Arc<dyn Clock> = clock.clone();
        let services = ServiceContainer::with_clock(RuntimeConfig::for_testing(), dyn_clock)
            .expect("services build");
        let runtime = SocialGraphRuntime::new(services);
        runtime.start().await.expect("runtime starts");
        let harness = Self {
            services: runtime.services(),
            clock,
        };
        (harness, runtime)
    }

    /// Materialize `follower -> followee` directly.
    pub async fn connect(&self, follower: &str, followee: &str) {
        let edge = FollowEdge::new(uid(follower), uid(followee)).expect("distinct users");
        self.services
            .relationships
            .create_pair(&edge, EdgeSource::Direct)
            .await
            .expect("edge pair written");
    }

    /// Merge `fields` into the document at `raw`, as a client would.
    pub async fn write(&self, raw: &str, fields: Document) {
        self.services
            .store
            .apply(WriteOp::upsert(path(raw), fields))
            .await
            .expect("client write");
    }

    pub async fn doc(&self, raw: &str) -> Option<Document> {
        self.services.store.get(&path(raw)).await.expect("store read")
    }

    pub async fn exists(&self, raw: &str) -> bool {
        self.doc(raw).await.is_some()
    }

    /// Ids of the documents in `users/{uid}/notifications`.
    pub async fn notification_ids(&self, user: &str) -> Vec<String> {
        self.services
            .store
            .list(&paths::notifications(&uid(user)))
            .await
            .expect("store list")
            .into_iter()
            .map(|(p, _)| p.id().to_string())
            .collect()
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// Poll `check` until it returns `true` or five seconds pass.
pub async fn eventually<F, Fut>(what: &str, mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..500 {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {what}");
}
