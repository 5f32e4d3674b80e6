//! # Trigger Router
//!
//! Routes document-change events to every handler whose pattern and change
//! kinds match, one tokio task per (event, handler) pair.
//!
//! ## Delivery Rules
//!
//! - Each invocation runs under `handler_deadline`; a timeout counts as a
//!   transient failure.
//! - Transient failures are redelivered with linear backoff until
//!   `max_delivery_attempts`, then logged under [`DLQ_TOPIC`].
//! - Malformed input is logged and dropped without redelivery.
//! - Handlers of the same event never wait on each other.

use std::sync::Arc;

use shared_bus::{
    DocumentEvent, EventFilter, EventTopic, HandlerError, InMemoryEventBus, TriggerHandler,
    DLQ_TOPIC,
};
use sg_telemetry::{HistogramTimer, HANDLER_DURATION, HANDLER_INVOCATIONS};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::{debug, error, info, warn};

use crate::container::DispatcherConfig;

/// Final result of delivering one event to one handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationOutcome {
    /// The handler succeeded on delivery attempt `attempts`.
    Handled { attempts: u32 },
    /// The handler rejected the event as malformed.
    Rejected { reason: String },
    /// Every attempt failed.
    DeadLettered { attempts: u32, error: String },
}

/// Dispatches bus events to trigger handlers.
pub struct TriggerRouter {
    bus: Arc<InMemoryEventBus>,
    handlers: Vec<Arc<dyn TriggerHandler>>,
    config: DispatcherConfig,
}

impl TriggerRouter {
    pub fn new(
        bus: Arc<InMemoryEventBus>,
        handlers: Vec<Arc<dyn TriggerHandler>>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            bus,
            handlers,
            config,
        }
    }

    /// Topics at least one handler listens to. The store's change feed
    /// publishes nothing else.
    #[must_use]
    pub fn trigger_filter() -> EventFilter {
        EventFilter::topics(vec![
            EventTopic::Posts,
            EventTopic::Followers,
            EventTopic::FollowRequests,
        ])
    }

    /// Consume the change feed until `shutdown` flips.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut events = self.bus.event_stream(Self::trigger_filter());
        info!(handlers = self.handlers.len(), "Trigger router started");

        loop {
            tokio::select! {
                next = events.next() => match next {
                    Some(event) => {
                        self.dispatch(event);
                    }
                    None => {
                        warn!("Change feed closed");
                        break;
                    }
                },
                _ = shutdown.changed() => {
                    info!("Trigger router shutting down");
                    break;
                }
            }
        }
    }

    /// Spawn one invocation per matching handler.
    pub fn dispatch(self: &Arc<Self>, event: DocumentEvent) -> Vec<JoinHandle<InvocationOutcome>> {
        let matching: Vec<_> = self
            .handlers
            .iter()
            .filter(|h| h.accepts(&event))
            .cloned()
            .collect();
        if matching.is_empty() {
            debug!(path = %event.path, kind = ?event.kind, "No handler for event");
        }

        matching
            .into_iter()
            .map(|handler| {
                let router = Arc::clone(self);
                let event = event.clone();
                tokio::spawn(async move { router.deliver(handler, event).await })
            })
            .collect()
    }

    /// Deliver `event` to `handler`, redelivering transient failures.
    pub async fn deliver(
        &self,
        handler: Arc<dyn TriggerHandler>,
        mut event: DocumentEvent,
    ) -> InvocationOutcome {
        let name = handler.name();
        let max_attempts = self.config.max_delivery_attempts.max(1);

        loop {
            let attempt = event.delivery_attempt;
            let result = {
                let _timer = HistogramTimer::new(&HANDLER_DURATION);
                match tokio::time::timeout(self.config.handler_deadline, handler.handle(&event)).await {
                    Ok(result) => result,
                    Err(_) => Err(HandlerError::Transient(format!(
                        "deadline of {:?} exceeded",
                        self.config.handler_deadline
                    ))),
                }
            };

            match result {
                Ok(()) => {
                    HANDLER_INVOCATIONS.with_label_values(&[name, "ok"]).inc();
                    debug!(handler = name, path = %event.path, attempt, "Invocation succeeded");
                    return InvocationOutcome::Handled { attempts: attempt };
                }
                Err(HandlerError::Malformed(reason)) => {
                    HANDLER_INVOCATIONS.with_label_values(&[name, "rejected"]).inc();
                    warn!(handler = name, path = %event.path, %reason, "Malformed input dropped");
                    return InvocationOutcome::Rejected { reason };
                }
                Err(e) if attempt < max_attempts => {
                    HANDLER_INVOCATIONS.with_label_values(&[name, "redelivered"]).inc();
                    warn!(handler = name, path = %event.path, attempt, error = %e, "Invocation failed, redelivering");
                    let backoff = self.config.redelivery_backoff * attempt;
                    if !backoff.is_zero() {
                        tokio::time::sleep(backoff).await;
                    }
                    event = event.redelivery();
                }
                Err(e) => {
                    HANDLER_INVOCATIONS.with_label_values(&[name, "dead_lettered"]).inc();
                    error!(
                        topic = DLQ_TOPIC,
                        handler = name,
                        event_id = %event.event_id,
                        path = %event.path,
                        attempts = attempt,
                        error = %e,
                        "Invocation dead-lettered"
                    );
                    return InvocationOutcome::DeadLettered {
                        attempts: attempt,
                        error: e.to_string(),
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use shared_bus::{ChangeKind, EventPublisher};
    use shared_types::{paths, Document, DocumentPath};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Fails the first `failures` invocations with `error`.
    struct Flaky {
        failures: u32,
        error: HandlerError,
        calls: AtomicU32,
    }

    impl Flaky {
        fn new(failures: u32, error: HandlerError) -> Arc<Self> {
            Arc::new(Self {
                failures,
                error,
                calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl TriggerHandler for Flaky {
        fn name(&self) -> &'static str {
            "flaky"
        }

        fn pattern(&self) -> &'static str {
            paths::POST_PATTERN
        }

        fn kinds(&self) -> &'static [ChangeKind] {
            &[ChangeKind::Created]
        }

        async fn handle(&self, _event: &DocumentEvent) -> Result<(), HandlerError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(self.error.clone())
            } else {
                Ok(())
            }
        }
    }

    struct Slow;

    #[async_trait]
    impl TriggerHandler for Slow {
        fn name(&self) -> &'static str {
            "slow"
        }

        fn pattern(&self) -> &'static str {
            paths::POST_PATTERN
        }

        fn kinds(&self) -> &'static [ChangeKind] {
            &[ChangeKind::Created]
        }

        async fn handle(&self, _event: &DocumentEvent) -> Result<(), HandlerError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
    }

    fn config() -> DispatcherConfig {
        DispatcherConfig {
            handler_deadline: Duration::from_millis(50),
            max_delivery_attempts: 3,
            redelivery_backoff: Duration::ZERO,
        }
    }

    fn router(handler: Arc<dyn TriggerHandler>) -> Arc<TriggerRouter> {
        Arc::new(TriggerRouter::new(Arc::new(InMemoryEventBus::new()), vec![handler], config()))
    }

    fn post_created() -> DocumentEvent {
        DocumentEvent::created(DocumentPath::parse("posts/P1").unwrap(), Document::new(), Utc::now())
    }

    #[tokio::test]
    async fn test_transient_failure_redelivered() {
        let handler = Flaky::new(2, HandlerError::Transient("busy".into()));
        let router = router(handler.clone());

        let outcome = router.deliver(handler.clone(), post_created()).await;
        assert_eq!(outcome, InvocationOutcome::Handled { attempts: 3 });
        assert_eq!(handler.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_attempts_dead_letter() {
        let handler = Flaky::new(10, HandlerError::Transient("down".into()));
        let router = router(handler.clone());

        let outcome = router.deliver(handler.clone(), post_created()).await;
        assert!(matches!(outcome, InvocationOutcome::DeadLettered { attempts: 3, .. }));
        assert_eq!(handler.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_malformed_not_redelivered() {
        let handler = Flaky::new(10, HandlerError::Malformed("no author".into()));
        let router = router(handler.clone());

        let outcome = router.deliver(handler.clone(), post_created()).await;
        assert!(matches!(outcome, InvocationOutcome::Rejected { .. }));
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_deadline_counts_as_failure() {
        let router = router(Arc::new(Slow));
        let outcome = router.deliver(Arc::new(Slow), post_created()).await;
        assert!(matches!(outcome, InvocationOutcome::DeadLettered { attempts: 3, .. }));
    }

    #[tokio::test]
    async fn test_dispatch_only_matching_handlers() {
        let handler = Flaky::new(0, HandlerError::Transient("unused".into()));
        let router = router(handler.clone());

        let updated = DocumentEvent::updated(
            DocumentPath::parse("posts/P1").unwrap(),
            Document::new(),
            Document::new(),
            Utc::now(),
        );
        assert!(router.dispatch(updated).is_empty());

        let handles = router.dispatch(post_created());
        assert_eq!(handles.len(), 1);
        for handle in handles {
            assert_eq!(handle.await.unwrap(), InvocationOutcome::Handled { attempts: 1 });
        }
    }

    #[tokio::test]
    async fn test_run_consumes_bus_until_shutdown() {
        let bus = Arc::new(InMemoryEventBus::new());
        let handler = Flaky::new(0, HandlerError::Transient("unused".into()));
        let handlers: Vec<Arc<dyn TriggerHandler>> = vec![handler.clone()];
        let router = Arc::new(TriggerRouter::new(bus.clone(), handlers, config()));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(router.run(shutdown_rx));

        // Wait for the router's subscription before publishing.
        while bus.subscriber_count() == 0 {
            tokio::task::yield_now().await;
        }
        bus.publish(post_created()).await;

        for _ in 0..100 {
            if handler.calls.load(Ordering::SeqCst) > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);

        shutdown_tx.send(true).unwrap();
        task.await.unwrap();
    }
}
