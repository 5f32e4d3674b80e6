//! # Service Instances

use std::sync::Arc;

use anyhow::{Context, Result};
use sg_01_document_store::InMemoryDocumentStore;
use sg_02_notifications::NotificationService;
use sg_03_relationships::RelationshipStore;
use sg_04_follow_requests::FollowRequestMachine;
use sg_05_post_fanout::FanoutEngine;
use shared_bus::{InMemoryEventBus, TriggerHandler};
use shared_types::{Clock, SystemClock};
use tracing::info;

use super::config::RuntimeConfig;
use crate::wiring::TriggerRouter;

/// Every service of the social graph, sharing one store and one bus.
pub struct ServiceContainer {
    pub config: RuntimeConfig,
    pub bus: Arc<InMemoryEventBus>,
    pub store: Arc<InMemoryDocumentStore>,
    pub clock: Arc<dyn Clock>,
    pub notifications: Arc<NotificationService>,
    pub relationships: Arc<RelationshipStore>,
    pub follow: Arc<FollowRequestMachine>,
    pub fanout: Arc<FanoutEngine>,
}

impl ServiceContainer {
    /// Build all services with the system clock.
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Build all services with `clock`.
    pub fn with_clock(config: RuntimeConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate().context("Invalid runtime configuration")?;

        let bus = Arc::new(InMemoryEventBus::with_capacity(config.bus_capacity));
        let store = Arc::new(
            InMemoryDocumentStore::new()
                .with_clock(clock.clone())
                .with_change_feed(bus.clone())
                .with_feed_filter(TriggerRouter::trigger_filter()),
        );

        let notifications = Arc::new(
            NotificationService::new(store.clone(), clock.clone())
                .with_transaction_config(config.follow.transaction.clone()),
        );
        let relationships = Arc::new(
            RelationshipStore::new(store.clone(), clock.clone())
                .with_transaction_config(config.follow.transaction.clone()),
        );

        let follow = Arc::new(FollowRequestMachine::new(
            store.clone(),
            relationships.clone(),
            notifications.clone(),
            clock.clone(),
            config.follow.clone(),
        ));
        let fanout = Arc::new(
            FanoutEngine::new(
                store.clone(),
                relationships.clone(),
                clock.clone(),
                config.fanout.clone(),
            )
            .context("Failed to build fanout engine")?,
        );

        info!(
            chunk_size = config.fanout.chunk_size,
            tx_attempts = config.follow.transaction.max_attempts,
            "Services initialized"
        );

        Ok(Self {
            config,
            bus,
            store,
            clock,
            notifications,
            relationships,
            follow,
            fanout,
        })
    }

    /// Every trigger handler, for the router.
    pub fn handlers(&self) -> Vec<Arc<dyn TriggerHandler>> {
        let mut handlers = sg_04_follow_requests::triggers(self.follow.clone());
        handlers.extend(sg_05_post_fanout::triggers(self.fanout.clone()));
        handlers
    }
}
