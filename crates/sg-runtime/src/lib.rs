//! # Social Graph Runtime
//!
//! Wires the document store, its change feed and every trigger handler into
//! one process. The binary in `main.rs` is a thin shell around
//! [`SocialGraphRuntime`].
//!
//! ## Modular Structure
//!
//! - `container/` - configuration and service instances
//! - `wiring/` - the trigger router between the change feed and handlers
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from the environment
//! 2. Build services in dependency order (store, notifications and
//!    relationships, then follow requests and fanout)
//! 3. Start the trigger router
//! 4. Run until shutdown is signalled

pub mod container;
pub mod wiring;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

pub use container::{ConfigError, DispatcherConfig, RuntimeConfig, ServiceContainer};
pub use wiring::{InvocationOutcome, TriggerRouter};

/// The running social graph: services plus the router feeding them.
pub struct SocialGraphRuntime {
    services: Arc<ServiceContainer>,
    router: Arc<TriggerRouter>,
    router_task: parking_lot::Mutex<Option<JoinHandle<()>>>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl SocialGraphRuntime {
    /// Build the runtime from already constructed services, owned or shared.
    pub fn new(services: impl Into<Arc<ServiceContainer>>) -> Self {
        let services: Arc<ServiceContainer> = services.into();
        let router = Arc::new(TriggerRouter::new(
            services.bus.clone(),
            services.handlers(),
            services.config.dispatcher.clone(),
        ));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Self {
            services,
            router,
            router_task: parking_lot::Mutex::new(None),
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Start dispatching change events.
    ///
    /// Returns once the router is subscribed, so no write made after this
    /// call can be missed.
    pub async fn start(&self) -> Result<()> {
        let before = self.services.bus.subscriber_count();
        {
            let mut task = self.router_task.lock();
            if task.is_some() {
                warn!("Runtime already started");
                return Ok(());
            }
            *task = Some(tokio::spawn(
                Arc::clone(&self.router).run(self.shutdown_rx.clone()),
            ));
        }

        while self.services.bus.subscriber_count() == before {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        info!("Social graph runtime started");
        Ok(())
    }

    /// Stop the router and wait for it to exit.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        let task = self.router_task.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                error!("Trigger router task failed: {}", e);
            }
        }
        info!("Shutdown complete");
    }

    /// The services driven by this runtime.
    pub fn services(&self) -> Arc<ServiceContainer> {
        Arc::clone(&self.services)
    }

    /// The router, for direct dispatch.
    pub fn router(&self) -> Arc<TriggerRouter> {
        Arc::clone(&self.router)
    }
}
