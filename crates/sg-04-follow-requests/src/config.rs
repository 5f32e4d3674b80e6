//! # Follow Request Configuration

use std::time::Duration;

use sg_01_document_store::TransactionConfig;

/// Follow request machine configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FollowConfig {
    /// Retry policy of the accept/decline transaction.
    pub transaction: TransactionConfig,

    /// Attempts for the best-effort notification after a committed
    /// transition. Independent of the transaction's attempts.
    pub notification_attempts: u32,

    /// Delay between notification attempts.
    pub notification_backoff: Duration,
}

impl Default for FollowConfig {
    fn default() -> Self {
        Self {
            transaction: TransactionConfig::default(),
            notification_attempts: 3,
            notification_backoff: Duration::from_millis(50),
        }
    }
}

impl FollowConfig {
    /// Create a config for testing (no delays).
    pub fn for_testing() -> Self {
        Self {
            transaction: TransactionConfig::for_testing(),
            notification_attempts: 2,
            notification_backoff: Duration::ZERO,
        }
    }
}
