//! Optimistic transaction retry loop.

use std::future::Future;

use sg_telemetry::TRANSACTION_RETRIES;
use tracing::{debug, warn};

use crate::domain::{StoreError, Transaction, TransactionConfig};
use crate::ports::DocumentStore;

/// Run `body` as a transaction, re-running it on contention.
///
/// Each attempt starts from a fresh [`Transaction`] built by `body`, which
/// returns the transaction to commit together with its result. Only
/// `StoreError::Contention` at commit time triggers another attempt; every
/// other error (including errors returned by `body`) is returned as is.
/// Because the body re-reads everything on each attempt, its writes must be
/// idempotent with respect to what it read.
pub async fn run_transaction<F, Fut, T, E>(
    store: &dyn DocumentStore,
    config: &TransactionConfig,
    mut body: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(Transaction, T), E>>,
    E: From<StoreError>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let (tx, value) = body().await?;
        let writes = tx.writes().len();

        match store.commit_transaction(tx).await {
            Ok(summary) => {
                debug!(
                    attempt,
                    writes,
                    applied = summary.applied,
                    skipped = summary.skipped,
                    "Transaction committed"
                );
                return Ok(value);
            }
            Err(StoreError::Contention { path }) if attempt < max_attempts => {
                warn!(attempt, path = %path, "Transaction contention, retrying");
                TRANSACTION_RETRIES.with_label_values(&["retried"]).inc();
                let backoff = config.base_backoff * attempt;
                if !backoff.is_zero() {
                    tokio::time::sleep(backoff).await;
                }
                attempt += 1;
            }
            Err(StoreError::Contention { path }) => {
                warn!(attempts = attempt, path = %path, "Transaction abandoned");
                TRANSACTION_RETRIES.with_label_values(&["abandoned"]).inc();
                return Err(StoreError::TooMuchContention { attempts: attempt }.into());
            }
            Err(e) => return Err(e.into()),
        }
    }
}
