//! Inbound port. The periodic trigger calls into the application.

use crate::domain::PassOutcome;

/// Scan trigger: an external tick invokes one scan-and-dispatch pass.
///
/// Never returns an error; failures inside the pass are reported, not propagated.
#[async_trait::async_trait]
pub trait ScanTrigger: Send + Sync {
    async fn run_scan(&self) -> PassOutcome;
}
