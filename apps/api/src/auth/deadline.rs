use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::auth::store::StoreError;

/// One time budget shared by every store call of a single workflow run.
///
/// When the budget runs out the pending call is dropped (cancelling it) and
/// reported as `StoreError::Unavailable`.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
        }
    }

    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub async fn run<F, T, E>(&self, call: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<StoreError>,
    {
        match tokio::time::timeout_at(self.at, call).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Unavailable("credential store deadline exceeded".to_string()).into()),
        }
    }
}
