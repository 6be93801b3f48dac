use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use crate::error::FetchError;

/// Supersede token threaded through one resolution.
///
/// A new selection cancels the token of the previous one. Fetches wrapped in
/// [`ResolutionToken::run`] are dropped as soon as the token is cancelled,
/// which aborts the underlying request, and resolve to
/// [`FetchError::Cancelled`].
#[derive(Debug, Clone)]
pub struct ResolutionToken {
    state: Arc<watch::Sender<bool>>,
}

impl ResolutionToken {
    pub fn new() -> Self {
        let (state, _) = watch::channel(false);
        Self {
            state: Arc::new(state),
        }
    }

    /// Mark the token cancelled. Idempotent.
    pub fn cancel(&self) {
        self.state.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.state.borrow()
    }

    /// Completes once the token is cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives as long as `self`, so this only returns on cancel.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Drive `fetch` unless the token is cancelled first.
    pub async fn run<T, F>(&self, fetch: F) -> Result<T, FetchError>
    where
        F: Future<Output = Result<T, FetchError>>,
    {
        if self.is_cancelled() {
            return Err(FetchError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(FetchError::Cancelled),
            result = fetch => result,
        }
    }

    /// Whether two handles refer to the same resolution.
    pub fn same_as(&self, other: &ResolutionToken) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl Default for ResolutionToken {
    fn default() -> Self {
        Self::new()
    }
}
