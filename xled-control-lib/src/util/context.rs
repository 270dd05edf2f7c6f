use std::future::Future;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::util::error::{Error, Result};

/// Caller supplied cancellation and deadline for network calls.
///
/// Clones share the same cancellation token.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        CallContext {
            cancel,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Drives `call` until it finishes, the token is cancelled or the deadline passes.
    ///
    /// The in-flight future is dropped in the latter two cases.
    pub async fn run<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            _ = deadline => Err(Error::DeadlineExceeded),
            result = call => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_passes_result_through() {
        let context = CallContext::new();
        let value = context.run(async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let context = CallContext::new();
        context.cancellation_token().cancel();
        let result: Result<()> = context.run(async { Ok(()) }).await;
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancel_aborts_pending_call() {
        let token = CancellationToken::new();
        let context = CallContext::with_cancellation(token.clone());
        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            token.cancel();
        });
        let result: Result<()> = context.run(std::future::pending()).await;
        canceller.await.unwrap();
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_exceeded() {
        let context = CallContext::new().with_deadline(Instant::now() + Duration::from_secs(1));
        let result: Result<()> = context.run(std::future::pending()).await;
        assert!(matches!(result, Err(Error::DeadlineExceeded)));
    }
}
