//! Cancellable execution context for storage calls.
//!
//! Every repository operation runs its storage future through
//! [`Context::run`], which drops the in-flight call as soon as the context
//! is cancelled or its deadline passes.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, AppResult};

/// Why an operation stopped before the storage engine answered
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    #[error("operation cancelled")]
    Cancelled,

    #[error("operation deadline exceeded")]
    DeadlineExceeded,
}

/// Caller-supplied cancellation signal and optional deadline.
///
/// Children created with [`Context::with_timeout`] or
/// [`Context::with_deadline`] are cancelled together with their parent and
/// never outlive the parent's deadline.
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never cancelled and has no deadline
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a child context expiring after `timeout`.
    ///
    /// A timeout too large to represent adds no deadline of its own.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self.child(),
        }
    }

    /// Derive a child context expiring at `deadline`
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        };

        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    /// Child sharing this context's deadline and cancellation
    fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Cancel this context and every context derived from it
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Drive `fut` to completion unless the context is cancelled or expires first.
    ///
    /// Interruption drops `fut`, aborting the storage call, and surfaces as a
    /// persistence failure. Errors from `fut` are normalized through `Into<AppError>`.
    pub async fn run<F, T, E>(&self, fut: F) -> AppResult<T>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<AppError>,
    {
        if self.token.is_cancelled() {
            return Err(Interrupted::Cancelled.into());
        }
        if self.deadline.is_some_and(|at| at <= Instant::now()) {
            return Err(Interrupted::DeadlineExceeded.into());
        }

        let expiry = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(Interrupted::Cancelled.into()),
            _ = expiry => Err(Interrupted::DeadlineExceeded.into()),
            result = fut => result.map_err(Into::into),
        }
    }
}
