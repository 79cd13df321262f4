//! Cancellation on SIGINT/SIGTERM.
//!
//! The signal handler only flips a shared flag. The process runner polls the
//! flag while a delegated tool is running and kills the child when it is set,
//! and the session checks it before starting each step.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{CoreError, CoreResult};

/// Shared cancellation flag. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(Interrupted)` once the token has been cancelled.
    pub fn check(&self) -> CoreResult<()> {
        if self.is_cancelled() {
            Err(CoreError::Interrupted)
        } else {
            Ok(())
        }
    }
}

/// Installs the process-wide SIGINT/SIGTERM handler and returns its token.
///
/// Can only be called once per process.
pub fn install_signal_handler() -> CoreResult<CancelToken> {
    let token = CancelToken::new();
    let handler_token = token.clone();
    ctrlc::set_handler(move || {
        log::warn!("Received interrupt signal, stopping");
        handler_token.cancel();
    })
    .map_err(|e| CoreError::Io(std::io::Error::other(e)))?;
    Ok(token)
}
