//! Cooperative cancellation for benchmark runs
//!
//! SIGINT only flips a [`CancellationToken`]. The run loop polls the token
//! while waiting on the benchmarked command and between runs, kills the
//! in-flight child, and returns what it has collected.

use crate::error::{BenchError, Result};
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::ffi::c_int;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Shared cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Safe to call from a signal handler.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Token flipped by the SIGINT handler
static INTERRUPT_TOKEN: OnceLock<CancellationToken> = OnceLock::new();

extern "C" fn handle_sigint(_signal: c_int) {
    if let Some(token) = INTERRUPT_TOKEN.get() {
        token.cancel();
    }
}

/// Route SIGINT to a cancellation token and return that token.
///
/// Calling this more than once returns clones of the same token.
pub fn install_interrupt_handler() -> Result<CancellationToken> {
    let token = INTERRUPT_TOKEN.get_or_init(CancellationToken::new).clone();

    let action = SigAction::new(
        SigHandler::Handler(handle_sigint),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    // SAFETY: the handler only performs an atomic load and an atomic store.
    unsafe { sigaction(Signal::SIGINT, &action) }
        .map_err(|errno| BenchError::io("installing SIGINT handler", errno.into()))?;

    tracing::debug!("SIGINT handler installed");
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_starts_clear() {
        assert!(!CancellationToken::new().is_cancelled());
    }

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_install_returns_same_token() {
        let first = install_interrupt_handler().unwrap();
        let second = install_interrupt_handler().unwrap();
        assert!(!first.is_cancelled());
        // Deliver the signal to ourselves; the handler must not kill the test binary.
        nix::sys::signal::raise(Signal::SIGINT).unwrap();
        assert!(second.is_cancelled());
    }
}
