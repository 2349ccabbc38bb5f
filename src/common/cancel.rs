use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::error::{Error, Result};

/// Cooperative cancellation flag shared between a caller and a running engine.
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self { Self::default() }

    /// Request cancellation; engines stop at their next checkpoint.
    pub fn cancel(&self) { self.0.store(true, Ordering::Relaxed) }

    #[inline] pub fn is_cancelled(&self) -> bool { self.0.load(Ordering::Relaxed) }

    /// Checkpoint: `Err(Cancelled)` if a token is present and cancelled.
    #[inline]
    pub(crate) fn check(token: Option<&CancelToken>) -> Result<()> {
        match token {
            Some(token) if token.is_cancelled() => Err(Error::Cancelled),
            _ => Ok(()),
        }
    }
}
