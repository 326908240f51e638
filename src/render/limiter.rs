//! Token pool bounding simultaneous browser sessions.

use crate::error::RenderError;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Fixed-size pool of render tokens.
///
/// Cloning shares the pool. Waiters are served in FIFO order.
#[derive(Debug, Clone)]
pub struct RenderLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// Permission to run one browser session. Returned to the pool on drop.
#[derive(Debug)]
pub struct RenderToken {
    _permit: OwnedSemaphorePermit,
}

impl RenderLimiter {
    /// Create a pool with `capacity` tokens (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Wait until a token is free and take it.
    pub async fn acquire(&self) -> Result<RenderToken, RenderError> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| RenderError::Unavailable("render pool closed".into()))?;
        Ok(RenderToken { _permit: permit })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Tokens not currently held.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn in_use(&self) -> usize {
        self.capacity - self.available()
    }
}
