//! Throttle for externally triggered view transitions.
//!
//! The gate is a narrow mutual-exclusion flag on wall-clock time, not a
//! general lock: it can only be tried, released, or left to expire. Blocking
//! style operations are rejected.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// How long an unreleased gate stays held.
pub const UNLOCK_TIMEOUT: Duration = Duration::from_millis(200);

/// Gate operation that is not supported.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    #[error("view switch gate does not support `{operation}`")]
    Unsupported { operation: &'static str },
}

/// Non-blocking, self-expiring gate.
#[derive(Debug)]
pub struct ViewSwitchGate {
    acquired_at: Mutex<Option<Instant>>,
    timeout: Duration,
}

impl Default for ViewSwitchGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewSwitchGate {
    /// A free gate expiring after [`UNLOCK_TIMEOUT`].
    pub fn new() -> Self {
        Self::with_timeout(UNLOCK_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        ViewSwitchGate {
            acquired_at: Mutex::new(None),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Take the gate if it is free or its previous hold has expired.
    ///
    /// Never blocks.
    pub fn try_acquire(&self) -> bool {
        let mut acquired_at = self.acquired_at.lock();
        let now = Instant::now();
        if acquired_at.is_some_and(|since| now.duration_since(since) < self.timeout) {
            tracing::trace!("view switch gate busy");
            return false;
        }
        *acquired_at = Some(now);
        true
    }

    /// Free the gate before its timeout.
    pub fn release(&self) {
        *self.acquired_at.lock() = None;
    }

    /// Whether the gate is currently held and unexpired.
    pub fn is_held(&self) -> bool {
        self.acquired_at
            .lock()
            .is_some_and(|since| since.elapsed() < self.timeout)
    }

    pub fn lock(&self) -> Result<(), GateError> {
        Err(GateError::Unsupported { operation: "lock" })
    }

    pub fn lock_interruptibly(&self) -> Result<(), GateError> {
        Err(GateError::Unsupported {
            operation: "lock_interruptibly",
        })
    }

    pub fn new_condition(&self) -> Result<(), GateError> {
        Err(GateError::Unsupported {
            operation: "new_condition",
        })
    }

    pub fn try_acquire_for(&self, _wait: Duration) -> Result<bool, GateError> {
        Err(GateError::Unsupported {
            operation: "try_acquire_for",
        })
    }
}
