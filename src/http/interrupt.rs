//! Interruptible blocking waits.
//!
//! An [`Interrupt`] is shared between the thread running an exchange and
//! whoever may need to cancel it (the engine bridge, tests). Interrupting sets
//! a flag and wakes any waiter; a wait that observes the flag clears it and
//! reports [`Interrupted`], so one interrupt cancels one wait.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

use thiserror::Error;

/// The wait was cut short by [`Interrupt::interrupt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("blocking wait was interrupted")]
pub struct Interrupted;

/// Cloneable interruption handle.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    state: Arc<(Mutex<bool>, Condvar)>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag and wake a blocked [`sleep`](Self::sleep).
    pub fn interrupt(&self) {
        let (flag, cvar) = &*self.state;
        *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();
    }

    pub fn is_interrupted(&self) -> bool {
        *self.state.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block the current thread for `duration`.
    ///
    /// Returns immediately with [`Interrupted`] if the flag is already raised.
    pub fn sleep(&self, duration: Duration) -> Result<(), Interrupted> {
        let (flag, cvar) = &*self.state;
        let guard = flag.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut raised, _) = cvar
            .wait_timeout_while(guard, duration, |raised| !*raised)
            .unwrap_or_else(PoisonError::into_inner);
        if *raised {
            *raised = false;
            Err(Interrupted)
        } else {
            Ok(())
        }
    }
}
