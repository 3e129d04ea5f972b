//! Holder for the token of the current login.
//!
//! The holder is owned by the caller and passed by reference to every proxy
//! operation that needs it, so a GUI, a web controller and a test can each
//! keep their own. The slot sits behind a mutex because UI callbacks may race
//! a logout against an in-flight token-scoped call.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::types::Token;

#[derive(Debug, Default)]
pub struct SessionHolder {
    slot: Mutex<Option<Token>>,
}

impl SessionHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the token issued by a successful login.
    pub fn set(&self, token: Token) {
        *self.lock() = Some(token);
    }

    /// Drop the held token, returning it if there was one.
    pub fn clear(&self) -> Option<Token> {
        self.lock().take()
    }

    /// Drop the held token only if it is still `expected`.
    ///
    /// A call that resolves after a newer login must not discard the
    /// newer token.
    pub fn clear_if(&self, expected: &Token) -> bool {
        let mut slot = self.lock();
        if slot.as_ref() == Some(expected) {
            *slot = None;
            true
        } else {
            false
        }
    }

    /// Snapshot of the held token.
    pub fn current(&self) -> Option<Token> {
        self.lock().clone()
    }

    pub fn is_active(&self) -> bool {
        self.lock().is_some()
    }

    // A panic while holding the lock cannot leave the slot half-written.
    fn lock(&self) -> MutexGuard<'_, Option<Token>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
