//! Lifecycle state machines shared by orders and payment records.

use std::fmt;

use thiserror::Error;

/// A rejected state change.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError<S> {
    /// The entity already reached a terminal state and can no longer change.
    #[error("already {0}")]
    Terminal(S),

    /// The transition is not in the table.
    #[error("cannot move from {from} to {to}")]
    NotAllowed {
        /// Current state.
        from: S,
        /// Requested state.
        to: S,
    },
}

/// An explicit state machine over an enumerated status.
pub trait Lifecycle: Copy + Eq + fmt::Display + fmt::Debug {
    /// Whether `self -> to` is listed in the transition table.
    fn allows(self, to: Self) -> bool;

    /// Whether no transition leaves this state.
    fn is_terminal(self) -> bool;

    /// Validate `self -> to`, returning the new state.
    ///
    /// # Errors
    ///
    /// - [`TransitionError::Terminal`]: `self` is terminal.
    /// - [`TransitionError::NotAllowed`]: the table has no `self -> to` entry.
    fn transition(self, to: Self) -> Result<Self, TransitionError<Self>> {
        if self.is_terminal() {
            return Err(TransitionError::Terminal(self));
        }

        if self.allows(to) {
            Ok(to)
        } else {
            Err(TransitionError::NotAllowed { from: self, to })
        }
    }
}
