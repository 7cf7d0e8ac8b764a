//! Error taxonomy for the lifecycle engine.
//!
//! Every engine operation returns [`EngineError`]. The variants carry enough
//! structure for a caller to tell "never happened, fix the input and retry"
//! apart from "lost a race, re-read and re-decide" and "infrastructure
//! hiccup, retry the whole operation". The outer API layer translates these
//! into localized messages; the engine never formats user-facing text.

use crate::entities::{BidStatus, TaskStatus};
use crate::ids::{TaskId, UserId};
use crate::money::{Money, MoneyError};
use thiserror::Error;

/// Coarse classification of an [`EngineError`], for callers that only need
/// the class (e.g. to pick an HTTP status).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or out-of-range input. The operation never happened.
    Validation,
    /// The acting user may not perform this operation.
    Unauthorized,
    /// The operation is not legal in the current task/bid state.
    InvalidState,
    /// The debit would overdraw the balance. Business rule, not a bug.
    InsufficientBalance,
    /// Lost a concurrency race. Re-read the state and re-decide; do not
    /// blindly retry the write.
    Conflict,
    /// The referenced entity does not exist.
    NotFound,
    /// Bounded wait expired before the operation began. Nothing was
    /// written; the whole operation is safe to retry.
    Timeout,
}

/// Error type returned by every engine operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Bad input shape or amount.
    #[error("validation failed: {reason}")]
    Validation {
        /// Machine-readable reason.
        reason: String,
    },

    /// The actor is not the client/tasker the operation requires.
    #[error("user {actor} is not authorized to {action}")]
    Unauthorized {
        /// The acting user.
        actor: UserId,
        /// The attempted action, machine-readable.
        action: &'static str,
    },

    /// The current status does not permit the attempted transition.
    #[error("cannot apply '{event}' while task is {from}")]
    InvalidTransition {
        /// Status at the time of the attempt.
        from: TaskStatus,
        /// The attempted event, machine-readable.
        event: &'static str,
    },

    /// The operation requires the task to be in a specific status.
    #[error("task is {actual}, expected {expected}")]
    InvalidState {
        /// Required status.
        expected: TaskStatus,
        /// Observed status.
        actual: TaskStatus,
    },

    /// Bids are only possible (and only acceptable) while the task is open.
    #[error("task is {status}, not open")]
    TaskNotOpen {
        /// Observed status.
        status: TaskStatus,
    },

    /// The (task, tasker) pair already has a bid.
    #[error("tasker {tasker} already bid on task {task}")]
    DuplicateBid {
        /// The task.
        task: TaskId,
        /// The tasker who already bid.
        tasker: UserId,
    },

    /// Only a pending bid can be accepted.
    #[error("bid is {status:?}, not pending")]
    BidNotPending {
        /// Observed bid status.
        status: BidStatus,
    },

    /// No accepted bid exists for the task. Unreachable while the
    /// acceptance invariants hold.
    #[error("task {task} has no accepted bid")]
    NoAcceptedBid {
        /// The task.
        task: TaskId,
    },

    /// The debit would take the balance below zero.
    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        /// Amount the debit needed.
        required: Money,
        /// Balance at the time of the check.
        available: Money,
    },

    /// Lost a concurrency race (e.g. optimistic version mismatch).
    #[error("conflict: {reason}")]
    Conflict {
        /// Machine-readable reason.
        reason: String,
    },

    /// The referenced entity does not exist.
    #[error("{what} not found")]
    NotFound {
        /// What was looked up ("task", "bid", "profile", ...).
        what: &'static str,
    },

    /// Bounded lock/statement wait expired before any write happened.
    #[error("operation '{operation}' timed out before starting")]
    Timeout {
        /// The operation that timed out, machine-readable.
        operation: &'static str,
    },
}

impl EngineError {
    /// The coarse class of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::InvalidTransition { .. }
            | Self::InvalidState { .. }
            | Self::TaskNotOpen { .. }
            | Self::DuplicateBid { .. }
            | Self::BidNotPending { .. }
            | Self::NoAcceptedBid { .. } => ErrorKind::InvalidState,
            Self::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Timeout { .. } => ErrorKind::Timeout,
        }
    }

    /// True when the whole operation can be retried as-is. Only timeouts
    /// qualify: nothing was written, and the precondition may still hold.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Timeout)
    }
}

impl From<MoneyError> for EngineError {
    fn from(err: MoneyError) -> Self {
        Self::Validation {
            reason: err.to_string(),
        }
    }
}
