//! Task status transitions.
//!
//! The sole authority on which status changes are legal and who may cause
//! them. Ad hoc status checks at call sites are what let the two legacy
//! surfaces drift apart; here the machine is a named enum and one function,
//! and the store is the only writer of the status field.
//!
//! ```text
//! Open ──AcceptBid (client)──────────────→ Assigned
//! Open ──Cancel (client)─────────────────→ Cancelled
//! Assigned ──RequestCompletion (tasker)──→ PendingPayment
//! PendingPayment ──Settle (client)───────→ Completed
//! Assigned | PendingPayment ──Cancel (admin)──→ Cancelled
//! ```
//!
//! Completed and Cancelled are terminal. The function is side-effect free;
//! ledger calls never happen here.

use market_types::{Actor, EngineError, Task, TaskStatus};

/// Events that can drive a task to a new status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskEvent {
    /// The client accepts a bid (arbitration resolves around this).
    AcceptBid,
    /// The assigned tasker reports the work done.
    RequestCompletion,
    /// Settlement commits the payment.
    Settle,
    /// The client (while open) or an administrator cancels the task.
    Cancel,
}

impl TaskEvent {
    /// Machine-readable name, used in error payloads.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AcceptBid => "accept_bid",
            Self::RequestCompletion => "request_completion",
            Self::Settle => "settle",
            Self::Cancel => "cancel",
        }
    }
}

/// Computes the status a task moves to under `event`, or why it cannot.
///
/// # Errors
/// - `InvalidTransition` if the current status does not permit the event
/// - `Unauthorized` if the actor is not the client/tasker the event requires
pub fn next_status(task: &Task, event: TaskEvent, actor: Actor) -> Result<TaskStatus, EngineError> {
    let denied = |action: &'static str| EngineError::Unauthorized {
        actor: actor.id,
        action,
    };
    let illegal = || EngineError::InvalidTransition {
        from: task.status,
        event: event.name(),
    };

    match (task.status, event) {
        (TaskStatus::Open, TaskEvent::AcceptBid) => {
            if actor.id != task.client_id {
                return Err(denied("accept a bid on this task"));
            }
            Ok(TaskStatus::Assigned)
        }

        (TaskStatus::Open, TaskEvent::Cancel) => {
            if actor.id != task.client_id && !actor.admin {
                return Err(denied("cancel this task"));
            }
            Ok(TaskStatus::Cancelled)
        }

        (TaskStatus::Assigned, TaskEvent::RequestCompletion) => {
            if task.tasker_id != Some(actor.id) {
                return Err(denied("request completion of this task"));
            }
            Ok(TaskStatus::PendingPayment)
        }

        (TaskStatus::PendingPayment, TaskEvent::Settle) => {
            if actor.id != task.client_id {
                return Err(denied("settle this task"));
            }
            Ok(TaskStatus::Completed)
        }

        // Administrative/dispute override once work has been claimed.
        (TaskStatus::Assigned | TaskStatus::PendingPayment, TaskEvent::Cancel) => {
            if !actor.admin {
                return Err(denied("cancel an assigned task"));
            }
            Ok(TaskStatus::Cancelled)
        }

        _ => Err(illegal()),
    }
}
