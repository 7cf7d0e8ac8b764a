//! Bid submission rules and exactly-one-acceptance resolution.
//!
//! The arbiter decides; the store applies. `decide_acceptance` returns the
//! full resolution (winner, losers, assignment) so the store can commit all
//! of it in one atomic unit. A partially applied acceptance - bid accepted
//! but task still open - is the bug class this module exists to prevent.

use super::machine::{self, TaskEvent};
use market_types::{Actor, Bid, BidId, BidStatus, EngineError, Money, Task, TaskStatus, UserId};

/// The outcome of accepting one bid: everything the store must write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidResolution {
    /// The bid that becomes `Accepted`.
    pub winner: BidId,
    /// Sibling bids that become `Rejected`.
    pub losers: Vec<BidId>,
    /// The tasker the task is assigned to.
    pub tasker: UserId,
    /// The task's new status (always `Assigned`).
    pub next_status: TaskStatus,
}

/// Validates a bid submission against the task and its existing bids.
///
/// # Errors
/// - `TaskNotOpen` unless the task is accepting bids
/// - `DuplicateBid` if this tasker already bid on this task
/// - `Validation` for non-positive amounts or self-bidding
pub fn validate_submission(
    task: &Task,
    existing: &[Bid],
    tasker: UserId,
    amount: Money,
) -> Result<(), EngineError> {
    if task.status != TaskStatus::Open {
        return Err(EngineError::TaskNotOpen {
            status: task.status,
        });
    }
    if existing.iter().any(|b| b.tasker_id == tasker) {
        return Err(EngineError::DuplicateBid {
            task: task.id,
            tasker,
        });
    }
    if !amount.is_positive() {
        return Err(EngineError::Validation {
            reason: "bid amount must be positive".to_string(),
        });
    }
    if tasker == task.client_id {
        return Err(EngineError::Validation {
            reason: "cannot bid on own task".to_string(),
        });
    }
    Ok(())
}

/// Decides the acceptance of `bid`, producing the writes to commit.
///
/// The target bid becomes accepted, every pending sibling becomes rejected,
/// and the task moves `Open -> Assigned` with the bid's tasker. The caller
/// commits the three together or not at all.
///
/// # Errors
/// - `Unauthorized` if the actor is not the task's client
/// - `TaskNotOpen` if the task already left `Open` (e.g. lost a race)
/// - `BidNotPending` if the bid was already resolved
pub fn decide_acceptance(
    task: &Task,
    bid: &Bid,
    siblings: &[Bid],
    actor: Actor,
) -> Result<BidResolution, EngineError> {
    if bid.task_id != task.id {
        return Err(EngineError::Validation {
            reason: "bid does not belong to this task".to_string(),
        });
    }
    if actor.id != task.client_id {
        return Err(EngineError::Unauthorized {
            actor: actor.id,
            action: "accept a bid on this task",
        });
    }
    if task.status != TaskStatus::Open {
        return Err(EngineError::TaskNotOpen {
            status: task.status,
        });
    }
    if bid.status != BidStatus::Pending {
        return Err(EngineError::BidNotPending { status: bid.status });
    }

    let next_status = machine::next_status(task, TaskEvent::AcceptBid, actor)?;

    let losers = siblings
        .iter()
        .filter(|b| b.id != bid.id && b.status == BidStatus::Pending)
        .map(|b| b.id)
        .collect();

    Ok(BidResolution {
        winner: bid.id,
        losers,
        tasker: bid.tasker_id,
        next_status,
    })
}
