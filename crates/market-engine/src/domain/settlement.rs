//! Settlement planning.
//!
//! `plan_settlement` verifies every precondition and computes the exact
//! writes - debit, credit, fee, xp - that the store then applies as one
//! atomic unit. The fee rate is read from the tasker's profile here, inside
//! the same lock scope that applies the plan, so a level change can never
//! alter an in-flight settlement: it either lands before the unit and is
//! seen, or after and is ignored.

use super::fees;
use market_types::{
    Actor, Bid, EngineError, Money, Task, TaskStatus, TaskerLevel, TaskerProfile, TaskId, UserId,
};
use rust_decimal::Decimal;

/// Everything a committed settlement writes, computed up front.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementPlan {
    /// The task being settled.
    pub task_id: TaskId,
    /// The paying client.
    pub client_id: UserId,
    /// The tasker being paid.
    pub tasker_id: UserId,
    /// Amount debited from the client: the accepted bid amount.
    pub gross: Money,
    /// The platform's cut.
    pub fee: Money,
    /// Amount credited to the tasker: `gross - fee`.
    pub payout: Money,
    /// The rate applied, frozen at planning time.
    pub rate: Decimal,
    /// The level the rate came from.
    pub level: TaskerLevel,
    /// Task title, passed through to the ledger entry labels.
    pub title: String,
}

/// Plans the settlement of `task`, or reports why it cannot happen.
///
/// # Errors
/// - `Unauthorized` if the actor is not the task's client
/// - `InvalidState` unless the task is awaiting payment - in particular, a
///   second settlement of a completed task fails here with zero writes
/// - `NoAcceptedBid` if no accepted bid exists (unreachable while the
///   acceptance invariants hold)
/// - `NotFound` if the tasker has no profile
pub fn plan_settlement(
    task: &Task,
    accepted: Option<&Bid>,
    profile: Option<&TaskerProfile>,
    actor: Actor,
) -> Result<SettlementPlan, EngineError> {
    if actor.id != task.client_id {
        return Err(EngineError::Unauthorized {
            actor: actor.id,
            action: "settle this task",
        });
    }
    if task.status != TaskStatus::PendingPayment {
        return Err(EngineError::InvalidState {
            expected: TaskStatus::PendingPayment,
            actual: task.status,
        });
    }

    let bid = accepted.ok_or(EngineError::NoAcceptedBid { task: task.id })?;
    let tasker_id = bid.tasker_id;
    if task.tasker_id != Some(tasker_id) {
        // The assignment and the accepted bid must agree; anything else
        // means an invariant was violated upstream.
        return Err(EngineError::Conflict {
            reason: "accepted bid does not match assigned tasker".to_string(),
        });
    }

    let profile = profile.ok_or(EngineError::NotFound { what: "profile" })?;
    let level = profile.level;
    let rate = level.fee_rate();
    let split = fees::split(bid.amount, rate)?;

    Ok(SettlementPlan {
        task_id: task.id,
        client_id: task.client_id,
        tasker_id,
        gross: bid.amount,
        fee: split.fee,
        payout: split.payout,
        rate,
        level,
        title: task.title.clone(),
    })
}
