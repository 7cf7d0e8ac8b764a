//! Core domain entities for the lifecycle engine.
//!
//! These are plain data carriers; all status mutation happens through the
//! engine's atomic store operations, never by poking fields from outside.

use crate::ids::{BidId, EntryId, TaskId, UserId};
use crate::money::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Timestamp in milliseconds since UNIX epoch.
pub type Timestamp = u64;

/// The authenticated principal performing an operation.
///
/// Supplied by the (out of scope) API layer after authentication. The
/// `admin` flag exists solely for the administrative/dispute cancellation
/// override; ordinary clients and taskers never carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The acting user.
    pub id: UserId,
    /// Whether the principal holds administrative override rights.
    pub admin: bool,
}

impl Actor {
    /// An ordinary authenticated user.
    #[must_use]
    pub const fn user(id: UserId) -> Self {
        Self { id, admin: false }
    }

    /// An administrator (dispute/override surface).
    #[must_use]
    pub const fn admin(id: UserId) -> Self {
        Self { id, admin: true }
    }
}

/// Lifecycle states of a task.
///
/// ```text
/// [Open] ──accept bid──→ [Assigned] ──completion requested──→ [PendingPayment]
///   │                        │                                      │
///   │                        └────── admin cancel ──────┐           │ settle
///   └── client cancel ──→ [Cancelled] ←─────────────────┘       [Completed]
/// ```
///
/// `PendingPayment` means "work claimed done, payment pending". The wire
/// name stays `in_progress` for compatibility with the existing persisted
/// rows and API consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Accepting bids.
    Open,
    /// A bid was accepted; the tasker is working.
    Assigned,
    /// The tasker reported the work done; the client's payment is pending.
    #[serde(rename = "in_progress")]
    PendingPayment,
    /// Settled. Terminal.
    Completed,
    /// Cancelled by the client (while open) or by an administrator. Terminal.
    Cancelled,
}

impl TaskStatus {
    /// True for states no transition can leave.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// True for states in which the task must have an assigned tasker.
    #[must_use]
    pub const fn requires_tasker(&self) -> bool {
        matches!(self, Self::Assigned | Self::PendingPayment | Self::Completed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Open => "open",
            Self::Assigned => "assigned",
            Self::PendingPayment => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// A unit of work posted by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier.
    pub id: TaskId,
    /// The client who posted the task.
    pub client_id: UserId,
    /// The assigned tasker. `None` exactly while status is `Open`/`Cancelled`.
    pub tasker_id: Option<UserId>,
    /// Short human description, passed through to ledger entry titles.
    pub title: String,
    /// The client's budget. Immutable once the task leaves `Open`; the
    /// accepted bid amount, not the budget, is what settles.
    pub budget: Money,
    /// Current lifecycle state.
    pub status: TaskStatus,
    /// Creation time (ms since epoch).
    pub created_at: Timestamp,
    /// Monotonic write counter, bumped by the store on every mutation.
    pub version: u64,
}

impl Task {
    /// Checks the tasker-assignment invariant: `tasker_id` is present iff
    /// the status requires one.
    #[must_use]
    pub fn tasker_matches_status(&self) -> bool {
        self.tasker_id.is_some() == self.status.requires_tasker()
    }
}

/// Lifecycle states of a bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidStatus {
    /// Awaiting the client's decision.
    Pending,
    /// The winning bid. At most one per task.
    Accepted,
    /// Lost to a sibling bid (or task cancelled).
    Rejected,
}

/// A tasker's offer to perform a task for a specific amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    /// Unique identifier.
    pub id: BidId,
    /// The task the bid targets.
    pub task_id: TaskId,
    /// The offering tasker. At most one bid per (task, tasker) pair.
    pub tasker_id: UserId,
    /// Offered amount; this is what settles if accepted.
    pub amount: Money,
    /// Free-form pitch to the client.
    pub message: String,
    /// Current state.
    pub status: BidStatus,
    /// Creation time (ms since epoch).
    pub created_at: Timestamp,
}

/// Direction of a ledger entry relative to the user's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryDirection {
    /// Increases the balance.
    Credit,
    /// Decreases the balance.
    Debit,
}

/// Settlement state of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// The balance effect is final.
    Completed,
    /// Reserved for asynchronous flows (e.g. external top-up confirmation).
    Pending,
}

/// One immutable row of the append-only transaction log.
///
/// Entries are never updated or deleted; the stored balance is the running
/// sum of a user's completed entries (credits minus debits).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier.
    pub id: EntryId,
    /// The user whose balance this entry affects.
    pub user_id: UserId,
    /// The task this entry settles, if any. `None` for deposits/withdrawals.
    pub task_id: Option<TaskId>,
    /// The amount moved. Always strictly positive; `direction` carries sign.
    pub amount: Money,
    /// Credit or debit.
    pub direction: EntryDirection,
    /// Entry state.
    pub status: EntryStatus,
    /// Human-readable label (task title, "deposit", ...).
    pub title: String,
    /// Creation time (ms since epoch).
    pub created_at: Timestamp,
}

impl LedgerEntry {
    /// The signed effect of this entry on the stored balance.
    #[must_use]
    pub fn signed_amount(&self) -> Money {
        match self.direction {
            EntryDirection::Credit => self.amount,
            EntryDirection::Debit => Money::ZERO
                .checked_sub(self.amount)
                .unwrap_or(Money::ZERO),
        }
    }
}

/// Tasker progression levels. Higher levels pay a lower platform fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskerLevel {
    /// Entry level, 5% fee.
    Bronze,
    /// 100+ xp, 4% fee.
    Silver,
    /// 500+ xp, 3% fee.
    Gold,
    /// 2000+ xp, 2% fee.
    Diamond,
}

impl TaskerLevel {
    /// The platform fee rate charged on settlements at this level.
    #[must_use]
    pub fn fee_rate(&self) -> Decimal {
        match self {
            Self::Bronze => Decimal::new(5, 2),
            Self::Silver => Decimal::new(4, 2),
            Self::Gold => Decimal::new(3, 2),
            Self::Diamond => Decimal::new(2, 2),
        }
    }

    /// The level earned at a given experience total.
    #[must_use]
    pub fn for_xp(xp: u64) -> Self {
        match xp {
            0..=99 => Self::Bronze,
            100..=499 => Self::Silver,
            500..=1999 => Self::Gold,
            _ => Self::Diamond,
        }
    }
}

impl std::fmt::Display for TaskerLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Bronze => "bronze",
            Self::Silver => "silver",
            Self::Gold => "gold",
            Self::Diamond => "diamond",
        };
        f.write_str(name)
    }
}

/// A tasker's progression record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskerProfile {
    /// The tasker.
    pub user_id: UserId,
    /// Current level. Always `TaskerLevel::for_xp(self.xp)`.
    pub level: TaskerLevel,
    /// Accumulated experience points.
    pub xp: u64,
    /// Number of settled tasks.
    pub completed_tasks: u64,
}

impl TaskerProfile {
    /// A fresh bronze profile.
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            level: TaskerLevel::Bronze,
            xp: 0,
            completed_tasks: 0,
        }
    }

    /// Records a settled task, awarding experience.
    ///
    /// Returns the new level if the award crossed a promotion threshold.
    pub fn record_completion(&mut self, xp_award: u64) -> Option<TaskerLevel> {
        self.completed_tasks += 1;
        self.xp = self.xp.saturating_add(xp_award);
        let earned = TaskerLevel::for_xp(self.xp);
        if earned > self.level {
            self.level = earned;
            Some(earned)
        } else {
            None
        }
    }
}
