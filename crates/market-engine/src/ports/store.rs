//! The persistence port.
//!
//! Each write method is ONE atomic unit: it either applies every write it
//! describes or none of them, and its precondition checks observe the same
//! state its writes land on. In a SQL deployment that is a transaction with
//! row-level locks; the in-memory adapter serializes each method behind one
//! bounded write-lock acquisition. Correctness comes entirely from this
//! discipline - the engine keeps no other shared state, so any number of
//! service instances can share one store.

use async_trait::async_trait;
use market_types::{
    Actor, Bid, BidId, EngineError, LedgerEntry, Money, Task, TaskId, TaskerLevel, TaskerProfile,
    UserId,
};

/// Outcome of an accepted bid: the writes the unit committed.
#[derive(Debug, Clone, PartialEq)]
pub struct BidAcceptance {
    /// The task, now assigned.
    pub task: Task,
    /// The winning bid, now accepted.
    pub winner: Bid,
    /// Sibling bids, now rejected.
    pub rejected: Vec<Bid>,
}

/// Outcome of a committed settlement.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementReceipt {
    /// The task, now completed.
    pub task: Task,
    /// The client's debit entry (the full bid amount).
    pub debit: LedgerEntry,
    /// The tasker's credit entry (bid amount minus fee).
    pub credit: LedgerEntry,
    /// The platform's cut, derivable as `debit.amount - credit.amount`.
    pub fee: Money,
    /// The level the tasker was promoted to, if the xp award crossed a
    /// threshold.
    pub promoted: Option<TaskerLevel>,
}

/// Durable state owned by the engine: tasks, bids, the ledger, and tasker
/// profiles.
#[async_trait]
pub trait MarketStore: Send + Sync {
    // ------------------------------------------------------------------
    // Atomic write operations
    // ------------------------------------------------------------------

    /// Creates an open task for `client`.
    async fn create_task(
        &self,
        client: UserId,
        title: String,
        budget: Money,
    ) -> Result<Task, EngineError>;

    /// Cancels a task: by its client while open, by an admin afterwards.
    async fn cancel_task(&self, task_id: TaskId, actor: Actor) -> Result<Task, EngineError>;

    /// Records a pending bid on an open task.
    async fn submit_bid(
        &self,
        task_id: TaskId,
        tasker: UserId,
        amount: Money,
        message: String,
    ) -> Result<Bid, EngineError>;

    /// Accepts one bid: winner accepted, siblings rejected, task assigned.
    /// All three writes commit together or not at all.
    async fn accept_bid(&self, bid_id: BidId, actor: Actor) -> Result<BidAcceptance, EngineError>;

    /// The assigned tasker reports the work done; payment becomes pending.
    async fn request_completion(&self, task_id: TaskId, actor: Actor)
        -> Result<Task, EngineError>;

    /// Settles the task: debit client, credit tasker, complete the task,
    /// award xp. All four writes commit together or not at all; an
    /// insufficient balance aborts the unit with the task unchanged.
    async fn settle(&self, task_id: TaskId, actor: Actor) -> Result<SettlementReceipt, EngineError>;

    /// Credits a user's balance (e.g. after an external card charge).
    async fn deposit(
        &self,
        user: UserId,
        amount: Money,
        title: String,
    ) -> Result<LedgerEntry, EngineError>;

    /// Debits a user's balance for a payout to the outside world.
    async fn withdraw(
        &self,
        user: UserId,
        amount: Money,
        title: String,
    ) -> Result<LedgerEntry, EngineError>;

    /// Seeds a bronze profile for a tasker (idempotent).
    async fn register_tasker(&self, user: UserId) -> Result<TaskerProfile, EngineError>;

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Fetches a task.
    async fn task(&self, task_id: TaskId) -> Result<Task, EngineError>;

    /// All bids on a task, in submission order.
    async fn bids_for_task(&self, task_id: TaskId) -> Result<Vec<Bid>, EngineError>;

    /// The task's accepted bid, if any. At most one exists.
    async fn accepted_bid(&self, task_id: TaskId) -> Result<Option<Bid>, EngineError>;

    /// The user's stored balance.
    async fn balance_of(&self, user: UserId) -> Result<Money, EngineError>;

    /// The user's ledger entries, in commit order.
    async fn entries_for(&self, user: UserId) -> Result<Vec<LedgerEntry>, EngineError>;

    /// The user's ledger entries tagged with a task.
    async fn entries_for_task(&self, task_id: TaskId) -> Result<Vec<LedgerEntry>, EngineError>;

    /// A tasker's profile, if registered.
    async fn profile(&self, user: UserId) -> Result<Option<TaskerProfile>, EngineError>;
}
