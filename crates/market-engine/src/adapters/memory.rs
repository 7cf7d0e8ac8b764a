//! In-memory implementation of the persistence port.
//!
//! One `parking_lot::RwLock` guards all tables, so every port operation is
//! serializable: a write acquires the lock once, validates against the
//! state it will mutate, and only then mutates. A lock wait that exceeds
//! the configured bound fails with `Timeout` before any write - the
//! in-memory analog of a database statement timeout. A SQL adapter would
//! implement the same port with `SELECT ... FOR UPDATE` per row; tests and
//! single-process deployments use this one.
//!
//! Every operation orders its body validate-first, mutate-last. The
//! mutation phase contains no fallible step, which is what makes each
//! operation all-or-nothing without an undo log.

use crate::config::EngineConfig;
use crate::domain::{arbiter, ledger::LedgerBook, machine, settlement};
use crate::ports::store::{BidAcceptance, MarketStore, SettlementReceipt};
use crate::time::now_millis;
use async_trait::async_trait;
use market_types::{
    Actor, Bid, BidId, BidStatus, EngineError, LedgerEntry, Money, Task, TaskId, TaskStatus,
    TaskerProfile, UserId,
};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::HashMap;
use tracing::debug;

/// All tables behind one lock.
#[derive(Debug, Default)]
struct Inner {
    tasks: HashMap<TaskId, Task>,
    bids: HashMap<BidId, Bid>,
    /// Bid ids per task, in submission order.
    bids_by_task: HashMap<TaskId, Vec<BidId>>,
    ledger: LedgerBook,
    profiles: HashMap<UserId, TaskerProfile>,
}

impl Inner {
    fn bids_of(&self, task_id: TaskId) -> Vec<Bid> {
        self.bids_by_task
            .get(&task_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.bids.get(id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn accepted_bid_of(&self, task_id: TaskId) -> Option<Bid> {
        self.bids_of(task_id)
            .into_iter()
            .find(|b| b.status == BidStatus::Accepted)
    }
}

/// In-memory store with bounded lock acquisition.
pub struct MemoryStore {
    inner: RwLock<Inner>,
    config: EngineConfig,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            config,
        }
    }

    /// Creates an empty store with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }

    fn write_txn(
        &self,
        operation: &'static str,
    ) -> Result<RwLockWriteGuard<'_, Inner>, EngineError> {
        self.inner
            .try_write_for(self.config.lock_timeout)
            .ok_or(EngineError::Timeout { operation })
    }

    fn read_txn(
        &self,
        operation: &'static str,
    ) -> Result<RwLockReadGuard<'_, Inner>, EngineError> {
        self.inner
            .try_read_for(self.config.lock_timeout)
            .ok_or(EngineError::Timeout { operation })
    }
}

#[async_trait]
impl MarketStore for MemoryStore {
    async fn create_task(
        &self,
        client: UserId,
        title: String,
        budget: Money,
    ) -> Result<Task, EngineError> {
        if title.trim().is_empty() {
            return Err(EngineError::Validation {
                reason: "task title must not be empty".to_string(),
            });
        }
        if !budget.is_positive() {
            return Err(EngineError::Validation {
                reason: "task budget must be positive".to_string(),
            });
        }

        let task = Task {
            id: TaskId::new(),
            client_id: client,
            tasker_id: None,
            title,
            budget,
            status: TaskStatus::Open,
            created_at: now_millis(),
            version: 0,
        };

        let mut inner = self.write_txn("create_task")?;
        inner.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn cancel_task(&self, task_id: TaskId, actor: Actor) -> Result<Task, EngineError> {
        let mut inner = self.write_txn("cancel_task")?;

        let task = inner
            .tasks
            .get(&task_id)
            .ok_or(EngineError::NotFound { what: "task" })?;
        let next = machine::next_status(task, machine::TaskEvent::Cancel, actor)?;

        let task = inner
            .tasks
            .get_mut(&task_id)
            .ok_or(EngineError::NotFound { what: "task" })?;
        task.status = next;
        task.tasker_id = None;
        task.version += 1;
        Ok(task.clone())
    }

    async fn submit_bid(
        &self,
        task_id: TaskId,
        tasker: UserId,
        amount: Money,
        message: String,
    ) -> Result<Bid, EngineError> {
        let mut inner = self.write_txn("submit_bid")?;

        let task = inner
            .tasks
            .get(&task_id)
            .ok_or(EngineError::NotFound { what: "task" })?;
        let existing = inner.bids_of(task_id);
        arbiter::validate_submission(task, &existing, tasker, amount)?;

        let bid = Bid {
            id: BidId::new(),
            task_id,
            tasker_id: tasker,
            amount,
            message,
            status: BidStatus::Pending,
            created_at: now_millis(),
        };
        inner.bids.insert(bid.id, bid.clone());
        inner.bids_by_task.entry(task_id).or_default().push(bid.id);
        // A bidder is a tasker; make sure a profile exists before any
        // settlement can need it.
        inner
            .profiles
            .entry(tasker)
            .or_insert_with(|| TaskerProfile::new(tasker));
        Ok(bid)
    }

    async fn accept_bid(&self, bid_id: BidId, actor: Actor) -> Result<BidAcceptance, EngineError> {
        let mut inner = self.write_txn("accept_bid")?;

        let bid = inner
            .bids
            .get(&bid_id)
            .cloned()
            .ok_or(EngineError::NotFound { what: "bid" })?;
        let task = inner
            .tasks
            .get(&bid.task_id)
            .cloned()
            .ok_or(EngineError::NotFound { what: "task" })?;
        let siblings = inner.bids_of(bid.task_id);

        let resolution = arbiter::decide_acceptance(&task, &bid, &siblings, actor)?;

        // Commit point: every write below is infallible.
        if let Some(winner) = inner.bids.get_mut(&resolution.winner) {
            winner.status = BidStatus::Accepted;
        }
        let mut rejected = Vec::with_capacity(resolution.losers.len());
        for loser in &resolution.losers {
            if let Some(b) = inner.bids.get_mut(loser) {
                b.status = BidStatus::Rejected;
                rejected.push(b.clone());
            }
        }
        let task = inner
            .tasks
            .get_mut(&bid.task_id)
            .ok_or(EngineError::NotFound { what: "task" })?;
        task.status = resolution.next_status;
        task.tasker_id = Some(resolution.tasker);
        task.version += 1;
        let task = task.clone();

        let winner = inner
            .bids
            .get(&resolution.winner)
            .cloned()
            .ok_or(EngineError::NotFound { what: "bid" })?;
        debug!(task_id = %task.id, bid_id = %winner.id, rejected = rejected.len(), "Bid accepted");
        Ok(BidAcceptance {
            task,
            winner,
            rejected,
        })
    }

    async fn request_completion(
        &self,
        task_id: TaskId,
        actor: Actor,
    ) -> Result<Task, EngineError> {
        let mut inner = self.write_txn("request_completion")?;

        let task = inner
            .tasks
            .get(&task_id)
            .ok_or(EngineError::NotFound { what: "task" })?;
        let next = machine::next_status(task, machine::TaskEvent::RequestCompletion, actor)?;

        let task = inner
            .tasks
            .get_mut(&task_id)
            .ok_or(EngineError::NotFound { what: "task" })?;
        task.status = next;
        task.version += 1;
        Ok(task.clone())
    }

    async fn settle(
        &self,
        task_id: TaskId,
        actor: Actor,
    ) -> Result<SettlementReceipt, EngineError> {
        let mut inner = self.write_txn("settle")?;

        let task = inner
            .tasks
            .get(&task_id)
            .cloned()
            .ok_or(EngineError::NotFound { what: "task" })?;
        let accepted = inner.accepted_bid_of(task_id);
        let profile = task
            .tasker_id
            .and_then(|tasker| inner.profiles.get(&tasker))
            .cloned();

        let plan = settlement::plan_settlement(&task, accepted.as_ref(), profile.as_ref(), actor)?;
        let next = machine::next_status(&task, machine::TaskEvent::Settle, actor)?;

        // Validate the whole unit before its first write, so an
        // insufficient balance leaves the task awaiting payment with zero
        // ledger rows written.
        inner.ledger.can_debit(plan.client_id, plan.gross)?;
        inner.ledger.can_credit(plan.tasker_id, plan.payout)?;

        // Commit point.
        let now = now_millis();
        let debit = inner
            .ledger
            .debit(plan.client_id, plan.gross, Some(task_id), &plan.title, now)?;
        let credit = inner
            .ledger
            .credit(plan.tasker_id, plan.payout, Some(task_id), &plan.title, now)?;

        let promoted = inner
            .profiles
            .get_mut(&plan.tasker_id)
            .and_then(|p| p.record_completion(self.config.xp_per_completion));

        let task = inner
            .tasks
            .get_mut(&task_id)
            .ok_or(EngineError::NotFound { what: "task" })?;
        task.status = next;
        task.version += 1;
        let task = task.clone();

        debug!(
            task_id = %task.id,
            gross = %plan.gross,
            fee = %plan.fee,
            payout = %plan.payout,
            "Settlement committed"
        );
        Ok(SettlementReceipt {
            task,
            debit,
            credit,
            fee: plan.fee,
            promoted,
        })
    }

    async fn deposit(
        &self,
        user: UserId,
        amount: Money,
        title: String,
    ) -> Result<LedgerEntry, EngineError> {
        let mut inner = self.write_txn("deposit")?;
        inner.ledger.credit(user, amount, None, &title, now_millis())
    }

    async fn withdraw(
        &self,
        user: UserId,
        amount: Money,
        title: String,
    ) -> Result<LedgerEntry, EngineError> {
        let mut inner = self.write_txn("withdraw")?;
        inner.ledger.debit(user, amount, None, &title, now_millis())
    }

    async fn register_tasker(&self, user: UserId) -> Result<TaskerProfile, EngineError> {
        let mut inner = self.write_txn("register_tasker")?;
        Ok(inner
            .profiles
            .entry(user)
            .or_insert_with(|| TaskerProfile::new(user))
            .clone())
    }

    async fn task(&self, task_id: TaskId) -> Result<Task, EngineError> {
        let inner = self.read_txn("task")?;
        inner
            .tasks
            .get(&task_id)
            .cloned()
            .ok_or(EngineError::NotFound { what: "task" })
    }

    async fn bids_for_task(&self, task_id: TaskId) -> Result<Vec<Bid>, EngineError> {
        let inner = self.read_txn("bids_for_task")?;
        Ok(inner.bids_of(task_id))
    }

    async fn accepted_bid(&self, task_id: TaskId) -> Result<Option<Bid>, EngineError> {
        let inner = self.read_txn("accepted_bid")?;
        Ok(inner.accepted_bid_of(task_id))
    }

    async fn balance_of(&self, user: UserId) -> Result<Money, EngineError> {
        let inner = self.read_txn("balance_of")?;
        Ok(inner.ledger.balance_of(user))
    }

    async fn entries_for(&self, user: UserId) -> Result<Vec<LedgerEntry>, EngineError> {
        let inner = self.read_txn("entries_for")?;
        Ok(inner.ledger.entries_for(user))
    }

    async fn entries_for_task(&self, task_id: TaskId) -> Result<Vec<LedgerEntry>, EngineError> {
        let inner = self.read_txn("entries_for_task")?;
        Ok(inner.ledger.entries_for_task(task_id))
    }

    async fn profile(&self, user: UserId) -> Result<Option<TaskerProfile>, EngineError> {
        let inner = self.read_txn("profile")?;
        Ok(inner.profiles.get(&user).cloned())
    }
}
