//! The engine facade: atomic store operations plus event publication.
//!
//! Both outer surfaces call this type, so the bid/settlement rules exist in
//! exactly one place. Events go out only after a successful commit and
//! outside any store lock; a notifier problem is logged, never surfaced to
//! the caller.

use crate::ports::store::{BidAcceptance, MarketStore, SettlementReceipt};
use crate::time::now_millis;
use market_bus::{EventPublisher, MarketEvent, MarketEventKind};
use market_types::{
    Actor, Bid, BidId, EngineError, LedgerEntry, Money, Task, TaskId, TaskerProfile, UserId,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// The lifecycle engine's public API.
pub struct MarketService {
    store: Arc<dyn MarketStore>,
    notifier: Arc<dyn EventPublisher>,
}

impl MarketService {
    /// Wires the engine to its persistence and notifier boundaries.
    pub fn new(store: Arc<dyn MarketStore>, notifier: Arc<dyn EventPublisher>) -> Self {
        Self { store, notifier }
    }

    /// Posts an open task.
    #[instrument(skip(self, title), fields(client = %client))]
    pub async fn create_task(
        &self,
        client: UserId,
        title: String,
        budget: Money,
    ) -> Result<Task, EngineError> {
        self.store.create_task(client, title, budget).await
    }

    /// Cancels a task and notifies consumers.
    #[instrument(skip(self), fields(task = %task_id))]
    pub async fn cancel_task(&self, task_id: TaskId, actor: Actor) -> Result<Task, EngineError> {
        let task = self.store.cancel_task(task_id, actor).await?;
        self.emit(MarketEventKind::TaskCancelled {
            task_id: task.id,
            client_id: task.client_id,
        })
        .await;
        Ok(task)
    }

    /// Submits a bid on an open task.
    #[instrument(skip(self, message), fields(task = %task_id, tasker = %tasker))]
    pub async fn submit_bid(
        &self,
        task_id: TaskId,
        tasker: UserId,
        amount: Money,
        message: String,
    ) -> Result<Bid, EngineError> {
        let bid = self
            .store
            .submit_bid(task_id, tasker, amount, message)
            .await?;
        self.emit(MarketEventKind::BidPlaced {
            task_id: bid.task_id,
            bid_id: bid.id,
            tasker_id: bid.tasker_id,
            amount: bid.amount,
        })
        .await;
        Ok(bid)
    }

    /// Accepts a bid: the winner is notified directly; the losers' events
    /// let the notifier push "not selected" messages, though their
    /// rejection is also observable by read.
    #[instrument(skip(self), fields(bid = %bid_id))]
    pub async fn accept_bid(
        &self,
        bid_id: BidId,
        actor: Actor,
    ) -> Result<BidAcceptance, EngineError> {
        let acceptance = self.store.accept_bid(bid_id, actor).await?;
        self.emit(MarketEventKind::BidAccepted {
            task_id: acceptance.task.id,
            bid_id: acceptance.winner.id,
            tasker_id: acceptance.winner.tasker_id,
        })
        .await;
        for loser in &acceptance.rejected {
            self.emit(MarketEventKind::BidRejected {
                task_id: loser.task_id,
                bid_id: loser.id,
                tasker_id: loser.tasker_id,
            })
            .await;
        }
        Ok(acceptance)
    }

    /// The assigned tasker reports the work done.
    #[instrument(skip(self), fields(task = %task_id))]
    pub async fn request_completion(
        &self,
        task_id: TaskId,
        actor: Actor,
    ) -> Result<Task, EngineError> {
        let task = self.store.request_completion(task_id, actor).await?;
        if let Some(tasker_id) = task.tasker_id {
            self.emit(MarketEventKind::CompletionRequested {
                task_id: task.id,
                tasker_id,
            })
            .await;
        }
        Ok(task)
    }

    /// Settles the task. The caller has already collected the client's
    /// money externally (card charge); this moves internal balances only.
    #[instrument(skip(self), fields(task = %task_id))]
    pub async fn settle(
        &self,
        task_id: TaskId,
        actor: Actor,
    ) -> Result<SettlementReceipt, EngineError> {
        let receipt = self.store.settle(task_id, actor).await?;
        info!(
            task = %receipt.task.id,
            debit = %receipt.debit.amount,
            credit = %receipt.credit.amount,
            fee = %receipt.fee,
            "Task settled"
        );
        if let Some(tasker_id) = receipt.task.tasker_id {
            self.emit(MarketEventKind::TaskCompleted {
                task_id: receipt.task.id,
                client_id: receipt.task.client_id,
                tasker_id,
                payout: receipt.credit.amount,
            })
            .await;
        }
        Ok(receipt)
    }

    /// Credits a balance after an external top-up.
    #[instrument(skip(self, title), fields(user = %user))]
    pub async fn deposit(
        &self,
        user: UserId,
        amount: Money,
        title: String,
    ) -> Result<LedgerEntry, EngineError> {
        self.store.deposit(user, amount, title).await
    }

    /// Debits a balance for an external payout.
    #[instrument(skip(self, title), fields(user = %user))]
    pub async fn withdraw(
        &self,
        user: UserId,
        amount: Money,
        title: String,
    ) -> Result<LedgerEntry, EngineError> {
        self.store.withdraw(user, amount, title).await
    }

    /// Seeds a tasker profile (idempotent).
    pub async fn register_tasker(&self, user: UserId) -> Result<TaskerProfile, EngineError> {
        self.store.register_tasker(user).await
    }

    /// Fetches a task.
    pub async fn task(&self, task_id: TaskId) -> Result<Task, EngineError> {
        self.store.task(task_id).await
    }

    /// All bids on a task.
    pub async fn bids_for_task(&self, task_id: TaskId) -> Result<Vec<Bid>, EngineError> {
        self.store.bids_for_task(task_id).await
    }

    /// The user's stored balance.
    pub async fn balance_of(&self, user: UserId) -> Result<Money, EngineError> {
        self.store.balance_of(user).await
    }

    /// The user's ledger history.
    pub async fn entries_for(&self, user: UserId) -> Result<Vec<LedgerEntry>, EngineError> {
        self.store.entries_for(user).await
    }

    /// A tasker's profile.
    pub async fn profile(&self, user: UserId) -> Result<Option<TaskerProfile>, EngineError> {
        self.store.profile(user).await
    }

    /// Best-effort event emission after a commit. Delivery problems are
    /// logged and swallowed; the committed operation already succeeded.
    async fn emit(&self, kind: MarketEventKind) {
        let event = MarketEvent::now(now_millis(), kind);
        let receivers = self.notifier.publish(event).await;
        if receivers == 0 {
            warn!("Domain event had no notifier consumers");
        }
    }
}
