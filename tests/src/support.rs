//! Shared fixtures for the integration suites.
//!
//! Every harness builds a fresh store and bus, so tests never share state.
//! The fixture functions drive a task to a named lifecycle stage through
//! the public service API only.

use market_bus::InMemoryEventBus;
use market_engine::{EngineConfig, MarketService, MarketStore, MemoryStore};
use market_telemetry::TelemetryConfig;
use market_types::{Actor, Bid, LedgerEntry, Money, Task, TaskId, UserId};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Installs log output for test runs. The first caller wins; the rest are
/// no-ops because a global subscriber is already in place.
pub fn init_logging() {
    let config = TelemetryConfig {
        log_level: "warn".to_string(),
        ..TelemetryConfig::default()
    };
    let _ = market_telemetry::init_telemetry(&config);
}

/// One wired-up engine instance: store, bus, and the facade over both.
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub bus: Arc<InMemoryEventBus>,
    pub service: MarketService,
}

impl Harness {
    /// The ledger rows settling a task, in commit order.
    pub async fn task_rows(&self, task: TaskId) -> Vec<LedgerEntry> {
        self.store
            .entries_for_task(task)
            .await
            .expect("reads never fail in tests")
    }
}

/// Builds a harness with default configuration.
#[must_use]
pub fn harness() -> Harness {
    harness_with(EngineConfig::default())
}

/// Builds a harness with explicit tunables.
#[must_use]
pub fn harness_with(config: EngineConfig) -> Harness {
    init_logging();
    let store = Arc::new(MemoryStore::new(config));
    let bus = Arc::new(InMemoryEventBus::new());
    let service = MarketService::new(store.clone(), bus.clone());
    Harness {
        store,
        bus,
        service,
    }
}

/// Shorthand for a two-decimal amount in test code.
#[must_use]
pub fn money(value: Decimal) -> Money {
    Money::try_from_decimal(value).expect("test amounts carry at most two decimal places")
}

/// A client funded with `balance`, via the deposit path.
pub async fn funded_user(svc: &MarketService, balance: Money) -> UserId {
    let user = UserId::new();
    svc.deposit(user, balance, "deposit".to_string())
        .await
        .expect("funding a fresh user succeeds");
    user
}

/// An open task with one pending bid from `tasker` at `amount`.
pub async fn task_with_bid(
    svc: &MarketService,
    client: UserId,
    tasker: UserId,
    amount: Money,
) -> (Task, Bid) {
    let task = svc
        .create_task(client, "Assemble bookshelf".to_string(), amount)
        .await
        .expect("task creation succeeds");
    let bid = svc
        .submit_bid(task.id, tasker, amount, "I can do this today".to_string())
        .await
        .expect("bid submission succeeds");
    (task, bid)
}

/// A task driven all the way to awaiting payment: bid accepted, work
/// reported done. Returns the task as last read.
pub async fn task_awaiting_payment(
    svc: &MarketService,
    client: UserId,
    tasker: UserId,
    amount: Money,
) -> Task {
    let (task, bid) = task_with_bid(svc, client, tasker, amount).await;
    svc.accept_bid(bid.id, Actor::user(client))
        .await
        .expect("accepting the only bid succeeds");
    svc.request_completion(task.id, Actor::user(tasker))
        .await
        .expect("the assigned tasker may report completion");
    svc.task(task.id).await.expect("task still exists")
}
