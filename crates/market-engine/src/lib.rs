//! # Task-Bid-Escrow Lifecycle Engine
//!
//! The one subsystem of the marketplace with real invariants: it moves a
//! task through its status machine, arbitrates competing bids, and moves
//! money between internal balances when a task settles. Every outer API
//! surface (REST routes, edge functions) calls into this crate instead of
//! reimplementing the rules.
//!
//! ## Guarantees
//!
//! - A task is assigned to at most one tasker; at most one bid per task is
//!   ever accepted.
//! - A settlement never pays twice: the status check and the balance moves
//!   commit in one atomic store operation.
//! - A client is never debited past their balance; the check and the
//!   mutation share one lock scope.
//! - A failed operation writes nothing. There is no partially applied
//!   acceptance or settlement to observe.
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      OUTER LAYER                                │
//! │  adapters/memory.rs - In-memory store (models the database's    │
//! │                       row-level locking + statement timeout)    │
//! │  service.rs         - Facade: store ops + event publication     │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements / uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MIDDLE LAYER                               │
//! │  ports/store.rs - MarketStore trait (atomic operations)         │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      INNER LAYER                                │
//! │  domain/machine.rs    - Task status transitions (sole authority)│
//! │  domain/arbiter.rs    - Bid validation + acceptance resolution  │
//! │  domain/ledger.rs     - LedgerBook: balances + append-only log  │
//! │  domain/fees.rs       - Fee schedule + banker's-rounded split   │
//! │  domain/settlement.rs - Settlement planning                     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Domain functions are pure; the store's atomic operations consult them
//! and apply the resulting writes all-or-nothing. Events reach the notifier
//! bus only after a commit, outside any lock.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;
pub mod time;

pub use adapters::memory::MemoryStore;
pub use config::EngineConfig;
pub use ports::store::{BidAcceptance, MarketStore, SettlementReceipt};
pub use service::MarketService;
