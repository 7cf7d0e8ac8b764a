//! # Market Types
//!
//! Shared type definitions for the task-bid-escrow lifecycle engine.
//!
//! Every crate in the workspace speaks in these types:
//!
//! - [`ids`] - Opaque uuid-backed identifiers (`TaskId`, `BidId`, `UserId`, ...)
//! - [`money`] - Fixed-point, scale-2 monetary amounts (never floats)
//! - [`entities`] - Tasks, bids, ledger entries, tasker profiles
//! - [`errors`] - The `EngineError` taxonomy returned by every operation
//!
//! The outer API surfaces (REST routes, edge functions) translate these into
//! wire responses; nothing in this crate formats user-facing text.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod entities;
pub mod errors;
pub mod ids;
pub mod money;

pub use entities::{
    Actor, Bid, BidStatus, EntryDirection, EntryStatus, LedgerEntry, Task, TaskStatus,
    TaskerLevel, TaskerProfile, Timestamp,
};
pub use errors::{EngineError, ErrorKind};
pub use ids::{BidId, EntryId, TaskId, UserId};
pub use money::{Money, MoneyError, MONEY_SCALE};
