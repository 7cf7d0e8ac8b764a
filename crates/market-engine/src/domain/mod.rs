//! Pure domain logic: status transitions, bid arbitration, the ledger
//! book, fee math, and settlement planning.
//!
//! Nothing here performs I/O or takes a lock. The store's atomic
//! operations call these functions to decide, then apply the decided
//! writes all-or-nothing.

pub mod arbiter;
pub mod fees;
pub mod ledger;
pub mod machine;
pub mod settlement;

pub use arbiter::{decide_acceptance, validate_submission, BidResolution};
pub use fees::{split, FeeSplit};
pub use ledger::LedgerBook;
pub use machine::{next_status, TaskEvent};
pub use settlement::{plan_settlement, SettlementPlan};
