//! Ports: the persistence boundary of the engine.

pub mod store;

pub use store::{BidAcceptance, MarketStore, SettlementReceipt};
