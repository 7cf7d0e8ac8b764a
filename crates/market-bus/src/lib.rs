//! # Market Bus - Domain Event Fan-Out
//!
//! Carries marketplace domain events from the lifecycle engine to notifier
//! consumers (push/in-app notification workers, read-model updaters).
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │    Engine    │                    │   Notifier   │
//! │              │    publish()       │   workers    │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! ## Delivery contract
//!
//! - **Fire and forget:** publishing never blocks the engine and never
//!   surfaces an error to it. A publish with no live subscribers drops the
//!   event and logs it.
//! - **At-least-once:** a lagging subscriber may observe gaps, and retrying
//!   producers may duplicate. Every event carries a unique [`EventId`];
//!   consumers that need exactly-once semantics deduplicate by it.
//! - Events are emitted only after the originating store commit, so a
//!   consumer never sees an event for state that was rolled back.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventId, EventTopic, MarketEvent, MarketEventKind};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before backpressure.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
