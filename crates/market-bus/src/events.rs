//! Domain events emitted by the lifecycle engine.
//!
//! One event per externally observable state change. Bid rejection is
//! observable via read by the losing taskers, but is still emitted so
//! notifier consumers can push "you were not selected" messages.

use market_types::{BidId, Money, TaskId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of a single event emission.
///
/// Delivery is at-least-once; consumers deduplicate by this id when
/// exactly-once processing matters to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Generates a fresh event id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// An event emission: a unique id, a wall-clock timestamp, and the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketEvent {
    /// Unique id of this emission (deduplication key).
    pub id: EventId,
    /// When the engine emitted the event (ms since epoch).
    pub occurred_at: Timestamp,
    /// What happened.
    pub kind: MarketEventKind,
}

impl MarketEvent {
    /// Wraps a payload in a fresh emission envelope.
    #[must_use]
    pub fn now(occurred_at: Timestamp, kind: MarketEventKind) -> Self {
        Self {
            id: EventId::new(),
            occurred_at,
            kind,
        }
    }

    /// The topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        self.kind.topic()
    }
}

/// All domain event payloads that flow through the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarketEventKind {
    /// A tasker placed a bid on an open task.
    BidPlaced {
        /// The task bid on.
        task_id: TaskId,
        /// The new bid.
        bid_id: BidId,
        /// The bidding tasker.
        tasker_id: UserId,
        /// Offered amount.
        amount: Money,
    },

    /// The client accepted a bid; the task is now assigned.
    BidAccepted {
        /// The task.
        task_id: TaskId,
        /// The winning bid.
        bid_id: BidId,
        /// The now-assigned tasker.
        tasker_id: UserId,
    },

    /// A sibling bid lost the acceptance race.
    BidRejected {
        /// The task.
        task_id: TaskId,
        /// The rejected bid.
        bid_id: BidId,
        /// The losing tasker.
        tasker_id: UserId,
    },

    /// The assigned tasker reported the work done; payment is now pending.
    CompletionRequested {
        /// The task.
        task_id: TaskId,
        /// The assigned tasker.
        tasker_id: UserId,
    },

    /// Settlement committed: the task is completed and balances moved.
    TaskCompleted {
        /// The task.
        task_id: TaskId,
        /// The paying client.
        client_id: UserId,
        /// The paid tasker.
        tasker_id: UserId,
        /// Amount credited to the tasker (bid amount minus fee).
        payout: Money,
    },

    /// The task was cancelled.
    TaskCancelled {
        /// The task.
        task_id: TaskId,
        /// The task's client.
        client_id: UserId,
    },
}

impl MarketEventKind {
    /// The topic for this payload (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::BidPlaced { .. } | Self::BidAccepted { .. } | Self::BidRejected { .. } => {
                EventTopic::Bids
            }
            Self::CompletionRequested { .. } | Self::TaskCancelled { .. } => EventTopic::Tasks,
            Self::TaskCompleted { .. } => EventTopic::Settlement,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Bid placement and arbitration events.
    Bids,
    /// Task lifecycle events outside settlement.
    Tasks,
    /// Settlement commits.
    Settlement,
}

/// Filter determining which events a subscription receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    /// Topics to receive. Empty means all topics.
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    /// Receive every event.
    #[must_use]
    pub fn all() -> Self {
        Self { topics: Vec::new() }
    }

    /// Receive only the given topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    /// Whether an event passes this filter.
    #[must_use]
    pub fn matches(&self, event: &MarketEvent) -> bool {
        self.topics.is_empty() || self.topics.contains(&event.topic())
    }
}
