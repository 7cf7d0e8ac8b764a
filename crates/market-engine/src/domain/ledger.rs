//! The ledger: per-user balances plus the append-only transaction log.
//!
//! `LedgerBook` is the only place balances change. Every credit/debit
//! appends exactly one entry and adjusts the stored balance inside the same
//! mutable-borrow scope, so the reconciliation invariant - stored balance
//! equals the sum of the user's entries - holds structurally. Entries are
//! never updated or deleted.

use market_types::{
    EngineError, EntryDirection, EntryId, EntryStatus, LedgerEntry, Money, MoneyError, TaskId,
    Timestamp, UserId,
};
use std::collections::HashMap;

/// Balances and the transaction log, as one structure so a balance can
/// never drift from its entries.
#[derive(Debug, Default)]
pub struct LedgerBook {
    /// Denormalized running balance per user, for fast reads.
    balances: HashMap<UserId, Money>,
    /// The append-only log, in commit order.
    entries: Vec<LedgerEntry>,
}

impl LedgerBook {
    /// An empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The user's stored balance (zero if the user has no entries).
    #[must_use]
    pub fn balance_of(&self, user: UserId) -> Money {
        self.balances.get(&user).copied().unwrap_or(Money::ZERO)
    }

    /// Total number of entries in the log.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// All entries for a user, in commit order.
    #[must_use]
    pub fn entries_for(&self, user: UserId) -> Vec<LedgerEntry> {
        self.entries
            .iter()
            .filter(|e| e.user_id == user)
            .cloned()
            .collect()
    }

    /// All entries tagged with a task, in commit order.
    #[must_use]
    pub fn entries_for_task(&self, task: TaskId) -> Vec<LedgerEntry> {
        self.entries
            .iter()
            .filter(|e| e.task_id == Some(task))
            .cloned()
            .collect()
    }

    /// Checks that a credit of `amount` to `user` would succeed.
    ///
    /// Lets a multi-write unit validate everything before its first write.
    pub fn can_credit(&self, user: UserId, amount: Money) -> Result<(), EngineError> {
        Self::require_positive(amount)?;
        self.balance_of(user)
            .checked_add(amount)
            .ok_or(MoneyError::Overflow)?;
        Ok(())
    }

    /// Checks that a debit of `amount` from `user` would succeed.
    ///
    /// # Errors
    /// `InsufficientBalance` if the balance cannot cover the amount.
    pub fn can_debit(&self, user: UserId, amount: Money) -> Result<(), EngineError> {
        Self::require_positive(amount)?;
        let available = self.balance_of(user);
        if available < amount {
            return Err(EngineError::InsufficientBalance {
                required: amount,
                available,
            });
        }
        Ok(())
    }

    /// Appends a credit entry and raises the balance by the same amount.
    pub fn credit(
        &mut self,
        user: UserId,
        amount: Money,
        task_id: Option<TaskId>,
        title: &str,
        now: Timestamp,
    ) -> Result<LedgerEntry, EngineError> {
        self.can_credit(user, amount)?;
        let balance = self.balance_of(user);
        let next = balance.checked_add(amount).ok_or(MoneyError::Overflow)?;
        Ok(self.append(user, amount, EntryDirection::Credit, next, task_id, title, now))
    }

    /// Appends a debit entry and lowers the balance by the same amount.
    ///
    /// The sufficiency check reads the balance in this same call, under the
    /// caller's lock; there is no stale-read window for a concurrent debit
    /// to double-spend through.
    pub fn debit(
        &mut self,
        user: UserId,
        amount: Money,
        task_id: Option<TaskId>,
        title: &str,
        now: Timestamp,
    ) -> Result<LedgerEntry, EngineError> {
        self.can_debit(user, amount)?;
        let balance = self.balance_of(user);
        let next = balance.checked_sub(amount).ok_or(MoneyError::Overflow)?;
        Ok(self.append(user, amount, EntryDirection::Debit, next, task_id, title, now))
    }

    /// Recomputes the user's balance from the log and compares it to the
    /// stored value. Any mismatch means a write bypassed this book.
    #[must_use]
    pub fn reconcile(&self, user: UserId) -> bool {
        let mut sum = Money::ZERO;
        for entry in self.entries.iter().filter(|e| e.user_id == user) {
            let Some(next) = (match entry.direction {
                EntryDirection::Credit => sum.checked_add(entry.amount),
                EntryDirection::Debit => sum.checked_sub(entry.amount),
            }) else {
                return false;
            };
            sum = next;
        }
        sum == self.balance_of(user)
    }

    fn require_positive(amount: Money) -> Result<(), EngineError> {
        if amount.is_positive() {
            Ok(())
        } else {
            Err(EngineError::Validation {
                reason: "ledger amounts must be positive".to_string(),
            })
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn append(
        &mut self,
        user: UserId,
        amount: Money,
        direction: EntryDirection,
        new_balance: Money,
        task_id: Option<TaskId>,
        title: &str,
        now: Timestamp,
    ) -> LedgerEntry {
        let entry = LedgerEntry {
            id: EntryId::new(),
            user_id: user,
            task_id,
            amount,
            direction,
            status: EntryStatus::Completed,
            title: title.to_string(),
            created_at: now,
        };
        self.entries.push(entry.clone());
        self.balances.insert(user, new_balance);
        entry
    }
}
