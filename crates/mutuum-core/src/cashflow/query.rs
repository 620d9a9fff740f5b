//! Chainable query builder over resolved cash-flow entries.

use std::sync::Arc;

use crate::cashflow::{CashFlow, CashFlowEntry, Category};
use crate::time::{DateTime, TimeContext};
use crate::types::Money;

/// Sort key for [`CashFlowQuery::order_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
    /// Ascending by datetime
    Datetime,
    /// Descending by datetime
    DatetimeDesc,
    /// Ascending by real amount
    Amount,
    /// Descending by real amount
    AmountDesc,
    /// Ascending by category tag
    Category,
}

/// Query builder for filtering and shaping cash flows.
///
/// Operates on a snapshot of live entries taken when the query is created,
/// so chained filters are stable even under a moving clock.
///
/// ```rust,ignore
/// let interest = flow.query()
///     .category(Category::ActualInterest)
///     .datetime_lte(cutoff)
///     .order_by(OrderBy::Datetime)
///     .sum();
/// ```
#[derive(Debug, Clone)]
pub struct CashFlowQuery {
    entries: Vec<CashFlowEntry>,
}

impl CashFlowQuery {
    /// Creates a query over a snapshot of entries.
    #[must_use]
    pub fn new(entries: Vec<CashFlowEntry>) -> Self {
        Self { entries }
    }

    fn retain(mut self, predicate: impl Fn(&CashFlowEntry) -> bool) -> Self {
        self.entries.retain(|entry| predicate(entry));
        self
    }

    /// Keeps entries with the given category.
    #[must_use]
    pub fn category(self, category: Category) -> Self {
        self.retain(|entry| entry.category() == category)
    }

    /// Keeps entries whose category is in the given set.
    #[must_use]
    pub fn categories(self, categories: &[Category]) -> Self {
        let set = categories.to_vec();
        self.retain(move |entry| set.contains(&entry.category()))
    }

    /// Drops entries with the given category.
    #[must_use]
    pub fn exclude_category(self, category: Category) -> Self {
        self.retain(|entry| entry.category() != category)
    }

    /// Keeps entries at exactly the given datetime.
    #[must_use]
    pub fn datetime_eq(self, at: DateTime) -> Self {
        self.retain(|entry| entry.datetime() == at)
    }

    /// Keeps entries strictly after the given datetime.
    #[must_use]
    pub fn datetime_gt(self, at: DateTime) -> Self {
        self.retain(|entry| entry.datetime() > at)
    }

    /// Keeps entries at or after the given datetime.
    #[must_use]
    pub fn datetime_gte(self, at: DateTime) -> Self {
        self.retain(|entry| entry.datetime() >= at)
    }

    /// Keeps entries strictly before the given datetime.
    #[must_use]
    pub fn datetime_lt(self, at: DateTime) -> Self {
        self.retain(|entry| entry.datetime() < at)
    }

    /// Keeps entries at or before the given datetime.
    #[must_use]
    pub fn datetime_lte(self, at: DateTime) -> Self {
        self.retain(|entry| entry.datetime() <= at)
    }

    /// Keeps entries equal to the given amount at real precision.
    #[must_use]
    pub fn amount_eq(self, amount: Money) -> Self {
        self.retain(move |entry| entry.amount() == amount)
    }

    /// Keeps entries greater than the given amount.
    #[must_use]
    pub fn amount_gt(self, amount: Money) -> Self {
        self.retain(move |entry| entry.amount() > amount)
    }

    /// Keeps entries at or above the given amount.
    #[must_use]
    pub fn amount_gte(self, amount: Money) -> Self {
        self.retain(move |entry| entry.amount() >= amount)
    }

    /// Keeps entries below the given amount.
    #[must_use]
    pub fn amount_lt(self, amount: Money) -> Self {
        self.retain(move |entry| entry.amount() < amount)
    }

    /// Keeps entries at or below the given amount.
    #[must_use]
    pub fn amount_lte(self, amount: Money) -> Self {
        self.retain(move |entry| entry.amount() <= amount)
    }

    /// Keeps inflows only.
    #[must_use]
    pub fn inflows(self) -> Self {
        self.retain(CashFlowEntry::is_inflow)
    }

    /// Keeps outflows only.
    #[must_use]
    pub fn outflows(self) -> Self {
        self.retain(CashFlowEntry::is_outflow)
    }

    /// Sorts the entries by the given key (stable).
    #[must_use]
    pub fn order_by(mut self, key: OrderBy) -> Self {
        match key {
            OrderBy::Datetime => self.entries.sort_by_key(CashFlowEntry::datetime),
            OrderBy::DatetimeDesc => {
                self.entries.sort_by_key(CashFlowEntry::datetime);
                self.entries.reverse();
            }
            OrderBy::Amount => self.entries.sort_by_key(|entry| entry.amount().real()),
            OrderBy::AmountDesc => {
                self.entries.sort_by_key(|entry| entry.amount().real());
                self.entries.reverse();
            }
            OrderBy::Category => self.entries.sort_by_key(|entry| entry.category().as_str()),
        }
        self
    }

    /// Keeps only the first `count` entries.
    #[must_use]
    pub fn limit(mut self, count: usize) -> Self {
        self.entries.truncate(count);
        self
    }

    /// Skips the first `count` entries.
    #[must_use]
    pub fn offset(mut self, count: usize) -> Self {
        if count >= self.entries.len() {
            self.entries.clear();
        } else {
            self.entries.drain(..count);
        }
        self
    }

    /// Terminal: all matching entries.
    #[must_use]
    pub fn all(self) -> Vec<CashFlowEntry> {
        self.entries
    }

    /// Terminal: the first matching entry.
    #[must_use]
    pub fn first(self) -> Option<CashFlowEntry> {
        self.entries.into_iter().next()
    }

    /// Terminal: the last matching entry.
    #[must_use]
    pub fn last(self) -> Option<CashFlowEntry> {
        self.entries.into_iter().next_back()
    }

    /// Terminal: the sum of matching amounts.
    #[must_use]
    pub fn sum(self) -> Money {
        self.entries.iter().map(CashFlowEntry::amount).sum()
    }

    /// Terminal: the number of matching entries.
    #[must_use]
    pub fn count(self) -> usize {
        self.entries.len()
    }

    /// Terminal: converts the result back into a cash flow.
    ///
    /// The returned flow holds plain snapshots with no timeline revisions,
    /// so it resolves the same under any clock.
    #[must_use]
    pub fn to_flow(self) -> CashFlow {
        CashFlow::from_entries(self.entries, Arc::new(TimeContext::new()))
    }
}
