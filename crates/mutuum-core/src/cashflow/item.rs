//! Temporal cash-flow items with append-only timelines.

use std::sync::Arc;

use crate::cashflow::CashFlowEntry;
use crate::time::{DateTime, TimeContext};

/// A revision in an item's timeline: an entry, or a tombstone.
type Revision = (DateTime, Option<CashFlowEntry>);

/// A temporal container wrapping a cash-flow entry in a timeline.
///
/// The item starts from an initial entry and accumulates revisions, each
/// effective from a given instant. `resolve_at` performs a last-wins search:
/// the latest revision whose effective date is not after the observation
/// instant decides what (if anything) the item contains. A revision holding
/// `None` is a tombstone — the item reads as deleted from that point on.
///
/// Items never mutate destructively; `update` and `delete` only append.
#[derive(Debug, Clone)]
pub struct CashFlowItem {
    initial: CashFlowEntry,
    revisions: Vec<Revision>,
    ctx: Arc<TimeContext>,
}

impl CashFlowItem {
    /// Creates an item from its initial entry and the shared time context.
    #[must_use]
    pub fn new(initial: CashFlowEntry, ctx: Arc<TimeContext>) -> Self {
        Self {
            initial,
            revisions: Vec::new(),
            ctx,
        }
    }

    /// The shared time context.
    #[must_use]
    pub fn context(&self) -> &Arc<TimeContext> {
        &self.ctx
    }

    /// The seed snapshot the timeline started from.
    ///
    /// Unlike [`resolve`](Self::resolve), this ignores revisions; it is the
    /// record of what was originally written.
    #[must_use]
    pub fn initial(&self) -> &CashFlowEntry {
        &self.initial
    }

    /// Replaces the shared context, keeping the timeline intact.
    ///
    /// Used when deep-cloning an owner so the clone's items observe the
    /// clone's clock rather than the original's.
    pub fn rebind_context(&mut self, ctx: Arc<TimeContext>) {
        self.ctx = ctx;
    }

    /// Appends a revision effective from the given instant.
    pub fn update(&mut self, effective: DateTime, entry: CashFlowEntry) {
        self.revisions.push((effective, Some(entry)));
    }

    /// Appends a tombstone effective from the given instant.
    pub fn delete(&mut self, effective: DateTime) {
        self.revisions.push((effective, None));
    }

    /// Resolves the item at an arbitrary instant.
    ///
    /// Returns the latest revision effective on or before `at`, falling back
    /// to the initial entry when no revision applies; `None` means the item
    /// is deleted as of `at`.
    #[must_use]
    pub fn resolve_at(&self, at: DateTime) -> Option<&CashFlowEntry> {
        for (effective, entry) in self.revisions.iter().rev() {
            if *effective <= at {
                return entry.as_ref();
            }
        }
        Some(&self.initial)
    }

    /// Resolves the item at the shared context's current time.
    #[must_use]
    pub fn resolve(&self) -> Option<&CashFlowEntry> {
        self.resolve_at(self.ctx.now())
    }
}
