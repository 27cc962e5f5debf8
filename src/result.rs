//! Two-phase navigation results
//!
//! Every navigation is applied synchronously. The returned [`NavigationResult`]
//! still offers `committed()` and `finished()` futures so callers written
//! against an asynchronous navigation contract can await them; the first
//! resolves after one scheduler turn, the second after two.

use crate::entry::HistoryEntry;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// What a navigation did to the session history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationType {
    /// A new entry was appended
    Push,
    /// The current entry was rewritten in place
    Replace,
    /// The current position moved within existing entries
    Traverse,
    /// The current entry was re-materialized
    Reload,
    /// Nothing changed
    NoOp,
}

/// Outcome of a navigation call
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationResult {
    kind: NavigationType,
    entry: HistoryEntry,
}

impl NavigationResult {
    pub(crate) fn new(kind: NavigationType, entry: HistoryEntry) -> Self {
        Self { kind, entry }
    }

    /// What happened
    pub fn kind(&self) -> NavigationType {
        self.kind
    }

    /// The current entry once the navigation was applied
    pub fn entry(&self) -> &HistoryEntry {
        &self.entry
    }

    /// Check if the navigation changed nothing
    pub fn is_noop(&self) -> bool {
        self.kind == NavigationType::NoOp
    }

    /// Resolves on the next scheduler turn
    pub fn committed(&self) -> impl Future<Output = HistoryEntry> + 'static {
        let entry = self.entry.clone();
        async move {
            NextTick::new(1).await;
            entry
        }
    }

    /// Resolves one turn after [`NavigationResult::committed`]
    pub fn finished(&self) -> impl Future<Output = HistoryEntry> + 'static {
        let entry = self.entry.clone();
        async move {
            NextTick::new(2).await;
            entry
        }
    }
}

/// Yields to the executor `turns` times before completing
#[derive(Debug)]
struct NextTick {
    turns: u8,
}

impl NextTick {
    fn new(turns: u8) -> Self {
        Self { turns }
    }
}

impl Future for NextTick {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.turns == 0 {
            return Poll::Ready(());
        }
        self.turns -= 1;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}
