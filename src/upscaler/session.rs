//! Per-run state: item states and aggregate counters.

use crate::types::{BatchStats, ItemState};

/// State for one run, owned by the engine and mutated under its lock
///
/// The scheduler is the only counter mutator. Item tasks report
/// non-terminal progress; terminal transitions and their counter updates
/// happen together at window settlement, so any snapshot satisfies
/// `completed + errors + non-terminal == total`.
#[derive(Debug, Default)]
pub(crate) struct RunSession {
    /// One state per item, indexed by selection order
    pub(crate) states: Vec<ItemState>,
    /// Aggregate counters, updated incrementally
    pub(crate) stats: BatchStats,
}

impl RunSession {
    /// Session with no items, the state between runs
    pub(crate) fn empty() -> Self {
        Self::default()
    }

    /// Fresh session for a new selection: every item starts `Waiting`
    pub(crate) fn for_items(total: usize) -> Self {
        Self {
            states: vec![ItemState::Waiting; total],
            stats: BatchStats {
                total,
                ..BatchStats::default()
            },
        }
    }

    /// Drop all items and zero the counters
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }

    /// Administrative pre-mark: the item reads as uploading before its
    /// request is actually in flight
    pub(crate) fn mark_uploading(&mut self, index: usize) {
        self.states[index] = ItemState::Uploading;
        self.stats.processing += 1;
    }

    /// Record a non-terminal progress report from an item task
    ///
    /// Terminal states are ignored here; they are applied by the scheduler
    /// at settlement together with the counter updates.
    pub(crate) fn report_progress(&mut self, index: usize, state: ItemState) {
        if !state.is_terminal() {
            self.states[index] = state;
        }
    }

    /// Terminal settlement on success
    pub(crate) fn settle_success(&mut self, index: usize) {
        self.states[index] = ItemState::Completed;
        self.stats.completed += 1;
        self.stats.processing = self.stats.processing.saturating_sub(1);
    }

    /// Terminal settlement on failure
    pub(crate) fn settle_failure(&mut self, index: usize) {
        self.states[index] = ItemState::Failed;
        self.stats.errors += 1;
        self.stats.processing = self.stats.processing.saturating_sub(1);
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn non_terminal(session: &RunSession) -> usize {
        session.states.iter().filter(|s| !s.is_terminal()).count()
    }

    fn invariant_holds(session: &RunSession) -> bool {
        session.stats.completed + session.stats.errors + non_terminal(session)
            == session.stats.total
    }

    #[test]
    fn fresh_session_starts_all_waiting() {
        let session = RunSession::for_items(4);
        assert_eq!(session.states, vec![ItemState::Waiting; 4]);
        assert_eq!(session.stats.total, 4);
        assert_eq!(session.stats.processing, 0);
        assert!(invariant_holds(&session));
    }

    #[test]
    fn pre_mark_bumps_processing_before_settlement() {
        let mut session = RunSession::for_items(3);
        session.mark_uploading(0);
        session.mark_uploading(1);

        assert_eq!(session.stats.processing, 2);
        assert_eq!(session.states[0], ItemState::Uploading);
        assert!(invariant_holds(&session));
    }

    #[test]
    fn settlement_keeps_counters_consistent() {
        let mut session = RunSession::for_items(3);
        session.mark_uploading(0);
        session.mark_uploading(1);
        session.mark_uploading(2);

        session.settle_success(0);
        session.settle_failure(1);
        session.settle_success(2);

        assert_eq!(session.stats.completed, 2);
        assert_eq!(session.stats.errors, 1);
        assert_eq!(session.stats.processing, 0);
        assert_eq!(session.states[1], ItemState::Failed);
        assert!(invariant_holds(&session));
    }

    #[test]
    fn progress_reports_never_apply_terminal_states() {
        let mut session = RunSession::for_items(1);
        session.mark_uploading(0);

        session.report_progress(0, ItemState::Transforming);
        assert_eq!(session.states[0], ItemState::Transforming);

        // A task's own completion report is deferred to settlement so the
        // state flip and the counter increment stay atomic.
        session.report_progress(0, ItemState::Completed);
        assert_eq!(session.states[0], ItemState::Transforming);
        assert!(invariant_holds(&session));
    }

    #[test]
    fn clear_is_idempotent() {
        let mut session = RunSession::for_items(5);
        session.mark_uploading(0);
        session.settle_failure(0);

        session.clear();
        assert!(session.states.is_empty());
        assert_eq!(session.stats, BatchStats::default());

        session.clear();
        assert!(session.states.is_empty());
        assert_eq!(session.stats, BatchStats::default());
    }
}
