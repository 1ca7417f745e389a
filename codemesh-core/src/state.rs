//! Dashboard presentation state, mutated only through named transitions.
//!
//! Both flows write here: the analysis flow through [`DashboardState::begin_analysis`]
//! / [`DashboardState::finish_analysis`], the sync flow through
//! [`DashboardState::replace_events`]. Execution is single-threaded (the TUI
//! select loop applies every transition), but the two flows interleave
//! arbitrarily at the message level, so two guards make the races explicit:
//!
//! - a monotonically increasing request sequence discards stale analysis
//!   results when submissions overlap (last dispatched wins, not last to
//!   resolve);
//! - a `closed` flag discards poll results that arrive after teardown.

use crate::reply::ReplyOutcome;
use crate::types::{EventRecord, HealthMetric, RefactorItem, StructuredAnalysis};

/// All state the dashboard renders from.
#[derive(Debug)]
pub struct DashboardState {
    /// Narrative text for the response panel (markdown)
    pub narrative: String,
    /// True while the freshest analysis request is in flight
    pub busy: bool,
    /// Health metric rows for the sidebar gauges
    pub health_scores: Vec<HealthMetric>,
    /// Refactor queue entries
    pub refactor_queue: Vec<RefactorItem>,
    /// Live event feed, replaced wholesale by the sync loop
    pub events: Vec<EventRecord>,
    /// False once a poll has failed more recently than it has succeeded
    pub feed_live: bool,
    /// Sequence of the most recently dispatched analysis request
    latest_seq: u64,
    /// Torn down; event writes are discarded
    closed: bool,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardState {
    /// Fresh state with the placeholder panel rows shown before the first
    /// Architect reply arrives.
    pub fn new() -> Self {
        Self {
            narrative: String::new(),
            busy: false,
            health_scores: vec![
                placeholder_metric("Modularity", "A-", 85.0),
                placeholder_metric("Documentation", "C+", 65.0),
                placeholder_metric("Test Coverage", "B", 78.0),
            ],
            refactor_queue: vec![
                RefactorItem {
                    file: "AuthService.ts".to_string(),
                    issue: "High Coupling".to_string(),
                    severity: "High".to_string(),
                },
                RefactorItem {
                    file: "Global Styles".to_string(),
                    issue: "Unused CSS variables".to_string(),
                    severity: "Low".to_string(),
                },
            ],
            events: Vec::new(),
            feed_live: false,
            latest_seq: 0,
            closed: false,
        }
    }

    // ========== Analysis flow ==========

    /// Start a new analysis round trip: bump the request sequence, raise the
    /// busy flag, and optimistically clear the narrative. Structured panels
    /// are left untouched until a partial update actually arrives.
    ///
    /// Returns the sequence number to attach to the in-flight request.
    pub fn begin_analysis(&mut self) -> u64 {
        self.latest_seq += 1;
        self.busy = true;
        self.narrative.clear();
        self.latest_seq
    }

    /// Complete an analysis round trip.
    ///
    /// A result carrying anything older than the freshest dispatched sequence
    /// is discarded: a newer request is (or was) in flight and owns the
    /// panels. Returns whether the outcome was applied. The busy flag clears
    /// only with the freshest result, on every exit path (success, parse
    /// fallback, transport error - the caller encodes errors as narrative).
    pub fn finish_analysis(&mut self, seq: u64, outcome: ReplyOutcome) -> bool {
        if seq != self.latest_seq {
            tracing::debug!(seq, latest = self.latest_seq, "Discarding stale analysis result");
            return false;
        }
        self.busy = false;
        match outcome {
            ReplyOutcome::Narrative(text) => self.set_narrative(text),
            ReplyOutcome::Structured(update) => self.apply_partial_update(&update),
        }
        true
    }

    /// Replace the narrative text.
    pub fn set_narrative(&mut self, text: impl Into<String>) {
        self.narrative = text.into();
    }

    /// Apply a structured payload field by field. Fields absent from the
    /// payload leave the existing panels untouched (last-good-value
    /// persistence, not reset-to-empty).
    pub fn apply_partial_update(&mut self, update: &StructuredAnalysis) {
        if let Some(summary) = &update.summary {
            self.narrative = summary.clone();
        }
        if let Some(scores) = &update.health_scores {
            self.health_scores = scores.clone();
        }
        if let Some(suggestions) = &update.refactor_suggestions {
            self.refactor_queue = suggestions.clone();
        }
    }

    // ========== Sync flow ==========

    /// Replace the event feed wholesale with the latest successful poll.
    /// Discarded after [`DashboardState::close`]; returns whether the write
    /// was applied.
    pub fn replace_events(&mut self, events: Vec<EventRecord>) -> bool {
        if self.closed {
            tracing::debug!("Discarding event poll result after teardown");
            return false;
        }
        self.events = events;
        self.feed_live = true;
        true
    }

    /// Record a failed poll. The previous event list stays intact; only the
    /// liveness indicator changes.
    pub fn mark_feed_stale(&mut self) {
        if !self.closed {
            self.feed_live = false;
        }
    }

    // ========== Teardown ==========

    /// Tear the state down. Every subsequent event write is a no-op.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

fn placeholder_metric(metric: &str, score: &str, value: f64) -> HealthMetric {
    HealthMetric {
        metric: metric.to_string(),
        score: score.to_string(),
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EventDetails;

    fn event(title: &str) -> EventRecord {
        EventRecord {
            id: None,
            kind: "webhook_pr".to_string(),
            timestamp: "2024-06-01T10:00:00".to_string(),
            details: EventDetails {
                title: title.to_string(),
                user: "octocat".to_string(),
                action: None,
            },
            analysis: None,
        }
    }

    #[test]
    fn test_begin_analysis_clears_narrative_only() {
        let mut state = DashboardState::new();
        state.set_narrative("previous reply");
        let seeded_scores = state.health_scores.clone();
        let seeded_queue = state.refactor_queue.clone();

        let seq = state.begin_analysis();
        assert_eq!(seq, 1);
        assert!(state.busy);
        assert!(state.narrative.is_empty());
        // Optimistic reset leaves the structured panels alone
        assert_eq!(state.health_scores, seeded_scores);
        assert_eq!(state.refactor_queue, seeded_queue);
    }

    #[test]
    fn test_partial_update_law_summary_only() {
        let mut state = DashboardState::new();
        let scores_before = state.health_scores.clone();
        let queue_before = state.refactor_queue.clone();

        let seq = state.begin_analysis();
        let applied = state.finish_analysis(
            seq,
            ReplyOutcome::Structured(StructuredAnalysis {
                summary: Some("ok".to_string()),
                ..Default::default()
            }),
        );

        assert!(applied);
        assert!(!state.busy);
        assert_eq!(state.narrative, "ok");
        assert_eq!(state.health_scores, scores_before);
        assert_eq!(state.refactor_queue, queue_before);
    }

    #[test]
    fn test_narrative_fallback_leaves_panels_unchanged() {
        let mut state = DashboardState::new();
        // First a structured reply populates the panels
        let seq = state.begin_analysis();
        state.finish_analysis(
            seq,
            ReplyOutcome::Structured(StructuredAnalysis {
                health_scores: Some(vec![placeholder_metric("Layering", "B+", 80.0)]),
                refactor_suggestions: Some(vec![]),
                ..Default::default()
            }),
        );
        let scores_after_update = state.health_scores.clone();

        // Then a malformed reply falls back to narrative
        let seq = state.begin_analysis();
        state.finish_analysis(seq, ReplyOutcome::Narrative("raw text".to_string()));
        assert_eq!(state.narrative, "raw text");
        assert_eq!(state.health_scores, scores_after_update);
        assert!(state.refactor_queue.is_empty());
    }

    #[test]
    fn test_stale_analysis_result_is_discarded() {
        let mut state = DashboardState::new();
        let first = state.begin_analysis();
        let second = state.begin_analysis();

        // The slower first request resolves after the second was dispatched
        let applied = state.finish_analysis(first, ReplyOutcome::Narrative("old".to_string()));
        assert!(!applied);
        assert!(state.narrative.is_empty());
        assert!(state.busy, "stale result must not clear the busy flag");

        let applied = state.finish_analysis(second, ReplyOutcome::Narrative("new".to_string()));
        assert!(applied);
        assert_eq!(state.narrative, "new");
        assert!(!state.busy);
    }

    #[test]
    fn test_replace_events_is_wholesale() {
        let mut state = DashboardState::new();
        assert!(state.replace_events(vec![event("first"), event("second")]));
        assert_eq!(state.events.len(), 2);
        assert!(state.feed_live);

        // The next successful poll fully replaces, never merges
        assert!(state.replace_events(vec![event("third")]));
        assert_eq!(state.events.len(), 1);
        assert_eq!(state.events[0].details.title, "third");
    }

    #[test]
    fn test_failed_poll_keeps_previous_list() {
        let mut state = DashboardState::new();
        state.replace_events(vec![event("kept")]);
        state.mark_feed_stale();
        assert_eq!(state.events.len(), 1);
        assert!(!state.feed_live);
    }

    #[test]
    fn test_no_event_writes_after_close() {
        let mut state = DashboardState::new();
        state.replace_events(vec![event("before")]);
        state.close();

        assert!(!state.replace_events(vec![event("late")]));
        assert_eq!(state.events[0].details.title, "before");
    }
}
