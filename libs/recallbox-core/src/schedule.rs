//! Fixed-step interval scheduling.
//!
//! A card climbs a configured plan of day gaps (default `[3, 6, 12]`): each
//! completed review advances the step by one, saturating at the plan length,
//! and pushes the due date out by the gap for the new step. Past the last
//! configured stage the final gap repeats indefinitely.

use crate::types::{Card, ReviewState};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Day gaps of the reference review cadence.
pub const DEFAULT_PLAN: [i64; 3] = [3, 6, 12];

/// Gap used when the plan has no entries at all.
const EMPTY_PLAN_GAP_DAYS: i64 = 12;

/// Ordered day gaps per review stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntervalPlan(Vec<i64>);

impl Default for IntervalPlan {
    fn default() -> Self {
        Self(DEFAULT_PLAN.to_vec())
    }
}

impl IntervalPlan {
    /// Build a plan from day gaps, discarding non-positive entries.
    pub fn new(gaps: Vec<i64>) -> Self {
        Self(gaps.into_iter().filter(|g| *g > 0).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn gaps(&self) -> &[i64] {
        &self.0
    }

    /// Day gap applied when a review lands on `step` (1-based).
    ///
    /// Steps past the plan reuse the last configured gap; an empty plan
    /// falls back to a fixed 12 days.
    pub fn gap_for_step(&self, step: u32) -> i64 {
        let idx = step.saturating_sub(1) as usize;
        self.0
            .get(idx)
            .or_else(|| self.0.last())
            .copied()
            .unwrap_or(EMPTY_PLAN_GAP_DAYS)
    }
}

/// Result of completing a review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleOutcome {
    pub new_state: ReviewState,
    pub next_due: DateTime<Utc>,
}

/// Interval scheduler over a configured plan.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    plan: IntervalPlan,
}

impl Scheduler {
    pub fn new(plan: IntervalPlan) -> Self {
        Self { plan }
    }

    pub fn plan(&self) -> &IntervalPlan {
        &self.plan
    }

    /// Whether a card is due as of the given instant.
    ///
    /// Comparison is by calendar day, not instant: a card due today stays
    /// due for the whole day. A card with no due date was never reviewed
    /// and is always due.
    pub fn is_due(&self, state: &ReviewState, as_of: DateTime<Utc>) -> bool {
        match state.due_date {
            None => true,
            Some(due) => due.date_naive() <= as_of.date_naive(),
        }
    }

    /// Advance the state after a successful review.
    ///
    /// Pure date arithmetic; the caller owns the write-through of
    /// `new_state` to its store.
    pub fn complete_review(&self, state: &ReviewState, now: DateTime<Utc>) -> ScheduleOutcome {
        let next_step = (state.step + 1).min(self.plan.len() as u32);
        let gap_days = self.plan.gap_for_step(next_step.max(1));
        let next_due = now + Duration::days(gap_days);

        ScheduleOutcome {
            new_state: ReviewState {
                step: next_step,
                last_reviewed: Some(now),
                due_date: Some(next_due),
            },
            next_due,
        }
    }

    /// Wipe all progress. Idempotent.
    pub fn reset_progress(&self) -> ReviewState {
        ReviewState::default()
    }

    /// Filter `cards` down to the due ones, preserving input order.
    ///
    /// Cards missing from `states` have never been reviewed and are due.
    pub fn due_list<'a>(
        &self,
        cards: &'a [Card],
        states: &HashMap<String, ReviewState>,
        as_of: DateTime<Utc>,
    ) -> Vec<&'a Card> {
        cards
            .iter()
            .filter(|card| match states.get(&card.id) {
                Some(state) => self.is_due(state, as_of),
                None => true,
            })
            .collect()
    }

    /// Repair a state read from storage.
    ///
    /// Clamps the step into `[0, plan length]`; date fields are already
    /// `Option` so unparseable values arrive here as `None`.
    pub fn sanitize(&self, mut state: ReviewState) -> ReviewState {
        state.step = state.step.min(self.plan.len() as u32);
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap() + Duration::days(n)
    }

    fn scheduler() -> Scheduler {
        Scheduler::new(IntervalPlan::default())
    }

    #[test]
    fn fresh_card_is_always_due() {
        let s = scheduler();
        let state = ReviewState::default();
        assert!(s.is_due(&state, day(0)));
        assert!(s.is_due(&state, day(-365)));
        assert!(s.is_due(&state, day(365)));
    }

    #[test]
    fn due_comparison_ignores_time_of_day() {
        let s = scheduler();
        let state = ReviewState {
            step: 1,
            last_reviewed: Some(day(0)),
            due_date: Some(Utc.with_ymd_and_hms(2024, 3, 4, 23, 59, 0).unwrap()),
        };
        // Due the morning of the same calendar day.
        let early = Utc.with_ymd_and_hms(2024, 3, 4, 0, 1, 0).unwrap();
        assert!(s.is_due(&state, early));
        // Not due the evening before.
        let eve = Utc.with_ymd_and_hms(2024, 3, 3, 23, 59, 0).unwrap();
        assert!(!s.is_due(&state, eve));
    }

    #[test]
    fn review_advances_step_and_due_date() {
        let s = scheduler();
        let out = s.complete_review(&ReviewState::default(), day(0));
        assert_eq!(out.new_state.step, 1);
        assert_eq!(out.new_state.last_reviewed, Some(day(0)));
        assert_eq!(out.new_state.due_date, Some(day(3)));
        assert_eq!(out.next_due, day(3));
    }

    #[test]
    fn full_plan_scenario() {
        // Plan [3, 6, 12]: reviews at day 0, 3, 9, 21 land at
        // step 1/2/3/3 and due day 3/9/21/33.
        let s = scheduler();

        let out1 = s.complete_review(&ReviewState::default(), day(0));
        assert_eq!((out1.new_state.step, out1.next_due), (1, day(3)));

        let out2 = s.complete_review(&out1.new_state, day(3));
        assert_eq!((out2.new_state.step, out2.next_due), (2, day(9)));

        let out3 = s.complete_review(&out2.new_state, day(9));
        assert_eq!((out3.new_state.step, out3.next_due), (3, day(21)));

        // Step saturates; the final gap repeats.
        let out4 = s.complete_review(&out3.new_state, day(21));
        assert_eq!((out4.new_state.step, out4.next_due), (3, day(33)));

        let out5 = s.complete_review(&out4.new_state, day(33));
        assert_eq!((out5.new_state.step, out5.next_due), (3, day(45)));
    }

    #[test]
    fn reset_is_idempotent() {
        let s = scheduler();
        let reviewed = s.complete_review(&ReviewState::default(), day(0)).new_state;
        assert!(!reviewed.is_fresh());

        let once = s.reset_progress();
        let twice = s.reset_progress();
        assert_eq!(once, twice);
        assert!(once.is_fresh());
    }

    #[test]
    fn empty_plan_uses_fallback_gap() {
        let s = Scheduler::new(IntervalPlan::new(vec![]));
        let out = s.complete_review(&ReviewState::default(), day(0));
        assert_eq!(out.next_due, day(EMPTY_PLAN_GAP_DAYS));
        assert_eq!(out.new_state.step, 0);
    }

    #[test]
    fn plan_discards_non_positive_gaps() {
        let plan = IntervalPlan::new(vec![0, 3, -1, 6]);
        assert_eq!(plan.gaps(), &[3, 6]);
    }

    #[test]
    fn gap_lookup_past_plan_reuses_last() {
        let plan = IntervalPlan::new(vec![2, 5]);
        assert_eq!(plan.gap_for_step(1), 2);
        assert_eq!(plan.gap_for_step(2), 5);
        assert_eq!(plan.gap_for_step(3), 5);
        assert_eq!(plan.gap_for_step(99), 5);
    }

    #[test]
    fn sanitize_clamps_step() {
        let s = scheduler();
        let state = ReviewState {
            step: 40,
            last_reviewed: None,
            due_date: None,
        };
        assert_eq!(s.sanitize(state).step, 3);
    }

    #[test]
    fn due_list_preserves_order_and_defaults() {
        let s = scheduler();
        let card = |id: &str| Card {
            id: id.to_string(),
            title: id.to_string(),
            module: String::new(),
            front_text: String::new(),
            back_text: String::new(),
            my_sentence: String::new(),
            corrected: String::new(),
            created: None,
        };
        let cards = vec![card("a"), card("b"), card("c")];

        let mut states = HashMap::new();
        // "b" was reviewed and is not yet due; "a" and "c" have no state.
        states.insert(
            "b".to_string(),
            ReviewState {
                step: 1,
                last_reviewed: Some(day(0)),
                due_date: Some(day(3)),
            },
        );

        let due = s.due_list(&cards, &states, day(1));
        let ids: Vec<&str> = due.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);

        let due_later = s.due_list(&cards, &states, day(3));
        let ids: Vec<&str> = due_later.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
