//! Caller-owned review session.
//!
//! Holds the loaded cards, their review states, and the view position
//! (module filter, current index, back-side visibility) as one explicit
//! object. Review mutations go through the scheduler and hand back the
//! `(card id, new state)` record so the caller can write it through to its
//! store; a failed persist never corrupts what the caller already sees.

use crate::schedule::Scheduler;
use crate::types::{Card, ReviewState};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

/// Navigation history depth before old entries fall off.
const HISTORY_LIMIT: usize = 50;

/// One "where was I" snapshot pushed when jumping between cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavSnapshot {
    pub module_filter: Option<String>,
    pub card_id: String,
}

/// View summary for a rendering layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub total: usize,
    pub index: usize,
    pub due_today: usize,
    pub show_back: bool,
    pub module_filter: Option<String>,
}

/// In-memory review session over a loaded card set.
pub struct Session {
    cards: Vec<Card>,
    states: HashMap<String, ReviewState>,
    scheduler: Scheduler,
    index: usize,
    show_back: bool,
    module_filter: Option<String>,
    history: Vec<NavSnapshot>,
}

impl Session {
    /// Build a session, sanitizing whatever states the store handed back.
    pub fn new(
        cards: Vec<Card>,
        states: HashMap<String, ReviewState>,
        scheduler: Scheduler,
    ) -> Self {
        let states = states
            .into_iter()
            .map(|(id, state)| {
                let sanitized = scheduler.sanitize(state);
                (id, sanitized)
            })
            .collect();

        Self {
            cards,
            states,
            scheduler,
            index: 0,
            show_back: false,
            module_filter: None,
            history: Vec::new(),
        }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Distinct non-empty module names, sorted.
    pub fn modules(&self) -> Vec<String> {
        let mut modules: Vec<String> = self
            .cards
            .iter()
            .map(|c| c.module.clone())
            .filter(|m| !m.is_empty())
            .collect();
        modules.sort();
        modules.dedup();
        modules
    }

    pub fn module_filter(&self) -> Option<&str> {
        self.module_filter.as_deref()
    }

    /// Switch the module filter. Resets position and clears history.
    pub fn set_module_filter(&mut self, module: Option<String>) {
        self.module_filter = module.filter(|m| !m.is_empty());
        self.index = 0;
        self.show_back = false;
        self.history.clear();
    }

    /// Cards visible under the current filter, in load order.
    pub fn filtered(&self) -> Vec<&Card> {
        self.cards
            .iter()
            .filter(|c| match &self.module_filter {
                Some(module) => c.module == *module,
                None => true,
            })
            .collect()
    }

    pub fn current(&self) -> Option<&Card> {
        self.filtered().get(self.index).copied()
    }

    /// Review state for a card, defaulting for never-reviewed ones.
    pub fn state_of(&self, card_id: &str) -> ReviewState {
        self.states.get(card_id).cloned().unwrap_or_default()
    }

    /// Due cards under the current filter, preserving order.
    pub fn due_list(&self, as_of: DateTime<Utc>) -> Vec<&Card> {
        self.filtered()
            .into_iter()
            .filter(|c| self.scheduler.is_due(&self.state_of(&c.id), as_of))
            .collect()
    }

    /// Move onto the first due card, like the initial load does.
    pub fn focus_first_due(&mut self, as_of: DateTime<Utc>) {
        let target = self.due_list(as_of).first().map(|c| c.id.clone());
        if let Some(id) = target {
            if let Some(pos) = self.filtered().iter().position(|c| c.id == id) {
                self.index = pos;
            }
        } else {
            self.index = 0;
        }
        self.show_back = false;
    }

    pub fn show_back(&self) -> bool {
        self.show_back
    }

    pub fn toggle_back(&mut self) {
        self.show_back = !self.show_back;
    }

    pub fn next(&mut self) {
        let len = self.filtered().len();
        if len > 0 {
            self.index = (self.index + 1) % len;
        }
        self.show_back = false;
    }

    pub fn prev(&mut self) {
        let len = self.filtered().len();
        if len > 0 {
            self.index = (self.index + len - 1) % len;
        }
        self.show_back = false;
    }

    /// Reorder the whole card list randomly and restart at the front.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
        self.index = 0;
        self.show_back = false;
    }

    /// Jump to a card in the current view, remembering where we came from.
    ///
    /// Returns false (and stays put) when the id is not in the filtered
    /// list.
    pub fn jump_to(&mut self, card_id: &str) -> bool {
        let target = match self.filtered().iter().position(|c| c.id == card_id) {
            Some(pos) => pos,
            None => return false,
        };

        if let Some(current) = self.current() {
            let snapshot = NavSnapshot {
                module_filter: self.module_filter.clone(),
                card_id: current.id.clone(),
            };
            if self.history.len() == HISTORY_LIMIT {
                self.history.remove(0);
            }
            self.history.push(snapshot);
        }

        self.index = target;
        self.show_back = false;
        true
    }

    /// Pop the navigation stack and return to the snapshotted position.
    pub fn back(&mut self) -> bool {
        let snapshot = match self.history.pop() {
            Some(s) => s,
            None => return false,
        };

        self.module_filter = snapshot.module_filter;
        self.index = self
            .filtered()
            .iter()
            .position(|c| c.id == snapshot.card_id)
            .unwrap_or(0);
        self.show_back = false;
        true
    }

    /// Complete a review of the current card.
    ///
    /// Updates the in-memory state and returns the record the caller must
    /// persist; `None` when no card is selected.
    pub fn complete_review(&mut self, now: DateTime<Utc>) -> Option<(String, ReviewState)> {
        let card_id = self.current()?.id.clone();
        let outcome = self.scheduler.complete_review(&self.state_of(&card_id), now);
        self.states.insert(card_id.clone(), outcome.new_state.clone());
        Some((card_id, outcome.new_state))
    }

    /// Reset the current card's progress.
    pub fn reset_progress(&mut self) -> Option<(String, ReviewState)> {
        let card_id = self.current()?.id.clone();
        let state = self.scheduler.reset_progress();
        self.states.insert(card_id.clone(), state.clone());
        Some((card_id, state))
    }

    pub fn status(&self, as_of: DateTime<Utc>) -> SessionStatus {
        SessionStatus {
            total: self.filtered().len(),
            index: self.index,
            due_today: self.due_list(as_of).len(),
            show_back: self.show_back,
            module_filter: self.module_filter.clone(),
        }
    }
}
