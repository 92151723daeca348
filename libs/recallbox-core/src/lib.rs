//! Core review library shared by the recallbox applications.
//!
//! Provides:
//! - Normalization of heterogeneous card JSON into one canonical shape
//! - Fixed-step interval scheduling (due decisions, review transitions)
//! - Word-level sentence alignment with case-change detection
//! - A caller-owned review session (filter, navigation, history)

pub mod diff;
pub mod error;
pub mod normalize;
pub mod schedule;
pub mod session;
pub mod types;

pub use diff::{escape_html, render_html, tokenize, word_diff, DiffKind, DiffSpan};
pub use error::{NormalizeError, Result};
pub use normalize::{extract_sentence_pair, hash_id, normalize_card, normalize_cards, FieldAliases};
pub use schedule::{IntervalPlan, ScheduleOutcome, Scheduler, DEFAULT_PLAN};
pub use session::{NavSnapshot, Session, SessionStatus};
pub use types::{parse_timestamp, Card, ReviewState};
