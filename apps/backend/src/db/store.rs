//! SQLite-backed card and review-state storage.
//!
//! The review-state table is the key-value state store of the review
//! engine: one `{step, last_reviewed, due_date}` row per card id, upserted
//! on every review mutation. Reads are defensive: corrupt timestamps and
//! out-of-range steps load as sane defaults instead of failing.

use crate::db::error::DbError;
use recallbox_core::types::{parse_timestamp, Card, ReviewState};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;

type Result<T> = std::result::Result<T, DbError>;

/// Card CRUD operations.
pub trait CardStore {
    fn get_card(&self, id: &str) -> Result<Option<Card>>;
    fn list_cards(&self, module: Option<&str>) -> Result<Vec<Card>>;
    fn upsert_card(&self, card: &Card) -> Result<()>;
    fn upsert_cards(&self, cards: &[Card]) -> Result<usize>;
    fn delete_card(&self, id: &str) -> Result<()>;
    fn modules(&self) -> Result<Vec<String>>;
}

/// Review-state store operations.
pub trait StateStore {
    fn get_state(&self, card_id: &str) -> Result<Option<ReviewState>>;
    fn save_state(&self, card_id: &str, state: &ReviewState) -> Result<()>;
    fn delete_state(&self, card_id: &str) -> Result<()>;
    fn all_states(&self) -> Result<HashMap<String, ReviewState>>;
}

/// SQLite implementation of both stores.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        crate::db::schema::init(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        crate::db::schema::init(&conn)?;
        Ok(Self { conn })
    }

    fn card_from_row(row: &Row<'_>) -> rusqlite::Result<Card> {
        Ok(Card {
            id: row.get("id")?,
            title: row.get("title")?,
            module: row.get("module")?,
            front_text: row.get("front_text")?,
            back_text: row.get("back_text")?,
            my_sentence: row.get("my_sentence")?,
            corrected: row.get("corrected")?,
            created: row.get("created")?,
        })
    }

    fn state_from_row(row: &Row<'_>) -> rusqlite::Result<ReviewState> {
        let step: i64 = row.get("step")?;
        let last_reviewed: Option<String> = row.get("last_reviewed")?;
        let due_date: Option<String> = row.get("due_date")?;

        Ok(ReviewState {
            step: step.max(0).min(u32::MAX as i64) as u32,
            last_reviewed: last_reviewed.as_deref().and_then(parse_timestamp),
            due_date: due_date.as_deref().and_then(parse_timestamp),
        })
    }
}

const SELECT_CARD: &str =
    "SELECT id, title, module, front_text, back_text, my_sentence, corrected, created FROM cards";

// Keeps the original load position for existing rows and appends new ones
// at the end, so due listings stay in stable input order.
const UPSERT_CARD: &str = "
INSERT INTO cards (id, title, module, front_text, back_text, my_sentence, corrected, created, position)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8,
        COALESCE((SELECT position FROM cards WHERE id = ?1),
                 (SELECT COALESCE(MAX(position), 0) + 1 FROM cards)))
ON CONFLICT(id) DO UPDATE SET
    title = excluded.title,
    module = excluded.module,
    front_text = excluded.front_text,
    back_text = excluded.back_text,
    my_sentence = excluded.my_sentence,
    corrected = excluded.corrected,
    created = excluded.created
";

impl CardStore for SqliteStore {
    fn get_card(&self, id: &str) -> Result<Option<Card>> {
        let query = format!("{} WHERE id = ?1", SELECT_CARD);
        let card = self
            .conn
            .query_row(&query, params![id], Self::card_from_row)
            .optional()?;
        Ok(card)
    }

    fn list_cards(&self, module: Option<&str>) -> Result<Vec<Card>> {
        let (query, bind): (String, Vec<&str>) = match module {
            Some(m) => (
                format!("{} WHERE module = ?1 ORDER BY position", SELECT_CARD),
                vec![m],
            ),
            None => (format!("{} ORDER BY position", SELECT_CARD), vec![]),
        };

        let mut stmt = self.conn.prepare(&query)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(bind), Self::card_from_row)?;
        let mut cards = Vec::new();
        for card in rows {
            cards.push(card?);
        }
        Ok(cards)
    }

    fn upsert_card(&self, card: &Card) -> Result<()> {
        self.conn.execute(
            UPSERT_CARD,
            params![
                card.id,
                card.title,
                card.module,
                card.front_text,
                card.back_text,
                card.my_sentence,
                card.corrected,
                card.created,
            ],
        )?;
        Ok(())
    }

    fn upsert_cards(&self, cards: &[Card]) -> Result<usize> {
        for card in cards {
            self.upsert_card(card)?;
        }
        Ok(cards.len())
    }

    fn delete_card(&self, id: &str) -> Result<()> {
        let affected = self
            .conn
            .execute("DELETE FROM cards WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(DbError::CardNotFound(id.to_string()));
        }
        // State rows for deleted cards are left behind on purpose: the
        // store is keyed by stable card id and a re-imported card picks
        // its progress back up.
        Ok(())
    }

    fn modules(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT module FROM cards WHERE module != '' ORDER BY module")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut modules = Vec::new();
        for module in rows {
            modules.push(module?);
        }
        Ok(modules)
    }
}

impl StateStore for SqliteStore {
    fn get_state(&self, card_id: &str) -> Result<Option<ReviewState>> {
        let state = self
            .conn
            .query_row(
                "SELECT step, last_reviewed, due_date FROM review_states WHERE card_id = ?1",
                params![card_id],
                Self::state_from_row,
            )
            .optional()?;
        Ok(state)
    }

    fn save_state(&self, card_id: &str, state: &ReviewState) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO review_states (card_id, step, last_reviewed, due_date)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                card_id,
                state.step,
                state.last_reviewed.map(|dt| dt.to_rfc3339()),
                state.due_date.map(|dt| dt.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    fn delete_state(&self, card_id: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM review_states WHERE card_id = ?1",
            params![card_id],
        )?;
        Ok(())
    }

    fn all_states(&self) -> Result<HashMap<String, ReviewState>> {
        let mut stmt = self
            .conn
            .prepare("SELECT card_id, step, last_reviewed, due_date FROM review_states")?;
        let rows = stmt.query_map([], |row| {
            let card_id: String = row.get("card_id")?;
            let state = Self::state_from_row(row)?;
            Ok((card_id, state))
        })?;

        let mut states = HashMap::new();
        for entry in rows {
            let (card_id, state) = entry?;
            states.insert(card_id, state);
        }
        Ok(states)
    }
}
