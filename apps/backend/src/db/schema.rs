//! SQLite schema.

use rusqlite::Connection;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS cards (
    id          TEXT PRIMARY KEY,
    title       TEXT NOT NULL DEFAULT '',
    module      TEXT NOT NULL DEFAULT '',
    front_text  TEXT NOT NULL DEFAULT '',
    back_text   TEXT NOT NULL DEFAULT '',
    my_sentence TEXT NOT NULL DEFAULT '',
    corrected   TEXT NOT NULL DEFAULT '',
    created     TEXT,
    position    INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS review_states (
    card_id       TEXT PRIMARY KEY,
    step          INTEGER NOT NULL DEFAULT 0,
    last_reviewed TEXT,
    due_date      TEXT
);

CREATE INDEX IF NOT EXISTS idx_cards_module ON cards(module);
";

/// Create tables and indexes if missing.
pub fn init(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)
}
