//! Card ingestion from JSON files and CSV exports.

use anyhow::Context;
use recallbox_core::{normalize_cards, Card, FieldAliases};
use serde_json::{Map, Value};
use std::path::Path;

/// Load and normalize a JSON card file (an array of raw card objects).
pub fn load_cards_file(path: &Path) -> anyhow::Result<Vec<Card>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading card file {}", path.display()))?;
    let raw: Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    let cards = normalize_cards(&raw, &FieldAliases::default())?;
    Ok(cards)
}

/// Convert a CSV export into normalized cards.
///
/// Column names prefixed `front_` / `back_` land in the card's front/back
/// object under the remaining (lowercased) name; other columns are card
/// metadata. Columns whose header starts with `#` are ignored.
pub fn csv_to_cards(text: &str) -> anyhow::Result<Vec<Card>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let headers = reader.headers().context("reading CSV headers")?.clone();

    let mut raws = Vec::new();
    for record in reader.records() {
        let record = record.context("reading CSV record")?;

        let mut front = Map::new();
        let mut back = Map::new();
        let mut meta = Map::new();

        for (key, value) in headers.iter().zip(record.iter()) {
            if key.starts_with('#') || value.is_empty() {
                continue;
            }
            let lower = key.to_lowercase();
            let value = Value::String(value.to_string());

            if let Some(rest) = lower.strip_prefix("front_") {
                front.insert(rest.to_string(), value);
            } else if let Some(rest) = lower.strip_prefix("back_") {
                back.insert(rest.to_string(), value);
            } else {
                meta.insert(lower, value);
            }
        }

        let mut obj = meta;
        obj.insert("front".to_string(), Value::Object(front));
        obj.insert("back".to_string(), Value::Object(back));
        raws.push(Value::Object(obj));
    }

    let cards = normalize_cards(&Value::Array(raws), &FieldAliases::default())?;
    Ok(cards)
}
