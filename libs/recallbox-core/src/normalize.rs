//! Card normalization.
//!
//! Source JSON arrives in several key-naming schemes: a nested shape with
//! `front`/`back` sub-objects, a flat editor shape with capitalized keys,
//! and back sides that are sometimes a labeled plain-text blob. Each
//! logical field carries an ordered list of accepted key aliases, resolved
//! once here into the canonical [`Card`]; nothing downstream ever sees the
//! raw shapes.

use crate::error::{NormalizeError, Result};
use crate::types::Card;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Ordered key aliases per logical card field.
///
/// Resolution tries each alias in order and takes the first present,
/// non-empty value. The defaults mirror the key variants found in
/// existing card files.
#[derive(Debug, Clone)]
pub struct FieldAliases {
    pub id: Vec<String>,
    pub title: Vec<String>,
    pub module: Vec<String>,
    pub original: Vec<String>,
    pub tone: Vec<String>,
    pub explain: Vec<String>,
    pub usage: Vec<String>,
    pub extended: Vec<String>,
    pub my_sentence: Vec<String>,
    pub corrected: Vec<String>,
    pub explain_corrected: Vec<String>,
    pub fluency: Vec<String>,
    pub created: Vec<String>,
    pub front_text: Vec<String>,
    pub back_text: Vec<String>,
}

fn keys(list: &[&str]) -> Vec<String> {
    list.iter().map(|k| k.to_string()).collect()
}

impl Default for FieldAliases {
    fn default() -> Self {
        Self {
            id: keys(&["id", "cardId", "card_id"]),
            title: keys(&["title", "key_module", "keyModule"]),
            module: keys(&["module", "key_module"]),
            original: keys(&["Original", "original"]),
            tone: keys(&["ToneCondition", "Tone_Condition", "tone_condition", "Tone", "tone"]),
            explain: keys(&["Explain", "explain"]),
            usage: keys(&["Usage", "usage"]),
            extended: keys(&["Extended", "extended"]),
            my_sentence: keys(&["My sentence", "Mysentence", "MySentence", "my", "my_sentence"]),
            corrected: keys(&[
                "AI correction",
                "Corrected",
                "corrected",
                "ai",
                "ai_sentence",
                "ai_correction",
            ]),
            explain_corrected: keys(&["ExplainCorrected", "explain_corrected"]),
            fluency: keys(&["Fluency", "fluency"]),
            created: keys(&["created", "Createdtime", "created_time"]),
            // Already-canonical cards (e.g. an export being re-imported)
            // carry their rendered texts directly.
            front_text: keys(&["front_text", "frontText"]),
            back_text: keys(&["back_text", "backText"]),
        }
    }
}

/// First present, non-empty value for any of the aliases, as a string.
fn resolve(obj: &Map<String, Value>, aliases: &[String]) -> Option<String> {
    for key in aliases {
        let value = match obj.get(key) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => continue,
        };
        if !value.is_empty() {
            return Some(value);
        }
    }
    None
}

/// Stable content id: 32-bit shift hash rendered as `id_<hex>`.
///
/// Matches the id scheme of previously persisted state files, so cards
/// without an explicit id keep resolving to their old review progress
/// across reimports.
pub fn hash_id(text: &str) -> String {
    let mut h: i32 = 0;
    for unit in text.encode_utf16() {
        h = h.wrapping_shl(5).wrapping_sub(h).wrapping_add(unit as i32);
    }
    format!("id_{:x}", h as u32)
}

/// Pull the `My sentence:` / `AI correction:` pair out of a plain-text
/// back side.
///
/// Lines may carry decorative marker characters before the label; labels
/// match case-insensitively and `AI sentence:` is accepted for the
/// correction.
pub fn extract_sentence_pair(back_text: &str) -> (String, String) {
    fn labeled<'a>(line: &'a str, label: &str) -> Option<&'a str> {
        let lower = line.to_lowercase();
        let after = lower.strip_prefix(label)?;
        if !after.trim_start().starts_with(':') {
            return None;
        }
        // The label region holds no colon, so the first one ends it.
        line.split_once(':').map(|(_, value)| value.trim())
    }

    let mut my = String::new();
    let mut corrected = String::new();

    for raw_line in back_text.lines() {
        let line = raw_line
            .trim_start_matches(|c: char| !c.is_ascii_alphanumeric())
            .trim();

        if let Some(value) = labeled(line, "my sentence") {
            my = value.to_string();
        } else if let Some(value) =
            labeled(line, "ai correction").or_else(|| labeled(line, "ai sentence"))
        {
            corrected = value.to_string();
        }
    }

    (my, corrected)
}

fn push_labeled(parts: &mut Vec<String>, label: &str, value: &Option<String>) {
    if let Some(v) = value {
        parts.push(format!("{}: {}", label, v));
    }
}

/// Normalize one raw card object.
pub fn normalize_card(obj: &Map<String, Value>, aliases: &FieldAliases) -> Card {
    // Nested shapes keep prompt fields under "front"; flat shapes keep
    // everything top-level. Either way the alias chains do the lookup.
    let front = obj
        .get("front")
        .and_then(Value::as_object)
        .unwrap_or(obj);
    let back_obj = obj.get("back").and_then(Value::as_object).unwrap_or(obj);

    let original = resolve(front, &aliases.original);
    let tone = resolve(front, &aliases.tone);
    let explain = resolve(front, &aliases.explain);
    let usage = resolve(front, &aliases.usage);
    let extended = resolve(front, &aliases.extended);

    let mut my_sentence = resolve(back_obj, &aliases.my_sentence).unwrap_or_default();
    let mut corrected = resolve(back_obj, &aliases.corrected).unwrap_or_default();
    // Flat shapes keep the back-side explanation under its own key, so the
    // front "Explain" does not leak into both sides.
    let back_explain = if obj.get("back").and_then(Value::as_object).is_some() {
        resolve(back_obj, &aliases.explain)
    } else {
        resolve(obj, &aliases.explain_corrected)
    };
    let fluency = resolve(back_obj, &aliases.fluency);

    let explicit_front = resolve(obj, &aliases.front_text);
    let explicit_back = resolve(obj, &aliases.back_text);

    // A back side given as one labeled text blob.
    if my_sentence.is_empty() && corrected.is_empty() {
        let blob = match obj.get("back") {
            Some(Value::String(text)) => Some(text.as_str()),
            _ => explicit_back.as_deref(),
        };
        if let Some(text) = blob {
            let (my, ai) = extract_sentence_pair(text);
            my_sentence = my;
            corrected = ai;
        }
    }

    let mut front_parts = Vec::new();
    push_labeled(&mut front_parts, "Tone", &tone);
    push_labeled(&mut front_parts, "Original", &original);
    push_labeled(&mut front_parts, "Explain", &explain);
    push_labeled(&mut front_parts, "Usage", &usage);
    push_labeled(&mut front_parts, "Extended", &extended);
    let front_text = explicit_front.unwrap_or_else(|| front_parts.join("\n"));

    let mut back_parts = Vec::new();
    if !my_sentence.is_empty() {
        back_parts.push(format!("My sentence: {}", my_sentence));
    }
    if !corrected.is_empty() {
        back_parts.push(format!("AI correction: {}", corrected));
    }
    push_labeled(&mut back_parts, "Explain", &back_explain);
    push_labeled(&mut back_parts, "Fluency", &fluency);
    let back_text = explicit_back.unwrap_or_else(|| back_parts.join("\n"));

    let title = resolve(obj, &aliases.title).unwrap_or_default();
    let module = resolve(obj, &aliases.module).unwrap_or_default();
    let id = resolve(obj, &aliases.id)
        .unwrap_or_else(|| hash_id(&format!("{}{}", front_text, back_text)));

    Card {
        id,
        title,
        module,
        front_text,
        back_text,
        my_sentence,
        corrected,
        created: resolve(obj, &aliases.created),
    }
}

/// Normalize a JSON array of raw cards, rejecting duplicate ids.
pub fn normalize_cards(raw: &Value, aliases: &FieldAliases) -> Result<Vec<Card>> {
    let entries = raw.as_array().ok_or(NormalizeError::NotAnArray)?;

    let mut cards = Vec::with_capacity(entries.len());
    let mut seen = HashSet::new();

    for (index, entry) in entries.iter().enumerate() {
        let obj = entry
            .as_object()
            .ok_or(NormalizeError::NotAnObject { index })?;
        let card = normalize_card(obj, aliases);
        if !seen.insert(card.id.clone()) {
            return Err(NormalizeError::DuplicateId { id: card.id, index });
        }
        cards.push(card);
    }

    Ok(cards)
}
