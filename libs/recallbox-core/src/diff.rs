//! Word-level sentence alignment.
//!
//! Compares the learner's own sentence against the corrected reference and
//! classifies every token of the reference view: unchanged, case-only
//! change, inserted, or removed. Alignment anchors come from a
//! longest-common-subsequence over tokens under case-insensitive equality.

use serde::{Deserialize, Serialize};

/// Classification of one diff unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffKind {
    /// Token is byte-identical in both sentences.
    Unchanged,
    /// Token matches case-insensitively but the casing differs.
    CaseChanged,
    /// Token appears only in the reference.
    Inserted,
    /// Token appears only in the learner's sentence.
    Removed,
}

/// One classified token of the alignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSpan {
    pub text: String,
    pub kind: DiffKind,
}

impl DiffSpan {
    fn new(text: &str, kind: DiffKind) -> Self {
        Self {
            text: text.to_string(),
            kind,
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Split a sentence into alignment tokens.
///
/// A token is a maximal run of word characters or a single non-space
/// non-word character; whitespace only separates.
pub fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c.is_whitespace() {
            continue;
        }
        if is_word_char(c) {
            let mut end = start + c.len_utf8();
            while let Some(&(next_start, next)) = chars.peek() {
                if !is_word_char(next) {
                    break;
                }
                end = next_start + next.len_utf8();
                chars.next();
            }
            tokens.push(&text[start..end]);
        } else {
            tokens.push(&text[start..start + c.len_utf8()]);
        }
    }

    tokens
}

/// Matched token index pairs between `a` and `b`, left to right.
///
/// Classic LCS dynamic program under case-insensitive equality. The
/// backtrack breaks ties toward consuming more of `a`, so output is
/// deterministic.
fn lcs_anchors(a: &[&str], b: &[&str]) -> Vec<(usize, usize)> {
    let a_low: Vec<String> = a.iter().map(|t| t.to_lowercase()).collect();
    let b_low: Vec<String> = b.iter().map(|t| t.to_lowercase()).collect();

    let (m, n) = (a.len(), b.len());
    let mut dp = vec![vec![0usize; n + 1]; m + 1];
    for i in 1..=m {
        for j in 1..=n {
            dp[i][j] = if a_low[i - 1] == b_low[j - 1] {
                dp[i - 1][j - 1] + 1
            } else {
                dp[i - 1][j].max(dp[i][j - 1])
            };
        }
    }

    let mut pairs = Vec::new();
    let (mut i, mut j) = (m, n);
    while i > 0 && j > 0 {
        if a_low[i - 1] == b_low[j - 1] {
            pairs.push((i - 1, j - 1));
            i -= 1;
            j -= 1;
        } else if dp[i - 1][j] >= dp[i][j - 1] {
            i -= 1;
        } else {
            j -= 1;
        }
    }
    pairs.reverse();
    pairs
}

/// Align two sentences and classify every covered token.
///
/// Between anchors, unconsumed learner tokens come out `Removed` and
/// unconsumed reference tokens `Inserted`; the anchor itself is
/// `Unchanged`, `CaseChanged`, or (defensively) `Inserted`. Never fails,
/// whatever the input: an empty learner sentence yields the whole
/// reference as `Inserted`.
pub fn word_diff(mine: &str, reference: &str) -> Vec<DiffSpan> {
    let a = tokenize(mine);
    let b = tokenize(reference);
    let anchors = lcs_anchors(&a, &b);

    let mut spans = Vec::new();
    let (mut ai, mut bi) = (0, 0);

    for (a_match, b_match) in anchors {
        while ai < a_match {
            spans.push(DiffSpan::new(a[ai], DiffKind::Removed));
            ai += 1;
        }
        while bi < b_match {
            spans.push(DiffSpan::new(b[bi], DiffKind::Inserted));
            bi += 1;
        }

        let (at, bt) = (a[a_match], b[b_match]);
        let kind = if at == bt {
            DiffKind::Unchanged
        } else if at.to_lowercase() == bt.to_lowercase() {
            DiffKind::CaseChanged
        } else {
            // Anchors are case-insensitive matches by construction; keep
            // the reference token rather than crash if that ever breaks.
            DiffKind::Inserted
        };
        spans.push(DiffSpan::new(bt, kind));
        ai = a_match + 1;
        bi = b_match + 1;
    }

    while ai < a.len() {
        spans.push(DiffSpan::new(a[ai], DiffKind::Removed));
        ai += 1;
    }
    while bi < b.len() {
        spans.push(DiffSpan::new(b[bi], DiffKind::Inserted));
        bi += 1;
    }

    spans
}

/// Escape text for HTML output: `&`, `<`, `>` and newlines.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\n' => out.push_str("<br>"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the alignment as HTML.
///
/// Classified tokens are wrapped in `w-rem` / `w-add` / `w-case` spans,
/// unchanged tokens emitted bare, all joined with single spaces. If either
/// side is blank there is nothing to compare: the escaped reference comes
/// back with no markup.
pub fn render_html(mine: &str, reference: &str) -> String {
    let my_clean = mine.trim();
    let ref_clean = reference.trim();
    if my_clean.is_empty() || ref_clean.is_empty() {
        return escape_html(ref_clean);
    }

    let mut html = String::new();
    for span in word_diff(my_clean, ref_clean) {
        let escaped = escape_html(&span.text);
        match span.kind {
            DiffKind::Unchanged => html.push_str(&escaped),
            DiffKind::CaseChanged => {
                html.push_str(&format!(r#"<span class="w-case">{}</span>"#, escaped))
            }
            DiffKind::Inserted => {
                html.push_str(&format!(r#"<span class="w-add">{}</span>"#, escaped))
            }
            DiffKind::Removed => {
                html.push_str(&format!(r#"<span class="w-rem">{}</span>"#, escaped))
            }
        }
        html.push(' ');
    }

    html.trim_end().to_string()
}
