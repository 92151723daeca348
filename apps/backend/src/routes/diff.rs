//! Sentence diff endpoint.

use axum::Json;
use recallbox_core::{render_html, word_diff};

use crate::error::Result;
use crate::models::{DiffRequest, DiffResponse};

/// POST /api/diff
///
/// Align the learner's sentence against the corrected reference. The
/// response carries both the classified spans (for custom rendering) and
/// the pre-escaped HTML view.
pub async fn diff(Json(request): Json<DiffRequest>) -> Result<Json<DiffResponse>> {
    let spans = word_diff(request.mine.trim(), request.reference.trim());
    let html = render_html(&request.mine, &request.reference);
    Ok(Json(DiffResponse { spans, html }))
}
