//! Approved-action execution handler (email fan-out).

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::info;

use crate::handlers::analyze::SummaryRequest;
use crate::AppState;

/// Subject line for meeting report emails.
pub const EMAIL_SUBJECT: &str = "[이음] 회의 결과 리포트";

/// Response body for `/execute-action`.
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub status: &'static str,
    pub sent_count: usize,
}

/// Wrap an approved summary in the fixed report template, rendering
/// newlines as line breaks.
pub fn render_email_body(summary: &str) -> String {
    let formatted = summary.replace('\n', "<br>");
    format!(
        r#"
    <div style="border: 1px solid #ddd; padding: 20px;">
        <h2>📢 AI 회의 요약</h2>
        <hr>{}<hr>
        <p>※ 관리자 승인 후 발송된 메일입니다.</p>
    </div>
    "#,
        formatted
    )
}

/// `POST /execute-action` — fan the approved summary out to the team.
///
/// The caller has already approved the text; this only renders and
/// sends. `sent_count` counts requests that completed at the transport
/// level. The handler never errors.
pub async fn execute_action(
    State(state): State<AppState>,
    Json(request): Json<SummaryRequest>,
) -> Json<ActionResponse> {
    info!("Action approved, sending meeting report emails");

    let body = render_email_body(&request.summary_text);
    let outcomes = state.notifier.broadcast(EMAIL_SUBJECT, &body).await;
    let sent_count = outcomes.iter().filter(|o| o.counts_as_sent()).count();

    info!(sent_count, "Meeting report fan-out finished");
    Json(ActionResponse {
        status: "success",
        sent_count,
    })
}
