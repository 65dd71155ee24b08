//! Dashboard aggregation handler.
//!
//! Normalizes the heterogeneous documents stored in the search index
//! into one unified view: recent meetings, open issues, and suggested
//! agenda items. Stored `content` may be a JSON analysis, plain text, or
//! malformed JSON; every shape must produce a usable row.

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use ieum_core::{DashboardIssue, DashboardMeeting, StoredAnalysis};
use ieum_search::SearchHit;

use crate::AppState;

/// Number of documents fetched from the index per request.
const FETCH_TOP: usize = 10;

/// Cap on meeting rows in the response.
const MAX_MEETINGS: usize = 5;

/// Cap on open issues accumulated across all documents.
const MAX_OPEN_ISSUES: usize = 4;

/// Cap on suggested agenda items accumulated across all documents.
const MAX_AGENDA_ITEMS: usize = 4;

/// Character budget for summaries derived from non-JSON content.
const PLAIN_TEXT_SUMMARY_CHARS: usize = 100;

/// Fallback for documents without a usable source label or date.
const UNKNOWN_DATE: &str = "날짜 미상";

/// Response body for `/dashboard-data`.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub status: &'static str,
    pub meetings: Vec<DashboardMeeting>,
    pub open_issues: Vec<DashboardIssue>,
    pub suggested_agenda: Vec<String>,
}

impl DashboardResponse {
    fn degraded() -> Self {
        Self {
            status: "error",
            meetings: Vec::new(),
            open_issues: Vec::new(),
            suggested_agenda: Vec::new(),
        }
    }
}

/// Derive the meeting date from a source label: the text up to the
/// first space, or the unknown-date marker when there is none.
fn date_from_source(source: &str) -> &str {
    match source.split_once(' ') {
        Some((date, _)) => date,
        None => UNKNOWN_DATE,
    }
}

/// Truncate non-JSON content into a summary with an ellipsis marker.
fn plain_text_summary(content: &str) -> String {
    let mut summary: String = content.chars().take(PLAIN_TEXT_SUMMARY_CHARS).collect();
    summary.push_str("...");
    summary
}

/// Normalize fetched documents into the dashboard view.
///
/// Meetings keep fetch order and cap at five; issues and agenda items
/// accumulate across documents in fetch order and cap at four each.
/// Documents without a stored id, and every issue row, get a fresh UUID
/// per request; identities are not stable across calls.
pub fn aggregate(hits: Vec<SearchHit>) -> DashboardResponse {
    let mut meetings = Vec::new();
    let mut open_issues = Vec::new();
    let mut suggested_agenda = Vec::new();

    for hit in hits {
        let source = hit.source.unwrap_or_else(|| UNKNOWN_DATE.to_string());

        let summary = match serde_json::from_str::<StoredAnalysis>(&hit.content) {
            Ok(analysis) => {
                for entry in analysis.open_issues.iter().cloned() {
                    if let Some(record) = entry.into_record() {
                        open_issues.push(DashboardIssue {
                            id: Uuid::new_v4().to_string(),
                            title: record.title,
                            last_mentioned: record.last_mentioned,
                            owner: record.owner,
                        });
                    }
                }
                suggested_agenda.extend(analysis.agenda_items().iter().cloned());
                analysis.summary
            }
            // Not a JSON object: treat the whole content as plain text.
            Err(_) => plain_text_summary(&hit.content),
        };

        meetings.push(DashboardMeeting {
            id: hit.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            title: source.clone(),
            date: date_from_source(&source).to_string(),
            summary,
            participants: vec!["Team".to_string()],
            action_items: Vec::new(),
        });
    }

    meetings.truncate(MAX_MEETINGS);
    open_issues.truncate(MAX_OPEN_ISSUES);
    suggested_agenda.truncate(MAX_AGENDA_ITEMS);

    DashboardResponse {
        status: "success",
        meetings,
        open_issues,
        suggested_agenda,
    }
}

/// `GET /dashboard-data` — aggregate recent documents into the home view.
///
/// A fetch failure degrades the whole response to an error status with
/// empty lists; partial results are never returned.
pub async fn dashboard_data(State(state): State<AppState>) -> Json<DashboardResponse> {
    info!("Dashboard data requested");

    match state.search.fetch_recent(FETCH_TOP).await {
        Ok(hits) => {
            let response = aggregate(hits);
            info!(
                meeting_count = response.meetings.len(),
                issue_count = response.open_issues.len(),
                "Dashboard aggregation complete"
            );
            Json(response)
        }
        Err(e) => {
            error!("Dashboard fetch failed: {}", e);
            Json(DashboardResponse::degraded())
        }
    }
}
