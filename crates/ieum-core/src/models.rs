//! Core data models for the Ieum meeting service.
//!
//! Two families of types live here. The contract types (`AnalysisResult`
//! and friends) describe the JSON shape the chat model is asked to
//! produce; nothing enforces them at write time. The lenient types
//! (`StoredAnalysis`, `IssueEntry`) are the read-side decode used by the
//! dashboard, which must tolerate plain text, malformed JSON, and legacy
//! field layouts in stored documents.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

// =============================================================================
// ANALYSIS CONTRACT TYPES
// =============================================================================

/// A concrete task extracted from the meeting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionItem {
    pub task: String,
    pub assignee: String,
    pub deadline: String,
    pub status: String,
}

/// Severity of a potential risk raised in the meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

/// A potential risk with its severity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Risk {
    pub description: String,
    pub level: RiskLevel,
}

/// Deep-analysis block of the model response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Insights {
    #[serde(rename = "meetingType")]
    pub meeting_type: String,
    pub sentiment: String,
    #[serde(rename = "keyTopics")]
    pub key_topics: Vec<String>,
    pub risks: Vec<Risk>,
    pub recommendations: Vec<String>,
}

/// The full structured analysis the chat model is asked to produce.
///
/// This is the documented contract, not a validation gate: the analyze
/// endpoint stores and returns the model output verbatim, and readers go
/// through the lenient types below.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResult {
    pub summary: String,
    pub decisions: Vec<String>,
    #[serde(rename = "actionItems")]
    pub action_items: Vec<ActionItem>,
    #[serde(rename = "openIssues")]
    pub open_issues: Vec<IssueEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<Insights>,
}

// =============================================================================
// STORED DOCUMENT
// =============================================================================

/// Document shape persisted in the search index.
///
/// `content` is usually a JSON-serialized analysis but may be plain text;
/// no schema is enforced at write time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMeetingDocument {
    pub id: String,
    pub content: String,
    /// Label of the form `"<timestamp> 회의 요약"`.
    pub source: String,
    pub content_vector: Vec<f32>,
}

// =============================================================================
// LENIENT READ-SIDE DECODE
// =============================================================================

fn default_issue_title() -> String {
    "제목 없음".to_string()
}

fn default_issue_last_mentioned() -> String {
    "최근".to_string()
}

fn default_issue_owner() -> String {
    "미정".to_string()
}

/// Structured open-issue record with the read-path defaults applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRecord {
    #[serde(default = "default_issue_title")]
    pub title: String,
    #[serde(rename = "lastMentioned", default = "default_issue_last_mentioned")]
    pub last_mentioned: String,
    #[serde(default = "default_issue_owner")]
    pub owner: String,
}

/// One element of a stored `openIssues` array.
///
/// Historical documents carry either structured records or bare title
/// strings; anything else is preserved as `Other` and skipped by the
/// dashboard.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IssueEntry {
    Record(IssueRecord),
    Title(String),
    Other(JsonValue),
}

impl Serialize for IssueEntry {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            IssueEntry::Record(r) => r.serialize(serializer),
            IssueEntry::Title(t) => t.serialize(serializer),
            IssueEntry::Other(v) => v.serialize(serializer),
        }
    }
}

impl IssueEntry {
    /// Collapse the variant into a uniform record, or `None` for shapes
    /// the dashboard skips.
    pub fn into_record(self) -> Option<IssueRecord> {
        match self {
            IssueEntry::Record(record) => Some(record),
            IssueEntry::Title(title) => Some(IssueRecord {
                title,
                last_mentioned: default_issue_last_mentioned(),
                owner: default_issue_owner(),
            }),
            IssueEntry::Other(_) => None,
        }
    }
}

/// Coerce any JSON value into a summary string.
///
/// The model occasionally returns a structured value where a string was
/// asked for; those are stringified rather than rejected.
fn deserialize_summary<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = JsonValue::deserialize(deserializer)?;
    Ok(match value {
        JsonValue::String(s) => s,
        JsonValue::Null => String::new(),
        other => other.to_string(),
    })
}

/// Decode a field that should be an array, treating any other shape as
/// empty instead of failing the whole document.
fn deserialize_lenient_array<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = JsonValue::deserialize(deserializer)?;
    match value {
        JsonValue::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect()),
        _ => Ok(Vec::new()),
    }
}

fn deserialize_agenda<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = JsonValue::deserialize(deserializer)?;
    match value {
        JsonValue::Array(items) => Ok(items
            .into_iter()
            .map(|item| match item {
                JsonValue::String(s) => s,
                other => other.to_string(),
            })
            .collect()),
        _ => Ok(Vec::new()),
    }
}

/// Recommendations extracted from a stored `insights` block, tolerating a
/// non-object block.
#[derive(Debug, Clone, Default)]
pub struct InsightsRecommendations(pub Vec<String>);

impl<'de> Deserialize<'de> for InsightsRecommendations {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = JsonValue::deserialize(deserializer)?;
        let recommendations = match value {
            JsonValue::Object(mut map) => match map.remove("recommendations") {
                Some(JsonValue::Array(items)) => items
                    .into_iter()
                    .map(|item| match item {
                        JsonValue::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect(),
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };
        Ok(InsightsRecommendations(recommendations))
    }
}

/// Lenient decode of a stored document's `content` field.
///
/// Every field degrades independently; a malformed or missing field never
/// fails the document. Callers still have to handle `content` that is not
/// JSON at all.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoredAnalysis {
    #[serde(deserialize_with = "deserialize_summary")]
    pub summary: String,
    #[serde(rename = "openIssues", deserialize_with = "deserialize_lenient_array")]
    pub open_issues: Vec<IssueEntry>,
    pub insights: InsightsRecommendations,
    /// Legacy root-level agenda field, consulted when
    /// `insights.recommendations` is empty.
    #[serde(deserialize_with = "deserialize_agenda")]
    pub suggested_agenda: Vec<String>,
}

impl StoredAnalysis {
    /// Agenda items with the legacy root-level fallback applied.
    pub fn agenda_items(&self) -> &[String] {
        if self.insights.0.is_empty() {
            &self.suggested_agenda
        } else {
            &self.insights.0
        }
    }
}

// =============================================================================
// DASHBOARD VIEW
// =============================================================================

/// One meeting row of the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardMeeting {
    pub id: String,
    pub title: String,
    pub date: String,
    pub summary: String,
    pub participants: Vec<String>,
    #[serde(rename = "actionItems")]
    pub action_items: Vec<ActionItem>,
}

/// One open-issue row of the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardIssue {
    pub id: String,
    pub title: String,
    #[serde(rename = "lastMentioned")]
    pub last_mentioned: String,
    pub owner: String,
}
