//! Deep meeting analysis handler.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{error, info, warn};

use crate::services::store;
use crate::AppState;

/// Minimum transcript length (in characters, after trimming) worth
/// sending to the model.
const MIN_TRANSCRIPT_CHARS: usize = 10;

/// Fixed result for transcripts below the minimum length.
pub const SHORT_TEXT_SUMMARY: &str = "내용이 너무 짧습니다.";

/// Fixed result when the upstream content filter blocks the response.
pub const CONTENT_FILTER_SUMMARY: &str = "⚠️ 보안 필터가 작동했습니다.";

/// System instruction defining the JSON structure the model must emit.
pub const ANALYSIS_SYSTEM_PROMPT: &str = r#"너는 수석 비즈니스 분석가야. 회의 스크립트를 분석해서 아래 JSON 포맷으로 완벽하게 구조화해.

[필수 포함 항목 및 규칙]
1. summary: 전체 내용을 3줄 요약 (HTML <br> 태그 사용 가능)
2. decisions: 확정된 결정 사항 리스트 (문자열 배열)
3. actionItems: 구체적인 할 일 리스트. 각 항목은 {"task": "할일내용", "assignee": "담당자(없으면 '미정')", "deadline": "기한(없으면 '추후 협의')", "status": "active"} 형태여야 함.
4. openIssues: 해결되지 않은 이슈 리스트. 각 항목은 {"title": "이슈명", "lastMentioned": "오늘", "owner": "관련자"} 형태.
5. insights: 심층 분석 객체
   - meetingType: 회의 성격 (예: 주간보고, 아이디어회의, 긴급점검 등)
   - sentiment: 전체 분위기 (긍정적/중립적/부정적)
   - keyTopics: 핵심 키워드 5개 이내
   - risks: 잠재적 리스크 리스트. {"description": "내용", "level": "high/medium/low"}
   - recommendations: AI가 제안하는 개선점 리스트

반드시 JSON 형식만 출력해. 마크다운(```json) 쓰지 마."#;

/// Request body for `/analyze-meeting` and `/execute-action`.
#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    pub summary_text: String,
}

/// Response envelope for `/analyze-meeting`.
///
/// Errors are reported through the `status`/`message` fields, not HTTP
/// status codes. The short-text path answers with a root-level `summary`
/// instead of `data`, which the frontend has depended on since the first
/// deployment.
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl AnalyzeResponse {
    fn success(data: JsonValue) -> Self {
        Self {
            status: "success",
            data: Some(data),
            message: None,
            summary: None,
        }
    }

    fn error(message: String) -> Self {
        Self {
            status: "error",
            data: None,
            message: Some(message),
            summary: None,
        }
    }

    fn short_text() -> Self {
        Self {
            status: "success",
            data: None,
            message: None,
            summary: Some(SHORT_TEXT_SUMMARY.to_string()),
        }
    }
}

/// `POST /analyze-meeting` — structure a transcript with the chat model.
///
/// The raw model response is persisted before parsing; a storage failure
/// is logged and does not block the response. A response that fails to
/// parse as JSON degrades to `{"summary": <raw text>}`.
pub async fn analyze_meeting(
    State(state): State<AppState>,
    Json(request): Json<SummaryRequest>,
) -> Json<AnalyzeResponse> {
    info!("Deep meeting analysis requested");

    if request.summary_text.trim().chars().count() < MIN_TRANSCRIPT_CHARS {
        return Json(AnalyzeResponse::short_text());
    }

    let raw = match state
        .chat
        .generate_json(ANALYSIS_SYSTEM_PROMPT, &request.summary_text)
        .await
    {
        Ok(raw) => raw,
        Err(e) if e.is_content_filtered() => {
            warn!("Analysis blocked by upstream content filter");
            return Json(AnalyzeResponse::success(serde_json::json!({
                "summary": CONTENT_FILTER_SUMMARY
            })));
        }
        Err(e) => {
            error!("Analysis failed: {}", e);
            return Json(AnalyzeResponse::error(e.to_string()));
        }
    };

    if let Err(e) = store::save_analysis(state.embeddings.as_ref(), &state.search, &raw).await {
        warn!("Failed to persist analysis, returning it anyway: {}", e);
    }

    let data = match serde_json::from_str::<JsonValue>(&raw) {
        Ok(parsed) => parsed,
        Err(_) => serde_json::json!({ "summary": raw }),
    };

    Json(AnalyzeResponse::success(data))
}
