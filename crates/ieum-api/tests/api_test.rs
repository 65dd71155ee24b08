//! End-to-end handler tests.
//!
//! The router runs against real backend clients pointed at wiremock
//! servers standing in for the chat model, the embedding model, the
//! search index, and the email webhook.

use std::sync::Arc;

use ieum_api::services::notify::WebhookNotifier;
use ieum_api::{build_router, AppState};
use ieum_core::NotifyConfig;
use ieum_inference::{AzureOpenAIBackend, AzureOpenAIConfig};
use ieum_search::{SearchIndexClient, SearchIndexConfig};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct TestApp {
    base_url: String,
    openai: MockServer,
    search: MockServer,
    webhook: MockServer,
    client: reqwest::Client,
}

async fn spawn_app(recipients: Vec<String>) -> TestApp {
    let openai = MockServer::start().await;
    let search = MockServer::start().await;
    let webhook = MockServer::start().await;

    let backend = Arc::new(
        AzureOpenAIBackend::new(AzureOpenAIConfig {
            endpoint: openai.uri(),
            api_key: "openai-key".to_string(),
            embed_deployment: "text-embedding-3-small".to_string(),
            embed_api_version: "2024-02-01".to_string(),
            chat_deployment: "gpt-5-mini".to_string(),
            chat_api_version: "2024-12-01-preview".to_string(),
            timeout_seconds: 10,
        })
        .unwrap(),
    );

    let search_client = Arc::new(
        SearchIndexClient::new(SearchIndexConfig {
            endpoint: search.uri(),
            api_key: "search-key".to_string(),
            index: "meetings".to_string(),
            api_version: "2023-11-01".to_string(),
        })
        .unwrap(),
    );

    let notifier = Arc::new(
        WebhookNotifier::new(NotifyConfig {
            webhook_url: format!("{}/hook", webhook.uri()),
            recipients,
            delay_ms: 0,
            concurrency: 1,
        })
        .unwrap(),
    );

    let state = AppState {
        embeddings: backend.clone(),
        chat: backend,
        search: search_client,
        notifier,
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_router(state)).await.unwrap();
    });

    TestApp {
        base_url: format!("http://{}", addr),
        openai,
        search,
        webhook,
        client: reqwest::Client::new(),
    }
}

fn chat_response(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

fn embedding_response() -> serde_json::Value {
    serde_json::json!({
        "data": [{"embedding": vec![0.1f32; 8], "index": 0}],
        "model": "text-embedding-3-small",
        "usage": {"prompt_tokens": 1, "total_tokens": 1}
    })
}

fn upload_ok() -> serde_json::Value {
    serde_json::json!({"value": [{"key": "k", "status": true, "statusCode": 201}]})
}

async fn mount_embedding_and_upload(app: &TestApp) {
    Mock::given(method("POST"))
        .and(path(
            "/openai/deployments/text-embedding-3-small/embeddings",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(embedding_response()))
        .mount(&app.openai)
        .await;

    Mock::given(method("POST"))
        .and(path("/indexes/meetings/docs/index"))
        .respond_with(ResponseTemplate::new(200).set_body_json(upload_ok()))
        .mount(&app.search)
        .await;
}

// ── analyze-meeting ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_analyze_short_text_makes_no_external_calls() {
    let app = spawn_app(vec![]).await;
    // No mocks mounted: any outbound request would fail loudly.

    let body: serde_json::Value = app
        .client
        .post(format!("{}/analyze-meeting", app.base_url))
        .json(&serde_json::json!({"summary_text": "  짧음  "}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "success");
    assert_eq!(body["summary"], "내용이 너무 짧습니다.");
    assert!(body.get("data").is_none());

    assert!(app.openai.received_requests().await.unwrap().is_empty());
    assert!(app.search.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_analyze_returns_parsed_model_json_verbatim() {
    let app = spawn_app(vec![]).await;
    mount_embedding_and_upload(&app).await;

    let analysis = serde_json::json!({
        "summary": "3줄 요약",
        "decisions": ["예산 확정"],
        "actionItems": [],
        "openIssues": [{"title": "일정 지연", "lastMentioned": "오늘", "owner": "PM"}],
        "insights": {"meetingType": "주간보고", "sentiment": "긍정적",
                     "keyTopics": [], "risks": [], "recommendations": []}
    });

    Mock::given(method("POST"))
        .and(path("/openai/deployments/gpt-5-mini/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "response_format": {"type": "json_object"}
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(chat_response(&analysis.to_string())),
        )
        .expect(1)
        .mount(&app.openai)
        .await;

    let body: serde_json::Value = app
        .client
        .post(format!("{}/analyze-meeting", app.base_url))
        .json(&serde_json::json!({"summary_text": "오늘 회의에서 예산과 일정을 논의했습니다."}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "success");
    // No field renaming or dropping
    assert_eq!(body["data"], analysis);

    // The raw response was persisted before parsing
    let uploads = app.search.received_requests().await.unwrap();
    assert_eq!(uploads.len(), 1);
    let upload: serde_json::Value = serde_json::from_slice(&uploads[0].body).unwrap();
    assert_eq!(
        upload["value"][0]["content"].as_str().unwrap(),
        analysis.to_string()
    );
    assert!(upload["value"][0]["source"]
        .as_str()
        .unwrap()
        .ends_with("회의 요약"));
}

#[tokio::test]
async fn test_analyze_invalid_model_json_degrades_to_summary() {
    let app = spawn_app(vec![]).await;
    mount_embedding_and_upload(&app).await;

    Mock::given(method("POST"))
        .and(path("/openai/deployments/gpt-5-mini/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response("not json")))
        .mount(&app.openai)
        .await;

    let body: serde_json::Value = app
        .client
        .post(format!("{}/analyze-meeting", app.base_url))
        .json(&serde_json::json!({"summary_text": "충분히 긴 회의 스크립트입니다."}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "success");
    assert_eq!(body["data"], serde_json::json!({"summary": "not json"}));

    // The unparseable response is still stored
    assert_eq!(app.search.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_analyze_content_filter_returns_fixed_notice() {
    let app = spawn_app(vec![]).await;

    Mock::given(method("POST"))
        .and(path("/openai/deployments/gpt-5-mini/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": {"message": "The response was filtered", "code": "content_filter"}
        })))
        .mount(&app.openai)
        .await;

    let body: serde_json::Value = app
        .client
        .post(format!("{}/analyze-meeting", app.base_url))
        .json(&serde_json::json!({"summary_text": "충분히 긴 회의 스크립트입니다."}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["summary"], "⚠️ 보안 필터가 작동했습니다.");
    // Nothing is persisted on the filter path
    assert!(app.search.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_analyze_model_error_reports_message() {
    let app = spawn_app(vec![]).await;

    Mock::given(method("POST"))
        .and(path("/openai/deployments/gpt-5-mini/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "error": {"message": "Rate limit exceeded", "code": "429"}
        })))
        .mount(&app.openai)
        .await;

    let body: serde_json::Value = app
        .client
        .post(format!("{}/analyze-meeting", app.base_url))
        .json(&serde_json::json!({"summary_text": "충분히 긴 회의 스크립트입니다."}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "error");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Rate limit exceeded"));
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_analyze_storage_failure_does_not_block_response() {
    let app = spawn_app(vec![]).await;

    Mock::given(method("POST"))
        .and(path("/openai/deployments/gpt-5-mini/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(chat_response(r#"{"summary": "요약"}"#)),
        )
        .mount(&app.openai)
        .await;

    Mock::given(method("POST"))
        .and(path(
            "/openai/deployments/text-embedding-3-small/embeddings",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(embedding_response()))
        .mount(&app.openai)
        .await;

    // Index down: upload fails, analysis is still returned
    Mock::given(method("POST"))
        .and(path("/indexes/meetings/docs/index"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&app.search)
        .await;

    let body: serde_json::Value = app
        .client
        .post(format!("{}/analyze-meeting", app.base_url))
        .json(&serde_json::json!({"summary_text": "충분히 긴 회의 스크립트입니다."}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["summary"], "요약");
}

// ── execute-action ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_execute_action_sends_one_request_per_recipient() {
    let recipients: Vec<String> = (0..3).map(|i| format!("member{}@example.com", i)).collect();
    let app = spawn_app(recipients).await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(body_partial_json(serde_json::json!({
            "subject": "[이음] 회의 결과 리포트"
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(3)
        .mount(&app.webhook)
        .await;

    let body: serde_json::Value = app
        .client
        .post(format!("{}/execute-action", app.base_url))
        .json(&serde_json::json!({"summary_text": "첫 줄\n둘째 줄"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "success");
    assert_eq!(body["sent_count"], 3);

    // Newlines render as <br> inside the HTML body
    let requests = app.webhook.received_requests().await.unwrap();
    let payload: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(payload["body"].as_str().unwrap().contains("첫 줄<br>둘째 줄"));
    assert_eq!(payload["email"], "member0@example.com");
}

#[tokio::test]
async fn test_execute_action_non_2xx_still_counts_as_sent() {
    let recipients: Vec<String> = (0..2).map(|i| format!("member{}@example.com", i)).collect();
    let app = spawn_app(recipients).await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.webhook)
        .await;

    let body: serde_json::Value = app
        .client
        .post(format!("{}/execute-action", app.base_url))
        .json(&serde_json::json!({"summary_text": "요약"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Failures only surface as transport errors; a 500 response was
    // still a completed request.
    assert_eq!(body["status"], "success");
    assert_eq!(body["sent_count"], 2);
}

#[tokio::test]
async fn test_execute_action_transport_failures_are_swallowed() {
    // A webhook endpoint that stops existing: every request errors at
    // the transport level, the batch still completes with outcomes for
    // every recipient.
    let dead = MockServer::start().await;
    let dead_uri = dead.uri();
    drop(dead);

    let notifier = WebhookNotifier::new(NotifyConfig {
        webhook_url: format!("{}/hook", dead_uri),
        recipients: (0..4).map(|i| format!("member{}@example.com", i)).collect(),
        delay_ms: 0,
        concurrency: 1,
    })
    .unwrap();
    let outcomes = notifier.broadcast("[이음] 회의 결과 리포트", "<p>요약</p>").await;

    assert_eq!(outcomes.len(), 4);
    assert!(outcomes.iter().all(|o| !o.counts_as_sent()));
}

// ── dashboard-data ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_dashboard_aggregates_mixed_documents() {
    let app = spawn_app(vec![]).await;

    let long_text = "회의록 ".repeat(40); // plain text, well over 100 chars
    let docs = serde_json::json!({
        "value": [
            {"id": "doc-0", "content": long_text, "source": "2024-05-20 14:30 회의 요약"},
            {"id": "doc-1", "source": "2024-05-21 10:00 회의 요약",
             "content": r#"{"summary": "요약 1", "openIssues": ["unresolved budget", {"title": "일정 지연", "owner": "PM"}]}"#},
            {"id": "doc-2", "source": "source-without-space",
             "content": r#"{"summary": "요약 2", "openIssues": ["issue-a", "issue-b"], "insights": {"recommendations": ["안건 1", "안건 2"]}}"#},
            {"id": "doc-3", "content": r#"{"suggested_agenda": ["legacy 안건 1", "legacy 안건 2", "legacy 안건 3"]}"#},
            {"id": "doc-4", "content": "{}", "source": "2024-05-24 회의 요약"},
            {"id": "doc-5", "content": "{}", "source": "2024-05-25 회의 요약"}
        ]
    });

    Mock::given(method("POST"))
        .and(path("/indexes/meetings/docs/search"))
        .and(body_partial_json(serde_json::json!({"search": "*", "top": 10})))
        .respond_with(ResponseTemplate::new(200).set_body_json(&docs))
        .mount(&app.search)
        .await;

    let body: serde_json::Value = app
        .client
        .get(format!("{}/dashboard-data", app.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "success");

    let meetings = body["meetings"].as_array().unwrap();
    assert_eq!(meetings.len(), 5);
    assert!(meetings[0]["summary"].as_str().unwrap().ends_with("..."));
    assert_eq!(meetings[0]["date"], "2024-05-20");
    assert_eq!(meetings[2]["date"], "날짜 미상");
    assert_eq!(meetings[0]["participants"], serde_json::json!(["Team"]));

    let issues = body["open_issues"].as_array().unwrap();
    assert_eq!(issues.len(), 4);
    assert_eq!(issues[0]["title"], "unresolved budget");
    assert_eq!(issues[0]["lastMentioned"], "최근");
    assert_eq!(issues[0]["owner"], "미정");
    assert_eq!(issues[1]["title"], "일정 지연");
    assert_eq!(issues[1]["owner"], "PM");
    assert_eq!(issues[2]["title"], "issue-a");
    assert_eq!(issues[3]["title"], "issue-b");

    let agenda = body["suggested_agenda"].as_array().unwrap();
    assert_eq!(
        agenda,
        &vec![
            serde_json::json!("안건 1"),
            serde_json::json!("안건 2"),
            serde_json::json!("legacy 안건 1"),
            serde_json::json!("legacy 안건 2"),
        ]
    );
}

#[tokio::test]
async fn test_dashboard_repeat_requests_match_apart_from_ids() {
    let app = spawn_app(vec![]).await;

    let docs = serde_json::json!({
        "value": [
            {"content": r#"{"summary": "요약", "openIssues": ["issue"]}"#,
             "source": "2024-05-20 회의 요약"}
        ]
    });

    Mock::given(method("POST"))
        .and(path("/indexes/meetings/docs/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&docs))
        .mount(&app.search)
        .await;

    let fetch = || async {
        app.client
            .get(format!("{}/dashboard-data", app.base_url))
            .send()
            .await
            .unwrap()
            .json::<serde_json::Value>()
            .await
            .unwrap()
    };

    let first = fetch().await;
    let second = fetch().await;

    assert_eq!(first["meetings"][0]["summary"], second["meetings"][0]["summary"]);
    assert_eq!(first["open_issues"][0]["title"], second["open_issues"][0]["title"]);
    // Missing stored ids are regenerated per request
    assert_ne!(first["meetings"][0]["id"], second["meetings"][0]["id"]);
}

#[tokio::test]
async fn test_dashboard_fetch_failure_degrades_to_empty_error() {
    let app = spawn_app(vec![]).await;

    Mock::given(method("POST"))
        .and(path("/indexes/meetings/docs/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&app.search)
        .await;

    let body: serde_json::Value = app
        .client
        .get(format!("{}/dashboard-data", app.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "error");
    assert_eq!(body["meetings"], serde_json::json!([]));
    assert_eq!(body["open_issues"], serde_json::json!([]));
    assert_eq!(body["suggested_agenda"], serde_json::json!([]));
}

// ── health ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_reports_service_and_version() {
    let app = spawn_app(vec![]).await;

    let body: serde_json::Value = app
        .client
        .get(format!("{}/health", app.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["service"], "ieum-api");
    assert!(body["version"].as_str().is_some());
}
