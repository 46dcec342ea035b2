//! HTTP-level tests for the report client, against a mock provider.

use charmcheck_core::quiz::{question_bank, AnswerSet};
use charmcheck_core::report::{ReportClient, ReportOutcome, RequestOptions};
use charmcheck_core::scoring::{score, ScoreSummary};
use charmcheck_core::ReportError;

const MODEL: &str = "gemini-3-flash-preview";
const MODEL_PATH: &str = "/v1beta/models/gemini-3-flash-preview:generateContent";

fn answered(value: i32) -> (AnswerSet, ScoreSummary) {
    let mut answers = AnswerSet::new();
    for q in question_bank() {
        answers.record(q.id, value).unwrap();
    }
    let summary = score(&answers, question_bank());
    (answers, summary)
}

fn report_json(persona_id: &str) -> String {
    serde_json::json!({
        "selectedPersonaId": persona_id,
        "personaExplanation": "grounded in your answers",
        "personaOverview": "one line",
        "appearanceAnalysis": "a",
        "socialAnalysis": "b",
        "interactionAnalysis": "c",
        "mindsetAnalysis": "d",
        "coachGeneralAdvice": "strategy"
    })
    .to_string()
}

fn provider_body(text: &str) -> String {
    serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] } }]
    })
    .to_string()
}

fn key_matcher(key: &str) -> mockito::Matcher {
    mockito::Matcher::UrlEncoded("key".into(), key.into())
}

#[tokio::test]
async fn successful_call_parses_the_report() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", MODEL_PATH)
        .match_query(key_matcher("env-key"))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(provider_body(&report_json("hustler")))
        .create_async()
        .await;

    let client = ReportClient::new(server.url(), MODEL).with_env_key("env-key");
    let (answers, summary) = answered(2);
    let outcome = client
        .request_report(&summary, &answers, RequestOptions::default())
        .await
        .unwrap();

    match outcome {
        ReportOutcome::Ready(report) => {
            assert_eq!(report.selected_persona_id, "hustler");
            assert_eq!(report.persona().id, "hustler");
        }
        ReportOutcome::Dropped => panic!("request was dropped"),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn code_fenced_payload_is_tolerated() {
    let mut server = mockito::Server::new_async().await;
    let fenced = format!("```json\n{}\n```", report_json("sage"));
    server
        .mock("POST", MODEL_PATH)
        .match_query(key_matcher("env-key"))
        .with_status(200)
        .with_body(provider_body(&fenced))
        .create_async()
        .await;

    let client = ReportClient::new(server.url(), MODEL).with_env_key("env-key");
    let (answers, summary) = answered(1);
    let outcome = client
        .request_report(&summary, &answers, RequestOptions::default())
        .await
        .unwrap();
    assert!(matches!(outcome, ReportOutcome::Ready(r) if r.selected_persona_id == "sage"));
}

#[tokio::test]
async fn two_triggers_within_debounce_window_make_one_call() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", MODEL_PATH)
        .match_query(key_matcher("env-key"))
        .with_status(200)
        .with_body(provider_body(&report_json("neighbor")))
        .expect(1)
        .create_async()
        .await;

    let client = ReportClient::new(server.url(), MODEL).with_env_key("env-key");
    let (answers, summary) = answered(2);

    let first = client
        .request_report(&summary, &answers, RequestOptions::default())
        .await
        .unwrap();
    assert!(matches!(first, ReportOutcome::Ready(_)));

    // The UI layer firing the trigger again right away is a no-op.
    let second = client
        .request_report(&summary, &answers, RequestOptions::default())
        .await
        .unwrap();
    assert_eq!(second, ReportOutcome::Dropped);

    mock.assert_async().await;
}

#[tokio::test]
async fn override_key_retry_passes_the_engaged_guard() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", MODEL_PATH)
        .match_query(key_matcher("env-key"))
        .with_status(200)
        .with_body(provider_body(&report_json("statue")))
        .create_async()
        .await;
    let manual = server
        .mock("POST", MODEL_PATH)
        .match_query(key_matcher("manual-key"))
        .with_status(200)
        .with_body(provider_body(&report_json("charmer")))
        .expect(1)
        .create_async()
        .await;

    let client = ReportClient::new(server.url(), MODEL).with_env_key("env-key");
    let (answers, summary) = answered(3);
    client
        .request_report(&summary, &answers, RequestOptions::default())
        .await
        .unwrap();

    // Manual retry with an explicit key is always admitted.
    let outcome = client
        .request_report(
            &summary,
            &answers,
            RequestOptions {
                override_key: Some("manual-key".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(matches!(outcome, ReportOutcome::Ready(r) if r.selected_persona_id == "charmer"));
    manual.assert_async().await;
}

#[tokio::test]
async fn quota_exceeded_is_classified_and_prompts_for_key() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", MODEL_PATH)
        .match_query(key_matcher("env-key"))
        .with_status(429)
        .with_body("quota exceeded")
        .create_async()
        .await;

    let client = ReportClient::new(server.url(), MODEL).with_env_key("env-key");
    let (answers, summary) = answered(2);
    let err = client
        .request_report(&summary, &answers, RequestOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err, ReportError::QuotaExceeded);
    assert!(err.prompts_for_key());
}

#[tokio::test]
async fn rejected_key_is_classified_as_invalid_credential() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", MODEL_PATH)
        .match_query(key_matcher("bad-key"))
        .with_status(400)
        .with_body(r#"{"error": {"message": "API key not valid"}}"#)
        .create_async()
        .await;

    let client = ReportClient::new(server.url(), MODEL).with_env_key("bad-key");
    let (answers, summary) = answered(2);
    let err = client
        .request_report(&summary, &answers, RequestOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err, ReportError::InvalidCredential);
    assert!(err.prompts_for_key());
}

#[tokio::test]
async fn server_error_is_classified_as_provider_unavailable() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", MODEL_PATH)
        .match_query(key_matcher("env-key"))
        .with_status(503)
        .create_async()
        .await;

    let client = ReportClient::new(server.url(), MODEL).with_env_key("env-key");
    let (answers, summary) = answered(2);
    let err = client
        .request_report(&summary, &answers, RequestOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err, ReportError::ProviderUnavailable { status: 503 });
    assert!(!err.prompts_for_key());
}

#[tokio::test]
async fn empty_text_payload_is_empty_response() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", MODEL_PATH)
        .match_query(key_matcher("env-key"))
        .with_status(200)
        .with_body(provider_body(""))
        .create_async()
        .await;

    let client = ReportClient::new(server.url(), MODEL).with_env_key("env-key");
    let (answers, summary) = answered(2);
    let err = client
        .request_report(&summary, &answers, RequestOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err, ReportError::EmptyResponse);
}

#[tokio::test]
async fn manual_key_is_used_when_no_env_key_exists() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", MODEL_PATH)
        .match_query(key_matcher("typed-in"))
        .with_status(200)
        .with_body(provider_body(&report_json("pioneer")))
        .expect(1)
        .create_async()
        .await;

    let client = ReportClient::new(server.url(), MODEL);
    assert!(!client.has_credential());
    client.set_manual_key("typed-in");
    assert!(client.has_credential());

    let (answers, summary) = answered(0);
    let outcome = client
        .request_report(&summary, &answers, RequestOptions::default())
        .await
        .unwrap();
    assert!(matches!(outcome, ReportOutcome::Ready(_)));
    mock.assert_async().await;
}

#[tokio::test]
async fn forced_fallback_never_touches_the_network() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", MODEL_PATH)
        .expect(0)
        .create_async()
        .await;

    // No credential either: the fallback path must not care.
    let client = ReportClient::new(server.url(), MODEL);
    let (answers, summary) = answered(3); // total 48
    let outcome = client
        .request_report(
            &summary,
            &answers,
            RequestOptions {
                force_fallback: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    match outcome {
        ReportOutcome::Ready(report) => {
            assert_eq!(report.selected_persona_id, "charmer");
        }
        ReportOutcome::Dropped => panic!("forced fallback must not be dropped"),
    }
    mock.assert_async().await;
}
