//! End-to-end relay tests: a real relay server in front of a mock downstream.

use anyhow::Result;
use form_relay::downstream::DOWNSTREAM_PATH;
use form_relay::SubmissionEnvelope;
use serde_json::{json, Value};
use std::time::Duration;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::utils::{spawn_relay, spawn_stalling_downstream, unreachable_base_url};

async fn downstream_returning(status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(DOWNSTREAM_PATH))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;
    server
}

async fn received_envelopes(server: &MockServer) -> Result<Vec<Value>> {
    let requests = server.received_requests().await.unwrap_or_default();
    requests
        .iter()
        .map(|r| -> Result<Value> { Ok(serde_json::from_slice(&r.body)?) })
        .collect()
}

// ── Success path ────────────────────────────────────────────────────

#[tokio::test]
async fn test_downstream_200_returns_processed() -> Result<()> {
    let downstream = downstream_returning(200).await;
    let relay = spawn_relay(&downstream.uri()).await?;

    let response = relay
        .submit(&json!({"formName": "contact", "email": "a@b.com", "message": "hi"}))
        .await?;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await?;
    assert_eq!(body, json!({"message": "Form submission processed"}));
    assert_eq!(relay.state.metrics.submissions().forwarded, 1);
    Ok(())
}

#[tokio::test]
async fn test_contact_form_outbound_body() -> Result<()> {
    let downstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(DOWNSTREAM_PATH))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&downstream)
        .await;
    let relay = spawn_relay(&downstream.uri()).await?;

    let before = OffsetDateTime::now_utc();
    relay
        .submit(&json!({"formName": "contact", "email": "a@b.com", "message": "hi"}))
        .await?;
    let after = OffsetDateTime::now_utc();

    let requests = downstream.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
    let raw = std::str::from_utf8(&requests[0].body)?;
    assert!(raw.starts_with(
        r#"{"form_name":"contact","payload":{"email":"a@b.com","message":"hi"},"created_at":""#
    ));

    let envelope: SubmissionEnvelope = serde_json::from_str(raw)?;
    assert!(envelope.created_at >= before && envelope.created_at <= after);

    let created_at: Value = serde_json::from_str::<Value>(raw)?["created_at"].clone();
    OffsetDateTime::parse(created_at.as_str().unwrap_or_default(), &Rfc3339)?;
    Ok(())
}

#[tokio::test]
async fn test_any_2xx_counts_as_success() -> Result<()> {
    let downstream = downstream_returning(204).await;
    let relay = spawn_relay(&downstream.uri()).await?;

    let response = relay.submit(&json!({"formName": "newsletter"})).await?;
    assert_eq!(response.status(), 200);
    Ok(())
}

#[tokio::test]
async fn test_payload_passes_through_verbatim() -> Result<()> {
    let downstream = downstream_returning(200).await;
    let relay = spawn_relay(&downstream.uri()).await?;

    let input = json!({
        "formName": "signup",
        "name": "<script>alert(1)</script>",
        "plan": {"tier": "pro", "seats": 5},
        "interests": ["a", "b"],
        "optIn": false
    });
    relay.submit(&input).await?;

    let envelopes = received_envelopes(&downstream).await?;
    let mut expected = input.as_object().cloned().unwrap_or_default();
    expected.remove("formName");
    assert_eq!(envelopes[0]["form_name"], "signup");
    assert_eq!(envelopes[0]["payload"], Value::Object(expected));
    Ok(())
}

// ── Failure path ────────────────────────────────────────────────────

#[tokio::test]
async fn test_downstream_503_returns_generic_500() -> Result<()> {
    let downstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(DOWNSTREAM_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("database offline"))
        .mount(&downstream)
        .await;
    let relay = spawn_relay(&downstream.uri()).await?;

    let response = relay.submit(&json!({"formName": "contact"})).await?;

    assert_eq!(response.status(), 500);
    let body = response.text().await?;
    assert_eq!(body, r#"{"message":"Error processing form submission"}"#);
    assert!(!body.contains("database offline"));
    assert_eq!(relay.state.metrics.submissions().failed, 1);
    Ok(())
}

#[tokio::test]
async fn test_downstream_unreachable_returns_generic_500() -> Result<()> {
    let relay = spawn_relay(&unreachable_base_url()?).await?;

    let response = relay.submit(&json!({"formName": "contact"})).await?;

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await?;
    assert_eq!(body, json!({"message": "Error processing form submission"}));
    Ok(())
}

#[tokio::test]
async fn test_stalled_error_body_still_answers_promptly() -> Result<()> {
    let downstream = spawn_stalling_downstream(
        "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 100\r\n\r\nhello",
    )
    .await?;
    let relay = spawn_relay(&downstream).await?;

    let response = tokio::time::timeout(
        Duration::from_secs(5),
        relay.submit(&json!({"formName": "contact"})),
    )
    .await??;

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await?;
    assert_eq!(body, json!({"message": "Error processing form submission"}));
    assert_eq!(relay.state.metrics.submissions().failed, 1);
    Ok(())
}

#[tokio::test]
async fn test_downstream_404_is_failure() -> Result<()> {
    let downstream = MockServer::start().await;
    let relay = spawn_relay(&downstream.uri()).await?;

    // No mock mounted: wiremock answers 404.
    let response = relay.submit(&json!({"formName": "contact"})).await?;
    assert_eq!(response.status(), 500);
    Ok(())
}

// ── Malformed input ─────────────────────────────────────────────────

#[tokio::test]
async fn test_malformed_json_rejected_without_forwarding() -> Result<()> {
    let downstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&downstream)
        .await;
    let relay = spawn_relay(&downstream.uri()).await?;

    let response = relay.submit_raw("{\"formName\": \"contact\",").await?;

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await?;
    assert_eq!(body, json!({"message": "Invalid form submission"}));
    assert_eq!(relay.state.metrics.submissions().rejected, 1);
    Ok(())
}

#[tokio::test]
async fn test_missing_form_name_rejected_without_forwarding() -> Result<()> {
    let downstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&downstream)
        .await;
    let relay = spawn_relay(&downstream.uri()).await?;

    let response = relay.submit(&json!({"email": "a@b.com"})).await?;
    assert_eq!(response.status(), 400);
    Ok(())
}

#[tokio::test]
async fn test_body_parsed_regardless_of_content_type() -> Result<()> {
    let downstream = downstream_returning(200).await;
    let relay = spawn_relay(&downstream.uri()).await?;

    let response = relay
        .http
        .post(relay.url("/submit-form"))
        .header("content-type", "text/plain")
        .body(r#"{"formName":"contact"}"#)
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    Ok(())
}

// ── No deduplication ────────────────────────────────────────────────

#[tokio::test]
async fn test_identical_requests_forward_twice() -> Result<()> {
    let downstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(DOWNSTREAM_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&downstream)
        .await;
    let relay = spawn_relay(&downstream.uri()).await?;

    let input = json!({"formName": "contact", "email": "a@b.com"});
    relay.submit(&input).await?;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    relay.submit(&input).await?;

    let envelopes = received_envelopes(&downstream).await?;
    assert_eq!(envelopes.len(), 2);
    assert_eq!(envelopes[0]["payload"], envelopes[1]["payload"]);
    assert_ne!(envelopes[0]["created_at"], envelopes[1]["created_at"]);
    Ok(())
}
