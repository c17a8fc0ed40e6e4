//! Zero-shot HTTP labeler against a mock inference endpoint

use contract_intel::{
    analysis::ContractAnalyzer,
    config::{AnalysisConfig, LabelerConfig, LabelerProvider},
    labeler::{BreakerState, ClauseLabeler, HttpZeroShotLabeler, LabelerError, CANDIDATE_LABELS},
    AnalysisError,
};
use mockito::Matcher;
use secrecy::SecretString;
use serde_json::json;
use std::sync::Arc;

fn config(server: &mockito::ServerGuard) -> LabelerConfig {
    LabelerConfig {
        provider: LabelerProvider::Http,
        endpoint: format!("{}/models/zero-shot", server.url()),
        api_key: Some(SecretString::new("hf_test_token".to_string())),
        timeout_ms: 2_000,
        retry_attempts: 2,
        retry_backoff_ms: 1,
        cache_max_entries: 0,
        ..LabelerConfig::default()
    }
}

#[tokio::test]
async fn test_top_label_returned() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/models/zero-shot")
        .match_header("authorization", "Bearer hf_test_token")
        .match_body(Matcher::PartialJson(json!({
            "inputs": "Invoices are payable within ninety days.",
            "parameters": { "candidate_labels": CANDIDATE_LABELS }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "sequence": "Invoices are payable within ninety days.",
                "labels": ["Payment Terms", "Financial Liability", "Safe Clause"],
                "scores": [0.81, 0.12, 0.07]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let labeler = HttpZeroShotLabeler::new(config(&server)).unwrap();
    let prediction = labeler
        .label("Invoices are payable within ninety days.", &CANDIDATE_LABELS)
        .await
        .unwrap();

    assert_eq!(prediction.label, "Payment Terms");
    assert_eq!(prediction.score, 0.81);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_retries_then_fails() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/models/zero-shot")
        .with_status(503)
        .with_body("model loading")
        .expect(3)
        .create_async()
        .await;

    let labeler = HttpZeroShotLabeler::new(config(&server)).unwrap();
    let err = labeler
        .label("Payment is due monthly.", &CANDIDATE_LABELS)
        .await
        .unwrap_err();

    assert!(matches!(err, LabelerError::Upstream(msg) if msg.contains("model loading")));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_circuit_opens_after_repeated_failures() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/models/zero-shot")
        .with_status(500)
        .expect_at_least(1)
        .create_async()
        .await;

    let labeler = HttpZeroShotLabeler::new(LabelerConfig {
        retry_attempts: 0,
        circuit_breaker_failures: 2,
        ..config(&server)
    })
    .unwrap();

    for _ in 0..2 {
        assert!(labeler.label("Payment is due.", &CANDIDATE_LABELS).await.is_err());
    }
    assert_eq!(labeler.breaker_state(), BreakerState::Open);

    let err = labeler
        .label("Payment is due.", &CANDIDATE_LABELS)
        .await
        .unwrap_err();
    assert!(matches!(err, LabelerError::CircuitOpen(_)));
}

#[tokio::test]
async fn test_unknown_label_aborts_analysis() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/models/zero-shot")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"labels":["Force Majeure","Safe Clause"],"scores":[0.9,0.1]}"#)
        .create_async()
        .await;

    let labeler = HttpZeroShotLabeler::new(config(&server)).unwrap();
    let analyzer = ContractAnalyzer::new(Arc::new(labeler), AnalysisConfig::default());
    let result = analyzer
        .analyze("Neither party is liable for acts of God.", None)
        .await;

    assert!(matches!(
        result,
        Err(AnalysisError::Labeler(LabelerError::UnknownLabel(label))) if label == "Force Majeure"
    ));
}
