//! HttpVendorClient against a local mock vendor

use std::sync::Arc;
use std::time::Duration;

use genscan_core::DetectorConfig;
use genscan_detector::{
    AssetReservation, DetectionError, Detector, HttpVendorClient, SubmissionPayload,
    TransportError, UploadPhase, VendorClient,
};
use mockito::Matcher;
use serde_json::json;

const SCORE_BODY: &str = r#"{"data":[{"is_ai_generated":0.87,"possible_sources":{"midjourney":0.6,"dalle":0.3,"sdxl":0.05,"other":0.05}}]}"#;

fn config_for(server: &mockito::Server, inline_limit: usize) -> DetectorConfig {
    let mut config = DetectorConfig::new("nvapi-test");
    config.invoke_url = format!("{}/v1/detect", server.url());
    config.assets_url = format!("{}/v2/assets", server.url());
    config.inline_limit_bytes = inline_limit;
    config
}

#[tokio::test]
async fn test_inline_detection() {
    let mut server = mockito::Server::new_async().await;
    let score = server
        .mock("POST", "/v1/detect")
        .match_header("authorization", "Bearer nvapi-test")
        .match_header("content-type", "application/json")
        .match_header("accept", "application/json")
        .match_header("nvcf-input-asset-references", Matcher::Missing)
        .match_body(Matcher::Json(json!({"input": ["data:image/png;base64,YWJj"]})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(SCORE_BODY)
        .create_async()
        .await;
    let reserve = server.mock("POST", "/v2/assets").expect(0).create_async().await;

    let detector = Detector::from_config(config_for(&server, 180_000)).unwrap();
    let verdict = detector.detect_bytes(b"abc".to_vec(), "image/png", 0.016).await.unwrap();

    score.assert_async().await;
    reserve.assert_async().await;
    assert!(verdict.is_flagged());
    assert_eq!(verdict.percentage(), 87.0);
    let labels: Vec<&str> = verdict.top_sources().iter().map(|s| s.label()).collect();
    assert_eq!(labels, vec!["midjourney", "dalle", "sdxl"]);
}

#[tokio::test]
async fn test_asset_upload_detection() {
    let mut server = mockito::Server::new_async().await;
    let upload_url = format!("{}/upload/slot-1", server.url());

    let reserve = server
        .mock("POST", "/v2/assets")
        .match_header("authorization", "Bearer nvapi-test")
        .match_body(Matcher::Json(json!({
            "contentType": "image/jpeg",
            "description": "Input Image"
        })))
        .with_status(200)
        .with_body(json!({"uploadUrl": upload_url, "assetId": "asset-123"}).to_string())
        .create_async()
        .await;
    let transfer = server
        .mock("PUT", "/upload/slot-1")
        .match_header("content-type", "image/jpeg")
        .match_header("x-amz-meta-nvcf-asset-description", "Input Image")
        .match_body("raw-jpeg-bytes")
        .with_status(200)
        .create_async()
        .await;
    let score = server
        .mock("POST", "/v1/detect")
        .match_header("nvcf-input-asset-references", "asset-123")
        .match_body(Matcher::Json(json!({"input": ["data:image/jpeg;asset_id,asset-123"]})))
        .with_status(200)
        .with_body(SCORE_BODY)
        .create_async()
        .await;

    // Any non-empty image is at or above a limit of 1
    let detector = Detector::from_config(config_for(&server, 1)).unwrap();
    let verdict = detector
        .detect_bytes(b"raw-jpeg-bytes".to_vec(), "image/jpeg", 0.9)
        .await
        .unwrap();

    reserve.assert_async().await;
    transfer.assert_async().await;
    score.assert_async().await;
    assert!(!verdict.is_flagged());
}

#[tokio::test]
async fn test_transfer_failure_skips_scoring() {
    let mut server = mockito::Server::new_async().await;
    let upload_url = format!("{}/upload/slot-2", server.url());

    server
        .mock("POST", "/v2/assets")
        .with_status(200)
        .with_body(json!({"uploadUrl": upload_url, "assetId": "asset-456"}).to_string())
        .create_async()
        .await;
    server
        .mock("PUT", "/upload/slot-2")
        .with_status(503)
        .with_body("slow down")
        .create_async()
        .await;
    let score = server.mock("POST", "/v1/detect").expect(0).create_async().await;

    let detector = Detector::from_config(config_for(&server, 1)).unwrap();
    let err = detector
        .detect_bytes(b"bytes".to_vec(), "image/png", 0.5)
        .await
        .unwrap_err();

    score.assert_async().await;
    match err {
        DetectionError::Upload {
            phase: UploadPhase::Transfer,
            source: TransportError::Rejected { status, body },
        } => {
            assert_eq!(status, 503);
            assert_eq!(body, "slow down");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_vendor_5xx_is_retryable_rejection() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/detect")
        .with_status(502)
        .with_body("bad gateway")
        .create_async()
        .await;

    let client = HttpVendorClient::new(&config_for(&server, 180_000)).unwrap();
    let err = client
        .score(&SubmissionPayload::inline("image/png", b"abc"))
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Rejected { status: 502, .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_malformed_score_body_is_schema_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/detect")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let detector = Detector::from_config(config_for(&server, 180_000)).unwrap();
    let err = detector
        .detect_bytes(b"abc".to_vec(), "image/png", 0.5)
        .await
        .unwrap_err();

    assert!(matches!(err, DetectionError::Schema(_)));
}

#[tokio::test]
async fn test_malformed_reservation_is_invalid_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v2/assets")
        .with_status(200)
        .with_body(r#"{"url":"missing-fields"}"#)
        .create_async()
        .await;

    let client = HttpVendorClient::new(&config_for(&server, 1)).unwrap();
    let err = client.reserve_asset("image/png", "Input Image").await.unwrap_err();

    assert!(matches!(err, TransportError::InvalidBody(_)));
}

#[tokio::test]
async fn test_score_timeout() {
    let server = mockito::Server::new_async().await;
    let mut config = config_for(&server, 180_000);
    // TEST-NET address: the connect either times out or is refused
    config.invoke_url = "http://192.0.2.1:9/v1/detect".to_string();
    config.score_timeout = Duration::from_millis(200);

    let client: Arc<dyn VendorClient> = Arc::new(HttpVendorClient::new(&config).unwrap());
    let err = client
        .score(&SubmissionPayload::inline("image/png", b"abc"))
        .await
        .unwrap_err();

    assert!(err.is_retryable());
}

#[test]
fn test_reservation_wire_names() {
    let reservation: AssetReservation =
        serde_json::from_str(r#"{"uploadUrl":"https://s3/x","assetId":"id-1"}"#).unwrap();
    assert_eq!(reservation.upload_url, "https://s3/x");
    assert_eq!(reservation.asset_id, "id-1");
}
