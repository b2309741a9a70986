//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Request body ceiling: an 8 MB image grows by a third as base64, plus JSON framing.
const MAX_BODY_BYTES: usize = 12 * 1024 * 1024;

/// Build the API router.
pub fn api_router(ctx: ApiContext) -> Router {
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/expenses/analyze", post(endpoints::expenses::analyze))
        .route("/expenses/score", post(endpoints::expenses::score))
        .route("/gst/validate", post(endpoints::gst::validate))
        .route("/receipts/parse", post(endpoints::receipts::parse))
        .with_state(ctx);

    // The dashboard is served from a different origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .nest("/api", routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use base64::Engine;
    use tower::ServiceExt;

    use crate::pipeline::analyzer::ExpenseAnalyzer;
    use crate::pipeline::extraction::MockOcrEngine;
    use crate::pipeline::gst_registry::{GstRegistry, MockGstRegistry, OfflineRegistry, RegistryRecord};

    const RECEIPT: &str = "Hotel Sagar\n\
        GSTIN 29AAGCB7383J1Z4\n\
        Masala Dosa 2 x 90.00  180.00\n\
        Filter Coffee 2 x 40.00  80.00\n\
        CGST 6.50 SGST 6.50\n\
        Net Payable: Rs 273.00";

    fn test_router_with(registry: Arc<dyn GstRegistry>) -> Router {
        let analyzer = ExpenseAnalyzer::new(Arc::new(MockOcrEngine::new(RECEIPT)), registry);
        api_router(ApiContext::new(Arc::new(analyzer)))
    }

    fn test_router() -> Router {
        test_router_with(Arc::new(MockGstRegistry::with_record(RegistryRecord {
            trade_name: Some("Hotel Sagar".into()),
            status: Some("Active".into()),
            ..Default::default()
        })))
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn jpeg_data_url() -> String {
        let bytes = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];
        format!(
            "data:image/jpeg;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(bytes)
        )
    }

    #[tokio::test]
    async fn health_reports_registry_mode() {
        let request = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
        let (status, json) = send(test_router(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["gstRegistry"], "online");

        let request = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
        let (_, json) = send(test_router_with(Arc::new(OfflineRegistry)), request).await;
        assert_eq!(json["gstRegistry"], "offline");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn analyze_runs_full_pipeline() {
        let request = post_json(
            "/api/expenses/analyze",
            serde_json::json!({
                "claimedAmount": 273.0,
                "remainingBalance": 1000.0,
                "receiptImage": jpeg_data_url(),
            }),
        );
        let (status, json) = send(test_router(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["submission"]["detectedAmount"], 273.0);
        assert_eq!(json["amountConfidence"], "high");
        assert_eq!(json["submission"]["gstValidation"]["apiVerified"], true);
        assert_eq!(json["fraud"]["riskLevel"], "MINIMAL");
        assert!(json["receiptFingerprint"].is_string());
        assert!(json["report"].as_str().unwrap().contains("FRAUD ANALYSIS REPORT"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn analyze_accepts_text_without_image() {
        let request = post_json(
            "/api/expenses/analyze",
            serde_json::json!({ "claimedAmount": 400.0, "receiptText": RECEIPT }),
        );
        let (status, json) = send(test_router(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["fraud"]["flags"][0], "MODERATE_AMOUNT_MISMATCH");
        assert!(json.get("receiptFingerprint").is_none());
    }

    #[tokio::test]
    async fn analyze_rejects_unsupported_image() {
        let pdf = base64::engine::general_purpose::STANDARD.encode(b"%PDF-1.4 bill");
        let request = post_json(
            "/api/expenses/analyze",
            serde_json::json!({ "receiptImage": pdf }),
        );
        let (status, json) = send(test_router(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn analyze_rejects_bad_base64() {
        let request = post_json(
            "/api/expenses/analyze",
            serde_json::json!({ "receiptImage": "data:image/png;base64,@@@" }),
        );
        let (status, _) = send(test_router(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/expenses/score")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, json) = send(test_router(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn score_empty_submission_matches_goldens() {
        let request = post_json("/api/expenses/score", serde_json::json!({}));
        let (status, json) = send(test_router(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["fraud"]["score"], 55);
        assert_eq!(json["fraud"]["riskLevel"], "MEDIUM");
        assert_eq!(json["reliability"]["score"], 37);
        assert_eq!(json["reliability"]["rating"], "POOR");
        assert!(json["report"].as_str().unwrap().contains("1. NO AMOUNT DETECTED"));
        assert!(json["reliabilityReport"].as_str().unwrap().contains("Rating: POOR (red)"));
    }

    #[tokio::test]
    async fn score_with_gst_validation() {
        let request = post_json(
            "/api/expenses/score",
            serde_json::json!({
                "claimedAmount": 500.0,
                "detectedAmount": 500.0,
                "ocrExtractedText": "x".repeat(120),
                "gstValidation": {
                    "gstNumber": "29ABCDE1234F1Z5",
                    "valid": true,
                    "formatValid": true,
                    "apiVerified": false
                },
                "remainingBalance": 470.0
            }),
        );
        let (status, json) = send(test_router(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json["fraud"]["flags"],
            serde_json::json!(["GST_NOT_API_VERIFIED", "OVERSPENDING"])
        );
        assert_eq!(json["reliability"]["flags"], serde_json::json!(["MODERATE_OVERSPEND"]));
    }

    #[tokio::test]
    async fn score_accepts_validation_without_number() {
        let request = post_json(
            "/api/expenses/score",
            serde_json::json!({
                "claimedAmount": 500.0,
                "detectedAmount": 500.0,
                "ocrExtractedText": "x".repeat(250),
                "gstValidation": {
                    "valid": true,
                    "businessName": "Hotel Sagar",
                    "status": "Active",
                    "apiVerified": true
                },
                "remainingBalance": 5000.0
            }),
        );
        let (status, json) = send(test_router(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["fraud"]["score"], 0);
        assert_eq!(json["fraud"]["flags"], serde_json::json!([]));
        assert_eq!(json["reliability"]["score"], 100);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn gst_validate_uses_registry() {
        let request = post_json(
            "/api/gst/validate",
            serde_json::json!({ "gstNumber": "29aagcb7383j1z4" }),
        );
        let (status, json) = send(test_router(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["gstNumber"], "29AAGCB7383J1Z4");
        assert_eq!(json["valid"], true);
        assert_eq!(json["apiVerified"], true);
        assert_eq!(json["businessName"], "Hotel Sagar");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn gst_validate_rejects_malformed_without_lookup() {
        let request = post_json(
            "/api/gst/validate",
            serde_json::json!({ "gstNumber": "29ABCDE1234F1X5" }),
        );
        let (status, json) = send(test_router(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["valid"], false);
        assert_eq!(json["formatValid"], false);
    }

    #[tokio::test]
    async fn gst_validate_requires_number() {
        let request = post_json("/api/gst/validate", serde_json::json!({ "gstNumber": "  " }));
        let (status, _) = send(test_router(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn receipts_parse_extracts_fields() {
        let request = post_json("/api/receipts/parse", serde_json::json!({ "text": RECEIPT }));
        let (status, json) = send(test_router(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["amount"], 273.0);
        assert_eq!(json["amountConfidence"], "high");
        assert_eq!(json["gstNumber"], "29AAGCB7383J1Z4");
    }

    #[tokio::test]
    async fn receipts_parse_omits_missing_fields() {
        let request = post_json("/api/receipts/parse", serde_json::json!({ "text": "no numbers here" }));
        let (status, json) = send(test_router(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({}));
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let request = Request::builder().uri("/api/nope").body(Body::empty()).unwrap();
        let response = test_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
