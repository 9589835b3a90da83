// tests/metrics.rs
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use feedback_sentiment_analyzer::{app, metrics::Metrics, AnalyzerConfig};

// Full app plus /metrics, as the binary wires it. The recorder is global, so
// this file holds a single test.
fn build_app() -> Router {
    let metrics = Metrics::init().expect("install recorder once per test binary");
    app(&AnalyzerConfig::default())
        .expect("app() should build Router in tests")
        .merge(metrics.router())
}

#[tokio::test]
async fn metrics_endpoint_counts_analyses_and_rejections() {
    let app = build_app();

    for payload in [
        r#"{"comment":"great food"}"#,
        r#"{"comment":"الأكل لذيذ but slow service"}"#,
        r#"{"comment":""}"#,
    ] {
        let resp = app
            .clone()
            .oneshot(
                Request::post("/analyze")
                    .header("content-type", "application/json")
                    .body(Body::from(payload))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(resp.status() == StatusCode::OK || resp.status() == StatusCode::UNPROCESSABLE_ENTITY);
    }

    let resp = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // axum::body::to_bytes requires an explicit limit
    let body = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();

    for needle in [
        "feedback_analyses_total 2",
        "feedback_segmented_total 1",
        "feedback_invalid_inputs_total 1",
        "feedback_analysis_ms",
    ] {
        assert!(
            text.contains(needle),
            "metrics exposition missing '{needle}'\n{text}"
        );
    }
}
