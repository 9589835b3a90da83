//! Feedback sentiment service: binary entrypoint.
//! Boots the Axum HTTP server: config, model registry, result store, metrics.

use feedback_sentiment_analyzer::{app, metrics::Metrics, AnalyzerConfig};
use shuttle_axum::ShuttleAxum;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - FEEDBACK_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("FEEDBACK_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("feedback_sentiment_analyzer=debug,info"));

    // Shuttle may already have installed a subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    // Initialize dev tracing early (no-op in production).
    enable_dev_tracing();

    // Config + models are loaded once; a failure here aborts startup.
    let cfg = AnalyzerConfig::load()?;
    let mut router = app(&cfg)?;

    match Metrics::init() {
        Ok(m) => router = router.merge(m.router()),
        Err(e) => warn!(error = ?e, "metrics disabled"),
    }

    info!(
        segmentable = ?cfg.language.segmentable,
        store = ?cfg.store.kind,
        "feedback sentiment service ready"
    );
    Ok(router.into())
}
