// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod analyze;
pub mod api;
pub mod config;
pub mod keywords;
pub mod lang;
pub mod metrics;
pub mod normalize;
pub mod registry;
pub mod segment;
pub mod sentiment;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::analyze::{AnalysisError, AnalysisOutcome, AnalysisResult, Analyzer, SegmentResult};
pub use crate::api::router;
pub use crate::config::AnalyzerConfig;
pub use crate::registry::Registry;

use std::sync::Arc;

/// Build the analyzer (registry + store) described by `cfg`.
pub fn build_analyzer(cfg: &AnalyzerConfig) -> anyhow::Result<Arc<Analyzer>> {
    let registry = Arc::new(Registry::from_config(cfg)?);
    let store = store::build_store(&cfg.store)?;
    Ok(Arc::new(Analyzer::new(registry, store, cfg)))
}

/// Full in-process app without the metrics endpoint (used by the binary and tests).
pub fn app(cfg: &AnalyzerConfig) -> anyhow::Result<axum::Router> {
    Ok(api::router(build_analyzer(cfg)?))
}
