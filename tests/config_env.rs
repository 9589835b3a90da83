// tests/config_env.rs
use feedback_sentiment_analyzer::config::{
    AnalyzerConfig, StoreKind, ENV_CONFIG_PATH, ENV_KEYWORDS_TOP_N,
};
use std::{env, fs, path::PathBuf};

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = env::temp_dir().join(format!("feedback_cfg_{}_{}", tag, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn clear_env() {
    env::remove_var(ENV_CONFIG_PATH);
    env::remove_var(ENV_KEYWORDS_TOP_N);
}

#[serial_test::serial]
#[test]
fn explicit_path_wins_and_top_n_env_overrides() {
    clear_env();
    let dir = scratch_dir("explicit");
    let path = dir.join("analyzer.toml");
    fs::write(
        &path,
        r#"
[keywords]
top_n = 3

[store]
kind = "jsonl"
path = "out/results.jsonl"
"#,
    )
    .unwrap();

    env::set_var(ENV_CONFIG_PATH, path.display().to_string());
    let cfg = AnalyzerConfig::load().unwrap();
    assert_eq!(cfg.keywords.top_n, 3);
    assert_eq!(cfg.store.kind, StoreKind::Jsonl);

    env::set_var(ENV_KEYWORDS_TOP_N, " 8 ");
    let cfg = AnalyzerConfig::load().unwrap();
    assert_eq!(cfg.keywords.top_n, 8);

    // garbage is ignored, not fatal
    env::set_var(ENV_KEYWORDS_TOP_N, "many");
    let cfg = AnalyzerConfig::load().unwrap();
    assert_eq!(cfg.keywords.top_n, 3);

    clear_env();
    let _ = fs::remove_dir_all(&dir);
}

#[serial_test::serial]
#[test]
fn missing_explicit_file_is_an_error() {
    clear_env();
    env::set_var(ENV_CONFIG_PATH, "/definitely/not/here/analyzer.toml");
    let err = AnalyzerConfig::load().unwrap_err();
    assert!(err.to_string().contains("analyzer config"), "{err:#}");
    clear_env();
}

#[serial_test::serial]
#[test]
fn top_n_env_is_clamped() {
    clear_env();
    let dir = scratch_dir("clamp");
    let path = dir.join("analyzer.toml");
    fs::write(&path, "").unwrap();
    env::set_var(ENV_CONFIG_PATH, path.display().to_string());
    env::set_var(ENV_KEYWORDS_TOP_N, "100000");

    let cfg = AnalyzerConfig::load().unwrap();
    assert!(cfg.keywords.top_n <= 50);
    // empty file means defaults everywhere
    assert_eq!(cfg.language.segmentable, vec!["ar".to_string(), "en".to_string()]);
    assert_eq!(cfg.segmenter.short_token_max_len, 2);

    clear_env();
    let _ = fs::remove_dir_all(&dir);
}

#[serial_test::serial]
#[test]
fn http_model_without_url_is_rejected() {
    let err = AnalyzerConfig::from_toml_str(
        r#"
[sentiment.multilingual]
kind = "http"
"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("multilingual"), "{err:#}");
}
