use concierge_common::observability::LogFormat;
use concierge_config::{ConciergeConfigLoader, SearchProvider, ShortfallPolicy};
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

const FILE_YAML: &str = r#"
server:
  listen: "0.0.0.0:9000"
  allowed_origins: ["https://concierge.example"]
llm:
  model: "llama3.2:3b-instruct"
  endpoint: "http://gpu-box:11434"
  temperature: 0.2
search:
  provider: tavily
  api_key: "${TEST_TAVILY_KEY}"
  max_results: 6
curation:
  aggregator_domains: ["yelp.com", "example-directory.com"]
  banned_restaurant_prefix: "generic diner"
  activity_shortfall: retain
logging:
  format: json
  emit_stderr: false
  filter: "concierge=debug"
"#;

#[test]
#[serial]
fn file_values_are_loaded_and_expanded() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "concierge.yaml", FILE_YAML);

    let config = temp_env::with_var("TEST_TAVILY_KEY", Some("tvly-123"), || {
        ConciergeConfigLoader::new()
            .with_file(&p)
            .load()
            .expect("load config")
    });

    assert_eq!(config.server.listen, "0.0.0.0:9000");
    assert_eq!(config.server.allowed_origins, ["https://concierge.example"]);
    assert_eq!(config.llm.model, "llama3.2:3b-instruct");
    assert_eq!(config.llm.max_tokens, 256);
    assert!((config.llm.temperature - 0.2).abs() < f32::EPSILON);
    assert_eq!(config.search.provider, SearchProvider::Tavily);
    assert_eq!(config.search.resolved_api_key().as_deref(), Some("tvly-123"));
    assert_eq!(config.search.max_results, 6);
    assert_eq!(
        config.curation.aggregator_domains.as_deref(),
        Some(&["yelp.com".to_string(), "example-directory.com".to_string()][..])
    );
    assert_eq!(config.curation.banned_restaurant_prefix.as_deref(), Some("generic diner"));
    assert_eq!(config.curation.activity_shortfall, ShortfallPolicy::Retain);
    assert_eq!(config.logging.format, LogFormat::Json);
    assert!(!config.logging.emit_stderr);
}

#[test]
#[serial]
fn environment_overrides_win_over_files() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "concierge.yaml", FILE_YAML);

    let config = temp_env::with_vars(
        [
            ("CONCIERGE__LLM__MODEL", Some("mistral")),
            ("CONCIERGE__LLM__TIMEOUT_SECS", Some("30")),
            (
                "CONCIERGE__SERVER__ALLOWED_ORIGINS",
                Some("http://a.example,http://b.example"),
            ),
        ],
        || {
            ConciergeConfigLoader::new()
                .with_file(&p)
                .load()
                .expect("load config")
        },
    );

    assert_eq!(config.llm.model, "mistral");
    assert_eq!(config.llm.timeout_secs, 30);
    assert_eq!(config.llm.endpoint, "http://gpu-box:11434");
    assert_eq!(
        config.server.allowed_origins,
        ["http://a.example", "http://b.example"]
    );
}

#[test]
#[serial]
fn later_sources_override_earlier_ones() {
    let tmp = TempDir::new().unwrap();
    let base = write_yaml(&tmp, "base.yaml", "llm:\n  model: base\n  max_tokens: 512\n");
    let local = write_yaml(&tmp, "local.yaml", "llm:\n  model: local\n");

    let config = ConciergeConfigLoader::new()
        .with_file(base)
        .with_file(local)
        .load()
        .expect("load config");

    assert_eq!(config.llm.model, "local");
    assert_eq!(config.llm.max_tokens, 512);
}

#[test]
#[serial]
fn missing_optional_files_are_skipped() {
    let tmp = TempDir::new().unwrap();
    let config = ConciergeConfigLoader::new()
        .with_optional_file(tmp.path().join("absent.yaml"))
        .load()
        .expect("load config");
    assert_eq!(config.llm.model, "llama3");

    let err = ConciergeConfigLoader::new()
        .with_file(tmp.path().join("absent.yaml"))
        .load();
    assert!(err.is_err());
}

#[test]
#[serial]
fn mistyped_values_are_rejected() {
    let err = ConciergeConfigLoader::new()
        .with_yaml_str("curation:\n  activity_shortfall: sometimes\n")
        .load();
    assert!(err.is_err());
}
