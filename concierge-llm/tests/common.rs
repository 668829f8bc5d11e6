use std::sync::OnceLock;

use concierge_common::observability::{LogConfig, LogFormat};

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let dir = std::env::temp_dir().join("concierge-tests");
        let config = LogConfig {
            app_name: "concierge-llm-tests".to_string(),
            log_dir: Some(dir),
            emit_stderr: false,
            format: LogFormat::Text,
            default_filter: "debug".to_string(),
        };

        concierge_common::observability::init_logging(config).unwrap_or_default()
    });
}
