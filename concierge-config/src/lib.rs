//! Loader for service configuration with YAML + environment overlays.
//!
//! Sources merge in the order they are attached (later wins), followed by
//! `CONCIERGE__`-prefixed environment variables, which always win. Nested
//! keys use a double underscore, e.g. `CONCIERGE__LLM__MODEL=llama3.1` or
//! `CONCIERGE__SERVER__ALLOWED_ORIGINS=http://a,http://b`. String values are
//! then `${VAR}`-expanded before deserialization. Every field has a default,
//! so an empty document is a valid configuration.
use config::{Config, ConfigError, Environment, File};
use concierge_common::observability::LogFormat;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "CONCIERGE";
const TAVILY_KEY_ENV: &str = "TAVILY_API_KEY";

/// File name looked up in the working directory and the user config dir.
pub const DEFAULT_CONFIG_FILE: &str = "concierge.yaml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConciergeConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub search: SearchConfig,
    pub curation: CurationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8000".into(),
            allowed_origins: [
                "http://localhost:5173",
                "http://127.0.0.1:5173",
                "http://localhost:3000",
                "http://127.0.0.1:3000",
                "http://localhost:4000",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Ollama,
}

/// Text-generation service. Small-model friendly defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    /// Ollama `num_predict`.
    pub max_tokens: u32,
    /// Ollama `num_ctx`.
    pub context_window: u32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Ollama,
            endpoint: "http://127.0.0.1:11434".into(),
            model: "llama3".into(),
            temperature: 0.4,
            max_tokens: 256,
            context_window: 1024,
            timeout_secs: 70,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchProvider {
    #[default]
    Tavily,
    /// Never search; the pipeline runs on generator output alone.
    None,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub provider: SearchProvider,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub max_results: u32,
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: SearchProvider::Tavily,
            endpoint: "https://api.tavily.com".into(),
            api_key: None,
            max_results: 10,
            timeout_secs: 15,
        }
    }
}

impl SearchConfig {
    /// The usable credential, if any.
    ///
    /// A configured key that is blank or still carries an unexpanded
    /// `${...}` placeholder counts as absent; with no configured key the
    /// `TAVILY_API_KEY` environment variable is consulted.
    pub fn resolved_api_key(&self) -> Option<String> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() && !key.contains("${") => Some(key.to_string()),
            Some(_) => None,
            None => std::env::var(TAVILY_KEY_ENV)
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShortfallPolicy {
    #[default]
    Replace,
    Retain,
}

/// Content policy overrides. `None` keeps the built-in lists.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CurationConfig {
    pub aggregator_domains: Option<Vec<String>>,
    pub listicle_pattern: Option<String>,
    pub restaurant_pool: Option<Vec<String>>,
    pub banned_restaurant_prefix: Option<String>,
    pub activity_shortfall: ShortfallPolicy,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub emit_stderr: bool,
    pub directory: Option<PathBuf>,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            emit_stderr: true,
            directory: None,
            filter: "info".into(),
        }
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => break,
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Candidate config files, lowest precedence first: the user config dir,
/// then the working directory.
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("concierge").join(DEFAULT_CONFIG_FILE));
    }
    paths.push(PathBuf::from(DEFAULT_CONFIG_FILE));
    paths
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct ConciergeConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for ConciergeConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConciergeConfigLoader {
    /// An empty loader; environment overrides are applied by [`Self::load`].
    ///
    /// ```
    /// use concierge_config::ConciergeConfigLoader;
    ///
    /// let config = ConciergeConfigLoader::new()
    ///     .with_yaml_str("llm:\n  model: llama3.1")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.llm.model, "llama3.1");
    /// assert_eq!(config.server.listen, "127.0.0.1:8000");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a required YAML/TOML/JSON file; the format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is silently skipped when missing.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Attach every path from [`default_config_paths`] as optional.
    pub fn with_default_locations(self) -> Self {
        default_config_paths()
            .into_iter()
            .fold(self, |loader, path| loader.with_optional_file(path))
    }

    /// Merge an inline YAML snippet.
    ///
    /// ```
    /// use concierge_config::{ConciergeConfigLoader, ShortfallPolicy};
    ///
    /// let cfg = ConciergeConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// curation:
    ///   restaurant_pool: ["Fry Bread House", "Pizzeria Bianco"]
    ///   activity_shortfall: retain
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.curation.restaurant_pool.unwrap().len(), 2);
    /// assert_eq!(cfg.curation.activity_shortfall, ShortfallPolicy::Retain);
    /// assert!(cfg.curation.aggregator_domains.is_none());
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into typed config.
    ///
    /// ```
    /// use concierge_config::ConciergeConfigLoader;
    ///
    /// unsafe { std::env::set_var("DOCTEST_TAVILY_KEY", "tvly-from-env"); }
    ///
    /// let config = ConciergeConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// search:
    ///   api_key: "${DOCTEST_TAVILY_KEY}"
    ///   max_results: 5
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.search.resolved_api_key().as_deref(), Some("tvly-from-env"));
    /// assert_eq!(config.search.max_results, 5);
    /// assert_eq!(config.search.endpoint, "https://api.tavily.com");
    ///
    /// unsafe { std::env::remove_var("DOCTEST_TAVILY_KEY"); }
    /// ```
    pub fn load(self) -> Result<ConciergeConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins")
                    .with_list_parse_key("curation.aggregator_domains")
                    .with_list_parse_key("curation.restaurant_pool"),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}
