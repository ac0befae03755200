//! `.adscript/config.toml` loading and validation.
//!
//! Every field has a default, so an absent file (at the default path) or an
//! empty one yields a usable configuration. `${VAR}` references in `api_key`
//! are expanded from the environment. The API key itself is only required
//! once a pipeline is about to run; see [`LlmSettings::resolve_api_key`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where `adscript` looks for its configuration when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = ".adscript/config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("no API key configured: set llm.api_key or the {env} environment variable")]
    MissingApiKey { env: String },
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub llm: LlmSettings,
    pub observability: ObservabilitySettings,
}

/// `[llm]`
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Environment variable consulted when `api_key` is unset.
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub json_mode: bool,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: llm::OPENAI_BASE_URL.to_string(),
            model: nodes::DEFAULT_MODEL.to_string(),
            api_key: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 60,
            json_mode: true,
        }
    }
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_key_env", &self.api_key_env)
            .field("timeout_secs", &self.timeout_secs)
            .field("json_mode", &self.json_mode)
            .finish()
    }
}

impl LlmSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The configured key, falling back to the `api_key_env` variable.
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    fn resolve_api_key_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<String, ConfigError> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty() && !key.contains("${"))
            .or_else(|| lookup(&self.api_key_env).filter(|key| !key.trim().is_empty()))
            .ok_or_else(|| ConfigError::MissingApiKey {
                env: self.api_key_env.clone(),
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// `[observability]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ObservabilitySettings {
    pub log_format: LogFormat,
    /// `EnvFilter` directives. `RUST_LOG` takes precedence when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
    /// OTLP/gRPC collector endpoint, e.g. `http://localhost:4317`. Tracing
    /// export is off when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otlp_endpoint: Option<String>,
    pub service_name: String,
}

impl Default for ObservabilitySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            log_filter: None,
            otlp_endpoint: None,
            service_name: "adscript".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Loads `path`, or [`DEFAULT_CONFIG_PATH`] when `path` is `None`.
    ///
    /// An explicit path must exist; the default path may be absent.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };

        if !required && !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let mut config: AppConfig =
            toml::from_str(&content).map_err(|source| ConfigError::Parse { path, source })?;
        config.expand_env();
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML document without touching the filesystem.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: AppConfig =
            toml::from_str(content).map_err(|source| ConfigError::Parse {
                path: PathBuf::from("<inline>"),
                source,
            })?;
        config.expand_env();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let llm = &self.llm;
        if llm.model.trim().is_empty() {
            return Err(ConfigError::Invalid("llm.model must not be empty".into()));
        }
        if llm.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "llm.timeout_secs must be greater than zero".into(),
            ));
        }
        if !(llm.base_url.starts_with("http://") || llm.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "llm.base_url must start with http:// or https://, got '{}'",
                llm.base_url
            )));
        }
        if llm.api_key_env.trim().is_empty() {
            return Err(ConfigError::Invalid("llm.api_key_env must not be empty".into()));
        }
        if self.observability.service_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "observability.service_name must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// The effective configuration as TOML, with the API key redacted.
    pub fn to_redacted_toml(&self) -> Result<String, toml::ser::Error> {
        let mut shown = self.clone();
        if shown.llm.api_key.is_some() {
            shown.llm.api_key = Some("[REDACTED]".to_string());
        }
        toml::to_string_pretty(&shown)
    }

    fn expand_env(&mut self) {
        if let Some(key) = self.llm.api_key.as_mut() {
            *key = expand_env_vars(key, |name| std::env::var(name).ok());
        }
    }
}

/// Expands `${VAR}` patterns. Unset variables are left as written.
fn expand_env_vars(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next();
            let mut name = String::new();
            let mut closed = false;
            for c in chars.by_ref() {
                if c == '}' {
                    closed = true;
                    break;
                }
                name.push(c);
            }
            match lookup(&name) {
                Some(value) if closed => result.push_str(&value),
                _ => {
                    result.push_str("${");
                    result.push_str(&name);
                    if closed {
                        result.push('}');
                    }
                }
            }
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        (name == "ADSCRIPT_TEST_KEY").then(|| "sk-from-env".to_string())
    }

    #[test]
    fn empty_document_gives_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.timeout(), Duration::from_secs(60));
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
    }

    #[test]
    fn sections_override_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [llm]
            model = "gpt-4o-mini"
            base_url = "http://localhost:11434/v1"
            json_mode = false

            [observability]
            log_format = "json"
            otlp_endpoint = "http://localhost:4317"
            "#,
        )
        .unwrap();
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert!(!config.llm.json_mode);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(
            config.observability.otlp_endpoint.as_deref(),
            Some("http://localhost:4317")
        );
    }

    #[test]
    fn validation_rejects_bad_values() {
        for doc in [
            "[llm]\nmodel = \" \"",
            "[llm]\ntimeout_secs = 0",
            "[llm]\nbase_url = \"api.openai.com\"",
        ] {
            assert!(
                matches!(AppConfig::from_toml_str(doc), Err(ConfigError::Invalid(_))),
                "accepted: {doc}"
            );
        }
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = AppConfig::from_toml_str("[llm]\nmodle = \"gpt-4o\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn env_references_expand() {
        assert_eq!(expand_env_vars("${ADSCRIPT_TEST_KEY}", lookup), "sk-from-env");
        assert_eq!(expand_env_vars("pre-${ADSCRIPT_TEST_KEY}", lookup), "pre-sk-from-env");
        assert_eq!(expand_env_vars("${NOT_SET_ANYWHERE}", lookup), "${NOT_SET_ANYWHERE}");
        assert_eq!(expand_env_vars("${UNCLOSED", lookup), "${UNCLOSED");
        assert_eq!(expand_env_vars("plain $value", lookup), "plain $value");
    }

    #[test]
    fn api_key_falls_back_to_env_variable() {
        let settings = LlmSettings {
            api_key_env: "ADSCRIPT_TEST_KEY".into(),
            ..LlmSettings::default()
        };
        assert_eq!(settings.resolve_api_key_with(lookup).unwrap(), "sk-from-env");
    }

    #[test]
    fn unexpanded_key_counts_as_missing() {
        let settings = LlmSettings {
            api_key: Some("${NOT_SET_ANYWHERE}".into()),
            api_key_env: "ALSO_NOT_SET".into(),
            ..LlmSettings::default()
        };
        let err = settings.resolve_api_key_with(lookup).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey { env } if env == "ALSO_NOT_SET"));
    }

    #[test]
    fn explicit_key_wins() {
        let settings = LlmSettings {
            api_key: Some("sk-inline".into()),
            api_key_env: "ADSCRIPT_TEST_KEY".into(),
            ..LlmSettings::default()
        };
        assert_eq!(settings.resolve_api_key_with(lookup).unwrap(), "sk-inline");
    }

    #[test]
    fn key_is_redacted_everywhere_it_is_shown() {
        let mut config = AppConfig::default();
        config.llm.api_key = Some("sk-very-secret".into());
        assert!(!format!("{config:?}").contains("sk-very-secret"));
        let shown = config.to_redacted_toml().unwrap();
        assert!(!shown.contains("sk-very-secret"));
        assert!(shown.contains("[REDACTED]"));
    }
}
