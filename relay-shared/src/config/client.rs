use serde::{Deserialize, Serialize};
use std::{env, fmt, fs, path::PathBuf, str::FromStr};
use thiserror::Error;
use url::Url;

/// Default origin of the Relay server.
pub const DEFAULT_SERVER_ORIGIN: &str = "http://localhost:8080";
/// Default API base path, resolved against the origin.
pub const DEFAULT_API_URL: &str = "/api";

/// Errors raised while loading or rendering configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(String),

    #[error("failed to serialize configuration: {0}")]
    Serialize(String),

    #[error("unsupported configuration format '{0}'. Use 'yaml', 'json' or 'toml'.")]
    UnsupportedFormat(String),

    #[error("invalid API URL '{0}'")]
    InvalidUrl(String),
}

/// Output format for diagnostics.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Parse(format!("unknown log format '{other}'"))),
        }
    }
}

/// Serialization format for configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    /// Conventional file name for this format.
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Yaml => "relay.yaml",
            Self::Json => "relay.json",
            Self::Toml => "relay.toml",
        }
    }

    fn from_extension(path: &std::path::Path) -> Result<Self, ConfigError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        extension.parse()
    }
}

impl FromStr for ConfigFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
            Self::Toml => "toml",
        })
    }
}

/// The main configuration structure for the Relay client.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Origin the API path is resolved against.
    pub server_origin: String,

    /// API base: an absolute URL, or a path relative to `server_origin`.
    pub api_url: String,

    /// Logging level used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Logging output format.
    pub log_format: LogFormat,

    /// Directory holding the persisted session.
    pub session_dir: PathBuf,

    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Config {
    /// Generates a default configuration.
    pub fn with_defaults() -> Self {
        Self {
            server_origin: DEFAULT_SERVER_ORIGIN.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            log_level: "warn".to_string(),
            log_format: LogFormat::Text,
            session_dir: default_session_dir(),
            user_agent: format!("relay-cli/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Loads the configuration from a file, environment variables, or defaults.
    ///
    /// File values win over environment variables; `api_url_override`
    /// (typically a command-line flag) wins over both.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the file cannot be read or parsed, or
    /// when the resolved API URL is invalid.
    pub fn load_config(
        config_path: Option<PathBuf>,
        api_url_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::with_defaults();
        let mut config = defaults.clone();

        if let Some(path) = config_path {
            let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            config = Self::parse(&content, ConfigFormat::from_extension(&path)?)?;
        }

        if config.api_url == defaults.api_url {
            if let Ok(api_url) = env::var("RELAY_API_URL") {
                config.api_url = api_url;
            }
        }
        if config.server_origin == defaults.server_origin {
            if let Ok(origin) = env::var("RELAY_SERVER_ORIGIN") {
                config.server_origin = origin;
            }
        }
        if config.log_level == defaults.log_level {
            if let Ok(level) = env::var("RELAY_LOG_LEVEL") {
                config.log_level = level;
            }
        }
        if config.log_format == defaults.log_format {
            if let Ok(format) = env::var("RELAY_LOG_FORMAT") {
                config.log_format = format.parse()?;
            }
        }
        if config.session_dir == defaults.session_dir {
            if let Ok(dir) = env::var("RELAY_SESSION_DIR") {
                config.session_dir = PathBuf::from(dir);
            }
        }

        if let Some(api_url) = api_url_override {
            config.api_url = api_url;
        }

        config.api_base_url()?;
        Ok(config)
    }

    /// Parses configuration text in the given format.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] when the text is malformed.
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        match format {
            ConfigFormat::Yaml => {
                serde_yml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
            }
            ConfigFormat::Json => {
                serde_json::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
            }
            ConfigFormat::Toml => {
                toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
            }
        }
    }

    /// Renders the configuration in the given format.
    ///
    /// # Errors
    /// Returns [`ConfigError::Serialize`] if serialization fails.
    pub fn render(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        match format {
            ConfigFormat::Yaml => {
                serde_yml::to_string(self).map_err(|err| ConfigError::Serialize(err.to_string()))
            }
            ConfigFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|err| ConfigError::Serialize(err.to_string())),
            ConfigFormat::Toml => toml::to_string_pretty(self)
                .map_err(|err| ConfigError::Serialize(err.to_string())),
        }
    }

    /// The absolute API base URL, always ending in `/`.
    ///
    /// An absolute `api_url` is used as-is; a relative one is joined onto
    /// `server_origin`.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidUrl`] when neither form yields an
    /// `http` or `https` URL.
    pub fn api_base_url(&self) -> Result<Url, ConfigError> {
        let resolved = match Url::parse(&self.api_url) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&self.server_origin)
                .and_then(|origin| origin.join(&self.api_url))
                .map_err(|_| ConfigError::InvalidUrl(self.api_url.clone()))?,
            Err(_) => return Err(ConfigError::InvalidUrl(self.api_url.clone())),
        };

        if !matches!(resolved.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(self.api_url.clone()));
        }

        Ok(with_trailing_slash(resolved))
    }
}

/// Platform config directory for the session, falling back to `./.relay`.
pub fn default_session_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from("./.relay"),
        |dirs| dirs.config_dir().join("relay"),
    )
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn cleanup_env_vars() {
        unsafe {
            env::remove_var("RELAY_API_URL");
            env::remove_var("RELAY_SERVER_ORIGIN");
            env::remove_var("RELAY_LOG_LEVEL");
            env::remove_var("RELAY_LOG_FORMAT");
            env::remove_var("RELAY_SESSION_DIR");
        }
    }

    #[test]
    fn defaults_resolve_to_local_api() {
        let config = Config::with_defaults();
        assert_eq!(config.api_url, "/api");
        assert_eq!(
            config.api_base_url().unwrap().as_str(),
            "http://localhost:8080/api/"
        );
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn absolute_api_url_is_used_as_is() {
        let config = Config {
            api_url: "https://relay.example.com/v2/api".into(),
            ..Config::with_defaults()
        };
        assert_eq!(
            config.api_base_url().unwrap().as_str(),
            "https://relay.example.com/v2/api/"
        );
    }

    #[test]
    fn non_http_url_is_rejected() {
        let config = Config {
            api_url: "ftp://relay.example.com/api".into(),
            ..Config::with_defaults()
        };
        assert!(matches!(
            config.api_base_url(),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    #[serial]
    fn environment_overrides_defaults() {
        cleanup_env_vars();
        unsafe {
            env::set_var("RELAY_API_URL", "http://10.0.0.5:9000/api");
            env::set_var("RELAY_LOG_LEVEL", "debug");
            env::set_var("RELAY_LOG_FORMAT", "json");
            env::set_var("RELAY_SESSION_DIR", "/tmp/relay-session");
        }

        let config = Config::load_config(None, None).unwrap();
        assert_eq!(config.api_url, "http://10.0.0.5:9000/api");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.session_dir, PathBuf::from("/tmp/relay-session"));

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn override_wins_over_environment() {
        cleanup_env_vars();
        unsafe {
            env::set_var("RELAY_API_URL", "http://env.example.com/api");
        }

        let config =
            Config::load_config(None, Some("http://flag.example.com/api".into())).unwrap();
        assert_eq!(config.api_url, "http://flag.example.com/api");

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn loads_partial_yaml_file() {
        cleanup_env_vars();
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("relay.yaml");
        fs::write(
            &path,
            "server_origin: \"http://relay.local:8081\"\nlog_level: \"info\"\n",
        )
        .unwrap();

        let config = Config::load_config(Some(path), None).unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(
            config.api_base_url().unwrap().as_str(),
            "http://relay.local:8081/api/"
        );
    }

    #[test]
    #[serial]
    fn loads_toml_and_json_files() {
        cleanup_env_vars();
        let temp_dir = TempDir::new().unwrap();

        let toml_path = temp_dir.path().join("relay.toml");
        fs::write(&toml_path, "api_url = \"http://toml.local/api\"\n").unwrap();
        let config = Config::load_config(Some(toml_path), None).unwrap();
        assert_eq!(config.api_url, "http://toml.local/api");

        let json_path = temp_dir.path().join("relay.json");
        fs::write(&json_path, r#"{"log_format":"json"}"#).unwrap();
        let config = Config::load_config(Some(json_path), None).unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("relay.ini");
        fs::write(&path, "api_url=/api").unwrap();

        let err = Config::load_config(Some(path), None).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(ref ext) if ext == "ini"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Config::load_config(Some(PathBuf::from("/nonexistent/relay.yaml")), None)
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/relay.yaml"));
    }

    #[test]
    fn rendered_toml_parses_back() {
        let config = Config::with_defaults();
        let text = config.render(ConfigFormat::Toml).unwrap();
        assert!(text.contains("api_url = \"/api\""));
        assert_eq!(Config::parse(&text, ConfigFormat::Toml).unwrap(), config);
    }
}
