use kami_core::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Client configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Base URL of the Kami backend
    pub api_url: ConfigValue<String>,
    /// Directory holding the local cache and session
    pub data_dir: ConfigValue<PathBuf>,
    /// Request timeout in seconds
    pub timeout_secs: ConfigValue<u64>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    api_url: Option<String>,
    data_dir: Option<PathBuf>,
    timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut api_url = ConfigValue::new(DEFAULT_BASE_URL.to_string(), ConfigSource::Default);
        let mut data_dir = ConfigValue::new(Self::default_data_dir(), ConfigSource::Default);
        let mut timeout_secs = ConfigValue::new(DEFAULT_TIMEOUT.as_secs(), ConfigSource::Default);
        let mut config_file = None;

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(url) = file_config.api_url {
                api_url = ConfigValue::new(url, ConfigSource::File);
            }
            if let Some(dir) = file_config.data_dir {
                // Expand `~`, then resolve relative paths against the config file's directory
                let dir = expand_home(dir);
                let resolved = if dir.is_relative() {
                    path.parent().map(|p| p.join(&dir)).unwrap_or(dir)
                } else {
                    dir
                };
                data_dir = ConfigValue::new(resolved, ConfigSource::File);
            }
            if let Some(secs) = file_config.timeout_secs {
                timeout_secs = ConfigValue::new(secs, ConfigSource::File);
            }
        }

        if let Ok(url) = std::env::var("KAMI_API_URL") {
            api_url = ConfigValue::new(url, ConfigSource::Environment);
        }
        if let Ok(dir) = std::env::var("KAMI_DATA_DIR") {
            data_dir = ConfigValue::new(expand_home(PathBuf::from(dir)), ConfigSource::Environment);
        }
        if let Ok(secs) = std::env::var("KAMI_TIMEOUT_SECS") {
            let secs = secs
                .parse()
                .map_err(|_| ConfigError::InvalidValue("KAMI_TIMEOUT_SECS", secs))?;
            timeout_secs = ConfigValue::new(secs, ConfigSource::Environment);
        }

        Ok(Self {
            api_url,
            data_dir,
            timeout_secs,
            config_file,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.value)
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/kami/
    /// - macOS: ~/Library/Application Support/kami/
    /// - Windows: %APPDATA%/kami/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kami")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/kami/
    /// - macOS: ~/Library/Application Support/kami/
    /// - Windows: %APPDATA%/kami/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kami")
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue(&'static str, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidValue(name, value) => {
                write!(f, "Invalid value for {}: '{}'", name, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Replaces a leading `~` with the home directory. Other paths pass through.
fn expand_home(path: PathBuf) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path;
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.api_url.source, ConfigSource::Default);
        assert_eq!(config.timeout_secs.value, 30);
        assert!(config.data_dir.value.ends_with("kami"));
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "api_url: http://localhost:8080").unwrap();
        writeln!(file, "data_dir: /var/lib/kami").unwrap();
        writeln!(file, "timeout_secs: 5").unwrap();

        let config = Config::load(Some(config_path.clone())).unwrap();
        assert_eq!(config.api_url.value, "http://localhost:8080");
        assert_eq!(config.api_url.source, ConfigSource::File);
        assert_eq!(config.data_dir.value, PathBuf::from("/var/lib/kami"));
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_relative_data_dir_resolves_against_config_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "data_dir: ./cache\n").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.data_dir.value, temp_dir.path().join("./cache"));
        assert_eq!(config.api_url.source, ConfigSource::Default);
    }

    #[test]
    fn test_home_relative_data_dir_expands() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "data_dir: ~/.local/share/kami\n").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.data_dir.value, home.join(".local/share/kami"));
        }
        assert!(!config.data_dir.value.starts_with(temp_dir.path()));
    }

    #[test]
    fn test_expand_home_leaves_other_paths() {
        assert_eq!(expand_home(PathBuf::from("/var/lib/kami")), PathBuf::from("/var/lib/kami"));
        assert_eq!(expand_home(PathBuf::from("./cache")), PathBuf::from("./cache"));
        assert_eq!(expand_home(PathBuf::from("~other/x")), PathBuf::from("~other/x"));
    }

    #[test]
    #[ignore] // Run with --ignored; env vars can pollute parallel tests
    fn test_env_var_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "api_url: http://fromfile\n").unwrap();

        std::env::set_var("KAMI_API_URL", "http://fromenv");

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.api_url.value, "http://fromenv");
        assert_eq!(config.api_url.source, ConfigSource::Environment);

        std::env::remove_var("KAMI_API_URL");
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "invalid: yaml: content: [\n").unwrap();

        let err = Config::load(Some(config_path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
