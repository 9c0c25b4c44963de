use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::handler::{
    ConsoleHandler, DEFAULT_DATEFMT, DEFAULT_FORMAT, FileHandler, Formatter, Handler, HandlerSet, JsonHandler, Stream,
};
use crate::severity::Severity;

/// Path of a YAML config file to load
pub const CONFIG_ENV: &str = "EMITTER_REGISTRY_CONFIG";

/// Overrides the configured default level
pub const LEVEL_ENV: &str = "EMITTER_REGISTRY_LEVEL";

const APP_DIR: &str = "emitter-registry";
const CONFIG_FILE: &str = "logging.yaml";

/// Registry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Default level for emitters created without an explicit level
    pub level: Severity,
    /// Message template shared by the text handlers
    pub format: String,
    /// chrono strftime pattern for `{timestamp}`
    pub datefmt: String,
    /// Default handler set attached to every emitter
    pub handlers: Vec<HandlerConfig>,
}

/// One handler entry in the config file
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum HandlerConfig {
    Console {
        #[serde(default)]
        stream: Stream,
        #[serde(default)]
        color: bool,
        #[serde(default)]
        level: Severity,
    },
    File {
        path: PathBuf,
        #[serde(default)]
        level: Severity,
    },
    /// JSON lines file
    Json {
        path: PathBuf,
        #[serde(default)]
        level: Severity,
    },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: Severity::Debug,
            format: DEFAULT_FORMAT.to_string(),
            datefmt: DEFAULT_DATEFMT.to_string(),
            handlers: vec![HandlerConfig::default()],
        }
    }
}

impl Default for HandlerConfig {
    fn default() -> Self {
        HandlerConfig::Console {
            stream: Stream::Stderr,
            color: false,
            level: Severity::NotSet,
        }
    }
}

impl HandlerConfig {
    /// Construct the handler this entry describes
    pub fn build(&self, formatter: &Formatter) -> Result<Arc<dyn Handler>> {
        let handler: Arc<dyn Handler> = match self {
            HandlerConfig::Console { stream, color, level } => Arc::new(
                ConsoleHandler::new()
                    .with_stream(*stream)
                    .with_color(*color)
                    .with_level(*level)
                    .with_formatter(formatter.clone()),
            ),
            HandlerConfig::File { path, level } => {
                let path = Config::expand_path(path);
                let handler = FileHandler::open(&path)
                    .context(format!("Failed to open log file {}", path.display()))?
                    .with_formatter(formatter.clone())
                    .with_level(*level);
                Arc::new(handler)
            }
            HandlerConfig::Json { path, level } => {
                let path = Config::expand_path(path);
                let handler = JsonHandler::open(&path)
                    .context(format!("Failed to open JSON log file {}", path.display()))?
                    .with_level(*level);
                Arc::new(handler)
            }
        };
        Ok(handler)
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Self::load_file(config_path)?;
        config.apply_level_override(std::env::var(LEVEL_ENV).ok().as_deref());
        Ok(config)
    }

    fn load_file(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, it must load
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let path = Self::expand_path(Path::new(&env_path));
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", CONFIG_ENV, e);
                    }
                }
            }
        }

        // Try ~/.config/emitter-registry/logging.yaml
        if let Some(config_dir) = dirs::config_dir() {
            let path = config_dir.join(APP_DIR).join(CONFIG_FILE);
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }

        let local_config = PathBuf::from(CONFIG_FILE);
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load local config: {}", e);
                }
            }
        }

        log::debug!("No logging config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::debug!("Loaded logging config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Replace `level` when `value` names a severity; anything else is ignored
    pub fn apply_level_override(&mut self, value: Option<&str>) {
        let Some(value) = value else {
            return;
        };
        match value.parse::<Severity>() {
            Ok(level) => self.level = level,
            Err(e) => log::warn!("Ignoring {}: {}", LEVEL_ENV, e),
        }
    }

    /// Formatter shared by every text handler built from this config
    pub fn formatter(&self) -> Formatter {
        Formatter::format_with(&self.format).with_datefmt(&self.datefmt)
    }

    /// Build the default handler set
    pub fn build_handlers(&self) -> Result<HandlerSet> {
        let formatter = self.formatter();
        let mut set = HandlerSet::new();
        for entry in &self.handlers {
            set.insert(entry.build(&formatter)?);
        }
        Ok(set)
    }

    /// Expand a path that may contain ~ or env vars
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = shellexpand::full(&path_str).unwrap_or_else(|_| path_str.clone());
        PathBuf::from(expanded.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.level, Severity::Debug);
        assert_eq!(config.format, DEFAULT_FORMAT);
        assert_eq!(config.handlers, vec![HandlerConfig::default()]);
    }

    #[test]
    fn test_parse_yaml_with_all_handler_kinds() {
        let yaml = r#"
level: warning
format: "{level} {message}"
handlers:
  - kind: console
    stream: stdout
    color: true
  - kind: file
    path: /tmp/app.log
    level: ERROR
  - kind: json
    path: /tmp/app.jsonl
"#;
        let config: Config = serde_yaml::from_str(yaml).expect("Failed to parse");
        assert_eq!(config.level, Severity::Warning);
        assert_eq!(config.datefmt, DEFAULT_DATEFMT);
        assert_eq!(config.handlers.len(), 3);
        assert_eq!(
            config.handlers[0],
            HandlerConfig::Console {
                stream: Stream::Stdout,
                color: true,
                level: Severity::NotSet,
            }
        );
        assert_eq!(
            config.handlers[1],
            HandlerConfig::File {
                path: PathBuf::from("/tmp/app.log"),
                level: Severity::Error,
            }
        );
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = Config::default();
        let yaml_str = serde_yaml::to_string(&config).expect("Failed to serialize");
        let parsed: Config = serde_yaml::from_str(&yaml_str).expect("Failed to deserialize");
        assert_eq!(parsed.level, config.level);
        assert_eq!(parsed.format, config.format);
        assert_eq!(parsed.handlers, config.handlers);
    }

    #[test]
    fn test_load_explicit_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("logging.yaml");
        fs::write(&path, "level: error\n").unwrap();

        let config = Config::load_file(Some(&path)).unwrap();
        assert_eq!(config.level, Severity::Error);
        assert_eq!(config.handlers.len(), 1);
    }

    #[test]
    fn test_load_explicit_path_missing_is_error() {
        let path = PathBuf::from("/nonexistent/emitter-registry/logging.yaml");
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to load config"));
    }

    #[test]
    fn test_load_returns_config() {
        let result = Config::load(None);
        assert!(result.is_ok());
    }

    #[test]
    fn test_load_follows_env_chain() {
        let temp = TempDir::new().unwrap();
        let valid = temp.path().join("valid.yaml");
        fs::write(&valid, "level: warning\nformat: \"{level} {message}\"\n").unwrap();
        let broken = temp.path().join("broken.yaml");
        fs::write(&broken, "level: [not, a, level\n").unwrap();

        // SAFETY: Test runs single-threaded, env vars are test-specific
        unsafe {
            std::env::set_var(CONFIG_ENV, &valid);
        }
        let config = Config::load(None).unwrap();
        assert_eq!(config.level, Severity::Warning);
        assert_eq!(config.format, "{level} {message}");

        // An unparsable optional file is skipped, not fatal
        unsafe {
            std::env::set_var(CONFIG_ENV, &broken);
        }
        let config = Config::load(None).unwrap();
        assert_eq!(config.format, DEFAULT_FORMAT);

        unsafe {
            std::env::set_var(CONFIG_ENV, &valid);
            std::env::set_var(LEVEL_ENV, "critical");
        }
        let config = Config::load(None).unwrap();
        assert_eq!(config.level, Severity::Critical);
        assert_eq!(config.format, "{level} {message}");

        unsafe {
            std::env::remove_var(CONFIG_ENV);
            std::env::remove_var(LEVEL_ENV);
        }
    }

    #[test]
    fn test_level_override() {
        let mut config = Config::default();
        config.apply_level_override(Some("critical"));
        assert_eq!(config.level, Severity::Critical);
        config.apply_level_override(Some("loud"));
        assert_eq!(config.level, Severity::Critical);
        config.apply_level_override(None);
        assert_eq!(config.level, Severity::Critical);
    }

    #[test]
    fn test_build_handlers_opens_files() {
        let temp = TempDir::new().unwrap();
        let config = Config {
            handlers: vec![
                HandlerConfig::File {
                    path: temp.path().join("logs").join("app.log"),
                    level: Severity::NotSet,
                },
                HandlerConfig::Json {
                    path: temp.path().join("app.jsonl"),
                    level: Severity::Info,
                },
            ],
            ..Config::default()
        };
        let set = config.build_handlers().unwrap();
        assert_eq!(set.len(), 2);
        assert!(temp.path().join("logs").join("app.log").exists());
        assert!(temp.path().join("app.jsonl").exists());
    }

    #[test]
    fn test_build_handlers_reports_unopenable_file() {
        let temp = TempDir::new().unwrap();
        let config = Config {
            handlers: vec![HandlerConfig::File {
                path: temp.path().to_path_buf(),
                level: Severity::NotSet,
            }],
            ..Config::default()
        };
        let err = config.build_handlers().unwrap_err();
        assert!(err.to_string().contains("Failed to open log file"));
    }

    #[test]
    fn test_expand_path_no_expansion() {
        let path = PathBuf::from("/var/log/app.log");
        assert_eq!(Config::expand_path(&path), PathBuf::from("/var/log/app.log"));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = Config::expand_path(&PathBuf::from("~/app.log"));
        assert!(!expanded.to_string_lossy().contains('~'));
        assert!(expanded.to_string_lossy().ends_with("app.log"));
    }
}
