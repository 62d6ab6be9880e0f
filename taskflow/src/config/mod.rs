//! Configuration system for the `TaskFlow` shell.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/taskflow/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::PathBuf;
use std::time::Duration;

use crate::tasks::views;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// A setting is outside its accepted range.
    #[error("invalid value for {key}: {value} (expected {expected})")]
    InvalidValue {
        /// Dotted setting name.
        key: &'static str,
        /// Value found in the file.
        value: String,
        /// Accepted range.
        expected: &'static str,
    },
}

/// Accepted range for the deadline window settings, in days.
const WINDOW_DAYS: std::ops::RangeInclusive<i64> = 1..=365;

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    session: SessionFileConfig,
    storage: StorageFileConfig,
    tasks: TasksFileConfig,
}

/// `[session]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct SessionFileConfig {
    login_delay_ms: Option<u64>,
    storage_key: Option<String>,
}

/// `[storage]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct StorageFileConfig {
    data_dir: Option<PathBuf>,
    ephemeral: Option<bool>,
}

/// `[tasks]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct TasksFileConfig {
    seed: Option<bool>,
    due_soon_days: Option<i64>,
    upcoming_days: Option<i64>,
    recent_limit: Option<usize>,
}

impl ConfigFile {
    /// Rejects settings outside their accepted ranges.
    fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("tasks.due_soon_days", self.tasks.due_soon_days),
            ("tasks.upcoming_days", self.tasks.upcoming_days),
        ] {
            if let Some(days) = value
                && !WINDOW_DAYS.contains(&days)
            {
                return Err(ConfigError::InvalidValue {
                    key,
                    value: days.to_string(),
                    expected: "1..=365",
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Resolved configuration (concrete types, all fields populated)
// ---------------------------------------------------------------------------

/// Session store settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Simulated authentication latency.
    pub login_delay: Duration,
    /// Key of the durable slot holding the identity snapshot.
    pub storage_key: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            login_delay: Duration::from_millis(1000),
            storage_key: "taskflow_user".to_string(),
        }
    }
}

/// Derived-view windows and limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewConfig {
    /// Width of the "due soon" warning window, in days.
    pub due_soon_days: i64,
    /// Width of the "upcoming deadlines" window, in days.
    pub upcoming_days: i64,
    /// Number of entries in recent-activity listings.
    pub recent_limit: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            due_soon_days: views::DUE_SOON_DAYS,
            upcoming_days: views::UPCOMING_DAYS,
            recent_limit: views::RECENT_LIMIT,
        }
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Session store settings.
    pub session: SessionConfig,
    /// Directory holding durable slots. `None` when no data dir is known.
    pub data_dir: Option<PathBuf>,
    /// Keep the session in memory only.
    pub ephemeral: bool,
    /// Load the sample task set at startup.
    pub seed: bool,
    /// Derived-view windows and limits.
    pub views: ViewConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            data_dir: dirs::data_dir().map(|d| d.join("taskflow")),
            ephemeral: false,
            seed: true,
            views: ViewConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the explicit config file cannot be read
    /// or parsed, or if the default config file exists but is invalid.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    /// Resolve from CLI args and env vars alone, ignoring any config file.
    ///
    /// Used when the config file cannot be loaded, so explicit flags such as
    /// `--ephemeral` still apply.
    #[must_use]
    pub fn from_cli(cli: &CliArgs) -> Self {
        Self::resolve(cli, &ConfigFile::default())
    }

    /// Resolve an `AppConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default.
    #[must_use]
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            session: SessionConfig {
                login_delay: cli
                    .login_delay_ms
                    .or(file.session.login_delay_ms)
                    .map_or(defaults.session.login_delay, Duration::from_millis),
                storage_key: file
                    .session
                    .storage_key
                    .clone()
                    .unwrap_or(defaults.session.storage_key),
            },
            data_dir: cli
                .data_dir
                .clone()
                .or_else(|| file.storage.data_dir.clone())
                .or(defaults.data_dir),
            ephemeral: cli.ephemeral || file.storage.ephemeral.unwrap_or(defaults.ephemeral),
            seed: if cli.no_seed {
                false
            } else {
                file.tasks.seed.unwrap_or(defaults.seed)
            },
            views: ViewConfig {
                due_soon_days: file
                    .tasks
                    .due_soon_days
                    .unwrap_or(defaults.views.due_soon_days),
                upcoming_days: file
                    .tasks
                    .upcoming_days
                    .unwrap_or(defaults.views.upcoming_days),
                recent_limit: file
                    .tasks
                    .recent_limit
                    .unwrap_or(defaults.views.recent_limit),
            },
        }
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Task management dashboard shell")]
pub struct CliArgs {
    /// Path to config file (default: `~/.config/taskflow/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for the persisted session.
    #[arg(long, env = "TASKFLOW_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Simulated login latency in milliseconds.
    #[arg(long, env = "TASKFLOW_LOGIN_DELAY_MS")]
    pub login_delay_ms: Option<u64>,

    /// Keep the session in memory only (nothing written to disk).
    #[arg(long)]
    pub ephemeral: bool,

    /// Start with an empty task list instead of the sample set.
    #[arg(long)]
    pub no_seed: bool,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "TASKFLOW_LOG")]
    pub log_level: String,

    /// Path to log file (default: `$TMPDIR/taskflow.log`).
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config. Out-of-range values are rejected either way.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    let file = read_config_file(explicit_path)?;
    file.validate()?;
    Ok(file)
}

fn read_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(ConfigFile::default());
        };
        config_dir.join("taskflow").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
