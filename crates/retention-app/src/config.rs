// Configuration loading and parsing (league.toml, grading.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use retention_core::config::{
    AutoFlagConfig, DraftExpectationConfig, GradeConfig, LeagueRules, PerformanceConfig,
    PlayTimeConfig, QualificationConfig, TeamSuccessConfig,
};
use retention_core::EngineConfig;

use crate::report::OutputFormat;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("invalid grading rules: {0}")]
    Rules(#[from] retention_core::ConfigError),

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory the config was loaded from; relative data paths resolve
    /// against it.
    pub base_dir: PathBuf,
    pub league_name: String,
    pub engine: EngineConfig,
    pub data_paths: DataPaths,
    pub output: OutputConfig,
}

impl Config {
    /// Resolve a configured data path against the base directory.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.base_dir.join(p)
        }
    }
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueSection,
    data_paths: DataPaths,
    #[serde(default)]
    output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
struct LeagueSection {
    name: String,
    #[serde(flatten)]
    rules: LeagueRules,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub players: String,
    pub teams: String,
    pub head_to_head: String,
    #[serde(default)]
    pub lineups: Option<String>,
    #[serde(default)]
    pub postseason: Option<String>,
    #[serde(default)]
    pub manual: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

// ---------------------------------------------------------------------------
// grading.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire grading.toml file.
#[derive(Debug, Clone, Deserialize)]
struct GradingFile {
    qualification: QualificationConfig,
    team_success: TeamSuccessConfig,
    play_time: PlayTimeConfig,
    performance: PerformanceConfig,
    auto_flag: AutoFlagConfig,
    draft_expectation: DraftExpectationConfig,
    grade: GradeConfig,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` and
/// `config/grading.toml`, relative to the given `base_dir`.
///
/// Does not copy defaults; call `ensure_config_files` first.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigFileError> {
    let config_dir = base_dir.join("config");

    // --- league.toml (required) ---
    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigFileError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;

    // --- grading.toml (required) ---
    let grading_path = config_dir.join("grading.toml");
    let grading_text = read_file(&grading_path)?;
    let grading: GradingFile =
        toml::from_str(&grading_text).map_err(|e| ConfigFileError::ParseError {
            path: grading_path.clone(),
            source: e,
        })?;

    let engine = EngineConfig {
        league: league_file.league.rules,
        qualification: grading.qualification,
        team_success: grading.team_success,
        play_time: grading.play_time,
        performance: grading.performance,
        auto_flag: grading.auto_flag,
        draft_expectation: grading.draft_expectation,
        grade: grading.grade,
    };

    let config = Config {
        base_dir: base_dir.to_path_buf(),
        league_name: league_file.league.name,
        engine,
        data_paths: league_file.data_paths,
        output: league_file.output,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigFileError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigFileError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     pass --base-dir or run from the project root",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigFileError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();

    let entries =
        std::fs::read_dir(&defaults_dir).map_err(|e| ConfigFileError::DefaultsCopyError {
            message: format!("failed to read defaults directory: {e}"),
        })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigFileError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content =
                    std::fs::read(&path).map_err(|e| ConfigFileError::DefaultsCopyError {
                        message: format!("failed to read {}: {e}", path.display()),
                    })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigFileError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                // Never overwrite local edits
            }
            Err(e) => {
                return Err(ConfigFileError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigFileError> {
    std::fs::read_to_string(path).map_err(|_| ConfigFileError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigFileError> {
    if config.league_name.trim().is_empty() {
        return Err(ConfigFileError::ValidationError {
            field: "league.name".into(),
            message: "must not be empty".into(),
        });
    }

    let paths = &config.data_paths;
    let required: &[(&str, &str)] = &[
        ("data_paths.players", &paths.players),
        ("data_paths.teams", &paths.teams),
        ("data_paths.head_to_head", &paths.head_to_head),
    ];
    for (name, val) in required {
        if val.trim().is_empty() {
            return Err(ConfigFileError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }

    config.engine.validate()?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
