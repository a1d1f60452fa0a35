// Pipeline configuration loading and validation (pipeline.toml).
//
// Every section has defaults, so an empty file (or no file at all) yields the
// stock pipeline: the published strength-score weights, a 50th-percentile
// neutral point for opponent adjustment and standard fantasy scoring.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub validation: ValidationConfig,
    pub ranking: RankingWeights,
    pub adjustment: AdjustmentConfig,
    pub scoring: ScoringWeights,
    /// Team -> opponent lookup used when a player record carries no opponent.
    pub matchups: BTreeMap<String, String>,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Require team identifiers to be a known NFL name or abbreviation.
    ///
    /// Off by default: scraped team columns mix full names, cities and
    /// abbreviations ("Baltimore", "KC"), so only the two-character minimum
    /// applies unless this is turned on.
    pub strict_team_names: bool,
}

/// Weights of the composite defense strength score.
///
/// `strength = ppg * points + (ypg / yards_scale) * yards
///           - tpg * turnover_multiplier * turnovers
///           - spg * sack_multiplier * sacks`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RankingWeights {
    pub points: f64,
    pub yards: f64,
    pub turnovers: f64,
    pub sacks: f64,
    pub yards_scale: f64,
    pub turnover_multiplier: f64,
    pub sack_multiplier: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        RankingWeights {
            points: 0.4,
            yards: 0.3,
            turnovers: 0.2,
            sacks: 0.1,
            yards_scale: 100.0,
            turnover_multiplier: 5.0,
            sack_multiplier: 2.0,
        }
    }
}

/// `factor = 1 + (opponent_percentile - neutral_percentile) / percentile_scale`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdjustmentConfig {
    pub neutral_percentile: f64,
    pub percentile_scale: f64,
}

impl Default for AdjustmentConfig {
    fn default() -> Self {
        AdjustmentConfig {
            neutral_percentile: 50.0,
            percentile_scale: 100.0,
        }
    }
}

/// Fantasy point values per unit of production.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub passing_yard: f64,
    pub passing_td: f64,
    pub interception: f64,
    pub rushing_yard: f64,
    pub rushing_td: f64,
    pub receiving_yard: f64,
    pub receiving_td: f64,
    pub reception: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        ScoringWeights {
            passing_yard: 0.04,
            passing_td: 4.0,
            interception: -2.0,
            rushing_yard: 0.1,
            rushing_td: 6.0,
            receiving_yard: 0.1,
            receiving_td: 6.0,
            reception: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            dir: "output".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

impl Config {
    /// Parse and validate a TOML document. `path` is only used for error
    /// messages.
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(text).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        validate(&config)?;
        Ok(config)
    }
}

/// Load and validate configuration from an explicit file path.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    Config::from_toml_str(&text, path)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let r = &config.ranking;
    let weight_fields: &[(&str, f64)] = &[
        ("ranking.points", r.points),
        ("ranking.yards", r.yards),
        ("ranking.turnovers", r.turnovers),
        ("ranking.sacks", r.sacks),
        ("ranking.turnover_multiplier", r.turnover_multiplier),
        ("ranking.sack_multiplier", r.sack_multiplier),
    ];
    for (name, val) in weight_fields {
        if !val.is_finite() || *val < 0.0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be >= 0, got {val}"),
            });
        }
    }

    let scale_fields: &[(&str, f64)] = &[
        ("ranking.yards_scale", r.yards_scale),
        ("adjustment.percentile_scale", config.adjustment.percentile_scale),
    ];
    for (name, val) in scale_fields {
        if !val.is_finite() || *val <= 0.0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be > 0, got {val}"),
            });
        }
    }

    let neutral = config.adjustment.neutral_percentile;
    if !(0.0..=100.0).contains(&neutral) {
        return Err(ConfigError::ValidationError {
            field: "adjustment.neutral_percentile".into(),
            message: format!("must be between 0 and 100 inclusive, got {neutral}"),
        });
    }

    if config.output.dir.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "output.dir".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
