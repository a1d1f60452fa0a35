// Record validation: field presence, type and range constraints for raw team
// and player records, plus whole-dataset reporting and cleaning.
//
// Checks run in a fixed order and the first failure decides the verdict.
// Optional fields are only checked when present; a present-but-null optional
// field is not an integer and fails.

use crate::config::ValidationConfig;
use crate::records::{Position, RawDataset};
use crate::teams;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use thiserror::Error;
use tracing::{debug, warn, Span};

// ---------------------------------------------------------------------------
// Failure reasons
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationFailure {
    #[error("record is not an object")]
    NotAnObject,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("{field} is not an integer: {value}")]
    NotInteger { field: &'static str, value: Value },

    #[error("{field} out of range [{min}, {max}]: {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("{field} must be at least {min}: {value}")]
    BelowMinimum {
        field: &'static str,
        value: i64,
        min: i64,
    },

    #[error("invalid team name: {0}")]
    InvalidTeamName(String),

    #[error("unknown team: {0}")]
    UnknownTeam(String),

    #[error("invalid player name: {0}")]
    InvalidPlayerName(String),

    #[error("player name contains no letters: {0}")]
    NameWithoutLetters(String),

    #[error("invalid position: {0}")]
    InvalidPosition(String),

    #[error("completions ({completions}) exceed attempts ({attempts})")]
    CompletionsExceedAttempts { completions: i64, attempts: i64 },
}

// ---------------------------------------------------------------------------
// Field ranges
// ---------------------------------------------------------------------------

const TEAM_GAMES: RangeInclusive<i64> = 1..=21;
const POINTS_ALLOWED: RangeInclusive<i64> = 0..=1000;
const TOTAL_YARDS_ALLOWED: RangeInclusive<i64> = 0..=10_000;
const SACKS: RangeInclusive<i64> = 0..=100;
const TURNOVERS_FORCED: RangeInclusive<i64> = 0..=60;
const SEASON_YEAR: RangeInclusive<i64> = 2000..=2030;

const PLAYER_GAMES: RangeInclusive<i64> = 0..=21;

const QB_RANGES: &[(&'static str, RangeInclusive<i64>)] = &[
    ("attempts", 0..=1000),
    ("passing_yards", -100..=10_000),
    ("touchdowns", 0..=100),
    ("interceptions", 0..=50),
];

const RB_RANGES: &[(&'static str, RangeInclusive<i64>)] = &[
    ("carries", 0..=500),
    ("rushing_yards", -100..=3000),
    ("rushing_tds", 0..=50),
];

const RECEIVER_RANGES: &[(&'static str, RangeInclusive<i64>)] = &[
    ("receptions", 0..=200),
    ("receiving_yards", -50..=3000),
    ("receiving_tds", 0..=50),
];

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn as_object(record: &Value) -> Result<&Map<String, Value>, ValidationFailure> {
    record.as_object().ok_or(ValidationFailure::NotAnObject)
}

fn require<'a>(
    record: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a Value, ValidationFailure> {
    match record.get(field) {
        None | Some(Value::Null) => Err(ValidationFailure::MissingField(field)),
        Some(v) => Ok(v),
    }
}

fn integer(field: &'static str, value: &Value) -> Result<i64, ValidationFailure> {
    value.as_i64().ok_or_else(|| ValidationFailure::NotInteger {
        field,
        value: value.clone(),
    })
}

fn integer_in(
    field: &'static str,
    value: &Value,
    range: &RangeInclusive<i64>,
) -> Result<i64, ValidationFailure> {
    let n = integer(field, value)?;
    if !range.contains(&n) {
        return Err(ValidationFailure::OutOfRange {
            field,
            value: n,
            min: *range.start(),
            max: *range.end(),
        });
    }
    Ok(n)
}

/// Range-check a field only when it is present.
fn optional_in(
    record: &Map<String, Value>,
    field: &'static str,
    range: &RangeInclusive<i64>,
) -> Result<(), ValidationFailure> {
    match record.get(field) {
        Some(v) => integer_in(field, v, range).map(|_| ()),
        None => Ok(()),
    }
}

fn check_ranges(
    record: &Map<String, Value>,
    ranges: &[(&'static str, RangeInclusive<i64>)],
) -> Result<(), ValidationFailure> {
    for (field, range) in ranges {
        optional_in(record, *field, range)?;
    }
    Ok(())
}

/// Display name for an error message: the string field if it is one.
fn label(record: &Value, field: &str) -> String {
    record
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or("Unknown")
        .to_string()
}

// ---------------------------------------------------------------------------
// Validation report
// ---------------------------------------------------------------------------

/// Counts and messages from validating a whole dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub total_teams: usize,
    pub valid_teams: usize,
    pub invalid_teams: usize,
    pub total_players: usize,
    pub valid_players: usize,
    pub invalid_players: usize,
    pub validation_errors: Vec<String>,
    /// Percentage of valid records; 0 when the dataset is empty.
    pub validation_rate: f64,
}

impl ValidationReport {
    pub fn total_records(&self) -> usize {
        self.total_teams + self.total_players
    }

    pub fn valid_records(&self) -> usize {
        self.valid_teams + self.valid_players
    }
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

/// Stateless record validator. Holds only its configuration and the span its
/// diagnostics are emitted in.
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidationConfig,
    span: Span,
}

impl Default for Validator {
    fn default() -> Self {
        Validator::new(ValidationConfig::default())
    }
}

impl Validator {
    pub fn new(config: ValidationConfig) -> Self {
        Validator {
            config,
            span: tracing::info_span!("validator"),
        }
    }

    /// Emit diagnostics inside the given span instead of the default one.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Check a raw team record, returning the first failed constraint.
    pub fn check_team(&self, record: &Value) -> Result<(), ValidationFailure> {
        let obj = as_object(record)?;

        for field in ["team", "games_played", "points_allowed", "year"] {
            require(obj, field)?;
        }

        let name = require(obj, "team")?;
        let name = name
            .as_str()
            .map(str::trim)
            .ok_or_else(|| ValidationFailure::InvalidTeamName(name.to_string()))?;
        if name.chars().count() < 2 {
            return Err(ValidationFailure::InvalidTeamName(name.to_string()));
        }
        if self.config.strict_team_names && !teams::is_known_team(name) {
            return Err(ValidationFailure::UnknownTeam(name.to_string()));
        }

        integer_in("games_played", require(obj, "games_played")?, &TEAM_GAMES)?;
        integer_in("points_allowed", require(obj, "points_allowed")?, &POINTS_ALLOWED)?;
        optional_in(obj, "total_yards_allowed", &TOTAL_YARDS_ALLOWED)?;
        optional_in(obj, "sacks", &SACKS)?;
        optional_in(obj, "turnovers_forced", &TURNOVERS_FORCED)?;
        integer_in("year", require(obj, "year")?, &SEASON_YEAR)?;

        Ok(())
    }

    /// Check a raw player record, including position-specific constraints.
    pub fn check_player(&self, record: &Value) -> Result<(), ValidationFailure> {
        let obj = as_object(record)?;

        for field in ["player_name", "team", "position", "year"] {
            require(obj, field)?;
        }

        let name = require(obj, "player_name")?;
        let name = name
            .as_str()
            .map(str::trim)
            .ok_or_else(|| ValidationFailure::InvalidPlayerName(name.to_string()))?;
        if name.chars().count() < 2 {
            return Err(ValidationFailure::InvalidPlayerName(name.to_string()));
        }
        if !name.chars().any(char::is_alphabetic) {
            return Err(ValidationFailure::NameWithoutLetters(name.to_string()));
        }

        let position = require(obj, "position")?;
        let position = position
            .as_str()
            .and_then(Position::from_code)
            .ok_or_else(|| ValidationFailure::InvalidPosition(display_value(position)))?;

        optional_in(obj, "games_played", &PLAYER_GAMES)?;

        match position {
            Position::QB => check_quarterback(obj),
            Position::RB => check_ranges(obj, RB_RANGES),
            Position::WR | Position::TE => check_ranges(obj, RECEIVER_RANGES),
            Position::K | Position::DEF => Ok(()),
        }
    }

    /// True when the team record passes every constraint.
    pub fn validate_team(&self, record: &Value) -> bool {
        match self.check_team(record) {
            Ok(()) => true,
            Err(e) => {
                let _guard = self.span.enter();
                warn!("invalid team record '{}': {}", label(record, "team"), e);
                false
            }
        }
    }

    /// True when the player record passes every constraint.
    pub fn validate_player(&self, record: &Value) -> bool {
        match self.check_player(record) {
            Ok(()) => true,
            Err(e) => {
                let _guard = self.span.enter();
                warn!("invalid player record '{}': {}", label(record, "player_name"), e);
                false
            }
        }
    }

    /// Validate every record, tallying counts and one message per failure.
    /// Failures never stop the pass.
    pub fn validate_dataset(&self, dataset: &RawDataset) -> ValidationReport {
        let _guard = self.span.enter();
        let mut report = ValidationReport {
            total_teams: dataset.team_defense.len(),
            total_players: dataset.player_count(),
            ..ValidationReport::default()
        };

        for team in &dataset.team_defense {
            match self.check_team(team) {
                Ok(()) => report.valid_teams += 1,
                Err(e) => {
                    report.invalid_teams += 1;
                    let msg = format!("Invalid team data: {} ({})", label(team, "team"), e);
                    warn!("{}", msg);
                    report.validation_errors.push(msg);
                }
            }
        }

        for (position, players) in &dataset.players {
            for player in players {
                match self.check_player(player) {
                    Ok(()) => report.valid_players += 1,
                    Err(e) => {
                        report.invalid_players += 1;
                        let msg = format!(
                            "Invalid {} data: {} ({})",
                            position,
                            label(player, "player_name"),
                            e
                        );
                        warn!("{}", msg);
                        report.validation_errors.push(msg);
                    }
                }
            }
        }

        let total = report.total_records();
        report.validation_rate = if total > 0 {
            report.valid_records() as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        debug!(
            "validated {} records, {:.1}% valid",
            total, report.validation_rate
        );
        report
    }

    /// A copy of the dataset holding only the records that pass validation.
    /// Player groups keep their position keys even when emptied.
    pub fn clean_dataset(&self, dataset: &RawDataset) -> RawDataset {
        let _guard = self.span.enter();

        let team_defense: Vec<Value> = dataset
            .team_defense
            .iter()
            .filter(|t| self.check_team(t).is_ok())
            .cloned()
            .collect();

        let players: BTreeMap<String, Vec<Value>> = dataset
            .players
            .iter()
            .map(|(position, records)| {
                let kept = records
                    .iter()
                    .filter(|p| self.check_player(p).is_ok())
                    .cloned()
                    .collect();
                (position.clone(), kept)
            })
            .collect();

        let cleaned = RawDataset {
            scrape_info: dataset.scrape_info.clone(),
            team_defense,
            players,
        };
        debug!(
            "cleaned dataset: {}/{} teams, {}/{} players kept",
            cleaned.team_defense.len(),
            dataset.team_defense.len(),
            cleaned.player_count(),
            dataset.player_count()
        );
        cleaned
    }
}

fn check_quarterback(obj: &Map<String, Value>) -> Result<(), ValidationFailure> {
    optional_in(obj, "attempts", &QB_RANGES[0].1)?;

    if let Some(v) = obj.get("completions") {
        let completions = integer("completions", v)?;
        if completions < 0 {
            return Err(ValidationFailure::BelowMinimum {
                field: "completions",
                value: completions,
                min: 0,
            });
        }
        // attempts, if present, already passed its own integer check
        let attempts = obj.get("attempts").and_then(Value::as_i64).unwrap_or(0);
        if attempts > 0 && completions > attempts {
            return Err(ValidationFailure::CompletionsExceedAttempts {
                completions,
                attempts,
            });
        }
    }

    check_ranges(obj, &QB_RANGES[1..])
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
