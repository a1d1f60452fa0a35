// Record types exchanged with the scraping collaborator.
//
// The collector hands over loosely-typed JSON. `RawDataset` keeps each record
// as a raw `serde_json::Value` so the validator can check presence and type
// exactly as captured; the typed records below are what the ranking and
// adjustment stages consume once a record's shape is known to be sound.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Raw dataset
// ---------------------------------------------------------------------------

/// A scrape result as produced by the collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDataset {
    /// Year, timestamp and source of the scrape. Carried through untouched.
    #[serde(default = "empty_object")]
    pub scrape_info: Value,
    #[serde(default)]
    pub team_defense: Vec<Value>,
    /// Position code -> player records.
    #[serde(default)]
    pub players: BTreeMap<String, Vec<Value>>,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

impl Default for RawDataset {
    fn default() -> Self {
        RawDataset {
            scrape_info: empty_object(),
            team_defense: Vec::new(),
            players: BTreeMap::new(),
        }
    }
}

impl RawDataset {
    /// Interpret a JSON document as a dataset. Absent sections are empty.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Total player records across all positions.
    pub fn player_count(&self) -> usize {
        self.players.values().map(Vec::len).sum()
    }
}

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    QB,
    RB,
    WR,
    TE,
    K,
    DEF,
}

impl Position {
    pub const ALL: [Position; 6] = [
        Position::QB,
        Position::RB,
        Position::WR,
        Position::TE,
        Position::K,
        Position::DEF,
    ];

    /// Parse an exact (case-sensitive) position code.
    pub fn from_code(code: &str) -> Option<Position> {
        Position::ALL.into_iter().find(|p| p.code() == code)
    }

    pub fn code(&self) -> &'static str {
        match self {
            Position::QB => "QB",
            Position::RB => "RB",
            Position::WR => "WR",
            Position::TE => "TE",
            Position::K => "K",
            Position::DEF => "DEF",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ---------------------------------------------------------------------------
// Lenient columns
// ---------------------------------------------------------------------------

// Columns that feed ranking (games, points, yards, sacks, turnovers) are typed
// strictly; they are exactly what validation checks. Everything else the
// collector sends is read leniently so one odd cell cannot sink a record.

/// Integer column; any non-integer value reads as absent.
fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(Value::deserialize(deserializer)?.as_i64())
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Required text column; numbers and booleans are taken as their text.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let shown = value.to_string();
    scalar_text(value).ok_or_else(|| <D::Error as serde::de::Error>::custom(format!("expected text, got {shown}")))
}

/// Optional text column; non-scalar values read as absent.
fn lenient_opt_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

// ---------------------------------------------------------------------------
// Team defense
// ---------------------------------------------------------------------------

/// Season defensive totals for one team.
///
/// Counting fields are optional because partially scraped rows are common;
/// ranking treats an absent secondary stat as zero and skips teams without
/// games played.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamDefenseRecord {
    #[serde(deserialize_with = "lenient_text")]
    pub team: String,
    #[serde(default)]
    pub games_played: Option<i64>,
    #[serde(default)]
    pub points_allowed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_yards_allowed: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub rushing_yards_allowed: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub passing_yards_allowed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turnovers_forced: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sacks: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub year: Option<i64>,
    #[serde(default, deserialize_with = "lenient_opt_text", skip_serializing_if = "Option::is_none")]
    pub scraped_at: Option<String>,
    /// Any columns the collector added beyond the known ones.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TeamDefenseRecord {
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }
}

// ---------------------------------------------------------------------------
// Player stats
// ---------------------------------------------------------------------------

/// Season statistics for one player. Position-specific fields are flat and
/// optional; only the ones matching `position` are expected to be populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStatRecord {
    pub player_name: String,
    #[serde(deserialize_with = "lenient_text")]
    pub team: String,
    pub position: Position,
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub games_played: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub year: Option<i64>,
    /// Opponent faced, when the collector knows it.
    #[serde(default, deserialize_with = "lenient_opt_text", skip_serializing_if = "Option::is_none")]
    pub opponent: Option<String>,

    // QB
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub attempts: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub completions: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub passing_yards: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub touchdowns: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub interceptions: Option<i64>,

    // RB
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub carries: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub rushing_yards: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub rushing_tds: Option<i64>,

    // WR / TE
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub receptions: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub receiving_yards: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub receiving_tds: Option<i64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Yardage and touchdown totals credited to a player's primary role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Production {
    pub yards: i64,
    pub touchdowns: i64,
}

impl PlayerStatRecord {
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }

    /// Primary-role production: passing for QB, rushing for RB, receiving
    /// for WR/TE. Kickers and team defenses have none.
    pub fn production(&self) -> Production {
        let (yards, tds) = match self.position {
            Position::QB => (self.passing_yards, self.touchdowns),
            Position::RB => (self.rushing_yards, self.rushing_tds),
            Position::WR | Position::TE => (self.receiving_yards, self.receiving_tds),
            Position::K | Position::DEF => (None, None),
        };
        Production {
            yards: yards.unwrap_or(0),
            touchdowns: tds.unwrap_or(0),
        }
    }
}
