// Transformation orchestrator: ranking, then opponent adjustment, then
// analytics, wrapped with metadata and the untouched input.
//
// Any failure inside the pipeline degrades to returning the raw input as-is,
// with the reason logged at error level. The caller can tell the two outcomes
// apart through `TransformOutcome`.

use crate::config::Config;
use crate::pipeline::adjustment::{DefenseAdjustedPlayer, DefenseAdjuster};
use crate::pipeline::analytics::{self, Analytics};
use crate::pipeline::ranking::{DefenseRanker, DefenseRankings};
use crate::provider::{default_matchups, DefaultMatchups, MatchupProvider, ScheduleTable};
use crate::records::{PlayerStatRecord, TeamDefenseRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{error, info, warn, Span};

/// Version stamped into every transformed result.
pub const TRANSFORMATION_VERSION: &str = "1.0";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("raw data is not a JSON object")]
    NotAnObject,

    #[error("raw data is missing the `{0}` section")]
    MissingSection(&'static str),

    #[error("`{section}` section must be {expected}")]
    SectionType {
        section: String,
        expected: &'static str,
    },
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    pub transformation_timestamp: String,
    /// The input's `scrape_info`, passed through.
    pub source: Value,
    pub transformation_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformedResult {
    pub metadata: Metadata,
    pub team_defense_rankings: DefenseRankings,
    pub defense_adjusted_players: BTreeMap<String, Vec<DefenseAdjustedPlayer>>,
    pub analytics: Analytics,
    pub raw_data: Value,
}

/// Result of `transform`: either the full result, or the raw input returned
/// unchanged because the pipeline failed. Serializes to whichever JSON
/// document it holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TransformOutcome {
    Transformed(Box<TransformedResult>),
    Passthrough(Value),
}

impl TransformOutcome {
    pub fn is_transformed(&self) -> bool {
        matches!(self, TransformOutcome::Transformed(_))
    }

    pub fn result(&self) -> Option<&TransformedResult> {
        match self {
            TransformOutcome::Transformed(r) => Some(r),
            TransformOutcome::Passthrough(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Input parsing
// ---------------------------------------------------------------------------

struct ParsedInput {
    scrape_info: Value,
    teams: Vec<TeamDefenseRecord>,
    players: BTreeMap<String, Vec<PlayerStatRecord>>,
    /// Records dropped because they could not be typed.
    skipped: usize,
}

fn section<'a>(obj: &'a Map<String, Value>, name: &'static str) -> Result<&'a Value, TransformError> {
    obj.get(name).ok_or(TransformError::MissingSection(name))
}

/// Type each record of a section, dropping (and logging) the ones that do
/// not fit. Returns the typed records and how many were dropped.
fn parse_records<T>(
    section: &str,
    values: &[Value],
    parse: impl Fn(&Value) -> Result<T, serde_json::Error>,
) -> (Vec<T>, usize) {
    let mut parsed = Vec::with_capacity(values.len());
    let mut skipped = 0;
    for (index, value) in values.iter().enumerate() {
        match parse(value) {
            Ok(record) => parsed.push(record),
            Err(e) => {
                warn!("skipping record {} in `{}`: {}", index, section, e);
                skipped += 1;
            }
        }
    }
    (parsed, skipped)
}

/// Check the document shape and type its records. Only a wrong shape is an
/// error; individual records that cannot be typed are skipped.
fn parse_input(raw: &Value) -> Result<ParsedInput, TransformError> {
    let obj = raw.as_object().ok_or(TransformError::NotAnObject)?;

    let team_values = section(obj, "team_defense")?
        .as_array()
        .ok_or_else(|| TransformError::SectionType {
            section: "team_defense".into(),
            expected: "a list",
        })?;
    let (teams, mut skipped) = parse_records("team_defense", team_values, TeamDefenseRecord::from_value);

    let player_groups = section(obj, "players")?
        .as_object()
        .ok_or_else(|| TransformError::SectionType {
            section: "players".into(),
            expected: "a mapping of position to list",
        })?;
    let mut players = BTreeMap::new();
    for (position, group) in player_groups {
        let name = format!("players.{position}");
        let records = group.as_array().ok_or_else(|| TransformError::SectionType {
            section: name.clone(),
            expected: "a list",
        })?;
        let (parsed, dropped) = parse_records(&name, records, PlayerStatRecord::from_value);
        skipped += dropped;
        players.insert(position.clone(), parsed);
    }

    let scrape_info = obj
        .get("scrape_info")
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()));

    Ok(ParsedInput {
        scrape_info,
        teams,
        players,
        skipped,
    })
}

// ---------------------------------------------------------------------------
// Transformer
// ---------------------------------------------------------------------------

/// Composes the ranking and adjustment stages. Holds no per-call state, so a
/// single instance can serve any number of transforms.
#[derive(Debug, Clone)]
pub struct Transformer<P> {
    ranker: DefenseRanker,
    adjuster: DefenseAdjuster<P>,
    span: Span,
}

impl Transformer<DefaultMatchups> {
    /// Build the stock pipeline from configuration: record opponents first,
    /// then the configured matchup table.
    pub fn from_config(config: &Config) -> Self {
        let matchups = default_matchups(ScheduleTable::new(&config.matchups));
        Transformer::new(
            DefenseRanker::new(config.ranking.clone()),
            DefenseAdjuster::new(config.adjustment.clone(), config.scoring.clone(), matchups),
        )
    }
}

impl<P: MatchupProvider> Transformer<P> {
    pub fn new(ranker: DefenseRanker, adjuster: DefenseAdjuster<P>) -> Self {
        Transformer {
            ranker,
            adjuster,
            span: tracing::info_span!("transformer"),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Run the pipeline, surfacing any failure as an error.
    pub fn try_transform_at(
        &self,
        raw: &Value,
        timestamp: DateTime<Utc>,
    ) -> Result<TransformedResult, TransformError> {
        let input = parse_input(raw)?;

        let rankings = self.ranker.rank(&input.teams);
        let adjusted = self.adjuster.adjust_all(&input.players, &rankings);
        let mut analytics = analytics::generate(input.teams.len(), &rankings, &adjusted);
        analytics.records_skipped = input.skipped;

        Ok(TransformedResult {
            metadata: Metadata {
                transformation_timestamp: timestamp.to_rfc3339(),
                source: input.scrape_info,
                transformation_version: TRANSFORMATION_VERSION.to_string(),
            },
            team_defense_rankings: rankings,
            defense_adjusted_players: adjusted,
            analytics,
            raw_data: raw.clone(),
        })
    }

    /// Run the pipeline stamped with `timestamp`. On failure, log the error
    /// and hand back the raw input unchanged.
    pub fn transform_at(&self, raw: &Value, timestamp: DateTime<Utc>) -> TransformOutcome {
        let _guard = self.span.enter();
        info!("starting data transformation pipeline");
        match self.try_transform_at(raw, timestamp) {
            Ok(result) => {
                info!(
                    "data transformation completed: {} defenses ranked, {} players adjusted",
                    result.analytics.teams_ranked, result.analytics.total_players
                );
                TransformOutcome::Transformed(Box::new(result))
            }
            Err(e) => {
                error!("data transformation failed, returning raw data: {}", e);
                TransformOutcome::Passthrough(raw.clone())
            }
        }
    }

    /// Run the pipeline stamped with the current time.
    pub fn transform(&self, raw: &Value) -> TransformOutcome {
        self.transform_at(raw, Utc::now())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
