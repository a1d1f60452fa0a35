// Opponent-strength adjustment of player production.
//
// Production against a strong defense (high percentile) is credited and
// production against a weak one is discounted:
//
//   factor = 1 + (opponent_percentile - neutral_percentile) / percentile_scale
//
// With the stock settings the best of 32 defenses yields 1.5 and the worst
// about 0.53. When the opponent is unknown or unranked the factor is a neutral
// 1.0 and the player's `adjustment_basis` records why.

use crate::config::{AdjustmentConfig, ScoringWeights};
use crate::pipeline::ranking::{DefenseRankings, DefenseStrengthScore};
use crate::provider::MatchupProvider;
use crate::records::{PlayerStatRecord, Position};
use crate::teams;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, Span};

/// Factor applied when no opponent strength is available.
pub const NEUTRAL_FACTOR: f64 = 1.0;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Where a player's adjustment factor came from. Every variant other than
/// `Opponent` means the neutral fallback was used.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AdjustmentBasis {
    /// The opponent was found among the ranked defenses.
    Opponent {
        opponent: String,
        rank: usize,
        percentile: f64,
    },
    /// No opponent is known; a league-average defense is neutral.
    LeagueAverage,
    /// The opponent is known but was not ranked (skipped or absent).
    UnrankedOpponent { opponent: String },
    /// No defenses were ranked at all.
    NoRankings,
}

impl AdjustmentBasis {
    pub fn is_fallback(&self) -> bool {
        !matches!(self, AdjustmentBasis::Opponent { .. })
    }

    /// Same string as the serialized `kind` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            AdjustmentBasis::Opponent { .. } => "opponent",
            AdjustmentBasis::LeagueAverage => "league_average",
            AdjustmentBasis::UnrankedOpponent { .. } => "unranked_opponent",
            AdjustmentBasis::NoRankings => "no_rankings",
        }
    }
}

/// A player's production before and after opponent adjustment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefenseAdjustedPlayer {
    pub player_name: String,
    pub team: String,
    pub position: Position,
    pub opponent: Option<String>,
    pub adjustment_basis: AdjustmentBasis,
    pub adjustment_factor: f64,
    pub yards: i64,
    pub touchdowns: i64,
    pub adjusted_yards: f64,
    pub adjusted_touchdowns: f64,
    pub fantasy_points: f64,
    pub adjusted_fantasy_points: f64,
}

// ---------------------------------------------------------------------------
// Fantasy scoring
// ---------------------------------------------------------------------------

/// Fantasy points split into the part that scales with opponent strength
/// (yardage, touchdowns, receptions) and the part that does not
/// (interceptions).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FantasyPoints {
    pub production: f64,
    pub penalties: f64,
}

impl FantasyPoints {
    pub fn total(&self) -> f64 {
        self.production + self.penalties
    }

    pub fn adjusted(&self, factor: f64) -> f64 {
        self.production * factor + self.penalties
    }
}

pub fn fantasy_points(player: &PlayerStatRecord, weights: &ScoringWeights) -> FantasyPoints {
    let v = |stat: Option<i64>| stat.unwrap_or(0) as f64;
    let production = v(player.passing_yards) * weights.passing_yard
        + v(player.touchdowns) * weights.passing_td
        + v(player.rushing_yards) * weights.rushing_yard
        + v(player.rushing_tds) * weights.rushing_td
        + v(player.receiving_yards) * weights.receiving_yard
        + v(player.receiving_tds) * weights.receiving_td
        + v(player.receptions) * weights.reception;
    FantasyPoints {
        production,
        penalties: v(player.interceptions) * weights.interception,
    }
}

// ---------------------------------------------------------------------------
// Adjuster
// ---------------------------------------------------------------------------

/// Stateless adjuster, generic over where opponents come from.
#[derive(Debug, Clone)]
pub struct DefenseAdjuster<P> {
    config: AdjustmentConfig,
    scoring: ScoringWeights,
    matchups: P,
    span: Span,
}

impl<P: MatchupProvider> DefenseAdjuster<P> {
    pub fn new(config: AdjustmentConfig, scoring: ScoringWeights, matchups: P) -> Self {
        DefenseAdjuster {
            config,
            scoring,
            matchups,
            span: tracing::info_span!("defense_adjuster"),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn factor_for_percentile(&self, percentile: f64) -> f64 {
        1.0 + (percentile - self.config.neutral_percentile) / self.config.percentile_scale
    }

    /// Resolve the opponent and the factor to apply for one player.
    fn basis_for(
        &self,
        player: &PlayerStatRecord,
        rankings: &[DefenseStrengthScore],
    ) -> (Option<String>, AdjustmentBasis, f64) {
        let opponent = self.matchups.opponent_for(player);

        if rankings.is_empty() {
            debug!("'{}': no ranked defenses, using neutral factor", player.player_name);
            return (opponent, AdjustmentBasis::NoRankings, NEUTRAL_FACTOR);
        }

        let Some(opp) = opponent else {
            debug!("'{}': opponent unknown, using league average", player.player_name);
            return (None, AdjustmentBasis::LeagueAverage, NEUTRAL_FACTOR);
        };

        let key = teams::match_key(&opp);
        match rankings.iter().find(|d| teams::match_key(&d.team) == key) {
            Some(defense) => {
                let factor = self.factor_for_percentile(defense.percentile);
                let basis = AdjustmentBasis::Opponent {
                    opponent: defense.team.clone(),
                    rank: defense.rank,
                    percentile: defense.percentile,
                };
                (Some(opp), basis, factor)
            }
            None => {
                debug!(
                    "'{}': opponent '{}' not ranked, using neutral factor",
                    player.player_name, opp
                );
                (
                    Some(opp.clone()),
                    AdjustmentBasis::UnrankedOpponent { opponent: opp },
                    NEUTRAL_FACTOR,
                )
            }
        }
    }

    /// Adjust a single player's production against the ranked defenses.
    pub fn adjust_player(
        &self,
        player: &PlayerStatRecord,
        rankings: &[DefenseStrengthScore],
    ) -> DefenseAdjustedPlayer {
        let _guard = self.span.enter();
        let (opponent, adjustment_basis, factor) = self.basis_for(player, rankings);
        let production = player.production();
        let points = fantasy_points(player, &self.scoring);

        DefenseAdjustedPlayer {
            player_name: player.player_name.clone(),
            team: player.team.clone(),
            position: player.position,
            opponent,
            adjustment_basis,
            adjustment_factor: factor,
            yards: production.yards,
            touchdowns: production.touchdowns,
            adjusted_yards: production.yards as f64 * factor,
            adjusted_touchdowns: production.touchdowns as f64 * factor,
            fantasy_points: points.total(),
            adjusted_fantasy_points: points.adjusted(factor),
        }
    }

    /// Adjust every player, keeping the input's position grouping.
    pub fn adjust_all(
        &self,
        players: &BTreeMap<String, Vec<PlayerStatRecord>>,
        rankings: &DefenseRankings,
    ) -> BTreeMap<String, Vec<DefenseAdjustedPlayer>> {
        let ranked = rankings.as_slice();
        let adjusted: BTreeMap<String, Vec<DefenseAdjustedPlayer>> = players
            .iter()
            .map(|(position, group)| {
                let group = group
                    .iter()
                    .map(|p| self.adjust_player(p, ranked))
                    .collect();
                (position.clone(), group)
            })
            .collect();

        let fallbacks = adjusted
            .values()
            .flatten()
            .filter(|p| p.adjustment_basis.is_fallback())
            .count();
        if fallbacks > 0 {
            let _guard = self.span.enter();
            info!("{} players adjusted with the neutral factor", fallbacks);
        }
        adjusted
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ranking::DefenseRanker;
    use crate::provider::{RecordOpponent, ScheduleTable};
    use crate::records::TeamDefenseRecord;
    use serde_json::json;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    fn adjuster() -> DefenseAdjuster<RecordOpponent> {
        DefenseAdjuster::new(AdjustmentConfig::default(), ScoringWeights::default(), RecordOpponent)
    }

    fn defense(team: &str, points: i64) -> TeamDefenseRecord {
        TeamDefenseRecord::from_value(&json!({
            "team": team, "games_played": 17, "points_allowed": points, "year": 2024
        }))
        .unwrap()
    }

    /// Four defenses: BAL best (100th), then PIT (75th), CLE (50th), CIN (25th).
    fn rankings() -> DefenseRankings {
        DefenseRanker::default().rank(&[
            defense("CIN", 480),
            defense("BAL", 280),
            defense("CLE", 400),
            defense("PIT", 320),
        ])
    }

    fn wr(opponent: Option<&str>) -> PlayerStatRecord {
        let mut v = json!({
            "player_name": "Ja'Marr Chase", "team": "CIN", "position": "WR", "year": 2024,
            "receptions": 127, "receiving_yards": 1708, "receiving_tds": 17
        });
        if let Some(o) = opponent {
            v["opponent"] = json!(o);
        }
        PlayerStatRecord::from_value(&v).unwrap()
    }

    #[test]
    fn factor_formula() {
        let a = adjuster();
        assert!(approx_eq(a.factor_for_percentile(50.0), 1.0, 1e-12));
        assert!(approx_eq(a.factor_for_percentile(100.0), 1.5, 1e-12));
        assert!(approx_eq(a.factor_for_percentile(25.0), 0.75, 1e-12));
    }

    #[test]
    fn strong_opponent_credits_production() {
        let r = rankings();
        let adj = adjuster().adjust_player(&wr(Some("BAL")), r.as_slice());
        assert_eq!(
            adj.adjustment_basis,
            AdjustmentBasis::Opponent { opponent: "BAL".into(), rank: 1, percentile: 100.0 }
        );
        assert!(approx_eq(adj.adjustment_factor, 1.5, 1e-12));
        assert_eq!(adj.yards, 1708);
        assert_eq!(adj.touchdowns, 17);
        assert!(approx_eq(adj.adjusted_yards, 2562.0, 1e-9));
        assert!(approx_eq(adj.adjusted_touchdowns, 25.5, 1e-9));
    }

    #[test]
    fn weak_opponent_discounts_production() {
        let r = rankings();
        let adj = adjuster().adjust_player(&wr(Some("Cincinnati")), r.as_slice());
        assert!(approx_eq(adj.adjustment_factor, 0.75, 1e-12));
        assert!(adj.adjusted_yards < adj.yards as f64);
        assert!(!adj.adjustment_basis.is_fallback());
    }

    #[test]
    fn unknown_opponent_uses_league_average() {
        let r = rankings();
        let adj = adjuster().adjust_player(&wr(None), r.as_slice());
        assert_eq!(adj.adjustment_basis, AdjustmentBasis::LeagueAverage);
        assert_eq!(adj.adjustment_factor, NEUTRAL_FACTOR);
        assert_eq!(adj.adjusted_yards, 1708.0);
    }

    #[test]
    fn unranked_opponent_is_neutral() {
        let r = rankings();
        let adj = adjuster().adjust_player(&wr(Some("SEA")), r.as_slice());
        assert_eq!(
            adj.adjustment_basis,
            AdjustmentBasis::UnrankedOpponent { opponent: "SEA".into() }
        );
        assert_eq!(adj.adjustment_factor, NEUTRAL_FACTOR);
    }

    #[test]
    fn no_rankings_is_neutral() {
        let adj = adjuster().adjust_player(&wr(Some("BAL")), &[]);
        assert_eq!(adj.adjustment_basis, AdjustmentBasis::NoRankings);
        assert_eq!(adj.opponent.as_deref(), Some("BAL"));
        assert_eq!(adj.adjustment_factor, NEUTRAL_FACTOR);
    }

    #[test]
    fn schedule_provider_supplies_opponent() {
        let a = DefenseAdjuster::new(
            AdjustmentConfig::default(),
            ScoringWeights::default(),
            ScheduleTable::new([("CIN", "PIT")]),
        );
        let r = rankings();
        let adj = a.adjust_player(&wr(None), r.as_slice());
        assert_eq!(adj.opponent.as_deref(), Some("PIT"));
        assert!(approx_eq(adj.adjustment_factor, 1.25, 1e-12));
    }

    #[test]
    fn fantasy_points_scale_production_not_interceptions() {
        let qb = PlayerStatRecord::from_value(&json!({
            "player_name": "Joe Burrow", "team": "CIN", "position": "QB", "year": 2024,
            "passing_yards": 4000, "touchdowns": 30, "interceptions": 10, "opponent": "BAL"
        }))
        .unwrap();
        let points = fantasy_points(&qb, &ScoringWeights::default());
        assert!(approx_eq(points.production, 160.0 + 120.0, 1e-9));
        assert!(approx_eq(points.penalties, -20.0, 1e-9));

        let r = rankings();
        let adj = adjuster().adjust_player(&qb, r.as_slice());
        assert!(approx_eq(adj.fantasy_points, 260.0, 1e-9));
        assert!(approx_eq(adj.adjusted_fantasy_points, 280.0 * 1.5 - 20.0, 1e-9));
    }

    #[test]
    fn adjust_all_keeps_grouping() {
        let mut players = BTreeMap::new();
        players.insert("WR".to_string(), vec![wr(Some("BAL")), wr(None)]);
        players.insert("K".to_string(), vec![]);

        let out = adjuster().adjust_all(&players, &rankings());
        assert_eq!(out.len(), 2);
        assert_eq!(out["WR"].len(), 2);
        assert!(out["K"].is_empty());
        assert!(!out["WR"][0].adjustment_basis.is_fallback());
        assert!(out["WR"][1].adjustment_basis.is_fallback());
    }

    #[test]
    fn basis_serializes_with_kind_tag() {
        let v = serde_json::to_value(AdjustmentBasis::LeagueAverage).unwrap();
        assert_eq!(v, json!({"kind": "league_average"}));
        let v = serde_json::to_value(AdjustmentBasis::UnrankedOpponent { opponent: "SEA".into() }).unwrap();
        assert_eq!(v, json!({"kind": "unranked_opponent", "opponent": "SEA"}));
    }
}
