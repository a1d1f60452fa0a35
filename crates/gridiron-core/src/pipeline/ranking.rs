// Defense ranking: per-game normalization, composite strength score, rank
// and percentile.
//
// Lower strength scores are stronger defenses. Points and yards allowed add
// to the score; turnovers forced and sacks subtract from it.

use crate::config::RankingWeights;
use crate::records::TeamDefenseRecord;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use tracing::{debug, Span};

// ---------------------------------------------------------------------------
// Defense tiers
// ---------------------------------------------------------------------------

/// Coarse grouping of a ranked defense by percentile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefenseTier {
    /// 80th percentile and up.
    Elite,
    /// 60th to 80th.
    Strong,
    /// 40th to 60th.
    Average,
    /// 20th to 40th.
    Weak,
    /// Below the 20th percentile.
    Poor,
}

impl DefenseTier {
    pub fn from_percentile(percentile: f64) -> Self {
        if percentile >= 80.0 {
            DefenseTier::Elite
        } else if percentile >= 60.0 {
            DefenseTier::Strong
        } else if percentile >= 40.0 {
            DefenseTier::Average
        } else if percentile >= 20.0 {
            DefenseTier::Weak
        } else {
            DefenseTier::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DefenseTier::Elite => "elite",
            DefenseTier::Strong => "strong",
            DefenseTier::Average => "average",
            DefenseTier::Weak => "weak",
            DefenseTier::Poor => "poor",
        }
    }
}

// ---------------------------------------------------------------------------
// Ranked defense
// ---------------------------------------------------------------------------

/// A team defense after normalization and ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefenseStrengthScore {
    pub team: String,
    pub games_played: i64,
    pub points_per_game: f64,
    pub yards_per_game: f64,
    pub sacks_per_game: f64,
    pub turnovers_per_game: f64,
    pub strength_score: f64,
    /// 1-based, ascending strength score.
    pub rank: usize,
    /// 100 for the best defense, 100/N for the worst.
    pub percentile: f64,
    pub tier: DefenseTier,
    /// The record this score was derived from.
    pub raw_data: TeamDefenseRecord,
}

/// Ranking output. `NoInput` (nothing to rank at all) serializes as an empty
/// JSON object; `Ranked` serializes as the ordered list, which may be empty if
/// every team was skipped.
#[derive(Debug, Clone, PartialEq)]
pub enum DefenseRankings {
    NoInput,
    Ranked(Vec<DefenseStrengthScore>),
}

impl DefenseRankings {
    pub fn as_slice(&self) -> &[DefenseStrengthScore] {
        match self {
            DefenseRankings::NoInput => &[],
            DefenseRankings::Ranked(scores) => scores,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl Serialize for DefenseRankings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DefenseRankings::NoInput => serializer.serialize_map(Some(0))?.end(),
            DefenseRankings::Ranked(scores) => scores.serialize(serializer),
        }
    }
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Per-game rates for one team.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerGameRates {
    pub points: f64,
    pub yards: f64,
    pub sacks: f64,
    pub turnovers: f64,
}

/// Normalize season totals by games played. `None` when games played is
/// absent or not positive; such teams cannot be ranked.
pub fn per_game_rates(record: &TeamDefenseRecord) -> Option<PerGameRates> {
    let games = record.games_played.filter(|g| *g > 0)? as f64;
    let per_game = |total: Option<i64>| total.unwrap_or(0) as f64 / games;
    Some(PerGameRates {
        points: per_game(record.points_allowed),
        yards: per_game(record.total_yards_allowed),
        sacks: per_game(record.sacks),
        turnovers: per_game(record.turnovers_forced),
    })
}

/// Composite strength score from per-game rates (lower is stronger).
pub fn strength_score(rates: &PerGameRates, weights: &RankingWeights) -> f64 {
    rates.points * weights.points + (rates.yards / weights.yards_scale) * weights.yards
        - rates.turnovers * weights.turnover_multiplier * weights.turnovers
        - rates.sacks * weights.sack_multiplier * weights.sacks
}

/// `(N - rank + 1) / N * 100`
pub fn percentile_for_rank(rank: usize, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    (count - rank + 1) as f64 / count as f64 * 100.0
}

// ---------------------------------------------------------------------------
// Ranker
// ---------------------------------------------------------------------------

/// Stateless defense ranker.
#[derive(Debug, Clone)]
pub struct DefenseRanker {
    weights: RankingWeights,
    span: Span,
}

impl Default for DefenseRanker {
    fn default() -> Self {
        DefenseRanker::new(RankingWeights::default())
    }
}

impl DefenseRanker {
    pub fn new(weights: RankingWeights) -> Self {
        DefenseRanker {
            weights,
            span: tracing::info_span!("defense_ranker"),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Score, sort and rank the given defenses. Teams without games played
    /// are skipped. Ties keep their input order.
    pub fn rank(&self, records: &[TeamDefenseRecord]) -> DefenseRankings {
        let _guard = self.span.enter();
        if records.is_empty() {
            return DefenseRankings::NoInput;
        }

        let mut scored: Vec<(PerGameRates, f64, &TeamDefenseRecord)> = Vec::with_capacity(records.len());
        for record in records {
            let Some(rates) = per_game_rates(record) else {
                debug!("skipping '{}': no games played", record.team);
                continue;
            };
            let score = strength_score(&rates, &self.weights);
            scored.push((rates, score, record));
        }

        // stable: equal scores keep input order
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        let count = scored.len();
        let ranked: Vec<DefenseStrengthScore> = scored
            .into_iter()
            .enumerate()
            .map(|(i, (rates, score, record))| {
                let rank = i + 1;
                let percentile = percentile_for_rank(rank, count);
                DefenseStrengthScore {
                    team: record.team.clone(),
                    games_played: record.games_played.unwrap_or(0),
                    points_per_game: rates.points,
                    yards_per_game: rates.yards,
                    sacks_per_game: rates.sacks,
                    turnovers_per_game: rates.turnovers,
                    strength_score: score,
                    rank,
                    percentile,
                    tier: DefenseTier::from_percentile(percentile),
                    raw_data: record.clone(),
                }
            })
            .collect();

        debug!(
            "ranked {} of {} defenses",
            ranked.len(),
            records.len()
        );
        DefenseRankings::Ranked(ranked)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    fn team(name: &str, games: i64, points: i64, yards: Option<i64>, sacks: Option<i64>, turnovers: Option<i64>) -> TeamDefenseRecord {
        let mut v = json!({"team": name, "games_played": games, "points_allowed": points, "year": 2024});
        if let Some(y) = yards {
            v["total_yards_allowed"] = json!(y);
        }
        if let Some(s) = sacks {
            v["sacks"] = json!(s);
        }
        if let Some(t) = turnovers {
            v["turnovers_forced"] = json!(t);
        }
        TeamDefenseRecord::from_value(&v).unwrap()
    }

    #[test]
    fn kansas_city_scenario() {
        let kc = team("KC", 17, 300, Some(5200), Some(45), Some(22));
        let rates = per_game_rates(&kc).unwrap();
        assert!(approx_eq(rates.points, 300.0 / 17.0, 1e-12));
        assert!(approx_eq(rates.yards, 5200.0 / 17.0, 1e-12));

        let score = strength_score(&rates, &RankingWeights::default());
        let expected = (300.0 / 17.0) * 0.4 + (5200.0 / 17.0 / 100.0) * 0.3
            - (22.0 / 17.0) * 5.0 * 0.2
            - (45.0 / 17.0) * 2.0 * 0.1;
        assert!(approx_eq(score, expected, 1e-12));
        assert!(approx_eq(score, 6.1529, 1e-3));
    }

    #[test]
    fn absent_secondary_stats_count_as_zero() {
        let rec = team("DEN", 10, 200, None, None, None);
        let rates = per_game_rates(&rec).unwrap();
        assert_eq!(rates.yards, 0.0);
        assert_eq!(rates.sacks, 0.0);
        assert!(approx_eq(strength_score(&rates, &RankingWeights::default()), 8.0, 1e-12));
    }

    #[test]
    fn teams_without_games_are_skipped() {
        let mut no_games = team("NYJ", 1, 20, None, None, None);
        no_games.games_played = Some(0);
        let mut absent = team("NYG", 1, 20, None, None, None);
        absent.games_played = None;
        let ok = team("PHI", 17, 250, Some(4800), Some(40), Some(25));

        let rankings = DefenseRanker::default().rank(&[no_games, absent, ok]);
        assert_eq!(rankings.len(), 1);
        assert_eq!(rankings.as_slice()[0].team, "PHI");
        assert_eq!(rankings.as_slice()[0].rank, 1);
        assert_eq!(rankings.as_slice()[0].percentile, 100.0);
    }

    #[test]
    fn empty_input_is_no_input() {
        let rankings = DefenseRanker::default().rank(&[]);
        assert_eq!(rankings, DefenseRankings::NoInput);
        assert_eq!(serde_json::to_value(&rankings).unwrap(), json!({}));
    }

    #[test]
    fn all_skipped_serializes_as_empty_list() {
        let mut rec = team("NYJ", 1, 20, None, None, None);
        rec.games_played = Some(0);
        let rankings = DefenseRanker::default().rank(&[rec]);
        assert_eq!(serde_json::to_value(&rankings).unwrap(), json!([]));
    }

    #[test]
    fn ranks_ascending_with_percentiles() {
        let records = vec![
            team("BAD", 17, 500, Some(6500), Some(20), Some(10)),
            team("GOOD", 17, 250, Some(4500), Some(55), Some(30)),
            team("MID", 17, 380, Some(5600), Some(38), Some(20)),
            team("WORST", 17, 520, Some(6800), Some(15), Some(8)),
        ];
        let rankings = DefenseRanker::default().rank(&records);
        let order: Vec<&str> = rankings.as_slice().iter().map(|d| d.team.as_str()).collect();
        assert_eq!(order, vec!["GOOD", "MID", "BAD", "WORST"]);

        let ranks: Vec<usize> = rankings.as_slice().iter().map(|d| d.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);

        let pcts: Vec<f64> = rankings.as_slice().iter().map(|d| d.percentile).collect();
        assert_eq!(pcts, vec![100.0, 75.0, 50.0, 25.0]);

        for pair in rankings.as_slice().windows(2) {
            assert!(pair[0].strength_score <= pair[1].strength_score);
        }
    }

    #[test]
    fn ties_keep_input_order() {
        let records = vec![
            team("FIRST", 16, 320, Some(5000), Some(40), Some(20)),
            team("SECOND", 16, 320, Some(5000), Some(40), Some(20)),
            team("THIRD", 16, 320, Some(5000), Some(40), Some(20)),
        ];
        let rankings = DefenseRanker::default().rank(&records);
        let order: Vec<&str> = rankings.as_slice().iter().map(|d| d.team.as_str()).collect();
        assert_eq!(order, vec!["FIRST", "SECOND", "THIRD"]);
    }

    #[test]
    fn ranked_score_retains_source_record() {
        let kc = team("KC", 17, 300, Some(5200), Some(45), Some(22));
        let rankings = DefenseRanker::default().rank(std::slice::from_ref(&kc));
        assert_eq!(rankings.as_slice()[0].raw_data, kc);
    }

    #[test]
    fn percentile_endpoints() {
        assert_eq!(percentile_for_rank(1, 32), 100.0);
        assert!(approx_eq(percentile_for_rank(32, 32), 100.0 / 32.0, 1e-12));
        assert_eq!(percentile_for_rank(1, 1), 100.0);
        assert_eq!(percentile_for_rank(1, 0), 0.0);
    }

    #[test]
    fn tiers_follow_percentile_bands() {
        assert_eq!(DefenseTier::from_percentile(100.0), DefenseTier::Elite);
        assert_eq!(DefenseTier::from_percentile(80.0), DefenseTier::Elite);
        assert_eq!(DefenseTier::from_percentile(79.9), DefenseTier::Strong);
        assert_eq!(DefenseTier::from_percentile(50.0), DefenseTier::Average);
        assert_eq!(DefenseTier::from_percentile(25.0), DefenseTier::Weak);
        assert_eq!(DefenseTier::from_percentile(3.125), DefenseTier::Poor);
        assert_eq!(DefenseTier::Strong.label(), "strong");
    }

    #[test]
    fn custom_weights_change_score() {
        let rec = team("KC", 10, 200, Some(3000), Some(20), Some(10));
        let rates = per_game_rates(&rec).unwrap();
        let points_only = RankingWeights {
            points: 1.0,
            yards: 0.0,
            turnovers: 0.0,
            sacks: 0.0,
            ..RankingWeights::default()
        };
        assert!(approx_eq(strength_score(&rates, &points_only), 20.0, 1e-12));
    }
}
