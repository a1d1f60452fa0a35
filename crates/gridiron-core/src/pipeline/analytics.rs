// Summary statistics over ranked defenses and adjusted players.

use crate::pipeline::adjustment::DefenseAdjustedPlayer;
use crate::pipeline::ranking::DefenseRankings;
use serde::Serialize;
use std::collections::BTreeMap;

/// How many defenses to list at each end of the ranking.
const EXTREMES: usize = 5;

// ---------------------------------------------------------------------------
// Summary stats
// ---------------------------------------------------------------------------

/// Mean, extremes and standard deviation of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStats {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation (N denominator).
    pub stdev: f64,
}

/// Summarize a slice of values. `None` for an empty slice.
pub fn summarize(values: &[f64]) -> Option<SummaryStats> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(SummaryStats {
        count: values.len(),
        mean,
        min,
        max,
        stdev: variance.sqrt(),
    })
}

// ---------------------------------------------------------------------------
// Analytics block
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analytics {
    /// Team records received.
    pub teams_received: usize,
    /// Teams that made it into the ranking.
    pub teams_ranked: usize,
    /// Teams skipped for having no games played.
    pub teams_skipped: usize,
    pub strength_score: Option<SummaryStats>,
    /// Strongest defenses, best first.
    pub top_defenses: Vec<String>,
    /// Weakest defenses, worst first.
    pub bottom_defenses: Vec<String>,
    pub players_by_position: BTreeMap<String, usize>,
    pub total_players: usize,
    pub adjustment_factor: Option<SummaryStats>,
    /// Players adjusted with the neutral factor for lack of opponent data.
    pub neutral_adjustments: usize,
    /// Input records left out because they could not be read as team or
    /// player records. Filled in by the transformer.
    pub records_skipped: usize,
}

/// Build the analytics block. `teams_received` is the size of the ranking
/// input, needed to count skipped teams.
pub fn generate(
    teams_received: usize,
    rankings: &DefenseRankings,
    players: &BTreeMap<String, Vec<DefenseAdjustedPlayer>>,
) -> Analytics {
    let ranked = rankings.as_slice();
    let scores: Vec<f64> = ranked.iter().map(|d| d.strength_score).collect();

    let top_defenses = ranked
        .iter()
        .take(EXTREMES)
        .map(|d| d.team.clone())
        .collect();
    let bottom_defenses = ranked
        .iter()
        .rev()
        .take(EXTREMES)
        .map(|d| d.team.clone())
        .collect();

    let players_by_position: BTreeMap<String, usize> = players
        .iter()
        .map(|(pos, group)| (pos.clone(), group.len()))
        .collect();
    let total_players = players_by_position.values().sum();

    let factors: Vec<f64> = players
        .values()
        .flatten()
        .map(|p| p.adjustment_factor)
        .collect();
    let neutral_adjustments = players
        .values()
        .flatten()
        .filter(|p| p.adjustment_basis.is_fallback())
        .count();

    Analytics {
        teams_received,
        teams_ranked: ranked.len(),
        teams_skipped: teams_received.saturating_sub(ranked.len()),
        strength_score: summarize(&scores),
        top_defenses,
        bottom_defenses,
        players_by_position,
        total_players,
        adjustment_factor: summarize(&factors),
        neutral_adjustments,
        records_skipped: 0,
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ranking::DefenseRanker;
    use crate::records::TeamDefenseRecord;
    use serde_json::json;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn summary_known_values() {
        // mean 5, population variance 4
        let stats = summarize(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(stats.count, 8);
        assert!(approx_eq(stats.mean, 5.0, 1e-10));
        assert!(approx_eq(stats.stdev, 2.0, 1e-10));
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
    }

    #[test]
    fn summary_single_and_empty() {
        let stats = summarize(&[-3.5]).unwrap();
        assert_eq!(stats.min, -3.5);
        assert_eq!(stats.max, -3.5);
        assert_eq!(stats.stdev, 0.0);
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn analytics_over_rankings() {
        let records: Vec<TeamDefenseRecord> = (0..7)
            .map(|i| {
                TeamDefenseRecord::from_value(&json!({
                    "team": format!("T{i}"),
                    "games_played": if i == 6 { 0 } else { 17 },
                    "points_allowed": 250 + i * 30,
                    "year": 2024
                }))
                .unwrap()
            })
            .collect();
        let rankings = DefenseRanker::default().rank(&records);
        let analytics = generate(records.len(), &rankings, &BTreeMap::new());

        assert_eq!(analytics.teams_received, 7);
        assert_eq!(analytics.teams_ranked, 6);
        assert_eq!(analytics.teams_skipped, 1);
        assert_eq!(analytics.top_defenses, vec!["T0", "T1", "T2", "T3", "T4"]);
        assert_eq!(analytics.bottom_defenses, vec!["T5", "T4", "T3", "T2", "T1"]);
        let s = analytics.strength_score.unwrap();
        assert_eq!(s.count, 6);
        assert!(s.min < s.max);
        assert_eq!(analytics.total_players, 0);
        assert!(analytics.adjustment_factor.is_none());
    }

    #[test]
    fn analytics_without_teams() {
        let analytics = generate(0, &DefenseRankings::NoInput, &BTreeMap::new());
        assert_eq!(analytics.teams_ranked, 0);
        assert!(analytics.strength_score.is_none());
        assert!(analytics.top_defenses.is_empty());
    }
}
