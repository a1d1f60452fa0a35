// Matchup providers: given a player, name the defense they faced.
//
// The adjustment stage only asks "who was the opponent?" and accepts "don't
// know" as an answer, so a live schedule feed can replace the static table
// without touching any scoring logic.

use crate::records::PlayerStatRecord;
use std::collections::BTreeMap;

/// Resolve the opponent a player's production came against.
pub trait MatchupProvider {
    /// Opponent team identifier, or `None` when it is unknown.
    fn opponent_for(&self, player: &PlayerStatRecord) -> Option<String>;
}

impl<P: MatchupProvider + ?Sized> MatchupProvider for &P {
    fn opponent_for(&self, player: &PlayerStatRecord) -> Option<String> {
        (**self).opponent_for(player)
    }
}

/// Reads the `opponent` field the collector may have attached to the record.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordOpponent;

impl MatchupProvider for RecordOpponent {
    fn opponent_for(&self, player: &PlayerStatRecord) -> Option<String> {
        player
            .opponent
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// Static team -> opponent table, keyed by canonical team abbreviation so
/// "Kansas City" and "KC" hit the same entry.
#[derive(Debug, Clone, Default)]
pub struct ScheduleTable {
    entries: BTreeMap<String, String>,
}

impl ScheduleTable {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        ScheduleTable {
            entries: entries
                .into_iter()
                .map(|(k, v)| (crate::teams::match_key(k.as_ref()), v.into()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MatchupProvider for ScheduleTable {
    fn opponent_for(&self, player: &PlayerStatRecord) -> Option<String> {
        self.entries
            .get(&crate::teams::match_key(&player.team))
            .cloned()
    }
}

/// Ask `first`, then `second` if the first has no answer.
#[derive(Debug, Clone, Default)]
pub struct Chain<A, B> {
    first: A,
    second: B,
}

impl<A, B> Chain<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Chain { first, second }
    }
}

impl<A: MatchupProvider, B: MatchupProvider> MatchupProvider for Chain<A, B> {
    fn opponent_for(&self, player: &PlayerStatRecord) -> Option<String> {
        self.first
            .opponent_for(player)
            .or_else(|| self.second.opponent_for(player))
    }
}

/// The provider used by default: the record's own opponent field, falling
/// back to the configured schedule table.
pub type DefaultMatchups = Chain<RecordOpponent, ScheduleTable>;

pub fn default_matchups(schedule: ScheduleTable) -> DefaultMatchups {
    Chain::new(RecordOpponent, schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn player(team: &str, opponent: Option<&str>) -> PlayerStatRecord {
        let mut v = json!({
            "player_name": "Test Player",
            "team": team,
            "position": "WR",
        });
        if let Some(opp) = opponent {
            v["opponent"] = json!(opp);
        }
        PlayerStatRecord::from_value(&v).unwrap()
    }

    #[test]
    fn record_opponent_ignores_blank_values() {
        assert_eq!(RecordOpponent.opponent_for(&player("KC", Some("BUF"))), Some("BUF".into()));
        assert_eq!(RecordOpponent.opponent_for(&player("KC", Some("  "))), None);
        assert_eq!(RecordOpponent.opponent_for(&player("KC", None)), None);
    }

    #[test]
    fn schedule_matches_name_or_abbreviation() {
        let table = ScheduleTable::new([("Kansas City", "BUF")]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.opponent_for(&player("KC", None)), Some("BUF".into()));
        assert_eq!(table.opponent_for(&player("DEN", None)), None);
    }

    #[test]
    fn chain_prefers_first_provider() {
        let provider = default_matchups(ScheduleTable::new([("KC", "BUF")]));
        assert_eq!(provider.opponent_for(&player("KC", Some("DEN"))), Some("DEN".into()));
        assert_eq!(provider.opponent_for(&player("KC", None)), Some("BUF".into()));
        assert_eq!(provider.opponent_for(&player("SF", None)), None);
    }
}
