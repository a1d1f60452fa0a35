// NFL team directory.
//
// Scraped sources are inconsistent about whether a club appears by its
// abbreviation ("KC") or its location name ("Kansas City"), so lookups accept
// either form.

/// A single NFL club.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Team {
    pub abbreviation: &'static str,
    pub name: &'static str,
}

const fn team(abbreviation: &'static str, name: &'static str) -> Team {
    Team { abbreviation, name }
}

/// All 32 clubs.
pub const NFL_TEAMS: &[Team] = &[
    team("ARI", "Arizona"),
    team("ATL", "Atlanta"),
    team("BAL", "Baltimore"),
    team("BUF", "Buffalo"),
    team("CAR", "Carolina"),
    team("CHI", "Chicago"),
    team("CIN", "Cincinnati"),
    team("CLE", "Cleveland"),
    team("DAL", "Dallas"),
    team("DEN", "Denver"),
    team("DET", "Detroit"),
    team("GB", "Green Bay"),
    team("HOU", "Houston"),
    team("IND", "Indianapolis"),
    team("JAX", "Jacksonville"),
    team("KC", "Kansas City"),
    team("LV", "Las Vegas"),
    team("LAC", "Los Angeles Chargers"),
    team("LAR", "Los Angeles Rams"),
    team("MIA", "Miami"),
    team("MIN", "Minnesota"),
    team("NE", "New England"),
    team("NO", "New Orleans"),
    team("NYG", "New York Giants"),
    team("NYJ", "New York Jets"),
    team("PHI", "Philadelphia"),
    team("PIT", "Pittsburgh"),
    team("SF", "San Francisco"),
    team("SEA", "Seattle"),
    team("TB", "Tampa Bay"),
    team("TEN", "Tennessee"),
    team("WAS", "Washington"),
];

/// Exact match (after trimming) against an abbreviation or a full name.
pub fn is_known_team(identifier: &str) -> bool {
    let id = identifier.trim();
    NFL_TEAMS
        .iter()
        .any(|t| t.abbreviation == id || t.name == id)
}

/// Resolve a name or abbreviation to the club's abbreviation, ignoring case.
pub fn canonical_abbreviation(identifier: &str) -> Option<&'static str> {
    let id = identifier.trim();
    NFL_TEAMS
        .iter()
        .find(|t| t.abbreviation.eq_ignore_ascii_case(id) || t.name.eq_ignore_ascii_case(id))
        .map(|t| t.abbreviation)
}

/// Key used to match two team identifiers: the canonical abbreviation when
/// the club is known, otherwise the trimmed, upper-cased input.
pub fn match_key(identifier: &str) -> String {
    match canonical_abbreviation(identifier) {
        Some(abbr) => abbr.to_string(),
        None => identifier.trim().to_ascii_uppercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_has_thirty_two_unique_clubs() {
        assert_eq!(NFL_TEAMS.len(), 32);
        let mut abbrs: Vec<&str> = NFL_TEAMS.iter().map(|t| t.abbreviation).collect();
        abbrs.sort_unstable();
        abbrs.dedup();
        assert_eq!(abbrs.len(), 32);
    }

    #[test]
    fn known_team_accepts_both_forms() {
        assert!(is_known_team("KC"));
        assert!(is_known_team("Kansas City"));
        assert!(is_known_team("  GB "));
        assert!(!is_known_team("kc"));
        assert!(!is_known_team("Springfield"));
    }

    #[test]
    fn canonical_abbreviation_ignores_case() {
        assert_eq!(canonical_abbreviation("kansas city"), Some("KC"));
        assert_eq!(canonical_abbreviation("nyj"), Some("NYJ"));
        assert_eq!(canonical_abbreviation("Los Angeles Rams"), Some("LAR"));
        assert_eq!(canonical_abbreviation("Gotham"), None);
    }

    #[test]
    fn match_key_falls_back_to_uppercase() {
        assert_eq!(match_key("Green Bay"), "GB");
        assert_eq!(match_key(" gotham "), "GOTHAM");
    }
}
