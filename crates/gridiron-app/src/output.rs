// Dataset loading and result persistence (JSON and CSV).

use anyhow::Context;
use gridiron_core::pipeline::{DefenseAdjustedPlayer, DefenseStrengthScore};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Read a scraped dataset as untyped JSON.
pub fn load_json(path: &Path) -> anyhow::Result<Value> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse JSON in {}", path.display()))
}

/// Pretty-print any serializable value to `path`, creating parent
/// directories as needed.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    ensure_parent(path)?;
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("failed to write JSON to {}", path.display()))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Flat CSV row for a ranked defense (the nested source record is omitted).
#[derive(Debug, Serialize)]
struct RankingRow<'a> {
    rank: usize,
    team: &'a str,
    games_played: i64,
    points_per_game: f64,
    yards_per_game: f64,
    sacks_per_game: f64,
    turnovers_per_game: f64,
    strength_score: f64,
    percentile: f64,
    tier: &'static str,
}

#[derive(Debug, Serialize)]
struct PlayerRow<'a> {
    position: &'a str,
    player_name: &'a str,
    team: &'a str,
    opponent: Option<&'a str>,
    adjustment_basis: &'static str,
    adjustment_factor: f64,
    yards: i64,
    touchdowns: i64,
    adjusted_yards: f64,
    adjusted_touchdowns: f64,
    fantasy_points: f64,
    adjusted_fantasy_points: f64,
}

pub fn write_rankings_csv(path: &Path, rankings: &[DefenseStrengthScore]) -> anyhow::Result<()> {
    ensure_parent(path)?;
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for d in rankings {
        wtr.serialize(RankingRow {
            rank: d.rank,
            team: &d.team,
            games_played: d.games_played,
            points_per_game: d.points_per_game,
            yards_per_game: d.yards_per_game,
            sacks_per_game: d.sacks_per_game,
            turnovers_per_game: d.turnovers_per_game,
            strength_score: d.strength_score,
            percentile: d.percentile,
            tier: d.tier.label(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_players_csv(
    path: &Path,
    players: &BTreeMap<String, Vec<DefenseAdjustedPlayer>>,
) -> anyhow::Result<()> {
    ensure_parent(path)?;
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for (position, group) in players {
        for p in group {
            wtr.serialize(PlayerRow {
                position,
                player_name: &p.player_name,
                team: &p.team,
                opponent: p.opponent.as_deref(),
                adjustment_basis: p.adjustment_basis.kind(),
                adjustment_factor: p.adjustment_factor,
                yards: p.yards,
                touchdowns: p.touchdowns,
                adjusted_yards: p.adjusted_yards,
                adjusted_touchdowns: p.adjusted_touchdowns,
                fantasy_points: p.fantasy_points,
                adjusted_fantasy_points: p.adjusted_fantasy_points,
            })?;
        }
    }
    wtr.flush()?;
    Ok(())
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory {}", dir.display()))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
