// Subcommand implementations.
//
// Each command loads the dataset, runs the relevant pipeline stage and writes
// its results. They return what they wrote so callers (and tests) can inspect
// it without re-reading files.

use crate::cli::{Cli, Commands, DEFAULT_CONFIG_PATH};
use crate::output;
use anyhow::Context;
use gridiron_core::config::{self, Config};
use gridiron_core::pipeline::{TransformOutcome, Transformer, ValidationReport, Validator};
use gridiron_core::records::RawDataset;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, info_span, warn};

/// Files produced by a `transform` run.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformArtifacts {
    /// The transformed result (or the raw input on passthrough).
    pub json: PathBuf,
    /// Ranking and player CSVs; absent when the pipeline passed through.
    pub rankings_csv: Option<PathBuf>,
    pub players_csv: Option<PathBuf>,
    /// Copy of the input as captured, and the report of what cleaning
    /// removed. Only written when the input was cleaned first.
    pub original: Option<PathBuf>,
    pub validation_report: Option<PathBuf>,
}

impl TransformArtifacts {
    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        std::iter::once(&self.json).chain(
            [
                &self.rankings_csv,
                &self.players_csv,
                &self.original,
                &self.validation_report,
            ]
            .into_iter()
            .flatten(),
        )
    }
}

/// Resolve configuration: an explicit path must exist, the default path may
/// be missing (stock settings are used).
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = explicit {
        let config = config::load_config_from(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?;
        info!("Config loaded from {}", path.display());
        return Ok(config);
    }

    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    if default_path.is_file() {
        let config = config::load_config_from(default_path).context("failed to load configuration")?;
        info!("Config loaded from {}", default_path.display());
        Ok(config)
    } else {
        info!("No {} found, using default settings", DEFAULT_CONFIG_PATH);
        Ok(Config::default())
    }
}

/// Dispatch a parsed command line.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Validate { input } => {
            let report = validate(&input, &config)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Clean { input, output } => {
            let path = clean(&input, output.as_deref(), &config)?;
            println!("{}", path.display());
        }
        Commands::Transform { input, output, no_clean } => {
            let artifacts = transform(&input, output.as_deref(), !no_clean, &config)?;
            for path in artifacts.paths() {
                println!("{}", path.display());
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

pub fn validate(input: &Path, config: &Config) -> anyhow::Result<ValidationReport> {
    let dataset = load_dataset(input)?;
    let report = validator(config, "validate", input).validate_dataset(&dataset);
    info!(
        "Validated {}: {}/{} records valid ({:.1}%)",
        input.display(),
        report.valid_records(),
        report.total_records(),
        report.validation_rate
    );
    Ok(report)
}

/// Write the cleaned dataset and return its path.
pub fn clean(input: &Path, output: Option<&Path>, config: &Config) -> anyhow::Result<PathBuf> {
    let dataset = load_dataset(input)?;
    let cleaned = validator(config, "clean", input).clean_dataset(&dataset);

    let path = match output {
        Some(p) => p.to_path_buf(),
        None => Path::new(&config.output.dir).join(format!("cleaned_{}.json", year_label(&cleaned.scrape_info))),
    };
    output::write_json(&path, &cleaned)?;
    info!(
        "Cleaned data written to {} ({} teams, {} players)",
        path.display(),
        cleaned.team_defense.len(),
        cleaned.player_count()
    );
    Ok(path)
}

/// Transform a dataset and write the results into `output_dir` (or the
/// configured output directory). With `clean_first`, invalid records are
/// dropped before transforming.
pub fn transform(
    input: &Path,
    output_dir: Option<&Path>,
    clean_first: bool,
    config: &Config,
) -> anyhow::Result<TransformArtifacts> {
    let dir = output_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.output.dir));
    let original = output::load_json(input)?;
    let year = original
        .get("scrape_info")
        .map(year_label)
        .unwrap_or_else(|| "unknown".to_string());

    let mut artifacts = TransformArtifacts {
        json: dir.join(format!("transformed_{year}.json")),
        rankings_csv: None,
        players_csv: None,
        original: None,
        validation_report: None,
    };

    let raw = if clean_first {
        let dataset = RawDataset::from_value(original.clone())
            .with_context(|| format!("{} is not a scraped dataset", input.display()))?;
        let checker = validator(config, "transform", input);
        let report = checker.validate_dataset(&dataset);
        let cleaned = checker.clean_dataset(&dataset);

        // raw_data in the result is the cleaned input; keep what was captured
        let original_path = dir.join(format!("original_{year}.json"));
        let report_path = dir.join(format!("validation_report_{year}.json"));
        output::write_json(&original_path, &original)?;
        output::write_json(&report_path, &report)?;
        artifacts.original = Some(original_path);
        artifacts.validation_report = Some(report_path);

        serde_json::to_value(&cleaned).context("failed to re-encode cleaned dataset")?
    } else {
        original
    };

    let outcome = Transformer::from_config(config)
        .with_span(command_span("transform", input))
        .transform(&raw);
    output::write_json(&artifacts.json, &outcome)?;

    match &outcome {
        TransformOutcome::Transformed(result) => {
            let rankings_csv = dir.join(format!("defense_rankings_{year}.csv"));
            let players_csv = dir.join(format!("adjusted_players_{year}.csv"));
            output::write_rankings_csv(&rankings_csv, result.team_defense_rankings.as_slice())?;
            output::write_players_csv(&players_csv, &result.defense_adjusted_players)?;
            info!("Transformed data written to {}", dir.display());
            artifacts.rankings_csv = Some(rankings_csv);
            artifacts.players_csv = Some(players_csv);
        }
        TransformOutcome::Passthrough(_) => {
            warn!(
                "Transformation failed; raw data written unchanged to {}",
                artifacts.json.display()
            );
        }
    }
    Ok(artifacts)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Span a command's pipeline diagnostics are emitted in.
fn command_span(command: &'static str, input: &Path) -> tracing::Span {
    info_span!("command", cmd = command, input = %input.display())
}

fn validator(config: &Config, command: &'static str, input: &Path) -> Validator {
    Validator::new(config.validation.clone()).with_span(command_span(command, input))
}

fn load_dataset(path: &Path) -> anyhow::Result<RawDataset> {
    let value = output::load_json(path)?;
    RawDataset::from_value(value)
        .with_context(|| format!("{} is not a scraped dataset", path.display()))
}

/// Season year for file names, or "unknown".
fn year_label(scrape_info: &Value) -> String {
    match scrape_info.get("year") {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => "unknown".to_string(),
    }
}
