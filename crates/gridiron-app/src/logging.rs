// Tracing subscriber setup. The library only emits events; the binary
// decides where they go.

use anyhow::Context;
use std::path::Path;
use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing(log_file: Option<&Path>, verbose: bool) -> anyhow::Result<()> {
    let default_filter = if verbose {
        "gridiron_core=debug,gridiron_app=debug,warn"
    } else {
        "gridiron_core=info,gridiron_app=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true);

    match log_file {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("failed to create log directory {}", dir.display()))?;
            }
            let file = std::fs::File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            let subscriber = builder.with_writer(file).with_ansi(false).finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("failed to set tracing subscriber")?;
        }
        None => {
            let subscriber = builder.with_writer(std::io::stderr).finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("failed to set tracing subscriber")?;
        }
    }

    Ok(())
}
