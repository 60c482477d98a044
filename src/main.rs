//! Collision Dashboard - command line entry point
//!
//! Loads the collision CSV, applies the filter parameters and emits the
//! dashboard as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use collision_dashboard::config::{ConfigOverrides, DashboardConfig};
use collision_dashboard::{data, DashboardBuilder, DashboardExporter};
use log::info;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "collision_dashboard",
    about = "Motor vehicle collision dashboard data"
)]
struct Cli {
    /// TOML config file; command line flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Collision CSV file
    #[arg(long)]
    source: Option<PathBuf>,
    /// Maximum number of rows to read from the source
    #[arg(long)]
    max_rows: Option<usize>,
    /// Minimum number of injured persons shown on the injury map (0-19)
    #[arg(long)]
    injured: Option<u8>,
    /// Hour of day to break down (0-23)
    #[arg(long)]
    hour: Option<u8>,
    /// Affected people for the street ranking: pedestrian, cyclist or motorist
    #[arg(long)]
    category: Option<String>,
    /// Include the raw records of the selected hour
    #[arg(long)]
    raw: bool,
    /// Write the dashboard to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            source: self.source.clone(),
            max_rows: self.max_rows,
            injured_threshold: self.injured,
            hour: self.hour,
            category: self.category.clone(),
            show_raw_data: self.raw,
        }
    }

    fn resolve_config(&self) -> Result<DashboardConfig> {
        let config = DashboardConfig::resolve(self.config.as_deref(), &self.overrides())?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    let dataset = data::load(&config.source, config.max_rows)
        .with_context(|| format!("loading {}", config.source.display()))?;
    info!(
        "{} collisions with coordinates in {}",
        dataset.len(),
        dataset.source().display()
    );

    let dashboard = DashboardBuilder::new(&dataset, &config).build(&config.params);

    match &cli.output {
        Some(path) => DashboardExporter::export_json(&dashboard, path, cli.pretty)
            .with_context(|| format!("writing {}", path.display()))?,
        None => {
            let stdout = io::stdout();
            DashboardExporter::write_json(&dashboard, stdout.lock(), cli.pretty)
                .context("writing dashboard to stdout")?;
            println!();
        }
    }

    Ok(())
}
