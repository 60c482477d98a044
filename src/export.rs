//! Dashboard Export Module
//! Writes dashboard snapshots as JSON for an external renderer.

use crate::charts::Dashboard;
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write dashboard: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize dashboard: {0}")]
    Json(#[from] serde_json::Error),
}

/// JSON exporter for assembled dashboards.
pub struct DashboardExporter;

impl DashboardExporter {
    /// Serialize `dashboard` into any writer.
    pub fn write_json<W: Write>(
        dashboard: &Dashboard,
        writer: W,
        pretty: bool,
    ) -> Result<(), ExportError> {
        if pretty {
            serde_json::to_writer_pretty(writer, dashboard)?;
        } else {
            serde_json::to_writer(writer, dashboard)?;
        }
        Ok(())
    }

    /// Write `dashboard` to `output_path`, replacing any existing file.
    pub fn export_json(
        dashboard: &Dashboard,
        output_path: &Path,
        pretty: bool,
    ) -> Result<(), ExportError> {
        let mut writer = BufWriter::new(File::create(output_path)?);
        Self::write_json(dashboard, &mut writer, pretty)?;
        writer.flush()?;

        info!(
            "Exported {} sections to {}",
            dashboard.sections.len(),
            output_path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::DashboardBuilder;
    use crate::config::{DashboardConfig, DashboardParams};
    use crate::data::Dataset;

    #[test]
    fn writes_parseable_json() {
        let dataset = Dataset::default();
        let config = DashboardConfig::new("unused.csv");
        let dashboard = DashboardBuilder::new(&dataset, &config).build(&DashboardParams::default());

        let mut buffer = Vec::new();
        DashboardExporter::write_json(&dashboard, &mut buffer, false).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(json["title"], "Motor Vehicle Collisions in New York City");
        assert_eq!(json["params"]["category"], "pedestrian");
        assert_eq!(json["sections"][0]["chart"]["kind"], "no_data");
    }
}
