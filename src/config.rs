//! Dashboard Configuration Module
//! User-adjustable filter parameters and the load settings around them.

use crate::data::AffectedCategory;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Largest selectable injured-persons threshold.
pub const MAX_INJURED_THRESHOLD: u8 = 19;
/// Largest selectable hour of day.
pub const MAX_HOUR: u8 = 23;
/// Default row cap applied when reading the source file.
pub const DEFAULT_MAX_ROWS: usize = 100_000;
pub const DEFAULT_TOP_STREETS: usize = 10;
pub const DEFAULT_TOP_VEHICLE_FACTORS: usize = 3;

#[derive(Error, Debug)]
pub enum ParamsError {
    #[error("Injured threshold {0} out of range 0-19")]
    InjuredThreshold(u8),
    #[error("Hour {0} out of range 0-23")]
    Hour(u8),
    #[error("Unknown affected category: {0}")]
    Category(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Params(#[from] ParamsError),
    #[error("Either a config file or a source file is required")]
    MissingSource,
}

/// The dashboard's tunable inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardParams {
    pub injured_threshold: u8,
    pub hour: u8,
    pub category: AffectedCategory,
    pub show_raw_data: bool,
}

impl DashboardParams {
    pub fn new(
        injured_threshold: u8,
        hour: u8,
        category: AffectedCategory,
        show_raw_data: bool,
    ) -> Result<Self, ParamsError> {
        let params = Self {
            injured_threshold,
            hour,
            category,
            show_raw_data,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.injured_threshold > MAX_INJURED_THRESHOLD {
            return Err(ParamsError::InjuredThreshold(self.injured_threshold));
        }
        if self.hour > MAX_HOUR {
            return Err(ParamsError::Hour(self.hour));
        }
        Ok(())
    }

    /// The hour following the selected one, wrapping at midnight.
    pub fn next_hour(&self) -> u16 {
        (u16::from(self.hour) + 1) % (u16::from(MAX_HOUR) + 1)
    }
}

/// Parse a category name such as `"cyclists"` or `"Motorist"`.
pub fn parse_category(value: &str) -> Result<AffectedCategory, ParamsError> {
    value
        .parse()
        .map_err(|_| ParamsError::Category(value.to_string()))
}

/// Values given on the command line; each one set replaces the config value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub source: Option<PathBuf>,
    pub max_rows: Option<usize>,
    pub injured_threshold: Option<u8>,
    pub hour: Option<u8>,
    pub category: Option<String>,
    pub show_raw_data: bool,
}

/// Full dashboard settings, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DashboardConfig {
    pub source: PathBuf,
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
    #[serde(default = "default_top_streets")]
    pub top_streets: usize,
    #[serde(default = "default_top_vehicle_factors")]
    pub top_vehicle_factors: usize,
    #[serde(default)]
    pub params: DashboardParams,
}

fn default_max_rows() -> usize {
    DEFAULT_MAX_ROWS
}

fn default_top_streets() -> usize {
    DEFAULT_TOP_STREETS
}

fn default_top_vehicle_factors() -> usize {
    DEFAULT_TOP_VEHICLE_FACTORS
}

impl DashboardConfig {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            max_rows: DEFAULT_MAX_ROWS,
            top_streets: DEFAULT_TOP_STREETS,
            top_vehicle_factors: DEFAULT_TOP_VEHICLE_FACTORS,
            params: DashboardParams::default(),
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.params.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Read the optional config file, then apply the overrides.
    ///
    /// Parameters are validated here, before any data is loaded.
    pub fn resolve(
        config_path: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let config = match (config_path, &overrides.source) {
            (Some(path), _) => Self::from_file(path)?,
            (None, Some(source)) => Self::new(source.clone()),
            (None, None) => return Err(ConfigError::MissingSource),
        };
        Ok(config.apply_overrides(overrides)?)
    }

    pub fn apply_overrides(mut self, overrides: &ConfigOverrides) -> Result<Self, ParamsError> {
        if let Some(source) = &overrides.source {
            self.source = source.clone();
        }
        if let Some(max_rows) = overrides.max_rows {
            self.max_rows = max_rows;
        }
        if let Some(injured) = overrides.injured_threshold {
            self.params.injured_threshold = injured;
        }
        if let Some(hour) = overrides.hour {
            self.params.hour = hour;
        }
        if let Some(category) = &overrides.category {
            self.params.category = parse_category(category)?;
        }
        if overrides.show_raw_data {
            self.params.show_raw_data = true;
        }
        self.params.validate()?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_ranges() {
        assert!(DashboardParams::new(19, 23, AffectedCategory::Cyclist, false).is_ok());
        assert!(matches!(
            DashboardParams::new(20, 0, AffectedCategory::Cyclist, false),
            Err(ParamsError::InjuredThreshold(20))
        ));
        assert!(matches!(
            DashboardParams::new(0, 24, AffectedCategory::Cyclist, false),
            Err(ParamsError::Hour(24))
        ));
    }

    #[test]
    fn next_hour_wraps_at_midnight() {
        let params = DashboardParams::new(0, 23, AffectedCategory::Pedestrian, false).unwrap();
        assert_eq!(params.next_hour(), 0);
        let params = DashboardParams::new(0, 9, AffectedCategory::Pedestrian, false).unwrap();
        assert_eq!(params.next_hour(), 10);
    }

    #[test]
    fn next_hour_does_not_overflow_for_unvalidated_hour() {
        let params = DashboardParams {
            hour: u8::MAX,
            ..Default::default()
        };
        assert_eq!(params.next_hour(), 256 % 24);
    }

    #[test]
    fn parses_categories() {
        assert_eq!(parse_category("Motorists").unwrap(), AffectedCategory::Motorist);
        assert!(matches!(parse_category("bus"), Err(ParamsError::Category(_))));
    }

    #[test]
    fn reads_toml_with_defaults() {
        let config = DashboardConfig::from_toml_str(
            r#"
            source = "collisions.csv"

            [params]
            hour = 17
            category = "cyclist"
            "#,
        )
        .unwrap();

        assert_eq!(config.source, PathBuf::from("collisions.csv"));
        assert_eq!(config.max_rows, DEFAULT_MAX_ROWS);
        assert_eq!(config.top_streets, 10);
        assert_eq!(config.top_vehicle_factors, 3);
        assert_eq!(config.params.hour, 17);
        assert_eq!(config.params.category, AffectedCategory::Cyclist);
        assert_eq!(config.params.injured_threshold, 0);
        assert!(!config.params.show_raw_data);
    }

    #[test]
    fn rejects_out_of_range_toml_params() {
        let result = DashboardConfig::from_toml_str(
            r#"
            source = "collisions.csv"
            [params]
            hour = 30
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Params(ParamsError::Hour(30)))));
    }

    #[test]
    fn accepts_plural_category_in_toml() {
        let config = DashboardConfig::from_toml_str(
            r#"
            source = "collisions.csv"
            [params]
            category = "cyclists"
            "#,
        )
        .unwrap();
        assert_eq!(config.params.category, AffectedCategory::Cyclist);
    }

    #[test]
    fn overrides_replace_config_file_values() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("dashboard.toml");
        std::fs::write(
            &path,
            "source = \"from_file.csv\"\nmax_rows = 50\n[params]\nhour = 5\ncategory = \"motorist\"\n",
        )
        .unwrap();

        let overrides = ConfigOverrides {
            source: Some(PathBuf::from("from_cli.csv")),
            hour: Some(17),
            category: Some("Pedestrians".to_string()),
            show_raw_data: true,
            ..Default::default()
        };
        let config = DashboardConfig::resolve(Some(&path), &overrides).unwrap();

        assert_eq!(config.source, PathBuf::from("from_cli.csv"));
        assert_eq!(config.max_rows, 50);
        assert_eq!(config.params.hour, 17);
        assert_eq!(config.params.category, AffectedCategory::Pedestrian);
        assert!(config.params.show_raw_data);
    }

    #[test]
    fn source_alone_uses_defaults() {
        let overrides = ConfigOverrides {
            source: Some(PathBuf::from("collisions.csv")),
            injured_threshold: Some(4),
            ..Default::default()
        };
        let config = DashboardConfig::resolve(None, &overrides).unwrap();
        assert_eq!(config.max_rows, DEFAULT_MAX_ROWS);
        assert_eq!(config.params.injured_threshold, 4);
    }

    #[test]
    fn requires_config_or_source() {
        assert!(matches!(
            DashboardConfig::resolve(None, &ConfigOverrides::default()),
            Err(ConfigError::MissingSource)
        ));
    }

    #[test]
    fn rejects_out_of_range_overrides() {
        let overrides = ConfigOverrides {
            source: Some(PathBuf::from("/nonexistent/collisions.csv")),
            hour: Some(24),
            ..Default::default()
        };
        assert!(matches!(
            DashboardConfig::resolve(None, &overrides),
            Err(ConfigError::Params(ParamsError::Hour(24)))
        ));

        let overrides = ConfigOverrides {
            category: Some("bus".to_string()),
            ..overrides
        };
        assert!(matches!(
            DashboardConfig::new("collisions.csv").apply_overrides(&overrides),
            Err(ParamsError::Category(_))
        ));
    }

    #[test]
    fn requires_source() {
        assert!(matches!(
            DashboardConfig::from_toml_str("max_rows = 5"),
            Err(ConfigError::Toml(_))
        ));
    }
}
