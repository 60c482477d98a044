//! CSV Data Loader Module
//! Reads the collision CSV using Polars and converts it into typed records.

use crate::data::record::CollisionRecord;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::{debug, info, warn};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Canonical names of the two source columns combined into `date/time`.
pub const DATE_COLUMN: &str = "crash_date";
pub const TIME_COLUMN: &str = "crash_time";

const REQUIRED_COLUMNS: [&str; 4] = [DATE_COLUMN, TIME_COLUMN, "latitude", "longitude"];
const INFER_SCHEMA_ROWS: usize = 10000;

const DATE_FORMATS: [&str; 3] = ["%m/%d/%Y", "%Y-%m-%d", "%Y/%m/%d"];
const TIME_FORMATS: [&str; 3] = ["%H:%M", "%H:%M:%S", "%H:%M:%S%.f"];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Source file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Missing required column: {0}")]
    MissingColumn(String),
}

/// The cleaned base table: every record has coordinates and a timestamp.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    source: PathBuf,
    rows_read: usize,
    records: Vec<CollisionRecord>,
}

impl Dataset {
    pub fn new(source: PathBuf, rows_read: usize, records: Vec<CollisionRecord>) -> Self {
        Self {
            source,
            rows_read,
            records,
        }
    }

    /// Build a dataset directly from records (no source file).
    pub fn from_records(records: Vec<CollisionRecord>) -> Self {
        Self {
            source: PathBuf::new(),
            rows_read: records.len(),
            records,
        }
    }

    pub fn records(&self) -> &[CollisionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Rows read from the file before coordinate and timestamp cleaning.
    pub fn rows_read(&self) -> usize {
        self.rows_read
    }
}

/// Handles CSV file loading with Polars for high performance.
pub struct DataLoader;

impl DataLoader {
    /// Load up to `max_rows` rows of a collision CSV.
    ///
    /// Column names are normalized with [`canonical_column_name`], rows
    /// without latitude or longitude are dropped, and the crash date and
    /// time columns are combined into one timestamp.
    pub fn load_csv(path: &Path, max_rows: usize) -> Result<Dataset, LoaderError> {
        if !path.is_file() {
            return Err(LoaderError::NotFound(path.to_path_buf()));
        }

        let mut lf = LazyCsvReader::new(path)
            .with_n_rows(Some(max_rows))
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .with_ignore_errors(true)
            .finish()?;

        let schema = lf.collect_schema()?;
        let renames: Vec<(String, String)> = schema
            .iter_names()
            .map(|name| (name.to_string(), canonical_column_name(name.as_str())))
            .collect();

        for required in REQUIRED_COLUMNS {
            if !renames.iter().any(|(_, canonical)| canonical == required) {
                return Err(LoaderError::MissingColumn(required.to_string()));
            }
        }

        let projection: Vec<Expr> = renames
            .iter()
            .map(|(original, canonical)| col(original.as_str()).alias(canonical.as_str()))
            .collect();

        let raw = lf
            .select(projection)
            .with_columns([
                col("latitude").cast(DataType::Float64),
                col("longitude").cast(DataType::Float64),
            ])
            .collect()?;
        let rows_read = raw.height();

        let df = raw
            .lazy()
            .filter(
                col("latitude")
                    .is_not_null()
                    .and(col("longitude").is_not_null()),
            )
            .collect()?;
        debug!(
            "{}: {} of {} rows have coordinates",
            path.display(),
            df.height(),
            rows_read
        );

        let records = Self::to_records(&df)?;
        info!(
            "Loaded {} collision records from {} ({} rows read)",
            records.len(),
            path.display(),
            rows_read
        );

        Ok(Dataset::new(path.to_path_buf(), rows_read, records))
    }

    /// Convert a frame with canonical column names into typed records.
    fn to_records(df: &DataFrame) -> Result<Vec<CollisionRecord>, LoaderError> {
        let latitudes = float_values(df, "latitude")?;
        let longitudes = float_values(df, "longitude")?;
        let mut dates = text_values(df, DATE_COLUMN)?;
        let mut times = text_values(df, TIME_COLUMN)?;

        let injured_persons = count_values(df, "injured_persons")?;
        let killed_persons = count_values(df, "killed_persons")?;
        let injured_pedestrians = count_values(df, "injured_pedestrians")?;
        let killed_pedestrians = count_values(df, "killed_pedestrians")?;
        let injured_cyclists = count_values(df, "injured_cyclists")?;
        let killed_cyclists = count_values(df, "killed_cyclists")?;
        let injured_motorists = count_values(df, "injured_motorists")?;
        let killed_motorists = count_values(df, "killed_motorists")?;

        let mut boroughs = text_values(df, "borough")?;
        let mut streets = text_values(df, "on_street_name")?;
        let mut factors = text_values(df, "contributing_factor_vehicle_1")?;
        let mut vehicles = text_values(df, "vehicle_type_1")?;

        let mut records = Vec::with_capacity(df.height());
        let mut unparsed = 0usize;

        for i in 0..df.height() {
            let (Some(latitude), Some(longitude)) = (latitudes[i], longitudes[i]) else {
                continue;
            };
            if !latitude.is_finite() || !longitude.is_finite() {
                continue;
            }

            let date = std::mem::take(&mut dates[i]);
            let time = std::mem::take(&mut times[i]);
            let Some(timestamp) = date
                .as_deref()
                .zip(time.as_deref())
                .and_then(|(date, time)| parse_crash_timestamp(date, time))
            else {
                unparsed += 1;
                continue;
            };

            records.push(CollisionRecord {
                timestamp,
                latitude,
                longitude,
                injured_persons: injured_persons[i],
                killed_persons: killed_persons[i],
                injured_pedestrians: injured_pedestrians[i],
                killed_pedestrians: killed_pedestrians[i],
                injured_cyclists: injured_cyclists[i],
                killed_cyclists: killed_cyclists[i],
                injured_motorists: injured_motorists[i],
                killed_motorists: killed_motorists[i],
                borough: std::mem::take(&mut boroughs[i]),
                on_street_name: std::mem::take(&mut streets[i]),
                contributing_factor_vehicle_1: std::mem::take(&mut factors[i]),
                vehicle_type_1: std::mem::take(&mut vehicles[i]),
            });
        }

        if unparsed > 0 {
            warn!("Dropped {unparsed} rows with an unparseable crash date/time");
        }

        Ok(records)
    }
}

/// Normalize a source header: trimmed, lowercase, inner whitespace as `_`.
///
/// `"CRASH DATE"` and `"CRASH_DATE"` both become `crash_date`.
pub fn canonical_column_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Combine the separate crash date and crash time fields.
pub fn parse_crash_timestamp(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = parse_crash_date(date)?;
    let time = parse_crash_time(time)?;
    Some(date.and_time(time))
}

fn parse_crash_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    // ISO datetimes carry a midnight time part; the real time lives in crash_time.
    let date_part = value
        .split(|c: char| c == 'T' || c.is_whitespace())
        .next()
        .unwrap_or(value);
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
}

fn parse_crash_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(value, format).ok())
}

fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|n| n.as_str() == name)
}

fn float_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, LoaderError> {
    let column = df.column(name)?.cast(&DataType::Float64)?;
    Ok(column.f64()?.into_iter().collect())
}

/// Non-negative counts; missing columns, nulls and negatives read as 0.
fn count_values(df: &DataFrame, name: &str) -> Result<Vec<u32>, LoaderError> {
    if !has_column(df, name) {
        return Ok(vec![0; df.height()]);
    }

    let column = df.column(name)?.cast(&DataType::Int64)?;
    Ok(column
        .i64()?
        .into_iter()
        .map(|v| v.and_then(|n| u32::try_from(n).ok()).unwrap_or(0))
        .collect())
}

/// Trimmed strings; missing columns and blank cells read as `None`.
fn text_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, LoaderError> {
    if !has_column(df, name) {
        return Ok(vec![None; df.height()]);
    }

    let column = df.column(name)?.cast(&DataType::String)?;
    Ok(column
        .str()?
        .into_iter()
        .map(|v| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .collect())
}
