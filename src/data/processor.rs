//! Data Processor Module
//! Filtering and aggregation of the base table into the derived tables
//! each dashboard chart needs.

use crate::data::record::{AffectedCategory, AffectedLabel, CollisionRecord, UNSPECIFIED_FACTOR};
use chrono::NaiveDate;
use log::debug;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;
use std::sync::LazyLock;

pub const MINUTES_PER_HOUR: u32 = 60;

static VEHICLE_SENTINEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)vehicle").expect("valid regex"));

/// A map point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Crashes within one minute of the selected hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MinuteBin {
    pub minute: u32,
    pub crashes: usize,
}

/// Collisions per borough; `None` is the unknown-borough bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoroughCount {
    pub borough: Option<String>,
    pub collisions: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub collisions: usize,
}

/// Collisions at one (date, fractional hour) cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatmapCell {
    pub date: NaiveDate,
    pub hour: f64,
    pub collisions: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreetRanking {
    pub on_street_name: String,
    #[serde(rename = "Injured")]
    pub injured: u64,
    #[serde(rename = "Killed")]
    pub killed: u64,
    #[serde(rename = "Affected")]
    pub affected: u64,
}

/// One row of the long-format table behind the parallel-categories chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VehicleFactorRow {
    pub vehicle_type: String,
    pub contributing_factor: String,
    pub affected_label: AffectedLabel,
    pub affected_count: u32,
}

/// Stateless filter/aggregate operations over a slice of records.
///
/// Every operation tolerates an empty input and returns an empty (or,
/// for the minute histogram, zero-filled) table.
pub struct DataProcessor;

impl DataProcessor {
    /// Locations of collisions with at least `threshold` injured persons.
    pub fn filter_by_injury_threshold(records: &[CollisionRecord], threshold: u8) -> Vec<GeoPoint> {
        let points: Vec<GeoPoint> = records
            .iter()
            .filter(|r| r.injured_persons >= u32::from(threshold))
            .map(|r| GeoPoint {
                latitude: r.latitude,
                longitude: r.longitude,
            })
            .collect();
        debug!("{} records with >= {threshold} injured", points.len());
        points
    }

    /// Records whose crash time falls within `hour`.
    pub fn filter_by_hour(records: &[CollisionRecord], hour: u8) -> Vec<CollisionRecord> {
        records
            .iter()
            .filter(|r| r.hour() == u32::from(hour))
            .cloned()
            .collect()
    }

    /// Crash counts per minute of `hour`, always 60 bins.
    pub fn minute_histogram(records: &[CollisionRecord], hour: u8) -> Vec<MinuteBin> {
        let mut counts = [0usize; MINUTES_PER_HOUR as usize];
        for record in records.iter().filter(|r| r.hour() == u32::from(hour)) {
            counts[record.minute() as usize] += 1;
        }

        (0..MINUTES_PER_HOUR)
            .zip(counts)
            .map(|(minute, crashes)| MinuteBin { minute, crashes })
            .collect()
    }

    /// Collisions per borough, most frequent first (ties in first-seen order).
    pub fn borough_counts(records: &[CollisionRecord]) -> Vec<BoroughCount> {
        value_counts(records.iter().map(|r| r.borough.as_deref()))
            .into_iter()
            .map(|(borough, collisions)| BoroughCount {
                borough: borough.map(str::to_string),
                collisions,
            })
            .collect()
    }

    /// Collisions per calendar date, ascending.
    pub fn daily_counts(records: &[CollisionRecord]) -> Vec<DailyCount> {
        let mut days: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for record in records {
            *days.entry(record.date()).or_default() += 1;
        }

        days.into_iter()
            .map(|(date, collisions)| DailyCount { date, collisions })
            .collect()
    }

    /// Collisions per (date, hour + minute/60), ordered by date then hour.
    pub fn date_hour_heatmap(records: &[CollisionRecord]) -> Vec<HeatmapCell> {
        let mut cells: BTreeMap<(NaiveDate, u32), usize> = BTreeMap::new();
        for record in records {
            let minute_of_day = record.hour() * MINUTES_PER_HOUR + record.minute();
            *cells.entry((record.date(), minute_of_day)).or_default() += 1;
        }

        cells
            .into_iter()
            .map(|((date, minute_of_day), collisions)| HeatmapCell {
                date,
                hour: f64::from(minute_of_day) / f64::from(MINUTES_PER_HOUR),
                collisions,
            })
            .collect()
    }

    /// Streets with the most injured or killed people of one class.
    ///
    /// Streets are grouped in name order, then stably sorted by affected
    /// count descending, so ties keep name order. Records without a
    /// street name are excluded.
    pub fn top_streets_by_category(
        records: &[CollisionRecord],
        category: AffectedCategory,
        limit: usize,
    ) -> Vec<StreetRanking> {
        let mut streets: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
        for record in records
            .iter()
            .filter(|r| r.injured(category) >= 1 || r.killed(category) >= 1)
        {
            let Some(street) = record.on_street_name.as_deref() else {
                continue;
            };
            let totals = streets.entry(street).or_default();
            totals.0 += u64::from(record.injured(category));
            totals.1 += u64::from(record.killed(category));
        }

        let mut rankings: Vec<StreetRanking> = streets
            .into_iter()
            .map(|(street, (injured, killed))| StreetRanking {
                on_street_name: street.to_string(),
                injured,
                killed,
                affected: injured + killed,
            })
            .collect();
        rankings.sort_by(|a, b| b.affected.cmp(&a.affected));
        rankings.truncate(limit);

        debug!("{} top streets for {category}", rankings.len());
        rankings
    }

    /// Long-format (vehicle type, factor, Injured/Killed, count) table.
    ///
    /// Only collisions with casualties and a specified contributing factor
    /// are considered; of those, records whose factor and vehicle type are
    /// both among the `top_k` most frequent survive. Each survivor yields
    /// an `Injured` row and a `Killed` row, all `Injured` rows first.
    pub fn vehicle_factor_breakdown(records: &[CollisionRecord], top_k: usize) -> Vec<VehicleFactorRow> {
        let candidates: Vec<&CollisionRecord> = records
            .iter()
            .filter(|r| r.affected_persons() > 0)
            .filter(|r| r.contributing_factor_vehicle_1.as_deref() != Some(UNSPECIFIED_FACTOR))
            .collect();

        let top_factors = top_values(
            candidates
                .iter()
                .filter_map(|r| r.contributing_factor_vehicle_1.as_deref()),
            top_k,
        );
        let top_vehicles = top_values(
            candidates.iter().filter_map(|r| r.vehicle_type_1.as_deref()),
            top_k,
        );

        let survivors: Vec<(String, &str, &CollisionRecord)> = candidates
            .iter()
            .filter_map(|record| {
                let factor = record
                    .contributing_factor_vehicle_1
                    .as_deref()
                    .filter(|f| top_factors.contains(f))?;
                let vehicle = record
                    .vehicle_type_1
                    .as_deref()
                    .filter(|v| top_vehicles.contains(v))?;
                Some((clean_vehicle_type(vehicle), factor, *record))
            })
            .collect();

        let mut rows = Vec::with_capacity(survivors.len() * 2);
        for label in [AffectedLabel::Injured, AffectedLabel::Killed] {
            for (vehicle_type, factor, record) in &survivors {
                let affected_count = match label {
                    AffectedLabel::Injured => record.injured_persons,
                    AffectedLabel::Killed => record.killed_persons,
                };
                rows.push(VehicleFactorRow {
                    vehicle_type: vehicle_type.clone(),
                    contributing_factor: (*factor).to_string(),
                    affected_label: label,
                    affected_count,
                });
            }
        }

        debug!(
            "{} vehicle/factor rows from {} candidates",
            rows.len(),
            candidates.len()
        );
        rows
    }
}

/// Strip the word "vehicle" (any case), trim, and capitalize.
///
/// `"Station Wagon/Sport Utility Vehicle"` becomes
/// `"Station wagon/sport utility"`.
pub fn clean_vehicle_type(raw: &str) -> String {
    let stripped = VEHICLE_SENTINEL.replace_all(raw, "");
    capitalize(stripped.trim())
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Count occurrences, most frequent first; ties keep first-seen order.
fn value_counts<K, I>(values: I) -> Vec<(K, usize)>
where
    K: Hash + Eq + Copy,
    I: IntoIterator<Item = K>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, usize)> = Vec::new();
    for value in values {
        match index.get(&value) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(value, counts.len());
                counts.push((value, 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

fn top_values<'a, I>(values: I, k: usize) -> HashSet<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    value_counts(values)
        .into_iter()
        .take(k)
        .map(|(value, _)| value)
        .collect()
}
