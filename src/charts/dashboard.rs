//! Dashboard Assembly Module
//! Turns the base table and the current parameters into an ordered list
//! of chart sections for the presentation layer.

use crate::config::{DashboardConfig, DashboardParams};
use crate::data::{
    AffectedCategory, BoroughCount, CollisionRecord, DailyCount, DataProcessor, Dataset, GeoPoint,
    HeatmapCell, MinuteBin, StreetRanking, VehicleFactorRow,
};
use crate::stats::{MapView, StatsCalculator, HEXAGON_PITCH, MAP_ZOOM, SCATTER_PITCH};
use log::debug;
use serde::Serialize;

pub const DASHBOARD_TITLE: &str = "Motor Vehicle Collisions in New York City";

/// RGBA fill of scatter-map points.
pub const SCATTER_COLOR: [u8; 4] = [200, 30, 0, 160];
pub const SCATTER_RADIUS: f64 = 20.0;

/// Axis labels of the parallel-categories chart, in dimension order.
pub const PARALLEL_DIMENSIONS: [&str; 3] = ["Vehicle Type", "Contributing Factor", "Affected"];

/// Hexbin aggregation settings of the hour map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HexagonLayer {
    pub radius: f64,
    pub extruded: bool,
    pub elevation_scale: f64,
    pub elevation_range: [f64; 2],
}

impl Default for HexagonLayer {
    fn default() -> Self {
        Self {
            radius: 100.0,
            extruded: true,
            elevation_scale: 4.0,
            elevation_range: [0.0, 1000.0],
        }
    }
}

/// A chart kind together with the derived table it displays.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSpec {
    ScatterMap {
        view: MapView,
        radius: f64,
        color: [u8; 4],
        points: Vec<GeoPoint>,
    },
    HexagonMap {
        view: MapView,
        layer: HexagonLayer,
        points: Vec<GeoPoint>,
    },
    MinuteBars {
        bins: Vec<MinuteBin>,
    },
    BoroughBars {
        counts: Vec<BoroughCount>,
    },
    DailyLine {
        days: Vec<DailyCount>,
    },
    Heatmap {
        cells: Vec<HeatmapCell>,
    },
    StreetTable {
        category: AffectedCategory,
        rows: Vec<StreetRanking>,
    },
    ParallelCategories {
        dimensions: [&'static str; 3],
        rows: Vec<VehicleFactorRow>,
    },
    RawData {
        records: Vec<CollisionRecord>,
    },
    /// Nothing matched the current filters.
    NoData {
        message: String,
    },
}

impl ChartSpec {
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub title: String,
    pub chart: ChartSpec,
}

impl Section {
    fn new(title: impl Into<String>, chart: ChartSpec) -> Self {
        Self {
            title: title.into(),
            chart,
        }
    }
}

/// One full recomputation of every chart for a parameter set.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub title: String,
    pub params: DashboardParams,
    pub record_count: usize,
    pub sections: Vec<Section>,
}

impl Dashboard {
    /// Find a section by its title.
    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }
}

/// Builds dashboards from a loaded dataset.
pub struct DashboardBuilder<'a> {
    dataset: &'a Dataset,
    top_streets: usize,
    top_vehicle_factors: usize,
}

impl<'a> DashboardBuilder<'a> {
    pub fn new(dataset: &'a Dataset, config: &DashboardConfig) -> Self {
        Self {
            dataset,
            top_streets: config.top_streets,
            top_vehicle_factors: config.top_vehicle_factors,
        }
    }

    /// Recompute every section for `params`.
    ///
    /// Borough counts and the street ranking use the whole base table;
    /// the time-based charts, the vehicle breakdown and the raw-data
    /// table use the subset within the selected hour.
    pub fn build(&self, params: &DashboardParams) -> Dashboard {
        let records = self.dataset.records();
        let hour_range = format!("{}:00 and {}:00", params.hour, params.next_hour());
        let hour_records = DataProcessor::filter_by_hour(records, params.hour);
        debug!(
            "Building dashboard: {} records, {} in hour {}",
            records.len(),
            hour_records.len(),
            params.hour
        );

        let mut sections = vec![
            Section::new(
                "Where are the most people injured in NYC?",
                Self::injury_map(records, params.injured_threshold),
            ),
            Section::new(
                format!("Vehicle collisions between {hour_range}"),
                Self::hour_map(&hour_records, &hour_range),
            ),
            Section::new(
                format!("Breakdown by minute between {hour_range}"),
                ChartSpec::MinuteBars {
                    bins: DataProcessor::minute_histogram(&hour_records, params.hour),
                },
            ),
            Section::new(
                "Number of collisions in each borough",
                ChartSpec::BoroughBars {
                    counts: DataProcessor::borough_counts(records),
                },
            ),
            Section::new(
                "Collisions Over Time",
                ChartSpec::DailyLine {
                    days: DataProcessor::daily_counts(&hour_records),
                },
            ),
            Section::new(
                format!(
                    "Heatmap of Collisions by Date and Hour from {}:00 to {}:00",
                    params.hour,
                    params.next_hour()
                ),
                ChartSpec::Heatmap {
                    cells: DataProcessor::date_hour_heatmap(&hour_records),
                },
            ),
            Section::new(
                format!(
                    "Top {} dangerous streets by affected {}",
                    self.top_streets,
                    params.category.plural_label().to_lowercase()
                ),
                ChartSpec::StreetTable {
                    category: params.category,
                    rows: DataProcessor::top_streets_by_category(
                        records,
                        params.category,
                        self.top_streets,
                    ),
                },
            ),
            Section::new(
                "Vehicle types, contributing factors and outcomes",
                ChartSpec::ParallelCategories {
                    dimensions: PARALLEL_DIMENSIONS,
                    rows: DataProcessor::vehicle_factor_breakdown(
                        &hour_records,
                        self.top_vehicle_factors,
                    ),
                },
            ),
        ];

        if params.show_raw_data {
            sections.push(Section::new(
                "Raw Data",
                ChartSpec::RawData {
                    records: hour_records,
                },
            ));
        }

        Dashboard {
            title: DASHBOARD_TITLE.to_string(),
            params: *params,
            record_count: records.len(),
            sections,
        }
    }

    fn injury_map(records: &[CollisionRecord], threshold: u8) -> ChartSpec {
        let points = DataProcessor::filter_by_injury_threshold(records, threshold);
        match StatsCalculator::map_view(&points, MAP_ZOOM, SCATTER_PITCH) {
            Some(view) => ChartSpec::ScatterMap {
                view,
                radius: SCATTER_RADIUS,
                color: SCATTER_COLOR,
                points,
            },
            None => ChartSpec::NoData {
                message: "No data available for the selected number of injured persons."
                    .to_string(),
            },
        }
    }

    fn hour_map(hour_records: &[CollisionRecord], hour_range: &str) -> ChartSpec {
        let points: Vec<GeoPoint> = hour_records
            .iter()
            .map(|r| GeoPoint {
                latitude: r.latitude,
                longitude: r.longitude,
            })
            .collect();
        match StatsCalculator::map_view(&points, MAP_ZOOM, HEXAGON_PITCH) {
            Some(view) => ChartSpec::HexagonMap {
                view,
                layer: HexagonLayer::default(),
                points,
            },
            None => ChartSpec::NoData {
                message: format!("No collisions recorded between {hour_range}."),
            },
        }
    }
}
