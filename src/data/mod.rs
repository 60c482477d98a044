//! Data module - CSV loading, caching and aggregation

mod cache;
mod loader;
mod processor;
mod record;

pub use cache::{load, DatasetCache};
pub use loader::{
    canonical_column_name, parse_crash_timestamp, DataLoader, Dataset, LoaderError,
    DATE_COLUMN, TIME_COLUMN,
};
pub use processor::{
    clean_vehicle_type, BoroughCount, DailyCount, DataProcessor, GeoPoint, HeatmapCell,
    MinuteBin, StreetRanking, VehicleFactorRow, MINUTES_PER_HOUR,
};
pub use record::{AffectedCategory, AffectedLabel, CollisionRecord, UNSPECIFIED_FACTOR};
