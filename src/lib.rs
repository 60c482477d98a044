//! Collision Dashboard - Motor vehicle collision analysis
//!
//! Loads a collision CSV once, then derives the tables behind each
//! dashboard chart from the cached base table and the current filters.

pub mod charts;
pub mod config;
pub mod data;
pub mod export;
pub mod stats;

pub use charts::{ChartSpec, Dashboard, DashboardBuilder, Section};
pub use config::{DashboardConfig, DashboardParams, ParamsError};
pub use data::{load, AffectedCategory, CollisionRecord, DataProcessor, Dataset, LoaderError};
pub use export::{DashboardExporter, ExportError};
