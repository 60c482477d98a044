//! Statistics module - Map centering

mod calculator;

pub use calculator::{MapView, StatsCalculator, HEXAGON_PITCH, MAP_ZOOM, SCATTER_PITCH};
