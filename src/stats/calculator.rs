//! Statistics Calculator Module
//! Map view centering over filtered point sets.

use crate::data::GeoPoint;
use serde::Serialize;
use statrs::statistics::Statistics;

/// Zoom used by both map sections.
pub const MAP_ZOOM: f64 = 11.0;
/// Camera pitch of the injury scatter map.
pub const SCATTER_PITCH: f64 = 5.0;
/// Camera pitch of the extruded hexagon map.
pub const HEXAGON_PITCH: f64 = 50.0;

/// Initial camera of a map chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapView {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
    pub pitch: f64,
}

pub struct StatsCalculator;

impl StatsCalculator {
    /// Mean latitude and longitude, or `None` for an empty point set.
    pub fn midpoint(points: &[GeoPoint]) -> Option<GeoPoint> {
        if points.is_empty() {
            return None;
        }

        let latitude = points.iter().map(|p| p.latitude).mean();
        let longitude = points.iter().map(|p| p.longitude).mean();
        Some(GeoPoint {
            latitude,
            longitude,
        })
    }

    /// Camera centered on the midpoint of `points`.
    pub fn map_view(points: &[GeoPoint], zoom: f64, pitch: f64) -> Option<MapView> {
        Self::midpoint(points).map(|center| MapView {
            latitude: center.latitude,
            longitude: center.longitude,
            zoom,
            pitch,
        })
    }
}
