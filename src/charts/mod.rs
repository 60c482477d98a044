//! Charts module - Dashboard sections handed to the presentation layer

mod dashboard;

pub use dashboard::{
    ChartSpec, Dashboard, DashboardBuilder, HexagonLayer, Section, DASHBOARD_TITLE,
    PARALLEL_DIMENSIONS, SCATTER_COLOR, SCATTER_RADIUS,
};
