use std::future::Future;

use crate::error::TrackResult;
use crate::models::{LocationFix, LocationPoint};

pub mod geojson;

pub use geojson::GeoJsonRenderer;

pub const HEAT_RADIUS_METERS: f64 = 40.0;
pub const FULL_RENDER_RADIUS_KM: f64 = 1.0;

/// Draws recorded points as a heat overlay on some map view.
pub trait HeatmapRenderer: Send + 'static {
    /// Removes every overlay element.
    fn clear(&mut self) -> impl Future<Output = TrackResult<()>> + Send;

    /// Moves the view without touching the overlay.
    fn recenter(
        &mut self,
        center: &LocationFix,
        radius_km: f64,
    ) -> impl Future<Output = TrackResult<()>> + Send;

    /// Redraws the whole overlay from `points` and centres on the last one.
    /// An empty slice leaves the view as it is.
    fn render(&mut self, points: &[LocationPoint]) -> impl Future<Output = TrackResult<()>> + Send;
}
