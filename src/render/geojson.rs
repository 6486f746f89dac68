use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::error::{TrackError, TrackResult};
use crate::models::{LocationFix, LocationPoint};
use crate::render::{HeatmapRenderer, FULL_RENDER_RADIUS_KM, HEAT_RADIUS_METERS};

const HEAT_FILL: &str = "rgba(0, 0, 255, 0.8)";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapRegion {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
}

#[derive(Debug, Serialize)]
struct FeatureCollection<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    view: Option<MapRegion>,
    features: &'a [Feature],
}

#[derive(Debug, Clone, Serialize)]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    geometry: Geometry,
    properties: CircleStyle,
}

#[derive(Debug, Clone, Serialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: &'static str,
    coordinates: [f64; 2], // [lon, lat]
}

#[derive(Debug, Clone, Serialize)]
struct CircleStyle {
    point_id: i64,
    timestamp: DateTime<Utc>,
    radius_m: f64,
    stroke_width: f64,
    fill: &'static str,
}

impl Feature {
    fn heat_circle(point: &LocationPoint) -> Self {
        Self {
            kind: "Feature",
            geometry: Geometry {
                kind: "Point",
                coordinates: [point.longitude, point.latitude],
            },
            properties: CircleStyle {
                point_id: point.id.0,
                timestamp: point.timestamp,
                radius_m: HEAT_RADIUS_METERS,
                stroke_width: 0.0,
                fill: HEAT_FILL,
            },
        }
    }
}

/// Writes the heat overlay and current view to a GeoJSON file.
///
/// The file is rewritten after every change through a temporary sibling
/// and a rename, so readers never observe a half-written overlay.
pub struct GeoJsonRenderer {
    path: PathBuf,
    view: Option<MapRegion>,
    overlay: Vec<Feature>,
}

impl GeoJsonRenderer {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            view: None,
            overlay: Vec::new(),
        }
    }

    pub fn view(&self) -> Option<MapRegion> {
        self.view
    }

    async fn flush(&self) -> TrackResult<()> {
        let collection = FeatureCollection {
            kind: "FeatureCollection",
            view: self.view,
            features: &self.overlay,
        };
        let body =
            serde_json::to_vec(&collection).map_err(|e| TrackError::Render(e.to_string()))?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, body)
            .await
            .map_err(|e| TrackError::Render(e.to_string()))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| TrackError::Render(e.to_string()))?;

        debug!(
            "Wrote {} heat circles to {}",
            self.overlay.len(),
            self.path.display()
        );
        Ok(())
    }
}

impl HeatmapRenderer for GeoJsonRenderer {
    async fn clear(&mut self) -> TrackResult<()> {
        self.overlay.clear();
        self.flush().await
    }

    async fn recenter(&mut self, center: &LocationFix, radius_km: f64) -> TrackResult<()> {
        self.view = Some(MapRegion {
            latitude: center.latitude,
            longitude: center.longitude,
            radius_km,
        });
        self.flush().await
    }

    async fn render(&mut self, points: &[LocationPoint]) -> TrackResult<()> {
        let Some(last) = points.last() else {
            return Ok(());
        };

        self.overlay = points.iter().map(Feature::heat_circle).collect();
        self.view = Some(MapRegion {
            latitude: last.latitude,
            longitude: last.longitude,
            radius_km: FULL_RENDER_RADIUS_KM,
        });
        self.flush().await
    }
}
