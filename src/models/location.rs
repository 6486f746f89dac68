use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// A single reported device position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
}

impl LocationFix {
    pub fn new(latitude: f64, longitude: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            timestamp,
        }
    }

    pub fn now(latitude: f64, longitude: f64) -> Self {
        Self::new(latitude, longitude, Utc::now())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PointId(pub i64);

/// A fix persisted in the point store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocationPoint {
    pub id: PointId,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
}

impl LocationPoint {
    pub fn fix(&self) -> LocationFix {
        LocationFix::new(self.latitude, self.longitude, self.timestamp)
    }
}

/// Row shape of the `location_points` table.
#[derive(Debug, FromRow)]
pub struct PointRow {
    pub id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp_ms: i64, // unix millis
}

impl TryFrom<PointRow> for LocationPoint {
    type Error = String;

    fn try_from(row: PointRow) -> Result<Self, Self::Error> {
        let timestamp = DateTime::<Utc>::from_timestamp_millis(row.timestamp_ms)
            .ok_or_else(|| format!("point {} has invalid timestamp {}", row.id, row.timestamp_ms))?;

        Ok(Self {
            id: PointId(row.id),
            latitude: row.latitude,
            longitude: row.longitude,
            timestamp,
        })
    }
}
