use crate::db::{queries, DbPool};
use crate::error::{TrackError, TrackResult};
use crate::models::{LocationFix, LocationPoint, PointId, PointRow};
use tracing::{debug, info};

/// Ordered, durable collection of recorded location points.
#[derive(Debug, Clone)]
pub struct PointStore {
    pool: DbPool,
}

impl PointStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Creates the table and index if they do not exist yet. Safe to call
    /// on every session start.
    pub async fn init(&self) -> TrackResult<()> {
        sqlx::query(queries::CREATE_LOCATION_POINTS)
            .execute(&self.pool)
            .await
            .map_err(TrackError::StorageInit)?;

        sqlx::query(queries::CREATE_LOCATION_POINTS_TIMESTAMP_INDEX)
            .execute(&self.pool)
            .await
            .map_err(TrackError::StorageInit)?;

        info!("Point store ready");
        Ok(())
    }

    pub async fn append(&self, fix: &LocationFix) -> TrackResult<PointId> {
        let result = sqlx::query(queries::INSERT_POINT)
            .bind(fix.latitude)
            .bind(fix.longitude)
            .bind(fix.timestamp.timestamp_millis())
            .execute(&self.pool)
            .await
            .map_err(TrackError::StorageWrite)?;

        let id = PointId(result.last_insert_rowid());
        debug!(
            "Stored point {:?} at {:.6}, {:.6}",
            id, fix.latitude, fix.longitude
        );
        Ok(id)
    }

    /// Removes every point and returns how many were deleted.
    pub async fn clear_all(&self) -> TrackResult<u64> {
        let result = sqlx::query(queries::DELETE_ALL_POINTS)
            .execute(&self.pool)
            .await
            .map_err(TrackError::StorageWrite)?;

        let removed = result.rows_affected();
        info!("Cleared {} stored points", removed);
        Ok(removed)
    }

    /// Every stored point, oldest first. Points sharing a timestamp come
    /// back in insertion order.
    pub async fn all_ordered_by_time(&self) -> TrackResult<Vec<LocationPoint>> {
        let rows: Vec<PointRow> = sqlx::query_as(queries::SELECT_ALL_POINTS_ORDERED)
            .fetch_all(&self.pool)
            .await
            .map_err(TrackError::StorageRead)?;

        rows.into_iter()
            .map(|row| {
                LocationPoint::try_from(row)
                    .map_err(|e| TrackError::StorageRead(sqlx::Error::Decode(e.into())))
            })
            .collect()
    }

    pub async fn count(&self) -> TrackResult<i64> {
        let (count,): (i64,) = sqlx::query_as(queries::COUNT_POINTS)
            .fetch_one(&self.pool)
            .await
            .map_err(TrackError::StorageRead)?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_pool;
    use chrono::{Duration, TimeZone, Utc};

    async fn memory_store() -> PointStore {
        let pool = init_pool("sqlite::memory:").await.unwrap();
        let store = PointStore::new(pool);
        store.init().await.unwrap();
        store
    }

    fn fix_at(lat: f64, lon: f64, secs: i64) -> LocationFix {
        let t0 = Utc.with_ymd_and_hms(2025, 11, 29, 6, 15, 15).unwrap();
        LocationFix::new(lat, lon, t0 + Duration::seconds(secs))
    }

    #[tokio::test]
    async fn test_append_assigns_increasing_ids() {
        let store = memory_store().await;

        let first = store.append(&fix_at(20.0, -100.0, 0)).await.unwrap();
        let second = store.append(&fix_at(20.1, -100.1, 5)).await.unwrap();

        assert!(second > first);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_all_ordered_by_time_sorts_by_timestamp() {
        let store = memory_store().await;

        store.append(&fix_at(3.0, 3.0, 30)).await.unwrap();
        store.append(&fix_at(1.0, 1.0, 10)).await.unwrap();
        store.append(&fix_at(2.0, 2.0, 20)).await.unwrap();

        let points = store.all_ordered_by_time().await.unwrap();
        let lats: Vec<f64> = points.iter().map(|p| p.latitude).collect();
        assert_eq!(lats, vec![1.0, 2.0, 3.0]);
        assert!(points.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[tokio::test]
    async fn test_equal_timestamps_keep_insertion_order() {
        let store = memory_store().await;

        let a = store.append(&fix_at(1.0, 0.0, 0)).await.unwrap();
        let b = store.append(&fix_at(2.0, 0.0, 0)).await.unwrap();

        let ids: Vec<PointId> = store
            .all_ordered_by_time()
            .await
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[tokio::test]
    async fn test_timestamp_round_trips_with_millis() {
        let store = memory_store().await;
        let fix = LocationFix::new(
            20.652494,
            -100.391404,
            Utc.timestamp_millis_opt(1_764_396_915_123).unwrap(),
        );

        store.append(&fix).await.unwrap();

        let points = store.all_ordered_by_time().await.unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].fix(), fix);
    }

    #[tokio::test]
    async fn test_clear_all_empties_store() {
        let store = memory_store().await;
        store.append(&fix_at(1.0, 1.0, 0)).await.unwrap();
        store.append(&fix_at(2.0, 2.0, 1)).await.unwrap();

        assert_eq!(store.clear_all().await.unwrap(), 2);
        assert!(store.all_ordered_by_time().await.unwrap().is_empty());
        assert_eq!(store.clear_all().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_clear() {
        let store = memory_store().await;
        let before = store.append(&fix_at(1.0, 1.0, 0)).await.unwrap();
        store.clear_all().await.unwrap();

        let after = store.append(&fix_at(1.0, 1.0, 1)).await.unwrap();
        assert!(after > before);
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let store = memory_store().await;
        store.append(&fix_at(1.0, 1.0, 0)).await.unwrap();

        store.init().await.unwrap();
        store.init().await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_points_survive_reopening_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("locations.db3").display());

        {
            let store = PointStore::new(init_pool(&url).await.unwrap());
            store.init().await.unwrap();
            store.append(&fix_at(1.5, 2.5, 0)).await.unwrap();
        }

        let store = PointStore::new(init_pool(&url).await.unwrap());
        store.init().await.unwrap();
        let points = store.all_ordered_by_time().await.unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].longitude, 2.5);
    }

    #[tokio::test]
    async fn test_uninitialized_store_reports_read_error() {
        let pool = init_pool("sqlite::memory:").await.unwrap();
        let store = PointStore::new(pool);

        let err = store.all_ordered_by_time().await.unwrap_err();
        assert!(matches!(err, TrackError::StorageRead(_)));

        let err = store.append(&fix_at(0.0, 0.0, 0)).await.unwrap_err();
        assert!(matches!(err, TrackError::StorageWrite(_)));
    }
}
