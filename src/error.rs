use thiserror::Error;

/// Failures the tracking pipeline can report.
///
/// An unavailable fix is not an error (`Ok(None)` from the source) and
/// neither is cancellation (the loop simply returns).
#[derive(Debug, Error)]
pub enum TrackError {
    #[error("location permission not granted")]
    PermissionDenied,

    #[error("storage init failed: {0}")]
    StorageInit(#[source] sqlx::Error),

    #[error("storage write failed: {0}")]
    StorageWrite(#[source] sqlx::Error),

    #[error("storage read failed: {0}")]
    StorageRead(#[source] sqlx::Error),

    #[error("location source failed: {0}")]
    Source(String),

    #[error("render failed: {0}")]
    Render(String),
}

pub type TrackResult<T> = Result<T, TrackError>;
