use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::device::{FixRequest, LocationSource};
use crate::error::{TrackError, TrackResult};
use crate::models::LocationFix;

/// One line of a location feed.
#[derive(Debug, Deserialize)]
pub struct FeedRecord {
    #[serde(alias = "lat", default, deserialize_with = "parse_f64_option")]
    pub latitude: Option<f64>,
    #[serde(alias = "lon", alias = "lng", default, deserialize_with = "parse_f64_option")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl FeedRecord {
    pub fn into_fix(self) -> Result<LocationFix, String> {
        let latitude = self.latitude.ok_or("record missing latitude")?;
        let longitude = self.longitude.ok_or("record missing longitude")?;

        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(format!("coordinates out of range: {}, {}", latitude, longitude));
        }

        Ok(LocationFix::new(
            latitude,
            longitude,
            self.timestamp.unwrap_or_else(Utc::now),
        ))
    }
}

fn parse_f64_option<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrFloat {
        String(String),
        Float(f64),
    }

    let v: Option<StringOrFloat> = Option::deserialize(deserializer)?;
    match v {
        Some(StringOrFloat::Float(f)) => Ok(Some(f)),
        Some(StringOrFloat::String(s)) => {
            if s.trim().is_empty() {
                Ok(None)
            } else {
                s.trim().parse::<f64>().map(Some).map_err(serde::de::Error::custom)
            }
        }
        None => Ok(None),
    }
}

/// Reads fixes from a newline-delimited JSON file, one per request.
///
/// The file is followed like `tail -f`: once the end is reached every
/// request reports no fix until more lines are appended. A line is only
/// parsed once its terminating newline has been written; a partial last
/// line is kept and completed on a later request. A missing file is
/// treated the same way, so the feed may be created after startup.
pub struct ReplaySource {
    path: PathBuf,
    reader: Option<BufReader<File>>,
    pending: Vec<u8>,
}

impl ReplaySource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            reader: None,
            pending: Vec::new(),
        }
    }

    async fn next_record(&mut self) -> TrackResult<Option<LocationFix>> {
        if self.reader.is_none() {
            match File::open(&self.path).await {
                Ok(file) => {
                    info!("Opened location feed {}", self.path.display());
                    self.reader = Some(BufReader::new(file));
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!("Location feed {} not present yet", self.path.display());
                    return Ok(None);
                }
                Err(e) => return Err(TrackError::Source(e.to_string())),
            }
        }

        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };

        loop {
            // read_until appends to `pending` and is cancel safe, so a
            // timed-out read loses nothing
            reader
                .read_until(b'\n', &mut self.pending)
                .await
                .map_err(|e| TrackError::Source(e.to_string()))?;

            if self.pending.last() != Some(&b'\n') {
                if !self.pending.is_empty() {
                    debug!("Waiting for the rest of a partial feed line");
                }
                return Ok(None);
            }

            let line = std::mem::take(&mut self.pending);
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            let record: FeedRecord = serde_json::from_slice(&line).map_err(|e| {
                warn!("Failed to parse feed line: {}", e);
                TrackError::Source(format!("malformed feed line: {}", e))
            })?;
            return record.into_fix().map(Some).map_err(TrackError::Source);
        }
    }
}

impl LocationSource for ReplaySource {
    async fn get_fix(&mut self, request: FixRequest) -> TrackResult<Option<LocationFix>> {
        debug!("Requesting fix with accuracy {:?}", request.accuracy);

        match tokio::time::timeout(request.timeout, self.next_record()).await {
            Ok(result) => result,
            Err(_) => {
                warn!("No fix within {:?}", request.timeout);
                Ok(None)
            }
        }
    }
}
