use std::time::Duration;

use crate::device::Accuracy;

pub const MOVEMENT_THRESHOLD_METERS: f64 = 30.0;
pub const SAMPLE_PERIOD: Duration = Duration::from_secs(5);
pub const FIX_TIMEOUT: Duration = Duration::from_secs(10);
pub const SAVE_RECENTER_RADIUS_KM: f64 = 0.5;

/// Fixed parameters of the sampling loop.
#[derive(Debug, Clone, Copy)]
pub struct SamplingPolicy {
    pub movement_threshold_meters: f64,
    pub sample_period: Duration,
    pub fix_timeout: Duration,
    pub accuracy: Accuracy,
    pub recenter_radius_km: f64,
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self {
            movement_threshold_meters: MOVEMENT_THRESHOLD_METERS,
            sample_period: SAMPLE_PERIOD,
            fix_timeout: FIX_TIMEOUT,
            accuracy: Accuracy::Best,
            recenter_radius_km: SAVE_RECENTER_RADIUS_KM,
        }
    }
}
