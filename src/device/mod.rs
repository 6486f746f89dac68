use std::future::Future;
use std::time::Duration;

use crate::error::TrackResult;
use crate::models::LocationFix;

pub mod replay;

pub use replay::ReplaySource;

/// Accuracy hint passed along with each fix request. Sources that cannot
/// honour it are free to ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accuracy {
    Lowest,
    Low,
    Medium,
    High,
    Best,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixRequest {
    pub accuracy: Accuracy,
    pub timeout: Duration,
}

/// Something that can report where the device is.
///
/// `Ok(None)` means no fix could be acquired within `request.timeout`.
/// Cancellation is handled by the caller dropping the returned future, so
/// implementations must not rely on running to completion.
pub trait LocationSource: Send + 'static {
    fn get_fix(
        &mut self,
        request: FixRequest,
    ) -> impl Future<Output = TrackResult<Option<LocationFix>>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

pub trait PermissionGate: Send {
    fn request_location_permission(&mut self) -> impl Future<Output = Permission> + Send;
}

/// Permission decided up front, e.g. from configuration.
#[derive(Debug, Clone, Copy)]
pub struct ConfiguredPermission(pub Permission);

impl PermissionGate for ConfiguredPermission {
    async fn request_location_permission(&mut self) -> Permission {
        self.0
    }
}
