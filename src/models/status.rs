use std::fmt;

/// Status updates emitted by the tracker for whoever is showing them.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusEvent {
    Initializing,
    WaitingForMovement,
    BaselineSet,
    Waiting { moved_meters: f64 },
    MovementStarted,
    Saved { latitude: f64, longitude: f64 },
    Unavailable,
    PermissionDenied,
    InitFailed(String),
    CycleFailed(String),
}

impl StatusEvent {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            StatusEvent::PermissionDenied | StatusEvent::InitFailed(_) | StatusEvent::CycleFailed(_)
        )
    }
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusEvent::Initializing => write!(f, "Initializing..."),
            StatusEvent::WaitingForMovement => write!(f, "Waiting for movement…"),
            StatusEvent::BaselineSet => write!(f, "Baseline set. Waiting for movement…"),
            StatusEvent::Waiting { moved_meters } => {
                write!(f, "Waiting for movement… moved {:.0}m", moved_meters)
            }
            StatusEvent::MovementStarted => write!(f, "Movement started ✅ Logging now…"),
            StatusEvent::Saved {
                latitude,
                longitude,
            } => write!(f, "Saved: {:.6}, {:.6}", latitude, longitude),
            StatusEvent::Unavailable => write!(f, "Location unavailable…"),
            StatusEvent::PermissionDenied => write!(f, "Location permission not granted."),
            StatusEvent::InitFailed(msg) => write!(f, "Init error: {}", msg),
            StatusEvent::CycleFailed(msg) => write!(f, "Track error: {}", msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wording() {
        assert_eq!(
            StatusEvent::Waiting { moved_meters: 11.4 }.to_string(),
            "Waiting for movement… moved 11m"
        );
        assert_eq!(
            StatusEvent::Saved {
                latitude: 20.652494,
                longitude: -100.391404
            }
            .to_string(),
            "Saved: 20.652494, -100.391404"
        );
        assert_eq!(
            StatusEvent::CycleFailed("disk full".to_string()).to_string(),
            "Track error: disk full"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(StatusEvent::PermissionDenied.is_error());
        assert!(StatusEvent::CycleFailed("x".into()).is_error());
        assert!(!StatusEvent::Unavailable.is_error());
        assert!(!StatusEvent::MovementStarted.is_error());
    }
}
