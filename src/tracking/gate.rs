use crate::models::LocationFix;
use crate::tracking::geo::distance_between;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateState {
    AwaitingBaseline,
    AwaitingMovement { baseline: LocationFix },
    /// The threshold was crossed but history has not been cleared yet.
    ResetPending { baseline: LocationFix },
    Tracking { baseline: LocationFix },
}

/// What the caller should do with the fix it just fed in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateDecision {
    /// The fix became the baseline. Nothing is recorded.
    BaselineSet,
    /// Still within the threshold of the baseline. Nothing is recorded.
    Waiting { distance_meters: f64 },
    /// The threshold has been crossed. History must be cleared and
    /// [`MovementGate::complete_reset`] called before the fix is recorded
    /// as the first tracked point. Repeated for every fix until then.
    MovementStarted { distance_meters: f64 },
    /// Already tracking; record the fix.
    Record,
}

impl GateDecision {
    pub fn should_record(&self) -> bool {
        matches!(
            self,
            GateDecision::MovementStarted { .. } | GateDecision::Record
        )
    }
}

/// Holds logging back until the device has moved away from where the
/// session started.
///
/// The first fix after a reset becomes the baseline. Once a fix lands at
/// least `threshold_meters` from it the gate opens for good, once the
/// caller confirms the history reset; the baseline is never moved
/// afterwards.
#[derive(Debug, Clone)]
pub struct MovementGate {
    threshold_meters: f64,
    state: GateState,
}

impl MovementGate {
    pub fn new(threshold_meters: f64) -> Self {
        Self {
            threshold_meters,
            state: GateState::AwaitingBaseline,
        }
    }

    pub fn evaluate(&mut self, fix: LocationFix) -> GateDecision {
        match self.state {
            GateState::AwaitingBaseline => {
                self.state = GateState::AwaitingMovement { baseline: fix };
                GateDecision::BaselineSet
            }
            GateState::AwaitingMovement { baseline } => {
                let distance_meters = distance_between(&baseline, &fix);
                if distance_meters < self.threshold_meters {
                    GateDecision::Waiting { distance_meters }
                } else {
                    self.state = GateState::ResetPending { baseline };
                    GateDecision::MovementStarted { distance_meters }
                }
            }
            GateState::ResetPending { baseline } => GateDecision::MovementStarted {
                distance_meters: distance_between(&baseline, &fix),
            },
            GateState::Tracking { .. } => GateDecision::Record,
        }
    }

    /// Commits the move to tracking once history has been cleared. No-op in
    /// any other state.
    pub fn complete_reset(&mut self) {
        if let GateState::ResetPending { baseline } = self.state {
            self.state = GateState::Tracking { baseline };
        }
    }

    pub fn reset(&mut self) {
        self.state = GateState::AwaitingBaseline;
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn baseline(&self) -> Option<LocationFix> {
        match self.state {
            GateState::AwaitingBaseline => None,
            GateState::AwaitingMovement { baseline }
            | GateState::ResetPending { baseline }
            | GateState::Tracking { baseline } => Some(baseline),
        }
    }

    /// True once the threshold has been crossed, whether or not the
    /// history reset has completed.
    pub fn movement_started(&self) -> bool {
        matches!(
            self.state,
            GateState::ResetPending { .. } | GateState::Tracking { .. }
        )
    }
}
