use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::db::PointStore;
use crate::device::{FixRequest, LocationSource};
use crate::error::TrackResult;
use crate::models::{LocationFix, StatusEvent};
use crate::render::HeatmapRenderer;
use crate::tracking::gate::{GateDecision, MovementGate};
use crate::tracking::policy::SamplingPolicy;
use crate::tracking::shutdown::Shutdown;

/// Periodic fix → gate → store → render pipeline for one session.
pub struct SamplingLoop<S, R> {
    store: PointStore,
    source: S,
    renderer: R,
    policy: SamplingPolicy,
    status: UnboundedSender<StatusEvent>,
}

impl<S, R> SamplingLoop<S, R>
where
    S: LocationSource,
    R: HeatmapRenderer,
{
    pub fn new(
        store: PointStore,
        source: S,
        renderer: R,
        policy: SamplingPolicy,
        status: UnboundedSender<StatusEvent>,
    ) -> Self {
        Self {
            store,
            source,
            renderer,
            policy,
            status,
        }
    }

    /// Runs until `shutdown` fires. A failed cycle is reported and the
    /// next tick proceeds as usual.
    pub async fn run(mut self, mut shutdown: Shutdown) {
        let period = self.policy.sample_period;
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut gate = MovementGate::new(self.policy.movement_threshold_meters);
        let request = FixRequest {
            accuracy: self.policy.accuracy,
            timeout: self.policy.fix_timeout,
        };

        info!("Sampling every {:?}", period);

        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                _ = ticker.tick() => {}
            }

            let fix = tokio::select! {
                _ = shutdown.recv() => break,
                fix = self.source.get_fix(request) => fix,
            };

            let result = match fix {
                Ok(Some(fix)) => self.handle_fix(&mut gate, fix).await,
                Ok(None) => {
                    self.report(StatusEvent::Unavailable);
                    Ok(())
                }
                Err(e) => Err(e),
            };

            if let Err(e) = result {
                error!("Sampling cycle failed: {}", e);
                self.report(StatusEvent::CycleFailed(e.to_string()));
            }
        }

        info!("Sampling loop stopped");
    }

    async fn handle_fix(&mut self, gate: &mut MovementGate, fix: LocationFix) -> TrackResult<()> {
        match gate.evaluate(fix) {
            GateDecision::BaselineSet => {
                info!(
                    "Baseline set at {:.6}, {:.6}",
                    fix.latitude, fix.longitude
                );
                self.report(StatusEvent::BaselineSet);
                return Ok(());
            }
            GateDecision::Waiting { distance_meters } => {
                debug!("Moved {:.1}m from baseline", distance_meters);
                self.report(StatusEvent::Waiting {
                    moved_meters: distance_meters,
                });
                return Ok(());
            }
            GateDecision::MovementStarted { distance_meters } => {
                info!(
                    "Movement started ({:.1}m from baseline), resetting history",
                    distance_meters
                );
                // the gate keeps asking for this reset until it succeeds
                self.store.clear_all().await?;
                self.renderer.clear().await?;
                gate.complete_reset();
                self.report(StatusEvent::MovementStarted);
            }
            GateDecision::Record => {}
        }

        self.store.append(&fix).await?;
        self.report(StatusEvent::Saved {
            latitude: fix.latitude,
            longitude: fix.longitude,
        });
        self.renderer
            .recenter(&fix, self.policy.recenter_radius_km)
            .await?;

        let points = self.store.all_ordered_by_time().await?;
        self.renderer.render(&points).await
    }

    fn report(&self, event: StatusEvent) {
        if self.status.send(event).is_err() {
            warn!("Status receiver dropped");
        }
    }
}
