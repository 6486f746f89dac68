use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

use crate::db::PointStore;
use crate::device::{LocationSource, Permission, PermissionGate};
use crate::error::{TrackError, TrackResult};
use crate::models::StatusEvent;
use crate::render::HeatmapRenderer;
use crate::tracking::policy::SamplingPolicy;
use crate::tracking::sampling_loop::SamplingLoop;
use crate::tracking::shutdown::Shutdown;

struct ActiveSession {
    id: Uuid,
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Owns the point store and at most one running sampling loop.
pub struct Tracker {
    store: PointStore,
    policy: SamplingPolicy,
    status: UnboundedSender<StatusEvent>,
    active: Option<ActiveSession>,
}

impl Tracker {
    pub fn new(
        store: PointStore,
        policy: SamplingPolicy,
        status: UnboundedSender<StatusEvent>,
    ) -> Self {
        Self {
            store,
            policy,
            status,
            active: None,
        }
    }

    pub fn store(&self) -> &PointStore {
        &self.store
    }

    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|session| !session.handle.is_finished())
    }

    /// Starts a fresh session. Permission is checked before anything else,
    /// so a denied request leaves a running session untouched. Otherwise the
    /// running loop is stopped and the new one begins with no baseline.
    pub async fn start<P, S, R>(
        &mut self,
        permission: &mut P,
        source: S,
        renderer: R,
    ) -> TrackResult<Uuid>
    where
        P: PermissionGate,
        S: LocationSource,
        R: HeatmapRenderer,
    {
        self.report(StatusEvent::Initializing);

        if permission.request_location_permission().await != Permission::Granted {
            warn!("Location permission not granted, tracking not started");
            self.report(StatusEvent::PermissionDenied);
            return Err(TrackError::PermissionDenied);
        }

        self.stop().await;

        if let Err(e) = self.store.init().await {
            error!("Failed to initialize point store: {}", e);
            self.report(StatusEvent::InitFailed(e.to_string()));
            return Err(e);
        }

        let id = Uuid::new_v4();
        let (stop, shutdown) = Shutdown::channel();
        let sampling = SamplingLoop::new(
            self.store.clone(),
            source,
            renderer,
            self.policy,
            self.status.clone(),
        );

        self.report(StatusEvent::WaitingForMovement);
        let handle = tokio::spawn(
            sampling
                .run(shutdown)
                .instrument(tracing::info_span!("session", id = %id)),
        );
        info!("Started tracking session {}", id);

        self.active = Some(ActiveSession { id, stop, handle });
        Ok(id)
    }

    /// Signals the running loop to stop and waits for it to exit.
    pub async fn stop(&mut self) {
        let Some(session) = self.active.take() else {
            return;
        };

        let _ = session.stop.send(true);
        if let Err(e) = session.handle.await {
            error!("Session {} ended abnormally: {}", session.id, e);
        } else {
            info!("Stopped tracking session {}", session.id);
        }
    }

    fn report(&self, event: StatusEvent) {
        if self.status.send(event).is_err() {
            warn!("Status receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_pool;
    use crate::device::ConfiguredPermission;
    use crate::tracking::sampling_loop::tests::{
        fast_policy, memory_store, take_events, RecordingRenderer, ScriptedSource, Step,
    };
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_denied_permission_never_starts() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut tracker = Tracker::new(memory_store().await, fast_policy(), tx);

        let err = tracker
            .start(
                &mut ConfiguredPermission(Permission::Denied),
                ScriptedSource::new(vec![Step::Fix(0.0, 0.0)]),
                RecordingRenderer::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, TrackError::PermissionDenied));
        assert!(!tracker.is_running());
        let events = take_events(&mut rx, 2).await;
        assert_eq!(
            events,
            vec![StatusEvent::Initializing, StatusEvent::PermissionDenied]
        );
    }

    #[tokio::test]
    async fn test_start_initializes_store_and_runs() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        // uninitialized on purpose: start must create the table
        let store = PointStore::new(init_pool("sqlite::memory:").await.unwrap());
        let mut tracker = Tracker::new(store, fast_policy(), tx);

        tracker
            .start(
                &mut ConfiguredPermission(Permission::Granted),
                ScriptedSource::new(vec![Step::Fix(0.0, 0.0), Step::Fix(0.0, 0.001)]),
                RecordingRenderer::default(),
            )
            .await
            .unwrap();
        assert!(tracker.is_running());

        let events = take_events(&mut rx, 5).await;
        assert_eq!(
            events,
            vec![
                StatusEvent::Initializing,
                StatusEvent::WaitingForMovement,
                StatusEvent::BaselineSet,
                StatusEvent::MovementStarted,
                StatusEvent::Saved {
                    latitude: 0.0,
                    longitude: 0.001
                },
            ]
        );

        tracker.stop().await;
        assert!(!tracker.is_running());
        assert_eq!(tracker.store().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_restart_resets_gate() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut tracker = Tracker::new(memory_store().await, fast_policy(), tx);
        let mut permission = ConfiguredPermission(Permission::Granted);

        let first = tracker
            .start(
                &mut permission,
                ScriptedSource::new(vec![Step::Fix(0.0, 0.0), Step::Fix(0.0, 0.001)]),
                RecordingRenderer::default(),
            )
            .await
            .unwrap();
        take_events(&mut rx, 5).await;

        // The second session's first fix is far from the old baseline but
        // must become the new baseline instead of being recorded.
        let second = tracker
            .start(
                &mut permission,
                ScriptedSource::new(vec![Step::Fix(10.0, 10.0)]),
                RecordingRenderer::default(),
            )
            .await
            .unwrap();
        assert_ne!(first, second);

        loop {
            match take_events(&mut rx, 1).await.remove(0) {
                StatusEvent::BaselineSet => break,
                event @ (StatusEvent::MovementStarted | StatusEvent::Saved { .. }) => {
                    panic!("restarted session recorded before a baseline: {:?}", event)
                }
                _ => {}
            }
        }

        tracker.stop().await;
        // only the point from the first session remains
        assert_eq!(tracker.store().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_denied_restart_keeps_running_session() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut tracker = Tracker::new(memory_store().await, fast_policy(), tx);

        let first = tracker
            .start(
                &mut ConfiguredPermission(Permission::Granted),
                ScriptedSource::new(vec![Step::Fix(0.0, 0.0)]),
                RecordingRenderer::default(),
            )
            .await
            .unwrap();
        take_events(&mut rx, 3).await;

        let err = tracker
            .start(
                &mut ConfiguredPermission(Permission::Denied),
                ScriptedSource::new(vec![]),
                RecordingRenderer::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TrackError::PermissionDenied));
        assert!(tracker.is_running());

        // the first session keeps ticking
        loop {
            match take_events(&mut rx, 1).await.remove(0) {
                StatusEvent::Unavailable => break,
                StatusEvent::Initializing | StatusEvent::PermissionDenied => {}
                other => panic!("unexpected status {:?} in session {}", other, first),
            }
        }

        tracker.stop().await;
        assert!(!tracker.is_running());
    }

    #[tokio::test]
    async fn test_storage_init_failure_aborts_start() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let pool = init_pool("sqlite::memory:").await.unwrap();
        pool.close().await;
        let mut tracker = Tracker::new(PointStore::new(pool), fast_policy(), tx);

        let err = tracker
            .start(
                &mut ConfiguredPermission(Permission::Granted),
                ScriptedSource::new(vec![Step::Fix(0.0, 0.0)]),
                RecordingRenderer::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, TrackError::StorageInit(_)));
        assert!(!tracker.is_running());
        let events = take_events(&mut rx, 2).await;
        assert_eq!(events[0], StatusEvent::Initializing);
        assert!(matches!(&events[1], StatusEvent::InitFailed(_)));
    }

    #[tokio::test]
    async fn test_stop_without_session_is_noop() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut tracker = Tracker::new(memory_store().await, fast_policy(), tx);

        tracker.stop().await;
        assert!(!tracker.is_running());
    }
}
