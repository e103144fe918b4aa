//! Background sync loop and the `PlayerSync` facade
//!
//! One spawned task owns all four mapped regions and drives the tick cycle:
//! read-verify scoring and telemetry, resolve the player slot across both
//! feeds, publish the verified pair wholesale through a watch channel, and
//! run the freeze-detection state machine that adapts the poll cadence and
//! decides recovery. Consumers never touch the segments; they read the
//! published view, which is replaced atomically and never mutated in place.

use crate::config::SyncConfig;
use crate::data::{
    ExtendedPage, ForceFeedbackPage, ScoringPage, ScoringVehicle, TelemetryPage, TelemetryVehicle,
};
use crate::error::Result;
use crate::locator;
use crate::segment::{RegionKind, SharedSegment};
use crate::snapshot;
use crate::state::{FreezeDetector, FreezeEvent, PollMode};
use crate::view::PlayerView;
use futures::Stream;
use std::mem::size_of;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

/// Consecutive tick failures tolerated before the loop gives up.
const MAX_ERRORS: u32 = 10;

/// The four plugin regions, exclusively owned by the sync loop once started.
struct SegmentSet {
    telemetry: SharedSegment,
    scoring: SharedSegment,
    extended: SharedSegment,
    ffb: SharedSegment,
}

impl SegmentSet {
    fn open(suffix: &str) -> Result<Self> {
        Ok(Self {
            telemetry: SharedSegment::open(
                RegionKind::Telemetry,
                size_of::<TelemetryPage>(),
                suffix,
            )?,
            scoring: SharedSegment::open(RegionKind::Scoring, size_of::<ScoringPage>(), suffix)?,
            extended: SharedSegment::open(RegionKind::Extended, size_of::<ExtendedPage>(), suffix)?,
            ffb: SharedSegment::open(
                RegionKind::ForceFeedback,
                size_of::<ForceFeedbackPage>(),
                suffix,
            )?,
        })
    }

    /// Remap every region with its original parameters.
    fn reset(&mut self) -> Result<()> {
        self.telemetry.reset()?;
        self.scoring.reset()?;
        self.extended.reset()?;
        self.ffb.reset()?;
        Ok(())
    }
}

/// Player-synced access to the rFactor 2 shared memory regions.
///
/// Lifecycle is construct → [`start`](Self::start) → [`stop`](Self::stop) →
/// drop. Mapping failures surface at [`connect`](Self::connect) and are not
/// retried; everything after that is handled inside the background loop.
///
/// # Example
///
/// ```rust,no_run
/// use rf2sync::{PlayerSync, SyncConfig};
///
/// #[tokio::main]
/// async fn main() -> rf2sync::Result<()> {
///     let mut sync = PlayerSync::connect(SyncConfig::default())?;
///     sync.start();
///
///     if sync.is_synced() {
///         let telemetry = sync.player_telemetry();
///         println!("gear {} at {:.0} rpm", telemetry.gear, telemetry.engine_rpm);
///     }
///
///     sync.stop().await;
///     Ok(())
/// }
/// ```
pub struct PlayerSync {
    config: SyncConfig,
    view_rx: watch::Receiver<PlayerView>,
    /// Moved into the loop task on start.
    view_tx: Option<watch::Sender<PlayerView>>,
    /// Moved into the loop task on start.
    segments: Option<SegmentSet>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PlayerSync {
    /// Map all four shared memory regions.
    ///
    /// Regions that do not exist yet are created zero-filled, so this works
    /// whether or not the producer has started. Invalid names and access
    /// failures are fatal here.
    pub fn connect(config: SyncConfig) -> Result<Self> {
        let segments = SegmentSet::open(&config.instance_suffix)?;
        let (view_tx, view_rx) = watch::channel(PlayerView::default());
        info!(suffix = %config.instance_suffix, "shared memory mapping started");

        Ok(Self {
            config,
            view_rx,
            view_tx: Some(view_tx),
            segments: Some(segments),
            cancel: CancellationToken::new(),
            task: None,
        })
    }

    /// Spawn the background sync loop. No-op if already running or already
    /// stopped; the lifecycle does not loop back.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        if self.task.is_some() {
            debug!("sync loop already running");
            return;
        }
        let (Some(segments), Some(view_tx)) = (self.segments.take(), self.view_tx.take()) else {
            debug!("sync loop already stopped");
            return;
        };

        let config = self.config.clone();
        let cancel = self.cancel.clone();
        self.task = Some(tokio::spawn(async move {
            sync_loop(segments, view_tx, config, cancel).await;
        }));
        info!("player sync loop started");
    }

    /// Signal the loop to stop and wait for it to exit.
    ///
    /// When this returns, the loop has observed the flag, finished its
    /// current tick and released the segments; no segment operation happens
    /// afterwards. Safe to call more than once.
    pub async fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if task.await.is_err() {
                warn!("sync loop task panicked");
            }
            info!("player sync loop stopped");
        }
    }

    /// Whether the player slot resolved on the most recent committed tick.
    pub fn is_synced(&self) -> bool {
        self.view_rx.borrow().synced
    }

    /// Snapshot of the whole published view.
    pub fn view(&self) -> PlayerView {
        *self.view_rx.borrow()
    }

    /// Player's scoring slot from the last verified tick.
    pub fn player_scoring(&self) -> ScoringVehicle {
        self.view_rx.borrow().scoring
    }

    /// Player's telemetry slot from the last verified tick.
    pub fn player_telemetry(&self) -> TelemetryVehicle {
        self.view_rx.borrow().telemetry
    }

    /// Extended session metadata from the last tick.
    pub fn extended(&self) -> ExtendedPage {
        self.view_rx.borrow().extended
    }

    /// Current force feedback value from the global channel.
    pub fn ffb_force(&self) -> f64 {
        self.view_rx.borrow().ffb_force
    }

    /// Stream of published views, one item per committed update.
    ///
    /// Yields the current view immediately, then every subsequent publish;
    /// ends when the sync loop exits.
    pub fn updates(&self) -> impl Stream<Item = PlayerView> + 'static {
        WatchStream::new(self.view_rx.clone())
    }
}

impl Drop for PlayerSync {
    fn drop(&mut self) {
        // cooperative shutdown; stop() is the graceful path
        self.cancel.cancel();
    }
}

async fn sync_loop(
    mut segments: SegmentSet,
    view: watch::Sender<PlayerView>,
    config: SyncConfig,
    cancel: CancellationToken,
) {
    let mut detector = FreezeDetector::new(
        config.freeze_window,
        config.remap_after_windows,
        Instant::now(),
    );
    let mut error_count = 0u32;

    loop {
        if cancel.is_cancelled() {
            break;
        }

        match tick(&segments, &view, &mut detector) {
            Ok(()) => error_count = 0,
            Err(e) => {
                error_count += 1;
                error!("sync tick failed ({}/{}): {}", error_count, MAX_ERRORS, e);
                if error_count >= MAX_ERRORS {
                    error!("too many tick failures, stopping sync loop");
                    break;
                }
            }
        }

        if detector.remap_due() {
            warn!("version stamp stuck across repeated freeze windows, remapping regions");
            if let Err(e) = segments.reset() {
                // reopen failure is the same condition as an unavailable
                // region at startup: fatal
                error!("remap failed, stopping sync loop: {}", e);
                break;
            }
        }

        let interval = detector.poll_interval(config.active_poll, config.frozen_poll);
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    debug!("sync loop exited");
}

/// One polling tick: snapshot, detect freeze/thaw, resolve, publish.
fn tick(
    segments: &SegmentSet,
    view: &watch::Sender<PlayerView>,
    detector: &mut FreezeDetector,
) -> Result<()> {
    let scoring = snapshot::read_verified::<ScoringPage>(&segments.scoring)?;
    let telemetry = snapshot::read_verified::<TelemetryPage>(&segments.telemetry)?;
    let extended = snapshot::read_page::<ExtendedPage>(&segments.extended)?;
    let ffb = snapshot::read_page::<ForceFeedbackPage>(&segments.ffb)?;

    let stamp = scoring.as_ref().map(|page| page.version_end);
    match detector.observe(stamp, Instant::now()) {
        Some(FreezeEvent::Froze) => {
            warn!("producer freeze detected, widening poll interval");
            // One-time artifact reset: inputs captured mid-press must not
            // read as held controls for the whole stall. Everything else in
            // the view is deliberately retained, stale but identifiable via
            // the synced flag.
            view.send_modify(|v| {
                v.telemetry.clear_input_artifacts();
                v.ffb_force = 0.0;
                v.synced = false;
            });
            return Ok(());
        }
        Some(FreezeEvent::Thawed) => {
            info!("producer resumed, re-resolving player slot");
        }
        None => {}
    }

    if detector.mode() != PollMode::Active {
        // frozen: hold the view untouched and wait for the stamp to move
        return Ok(());
    }

    let (Some(scoring), Some(telemetry)) = (scoring, telemetry) else {
        // torn read on either feed; timers advanced, retry next tick
        return Ok(());
    };

    match locator::resolve(&scoring, &telemetry) {
        Some(index) => {
            trace!(
                scoring = index.scoring,
                telemetry = index.telemetry,
                id = index.id,
                "player slot resolved"
            );
            view.send_replace(PlayerView {
                scoring: scoring.vehicles[index.scoring],
                telemetry: telemetry.vehicles[index.telemetry],
                extended,
                ffb_force: ffb.force_value,
                synced: true,
            });
        }
        None => {
            // No player slot (monitor mode, session gap) or the feeds were
            // captured across a restart and the ids disagree. Not an error:
            // hold the last good slots, report unsynced.
            view.send_modify(|v| {
                v.extended = extended;
                v.ffb_force = ffb.force_value;
                v.synced = false;
            });
        }
    }

    Ok(())
}
