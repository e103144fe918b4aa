//! Test fixtures: an in-process stand-in for the rFactor 2 plugin
//!
//! The fake producer maps the same named regions the sync loop reads and
//! writes whole pages into them, bracketed by the version stamp pair the
//! way the real plugin does. Writing unequal stamps simulates catching the
//! producer mid-write.

use crate::data::{ExtendedPage, ForceFeedbackPage, MemoryPage, ScoringPage, TelemetryPage};
use crate::segment::{RegionKind, SharedSegment};
use crate::snapshot::page_bytes;
use std::mem::size_of;

pub(crate) struct FakeProducer {
    telemetry: SharedSegment,
    scoring: SharedSegment,
    extended: SharedSegment,
    ffb: SharedSegment,
    version: u32,
}

impl FakeProducer {
    pub(crate) fn start(suffix: &str) -> Self {
        Self {
            telemetry: SharedSegment::open(
                RegionKind::Telemetry,
                size_of::<TelemetryPage>(),
                suffix,
            )
            .expect("map telemetry"),
            scoring: SharedSegment::open(RegionKind::Scoring, size_of::<ScoringPage>(), suffix)
                .expect("map scoring"),
            extended: SharedSegment::open(RegionKind::Extended, size_of::<ExtendedPage>(), suffix)
                .expect("map extended"),
            ffb: SharedSegment::open(
                RegionKind::ForceFeedback,
                size_of::<ForceFeedbackPage>(),
                suffix,
            )
            .expect("map ffb"),
            version: 0,
        }
    }

    /// Publish a consistent scoring+telemetry pair with the player flagged
    /// at `scoring_slot` and the matching vehicle id at `telemetry_slot`.
    pub(crate) fn publish_player(
        &mut self,
        scoring_slot: usize,
        telemetry_slot: usize,
        id: i32,
        edit: impl FnOnce(&mut ScoringPage, &mut TelemetryPage),
    ) {
        let mut scoring = ScoringPage::zeroed();
        scoring.vehicles[scoring_slot].is_player = 1;
        scoring.vehicles[scoring_slot].id = id;

        let mut telemetry = TelemetryPage::zeroed();
        // push other ids into the earlier slots so scans have to skip them
        for i in 0..telemetry_slot {
            telemetry.vehicles[i].id = id + 1 + i as i32;
        }
        telemetry.vehicles[telemetry_slot].id = id;

        edit(&mut scoring, &mut telemetry);

        self.version += 1;
        scoring.version_begin = self.version;
        scoring.version_end = self.version;
        telemetry.version_begin = self.version;
        telemetry.version_end = self.version;

        self.scoring.write_bytes(0, page_bytes(&scoring));
        self.telemetry.write_bytes(0, page_bytes(&telemetry));
    }

    /// Publish a scoring page that reads as mid-write (unequal stamps),
    /// with a consistent telemetry page alongside it.
    pub(crate) fn publish_torn_player(
        &mut self,
        scoring_slot: usize,
        telemetry_slot: usize,
        id: i32,
    ) {
        let mut scoring = ScoringPage::zeroed();
        scoring.vehicles[scoring_slot].is_player = 1;
        scoring.vehicles[scoring_slot].id = id;
        self.version += 1;
        scoring.version_begin = self.version + 1; // write in progress
        scoring.version_end = self.version;
        self.scoring.write_bytes(0, page_bytes(&scoring));

        let mut telemetry = TelemetryPage::zeroed();
        telemetry.vehicles[telemetry_slot].id = id;
        telemetry.version_begin = self.version;
        telemetry.version_end = self.version;
        self.telemetry.write_bytes(0, page_bytes(&telemetry));
    }

    /// Publish a consistent pair with no slot flagged as the player.
    pub(crate) fn publish_no_player(&mut self) {
        self.version += 1;
        let mut scoring = ScoringPage::zeroed();
        scoring.version_begin = self.version;
        scoring.version_end = self.version;
        let mut telemetry = TelemetryPage::zeroed();
        telemetry.version_begin = self.version;
        telemetry.version_end = self.version;
        self.scoring.write_bytes(0, page_bytes(&scoring));
        self.telemetry.write_bytes(0, page_bytes(&telemetry));
    }

    pub(crate) fn publish_ffb(&mut self, force_value: f64) {
        let mut page = ForceFeedbackPage::zeroed();
        page.force_value = force_value;
        self.ffb.write_bytes(0, page_bytes(&page));
    }

    pub(crate) fn publish_extended(&mut self, version: &str) {
        let mut page = ExtendedPage::zeroed();
        let bytes = version.as_bytes();
        page.version[..bytes.len()].copy_from_slice(bytes);
        page.session_started = 1;
        self.extended.write_bytes(0, page_bytes(&page));
    }
}

/// Install a fmt subscriber for test output; repeated calls are fine.
pub(crate) fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
