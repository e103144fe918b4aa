//! Local player slot resolution across the scoring and telemetry feeds
//!
//! The two feeds are updated independently and the producer may reorder
//! vehicle slots at any time (session reload, car swap), so the player's
//! position is re-derived from scratch on every call: the scoring feed is
//! scanned for the explicit player flag, the telemetry feed for the same
//! producer-assigned vehicle id, and the pair is only accepted when both
//! slots carry the same id. No index is ever cached across snapshots.

use crate::data::{MAX_MAPPED_VEHICLES, ScoringPage, TelemetryPage};

/// Resolved player slot positions for one snapshot pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerIndex {
    /// Slot position in the scoring vehicle array.
    pub scoring: usize,
    /// Slot position in the telemetry vehicle array.
    pub telemetry: usize,
    /// Producer-assigned vehicle id both slots agreed on.
    pub id: i32,
}

/// Position of the first slot flagged as the local player.
///
/// The flag must be exactly 1; a half-written or zero-filled page never
/// qualifies. Scans the full fixed range, ignoring `num_vehicles`, which is
/// itself producer data and may be stale relative to the slot array.
pub fn find_scoring_index(scoring: &ScoringPage) -> Option<usize> {
    (0..MAX_MAPPED_VEHICLES).find(|&i| scoring.vehicles[i].is_player())
}

/// Position of the telemetry slot carrying the given vehicle id.
pub fn find_telemetry_index(id: i32, telemetry: &TelemetryPage) -> Option<usize> {
    (0..MAX_MAPPED_VEHICLES).find(|&i| telemetry.vehicles[i].id == id)
}

/// Resolve the player across both feeds with cross-feed identity agreement.
///
/// Returns `None` if either scan fails or the ids disagree — which happens
/// momentarily when the two snapshots were captured on different sides of a
/// producer restart or car swap. The caller keeps its previous view and
/// retries next tick.
pub fn resolve(scoring: &ScoringPage, telemetry: &TelemetryPage) -> Option<PlayerIndex> {
    let scoring_index = find_scoring_index(scoring)?;
    let id = scoring.vehicles[scoring_index].id;
    let telemetry_index = find_telemetry_index(id, telemetry)?;

    if telemetry.vehicles[telemetry_index].id != id {
        return None;
    }

    Some(PlayerIndex { scoring: scoring_index, telemetry: telemetry_index, id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MemoryPage;

    fn pair_with_player(scoring_slot: usize, telemetry_slot: usize, id: i32) -> (ScoringPage, TelemetryPage) {
        let mut scoring = ScoringPage::zeroed();
        scoring.vehicles[scoring_slot].is_player = 1;
        scoring.vehicles[scoring_slot].id = id;

        let mut telemetry = TelemetryPage::zeroed();
        // occupy earlier slots with other ids so the scan has to skip them
        for i in 0..telemetry_slot {
            telemetry.vehicles[i].id = id + 1 + i as i32;
        }
        telemetry.vehicles[telemetry_slot].id = id;
        (scoring, telemetry)
    }

    #[test]
    fn resolves_player_across_different_slot_positions() {
        let (scoring, telemetry) = pair_with_player(3, 7, 42);
        let index = resolve(&scoring, &telemetry).expect("player resolvable");
        assert_eq!(index, PlayerIndex { scoring: 3, telemetry: 7, id: 42 });
    }

    #[test]
    fn resolve_is_idempotent_on_unchanged_snapshots() {
        let (scoring, telemetry) = pair_with_player(5, 2, 91);
        let first = resolve(&scoring, &telemetry);
        let second = resolve(&scoring, &telemetry);
        assert_eq!(first, second);
    }

    #[test]
    fn no_player_flag_is_unresolved() {
        let scoring = ScoringPage::zeroed();
        let telemetry = TelemetryPage::zeroed();
        assert!(find_scoring_index(&scoring).is_none());
        assert!(resolve(&scoring, &telemetry).is_none());
    }

    #[test]
    fn player_flag_other_than_one_is_ignored() {
        let (mut scoring, telemetry) = pair_with_player(0, 0, 7);
        scoring.vehicles[0].is_player = 255;
        assert!(resolve(&scoring, &telemetry).is_none());
    }

    #[test]
    fn missing_telemetry_id_is_unresolved() {
        let (scoring, mut telemetry) = pair_with_player(1, 4, 42);
        telemetry.vehicles[4].id = 43; // telemetry captured across a car swap
        assert!(resolve(&scoring, &telemetry).is_none());
    }

    #[test]
    fn first_flagged_slot_wins() {
        let (mut scoring, mut telemetry) = pair_with_player(6, 6, 10);
        scoring.vehicles[2].is_player = 1;
        scoring.vehicles[2].id = 99;
        telemetry.vehicles[9].id = 99;

        let index = resolve(&scoring, &telemetry).expect("resolvable");
        assert_eq!(index.scoring, 2);
        assert_eq!(index.id, 99);
        assert_eq!(index.telemetry, 9);
    }
}
