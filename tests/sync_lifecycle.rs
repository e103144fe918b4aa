//! Public API lifecycle tests
//!
//! These run against freshly created (zero-filled) regions, i.e. the
//! producer-never-started case: the loop must come up, report unsynced,
//! and shut down cleanly without ever publishing a guess.

#![cfg(unix)]

use futures::StreamExt;
use rf2sync::{PlayerSync, SyncConfig};
use std::time::Duration;

fn config(tag: &str) -> SyncConfig {
    SyncConfig {
        instance_suffix: format!("{tag}-{}", std::process::id()),
        active_poll: Duration::from_millis(5),
        ..SyncConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn zero_regions_never_sync() {
    let mut sync = PlayerSync::connect(config("lc-zero")).expect("mapping created");
    sync.start();

    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(!sync.is_synced());
    let view = sync.view();
    assert_eq!(view.scoring.id, 0);
    assert_eq!(view.telemetry.gear, 0);
    assert_eq!(view.ffb_force, 0.0);

    sync.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn stop_blocks_until_the_loop_exits() {
    let mut sync = PlayerSync::connect(config("lc-stop")).expect("mapping created");
    sync.start();
    tokio::time::sleep(Duration::from_millis(50)).await;

    // must return only once the loop has released the segments
    tokio::time::timeout(Duration::from_secs(5), sync.stop())
        .await
        .expect("stop completed in time");

    // repeated stop and post-stop start are quiet no-ops
    sync.stop().await;
    sync.start();
    assert!(!sync.is_synced());
}

#[tokio::test(flavor = "multi_thread")]
async fn updates_stream_ends_when_the_loop_stops() {
    let mut sync = PlayerSync::connect(config("lc-stream")).expect("mapping created");
    let updates = sync.updates();
    sync.start();

    tokio::time::sleep(Duration::from_millis(50)).await;
    sync.stop().await;
    drop(sync); // drops the last sender side

    let views: Vec<_> =
        tokio::time::timeout(Duration::from_secs(5), updates.collect::<Vec<_>>())
            .await
            .expect("stream terminated");
    assert!(!views.is_empty()); // at least the initial view
    assert!(views.iter().all(|v| !v.synced));
}
