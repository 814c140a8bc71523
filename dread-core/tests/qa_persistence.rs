//! Save-file round trips and version handling.

use dread_core::persist::{
    load_game, peek_save, save_game, CachedImage, PersistError, SavedGame, SAVE_VERSION,
};
use dread_core::state::GameState;
use dread_core::testing::{quiet_outcome, TestHarness};
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("dread-test-{}-{name}.json", std::process::id()))
}

#[tokio::test]
async fn test_save_and_load_round_trip() {
    let path = temp_path("round-trip");
    let mut state = GameState::fresh();
    state.narration = "The hallway breathes.".to_string();
    state.turn_count = 4;
    state.inventory.push("Tarnished Mirror".to_string());

    let saved = SavedGame::new(
        state.clone(),
        Some(CachedImage {
            mime_type: "image/png".to_string(),
            data: "cGl4ZWxz".to_string(),
        }),
    );
    save_game(&path, &saved).await.unwrap();

    let loaded = load_game(&path).await.unwrap();
    assert_eq!(loaded.version, SAVE_VERSION);
    assert_eq!(loaded.state, state);
    assert_eq!(loaded.scene_image, saved.scene_image);

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_future_save_version_is_refused() {
    let path = temp_path("future-version");
    let saved = SavedGame::new(GameState::fresh(), None);
    let mut value = serde_json::to_value(&saved).unwrap();
    value["version"] = serde_json::json!(SAVE_VERSION + 1);
    tokio::fs::write(&path, serde_json::to_string(&value).unwrap())
        .await
        .unwrap();

    match load_game(&path).await {
        Err(PersistError::VersionMismatch { expected, found }) => {
            assert_eq!(expected, SAVE_VERSION);
            assert_eq!(found, SAVE_VERSION + 1);
        }
        other => panic!("expected a version mismatch, got {other:?}"),
    }

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_peek_reads_metadata_only() {
    let path = temp_path("peek");
    let saved = SavedGame::new(GameState::fresh(), None);
    save_game(&path, &saved).await.unwrap();

    let (version, saved_at) = peek_save(&path).await.unwrap();
    assert_eq!(version, SAVE_VERSION);
    assert_eq!(saved_at, saved.saved_at);

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_missing_save_file_is_an_io_error() {
    let path = temp_path("missing-never-written");
    match load_game(&path).await {
        Err(PersistError::Io(_)) => {}
        other => panic!("expected an io error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_coordinator_snapshot_restores_mid_campaign_state() {
    let mut harness = TestHarness::new();
    harness.start(quiet_outcome("It begins at the gate.")).await;

    let mut outcome = quiet_outcome("You pocket something cold.");
    outcome.new_item_found = Some("Cold Coin".to_string());
    harness.play_any_turn(outcome).await;
    let snapshot = harness.coordinator().snapshot().unwrap();
    let saved_state = harness.state().clone();

    // Play on, then restore the earlier snapshot.
    harness.play_any_turn(quiet_outcome("Deeper in.")).await;
    assert_ne!(harness.state(), &saved_state);

    harness.coordinator().restore(&snapshot).unwrap();
    assert_eq!(harness.state(), &saved_state);
    assert!(harness.state().has_item("Cold Coin"));
}

#[tokio::test]
async fn test_restoring_garbage_leaves_the_live_game_alone() {
    let mut harness = TestHarness::new();
    harness.start(quiet_outcome("It begins at the gate.")).await;
    let before = harness.state().clone();

    assert!(harness.coordinator().restore("not json at all").is_err());
    assert_eq!(harness.state(), &before);
}
