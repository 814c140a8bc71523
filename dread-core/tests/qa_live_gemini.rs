//! Live tests against the real Gemini API.
//!
//! Ignored by default; run with `cargo test -- --ignored` and a
//! `GEMINI_API_KEY` in the environment or a `.env` file.

use dread_core::coordinator::TurnCoordinator;
use dread_core::engine::{GeminiCompanion, GeminiNarrator};

fn client() -> gemini::Gemini {
    let _ = dotenvy::dotenv();
    gemini::Gemini::from_env().expect("GEMINI_API_KEY must be set for live tests")
}

#[tokio::test]
#[ignore]
async fn test_live_opening_and_first_turn() {
    let client = client();
    let mut game = TurnCoordinator::new(
        GeminiCompanion::new(client.clone()),
        GeminiNarrator::new(client),
    );

    game.restart().await.expect("restart");
    let state = game.state().clone();
    assert_eq!(state.turn_count, 1);
    assert!(!state.narration.is_empty());
    assert_eq!(state.available_choices.len(), 3);

    let choice = state.available_choices[0].clone();
    let report = game.submit_player_choice(&choice).await.expect("turn");
    assert!(!report.narration.is_empty());
    assert!(!report.companion_choice.is_empty());
    assert_eq!(game.state().turn_count, 2);
}
