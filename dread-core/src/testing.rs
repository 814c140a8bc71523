//! Test doubles and a harness for exercising turn resolution without a
//! live model. Used by the integration suites and available to downstream
//! crates that want to script the engines.

use crate::choices::ChoicePool;
use crate::coordinator::{TurnCoordinator, TurnError, TurnReport};
use crate::engine::{
    CompanionDecision, CompanionMind, CompanionRequest, EngineError, NarrationOutcome,
    NarrationRequest, Narrator, SceneArtist, SceneImage,
};
use crate::state::GameState;
use crate::vitals::{MAX_HEALTH, MAX_STAMINA};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A companion that replays scripted decisions in order.
///
/// Runs out of script, returns an error; a test that makes more calls than
/// it scripted is a broken test.
#[derive(Default)]
pub struct ScriptedCompanion {
    script: Mutex<VecDeque<Result<CompanionDecision, EngineError>>>,
    requests: Mutex<Vec<CompanionRequest>>,
}

impl ScriptedCompanion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, decision: CompanionDecision) {
        self.script.lock().unwrap().push_back(Ok(decision));
    }

    pub fn push_error(&self, error: EngineError) {
        self.script.lock().unwrap().push_back(Err(error));
    }

    /// Every request this companion has seen, in order.
    pub fn requests(&self) -> Vec<CompanionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompanionMind for ScriptedCompanion {
    async fn decide(&self, request: &CompanionRequest) -> Result<CompanionDecision, EngineError> {
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(EngineError::Malformed("companion script exhausted".into())))
    }
}

/// A narrator that replays scripted outcomes in order.
#[derive(Default)]
pub struct ScriptedNarrator {
    script: Mutex<VecDeque<Result<NarrationOutcome, EngineError>>>,
    requests: Mutex<Vec<NarrationRequest>>,
}

impl ScriptedNarrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, outcome: NarrationOutcome) {
        self.script.lock().unwrap().push_back(Ok(outcome));
    }

    pub fn push_error(&self, error: EngineError) {
        self.script.lock().unwrap().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<NarrationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Narrator for ScriptedNarrator {
    async fn narrate(&self, request: &NarrationRequest) -> Result<NarrationOutcome, EngineError> {
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(EngineError::Malformed("narrator script exhausted".into())))
    }
}

/// An artist that always returns the same one-pixel payload.
pub struct StubArtist;

#[async_trait]
impl SceneArtist for StubArtist {
    async fn illustrate(
        &self,
        _scene_description: &str,
        _turn_count: u32,
    ) -> Result<SceneImage, EngineError> {
        Ok(SceneImage {
            mime_type: "image/png".to_string(),
            data: "c3R1Yg==".to_string(),
        })
    }
}

/// A decision that picks the named option with stock reasoning.
pub fn decision(chosen_option: &str) -> CompanionDecision {
    CompanionDecision {
        chosen_option: chosen_option.to_string(),
        reasoning: "It seemed like the least terrible option.".to_string(),
        hint: None,
    }
}

/// An uneventful outcome: full vitals, no items, game continues.
pub fn quiet_outcome(narration: &str) -> NarrationOutcome {
    NarrationOutcome {
        narration: narration.to_string(),
        scene_description: "The scene shifts around you.".to_string(),
        challenge: "Something is still out there.".to_string(),
        updated_player_health: MAX_HEALTH as i64,
        updated_companion_health: MAX_HEALTH as i64,
        updated_player_stamina: MAX_STAMINA as i64,
        updated_companion_stamina: MAX_STAMINA as i64,
        is_game_over: false,
        new_item_found: None,
        item_used: None,
        player_lost_health: false,
        companion_lost_health: false,
    }
}

/// A coordinator over scripted engines with a deterministic choice pool.
pub struct TestHarness {
    coordinator: TurnCoordinator<ScriptedCompanion, ScriptedNarrator>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            coordinator: TurnCoordinator::with_pool(
                ScriptedCompanion::new(),
                ScriptedNarrator::new(),
                ChoicePool::new().with_seed(7),
            ),
        }
    }

    pub fn coordinator(&mut self) -> &mut TurnCoordinator<ScriptedCompanion, ScriptedNarrator> {
        &mut self.coordinator
    }

    pub fn state(&self) -> &GameState {
        self.coordinator.state()
    }

    /// Begin a game on a scripted opening narration.
    pub async fn start(&mut self, opening: NarrationOutcome) {
        self.script_narration(opening);
        self.coordinator
            .restart()
            .await
            .unwrap_or_else(|e| panic!("restart failed: {e}"));
    }

    /// Begin a game with no opening scripted, forcing the static fallback.
    pub async fn start_on_fallback(&mut self) {
        self.coordinator
            .restart()
            .await
            .unwrap_or_else(|e| panic!("restart failed: {e}"));
    }

    pub fn script_companion(&self, decision: CompanionDecision) {
        self.coordinator.companion().push(decision);
    }

    pub fn script_companion_error(&self, error: EngineError) {
        self.coordinator.companion().push_error(error);
    }

    pub fn script_narration(&self, outcome: NarrationOutcome) {
        self.coordinator.narrator().push(outcome);
    }

    pub fn script_narration_error(&self, error: EngineError) {
        self.coordinator.narrator().push_error(error);
    }

    /// Submit the first currently available choice, scripting the companion
    /// to echo it.
    pub async fn play_any_turn(&mut self, outcome: NarrationOutcome) -> TurnReport {
        let choice = self
            .state()
            .available_choices
            .first()
            .cloned()
            .unwrap_or_else(|| panic!("no choices available"));
        self.script_companion(decision(&choice));
        self.script_narration(outcome);
        self.submit(&choice).await
    }

    pub async fn submit(&mut self, choice: &str) -> TurnReport {
        match self.coordinator.submit_player_choice(choice).await {
            Ok(report) => report,
            Err(e) => panic!("turn failed for {choice:?}: {e}"),
        }
    }

    pub async fn submit_expecting_error(&mut self, choice: &str) -> TurnError {
        match self.coordinator.submit_player_choice(choice).await {
            Ok(report) => panic!("turn unexpectedly succeeded: {report:?}"),
            Err(e) => e,
        }
    }

    #[track_caller]
    pub fn assert_vitals(&self, player_health: u8, companion_health: u8) {
        let state = self.state();
        assert_eq!(state.player_health, player_health, "player health");
        assert_eq!(state.companion_health, companion_health, "companion health");
    }

    #[track_caller]
    pub fn assert_awaiting_player(&self) {
        let state = self.state();
        assert!(state.is_player_turn, "expected the player's turn");
        assert!(!state.is_game_over, "expected a live game");
        assert_eq!(
            state.available_choices.len(),
            crate::choices::CHOICES_PER_TURN,
            "expected a full choice set"
        );
    }

    #[track_caller]
    pub fn assert_game_over(&self) {
        let state = self.state();
        assert!(state.is_game_over, "expected the game to be over");
        assert!(state.available_choices.is_empty(), "expected no choices");
        assert!(!state.is_player_turn, "expected no open player turn");
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
