//! Turn resolution.
//!
//! [`TurnCoordinator`] owns the authoritative [`GameState`] and drives one
//! full turn at a time: player choice in, companion decision, narration,
//! vitals clamping, inventory delta, next choice set out. State is committed
//! only once the whole pipeline has succeeded, so an aborted or failed turn
//! leaves the previous state intact apart from re-arming the player's turn.

use crate::choices::ChoicePool;
use crate::engine::{
    CompanionMind, CompanionRequest, EngineError, NarrationOutcome, NarrationRequest, Narrator,
    FALLBACK_COMPANION_ACTION, OPENING_COMPANION_ACTION, OPENING_PLAYER_ACTION,
};
use crate::state::{GameState, StateError, StateStore, OPENING_SCENE};
use crate::vitals::{clamp_health, clamp_stamina, derive_game_over};

/// Shown when the opening narration cannot be generated.
pub const FALLBACK_OPENING_NARRATION: &str = "You wake on cold ground before an old wooden \
gate, your companion stirring beside you. The woods beyond are silent in a way that feels \
deliberate, as if something in there has paused to listen.";

/// Challenge text paired with the fallback opening.
pub const FALLBACK_OPENING_CHALLENGE: &str = "Decide how the two of you will approach the gate.";

/// Where the coordinator is within a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    AwaitingPlayerInput,
    CompanionDeciding,
    NarratingOutcome,
}

#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("the game is over; restart to play again")]
    GameOver,
    #[error("no player turn is open for input")]
    TurnInProgress,
    #[error("choice is not currently available: {0}")]
    UnknownChoice(String),
    #[error("companion decision failed: {0}")]
    Companion(EngineError),
    #[error("narration failed: {0}")]
    Narration(EngineError),
    #[error(transparent)]
    State(#[from] StateError),
}

/// What one resolved turn produced, for callers that render incrementally.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReport {
    pub player_choice: String,
    pub companion_choice: String,
    pub companion_reasoning: String,
    pub companion_hint: Option<String>,
    /// True when the companion picked something outside the offered
    /// choices and the coordinator substituted a valid one.
    pub companion_corrected: bool,
    pub narration: String,
    pub player_lost_health: bool,
    pub companion_lost_health: bool,
    pub game_over: bool,
    pub turn_count: u32,
}

pub struct TurnCoordinator<C, N> {
    companion: C,
    narrator: N,
    pool: ChoicePool,
    store: StateStore,
    phase: TurnPhase,
}

impl<C: CompanionMind, N: Narrator> TurnCoordinator<C, N> {
    pub fn new(companion: C, narrator: N) -> Self {
        Self::with_pool(companion, narrator, ChoicePool::new())
    }

    /// A coordinator starts in the pre-opening state; call
    /// [`restart`](Self::restart) to begin play.
    pub fn with_pool(companion: C, narrator: N, pool: ChoicePool) -> Self {
        Self {
            companion,
            narrator,
            pool,
            store: StateStore::new(GameState::fresh()),
            phase: TurnPhase::AwaitingPlayerInput,
        }
    }

    pub fn state(&self) -> &GameState {
        self.store.get()
    }

    pub fn companion(&self) -> &C {
        &self.companion
    }

    pub fn narrator(&self) -> &N {
        &self.narrator
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Serialize the current state for saving. Only valid between turns;
    /// a snapshot taken mid-turn would capture a half-resolved world.
    pub fn snapshot(&self) -> Result<String, TurnError> {
        if self.phase != TurnPhase::AwaitingPlayerInput {
            return Err(TurnError::TurnInProgress);
        }
        Ok(self.store.snapshot()?)
    }

    pub fn restore(&mut self, blob: &str) -> Result<(), TurnError> {
        if self.phase != TurnPhase::AwaitingPlayerInput {
            return Err(TurnError::TurnInProgress);
        }
        self.store.restore(blob)?;
        Ok(())
    }

    /// Replace the live state with one loaded from a save.
    pub fn load_state(&mut self, state: GameState) -> Result<(), TurnError> {
        if self.phase != TurnPhase::AwaitingPlayerInput {
            return Err(TurnError::TurnInProgress);
        }
        self.store.replace(state)?;
        Ok(())
    }

    /// Ask the companion to include a hint with its next decision.
    pub fn request_hint(&mut self) -> Result<(), TurnError> {
        let state = self.store.get();
        if state.is_game_over {
            return Err(TurnError::GameOver);
        }
        let mut next = state.clone();
        next.hint_requested = true;
        self.store.replace(next)?;
        Ok(())
    }

    /// Called by a supervising task when an in-flight turn is cancelled.
    /// Re-arms the player's turn and records why; a no-op between turns.
    pub fn abort_turn(&mut self, note: impl Into<String>) -> Result<(), TurnError> {
        if self.phase == TurnPhase::AwaitingPlayerInput {
            return Ok(());
        }
        self.fail_turn(note.into())?;
        Ok(())
    }

    /// Resolve one full turn for `choice`.
    ///
    /// Preconditions are loud: submitting while the game is over, while a
    /// turn is in flight, or with a choice that is not on offer returns an
    /// error without touching the state. An engine failure mid-turn rolls
    /// back to the pre-turn state with `last_error` set.
    pub async fn submit_player_choice(&mut self, choice: &str) -> Result<TurnReport, TurnError> {
        if self.phase != TurnPhase::AwaitingPlayerInput {
            return Err(TurnError::TurnInProgress);
        }
        {
            let state = self.store.get();
            if state.is_game_over {
                return Err(TurnError::GameOver);
            }
            if !state.is_player_turn {
                return Err(TurnError::TurnInProgress);
            }
            if !state.available_choices.iter().any(|c| c == choice) {
                return Err(TurnError::UnknownChoice(choice.to_string()));
            }
        }

        // Take the turn: from here until commit or rollback, no other
        // submission is accepted.
        let mut taken = self.store.get().clone();
        taken.is_player_turn = false;
        taken.player_choice = Some(choice.to_string());
        taken.companion_choice = None;
        taken.companion_reasoning = None;
        taken.companion_hint = None;
        taken.last_error = None;
        self.store.replace(taken)?;
        self.phase = TurnPhase::CompanionDeciding;

        let companion_request = {
            let state = self.store.get();
            CompanionRequest {
                scene_description: state.scene_description.clone(),
                available_choices: state.available_choices.clone(),
                companion_health: state.companion_health,
                companion_stamina: state.companion_stamina,
                hint_requested: state.hint_requested,
            }
        };

        let decision = match self.companion.decide(&companion_request).await {
            Ok(decision) => decision,
            Err(e) => {
                self.fail_turn(format!("companion decision failed: {e}"))?;
                return Err(TurnError::Companion(e));
            }
        };

        let (companion_choice, companion_reasoning, companion_corrected) = {
            let available = &self.store.get().available_choices;
            if available.iter().any(|c| c == &decision.chosen_option) {
                (decision.chosen_option, decision.reasoning, false)
            } else {
                let substitute = available
                    .first()
                    .cloned()
                    .unwrap_or_else(|| FALLBACK_COMPANION_ACTION.to_string());
                let reasoning = format!(
                    "{} (The companion's reply named an unavailable action, so the \
                     nearest offered one was taken instead.)",
                    decision.reasoning
                );
                (substitute, reasoning, true)
            }
        };

        self.phase = TurnPhase::NarratingOutcome;
        let narration_request = {
            let state = self.store.get();
            NarrationRequest {
                player_choice: choice.to_string(),
                companion_choice: companion_choice.clone(),
                scene_description: state.scene_description.clone(),
                player_health: state.player_health,
                companion_health: state.companion_health,
                player_stamina: state.player_stamina,
                companion_stamina: state.companion_stamina,
                turn_count: state.turn_count + 1,
                inventory: state.inventory.clone(),
            }
        };

        let outcome = match self.narrator.narrate(&narration_request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.fail_turn(format!("narration failed: {e}"))?;
                return Err(TurnError::Narration(e));
            }
        };

        let mut next = self.store.get().clone();
        let previous_player_health = next.player_health;
        let previous_companion_health = next.companion_health;

        next.turn_count += 1;
        next.narration = outcome.narration.clone();
        next.scene_description = outcome.scene_description.clone();
        next.challenge = outcome.challenge.clone();
        next.player_health = clamp_health(outcome.updated_player_health);
        next.companion_health = clamp_health(outcome.updated_companion_health);
        next.player_stamina = clamp_stamina(outcome.updated_player_stamina);
        next.companion_stamina = clamp_stamina(outcome.updated_companion_stamina);

        // The flags are advisory; trust them only when the clamped value
        // actually went down.
        let player_lost_health =
            outcome.player_lost_health && next.player_health < previous_player_health;
        let companion_lost_health =
            outcome.companion_lost_health && next.companion_health < previous_companion_health;

        if let Some(ref item) = outcome.new_item_found {
            next.add_item(item);
        }
        if let Some(ref item) = outcome.item_used {
            next.remove_item(item);
        }

        next.player_choice = Some(choice.to_string());
        next.companion_choice = Some(companion_choice.clone());
        next.companion_reasoning = Some(companion_reasoning.clone());
        next.companion_hint = decision.hint.clone();
        next.hint_requested = false;
        next.last_error = None;

        next.is_game_over = derive_game_over(
            next.player_health,
            next.companion_health,
            outcome.is_game_over,
        );
        if next.is_game_over {
            next.available_choices = Vec::new();
            next.is_player_turn = false;
        } else {
            next.available_choices = self.pool.next_choices(next.turn_count);
            next.is_player_turn = true;
        }

        let report = TurnReport {
            player_choice: choice.to_string(),
            companion_choice,
            companion_reasoning,
            companion_hint: decision.hint,
            companion_corrected,
            narration: outcome.narration,
            player_lost_health,
            companion_lost_health,
            game_over: next.is_game_over,
            turn_count: next.turn_count,
        };

        self.store.replace(next)?;
        self.phase = TurnPhase::AwaitingPlayerInput;
        Ok(report)
    }

    /// Start a new game. The opening scene is narrated by the engine; if
    /// that fails the game still starts, on a static opening, with the
    /// failure recorded in `last_error`.
    pub async fn restart(&mut self) -> Result<(), TurnError> {
        self.phase = TurnPhase::AwaitingPlayerInput;
        let mut fresh = GameState::fresh();

        let request = NarrationRequest {
            player_choice: OPENING_PLAYER_ACTION.to_string(),
            companion_choice: OPENING_COMPANION_ACTION.to_string(),
            scene_description: OPENING_SCENE.to_string(),
            player_health: fresh.player_health,
            companion_health: fresh.companion_health,
            player_stamina: fresh.player_stamina,
            companion_stamina: fresh.companion_stamina,
            turn_count: 1,
            inventory: Vec::new(),
        };

        match self.narrator.narrate(&request).await {
            Ok(outcome) => {
                Self::apply_opening(&mut fresh, outcome);
            }
            Err(e) => {
                fresh.narration = FALLBACK_OPENING_NARRATION.to_string();
                fresh.challenge = FALLBACK_OPENING_CHALLENGE.to_string();
                fresh.last_error = Some(format!("opening narration failed: {e}"));
            }
        }

        if !fresh.is_game_over {
            fresh.is_player_turn = true;
            fresh.available_choices = self.pool.next_choices(fresh.turn_count);
        }
        self.store.replace(fresh)?;
        Ok(())
    }

    fn apply_opening(fresh: &mut GameState, outcome: NarrationOutcome) {
        fresh.turn_count = 1;
        fresh.narration = outcome.narration;
        fresh.scene_description = outcome.scene_description;
        fresh.challenge = outcome.challenge;
        fresh.player_health = clamp_health(outcome.updated_player_health);
        fresh.companion_health = clamp_health(outcome.updated_companion_health);
        fresh.player_stamina = clamp_stamina(outcome.updated_player_stamina);
        fresh.companion_stamina = clamp_stamina(outcome.updated_companion_stamina);
        fresh.is_game_over = derive_game_over(
            fresh.player_health,
            fresh.companion_health,
            outcome.is_game_over,
        );
        if fresh.is_game_over {
            fresh.is_player_turn = false;
        }
    }

    fn fail_turn(&mut self, note: String) -> Result<(), StateError> {
        let mut next = self.store.get().clone();
        if !next.is_game_over {
            next.is_player_turn = true;
        }
        next.last_error = Some(note);
        self.store.replace(next)?;
        self.phase = TurnPhase::AwaitingPlayerInput;
        Ok(())
    }
}
