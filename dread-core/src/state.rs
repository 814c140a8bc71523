//! Canonical game state and its store.
//!
//! `GameState` is a single serializable record, one instance per active game.
//! It is mutated only by the turn coordinator; the store enforces the state
//! invariants on every replacement so a bad commit can never go unnoticed.

use crate::vitals::{MAX_HEALTH, MAX_STAMINA};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The scene every game opens on before the narrator takes over.
pub const OPENING_SCENE: &str = "You and your companion stand before an old wooden \
fence gate at the edge of dark woods. A palpable sense of dread hangs in the air, \
and the only light flickers from somewhere deep between the trees.";

/// Errors from state validation.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("{party} health {value} exceeds maximum {max}")]
    HealthOutOfRange { party: &'static str, value: u8, max: u8 },

    #[error("{party} stamina {value} exceeds maximum {max}")]
    StaminaOutOfRange { party: &'static str, value: u8, max: u8 },

    #[error("a party is at zero health but the game-over flag is not set")]
    MissingGameOver,

    #[error("game is over but the state still offers choices or awaits input")]
    DanglingTerminalState,

    #[error("snapshot serialization failed: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// The complete state of one game, committed once per resolved turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Last turn's narrative prose.
    pub narration: String,

    /// Current environment description; also the input to scene images.
    pub scene_description: String,

    /// Current active dilemma presented to the player.
    pub challenge: String,

    /// Player-selectable actions for this turn; display order, not ranked.
    pub available_choices: Vec<String>,

    /// The player's last submitted action.
    pub player_choice: Option<String>,

    /// The companion's last chosen action.
    pub companion_choice: Option<String>,

    /// The companion's stated reasoning for its last choice.
    pub companion_reasoning: Option<String>,

    /// A hint from the companion, if the player asked for one.
    pub companion_hint: Option<String>,

    /// Whether the next companion decision should include a hint.
    pub hint_requested: bool,

    pub player_health: u8,
    pub companion_health: u8,
    pub player_stamina: u8,
    pub companion_stamina: u8,

    /// Items held, in discovery order.
    pub inventory: Vec<String>,

    /// Completed turns. Only incremented after a full resolution.
    pub turn_count: u32,

    /// Whose input is awaited. False while a turn is being resolved.
    pub is_player_turn: bool,

    pub is_game_over: bool,

    /// User-visible message from the last failed operation.
    pub last_error: Option<String>,
}

impl GameState {
    /// A fresh pre-opening state: full vitals, empty inventory, no narration.
    pub fn fresh() -> Self {
        Self {
            narration: String::new(),
            scene_description: OPENING_SCENE.to_string(),
            challenge: String::new(),
            available_choices: Vec::new(),
            player_choice: None,
            companion_choice: None,
            companion_reasoning: None,
            companion_hint: None,
            hint_requested: false,
            player_health: MAX_HEALTH,
            companion_health: MAX_HEALTH,
            player_stamina: MAX_STAMINA,
            companion_stamina: MAX_STAMINA,
            inventory: Vec::new(),
            turn_count: 0,
            is_player_turn: false,
            is_game_over: false,
            last_error: None,
        }
    }

    /// Add an item unless one with the same name is already held.
    pub fn add_item(&mut self, name: &str) {
        if !self.inventory.iter().any(|item| item == name) {
            self.inventory.push(name.to_string());
        }
    }

    /// Remove one occurrence of an item. Using an absent item is a no-op.
    pub fn remove_item(&mut self, name: &str) {
        if let Some(index) = self.inventory.iter().position(|item| item == name) {
            self.inventory.remove(index);
        }
    }

    pub fn has_item(&self, name: &str) -> bool {
        self.inventory.iter().any(|item| item == name)
    }

    /// Verify the state invariants hold.
    pub fn check_invariants(&self) -> Result<(), StateError> {
        if self.player_health > MAX_HEALTH {
            return Err(StateError::HealthOutOfRange {
                party: "player",
                value: self.player_health,
                max: MAX_HEALTH,
            });
        }
        if self.companion_health > MAX_HEALTH {
            return Err(StateError::HealthOutOfRange {
                party: "companion",
                value: self.companion_health,
                max: MAX_HEALTH,
            });
        }
        if self.player_stamina > MAX_STAMINA {
            return Err(StateError::StaminaOutOfRange {
                party: "player",
                value: self.player_stamina,
                max: MAX_STAMINA,
            });
        }
        if self.companion_stamina > MAX_STAMINA {
            return Err(StateError::StaminaOutOfRange {
                party: "companion",
                value: self.companion_stamina,
                max: MAX_STAMINA,
            });
        }
        if (self.player_health == 0 || self.companion_health == 0) && !self.is_game_over {
            return Err(StateError::MissingGameOver);
        }
        if self.is_game_over && (!self.available_choices.is_empty() || self.is_player_turn) {
            return Err(StateError::DanglingTerminalState);
        }
        Ok(())
    }
}

/// Holder of the canonical state across turns.
///
/// All mutation funnels through [`replace`](StateStore::replace), which
/// asserts the invariants; presentation layers only ever read.
#[derive(Debug, Clone)]
pub struct StateStore {
    state: GameState,
}

impl StateStore {
    pub fn new(state: GameState) -> Self {
        Self { state }
    }

    pub fn get(&self) -> &GameState {
        &self.state
    }

    /// Replace the state wholesale after verifying the invariants.
    pub fn replace(&mut self, new_state: GameState) -> Result<(), StateError> {
        new_state.check_invariants()?;
        self.state = new_state;
        Ok(())
    }

    /// Serialize the state as an opaque snapshot blob.
    pub fn snapshot(&self) -> Result<String, StateError> {
        Ok(serde_json::to_string(&self.state)?)
    }

    /// Restore from a snapshot blob. The live state is untouched on failure.
    pub fn restore(&mut self, blob: &str) -> Result<(), StateError> {
        let restored: GameState = serde_json::from_str(blob)?;
        self.replace(restored)
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(GameState::fresh())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state() {
        let state = GameState::fresh();
        assert_eq!(state.player_health, MAX_HEALTH);
        assert_eq!(state.companion_stamina, MAX_STAMINA);
        assert_eq!(state.turn_count, 0);
        assert!(state.inventory.is_empty());
        assert!(!state.is_game_over);
        state.check_invariants().unwrap();
    }

    #[test]
    fn test_add_item_is_idempotent() {
        let mut state = GameState::fresh();
        state.add_item("Rusty Key");
        state.add_item("Rusty Key");
        assert_eq!(state.inventory, vec!["Rusty Key"]);
    }

    #[test]
    fn test_remove_absent_item_is_noop() {
        let mut state = GameState::fresh();
        state.add_item("Old Bandage");
        state.remove_item("Rusty Key");
        assert_eq!(state.inventory, vec!["Old Bandage"]);

        state.remove_item("Old Bandage");
        assert!(state.inventory.is_empty());
    }

    #[test]
    fn test_invariant_zero_health_requires_game_over() {
        let mut state = GameState::fresh();
        state.player_health = 0;
        assert!(matches!(
            state.check_invariants(),
            Err(StateError::MissingGameOver)
        ));

        state.is_game_over = true;
        state.check_invariants().unwrap();
    }

    #[test]
    fn test_invariant_terminal_state_is_quiet() {
        let mut state = GameState::fresh();
        state.is_game_over = true;
        state.available_choices = vec!["Flee.".to_string()];
        assert!(matches!(
            state.check_invariants(),
            Err(StateError::DanglingTerminalState)
        ));
    }

    #[test]
    fn test_store_rejects_invalid_replace() {
        let mut store = StateStore::default();
        let mut bad = GameState::fresh();
        bad.player_stamina = MAX_STAMINA + 1;

        assert!(store.replace(bad).is_err());
        // Live state untouched.
        assert_eq!(store.get().player_stamina, MAX_STAMINA);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut store = StateStore::default();
        let mut state = GameState::fresh();
        state.narration = "The gate creaks open.".to_string();
        state.turn_count = 3;
        state.add_item("Flashlight");
        store.replace(state.clone()).unwrap();

        let blob = store.snapshot().unwrap();

        let mut other = StateStore::default();
        other.restore(&blob).unwrap();
        assert_eq!(other.get(), &state);
    }

    #[test]
    fn test_restore_failure_preserves_live_state() {
        let mut store = StateStore::default();
        let before = store.get().clone();

        assert!(store.restore("not json").is_err());
        assert_eq!(store.get(), &before);
    }
}
