//! External collaborator seams: the companion mind, the narrator, and the
//! optional scene artist.
//!
//! The engines are black boxes to the rest of the crate. Their contracts are
//! the request/outcome types here; the turn coordinator validates everything
//! they return before trusting a single field.

mod gemini;
mod prompts;

pub use self::gemini::{EngineConfig, GeminiArtist, GeminiCompanion, GeminiNarrator};
pub use prompts::{FALLBACK_COMPANION_ACTION, OPENING_COMPANION_ACTION, OPENING_PLAYER_ACTION};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from an external engine call.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Gemini API error: {0}")]
    Api(#[from] ::gemini::Error),

    #[error("engine returned malformed output: {0}")]
    Malformed(String),

    #[error("engine response is missing required field `{0}`")]
    MissingField(&'static str),
}

/// What the companion is told before it picks an action.
#[derive(Debug, Clone)]
pub struct CompanionRequest {
    pub scene_description: String,
    pub available_choices: Vec<String>,
    pub companion_health: u8,
    pub companion_stamina: u8,
    /// The player asked to be nudged; the reply should carry a hint.
    pub hint_requested: bool,
}

/// The companion's pick for this turn.
#[derive(Debug, Clone)]
pub struct CompanionDecision {
    /// Must be one of the offered choices; the coordinator substitutes the
    /// first offered choice when it is not.
    pub chosen_option: String,
    pub reasoning: String,
    pub hint: Option<String>,
}

/// Everything the narrator needs to resolve one turn.
#[derive(Debug, Clone)]
pub struct NarrationRequest {
    pub player_choice: String,
    pub companion_choice: String,
    pub scene_description: String,
    pub player_health: u8,
    pub companion_health: u8,
    pub player_stamina: u8,
    pub companion_stamina: u8,
    /// The turn being resolved (already incremented by the caller).
    pub turn_count: u32,
    pub inventory: Vec<String>,
}

/// The narrator's resolution of one turn, before any clamping.
///
/// Vitals are raw `i64` because the generator is untrusted; they pass
/// through [`crate::vitals`] before touching game state.
#[derive(Debug, Clone)]
pub struct NarrationOutcome {
    pub narration: String,
    pub scene_description: String,
    pub challenge: String,
    pub updated_player_health: i64,
    pub updated_companion_health: i64,
    pub updated_player_stamina: i64,
    pub updated_companion_stamina: i64,
    pub is_game_over: bool,
    pub new_item_found: Option<String>,
    pub item_used: Option<String>,
    pub player_lost_health: bool,
    pub companion_lost_health: bool,
}

/// A generated scene illustration.
#[derive(Debug, Clone)]
pub struct SceneImage {
    pub mime_type: String,
    /// Base64-encoded image bytes.
    pub data: String,
}

/// The AI co-player: picks one of the offered actions each turn.
#[async_trait]
pub trait CompanionMind: Send + Sync {
    async fn decide(&self, request: &CompanionRequest) -> Result<CompanionDecision, EngineError>;
}

/// The storyteller: resolves both parties' actions into the next state.
#[async_trait]
pub trait Narrator: Send + Sync {
    async fn narrate(&self, request: &NarrationRequest) -> Result<NarrationOutcome, EngineError>;
}

/// Best-effort scene illustration. Failures never affect game state.
#[async_trait]
pub trait SceneArtist: Send + Sync {
    async fn illustrate(&self, scene_description: &str, turn_count: u32)
        -> Result<SceneImage, EngineError>;
}

// Engines are often shared between the coordinator and side tasks.
#[async_trait]
impl<T: CompanionMind + ?Sized> CompanionMind for std::sync::Arc<T> {
    async fn decide(&self, request: &CompanionRequest) -> Result<CompanionDecision, EngineError> {
        (**self).decide(request).await
    }
}

#[async_trait]
impl<T: Narrator + ?Sized> Narrator for std::sync::Arc<T> {
    async fn narrate(&self, request: &NarrationRequest) -> Result<NarrationOutcome, EngineError> {
        (**self).narrate(request).await
    }
}

#[async_trait]
impl<T: SceneArtist + ?Sized> SceneArtist for std::sync::Arc<T> {
    async fn illustrate(
        &self,
        scene_description: &str,
        turn_count: u32,
    ) -> Result<SceneImage, EngineError> {
        (**self).illustrate(scene_description, turn_count).await
    }
}
