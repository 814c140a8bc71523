//! Gemini-backed engine implementations.
//!
//! Each engine sends a single structured-output request and strictly
//! validates the JSON that comes back. A response missing a required field
//! is an engine failure, never a silent coercion; vitals are left raw here
//! and clamped by the coordinator.

use super::prompts::{
    build_companion_prompt, build_narration_prompt, build_scene_image_prompt,
    companion_system_prompt, narrator_system_prompt,
};
use super::{
    CompanionDecision, CompanionMind, CompanionRequest, EngineError, NarrationOutcome,
    NarrationRequest, Narrator, SceneArtist, SceneImage,
};
use async_trait::async_trait;
use ::gemini::{Gemini, Modality, Request};
use serde::Deserialize;

const DEFAULT_IMAGE_MODEL: &str = "gemini-2.0-flash-preview-image-generation";

/// Tuning knobs shared by the Gemini engines.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Model override; the client default is used when unset.
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_output_tokens: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model: None,
            temperature: Some(0.9),
            max_output_tokens: 2048,
        }
    }
}

impl EngineConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_output_tokens(mut self, tokens: usize) -> Self {
        self.max_output_tokens = tokens;
        self
    }
}

fn apply_config(mut request: Request, config: &EngineConfig) -> Request {
    if let Some(ref model) = config.model {
        request = request.with_model(model.clone());
    }
    if let Some(temperature) = config.temperature {
        request = request.with_temperature(temperature);
    }
    request.with_max_output_tokens(config.max_output_tokens)
}

/// Treat absent, empty, and literal-null strings as no value.
fn normalize_optional(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

// ============================================================================
// Narrator
// ============================================================================

/// The Gemini storyteller.
pub struct GeminiNarrator {
    client: Gemini,
    config: EngineConfig,
}

impl GeminiNarrator {
    pub fn new(client: Gemini) -> Self {
        Self {
            client,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NarrationWire {
    narration: String,
    scene_description: String,
    challenge: String,
    updated_player_health: i64,
    updated_companion_health: i64,
    updated_player_stamina: i64,
    updated_companion_stamina: i64,
    is_game_over: bool,
    #[serde(default)]
    new_item_found: Option<String>,
    #[serde(default)]
    item_used: Option<String>,
    #[serde(default)]
    player_lost_health_this_turn: bool,
    #[serde(default)]
    companion_lost_health_this_turn: bool,
}

impl NarrationWire {
    fn into_outcome(self) -> Result<NarrationOutcome, EngineError> {
        if self.narration.trim().is_empty() {
            return Err(EngineError::MissingField("narration"));
        }
        if self.scene_description.trim().is_empty() {
            return Err(EngineError::MissingField("sceneDescription"));
        }

        Ok(NarrationOutcome {
            narration: self.narration,
            scene_description: self.scene_description,
            challenge: self.challenge,
            updated_player_health: self.updated_player_health,
            updated_companion_health: self.updated_companion_health,
            updated_player_stamina: self.updated_player_stamina,
            updated_companion_stamina: self.updated_companion_stamina,
            is_game_over: self.is_game_over,
            new_item_found: normalize_optional(self.new_item_found),
            item_used: normalize_optional(self.item_used),
            player_lost_health: self.player_lost_health_this_turn,
            companion_lost_health: self.companion_lost_health_this_turn,
        })
    }
}

fn narration_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "narration": {"type": "STRING"},
            "sceneDescription": {"type": "STRING"},
            "challenge": {"type": "STRING"},
            "updatedPlayerHealth": {"type": "INTEGER"},
            "updatedCompanionHealth": {"type": "INTEGER"},
            "updatedPlayerStamina": {"type": "INTEGER"},
            "updatedCompanionStamina": {"type": "INTEGER"},
            "isGameOver": {"type": "BOOLEAN"},
            "newItemFound": {"type": "STRING", "nullable": true},
            "itemUsed": {"type": "STRING", "nullable": true},
            "playerLostHealthThisTurn": {"type": "BOOLEAN"},
            "companionLostHealthThisTurn": {"type": "BOOLEAN"}
        },
        "required": [
            "narration", "sceneDescription", "challenge",
            "updatedPlayerHealth", "updatedCompanionHealth",
            "updatedPlayerStamina", "updatedCompanionStamina",
            "isGameOver"
        ]
    })
}

#[async_trait]
impl Narrator for GeminiNarrator {
    async fn narrate(&self, request: &NarrationRequest) -> Result<NarrationOutcome, EngineError> {
        let api_request = apply_config(
            Request::from_prompt(build_narration_prompt(request))
                .with_system(narrator_system_prompt())
                .with_response_schema(narration_schema()),
            &self.config,
        );

        let response = self.client.generate(api_request).await?;
        let wire: NarrationWire = serde_json::from_str(&response.text())
            .map_err(|e| EngineError::Malformed(e.to_string()))?;
        wire.into_outcome()
    }
}

// ============================================================================
// Companion
// ============================================================================

/// The Gemini co-player.
pub struct GeminiCompanion {
    client: Gemini,
    config: EngineConfig,
}

impl GeminiCompanion {
    pub fn new(client: Gemini) -> Self {
        Self {
            client,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompanionWire {
    chosen_option: String,
    reasoning: String,
    #[serde(default)]
    hint: Option<String>,
}

fn companion_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "chosenOption": {"type": "STRING"},
            "reasoning": {"type": "STRING"},
            "hint": {"type": "STRING", "nullable": true}
        },
        "required": ["chosenOption", "reasoning"]
    })
}

#[async_trait]
impl CompanionMind for GeminiCompanion {
    async fn decide(&self, request: &CompanionRequest) -> Result<CompanionDecision, EngineError> {
        let api_request = apply_config(
            Request::from_prompt(build_companion_prompt(request))
                .with_system(companion_system_prompt())
                .with_response_schema(companion_schema()),
            &self.config,
        );

        let response = self.client.generate(api_request).await?;
        let wire: CompanionWire = serde_json::from_str(&response.text())
            .map_err(|e| EngineError::Malformed(e.to_string()))?;

        if wire.chosen_option.trim().is_empty() {
            return Err(EngineError::MissingField("chosenOption"));
        }

        Ok(CompanionDecision {
            chosen_option: wire.chosen_option,
            reasoning: wire.reasoning,
            hint: normalize_optional(wire.hint),
        })
    }
}

// ============================================================================
// Scene artist
// ============================================================================

/// Best-effort Gemini scene illustrator.
pub struct GeminiArtist {
    client: Gemini,
    model: String,
}

impl GeminiArtist {
    pub fn new(client: Gemini) -> Self {
        Self {
            client,
            model: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl SceneArtist for GeminiArtist {
    async fn illustrate(
        &self,
        scene_description: &str,
        turn_count: u32,
    ) -> Result<SceneImage, EngineError> {
        let request = Request::from_prompt(build_scene_image_prompt(scene_description, turn_count))
            .with_model(self.model.clone())
            .with_response_modalities(vec![Modality::Text, Modality::Image]);

        let response = self.client.generate(request).await?;
        let (mime_type, data) = response
            .inline_data()
            .ok_or(EngineError::MissingField("inlineData"))?;

        Ok(SceneImage {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narration_wire_parses_full_payload() {
        let raw = r#"{
            "narration": "The gate splinters.",
            "sceneDescription": "Beyond lies a field of leaning crosses.",
            "challenge": "Something moves between the rows.",
            "updatedPlayerHealth": 1,
            "updatedCompanionHealth": 2,
            "updatedPlayerStamina": 2,
            "updatedCompanionStamina": 3,
            "isGameOver": false,
            "newItemFound": "Corroded Locket",
            "itemUsed": null,
            "playerLostHealthThisTurn": true
        }"#;

        let wire: NarrationWire = serde_json::from_str(raw).unwrap();
        let outcome = wire.into_outcome().unwrap();

        assert_eq!(outcome.updated_player_health, 1);
        assert_eq!(outcome.new_item_found.as_deref(), Some("Corroded Locket"));
        assert_eq!(outcome.item_used, None);
        assert!(outcome.player_lost_health);
        assert!(!outcome.companion_lost_health);
    }

    #[test]
    fn test_narration_wire_rejects_missing_vitals() {
        let raw = r#"{
            "narration": "Text",
            "sceneDescription": "Scene",
            "challenge": "Challenge",
            "isGameOver": false
        }"#;

        assert!(serde_json::from_str::<NarrationWire>(raw).is_err());
    }

    #[test]
    fn test_narration_wire_rejects_blank_narration() {
        let raw = r#"{
            "narration": "  ",
            "sceneDescription": "Scene",
            "challenge": "Challenge",
            "updatedPlayerHealth": 2,
            "updatedCompanionHealth": 2,
            "updatedPlayerStamina": 3,
            "updatedCompanionStamina": 3,
            "isGameOver": false
        }"#;

        let wire: NarrationWire = serde_json::from_str(raw).unwrap();
        assert!(matches!(
            wire.into_outcome(),
            Err(EngineError::MissingField("narration"))
        ));
    }

    #[test]
    fn test_normalize_optional_items() {
        assert_eq!(normalize_optional(None), None);
        assert_eq!(normalize_optional(Some("".to_string())), None);
        assert_eq!(normalize_optional(Some("  ".to_string())), None);
        assert_eq!(normalize_optional(Some("null".to_string())), None);
        assert_eq!(
            normalize_optional(Some(" Rusty Key ".to_string())),
            Some("Rusty Key".to_string())
        );
    }

    #[test]
    fn test_companion_wire_parses_without_hint() {
        let raw = r#"{"chosenOption": "Hide.", "reasoning": "Too weak to fight."}"#;
        let wire: CompanionWire = serde_json::from_str(raw).unwrap();
        assert_eq!(wire.chosen_option, "Hide.");
        assert!(wire.hint.is_none());
    }

    #[test]
    fn test_schemas_require_core_fields() {
        let schema = narration_schema();
        let required = schema["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "updatedPlayerHealth"));
        assert!(required.iter().any(|v| v == "isGameOver"));
        assert!(!required.iter().any(|v| v == "newItemFound"));

        let schema = companion_schema();
        let required = schema["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "chosenOption"));
    }
}
