//! Saving and loading games.
//!
//! A save is a single JSON document: a version tag, a wall-clock stamp, the
//! full [`GameState`], and optionally the last rendered scene image so a
//! loaded game can show its scene without regenerating it. Loads from a
//! future save version are refused rather than guessed at.

use crate::state::GameState;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed save file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("save version {found} is not supported (expected {expected})")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Base64 image payload carried alongside a save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedImage {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedGame {
    pub version: u32,
    /// Unix seconds at save time.
    pub saved_at: u64,
    pub state: GameState,
    #[serde(default)]
    pub scene_image: Option<CachedImage>,
}

impl SavedGame {
    pub fn new(state: GameState, scene_image: Option<CachedImage>) -> Self {
        Self {
            version: SAVE_VERSION,
            saved_at: unix_now(),
            state,
            scene_image,
        }
    }
}

/// Version tag alone, for listing saves without deserializing game state.
#[derive(Debug, Deserialize)]
struct SaveHeader {
    version: u32,
    saved_at: u64,
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

pub async fn save_game(path: impl AsRef<Path>, saved: &SavedGame) -> Result<(), PersistError> {
    let json = serde_json::to_string_pretty(saved)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

pub async fn load_game(path: impl AsRef<Path>) -> Result<SavedGame, PersistError> {
    let json = tokio::fs::read_to_string(path).await?;
    let header: SaveHeader = serde_json::from_str(&json)?;
    if header.version != SAVE_VERSION {
        return Err(PersistError::VersionMismatch {
            expected: SAVE_VERSION,
            found: header.version,
        });
    }
    Ok(serde_json::from_str(&json)?)
}

/// Read just the metadata of a save file.
pub async fn peek_save(path: impl AsRef<Path>) -> Result<(u32, u64), PersistError> {
    let json = tokio::fs::read_to_string(path).await?;
    let header: SaveHeader = serde_json::from_str(&json)?;
    Ok((header.version, header.saved_at))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saved_game_carries_current_version() {
        let saved = SavedGame::new(GameState::fresh(), None);
        assert_eq!(saved.version, SAVE_VERSION);
        assert!(saved.saved_at > 0);
    }

    #[test]
    fn test_save_round_trips_through_json() {
        let mut state = GameState::fresh();
        state.narration = "The gate creaks.".to_string();
        state.inventory.push("Rusty Key".to_string());
        let saved = SavedGame::new(
            state.clone(),
            Some(CachedImage {
                mime_type: "image/png".to_string(),
                data: "aGVsbG8=".to_string(),
            }),
        );

        let json = serde_json::to_string(&saved).unwrap();
        let loaded: SavedGame = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.state, state);
        assert_eq!(loaded.scene_image, saved.scene_image);
    }

    #[test]
    fn test_save_without_image_field_still_loads() {
        let saved = SavedGame::new(GameState::fresh(), None);
        let mut value = serde_json::to_value(&saved).unwrap();
        value.as_object_mut().unwrap().remove("scene_image");

        let loaded: SavedGame = serde_json::from_value(value).unwrap();
        assert!(loaded.scene_image.is_none());
    }
}
