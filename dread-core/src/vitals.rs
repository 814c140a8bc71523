//! Vitals clamping and terminal-state derivation.
//!
//! The narrator is an untrusted generator: it may return vitals that are
//! negative, too large, or nonsensical. Everything it reports passes through
//! these functions before being committed to game state.

/// Maximum health for both the player and the companion.
pub const MAX_HEALTH: u8 = 2;

/// Maximum stamina for both the player and the companion.
pub const MAX_STAMINA: u8 = 3;

/// Clamp a reported health value into `[0, MAX_HEALTH]`.
pub fn clamp_health(value: i64) -> u8 {
    value.clamp(0, MAX_HEALTH as i64) as u8
}

/// Clamp a reported stamina value into `[0, MAX_STAMINA]`.
pub fn clamp_stamina(value: i64) -> u8 {
    value.clamp(0, MAX_STAMINA as i64) as u8
}

/// Whether the game is over, given clamped vitals and the narrator's own flag.
///
/// Either party at zero health is always game over, regardless of what the
/// narrator asserted. The narrator may additionally force an ending while
/// vitals are still positive (narrative-driven endings).
pub fn derive_game_over(player_health: u8, companion_health: u8, engine_asserted: bool) -> bool {
    player_health == 0 || companion_health == 0 || engine_asserted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_health_range() {
        assert_eq!(clamp_health(-5), 0);
        assert_eq!(clamp_health(0), 0);
        assert_eq!(clamp_health(1), 1);
        assert_eq!(clamp_health(2), 2);
        assert_eq!(clamp_health(99), MAX_HEALTH);
    }

    #[test]
    fn test_clamp_stamina_range() {
        assert_eq!(clamp_stamina(-1), 0);
        assert_eq!(clamp_stamina(3), 3);
        assert_eq!(clamp_stamina(1000), MAX_STAMINA);
    }

    #[test]
    fn test_game_over_from_zero_health() {
        // The engine's denial cannot override a dead party member.
        assert!(derive_game_over(0, 2, false));
        assert!(derive_game_over(2, 0, false));
        assert!(derive_game_over(0, 0, false));
    }

    #[test]
    fn test_game_over_from_engine_assertion() {
        assert!(derive_game_over(2, 2, true));
        assert!(!derive_game_over(2, 2, false));
        assert!(!derive_game_over(1, 1, false));
    }
}
