//! Prompt builders for the Gemini-backed engines.

use super::{CompanionRequest, NarrationRequest};
use crate::tier::HorrorTier;
use crate::vitals::{MAX_HEALTH, MAX_STAMINA};

/// The player's implicit first action, sent with the opening narration call.
pub const OPENING_PLAYER_ACTION: &str = "We've awakened in this dreadful place.";

/// The companion's implicit first action for the opening call.
pub const OPENING_COMPANION_ACTION: &str = "I sense danger. We must be cautious.";

/// Substituted when the companion must act but no offered choice is usable.
pub const FALLBACK_COMPANION_ACTION: &str = "Stay put and observe.";

/// System prompt for the narrator.
pub fn narrator_system_prompt() -> String {
    format!(
        "You are the master storyteller for a cooperative horror text adventure. \
         You weave a terrifying and unpredictable narrative, manage health, stamina, \
         and inventory for a human player and their AI companion, and present a fresh \
         challenge every turn. Max health is {MAX_HEALTH} for both. Max stamina is \
         {MAX_STAMINA} for both. The story opens at an old wooden fence gate by dark \
         woods, but every playthrough must diverge completely after the first turn. \
         Avoid repetition; be creative and unpredictable in scenes, challenges, and \
         events."
    )
}

/// Build the per-turn narration prompt.
pub fn build_narration_prompt(request: &NarrationRequest) -> String {
    let tier = HorrorTier::for_turn(request.turn_count);
    let inventory = if request.inventory.is_empty() {
        "Empty".to_string()
    } else {
        request.inventory.join(", ")
    };

    format!(
        r#"Current Turn: {turn}
Current Scene: {scene}
Player Health: {player_health}/{max_health}, Player Stamina: {player_stamina}/{max_stamina}
Companion Health: {companion_health}/{max_health}, Companion Stamina: {companion_stamina}/{max_stamina}
Inventory: {inventory}

Player's Choice: {player_choice}
Companion's Choice: {companion_choice}

GAMEPLAY DIRECTIVES:
1. Narrate the combined result of both choices. Be descriptive and evocative.
2. Describe the new scene and present a fresh, solvable challenge.
3. Stamina: a physically strenuous choice costs its actor 1 stamina. If an actor
   with 0 stamina attempts a strenuous action that is critical for immediate
   survival, the action fails from exhaustion and costs 1 health; if it was
   strenuous but not survival-critical, it simply fails with no health loss.
   An actor who did nothing strenuous recovers 1 stamina, up to the maximum.
4. Health: a reckless or foolish choice that directly leads to harm costs its
   actor 1 health. When anyone loses health, set the matching lost-health flag
   and state the reason for the loss clearly in the narration.
5. Inventory: if the narrative leads to discovering an item, set newItemFound to
   its name. If an action consumed a held item, set itemUsed to that item's
   name. Name items thematically for the current escalation level.
6. Set isGameOver to true only if either party's health reaches 0 or the story
   has conclusively ended; in that case the narration must reflect the ending
   dramatically.
7. Occasionally weave in rare hidden clues or cryptic details hinting at deeper
   lore.

ESCALATION ({tier_name}): {tier_guidance}

Report every updated health and stamina value."#,
        turn = request.turn_count,
        scene = request.scene_description,
        player_health = request.player_health,
        player_stamina = request.player_stamina,
        companion_health = request.companion_health,
        companion_stamina = request.companion_stamina,
        max_health = MAX_HEALTH,
        max_stamina = MAX_STAMINA,
        inventory = inventory,
        player_choice = request.player_choice,
        companion_choice = request.companion_choice,
        tier_name = tier,
        tier_guidance = tier.guidance(),
    )
}

/// System prompt for the companion.
pub fn companion_system_prompt() -> String {
    format!(
        "You are an AI companion in a cooperative horror text adventure. Your human \
         partner has already made their choice for this turn. Choose the ONE option \
         from the offered list that is most sensible or strategically sound for YOU, \
         and explain your reasoning concisely. Max health is {MAX_HEALTH}; be mindful \
         of your own condition, but an intelligent risk is sometimes necessary. You \
         must choose only from the offered list."
    )
}

/// Build the per-turn companion prompt.
pub fn build_companion_prompt(request: &CompanionRequest) -> String {
    let mut prompt = format!(
        "Your Health: {}/{MAX_HEALTH}. Your Stamina: {}/{MAX_STAMINA}.\n\nCurrent Scene:\n{}\n\nActions you can take:\n",
        request.companion_health, request.companion_stamina, request.scene_description,
    );

    for choice in &request.available_choices {
        prompt.push_str("- ");
        prompt.push_str(choice);
        prompt.push('\n');
    }

    if request.hint_requested {
        prompt.push_str(
            "\nYour partner is stuck. Along with your choice, include a short hint \
             nudging them toward a promising course of action without spoiling it.",
        );
    }

    prompt
}

/// Build the scene illustration prompt.
pub fn build_scene_image_prompt(scene_description: &str, turn_count: u32) -> String {
    let tier = HorrorTier::for_turn(turn_count);
    format!(
        "A dark, atmospheric horror illustration in a gritty painted style. \
         Escalation level: {tier}. Scene: {scene_description}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_narration_request() -> NarrationRequest {
        NarrationRequest {
            player_choice: "Investigate the noise".to_string(),
            companion_choice: "Stay put and observe.".to_string(),
            scene_description: "A rotting barn.".to_string(),
            player_health: 2,
            companion_health: 1,
            player_stamina: 3,
            companion_stamina: 0,
            turn_count: 12,
            inventory: vec!["Rusty Key".to_string()],
        }
    }

    #[test]
    fn test_narration_prompt_carries_state() {
        let prompt = build_narration_prompt(&sample_narration_request());
        assert!(prompt.contains("Current Turn: 12"));
        assert!(prompt.contains("A rotting barn."));
        assert!(prompt.contains("Rusty Key"));
        assert!(prompt.contains("Investigate the noise"));
        // Turn 12 sits in the disturbing tier.
        assert!(prompt.contains(&HorrorTier::Disturbing.guidance()[..40]));
    }

    #[test]
    fn test_companion_prompt_lists_choices() {
        let request = CompanionRequest {
            scene_description: "A flooded cellar.".to_string(),
            available_choices: vec!["Hide.".to_string(), "Run.".to_string()],
            companion_health: 2,
            companion_stamina: 3,
            hint_requested: false,
        };

        let prompt = build_companion_prompt(&request);
        assert!(prompt.contains("- Hide.\n"));
        assert!(prompt.contains("- Run.\n"));
        assert!(!prompt.contains("stuck"));
    }

    #[test]
    fn test_companion_prompt_hint_flag() {
        let request = CompanionRequest {
            scene_description: "A flooded cellar.".to_string(),
            available_choices: vec!["Hide.".to_string()],
            companion_health: 1,
            companion_stamina: 1,
            hint_requested: true,
        };

        assert!(build_companion_prompt(&request).contains("stuck"));
    }
}
