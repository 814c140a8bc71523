//! Color theme and styling for the Dual Dread TUI

use ratatui::style::Color;

/// Game UI color theme
#[derive(Debug, Clone)]
pub struct GameTheme {
    pub foreground: Color,
    pub border: Color,
    pub border_focused: Color,

    pub health_full: Color,
    pub health_low: Color,
    pub stamina: Color,

    pub narration_text: Color,
    pub player_text: Color,
    pub companion_text: Color,
    pub hint_text: Color,
    pub system_text: Color,
    pub challenge_text: Color,

    pub choice_selected: Color,
    pub game_over: Color,
}

impl Default for GameTheme {
    fn default() -> Self {
        Self {
            foreground: Color::White,
            border: Color::DarkGray,
            border_focused: Color::Red,

            health_full: Color::Red,
            health_low: Color::LightRed,
            stamina: Color::Yellow,

            narration_text: Color::Gray,
            player_text: Color::Cyan,
            companion_text: Color::Magenta,
            hint_text: Color::Green,
            system_text: Color::DarkGray,
            challenge_text: Color::LightYellow,

            choice_selected: Color::Red,
            game_over: Color::LightRed,
        }
    }
}
