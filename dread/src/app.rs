//! Main application state and logic

use std::path::PathBuf;

use dread_core::persist::CachedImage;
use dread_core::{GameState, TurnReport};
use tokio::sync::mpsc;

use crate::ui::theme::GameTheme;
use crate::worker::{WorkerRequest, WorkerResponse};

/// What a log entry is, for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Narration,
    PlayerAction,
    CompanionAction,
    Hint,
    System,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub kind: LogKind,
    pub content: String,
}

/// Overlay types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Help,
    Inventory,
}

/// Main application state
pub struct App {
    // Channel communication with the game worker
    pub request_tx: mpsc::Sender<WorkerRequest>,
    pub response_rx: mpsc::Receiver<WorkerResponse>,

    // Local snapshot of the game state for rendering
    pub game: GameState,

    // UI state
    pub theme: GameTheme,
    overlay: Option<Overlay>,
    pub log: Vec<LogEntry>,
    pub log_scroll: usize,
    pub scroll_locked_to_bottom: bool,
    pub selected_choice: usize,

    // The most recent scene illustration, kept for saves.
    pub scene_image: Option<CachedImage>,

    // Status
    status_message: Option<String>,
    pub should_quit: bool,

    // One request to the worker at a time.
    pub processing: bool,
    pub animation_frame: u8,
}

impl App {
    pub fn new(
        request_tx: mpsc::Sender<WorkerRequest>,
        response_rx: mpsc::Receiver<WorkerResponse>,
    ) -> Self {
        let mut app = Self {
            request_tx,
            response_rx,
            game: GameState::fresh(),
            theme: GameTheme::default(),
            overlay: None,
            log: Vec::new(),
            log_scroll: 0,
            scroll_locked_to_bottom: true,
            selected_choice: 0,
            scene_image: None,
            status_message: None,
            should_quit: false,
            processing: false,
            animation_frame: 0,
        };

        app.push_log(
            LogKind::System,
            "Press j/k to pick an action, Enter to act, '?' for help.".to_string(),
        );
        app
    }

    pub fn push_log(&mut self, kind: LogKind, content: String) {
        if content.is_empty() {
            return;
        }
        self.log.push(LogEntry { kind, content });
        if self.scroll_locked_to_bottom {
            self.scroll_to_bottom();
        }
    }

    /// Apply a new authoritative game state from the worker.
    pub fn apply_state(&mut self, state: GameState) {
        if self.selected_choice >= state.available_choices.len() {
            self.selected_choice = 0;
        }
        if let Some(ref error) = state.last_error {
            if self.game.last_error.as_deref() != Some(error.as_str()) {
                self.push_log(LogKind::System, format!("({error})"));
            }
        }
        self.game = state;
    }

    /// Append everything a resolved turn produced to the log.
    pub fn apply_report(&mut self, report: TurnReport) {
        self.push_log(LogKind::PlayerAction, format!("You: {}", report.player_choice));
        let companion = if report.companion_corrected {
            format!("Companion: {} (improvising)", report.companion_choice)
        } else {
            format!("Companion: {}", report.companion_choice)
        };
        self.push_log(LogKind::CompanionAction, companion);
        if let Some(hint) = report.companion_hint {
            self.push_log(LogKind::Hint, format!("Hint: {hint}"));
        }
        self.push_log(LogKind::Narration, report.narration);
        if report.player_lost_health {
            self.push_log(LogKind::System, "You are hurt.".to_string());
        }
        if report.companion_lost_health {
            self.push_log(LogKind::System, "Your companion is hurt.".to_string());
        }
        if report.game_over {
            self.push_log(
                LogKind::System,
                "The story has ended. Press 'r' to begin again.".to_string(),
            );
        }
    }

    // =========================================================================
    // Choice selection
    // =========================================================================

    pub fn select_previous(&mut self) {
        let count = self.game.available_choices.len();
        if count > 0 {
            self.selected_choice = self.selected_choice.checked_sub(1).unwrap_or(count - 1);
        }
    }

    pub fn select_next(&mut self) {
        let count = self.game.available_choices.len();
        if count > 0 {
            self.selected_choice = (self.selected_choice + 1) % count;
        }
    }

    pub fn selected_choice_text(&self) -> Option<&str> {
        self.game
            .available_choices
            .get(self.selected_choice)
            .map(String::as_str)
    }

    // =========================================================================
    // Worker requests
    // =========================================================================

    pub fn submit_selected_choice(&mut self) {
        if self.processing || !self.game.is_player_turn {
            return;
        }
        let Some(choice) = self.selected_choice_text().map(String::from) else {
            return;
        };
        self.processing = true;
        self.set_status("The dark considers your move...");
        if self
            .request_tx
            .try_send(WorkerRequest::SubmitChoice(choice))
            .is_err()
        {
            self.set_status("Worker busy, please wait...");
            self.processing = false;
        }
    }

    pub fn request_restart(&mut self) {
        if self.processing {
            return;
        }
        self.processing = true;
        self.log.clear();
        self.scene_image = None;
        self.set_status("Starting a new story...");
        if self.request_tx.try_send(WorkerRequest::Restart).is_err() {
            self.set_status("Worker busy, please wait...");
            self.processing = false;
        }
    }

    pub fn request_hint(&mut self) {
        if self.processing || self.game.is_game_over {
            return;
        }
        if self.request_tx.try_send(WorkerRequest::RequestHint).is_ok() {
            self.set_status("Your companion will share a hint with its next move.");
        }
    }

    pub fn request_save(&mut self, path: PathBuf) {
        if self.processing {
            return;
        }
        self.set_status("Saving...");
        let image = self.scene_image.clone();
        let _ = self.request_tx.try_send(WorkerRequest::Save(path, image));
    }

    pub fn request_load(&mut self, path: PathBuf) {
        if self.processing {
            return;
        }
        self.set_status("Loading...");
        let _ = self.request_tx.try_send(WorkerRequest::Load(path));
    }

    pub fn cancel_processing(&mut self) {
        if self.processing {
            let _ = self.request_tx.try_send(WorkerRequest::Cancel);
            self.set_status("Cancelling...");
        }
    }

    // =========================================================================
    // Scrolling
    // =========================================================================

    pub fn scroll_to_bottom(&mut self) {
        self.log_scroll = usize::MAX / 2;
        self.scroll_locked_to_bottom = true;
    }

    fn estimate_max_scroll(&self) -> usize {
        const ESTIMATED_WIDTH: usize = 60;
        const ESTIMATED_VISIBLE_HEIGHT: usize = 20;

        let estimated_lines: usize = self
            .log
            .iter()
            .map(|entry| {
                entry
                    .content
                    .lines()
                    .map(|line| (line.len() / ESTIMATED_WIDTH).max(1))
                    .sum::<usize>()
                    + 1
            })
            .sum();

        estimated_lines.saturating_sub(ESTIMATED_VISIBLE_HEIGHT)
    }

    pub fn scroll_up(&mut self, lines: usize) {
        let max_scroll = self.estimate_max_scroll();
        if self.log_scroll > max_scroll {
            self.log_scroll = max_scroll;
        }
        self.log_scroll = self.log_scroll.saturating_sub(lines);
        self.scroll_locked_to_bottom = false;
    }

    pub fn scroll_down(&mut self, lines: usize) {
        let max_scroll = self.estimate_max_scroll();
        self.log_scroll = self.log_scroll.saturating_add(lines).min(max_scroll + 100);
    }

    // =========================================================================
    // Overlays and status
    // =========================================================================

    pub fn overlay(&self) -> Option<Overlay> {
        self.overlay
    }

    pub fn toggle_help(&mut self) {
        self.overlay = match self.overlay {
            Some(Overlay::Help) => None,
            _ => Some(Overlay::Help),
        };
    }

    pub fn toggle_inventory(&mut self) {
        self.overlay = match self.overlay {
            Some(Overlay::Inventory) => None,
            _ => Some(Overlay::Inventory),
        };
    }

    pub fn close_overlay(&mut self) {
        self.overlay = None;
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn tick(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1);
    }
}
