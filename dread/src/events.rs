//! Event handling for the Dual Dread TUI

use std::path::PathBuf;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::App;

const DEFAULT_SAVE: &str = "dread-save.json";

/// Result of handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Continue,
    Quit,
    NeedsRedraw,
}

/// Handle a terminal event
pub fn handle_event(app: &mut App, event: Event) -> EventResult {
    match event {
        Event::Key(key) => handle_key_event(app, key),
        Event::Mouse(mouse) => handle_mouse_event(app, mouse),
        Event::Resize(_, _) => EventResult::NeedsRedraw,
        _ => EventResult::Continue,
    }
}

fn handle_mouse_event(app: &mut App, mouse: MouseEvent) -> EventResult {
    match mouse.kind {
        MouseEventKind::ScrollUp => {
            app.scroll_up(3);
            EventResult::NeedsRedraw
        }
        MouseEventKind::ScrollDown => {
            app.scroll_down(3);
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

fn handle_key_event(app: &mut App, key: KeyEvent) -> EventResult {
    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
        return EventResult::Quit;
    }

    if app.has_overlay() {
        return handle_overlay_key(app, key);
    }

    match key.code {
        KeyCode::Char('q') => EventResult::Quit,

        // Choice selection
        KeyCode::Up | KeyCode::Char('k') => {
            app.select_previous();
            EventResult::NeedsRedraw
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.select_next();
            EventResult::NeedsRedraw
        }
        KeyCode::Char(c @ '1'..='3') => {
            let index = (c as usize) - ('1' as usize);
            if index < app.game.available_choices.len() {
                app.selected_choice = index;
                app.submit_selected_choice();
            }
            EventResult::NeedsRedraw
        }
        KeyCode::Enter => {
            app.submit_selected_choice();
            EventResult::NeedsRedraw
        }

        // Log scrolling
        KeyCode::PageUp => {
            app.scroll_up(10);
            EventResult::NeedsRedraw
        }
        KeyCode::PageDown => {
            app.scroll_down(10);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('G') => {
            app.scroll_to_bottom();
            EventResult::NeedsRedraw
        }

        // Game actions
        KeyCode::Char('h') => {
            app.request_hint();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('r') => {
            app.request_restart();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('c') => {
            app.cancel_processing();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('s') => {
            app.request_save(PathBuf::from(DEFAULT_SAVE));
            EventResult::NeedsRedraw
        }
        KeyCode::Char('l') => {
            app.request_load(PathBuf::from(DEFAULT_SAVE));
            EventResult::NeedsRedraw
        }

        // Overlays
        KeyCode::Char('?') => {
            app.toggle_help();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('i') => {
            app.toggle_inventory();
            EventResult::NeedsRedraw
        }

        _ => EventResult::Continue,
    }
}

fn handle_overlay_key(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') | KeyCode::Enter => {
            app.close_overlay();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('i') => {
            app.close_overlay();
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::WorkerRequest;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use tokio::sync::mpsc;

    fn test_app() -> (App, mpsc::Receiver<WorkerRequest>) {
        let (request_tx, request_rx) = mpsc::channel(8);
        let (_response_tx, response_rx) = mpsc::channel(8);
        (App::new(request_tx, response_rx), request_rx)
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn test_quit_keys() {
        let (mut app, _rx) = test_app();
        assert_eq!(handle_event(&mut app, key(KeyCode::Char('q'))), EventResult::Quit);

        let ctrl_c = Event::Key(KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        });
        assert_eq!(handle_event(&mut app, ctrl_c), EventResult::Quit);
    }

    #[test]
    fn test_selection_wraps_around_choices() {
        let (mut app, _rx) = test_app();
        app.game.available_choices = vec!["a".into(), "b".into(), "c".into()];

        handle_event(&mut app, key(KeyCode::Char('k')));
        assert_eq!(app.selected_choice, 2);
        handle_event(&mut app, key(KeyCode::Char('j')));
        assert_eq!(app.selected_choice, 0);
    }

    #[test]
    fn test_enter_sends_the_selected_choice() {
        let (mut app, mut rx) = test_app();
        app.game.available_choices = vec!["open the gate".into()];
        app.game.is_player_turn = true;

        handle_event(&mut app, key(KeyCode::Enter));

        assert!(app.processing);
        match rx.try_recv() {
            Ok(WorkerRequest::SubmitChoice(choice)) => assert_eq!(choice, "open the gate"),
            other => panic!("expected a submit request, got {other:?}"),
        }
    }

    #[test]
    fn test_enter_is_ignored_while_processing() {
        let (mut app, mut rx) = test_app();
        app.game.available_choices = vec!["wait".into()];
        app.game.is_player_turn = true;
        app.processing = true;

        handle_event(&mut app, key(KeyCode::Enter));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_help_overlay_toggles_and_swallows_keys() {
        let (mut app, mut rx) = test_app();
        handle_event(&mut app, key(KeyCode::Char('?')));
        assert!(app.has_overlay());

        // Game hotkeys are inert under an overlay.
        handle_event(&mut app, key(KeyCode::Char('r')));
        assert!(rx.try_recv().is_err());

        handle_event(&mut app, key(KeyCode::Esc));
        assert!(!app.has_overlay());
    }
}
