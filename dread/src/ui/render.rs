//! Render orchestration for the Dual Dread TUI

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use dread_core::tier::HorrorTier;
use dread_core::vitals::{MAX_HEALTH, MAX_STAMINA};

use crate::app::{App, LogKind, Overlay};

const SPINNER_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(5),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    render_title_bar(frame, app, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(rows[1]);

    render_log(frame, app, columns[0]);
    render_party_panel(frame, app, columns[1]);
    render_choices(frame, app, rows[2]);
    render_status_bar(frame, app, rows[3]);
    render_hotkey_bar(frame, app, rows[4]);

    if let Some(overlay) = app.overlay() {
        render_overlay(frame, app, overlay, area);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let tier = HorrorTier::for_turn(app.game.turn_count);
    let mut spans = vec![
        Span::styled(
            " DUAL DREAD ",
            Style::default()
                .fg(app.theme.game_over)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("turn {} ", app.game.turn_count),
            Style::default().fg(app.theme.system_text),
        ),
        Span::styled(format!("[{tier}]"), Style::default().fg(app.theme.challenge_text)),
    ];
    if app.processing {
        let spinner = SPINNER_FRAMES[(app.animation_frame as usize / 2) % SPINNER_FRAMES.len()];
        spans.push(Span::styled(
            format!(" {spinner}"),
            Style::default().fg(app.theme.system_text),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_log(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    for entry in &app.log {
        let style = match entry.kind {
            LogKind::Narration => Style::default().fg(app.theme.narration_text),
            LogKind::PlayerAction => Style::default().fg(app.theme.player_text),
            LogKind::CompanionAction => Style::default().fg(app.theme.companion_text),
            LogKind::Hint => Style::default().fg(app.theme.hint_text),
            LogKind::System => Style::default()
                .fg(app.theme.system_text)
                .add_modifier(Modifier::ITALIC),
        };
        for raw in entry.content.lines() {
            lines.push(Line::from(Span::styled(raw.to_string(), style)));
        }
        lines.push(Line::default());
    }

    if !app.game.challenge.is_empty() && !app.game.is_game_over {
        lines.push(Line::from(Span::styled(
            format!("Challenge: {}", app.game.challenge),
            Style::default()
                .fg(app.theme.challenge_text)
                .add_modifier(Modifier::BOLD),
        )));
    }
    if app.game.is_game_over {
        lines.push(Line::from(Span::styled(
            "T H E   E N D",
            Style::default()
                .fg(app.theme.game_over)
                .add_modifier(Modifier::BOLD),
        )));
    }

    // Clamp the scroll to the rendered content.
    let inner_height = area.height.saturating_sub(2) as usize;
    let max_scroll = lines.len().saturating_sub(inner_height);
    let scroll = if app.scroll_locked_to_bottom {
        max_scroll
    } else {
        app.log_scroll.min(max_scroll)
    };

    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border))
                .title(" The Story So Far "),
        )
        .wrap(Wrap { trim: false })
        .scroll((scroll as u16, 0));
    frame.render_widget(widget, area);
}

fn vitals_line<'a>(
    app: &App,
    label: &'a str,
    health: u8,
    stamina: u8,
) -> Line<'a> {
    let health_color = if health <= 1 {
        app.theme.health_low
    } else {
        app.theme.health_full
    };
    let hearts: String = (0..MAX_HEALTH)
        .map(|i| if i < health { "\u{2665} " } else { "\u{2661} " })
        .collect();
    let pips: String = (0..MAX_STAMINA)
        .map(|i| if i < stamina { "\u{25c6} " } else { "\u{25c7} " })
        .collect();

    Line::from(vec![
        Span::styled(format!("{label:<10}"), Style::default().fg(app.theme.foreground)),
        Span::styled(hearts, Style::default().fg(health_color)),
        Span::styled(pips, Style::default().fg(app.theme.stamina)),
    ])
}

fn render_party_panel(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![
        vitals_line(app, "You", app.game.player_health, app.game.player_stamina),
        vitals_line(
            app,
            "Companion",
            app.game.companion_health,
            app.game.companion_stamina,
        ),
        Line::default(),
    ];

    lines.push(Line::from(Span::styled(
        "Inventory",
        Style::default()
            .fg(app.theme.foreground)
            .add_modifier(Modifier::BOLD),
    )));
    if app.game.inventory.is_empty() {
        lines.push(Line::from(Span::styled(
            "  (nothing)",
            Style::default().fg(app.theme.system_text),
        )));
    } else {
        for item in &app.game.inventory {
            lines.push(Line::from(Span::styled(
                format!("  {item}"),
                Style::default().fg(app.theme.foreground),
            )));
        }
    }

    if let Some(ref hint) = app.game.companion_hint {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!("Hint: {hint}"),
            Style::default().fg(app.theme.hint_text),
        )));
    }

    if app.scene_image.is_some() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "A scene illustration is attached.",
            Style::default().fg(app.theme.system_text),
        )));
    }

    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border))
                .title(" The Party "),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

fn render_choices(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .game
        .available_choices
        .iter()
        .enumerate()
        .map(|(i, choice)| ListItem::new(format!("{}. {choice}", i + 1)))
        .collect();

    let title = if app.game.is_game_over {
        " No Way Forward "
    } else if app.game.is_player_turn {
        " Your Move "
    } else {
        " Waiting "
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border_focused))
                .title(title),
        )
        .highlight_style(
            Style::default()
                .fg(app.theme.choice_selected)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !app.game.available_choices.is_empty() {
        state.select(Some(app.selected_choice));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let message = app.status_message().unwrap_or("");
    frame.render_widget(
        Paragraph::new(Span::styled(
            message,
            Style::default().fg(app.theme.system_text),
        )),
        area,
    );
}

fn render_hotkey_bar(frame: &mut Frame, app: &App, area: Rect) {
    let keys = "j/k select | Enter act | h hint | r restart | c cancel | s save | l load | i inventory | ? help | q quit";
    frame.render_widget(
        Paragraph::new(Span::styled(keys, Style::default().fg(app.theme.system_text)))
            .alignment(Alignment::Center),
        area,
    );
}

fn render_overlay(frame: &mut Frame, app: &App, overlay: Overlay, area: Rect) {
    let popup = centered_rect(60, 50, area);
    frame.render_widget(Clear, popup);

    let (title, lines) = match overlay {
        Overlay::Help => (
            " Help ",
            vec![
                Line::from("Pick one of the three actions each turn; your"),
                Line::from("companion chooses its own. The story, wounds and"),
                Line::from("finds come back from the narrator."),
                Line::default(),
                Line::from("j/k, Up/Down  select an action"),
                Line::from("1-3           act immediately"),
                Line::from("Enter         act on the selection"),
                Line::from("h             ask your companion for a hint"),
                Line::from("c             cancel a turn in flight"),
                Line::from("r             restart the story"),
                Line::from("s / l         save / load"),
                Line::from("q, Ctrl-C     quit"),
            ],
        ),
        Overlay::Inventory => {
            let mut lines = Vec::new();
            if app.game.inventory.is_empty() {
                lines.push(Line::from("Your pockets are empty."));
            } else {
                for item in &app.game.inventory {
                    lines.push(Line::from(format!("- {item}")));
                }
            }
            (" Inventory ", lines)
        }
    };

    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border_focused))
                .title(title),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, popup);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}
