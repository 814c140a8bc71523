//! Dual Dread TUI application.
//!
//! A two-character cooperative horror adventure in the terminal. You pick an
//! action each turn, an AI companion picks its own, and an AI narrator
//! resolves them both into the next beat of the story.

mod app;
mod events;
mod ui;
mod worker;

use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dread_core::coordinator::TurnCoordinator;
use dread_core::engine::{GeminiArtist, GeminiCompanion, GeminiNarrator, SceneArtist};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout};
use tokio::sync::mpsc;

use app::App;
use events::{handle_event, EventResult};
use ui::render::render;
use worker::{Worker, WorkerRequest, WorkerResponse};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    if std::env::var("GEMINI_API_KEY").is_err() {
        eprintln!("Error: GEMINI_API_KEY environment variable not set.");
        eprintln!("Please set it in .env file or with: export GEMINI_API_KEY=your_key_here");
        std::process::exit(1);
    }

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }
    let no_images = args.iter().any(|a| a == "--no-images");

    let client = gemini::Gemini::from_env()?;
    let coordinator = TurnCoordinator::new(
        GeminiCompanion::new(client.clone()),
        GeminiNarrator::new(client.clone()),
    );
    let artist: Option<Arc<dyn SceneArtist>> = if no_images {
        None
    } else {
        Some(Arc::new(GeminiArtist::new(client)))
    };

    let (request_tx, request_rx) = mpsc::channel::<WorkerRequest>(8);
    let (response_tx, response_rx) = mpsc::channel::<WorkerResponse>(32);
    tokio::spawn(Worker::new(coordinator, artist, request_rx, response_tx).run());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(request_tx, response_rx);
    app.request_restart();
    let result = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;

    if let Err(e) = result {
        eprintln!("Error: {e}");
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
) -> io::Result<()> {
    loop {
        // Drain worker responses before drawing.
        while let Ok(response) = app.response_rx.try_recv() {
            apply_response(&mut app, response);
        }

        terminal.draw(|f| render(f, &app))?;

        // Poll for events with a timeout so the spinner keeps moving.
        if event::poll(Duration::from_millis(100))? {
            let ev = event::read()?;
            match handle_event(&mut app, ev) {
                EventResult::Quit => return Ok(()),
                EventResult::NeedsRedraw | EventResult::Continue => {}
            }
        } else {
            app.tick();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn apply_response(app: &mut App, response: WorkerResponse) {
    match response {
        WorkerResponse::StateChanged(state) => {
            let was_empty = app.log.iter().all(|e| e.kind == app::LogKind::System);
            // The opening narration is not part of any turn report.
            if was_empty && !state.narration.is_empty() {
                app.push_log(app::LogKind::Narration, state.narration.clone());
            }
            app.apply_state(state);
            app.processing = false;
            app.clear_status();
        }
        WorkerResponse::TurnResolved(report) => {
            app.apply_report(report);
        }
        WorkerResponse::SceneImage(image) => {
            app.scene_image = Some(image);
        }
        WorkerResponse::Saved(path) => {
            app.set_status(format!("Saved to {}", path.display()));
        }
        WorkerResponse::Loaded(path) => {
            app.log.clear();
            app.scene_image = None;
            app.set_status(format!("Loaded from {}", path.display()));
        }
        WorkerResponse::Error(message) => {
            app.processing = false;
            app.set_status(message);
        }
    }
}

fn print_help() {
    println!("Dual Dread - cooperative AI horror adventure");
    println!();
    println!("USAGE:");
    println!("  dread [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -h, --help     Show this help message");
    println!("  --no-images    Skip scene illustration requests");
    println!();
    println!("KEYS:");
    println!("  j/k or arrows  Select an action");
    println!("  1-3            Act immediately");
    println!("  Enter          Act on the selection");
    println!("  h              Ask your companion for a hint");
    println!("  c              Cancel a turn in flight");
    println!("  r              Restart the story");
    println!("  s / l          Save / load dread-save.json");
    println!("  q or Ctrl-C    Quit");
}
