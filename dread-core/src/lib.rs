//! Dual Dread game engine.
//!
//! A two-character cooperative horror adventure in which every turn is
//! narrated by a language model. This crate holds the rules: the turn
//! state machine, vitals clamping, the rotating choice pool, escalation
//! tiers, persistence, and the engine seams behind which the Gemini
//! implementations (or test doubles) sit. Presentation lives elsewhere.
//!
//! The usual shape of a caller:
//!
//! ```no_run
//! use dread_core::coordinator::TurnCoordinator;
//! use dread_core::engine::{GeminiCompanion, GeminiNarrator};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = gemini::Gemini::from_env()?;
//! let mut game = TurnCoordinator::new(
//!     GeminiCompanion::new(client.clone()),
//!     GeminiNarrator::new(client),
//! );
//! game.restart().await?;
//! let choice = game.state().available_choices[0].clone();
//! let report = game.submit_player_choice(&choice).await?;
//! println!("{}", report.narration);
//! # Ok(())
//! # }
//! ```

pub mod choices;
pub mod coordinator;
pub mod engine;
pub mod persist;
pub mod state;
pub mod testing;
pub mod tier;
pub mod vitals;

pub use coordinator::{TurnCoordinator, TurnError, TurnPhase, TurnReport};
pub use state::{GameState, StateError, StateStore};
