//! The pool of player-selectable actions.
//!
//! Choices are not derived from the narrative; they are drawn from a fixed
//! pool and shuffled, rotating with the turn count so consecutive turns
//! don't present the same slice. The RNG is seedable so tests can pin the
//! selection.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// How many actions are offered each turn.
pub const CHOICES_PER_TURN: usize = 3;

/// The built-in action pool.
pub const DEFAULT_ACTIONS: [&str; 6] = [
    "Cautiously investigate the immediate surroundings.",
    "Try to find a way out of this area.",
    "Communicate with your companion about the situation.",
    "Listen carefully for any sounds or clues.",
    "Search for any useful items nearby.",
    "Examine the most unsettling feature of the room.",
];

/// Generator of each turn's selectable actions.
pub struct ChoicePool {
    pool: Vec<String>,
    rng: StdRng,
}

impl ChoicePool {
    /// Create a pool with the built-in actions and an entropy-seeded RNG.
    pub fn new() -> Self {
        Self::with_pool(DEFAULT_ACTIONS.iter().map(|s| s.to_string()).collect())
    }

    /// Create a pool with custom actions.
    pub fn with_pool(pool: Vec<String>) -> Self {
        Self {
            pool,
            rng: StdRng::from_entropy(),
        }
    }

    /// Pin the RNG for deterministic selection.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// The underlying action pool.
    pub fn pool(&self) -> &[String] {
        &self.pool
    }

    /// Produce the actions offered for the given turn.
    ///
    /// Guarantees [`CHOICES_PER_TURN`] entries whenever the pool is non-empty:
    /// distinct entries when the pool has enough, padded by cycling from the
    /// pool start otherwise. An empty pool yields an empty list.
    pub fn next_choices(&mut self, turn_count: u32) -> Vec<String> {
        let mut distinct: Vec<&str> = Vec::new();
        for entry in &self.pool {
            if !distinct.contains(&entry.as_str()) {
                distinct.push(entry);
            }
        }

        if distinct.is_empty() {
            return Vec::new();
        }

        // Rotate with the turn so successive turns walk the pool, then
        // shuffle so the slice itself isn't predictable.
        let offset = (turn_count as usize * CHOICES_PER_TURN) % distinct.len();
        distinct.rotate_left(offset);
        distinct.shuffle(&mut self.rng);

        let mut choices: Vec<String> = distinct
            .iter()
            .take(CHOICES_PER_TURN)
            .map(|s| s.to_string())
            .collect();

        // Pad by cycling the pool from the start.
        let mut cycle = self.pool.iter().cycle();
        while choices.len() < CHOICES_PER_TURN {
            if let Some(entry) = cycle.next() {
                choices.push(entry.clone());
            }
        }

        choices
    }
}

impl Default for ChoicePool {
    fn default() -> Self {
        Self::new()
    }
}
