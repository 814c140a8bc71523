//! Progressive horror escalation.
//!
//! Escalation is a pure function of the turn count and is realized entirely
//! as guidance text attached to the narration prompt. The turn machinery
//! never branches on the tier beyond selecting which text to send, so the
//! pacing can be retuned without touching the state machine.

use std::fmt;

/// Named escalation tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorrorTier {
    /// Turns 1-4: atmospheric B-movie horror.
    BMovie,
    /// Turns 5-9: psychological, ambiguous threats.
    RisingTension,
    /// Turns 10-14: genuinely disturbing, active threats.
    Disturbing,
    /// Turns 15+: cosmic dread, surreal nightmares.
    Cosmic,
}

impl HorrorTier {
    /// The tier in effect for a given turn.
    pub fn for_turn(turn_count: u32) -> Self {
        match turn_count {
            0..=4 => HorrorTier::BMovie,
            5..=9 => HorrorTier::RisingTension,
            10..=14 => HorrorTier::Disturbing,
            _ => HorrorTier::Cosmic,
        }
    }

    /// Tone/threat/item-rarity guidance fed to the narrator.
    pub fn guidance(&self) -> &'static str {
        match self {
            HorrorTier::BMovie => {
                "Tone: atmospheric B-movie horror. Threats stay indirect; build unease \
                 through shadows, fog, and creaking sounds. Items found are simple and \
                 mundane (a flashlight, a crowbar)."
            }
            HorrorTier::RisingTension => {
                "Tone: rising psychological tension. Threats become direct but ambiguous. \
                 Surroundings show decay and strange symbols; weave in subtle clues about \
                 the place. Items found are specific and strange (a child's doll, a \
                 bloodstained note)."
            }
            HorrorTier::Disturbing => {
                "Tone: genuinely disturbing horror. Introduce complex, terrifying entities \
                 and wrong geometry; the threat is active and hunting. Reveal impactful, \
                 unsettling truths. Items found are powerful, cursed, or highly \
                 specialized (a ritual dagger, an alien device)."
            }
            HorrorTier::Cosmic => {
                "Tone: extreme and creative horror. Cosmic dread, body horror, surreal \
                 nightmares, impossible geometries, sanity-bending events. Items found \
                 are very powerful, dangerous, or reality-altering. Hint at inescapable \
                 cycles and the horrifying nature of this place."
            }
        }
    }
}

impl fmt::Display for HorrorTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HorrorTier::BMovie => "B-Horror Intro",
            HorrorTier::RisingTension => "Rising Tension",
            HorrorTier::Disturbing => "Disturbing Horror",
            HorrorTier::Cosmic => "Extreme & Creative Horror",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(HorrorTier::for_turn(1), HorrorTier::BMovie);
        assert_eq!(HorrorTier::for_turn(4), HorrorTier::BMovie);
        assert_eq!(HorrorTier::for_turn(5), HorrorTier::RisingTension);
        assert_eq!(HorrorTier::for_turn(9), HorrorTier::RisingTension);
        assert_eq!(HorrorTier::for_turn(10), HorrorTier::Disturbing);
        assert_eq!(HorrorTier::for_turn(14), HorrorTier::Disturbing);
        assert_eq!(HorrorTier::for_turn(15), HorrorTier::Cosmic);
        assert_eq!(HorrorTier::for_turn(200), HorrorTier::Cosmic);
    }

    #[test]
    fn test_guidance_is_distinct_per_tier() {
        let tiers = [
            HorrorTier::BMovie,
            HorrorTier::RisingTension,
            HorrorTier::Disturbing,
            HorrorTier::Cosmic,
        ];
        for (i, a) in tiers.iter().enumerate() {
            for b in &tiers[i + 1..] {
                assert_ne!(a.guidance(), b.guidance());
            }
        }
    }
}
