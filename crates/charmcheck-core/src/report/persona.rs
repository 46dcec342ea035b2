//! Static persona catalog.
//!
//! The report's persona id is chosen by the generative model (or the
//! fallback generator) out of a closed set. Lookup never fails: an
//! unrecognized id resolves to the designated default entry.

use serde::Serialize;

/// Persona id the model must pick when the total score clears the
/// top-tier cutoff.
pub const TOP_TIER_ID: &str = "charmer";

/// Persona id used by the fallback generator for non-top-tier totals.
pub const FALLBACK_ID: &str = "neighbor";

/// A catalog entry. Immutable, known at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Persona {
    pub id: &'static str,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub tags: [&'static str; 3],
    pub image_url: &'static str,
}

/// The closed persona set, in catalog order. The last entry doubles as the
/// default for unrecognized ids.
pub static PERSONAS: [Persona; 6] = [
    Persona {
        id: "charmer",
        title: "The Natural Charmer",
        subtitle: "Top-tier presence. Your only job is to use it well.",
        tags: ["magnetic", "balanced", "ready"],
        image_url: "https://cdn.charmcheck.app/personas/charmer.jpg",
    },
    Persona {
        id: "statue",
        title: "The Polished Statue",
        subtitle: "Looks the part, rarely steps off the pedestal.",
        tags: ["well-groomed", "reserved", "waiting"],
        image_url: "https://cdn.charmcheck.app/personas/statue.jpg",
    },
    Persona {
        id: "hustler",
        title: "The Relentless Hustler",
        subtitle: "Plenty of motion, not enough polish.",
        tags: ["proactive", "rough-edged", "persistent"],
        image_url: "https://cdn.charmcheck.app/personas/hustler.jpg",
    },
    Persona {
        id: "neighbor",
        title: "The Friendly Neighbor",
        subtitle: "Everyone likes you. Nobody is dating you.",
        tags: ["likeable", "safe", "invisible"],
        image_url: "https://cdn.charmcheck.app/personas/neighbor.jpg",
    },
    Persona {
        id: "sage",
        title: "The Overthinking Sage",
        subtitle: "Knows every theory, runs no experiments.",
        tags: ["analytical", "cautious", "stalled"],
        image_url: "https://cdn.charmcheck.app/personas/sage.jpg",
    },
    Persona {
        id: "pioneer",
        title: "The Untapped Pioneer",
        subtitle: "Unshaped potential, everything still ahead.",
        tags: ["raw", "open", "early"],
        image_url: "https://cdn.charmcheck.app/personas/pioneer.jpg",
    },
];

/// The catalog entry used for unrecognized persona ids.
pub fn default_persona() -> &'static Persona {
    &PERSONAS[PERSONAS.len() - 1]
}

/// Resolve a persona id as returned by the model.
///
/// Ids are normalized (lowercased, trimmed) before lookup; anything outside
/// the closed set resolves to [`default_persona`].
pub fn resolve(id: &str) -> &'static Persona {
    let normalized = id.trim().to_lowercase();
    PERSONAS
        .iter()
        .find(|p| p.id == normalized)
        .unwrap_or_else(default_persona)
}

/// All valid ids, for embedding in the model instruction.
pub fn all_ids() -> Vec<&'static str> {
    PERSONAS.iter().map(|p| p.id).collect()
}
