//! Personalized report: wire shape, persona catalog, prompt construction,
//! and the generative-provider client.

pub mod client;
pub mod persona;
pub mod prompt;

use serde::{Deserialize, Serialize};

use crate::quiz::Category;

pub use client::{ReportClient, ReportOutcome, RequestOptions};
pub use persona::Persona;

/// The structured report, in the provider's wire shape.
///
/// Produced either by the external model (parsed from its JSON payload) or
/// by the deterministic fallback generator. Immutable once set on a session;
/// replaced wholesale on retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Persona id, expected from the closed set but trusted as returned.
    pub selected_persona_id: String,
    /// Why this persona fits, grounded in the actual answers.
    pub persona_explanation: String,
    /// One-line summary of the current situation.
    pub persona_overview: String,
    pub appearance_analysis: String,
    pub social_analysis: String,
    pub interaction_analysis: String,
    pub mindset_analysis: String,
    /// The coach's closing strategic advice.
    pub coach_general_advice: String,
}

impl Report {
    /// Resolve the persona id against the static catalog.
    pub fn persona(&self) -> &'static Persona {
        persona::resolve(&self.selected_persona_id)
    }

    /// The per-category analysis paragraph for the given category.
    pub fn analysis_for(&self, category: Category) -> &str {
        match category {
            Category::Appearance => &self.appearance_analysis,
            Category::SocialPresence => &self.social_analysis,
            Category::Interaction => &self.interaction_analysis,
            Category::Mindset => &self.mindset_analysis,
        }
    }
}
