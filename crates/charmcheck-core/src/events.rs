use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::quiz::Category;
use crate::session::Stage;

/// Every state change in the funnel produces an Event.
/// The presentation layer polls for these and animates accordingly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    StageChanged {
        from: Stage,
        to: Stage,
        at: DateTime<Utc>,
    },
    /// A category intro screen is now showing.
    IntroShown {
        category: Category,
        question_index: usize,
        at: DateTime<Utc>,
    },
    AnswerRecorded {
        question_id: u32,
        value: i32,
        at: DateTime<Utc>,
    },
    QuestionAdvanced {
        question_index: usize,
        at: DateTime<Utc>,
    },
    QuestionRewound {
        question_index: usize,
        at: DateTime<Utc>,
    },
    /// A report arrived (provider or fallback) and progress snapped to 100.
    ReportReady {
        persona_id: String,
        at: DateTime<Utc>,
    },
    /// A classified provider error was recorded; progress is frozen and the
    /// remediation panel takes over.
    ReportFailed {
        message: String,
        needs_key: bool,
        at: DateTime<Utc>,
    },
    Unlocked {
        at: DateTime<Utc>,
    },
    SessionReset {
        at: DateTime<Utc>,
    },
    /// Full snapshot of the observable session state.
    StateSnapshot {
        stage: Stage,
        question_index: usize,
        intro_mode: bool,
        answered: usize,
        progress_pct: f64,
        unlocked: bool,
        at: DateTime<Utc>,
    },
}
