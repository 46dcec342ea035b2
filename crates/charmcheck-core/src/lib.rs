//! # CharmCheck Core Library
//!
//! This library provides the core business logic for the CharmCheck
//! dating-readiness quiz funnel. The web front end is a thin presentation
//! layer over this crate: all scoring, report generation, session staging,
//! and unlock logic lives here and is testable without any UI framework.
//!
//! ## Architecture
//!
//! - **Scorer**: pure per-category scoring with traffic-light levels
//! - **Report Client**: generative-provider call with error classification,
//!   a deterministic fallback report, and an idempotence guard against
//!   duplicate triggers from the UI layer
//! - **Session**: a wall-clock-based state machine driving the
//!   hero -> quiz -> diagnosing -> result flow; the caller periodically
//!   invokes `tick()` for time-based transitions
//! - **Unlock Gate**: contact capture plus best-effort outbound relays
//!   (subscription endpoint and report-delivery webhook)
//!
//! ## Key Components
//!
//! - [`Session`]: funnel state machine
//! - [`ReportClient`]: provider call, fallback, and de-duplication
//! - [`ReportRelay`]: optimistic unlock relays
//! - [`scoring::score`]: pure answer-to-summary derivation

pub mod error;
pub mod events;
pub mod quiz;
pub mod report;
pub mod scoring;
pub mod session;
pub mod unlock;

pub use error::{CoreError, RelayError, ReportError, ValidationError};
pub use events::Event;
pub use quiz::{AnswerOption, AnswerSet, Category, Question};
pub use report::{Persona, Report, ReportClient, ReportOutcome, RequestOptions};
pub use scoring::{score, CategorySummary, Level, ScoreSummary};
pub use session::{Session, Stage};
pub use unlock::{ContactInfo, RelayState, ReportRelay};
