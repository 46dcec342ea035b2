//! Funnel state machine.
//!
//! The session is a wall-clock-based state machine. It does not use
//! internal threads or timers - the caller is responsible for calling
//! `tick()` periodically, and every time-based behavior (answer
//! auto-advance, simulated progress, result pause) derives from wall-clock
//! deltas. Restart discards the timing fields outright, so nothing can fire
//! after the session has been torn down.
//!
//! ## Stage Transitions
//!
//! ```text
//! Hero -> Quiz -> Diagnosing -> Result
//! ```
//!
//! `Result` additionally carries an `unlocked` flag that only transitions
//! false -> true. The diagnosing stage invokes no network call itself; the
//! caller checks [`Session::needs_report`] and drives a [`ReportClient`],
//! whose guard de-duplicates however many times that happens.
//!
//! [`ReportClient`]: crate::report::ReportClient

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, ValidationError};
use crate::events::Event;
use crate::quiz::{question_bank, AnswerSet, Question, GROUP_SIZE};
use crate::report::Report;
use crate::scoring::{self, ScoreSummary};
use crate::unlock::ContactInfo;

/// Delay between recording an answer and auto-advancing, in milliseconds.
/// Re-entrant selections are dropped while the advance is pending.
pub const ANSWER_ADVANCE_MS: u64 = 250;

/// Pause between progress snapping to 100 and the transition to `Result`.
pub const RESULT_PAUSE_MS: u64 = 300;

/// Simulated progress starting value.
pub const PROGRESS_START: f64 = 1.0;

/// Simulated progress never exceeds this on its own; only a report arrival
/// snaps it to 100.
pub const PROGRESS_CEILING: f64 = 98.0;

/// Simulated progress growth: 0.8 per 100 ms of wall-clock time.
const PROGRESS_RATE_PER_MS: f64 = 0.008;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Hero,
    Quiz,
    Diagnosing,
    Result,
}

/// The top-level session aggregate. Owned exclusively by the UI layer;
/// nothing in it survives a page reload.
#[derive(Debug, Clone)]
pub struct Session {
    stage: Stage,
    current_idx: usize,
    intro_mode: bool,
    answers: AnswerSet,
    report: Option<Report>,
    report_error: Option<ReportError>,
    unlocked: bool,
    contact: Option<ContactInfo>,
    progress: f64,
    /// Epoch ms when diagnosing (re)started; progress base.
    diagnosing_since_ms: Option<u64>,
    /// Epoch ms when the report arrived; result-pause base.
    report_arrived_ms: Option<u64>,
    /// Epoch ms when an answer was recorded; auto-advance pending until
    /// [`ANSWER_ADVANCE_MS`] elapses.
    answer_pending_ms: Option<u64>,
    /// Bumped on every (re)start. Async results tagged with an older
    /// generation are stale and get ignored.
    generation: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create a fresh session at the hero screen.
    pub fn new() -> Self {
        Self {
            stage: Stage::Hero,
            current_idx: 0,
            intro_mode: true,
            answers: AnswerSet::new(),
            report: None,
            report_error: None,
            unlocked: false,
            contact: None,
            progress: 0.0,
            diagnosing_since_ms: None,
            report_arrived_ms: None,
            answer_pending_ms: None,
            generation: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn current_index(&self) -> usize {
        self.current_idx
    }

    pub fn intro_mode(&self) -> bool {
        self.intro_mode
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    pub fn report_error(&self) -> Option<&ReportError> {
        self.report_error.as_ref()
    }

    pub fn unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn contact(&self) -> Option<&ContactInfo> {
        self.contact.as_ref()
    }

    pub fn progress_pct(&self) -> f64 {
        self.progress
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn current_question(&self) -> Option<&'static Question> {
        question_bank().get(self.current_idx)
    }

    /// 0.0 .. 1.0 progress through the quiz, counting the current question
    /// only once its group intro has been dismissed.
    pub fn quiz_progress(&self) -> f64 {
        let answered_pos = self.current_idx + usize::from(!self.intro_mode);
        answered_pos as f64 / question_bank().len() as f64
    }

    /// Derived category summaries. Recomputed from the answers on every
    /// call, never cached as mutable fields.
    pub fn summary(&self) -> Option<ScoreSummary> {
        matches!(self.stage, Stage::Diagnosing | Stage::Result)
            .then(|| scoring::score(&self.answers, question_bank()))
    }

    /// Whether the caller should be driving a report request right now.
    /// Safe to act on every tick: the report client's guard de-duplicates.
    pub fn needs_report(&self) -> bool {
        self.stage == Stage::Diagnosing && self.report.is_none() && self.report_error.is_none()
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            stage: self.stage,
            question_index: self.current_idx,
            intro_mode: self.intro_mode,
            answered: self.answers.len(),
            progress_pct: self.progress,
            unlocked: self.unlocked,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin (or retake) the quiz. Resets everything and enters the first
    /// group's intro screen.
    pub fn start(&mut self) -> Event {
        let from = self.stage;
        self.reset_fields();
        self.stage = Stage::Quiz;
        Event::StageChanged {
            from,
            to: Stage::Quiz,
            at: Utc::now(),
        }
    }

    /// Reset everything and return to the hero screen. All guards, timing
    /// fields, and answers go back to initial values; pending time-based
    /// transitions die with the old generation.
    pub fn restart(&mut self) -> Event {
        self.reset_fields();
        self.stage = Stage::Hero;
        Event::SessionReset { at: Utc::now() }
    }

    /// Record an answer for the current question and schedule the
    /// auto-advance. Returns `Ok(None)` while a previous answer's advance
    /// is still pending (double-submission guard).
    pub fn select_answer(&mut self, value: i32) -> Result<Option<Event>, ValidationError> {
        if self.stage != Stage::Quiz || self.intro_mode {
            return Ok(None);
        }
        if self.answer_pending_ms.is_some() {
            return Ok(None);
        }
        let Some(question) = self.current_question() else {
            return Ok(None);
        };
        let question_id = question.id;
        self.answers.record(question_id, value)?;
        self.answer_pending_ms = Some(now_ms());
        Ok(Some(Event::AnswerRecorded {
            question_id,
            value,
            at: Utc::now(),
        }))
    }

    /// Advance out of the current intro screen into its first question.
    pub fn next_step(&mut self) -> Option<Event> {
        if self.stage != Stage::Quiz {
            return None;
        }
        if self.intro_mode {
            self.intro_mode = false;
            return Some(Event::QuestionAdvanced {
                question_index: self.current_idx,
                at: Utc::now(),
            });
        }
        Some(self.advance_question())
    }

    /// Go backward. From a question that heads its group this returns to
    /// that group's intro screen; from the very first intro it returns to
    /// the hero screen.
    pub fn prev_step(&mut self) -> Option<Event> {
        if self.stage != Stage::Quiz {
            return None;
        }
        // Leaving the question cancels any pending auto-advance.
        self.answer_pending_ms = None;
        if self.intro_mode {
            if self.current_idx > 0 {
                self.intro_mode = false;
                self.current_idx -= 1;
                return Some(Event::QuestionRewound {
                    question_index: self.current_idx,
                    at: Utc::now(),
                });
            }
            self.stage = Stage::Hero;
            return Some(Event::StageChanged {
                from: Stage::Quiz,
                to: Stage::Hero,
                at: Utc::now(),
            });
        }
        if self.current_idx % GROUP_SIZE == 0 {
            self.intro_mode = true;
            return self.current_question().map(|q| Event::IntroShown {
                category: q.category,
                question_index: self.current_idx,
                at: Utc::now(),
            });
        }
        self.current_idx -= 1;
        Some(Event::QuestionRewound {
            question_index: self.current_idx,
            at: Utc::now(),
        })
    }

    /// Call periodically. Drives the answer auto-advance, the simulated
    /// progress counter, and the diagnosing -> result pause.
    pub fn tick(&mut self) -> Option<Event> {
        match self.stage {
            Stage::Quiz => {
                let pending = self.answer_pending_ms?;
                if now_ms().saturating_sub(pending) < ANSWER_ADVANCE_MS {
                    return None;
                }
                self.answer_pending_ms = None;
                Some(self.advance_question())
            }
            Stage::Diagnosing => {
                // A recorded error freezes progress; the remediation panel
                // owns the screen until retry, manual key, or fallback.
                if self.report_error.is_some() {
                    return None;
                }
                if let Some(arrived) = self.report_arrived_ms {
                    self.progress = 100.0;
                    if now_ms().saturating_sub(arrived) >= RESULT_PAUSE_MS {
                        self.stage = Stage::Result;
                        return Some(Event::StageChanged {
                            from: Stage::Diagnosing,
                            to: Stage::Result,
                            at: Utc::now(),
                        });
                    }
                    return None;
                }
                if let Some(since) = self.diagnosing_since_ms {
                    let elapsed = now_ms().saturating_sub(since) as f64;
                    self.progress =
                        (PROGRESS_START + elapsed * PROGRESS_RATE_PER_MS).min(PROGRESS_CEILING);
                }
                None
            }
            _ => None,
        }
    }

    /// Apply a report produced for this session generation. Stale results
    /// (older generation, wrong stage) are ignored, which is how restart
    /// "cancels" an in-flight request it cannot truly abort.
    pub fn report_ready(&mut self, generation: u64, report: Report) -> Option<Event> {
        if generation != self.generation || self.stage != Stage::Diagnosing {
            return None;
        }
        let persona_id = report.selected_persona_id.clone();
        self.report = Some(report);
        self.report_error = None;
        self.progress = 100.0;
        self.report_arrived_ms = Some(now_ms());
        Some(Event::ReportReady {
            persona_id,
            at: Utc::now(),
        })
    }

    /// Record a classified provider error for the remediation panel.
    pub fn report_failed(&mut self, generation: u64, error: ReportError) -> Option<Event> {
        if generation != self.generation || self.stage != Stage::Diagnosing {
            return None;
        }
        let event = Event::ReportFailed {
            message: error.to_string(),
            needs_key: error.prompts_for_key(),
            at: Utc::now(),
        };
        self.report_error = Some(error);
        Some(event)
    }

    /// Clear the recorded error and restart the progress clock. The caller
    /// follows up by driving the report client again.
    pub fn retry(&mut self) {
        if self.stage != Stage::Diagnosing {
            return;
        }
        self.report_error = None;
        self.progress = PROGRESS_START;
        self.diagnosing_since_ms = Some(now_ms());
    }

    /// Flip the unlock flag. Validation failures make no network call and
    /// leave the flag untouched; once set, the flag never reverts for the
    /// lifetime of the session.
    pub fn unlock(&mut self, contact: ContactInfo) -> Result<Event, ValidationError> {
        contact.validate()?;
        self.contact = Some(contact);
        self.unlocked = true;
        Ok(Event::Unlocked { at: Utc::now() })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn reset_fields(&mut self) {
        self.current_idx = 0;
        self.intro_mode = true;
        self.answers.clear();
        self.report = None;
        self.report_error = None;
        self.unlocked = false;
        self.contact = None;
        self.progress = 0.0;
        self.diagnosing_since_ms = None;
        self.report_arrived_ms = None;
        self.answer_pending_ms = None;
        self.generation += 1;
    }

    fn advance_question(&mut self) -> Event {
        let bank_len = question_bank().len();
        if self.current_idx + 1 < bank_len {
            self.current_idx += 1;
            if self.current_idx % GROUP_SIZE == 0 {
                self.intro_mode = true;
                if let Some(q) = self.current_question() {
                    return Event::IntroShown {
                        category: q.category,
                        question_index: self.current_idx,
                        at: Utc::now(),
                    };
                }
            }
            Event::QuestionAdvanced {
                question_index: self.current_idx,
                at: Utc::now(),
            }
        } else {
            self.enter_diagnosing()
        }
    }

    fn enter_diagnosing(&mut self) -> Event {
        self.stage = Stage::Diagnosing;
        self.progress = PROGRESS_START;
        self.diagnosing_since_ms = Some(now_ms());
        self.report = None;
        self.report_error = None;
        self.report_arrived_ms = None;
        Event::StageChanged {
            from: Stage::Quiz,
            to: Stage::Diagnosing,
            at: Utc::now(),
        }
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
