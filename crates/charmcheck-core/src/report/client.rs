//! Generative-provider client.
//!
//! Owns the two-part guard (in-flight flag + debounce timestamp) that makes
//! the report trigger idempotent no matter how many times the UI layer
//! re-invokes it, the credential resolution chain, the error classification,
//! and the deterministic fallback generator.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use reqwest::StatusCode;
use serde_json::json;

use crate::error::ReportError;
use crate::quiz::AnswerSet;
use crate::report::{persona, prompt, Report};
use crate::scoring::ScoreSummary;

/// Two non-forced calls within this window collapse into one.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_secs(2);

/// Artificial delay before the fallback report is returned, so a skipped
/// analysis still reads as work being done.
pub const FALLBACK_DELAY: Duration = Duration::from_millis(800);

/// Totals strictly above this get the top-tier persona in the fallback
/// report.
pub const FALLBACK_TOP_TIER_CUTOFF: i32 = 36;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
const ENV_KEY_VAR: &str = "GEMINI_API_KEY";

/// Unknown-error messages are cut to this many characters for display.
const ERROR_DISPLAY_CHARS: usize = 30;

/// Options for a single report request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Skip the provider entirely and synthesize the fallback report.
    pub force_fallback: bool,
    /// One-shot key taking precedence over every other source. Implies a
    /// user-initiated retry, which always passes the guard.
    pub override_key: Option<String>,
}

impl RequestOptions {
    fn user_initiated(&self) -> bool {
        self.force_fallback || self.override_key.is_some()
    }
}

/// Outcome of a report request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    Ready(Report),
    /// Suppressed by the in-flight/debounce guard. Not an error: the caller
    /// simply does nothing, exactly as if this trigger never fired.
    Dropped,
}

#[derive(Debug, Default)]
struct RequestGuard {
    in_flight: bool,
    last_attempt: Option<Instant>,
}

/// Client for the generative report provider.
///
/// One instance lives for the whole browser session. The guard state is
/// internal so the de-duplication holds regardless of how the UI layer
/// schedules its effect calls.
pub struct ReportClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    env_key: Option<String>,
    /// User-entered key, held only in memory for the session.
    manual_key: Mutex<Option<String>>,
    guard: Mutex<RequestGuard>,
}

impl ReportClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            model: model.into(),
            env_key: None,
            manual_key: Mutex::new(None),
            guard: Mutex::new(RequestGuard::default()),
        }
    }

    /// Production constructor: default provider endpoint and model, API key
    /// from the environment if provisioned at deploy time.
    pub fn from_env() -> Self {
        let mut client = Self::new(DEFAULT_BASE_URL, DEFAULT_MODEL);
        client.env_key = std::env::var(ENV_KEY_VAR).ok().filter(|k| !k.is_empty());
        client
    }

    pub fn with_env_key(mut self, key: impl Into<String>) -> Self {
        self.env_key = Some(key.into());
        self
    }

    /// Store a manually entered key for the rest of the session. Never
    /// persisted anywhere durable.
    pub fn set_manual_key(&self, key: impl Into<String>) {
        let key = key.into();
        let mut manual = self.manual_key.lock().expect("manual key lock poisoned");
        *manual = if key.trim().is_empty() { None } else { Some(key) };
    }

    /// Whether any credential source would resolve right now.
    pub fn has_credential(&self) -> bool {
        self.env_key.is_some()
            || self
                .manual_key
                .lock()
                .expect("manual key lock poisoned")
                .is_some()
    }

    /// Re-arm the guard. Called on session restart; the manual key survives
    /// (the user should not have to retype it after retaking the quiz).
    pub fn reset(&self) {
        let mut guard = self.guard.lock().expect("request guard lock poisoned");
        *guard = RequestGuard::default();
    }

    /// Request a report for the given scores and answers.
    ///
    /// Non-forced calls are dropped while another request is in flight or
    /// within [`DEBOUNCE_WINDOW`] of the previous attempt. After a success
    /// the guard stays engaged: a session holds exactly one report until
    /// [`reset`](Self::reset). A failure releases the in-flight flag so a
    /// user-initiated retry can proceed.
    pub async fn request_report(
        &self,
        summary: &ScoreSummary,
        answers: &AnswerSet,
        options: RequestOptions,
    ) -> Result<ReportOutcome, ReportError> {
        if !self.admit(&options) {
            return Ok(ReportOutcome::Dropped);
        }

        if options.force_fallback {
            tokio::time::sleep(FALLBACK_DELAY).await;
            self.release();
            return Ok(ReportOutcome::Ready(Self::fallback_report(
                summary.total,
                true,
            )));
        }

        let key = options
            .override_key
            .clone()
            .or_else(|| self.manual_key.lock().expect("manual key lock poisoned").clone())
            .or_else(|| self.env_key.clone());
        let Some(key) = key else {
            self.release();
            return Err(ReportError::MissingCredential);
        };

        let prompt = prompt::build_prompt(summary, answers);
        match self.call_provider(&key, &prompt).await {
            Ok(report) => Ok(ReportOutcome::Ready(report)),
            Err(err) => {
                self.release();
                Err(err)
            }
        }
    }

    /// Deterministic degraded-mode report from the total score alone.
    ///
    /// `user_requested` distinguishes the explicit "skip AI" path from
    /// automatic degradation; only the explanation copy differs.
    pub fn fallback_report(total: i32, user_requested: bool) -> Report {
        let persona_id = if total > FALLBACK_TOP_TIER_CUTOFF {
            persona::TOP_TIER_ID
        } else {
            persona::FALLBACK_ID
        };
        let explanation = if user_requested {
            "This is a basic-mode report: you skipped the AI analysis, so the \
             diagnosis below is derived directly from your score band."
        } else {
            "The AI connection is busy right now, so this is a basic report \
             generated from your scores."
        };
        Report {
            selected_persona_id: persona_id.to_string(),
            persona_explanation: explanation.to_string(),
            persona_overview: "Your potential is real; rerun the deep analysis later for the full picture."
                .to_string(),
            appearance_analysis: "Stay well groomed and find the style that is genuinely yours."
                .to_string(),
            social_analysis: "Your profiles are your calling card; show more of your actual life."
                .to_string(),
            interaction_analysis: "Make the first move; that is where stories start.".to_string(),
            mindset_analysis: "Attitude sets your ceiling. Keep the confidence.".to_string(),
            coach_general_advice: "This is a baseline strategic report. The radar chart and \
                 dimension breakdown above still map where you stand, and that map is the \
                 starting point for any real improvement.\nFor the full AI deep-dive, try \
                 again a little later."
                .to_string(),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Two-part guard: in-flight flag plus debounce timestamp. Forced and
    /// override-key calls always pass.
    fn admit(&self, options: &RequestOptions) -> bool {
        let mut guard = self.guard.lock().expect("request guard lock poisoned");
        if !options.user_initiated() {
            if guard.in_flight {
                return false;
            }
            if let Some(last) = guard.last_attempt {
                if last.elapsed() < DEBOUNCE_WINDOW {
                    return false;
                }
            }
        }
        guard.in_flight = true;
        guard.last_attempt = Some(Instant::now());
        true
    }

    fn release(&self) {
        let mut guard = self.guard.lock().expect("request guard lock poisoned");
        guard.in_flight = false;
    }

    async fn call_provider(&self, key: &str, prompt: &str) -> Result<Report, ReportError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseMimeType": "application/json" }
        });

        let response = self
            .http
            .post(&url)
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| ReportError::Unknown {
                message: truncate_for_display(&e.to_string()),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let payload: serde_json::Value =
            response.json().await.map_err(|_| ReportError::EmptyResponse)?;
        let text = payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .unwrap_or_default();
        parse_report_text(text)
    }
}

/// Map a non-success provider status onto the error taxonomy.
fn classify_status(status: StatusCode, body: &str) -> ReportError {
    match status.as_u16() {
        400 if body.contains("API key") => ReportError::InvalidCredential,
        401 | 403 => ReportError::InvalidCredential,
        429 => ReportError::QuotaExceeded,
        s if s >= 500 => ReportError::ProviderUnavailable { status: s },
        s => ReportError::Unknown {
            message: truncate_for_display(&format!("HTTP {s}: {body}")),
        },
    }
}

/// Parse the provider's text payload into a [`Report`].
///
/// Tolerates Markdown code fences around the JSON (the prompt forbids them,
/// models add them anyway); any payload that still fails to parse is an
/// `EmptyResponse`, per the boundary contract.
fn parse_report_text(text: &str) -> Result<Report, ReportError> {
    let stripped = strip_code_fences(text);
    if stripped.trim().is_empty() {
        return Err(ReportError::EmptyResponse);
    }
    serde_json::from_str(stripped.trim()).map_err(|_| ReportError::EmptyResponse)
}

fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the fence line (which may carry a language tag) and the closing fence.
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.strip_suffix("```").unwrap_or(rest)
}

fn truncate_for_display(message: &str) -> String {
    if message.chars().count() <= ERROR_DISPLAY_CHARS {
        message.to_string()
    } else {
        let cut: String = message.chars().take(ERROR_DISPLAY_CHARS).collect();
        format!("{cut}...")
    }
}
