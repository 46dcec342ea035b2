//! Email-gated unlock and best-effort outbound relays.
//!
//! Submitting the unlock form relays the contact to a subscription endpoint
//! and the full report package to a delivery webhook. Both relays are
//! best-effort: the unlock flag is flipped by the session regardless of the
//! relay outcome, so the user experience is never blocked by external
//! services. Relay failures are logged, never surfaced.

pub mod chart;

use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{RelayError, ValidationError};
use crate::report::Report;
use crate::scoring::ScoreSummary;

/// Settle delay between the subscription call and the report delivery.
pub const RELAY_SETTLE_DELAY: Duration = Duration::from_millis(600);

/// Contact info captured by the unlock form. Held in memory only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    pub email: String,
}

impl ContactInfo {
    /// Client-side validation: both fields required, whitespace does not
    /// count. A failure here means no network call is made at all.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if self.email.trim().is_empty() {
            return Err(ValidationError::MissingField("email"));
        }
        Ok(())
    }
}

/// Relay send state, tracked only for the resend affordance. Never gates
/// the unlock flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayState {
    Idle,
    Sending,
    Success,
    Error,
}

/// Outbound relay to the subscription endpoint and the report-delivery
/// webhook.
pub struct ReportRelay {
    http: Client,
    subscribe_url: String,
    webhook_url: String,
    chart_base_url: String,
    state: RelayState,
}

impl ReportRelay {
    pub fn new(subscribe_url: impl Into<String>, webhook_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            subscribe_url: subscribe_url.into(),
            webhook_url: webhook_url.into(),
            chart_base_url: chart::DEFAULT_CHART_BASE_URL.to_string(),
            state: RelayState::Idle,
        }
    }

    pub fn with_chart_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.chart_base_url = base_url.into();
        self
    }

    pub fn state(&self) -> RelayState {
        self.state
    }

    /// Full unlock submission: subscription first, then (after a settle
    /// delay) the report delivery. Failures are logged and swallowed; the
    /// returned state feeds the resend affordance only.
    pub async fn submit(
        &mut self,
        contact: &ContactInfo,
        summary: &ScoreSummary,
        report: &Report,
    ) -> RelayState {
        self.state = RelayState::Sending;
        if let Err(err) = self.subscribe(contact).await {
            eprintln!("Warning: subscription relay failed: {err}");
        }
        tokio::time::sleep(RELAY_SETTLE_DELAY).await;
        self.deliver(contact, summary, report).await
    }

    /// Re-run the webhook delivery without re-submitting the contact form.
    pub async fn resend(
        &mut self,
        contact: &ContactInfo,
        summary: &ScoreSummary,
        report: &Report,
    ) -> RelayState {
        self.state = RelayState::Sending;
        self.deliver(contact, summary, report).await
    }

    /// Fire-and-forget contact submission; the response body is not
    /// interpreted.
    pub async fn subscribe(&self, contact: &ContactInfo) -> Result<(), RelayError> {
        let response = self
            .http
            .post(&self.subscribe_url)
            .form(&[("name", contact.name.as_str()), ("email", contact.email.as_str())])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Endpoint {
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    /// Deliver the full report package to the webhook.
    pub async fn deliver_report(
        &self,
        contact: &ContactInfo,
        summary: &ScoreSummary,
        report: &Report,
    ) -> Result<(), RelayError> {
        let payload = self.webhook_payload(contact, summary, report);
        let response = self.http.post(&self.webhook_url).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Endpoint {
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    async fn deliver(
        &mut self,
        contact: &ContactInfo,
        summary: &ScoreSummary,
        report: &Report,
    ) -> RelayState {
        match self.deliver_report(contact, summary, report).await {
            Ok(()) => self.state = RelayState::Success,
            Err(err) => {
                eprintln!("Warning: report delivery failed: {err}");
                self.state = RelayState::Error;
            }
        }
        self.state
    }

    fn webhook_payload(
        &self,
        contact: &ContactInfo,
        summary: &ScoreSummary,
        report: &Report,
    ) -> Value {
        let persona = report.persona();
        json!({
            "submittedAt": Utc::now().to_rfc3339(),
            "name": contact.name,
            "email": contact.email,
            "totalScore": summary.total,
            "normalizedScore": summary.normalized_total(),
            "personaId": persona.id,
            "personaTitle": persona.title,
            "personaSubtitle": persona.subtitle,
            "personaImageUrl": persona.image_url,
            "chartImageUrl": chart::radar_chart_url(&self.chart_base_url, summary),
            "categoryBreakdownHtml": render_category_breakdown(summary, report),
            "coachAdviceHtml": render_coach_advice(report),
        })
    }
}

/// Pre-rendered markup fragment for the per-category breakdown.
fn render_category_breakdown(summary: &ScoreSummary, report: &Report) -> String {
    summary
        .per_category
        .iter()
        .map(|cat| {
            format!(
                "<div class=\"category\"><h4>{}</h4>\
                 <span style=\"color:{}\">{} ({} pts)</span>\
                 <p>{}</p></div>",
                escape_html(cat.category.label()),
                cat.level.color(),
                cat.level.label(),
                cat.score,
                escape_html(report.analysis_for(cat.category)),
            )
        })
        .collect()
}

/// Pre-rendered markup fragment for the coach-advice section, one `<p>` per
/// paragraph.
fn render_coach_advice(report: &Report) -> String {
    report
        .coach_general_advice
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| format!("<p>{}</p>", escape_html(line)))
        .collect()
}

/// Minimal escaping for model-generated text embedded in fragments.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::{question_bank, AnswerSet};
    use crate::scoring::score;

    fn sample_report() -> Report {
        Report {
            selected_persona_id: "neighbor".into(),
            persona_explanation: "e".into(),
            persona_overview: "o".into(),
            appearance_analysis: "appearance note".into(),
            social_analysis: "social note".into(),
            interaction_analysis: "interaction note".into(),
            mindset_analysis: "mindset note".into(),
            coach_general_advice: "First point.\n\nSecond <big> point.".into(),
        }
    }

    #[test]
    fn contact_validation_requires_both_fields() {
        let contact = ContactInfo {
            name: "Ken".into(),
            email: "".into(),
        };
        assert_eq!(
            contact.validate(),
            Err(ValidationError::MissingField("email"))
        );
        let contact = ContactInfo {
            name: "Ken".into(),
            email: "ken@example.com".into(),
        };
        assert!(contact.validate().is_ok());
    }

    #[test]
    fn coach_advice_renders_one_paragraph_per_line() {
        let html = render_coach_advice(&sample_report());
        assert_eq!(
            html,
            "<p>First point.</p><p>Second &lt;big&gt; point.</p>"
        );
    }

    #[test]
    fn category_breakdown_carries_level_and_analysis() {
        let mut answers = AnswerSet::new();
        for id in 0..4 {
            answers.record(id, 3).unwrap();
        }
        let summary = score(&answers, question_bank());
        let html = render_category_breakdown(&summary, &sample_report());
        assert!(html.contains("Appearance &amp; Style"));
        assert!(html.contains("Green (12 pts)"));
        assert!(html.contains("appearance note"));
        assert!(html.contains("#22c55e"));
    }

    #[test]
    fn webhook_payload_resolves_unknown_persona_to_default() {
        let relay = ReportRelay::new("http://unused/subscribe", "http://unused/webhook");
        let summary = score(&AnswerSet::new(), question_bank());
        let mut report = sample_report();
        report.selected_persona_id = "no-such-persona".into();
        let payload = relay.webhook_payload(
            &ContactInfo {
                name: "Ken".into(),
                email: "ken@example.com".into(),
            },
            &summary,
            &report,
        );
        assert_eq!(payload["personaId"], "pioneer");
        assert_eq!(payload["normalizedScore"], 0);
        assert!(payload["chartImageUrl"]
            .as_str()
            .unwrap()
            .starts_with("https://quickchart.io/chart?"));
    }
}
