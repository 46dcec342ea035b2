//! Natural-language instruction payload for the generative provider.
//!
//! Embeds the total score, per-category scores, and the literal
//! (question, chosen-option-label) pairs. Unanswered questions are marked
//! "not answered"; the "I'm not sure" sentinel keeps its textual meaning
//! here even though it scores as zero.

use indoc::formatdoc;
use serde_json::json;

use crate::quiz::{option_label, question_bank, AnswerSet};
use crate::report::persona;
use crate::scoring::{ScoreSummary, MAX_TOTAL};

/// Advisory total above which (with balanced dimensions) the model must
/// pick the top-tier persona. A hint to the generator, not re-validated
/// client-side.
pub const TOP_TIER_HINT_CUTOFF: i32 = 38;

/// Build the full instruction payload.
pub fn build_prompt(summary: &ScoreSummary, answers: &AnswerSet) -> String {
    let dimension_scores = json!(summary
        .per_category
        .iter()
        .map(|c| json!({ "dimension": c.category.label(), "score": c.score }))
        .collect::<Vec<_>>());

    let detailed_answers = json!(question_bank()
        .iter()
        .map(|q| {
            let answer = answers
                .get(q.id)
                .and_then(option_label)
                .unwrap_or("not answered");
            json!({
                "dimension": q.category.label(),
                "question": q.text,
                "answer": answer,
            })
        })
        .collect::<Vec<_>>());

    let persona_ids = persona::all_ids().join(", ");

    formatdoc! {r#"
        You are a professional image coach writing a personal deep-dive report for a
        man aged 25-35 who just completed a dating-readiness assessment.

        Data:
        1. Total score: {total}/{max_total}
        2. Dimension scores: {dimension_scores}
        3. Individual answers: {detailed_answers}

        Task:
        Analyze the data above and reply with a single flat JSON object, exactly the
        structure shown below. Do not wrap the reply in Markdown code fences.

        Core analysis rules (important, follow strictly):
        1. Multi-cause attribution for "Action & Interaction":
           - If this dimension scores low, never reduce it to "you are not trying
             hard enough" or "you are too passive".
           - Consider environment: his daily circle may simply contain no one to
             meet. Say so with empathy, e.g. "this score is low, and beyond
             hesitation it may mean your environment gives you nowhere to act".
        2. Handling "I'm not sure" answers:
           - "I'm not sure" signals a blind spot, not a failure. Suggest finding
             out (professional input, experimenting), never scold.

        Required JSON structure:
        {{
          "selectedPersonaId": "pick the best-fitting id from [{persona_ids}]",
          "personaExplanation": "why he matches this persona, grounded in his concrete answers, 150-200 words, two or three paragraphs separated by \n. Never just restate the persona definition.",
          "personaOverview": "one sentence summarizing his current situation",
          "appearanceAnalysis": "specific analysis and advice for Appearance & Style, about 50 words",
          "socialAnalysis": "specific analysis and advice for Social Presence, about 50 words",
          "interactionAnalysis": "specific analysis and advice for Action & Interaction; distinguish between an environment problem and a skill problem, about 50 words",
          "mindsetAnalysis": "specific analysis and advice for Mindset & Habits, about 50 words",
          "coachGeneralAdvice": "the coach's closing strategic advice, 250-350 words, clearly paragraphed with \n"
        }}

        Style rules for "coachGeneralAdvice":
        1. Strategy over chores: no micro to-do items (haircuts, skincare brands).
           Give the macro direction; details belong to the program.
        2. Voice: an experienced, warm older brother. Steady, firm, constructive.
           Guide, never attack. Separate distinct points with \n.
        3. Closing: make clear that knowing the problem and solving it are two
           different things, that unguided trial and error repeats itself, and end
           with one sentence pointing him to the coaching plan presented below
           the report.

        Persona selection rule:
        - If the total score is above {hint_cutoff} and the dimensions are balanced,
          selectedPersonaId must be "{top_tier}".
    "#,
        total = summary.total,
        max_total = MAX_TOTAL,
        dimension_scores = dimension_scores,
        detailed_answers = detailed_answers,
        persona_ids = persona_ids,
        hint_cutoff = TOP_TIER_HINT_CUTOFF,
        top_tier = persona::TOP_TIER_ID,
    }
}
