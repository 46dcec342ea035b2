//! Category scoring engine.
//!
//! Maps a sparse [`AnswerSet`] to per-category scores, traffic-light levels,
//! and a total. Pure and synchronous: the session recomputes the summary on
//! demand rather than keeping manually synchronized fields, so the summary
//! can never drift from the answers it was derived from.
//!
//! ## Levels
//!
//! | Category score | Level  |
//! |----------------|--------|
//! | >= 9           | Green  |
//! | 5 .. 8         | Yellow |
//! | < 5            | Red    |

use serde::{Deserialize, Serialize};

use crate::quiz::{AnswerSet, Category, Question, UNSURE_VALUE};

/// Inclusive lower bound for [`Level::Green`].
pub const GREEN_THRESHOLD: i32 = 9;
/// Inclusive lower bound for [`Level::Yellow`].
pub const YELLOW_THRESHOLD: i32 = 5;
/// Maximum achievable total (16 questions x 3 points).
pub const MAX_TOTAL: i32 = 48;

/// Traffic-light rating for a single category score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Red,
    Yellow,
    Green,
}

impl Level {
    /// Apply the fixed per-category thresholds.
    pub fn for_score(score: i32) -> Self {
        if score >= GREEN_THRESHOLD {
            Level::Green
        } else if score >= YELLOW_THRESHOLD {
            Level::Yellow
        } else {
            Level::Red
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Level::Red => "Red",
            Level::Yellow => "Yellow",
            Level::Green => "Green",
        }
    }

    /// Accent color used in rendered webhook fragments.
    pub fn color(&self) -> &'static str {
        match self {
            Level::Red => "#ef4444",
            Level::Yellow => "#f97316",
            Level::Green => "#22c55e",
        }
    }
}

/// Static copy for one category: intro description plus one suggestion
/// per level.
pub struct CategoryInfo {
    pub description: &'static str,
    red: &'static str,
    yellow: &'static str,
    green: &'static str,
}

impl CategoryInfo {
    pub fn suggestion(&self, level: Level) -> &'static str {
        match level {
            Level::Red => self.red,
            Level::Yellow => self.yellow,
            Level::Green => self.green,
        }
    }
}

pub fn category_info(category: Category) -> &'static CategoryInfo {
    match category {
        Category::Appearance => &CategoryInfo {
            description: "First impressions: grooming, style, and whether your look works for you.",
            red: "Start with the basics: a haircut that suits you and one outfit you feel good in.",
            yellow: "The foundation is there. Sharpen the details that make a look feel intentional.",
            green: "Your presentation is a real asset. Keep it consistent.",
        },
        Category::SocialPresence => &CategoryInfo {
            description: "Your online calling card: what a stranger learns from your profiles.",
            red: "Your profiles are invisible. A recent clear photo and a few real posts change everything.",
            yellow: "There is a person behind the profile, but it takes scrolling to find them.",
            green: "Your feed tells a story on its own. That does work for you around the clock.",
        },
        Category::Interaction => &CategoryInfo {
            description: "Where stories actually start: meeting people and moving things forward.",
            red: "Low numbers here are often about environment, not courage. Get into new rooms first.",
            yellow: "You show up; the next step is turning contact into concrete plans.",
            green: "You create your own chances. Keep the momentum.",
        },
        Category::Mindset => &CategoryInfo {
            description: "The engine underneath: belief, recovery, and willingness to be seen trying.",
            red: "Attitude sets your ceiling. Start treating this as a learnable skill.",
            yellow: "You believe in change on good days. Build habits that survive the bad ones.",
            green: "Your mindset carries the other three dimensions. Protect it.",
        },
    }
}

/// Derived rating for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub category: Category,
    pub score: i32,
    pub level: Level,
    pub description: &'static str,
    pub suggestion: &'static str,
}

/// The scorer's full output: one summary per category plus the total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreSummary {
    pub per_category: [CategorySummary; 4],
    pub total: i32,
}

impl ScoreSummary {
    pub fn category(&self, category: Category) -> &CategorySummary {
        // Category::ALL and per_category share ordering.
        &self.per_category[Category::ALL
            .iter()
            .position(|&c| c == category)
            .unwrap_or(0)]
    }

    /// Total normalized to 0..100 for external payloads.
    pub fn normalized_total(&self) -> u32 {
        ((self.total.max(0) as f64 / MAX_TOTAL as f64) * 100.0).round() as u32
    }
}

/// Score an answer set against the question bank.
///
/// The [`UNSURE_VALUE`] sentinel counts as 0 here; the sentinel itself stays
/// in the answer set so the report prompt can preserve its textual meaning.
pub fn score(answers: &AnswerSet, bank: &[Question]) -> ScoreSummary {
    let per_category = Category::ALL.map(|category| {
        let score: i32 = bank
            .iter()
            .filter(|q| q.category == category)
            .filter_map(|q| answers.get(q.id))
            .map(|v| if v == UNSURE_VALUE { 0 } else { v })
            .sum();
        let level = Level::for_score(score);
        let info = category_info(category);
        CategorySummary {
            category,
            score,
            level,
            description: info.description,
            suggestion: info.suggestion(level),
        }
    });
    let total = per_category.iter().map(|c| c.score).sum();
    ScoreSummary { per_category, total }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::question_bank;
    use proptest::prelude::*;

    fn answers_from(pairs: &[(u32, i32)]) -> AnswerSet {
        let mut answers = AnswerSet::new();
        for &(id, v) in pairs {
            answers.record(id, v).unwrap();
        }
        answers
    }

    #[test]
    fn empty_answers_score_zero_and_red() {
        let summary = score(&AnswerSet::new(), question_bank());
        assert_eq!(summary.total, 0);
        for cat in &summary.per_category {
            assert_eq!(cat.score, 0);
            assert_eq!(cat.level, Level::Red);
        }
    }

    #[test]
    fn three_threes_is_green_boundary() {
        // Appearance questions 0..2 answered {3,3,3} -> 9 -> Green.
        let summary = score(&answers_from(&[(0, 3), (1, 3), (2, 3)]), question_bank());
        let cat = summary.category(Category::Appearance);
        assert_eq!(cat.score, 9);
        assert_eq!(cat.level, Level::Green);
    }

    #[test]
    fn four_points_is_red() {
        // {2,1,1} -> 4 -> Red.
        let summary = score(&answers_from(&[(0, 2), (1, 1), (2, 1)]), question_bank());
        let cat = summary.category(Category::Appearance);
        assert_eq!(cat.score, 4);
        assert_eq!(cat.level, Level::Red);
    }

    #[test]
    fn five_points_is_yellow() {
        let summary = score(&answers_from(&[(0, 3), (1, 2)]), question_bank());
        assert_eq!(summary.category(Category::Appearance).level, Level::Yellow);
    }

    #[test]
    fn unsure_counts_as_zero_but_stays_recorded() {
        let answers = answers_from(&[(0, crate::quiz::UNSURE_VALUE), (1, 3)]);
        let summary = score(&answers, question_bank());
        assert_eq!(summary.category(Category::Appearance).score, 3);
        // Sentinel preserved for the prompt builder.
        assert_eq!(answers.get(0), Some(crate::quiz::UNSURE_VALUE));
    }

    #[test]
    fn categories_are_scored_independently() {
        let summary = score(
            &answers_from(&[(0, 3), (1, 3), (2, 3), (3, 3), (4, 1)]),
            question_bank(),
        );
        assert_eq!(summary.category(Category::Appearance).level, Level::Green);
        assert_eq!(summary.category(Category::SocialPresence).level, Level::Red);
        assert_eq!(summary.total, 13);
    }

    #[test]
    fn normalized_total_rounds_to_percent() {
        let summary = score(
            &answers_from(&[(0, 3), (1, 3), (2, 3), (3, 3)]),
            question_bank(),
        );
        // 12 / 48 = 25%
        assert_eq!(summary.normalized_total(), 25);
    }

    proptest! {
        #[test]
        fn total_equals_sum_of_category_scores(
            raw in proptest::collection::vec((0u32..16, prop_oneof![Just(-1i32), 0..=3i32]), 0..32)
        ) {
            let mut answers = AnswerSet::new();
            for (id, v) in raw {
                answers.record(id, v).unwrap();
            }
            let summary = score(&answers, question_bank());
            let sum: i32 = summary.per_category.iter().map(|c| c.score).sum();
            prop_assert_eq!(summary.total, sum);
            for cat in &summary.per_category {
                prop_assert!(cat.score >= 0 && cat.score <= 12);
                prop_assert_eq!(cat.level, Level::for_score(cat.score));
            }
        }
    }
}
