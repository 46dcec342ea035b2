//! Question bank and answer collection.
//!
//! The bank is a fixed, ordered list of 16 questions, 4 per category, with
//! a shared set of answer options. Questions of the same category are
//! contiguous so the quiz can show one intro screen per group of
//! [`GROUP_SIZE`] questions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The four scored dimensions of the quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Appearance,
    SocialPresence,
    Interaction,
    Mindset,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Appearance,
        Category::SocialPresence,
        Category::Interaction,
        Category::Mindset,
    ];

    /// Display label used in the UI and in chart/webhook payloads.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Appearance => "Appearance & Style",
            Category::SocialPresence => "Social Presence",
            Category::Interaction => "Action & Interaction",
            Category::Mindset => "Mindset & Habits",
        }
    }
}

/// Reserved option value meaning "I'm not sure".
///
/// Scores as 0, but the sentinel is preserved in the [`AnswerSet`] so the
/// report prompt can still say "I'm not sure" instead of a number.
pub const UNSURE_VALUE: i32 = -1;

/// Questions per intro group. Each group of consecutive questions shares a
/// category and is preceded by an intro screen.
pub const GROUP_SIZE: usize = 4;

/// A single quiz question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: u32,
    pub category: Category,
    pub text: &'static str,
}

/// One of the fixed answer options, shared by every question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnswerOption {
    pub value: i32,
    pub label: &'static str,
}

/// The fixed answer options, in display order.
pub const OPTIONS: [AnswerOption; 5] = [
    AnswerOption { value: 3, label: "Yes, definitely" },
    AnswerOption { value: 2, label: "Mostly" },
    AnswerOption { value: 1, label: "Sometimes" },
    AnswerOption { value: 0, label: "Not at all" },
    AnswerOption { value: UNSURE_VALUE, label: "I'm not sure" },
];

/// Label for the given option value, if it is a valid option.
pub fn option_label(value: i32) -> Option<&'static str> {
    OPTIONS.iter().find(|o| o.value == value).map(|o| o.label)
}

static QUESTIONS: [Question; 16] = [
    Question {
        id: 0,
        category: Category::Appearance,
        text: "Do you have a hairstyle you know suits you, refreshed at least every two months?",
    },
    Question {
        id: 1,
        category: Category::Appearance,
        text: "Does your everyday outfit feel deliberately chosen rather than whatever was clean?",
    },
    Question {
        id: 2,
        category: Category::Appearance,
        text: "Do you keep up a basic skincare and grooming routine?",
    },
    Question {
        id: 3,
        category: Category::Appearance,
        text: "Could you dress appropriately for a nice dinner date tomorrow without buying anything new?",
    },
    Question {
        id: 4,
        category: Category::SocialPresence,
        text: "Does your profile picture clearly show your face, and was it taken within the last year?",
    },
    Question {
        id: 5,
        category: Category::SocialPresence,
        text: "Does your social feed show your hobbies and everyday life, not just reposts?",
    },
    Question {
        id: 6,
        category: Category::SocialPresence,
        text: "Would a stranger scrolling your profile get a sense of what you enjoy doing?",
    },
    Question {
        id: 7,
        category: Category::SocialPresence,
        text: "Do you post or share something of your own at least once a month?",
    },
    Question {
        id: 8,
        category: Category::Interaction,
        text: "Have you met someone new outside of work or family in the past month?",
    },
    Question {
        id: 9,
        category: Category::Interaction,
        text: "Do you have at least one ongoing conversation with someone you find attractive?",
    },
    Question {
        id: 10,
        category: Category::Interaction,
        text: "When you are interested in someone, do you suggest concrete plans instead of waiting?",
    },
    Question {
        id: 11,
        category: Category::Interaction,
        text: "Do you attend gatherings where you might meet new people at least once a month?",
    },
    Question {
        id: 12,
        category: Category::Mindset,
        text: "Do you believe your dating life can improve with deliberate effort?",
    },
    Question {
        id: 13,
        category: Category::Mindset,
        text: "After a rejection, do you recover and try again within a few weeks?",
    },
    Question {
        id: 14,
        category: Category::Mindset,
        text: "Do you set aside time or budget for working on yourself?",
    },
    Question {
        id: 15,
        category: Category::Mindset,
        text: "Are you comfortable being seen trying, even when you might fail?",
    },
];

/// The full ordered question bank.
pub fn question_bank() -> &'static [Question] {
    &QUESTIONS
}

/// Look up a question by id.
pub fn question(id: u32) -> Option<&'static Question> {
    QUESTIONS.iter().find(|q| q.id == id)
}

/// Sparse mapping from question id to the selected option value.
///
/// Grows as the user progresses; re-selecting overwrites. Values are
/// validated against the option set on insert. Cleared on restart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSet(BTreeMap<u32, i32>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an answer. Overwrites any previous answer for the question.
    pub fn record(&mut self, question_id: u32, value: i32) -> Result<(), ValidationError> {
        if question(question_id).is_none() {
            return Err(ValidationError::UnknownQuestion(question_id));
        }
        if option_label(value).is_none() {
            return Err(ValidationError::InvalidOptionValue { value });
        }
        self.0.insert(question_id, value);
        Ok(())
    }

    pub fn get(&self, question_id: u32) -> Option<i32> {
        self.0.get(&question_id).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, i32)> + '_ {
        self.0.iter().map(|(&id, &v)| (id, v))
    }
}
