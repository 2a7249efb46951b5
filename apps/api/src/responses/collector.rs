use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::models::{draft_key, QuestionSet, SessionState, SessionValue};

pub const ANSWER_BANNER: &str =
    "Please provide answer of the following question based on your expertise";
pub const NO_RESPONSE: &str = "No response provided";
pub const CLOSING_NOTICE: &str =
    "Thank you for your time! We'll get back to you soon with the next steps.";

/// Answers keyed by widget key (`q_1`, `q_2`, ...).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnswerSubmission {
    #[serde(default)]
    pub answers: HashMap<String, String>,
}

/// One question as displayed, with whatever the candidate has typed so far.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionView {
    pub index: usize,
    pub key: String,
    pub question: String,
    pub draft: Option<String>,
}

/// One echoed question/answer pair after final submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEntry {
    pub index: usize,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectError {
    #[error("unknown answer key '{0}'")]
    UnknownKey(String),
}

/// Builds the answer boxes for `set`, 1-indexed, with saved drafts filled in.
pub fn question_views(set: &QuestionSet, state: &SessionState) -> Vec<QuestionView> {
    set.questions
        .iter()
        .enumerate()
        .map(|(i, question)| {
            let index = i + 1;
            QuestionView {
                index,
                key: draft_key(index),
                question: question.clone(),
                draft: state.draft(index).map(str::to_string),
            }
        })
        .collect()
}

fn check_keys(set: &QuestionSet, submission: &AnswerSubmission) -> Result<(), CollectError> {
    let count = set.questions.len();
    let valid = |key: &str| (1..=count).any(|index| draft_key(index) == key);
    match submission.answers.keys().find(|key| !valid(key)) {
        Some(key) => Err(CollectError::UnknownKey(key.clone())),
        None => Ok(()),
    }
}

/// Stores in-progress answers so they survive the next render pass.
pub fn save_drafts(
    state: &mut SessionState,
    set: &QuestionSet,
    submission: AnswerSubmission,
) -> Result<usize, CollectError> {
    check_keys(set, &submission)?;
    let saved = submission.answers.len();
    for (key, text) in submission.answers {
        state.set(key, SessionValue::Text(text));
    }
    Ok(saved)
}

/// Pairs every question with its final answer, in question order.
///
/// A submitted answer takes precedence over a saved draft. Empty or
/// whitespace-only answers become the `NO_RESPONSE` placeholder.
pub fn collect(
    set: &QuestionSet,
    state: &SessionState,
    submission: &AnswerSubmission,
) -> Result<Vec<ResponseEntry>, CollectError> {
    check_keys(set, submission)?;
    let entries = set
        .questions
        .iter()
        .enumerate()
        .map(|(i, question)| {
            let index = i + 1;
            let answer = submission
                .answers
                .get(&draft_key(index))
                .map(String::as_str)
                .or_else(|| state.draft(index))
                .unwrap_or_default();
            let answer = if answer.trim().is_empty() {
                NO_RESPONSE.to_string()
            } else {
                answer.to_string()
            };
            ResponseEntry {
                index,
                question: question.clone(),
                answer,
            }
        })
        .collect();
    Ok(entries)
}
