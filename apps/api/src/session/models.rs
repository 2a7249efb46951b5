use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Key under which the accepted intake form lives.
pub const CANDIDATE_KEY: &str = "candidate_info";
/// Key under which the cached question set lives.
pub const QUESTIONS_KEY: &str = "questions";

/// Widget key for the answer box of question `index` (1-based).
pub fn draft_key(index: usize) -> String {
    format!("q_{index}")
}

/// Applicant details captured by the intake form. All fields are non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub experience: String,
    pub position: String,
    pub location: String,
    pub tech_stack: String,
}

/// Questions produced for one tech stack. Only reused while `tech_stack`
/// matches the candidate's current tech stack exactly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionSet {
    pub tech_stack: String,
    pub questions: Vec<String>,
}

/// Where a session is in the screening conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No candidate record yet.
    Collecting,
    /// Candidate known, question set absent or stale.
    Questioning,
    /// Fresh question set on display.
    Answering,
    /// Responses displayed; terminal.
    Done,
    /// Exit keyword seen while collecting; terminal.
    Terminated,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Done | Phase::Terminated)
    }
}

/// Values the session store can hold.
#[derive(Debug, Clone)]
pub enum SessionValue {
    Candidate(CandidateRecord),
    Questions(Arc<QuestionSet>),
    Text(String),
}

/// Per-session key-value store. Entries live until the session is torn down.
#[derive(Debug, Default)]
pub struct SessionState {
    values: HashMap<String, SessionValue>,
}

impl SessionState {
    pub fn get(&self, key: &str) -> Option<&SessionValue> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: SessionValue) {
        self.values.insert(key.into(), value);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn candidate(&self) -> Option<&CandidateRecord> {
        match self.get(CANDIDATE_KEY) {
            Some(SessionValue::Candidate(record)) => Some(record),
            _ => None,
        }
    }

    pub fn questions(&self) -> Option<&Arc<QuestionSet>> {
        match self.get(QUESTIONS_KEY) {
            Some(SessionValue::Questions(set)) => Some(set),
            _ => None,
        }
    }

    /// Saved answer text for question `index` (1-based). Blank drafts read as absent.
    pub fn draft(&self, index: usize) -> Option<&str> {
        match self.get(&draft_key(index)) {
            Some(SessionValue::Text(text)) if !text.is_empty() => Some(text),
            _ => None,
        }
    }
}

/// One screening conversation.
#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub phase: Phase,
    pub state: SessionState,
}

impl Session {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            phase: Phase::Collecting,
            state: SessionState::default(),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_candidate(tech_stack: &str) -> CandidateRecord {
    CandidateRecord {
        name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        phone: "+44 20 0000 0000".to_string(),
        experience: "5".to_string(),
        position: "Backend Engineer".to_string(),
        location: "London".to_string(),
        tech_stack: tech_stack.to_string(),
    }
}
