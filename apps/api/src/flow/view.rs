use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::responses::collector::{QuestionView, ResponseEntry};
use crate::session::models::{CandidateRecord, Phase, Session};

pub const TITLE: &str = "TalentScout Hiring Assistant";
pub const GREETING: &str = "Hello! I'm here to assist with your initial screening for tech roles. \
    I'll gather some information, ask technical questions based on your expertise, and guide you through the process. \
    If you wish to end the conversation at any time, simply type 'exit' or 'quit'.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Everything the client needs to draw one render pass.
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub phase: Phase,
    pub title: &'static str,
    pub greeting: &'static str,
    pub notices: Vec<Notice>,
    pub candidate: Option<CandidateRecord>,
    pub banner: Option<&'static str>,
    pub questions: Vec<QuestionView>,
    pub responses: Option<Vec<ResponseEntry>>,
    pub closing: Option<&'static str>,
}

impl PageView {
    pub fn new(session: &Session) -> Self {
        Self {
            session_id: session.id,
            started_at: session.created_at,
            phase: session.phase,
            title: TITLE,
            greeting: GREETING,
            notices: Vec::new(),
            candidate: None,
            banner: None,
            questions: Vec::new(),
            responses: None,
            closing: None,
        }
    }

    pub fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice::new(level, message));
    }
}

#[cfg(test)]
impl PageView {
    /// True if any notice carries exactly `message`.
    pub fn has_notice(&self, message: &str) -> bool {
        self.notices.iter().any(|n| n.message == message)
    }
}
