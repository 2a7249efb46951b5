//! Question Generator — turns a tech stack into at most five interview questions.
//!
//! Flow: cache check (exact tech-stack match) → build prompt → one LLM call →
//!       parse lines → cache → return.
//!
//! Failures are never cached, so the next render pass calls the model again.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::llm_client::{LlmError, TextGenerator};
use crate::questions::prompts::build_prompt;
use crate::session::models::{QuestionSet, SessionState, SessionValue, QUESTIONS_KEY};

/// Hard cap on questions kept from a single response.
pub const MAX_QUESTIONS: usize = 5;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("question generation call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("model response contained no usable questions")]
    NoQuestions,
}

/// Splits a raw model response into questions.
///
/// Each line is trimmed, stripped of leading enumeration characters
/// (digits, '.', '-', space), and dropped if nothing remains.
pub fn parse_questions(raw: &str) -> Vec<String> {
    raw.lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(|c: char| c.is_ascii_digit() || matches!(c, '.' | '-' | ' '))
        })
        .filter(|line| !line.is_empty())
        .take(MAX_QUESTIONS)
        .map(str::to_string)
        .collect()
}

/// Returns the questions for `tech_stack`, generating them on a cache miss.
///
/// A cached set is reused only when its tech stack equals `tech_stack` byte for byte;
/// the same `Arc` comes back each time, so question keys stay stable across passes.
pub async fn generate_questions(
    state: &mut SessionState,
    tech_stack: &str,
    llm: &dyn TextGenerator,
) -> Result<Arc<QuestionSet>, GenerationError> {
    if let Some(cached) = state.questions() {
        if cached.tech_stack == tech_stack {
            debug!("Question cache hit for tech stack {tech_stack:?}");
            return Ok(cached.clone());
        }
    }

    info!("Generating questions for tech stack {tech_stack:?}");
    let raw = llm.generate(&build_prompt(tech_stack)).await.map_err(|e| {
        warn!("Question generation failed: {e}");
        GenerationError::Llm(e)
    })?;

    let questions = parse_questions(&raw);
    if questions.is_empty() {
        warn!("Model response had no usable question lines");
        return Err(GenerationError::NoQuestions);
    }

    let set = Arc::new(QuestionSet {
        tech_stack: tech_stack.to_string(),
        questions,
    });
    state.set(QUESTIONS_KEY, SessionValue::Questions(set.clone()));
    info!("Cached {} questions", set.questions.len());
    Ok(set)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::llm_client::{LlmError, TextGenerator};

    /// Scripted `TextGenerator` that replays canned replies and counts calls.
    /// Once the script runs out, the last reply repeats.
    pub struct ScriptedGenerator {
        replies: Mutex<Vec<Result<String, String>>>,
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        pub fn new(replies: Vec<Result<&str, &str>>) -> Self {
            Self {
                replies: Mutex::new(
                    replies
                        .into_iter()
                        .map(|r| r.map(str::to_string).map_err(str::to_string))
                        .collect(),
                ),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn replying(text: &str) -> Self {
            Self::new(vec![Ok(text)])
        }

        pub fn failing() -> Self {
            Self::new(vec![Err("quota exceeded")])
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn last_prompt(&self) -> Option<String> {
            self.prompts.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            let replies = self.replies.lock().unwrap();
            let reply = replies
                .get(n)
                .or_else(|| replies.last())
                .cloned()
                .unwrap_or_else(|| Err("no scripted reply".to_string()));
            reply.map_err(|message| LlmError::Api {
                status: 429,
                message,
            })
        }
    }
}
