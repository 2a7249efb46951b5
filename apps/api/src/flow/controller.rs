//! Flow Controller — the per-session state machine.
//!
//! Phases: Collecting → Questioning → Answering → Done, plus Terminated when the
//! exit keyword shows up while collecting. `render` is idempotent: with a stored
//! candidate it goes straight to question display without touching the intake form.

use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::AppError;
use crate::flow::view::{NoticeLevel, PageView};
use crate::intake::validation::{
    check_exit, validate, IntakeError, IntakeForm, EXIT_NOTICE, SUCCESS_NOTICE,
};
use crate::llm_client::TextGenerator;
use crate::questions::generator::{generate_questions, GenerationError, MAX_QUESTIONS};
use crate::questions::prompts::{FALLBACK_NOTICE, NO_QUESTIONS_NOTICE};
use crate::responses::collector::{
    collect, question_views, save_drafts, AnswerSubmission, ANSWER_BANNER, CLOSING_NOTICE,
};
use crate::session::models::{
    draft_key, Phase, QuestionSet, Session, SessionValue, CANDIDATE_KEY,
};

/// User-driven events.
#[derive(Debug, Clone)]
pub enum Event {
    FormSubmitted(IntakeForm),
    ExitDetected,
    DraftsSaved(AnswerSubmission),
    AnswersSubmitted(AnswerSubmission),
}

impl Event {
    /// Classifies a form submission. Only the Name field is checked for exit keywords.
    pub fn from_form(form: IntakeForm) -> Self {
        if check_exit(&form.name) {
            Event::ExitDetected
        } else {
            Event::FormSubmitted(form)
        }
    }
}

#[derive(Clone)]
pub struct FlowController {
    llm: Arc<dyn TextGenerator>,
}

impl FlowController {
    pub fn new(llm: Arc<dyn TextGenerator>) -> Self {
        Self { llm }
    }

    /// One render pass with no new input.
    pub async fn render(&self, session: &mut Session) -> PageView {
        let mut page = PageView::new(session);
        self.pass(session, &mut page).await;
        page
    }

    /// Applies `event`, then renders the resulting pass.
    pub async fn handle(&self, session: &mut Session, event: Event) -> Result<PageView, AppError> {
        if session.phase.is_terminal() {
            return Err(AppError::Conflict(format!(
                "session {} is already {:?}",
                session.id, session.phase
            )));
        }

        let mut page = PageView::new(session);

        match event {
            Event::FormSubmitted(form) => match validate(form) {
                Ok(record) => {
                    info!(session_id = %session.id, "Candidate record stored");
                    session
                        .state
                        .set(CANDIDATE_KEY, SessionValue::Candidate(record));
                    page.notify(NoticeLevel::Success, SUCCESS_NOTICE);
                }
                Err(IntakeError::ExitRequested) => {
                    return Ok(self.exit(session, page));
                }
                Err(e @ IntakeError::MissingFields(_)) => {
                    info!(session_id = %session.id, "Intake rejected: {e}");
                    page.notify(NoticeLevel::Error, e.notice());
                }
            },
            Event::ExitDetected => return Ok(self.exit(session, page)),
            Event::DraftsSaved(submission) => {
                let set = self.require_fresh_questions(session)?;
                save_drafts(&mut session.state, &set, submission)
                    .map_err(|e| AppError::Validation(e.to_string()))?;
            }
            Event::AnswersSubmitted(submission) => {
                let set = self.require_fresh_questions(session)?;
                let responses = collect(&set, &session.state, &submission)
                    .map_err(|e| AppError::Validation(e.to_string()))?;

                info!(
                    session_id = %session.id,
                    "Responses submitted for {} question(s)",
                    responses.len()
                );
                session.phase = Phase::Done;
                page.phase = Phase::Done;
                page.candidate = session.state.candidate().cloned();
                page.responses = Some(responses);
                page.closing = Some(CLOSING_NOTICE);
                return Ok(page);
            }
        }

        self.pass(session, &mut page).await;
        Ok(page)
    }

    /// Exit ends the conversation only while collecting. Later on it just stops
    /// this pass: notice shown, nothing stored, nothing else rendered.
    fn exit(&self, session: &mut Session, mut page: PageView) -> PageView {
        if session.phase == Phase::Collecting {
            info!(session_id = %session.id, "Exit keyword received; conversation terminated");
            session.phase = Phase::Terminated;
            page.phase = Phase::Terminated;
        }
        page.notify(NoticeLevel::Warning, EXIT_NOTICE);
        page
    }

    fn require_fresh_questions(&self, session: &Session) -> Result<Arc<QuestionSet>, AppError> {
        let fresh = match (session.state.candidate(), session.state.questions()) {
            (Some(candidate), Some(set)) if set.tech_stack == candidate.tech_stack => {
                Some(set.clone())
            }
            _ => None,
        };
        match fresh {
            Some(set) if session.phase == Phase::Answering => Ok(set),
            _ => Err(AppError::Conflict(
                "no questions are currently open for answers".to_string(),
            )),
        }
    }

    async fn pass(&self, session: &mut Session, page: &mut PageView) {
        match session.phase {
            Phase::Done => {
                page.closing = Some(CLOSING_NOTICE);
                return;
            }
            Phase::Terminated => {
                page.notify(NoticeLevel::Warning, EXIT_NOTICE);
                return;
            }
            _ => {}
        }

        let Some(candidate) = session.state.candidate().cloned() else {
            session.phase = Phase::Collecting;
            page.phase = Phase::Collecting;
            return;
        };

        page.banner = Some(ANSWER_BANNER);
        let previous = session.state.questions().cloned();

        match generate_questions(&mut session.state, &candidate.tech_stack, self.llm.as_ref()).await
        {
            Ok(set) => {
                if !previous.is_some_and(|p| Arc::ptr_eq(&p, &set)) {
                    // Answer boxes belong to the old questions.
                    for index in 1..=MAX_QUESTIONS {
                        session.state.set(draft_key(index), SessionValue::Text(String::new()));
                    }
                }
                session.phase = Phase::Answering;
                page.questions = question_views(&set, &session.state);
            }
            Err(e) => {
                warn!(session_id = %session.id, "No questions this pass: {e}");
                session.phase = Phase::Questioning;
                if matches!(e, GenerationError::Llm(_)) {
                    page.notify(NoticeLevel::Info, FALLBACK_NOTICE);
                }
                page.notify(NoticeLevel::Error, NO_QUESTIONS_NOTICE);
            }
        }

        page.phase = session.phase;
        page.candidate = Some(candidate);
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::intake::validation::complete_form;
    use crate::questions::generator::testing::ScriptedGenerator;
    use crate::responses::collector::NO_RESPONSE;

    fn controller(llm: &Arc<ScriptedGenerator>) -> FlowController {
        FlowController::new(llm.clone())
    }

    fn answers(pairs: &[(&str, &str)]) -> AnswerSubmission {
        AnswerSubmission {
            answers: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_from_form_classifies_exit() {
        let form = IntakeForm {
            name: "I QUIT".to_string(),
            ..complete_form("Rust")
        };
        assert!(matches!(Event::from_form(form), Event::ExitDetected));
        assert!(matches!(
            Event::from_form(complete_form("Rust")),
            Event::FormSubmitted(_)
        ));
    }

    #[tokio::test]
    async fn test_fresh_session_is_collecting() {
        let llm = Arc::new(ScriptedGenerator::replying("unused"));
        let mut session = Session::new(Uuid::new_v4());

        let page = controller(&llm).render(&mut session).await;

        assert_eq!(page.phase, Phase::Collecting);
        assert!(page.banner.is_none());
        assert!(page.questions.is_empty());
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_end_to_end_python_screening() {
        let llm = Arc::new(ScriptedGenerator::replying(
            "Explain list comprehensions\nWhat is GIL?",
        ));
        let flow = controller(&llm);
        let mut session = Session::new(Uuid::new_v4());

        let page = flow
            .handle(&mut session, Event::FormSubmitted(complete_form("Python")))
            .await
            .unwrap();
        assert!(page.has_notice(SUCCESS_NOTICE));
        assert_eq!(page.phase, Phase::Answering);
        assert_eq!(page.banner, Some(ANSWER_BANNER));
        let questions: Vec<&str> = page.questions.iter().map(|q| q.question.as_str()).collect();
        assert_eq!(questions, vec!["Explain list comprehensions", "What is GIL?"]);

        let page = flow
            .handle(
                &mut session,
                Event::AnswersSubmitted(answers(&[("q_1", ""), ("q_2", "it's a lock")])),
            )
            .await
            .unwrap();
        let responses = page.responses.unwrap();
        assert_eq!(responses[0].question, "Explain list comprehensions");
        assert_eq!(responses[0].answer, NO_RESPONSE);
        assert_eq!(responses[1].question, "What is GIL?");
        assert_eq!(responses[1].answer, "it's a lock");
        assert_eq!(page.closing, Some(CLOSING_NOTICE));
        assert_eq!(session.phase, Phase::Done);
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_rerender_reuses_questions_without_new_call() {
        let llm = Arc::new(ScriptedGenerator::replying("Q one\nQ two"));
        let flow = controller(&llm);
        let mut session = Session::new(Uuid::new_v4());

        flow.handle(&mut session, Event::FormSubmitted(complete_form("Rust")))
            .await
            .unwrap();
        let again = flow.render(&mut session).await;
        let third = flow.render(&mut session).await;

        assert_eq!(llm.calls(), 1);
        assert_eq!(again.questions, third.questions);
        assert!(!again.has_notice(SUCCESS_NOTICE));
    }

    #[tokio::test]
    async fn test_missing_field_stores_nothing() {
        let llm = Arc::new(ScriptedGenerator::replying("unused"));
        let mut session = Session::new(Uuid::new_v4());
        let form = IntakeForm {
            email: String::new(),
            ..complete_form("Python")
        };

        let page = controller(&llm)
            .handle(&mut session, Event::FormSubmitted(form))
            .await
            .unwrap();

        assert!(page.has_notice(crate::intake::validation::MISSING_FIELDS_NOTICE));
        assert!(!session.state.contains(CANDIDATE_KEY));
        assert_eq!(session.phase, Phase::Collecting);
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_exit_while_collecting_terminates() {
        let llm = Arc::new(ScriptedGenerator::replying("unused"));
        let flow = controller(&llm);
        let mut session = Session::new(Uuid::new_v4());
        let form = IntakeForm {
            name: "please exit now".to_string(),
            ..complete_form("Python")
        };

        let page = flow
            .handle(&mut session, Event::FormSubmitted(form))
            .await
            .unwrap();
        assert_eq!(page.phase, Phase::Terminated);
        assert!(page.has_notice(EXIT_NOTICE));
        assert!(!session.state.contains(CANDIDATE_KEY));

        let err = flow
            .handle(&mut session, Event::FormSubmitted(complete_form("Python")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_exit_after_collecting_only_stops_the_pass() {
        let llm = Arc::new(ScriptedGenerator::replying("Q"));
        let flow = controller(&llm);
        let mut session = Session::new(Uuid::new_v4());
        flow.handle(&mut session, Event::FormSubmitted(complete_form("Go")))
            .await
            .unwrap();

        let page = flow
            .handle(&mut session, Event::ExitDetected)
            .await
            .unwrap();

        assert!(page.has_notice(EXIT_NOTICE));
        assert!(page.questions.is_empty());
        assert_eq!(session.phase, Phase::Answering);
        assert_eq!(session.state.candidate().unwrap().tech_stack, "Go");
    }

    #[tokio::test]
    async fn test_generation_failure_then_retry() {
        let llm = Arc::new(ScriptedGenerator::new(vec![
            Err("quota exceeded"),
            Ok("Recovered question"),
        ]));
        let flow = controller(&llm);
        let mut session = Session::new(Uuid::new_v4());

        let page = flow
            .handle(&mut session, Event::FormSubmitted(complete_form("Kotlin")))
            .await
            .unwrap();
        assert_eq!(page.phase, Phase::Questioning);
        assert!(page.questions.is_empty());
        assert!(page.has_notice(FALLBACK_NOTICE));
        assert!(page.has_notice(NO_QUESTIONS_NOTICE));
        assert!(session.state.questions().is_none());

        let err = flow
            .handle(&mut session, Event::AnswersSubmitted(answers(&[])))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let page = flow.render(&mut session).await;
        assert_eq!(page.phase, Phase::Answering);
        assert_eq!(page.questions[0].question, "Recovered question");
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn test_resubmission_with_new_stack_regenerates_and_clears_drafts() {
        let llm = Arc::new(ScriptedGenerator::new(vec![Ok("Rust Q"), Ok("Go Q")]));
        let flow = controller(&llm);
        let mut session = Session::new(Uuid::new_v4());

        flow.handle(&mut session, Event::FormSubmitted(complete_form("Rust")))
            .await
            .unwrap();
        let page = flow
            .handle(&mut session, Event::DraftsSaved(answers(&[("q_1", "ownership")])))
            .await
            .unwrap();
        assert_eq!(page.questions[0].draft.as_deref(), Some("ownership"));

        let page = flow
            .handle(&mut session, Event::FormSubmitted(complete_form("Go")))
            .await
            .unwrap();
        assert_eq!(page.questions[0].question, "Go Q");
        assert_eq!(page.questions[0].draft, None);
        assert_eq!(session.state.candidate().unwrap().tech_stack, "Go");
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn test_drafts_survive_rerender() {
        let llm = Arc::new(ScriptedGenerator::replying("A\nB"));
        let flow = controller(&llm);
        let mut session = Session::new(Uuid::new_v4());
        flow.handle(&mut session, Event::FormSubmitted(complete_form("SQL")))
            .await
            .unwrap();
        flow.handle(&mut session, Event::DraftsSaved(answers(&[("q_2", "joins")])))
            .await
            .unwrap();

        let page = flow.render(&mut session).await;
        assert_eq!(page.questions[1].draft.as_deref(), Some("joins"));

        let page = flow
            .handle(&mut session, Event::AnswersSubmitted(answers(&[])))
            .await
            .unwrap();
        let responses = page.responses.unwrap();
        assert_eq!(responses[0].answer, NO_RESPONSE);
        assert_eq!(responses[1].answer, "joins");
    }

    #[tokio::test]
    async fn test_bad_answer_key_is_validation_error() {
        let llm = Arc::new(ScriptedGenerator::replying("Only one"));
        let flow = controller(&llm);
        let mut session = Session::new(Uuid::new_v4());
        flow.handle(&mut session, Event::FormSubmitted(complete_form("Elixir")))
            .await
            .unwrap();

        let err = flow
            .handle(&mut session, Event::AnswersSubmitted(answers(&[("q_9", "x")])))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(session.phase, Phase::Answering);
    }

    #[tokio::test]
    async fn test_done_session_renders_closing_only() {
        let llm = Arc::new(ScriptedGenerator::replying("Q"));
        let flow = controller(&llm);
        let mut session = Session::new(Uuid::new_v4());
        flow.handle(&mut session, Event::FormSubmitted(complete_form("Go")))
            .await
            .unwrap();
        flow.handle(&mut session, Event::AnswersSubmitted(answers(&[("q_1", "yes")])))
            .await
            .unwrap();

        let page = flow.render(&mut session).await;
        assert_eq!(page.phase, Phase::Done);
        assert_eq!(page.closing, Some(CLOSING_NOTICE));
        assert!(page.questions.is_empty());
        assert_eq!(llm.calls(), 1);
    }
}
