//! services/client/src/app/screen.rs
//!
//! What the assessment flow asks the UI to show. The view model publishes one of
//! these after every transition; the UI renders it and routes between screens.

use pace_core::assessment::{AssessmentOutcome, AssessmentPhase, AssessmentSession, CategoryProgress};
use pace_core::domain::Question;

/// Everything the question screen needs to draw itself.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionView {
    pub question: Question,
    /// 0-based position in the whole set.
    pub index: usize,
    pub total: usize,
    pub category_progress: CategoryProgress,
    pub selected_answer: Option<bool>,
    /// The "next" action completes the assessment on this question.
    pub is_last: bool,
}

impl QuestionView {
    pub fn from_session(session: &AssessmentSession) -> Option<Self> {
        let question = session.current_question()?.clone();
        let category_progress = session.category_progress()?;
        Some(Self {
            question,
            index: session.current_index(),
            total: session.total_questions(),
            category_progress,
            selected_answer: session.selected_answer(),
            is_last: session.is_last_question(),
        })
    }

    /// The "next" button is only enabled once an answer is picked.
    pub fn can_advance(&self) -> bool {
        self.selected_answer.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    /// Nothing loaded yet, or reset for a retry.
    Idle,
    Loading,
    Question(QuestionView),
    /// The backend has no questions configured.
    NoQuestions,
    /// All questions answered; the result is being computed.
    Complete,
    Result(AssessmentOutcome),
    /// A request failed. The message is shown as a dismissable alert.
    Failed { message: String },
}

impl Screen {
    /// The screen that matches the session's current phase.
    pub fn for_session(session: &AssessmentSession) -> Self {
        match session.phase() {
            AssessmentPhase::NotStarted => Screen::Idle,
            AssessmentPhase::NoQuestions => Screen::NoQuestions,
            AssessmentPhase::InProgress => QuestionView::from_session(session)
                .map(Screen::Question)
                .unwrap_or(Screen::Idle),
            AssessmentPhase::Completed => Screen::Complete,
            AssessmentPhase::Submitted(outcome) => Screen::Result(outcome.clone()),
        }
    }
}
