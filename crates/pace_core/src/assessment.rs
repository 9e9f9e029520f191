//! crates/pace_core/src/assessment.rs
//!
//! The in-memory state machine behind the questionnaire.
//!
//! `NotStarted -> InProgress -> Completed -> Submitted`, with `NoQuestions` as a
//! terminal branch when the backend returns an empty set. Invalid transitions are
//! ignored rather than reported; the UI disables the matching actions anyway.

use tracing::{debug, warn};

use crate::domain::{
    Answer, CourseRecommendation, Question, QuestionCategory, StudentAssessmentRequest,
    StudentAssessmentResult, UserType,
};

/// What the backend returned for a completed assessment.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentOutcome {
    pub recommendation: CourseRecommendation,
    /// Present only when the result was saved for a registered user.
    pub saved: Option<StudentAssessmentResult>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssessmentPhase {
    NotStarted,
    /// The question set came back empty. Terminal until reset.
    NoQuestions,
    InProgress,
    Completed,
    Submitted(AssessmentOutcome),
}

/// Where the current question sits inside its own category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryProgress {
    pub category: QuestionCategory,
    /// 1-based.
    pub position: usize,
    pub total: usize,
}

/// Result of [`AssessmentSession::go_to_next_question`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Nothing selected, or not in progress.
    Ignored,
    Moved { index: usize },
    /// The last question was answered; carries every answer in question order.
    Completed { answers: Vec<Answer> },
}

#[derive(Debug, Clone)]
pub struct AssessmentSession {
    user_type: UserType,
    questions: Vec<Question>,
    current_index: usize,
    answers: Vec<Answer>,
    selected_answer: Option<bool>,
    phase: AssessmentPhase,
}

impl AssessmentSession {
    pub fn new(user_type: UserType) -> Self {
        Self {
            user_type,
            questions: Vec::new(),
            current_index: 0,
            answers: Vec::new(),
            selected_answer: None,
            phase: AssessmentPhase::NotStarted,
        }
    }

    pub fn user_type(&self) -> UserType {
        self.user_type
    }

    pub fn phase(&self) -> &AssessmentPhase {
        &self.phase
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn selected_answer(&self) -> Option<bool> {
        self.selected_answer
    }

    pub fn has_no_questions(&self) -> bool {
        self.phase == AssessmentPhase::NoQuestions
    }

    /// The question on screen, while in progress.
    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            AssessmentPhase::InProgress => self.questions.get(self.current_index),
            _ => None,
        }
    }

    pub fn is_last_question(&self) -> bool {
        self.phase == AssessmentPhase::InProgress && self.current_index + 1 == self.questions.len()
    }

    /// Installs the fetched question set. Only accepted before the flow starts.
    pub fn load_questions(&mut self, questions: Vec<Question>) -> &AssessmentPhase {
        if !matches!(
            self.phase,
            AssessmentPhase::NotStarted | AssessmentPhase::NoQuestions
        ) {
            warn!(phase = ?self.phase, "Ignoring question set loaded mid-assessment");
            return &self.phase;
        }

        self.current_index = 0;
        self.answers.clear();
        self.selected_answer = None;
        self.phase = if questions.is_empty() {
            AssessmentPhase::NoQuestions
        } else {
            AssessmentPhase::InProgress
        };
        self.questions = questions;
        debug!(
            total = self.questions.len(),
            phase = ?self.phase,
            "Question set loaded"
        );
        &self.phase
    }

    /// Records the answer picked for the current question without advancing.
    pub fn on_answer_click(&mut self, answer: bool) -> bool {
        if self.current_question().is_none() {
            return false;
        }
        self.selected_answer = Some(answer);
        true
    }

    /// Commits the selected answer and moves on, completing after the last question.
    pub fn go_to_next_question(&mut self) -> Advance {
        let Some(answer) = self.selected_answer else {
            return Advance::Ignored;
        };
        let Some(question_id) = self.current_question().map(|q| q.id) else {
            return Advance::Ignored;
        };

        self.answers.push(Answer {
            question_id,
            answer,
        });
        self.selected_answer = None;

        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
            debug!(index = self.current_index, "Advanced to next question");
            Advance::Moved {
                index: self.current_index,
            }
        } else {
            self.phase = AssessmentPhase::Completed;
            debug!(answers = self.answers.len(), "Assessment completed");
            Advance::Completed {
                answers: self.answers.clone(),
            }
        }
    }

    /// Progress of the current question within its category.
    pub fn category_progress(&self) -> Option<CategoryProgress> {
        match self.phase {
            AssessmentPhase::InProgress => category_progress(&self.questions, self.current_index),
            _ => None,
        }
    }

    /// Whether the backend should keep this user's result.
    pub fn should_save_result(&self) -> bool {
        self.user_type == UserType::Registered
    }

    /// The save request for a completed assessment. `None` for guests.
    pub fn student_assessment_request(
        &self,
        university_id: i64,
        recommendation: &CourseRecommendation,
    ) -> Option<StudentAssessmentRequest> {
        if self.phase != AssessmentPhase::Completed || !self.should_save_result() {
            return None;
        }
        Some(StudentAssessmentRequest {
            university_id,
            answers: self.answers.clone(),
            recommended_course_ids: recommendation.courses.iter().map(|c| c.id).collect(),
        })
    }

    /// Moves a completed assessment to its final state.
    pub fn mark_submitted(&mut self, outcome: AssessmentOutcome) -> bool {
        if self.phase != AssessmentPhase::Completed {
            return false;
        }
        self.phase = AssessmentPhase::Submitted(outcome);
        true
    }

    /// Back to `NotStarted`, discarding questions, answers and position.
    pub fn reset(&mut self) {
        self.questions.clear();
        self.current_index = 0;
        self.answers.clear();
        self.selected_answer = None;
        self.phase = AssessmentPhase::NotStarted;
        debug!("Assessment reset");
    }
}

/// Position of `questions[index]` among the questions sharing its category.
pub fn category_progress(questions: &[Question], index: usize) -> Option<CategoryProgress> {
    let current = questions.get(index)?;
    let in_category: Vec<&Question> = questions
        .iter()
        .filter(|q| q.category == current.category)
        .collect();
    let position = questions[..index]
        .iter()
        .filter(|q| q.category == current.category)
        .count()
        + 1;
    Some(CategoryProgress {
        category: current.category,
        position,
        total: in_category.len(),
    })
}
