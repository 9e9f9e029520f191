//! services/client/src/app/assessment.rs
//!
//! The view model that drives the questionnaire screens.
//!
//! It owns an `AssessmentSession`, performs the remote calls the flow needs and
//! publishes the resulting `Screen` plus the status of the last request. Work is
//! tied to a `CancellationToken`: once the view model is closed, in-flight requests
//! are abandoned and publish nothing.

use pace_core::assessment::{Advance, AssessmentOutcome, AssessmentPhase, AssessmentSession};
use pace_core::domain::{Answer, UserType};
use pace_core::network::NetworkResult;
use pace_core::ports::{AssessmentApi, CredentialStore};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::app::screen::Screen;
use crate::app::state::AppState;

pub struct AssessmentViewModel {
    assessment_api: Arc<dyn AssessmentApi>,
    credentials: Arc<dyn CredentialStore>,
    session: Mutex<AssessmentSession>,
    screen: watch::Sender<Screen>,
    status: watch::Sender<Option<NetworkResult<()>>>,
    cancel: CancellationToken,
}

impl AssessmentViewModel {
    pub fn new(
        assessment_api: Arc<dyn AssessmentApi>,
        credentials: Arc<dyn CredentialStore>,
        user_type: UserType,
    ) -> Self {
        Self {
            assessment_api,
            credentials,
            session: Mutex::new(AssessmentSession::new(user_type)),
            screen: watch::Sender::new(Screen::Idle),
            status: watch::Sender::new(None),
            cancel: CancellationToken::new(),
        }
    }

    pub fn from_state(state: &AppState, user_type: UserType) -> Self {
        Self::new(state.assessment_api.clone(), state.credentials.clone(), user_type)
    }

    pub fn screen(&self) -> watch::Receiver<Screen> {
        self.screen.subscribe()
    }

    pub fn current_screen(&self) -> Screen {
        self.screen.borrow().clone()
    }

    /// Status of the last remote call, for spinners and alerts. `None` until the
    /// first request starts.
    pub fn network_status(&self) -> watch::Receiver<Option<NetworkResult<()>>> {
        self.status.subscribe()
    }

    /// A snapshot of the underlying state machine.
    pub async fn session(&self) -> AssessmentSession {
        self.session.lock().await.clone()
    }

    /// Cancels in-flight work. Later calls do nothing.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Runs `request` unless the view model is closed first.
    async fn run<T, F>(&self, request: F) -> Option<NetworkResult<T>>
    where
        F: Future<Output = NetworkResult<T>>,
    {
        if self.cancel.is_cancelled() {
            return None;
        }
        self.status.send_replace(Some(NetworkResult::Loading));
        let result = tokio::select! {
            _ = self.cancel.cancelled() => None,
            result = request => Some(result),
        };
        match &result {
            Some(result) => {
                self.status.send_replace(Some(result.as_status()));
            }
            None => info!("Request abandoned, view model closed"),
        }
        result
    }

    fn publish(&self, screen: Screen) {
        if !self.cancel.is_cancelled() {
            self.screen.send_replace(screen);
        }
    }

    /// Loads the question set. An empty set ends on `Screen::NoQuestions`.
    pub async fn fetch_questions(&self) {
        self.publish(Screen::Loading);
        let Some(result) = self.run(self.assessment_api.list_questions()).await else {
            return;
        };

        match result {
            NetworkResult::Success { data, .. } => {
                let mut session = self.session.lock().await;
                session.load_questions(data);
                info!(total = session.total_questions(), "Questions loaded");
                self.publish(Screen::for_session(&session));
            }
            NetworkResult::Error { message, .. } => {
                warn!(message = %message, "Failed to load questions");
                self.publish(Screen::Failed { message });
            }
            NetworkResult::Loading => {}
        }
    }

    pub async fn on_answer_click(&self, answer: bool) {
        let mut session = self.session.lock().await;
        if session.on_answer_click(answer) {
            self.publish(Screen::for_session(&session));
        }
    }

    /// Commits the selected answer. After the last question, submits the answers.
    pub async fn go_to_next_question(&self) {
        let advance = {
            let mut session = self.session.lock().await;
            let advance = session.go_to_next_question();
            if advance != Advance::Ignored {
                self.publish(Screen::for_session(&session));
            }
            advance
        };

        if let Advance::Completed { answers } = advance {
            self.on_completed_assessment(answers).await;
        }
    }

    /// Submits the answers for a completed assessment that failed to submit earlier.
    pub async fn retry_submission(&self) {
        let answers = {
            let session = self.session.lock().await;
            if session.phase() != &AssessmentPhase::Completed {
                return;
            }
            session.answers().to_vec()
        };
        self.publish(Screen::Complete);
        self.on_completed_assessment(answers).await;
    }

    /// Requests recommendations, then saves the result for registered users.
    async fn on_completed_assessment(&self, answers: Vec<Answer>) {
        info!(answers = answers.len(), "Submitting assessment");
        let Some(result) = self
            .run(self.assessment_api.recommend_courses(&answers))
            .await
        else {
            return;
        };
        let recommendation = match result {
            NetworkResult::Success { data, .. } => data,
            NetworkResult::Error { message, .. } => {
                warn!(message = %message, "Course recommendation failed");
                self.publish(Screen::Failed { message });
                return;
            }
            NetworkResult::Loading => return,
        };

        let university_id = self.credentials.get_university_id().await;
        let request = self
            .session
            .lock()
            .await
            .student_assessment_request(university_id, &recommendation);

        let saved = match request {
            None => None,
            Some(request) => {
                let Some(result) = self
                    .run(self.assessment_api.save_student_assessment(&request))
                    .await
                else {
                    return;
                };
                match result {
                    NetworkResult::Success { data, .. } => Some(data),
                    NetworkResult::Error { message, .. } => {
                        // Recommendations are still shown; the status carries the alert.
                        warn!(message = %message, "Saving the assessment result failed");
                        None
                    }
                    NetworkResult::Loading => None,
                }
            }
        };

        let mut session = self.session.lock().await;
        let outcome = AssessmentOutcome {
            recommendation,
            saved,
        };
        if session.mark_submitted(outcome) {
            info!(saved = session.should_save_result(), "Assessment submitted");
            self.publish(Screen::for_session(&session));
        }
    }

    /// Discards all progress. Used by the "retry" confirmation.
    pub async fn reset_assessment(&self) {
        let mut session = self.session.lock().await;
        session.reset();
        self.publish(Screen::Idle);
    }

    /// Reset followed by a fresh fetch.
    pub async fn retry(&self) {
        self.reset_assessment().await;
        self.fetch_questions().await;
    }
}

impl Drop for AssessmentViewModel {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
