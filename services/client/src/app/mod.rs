pub mod assessment;
pub mod auth;
pub mod screen;
pub mod state;
pub mod university;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export the entry points the binary and the UI build on.
pub use assessment::AssessmentViewModel;
pub use auth::{AuthRepository, RegistrationForm};
pub use screen::{QuestionView, Screen};
pub use state::AppState;
pub use university::UniversityRepository;
