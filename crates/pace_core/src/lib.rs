pub mod assessment;
pub mod domain;
pub mod network;
pub mod ports;
pub mod validation;

pub use assessment::{Advance, AssessmentOutcome, AssessmentPhase, AssessmentSession, CategoryProgress};
pub use domain::{
    Answer, Credential, CourseRecommendation, DynamicLinkState, GuestKey, LoginRecord, Question,
    QuestionCategory, University, UserType, VerifiedAccount,
};
pub use network::{NetworkResult, EMPTY_BODY_MESSAGE, UNKNOWN_STATUS};
pub use ports::{
    AssessmentApi, AuthApi, CredentialStore, LoginCache, PortError, PortResult, SessionStore,
    UniversityApi, ValueStream,
};
pub use validation::ValidationError;
