// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{CandidateProfile, OwnProfile, SwipeAction, InteractionResult, Match, UserSnapshot, Session, UploadFile};
pub use requests::{Credentials, SwipeRequest, RefreshRequest, Gender, ProfileUpdate, RegistrationForm, MAX_LIKES};
pub use responses::{TokenPair, RefreshResponse, RegisterResponse, AuthGrant, UploadedFile};
