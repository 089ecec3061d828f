//! Lume Swipe - client core for the Lume dating app
//!
//! This library provides the discovery loop used by the Lume clients: an
//! authenticated API client, a persisted auth session, the swipe engine with
//! its gesture mapping, and read-only match/profile views.

pub mod config;
pub mod core;
pub mod models;
pub mod services;
pub mod views;

// Re-export commonly used types
pub use crate::core::{SwipeEngine, GestureMapper, SwipeDirection, PendingSwipe, Completion};
pub use crate::models::{CandidateProfile, InteractionResult, Match, Session, SwipeAction};
pub use crate::services::{ApiClient, ApiError, AuthSession, AuthState, DatingApi, Swiper};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        let engine = SwipeEngine::new(GestureMapper::default());
        assert!(engine.is_exhausted());
        assert_eq!(engine.gestures().classify(200.0), Some(SwipeDirection::Right));
    }
}
