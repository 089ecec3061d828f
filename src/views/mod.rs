// Read-only renderers over API data
pub mod card;
pub mod forms;
pub mod matches;
pub mod profile;

pub use card::{render_card, render_background_card, render_match_dialog, render_swipe_screen, NO_MORE_CARDS};
pub use forms::{format_field_errors, form_error_message};
pub use matches::{MatchCard, MatchesView, NO_MATCHES};
pub use profile::{ProfileCard, ProfileView};

use crate::services::ApiError;

/// Fetch-once lifecycle shared by the views
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn from_result(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(value) => LoadState::Loaded(value),
            Err(e) => LoadState::Failed(e.to_string()),
        }
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(value) => Some(value),
            _ => None,
        }
    }
}
