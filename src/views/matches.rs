use crate::models::Match;
use crate::services::{ApiError, DatingApi};
use crate::views::LoadState;

pub const NO_MATCHES: &str = "No matches yet\nKeep swiping to find your perfect match!";

/// One tile in the matches grid
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCard {
    pub match_id: i64,
    pub user_id: i64,
    pub name: String,
    pub age_line: String,
    pub cover_image_url: Option<String>,
}

impl MatchCard {
    /// Project a match onto the party that is not `own_user_id`
    pub fn from_match(m: &Match, own_user_id: i64) -> Self {
        let other = m.counterpart(own_user_id);
        Self {
            match_id: m.id,
            user_id: other.id,
            name: other.full_name(),
            age_line: match other.age {
                Some(age) => format!("{} years old", age),
                None => "Age not specified".to_string(),
            },
            cover_image_url: other.cover_image_url.clone(),
        }
    }
}

/// Matches list, fetched once when shown
#[derive(Debug, Clone, PartialEq)]
pub struct MatchesView {
    pub state: LoadState<Vec<MatchCard>>,
}

impl MatchesView {
    pub fn new() -> Self {
        Self {
            state: LoadState::Loading,
        }
    }

    pub async fn load<A: DatingApi + ?Sized>(api: &A, own_user_id: i64) -> Self {
        Self::from_result(api.get_matches().await, own_user_id)
    }

    pub fn from_result(result: Result<Vec<Match>, ApiError>, own_user_id: i64) -> Self {
        let result = result.map(|matches| {
            matches
                .iter()
                .map(|m| MatchCard::from_match(m, own_user_id))
                .collect::<Vec<_>>()
        });
        if let Err(e) = &result {
            tracing::error!("Error fetching matches: {}", e);
        }
        Self {
            state: LoadState::from_result(result),
        }
    }

    pub fn render(&self) -> String {
        match &self.state {
            LoadState::Loading => "Loading your matches...".to_string(),
            LoadState::Failed(_) => NO_MATCHES.to_string(),
            LoadState::Loaded(cards) if cards.is_empty() => NO_MATCHES.to_string(),
            LoadState::Loaded(cards) => {
                let mut lines = vec!["Your Matches".to_string()];
                lines.extend(cards.iter().map(|c| format!("- {} ({})", c.name, c.age_line)));
                lines.join("\n")
            }
        }
    }
}

impl Default for MatchesView {
    fn default() -> Self {
        Self::new()
    }
}
