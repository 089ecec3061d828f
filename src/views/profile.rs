use crate::models::{OwnProfile, Session};
use crate::services::{ApiError, DatingApi};
use crate::views::LoadState;

pub const NO_AGE: &str = "Age not specified";
pub const NO_BIO: &str = "No bio available";
pub const NO_INTERESTS: &str = "No interests added";

/// What the profile screen shows, with placeholders already applied
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileCard {
    pub name: String,
    pub age_line: String,
    pub bio: String,
    pub interests: Vec<String>,
    pub cover_image_url: Option<String>,
}

impl ProfileCard {
    pub fn from_profile(profile: &OwnProfile) -> Self {
        let first = [profile.first_name.as_str(), profile.username.as_str()]
            .into_iter()
            .find(|s| !s.trim().is_empty())
            .unwrap_or("Unknown");
        let name = format!("{} {}", first, profile.last_name).trim().to_string();

        Self {
            name,
            age_line: profile
                .age
                .map(|age| format!("{} years old", age))
                .unwrap_or_else(|| NO_AGE.to_string()),
            bio: profile
                .bio
                .clone()
                .filter(|b| !b.trim().is_empty())
                .unwrap_or_else(|| NO_BIO.to_string()),
            interests: profile.interests.clone(),
            cover_image_url: profile.cover_image_url.clone(),
        }
    }

    /// Minimal card from the persisted snapshot when the fetch fails
    pub fn from_session(session: &Session) -> Self {
        let name = if session.display_name().trim().is_empty() {
            session.user.username.clone()
        } else {
            session.display_name().to_string()
        };
        Self {
            name,
            age_line: NO_AGE.to_string(),
            bio: NO_BIO.to_string(),
            interests: Vec::new(),
            cover_image_url: None,
        }
    }

    pub fn render(&self) -> String {
        let interests = if self.interests.is_empty() {
            NO_INTERESTS.to_string()
        } else {
            self.interests
                .iter()
                .map(|i| format!("#{}", i))
                .collect::<Vec<_>>()
                .join(" ")
        };

        let mut lines = vec![self.name.clone(), self.age_line.clone(), self.bio.clone(), interests];
        if let Some(url) = &self.cover_image_url {
            lines.insert(0, format!("[{}]", url));
        }
        lines.join("\n")
    }
}

/// Own-profile screen, fetched once when shown
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileView {
    pub state: LoadState<ProfileCard>,
}

impl ProfileView {
    pub async fn load<A: DatingApi + ?Sized>(api: &A, session: Option<&Session>) -> Self {
        Self::from_result(api.get_profile().await, session)
    }

    pub fn from_result(result: Result<OwnProfile, ApiError>, session: Option<&Session>) -> Self {
        let state = match result {
            Ok(profile) => LoadState::Loaded(ProfileCard::from_profile(&profile)),
            Err(e) => {
                tracing::error!("Error fetching profile: {}", e);
                match session {
                    Some(session) => LoadState::Loaded(ProfileCard::from_session(session)),
                    None => LoadState::Failed(e.to_string()),
                }
            }
        };
        Self { state }
    }

    pub fn render(&self) -> String {
        match &self.state {
            LoadState::Loading => "Loading profile...".to_string(),
            LoadState::Failed(_) => "Unable to load profile data".to_string(),
            LoadState::Loaded(card) => card.render(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserSnapshot;

    fn bare_profile() -> OwnProfile {
        OwnProfile {
            id: 1,
            username: "ana".to_string(),
            email: None,
            first_name: String::new(),
            last_name: String::new(),
            age: None,
            bio: None,
            gender: None,
            birth_date: None,
            cover_image_url: None,
            interests: vec![],
        }
    }

    #[test]
    fn test_placeholders_for_missing_fields() {
        let card = ProfileCard::from_profile(&bare_profile());
        assert_eq!(card.name, "ana");
        assert_eq!(card.render(), "ana\nAge not specified\nNo bio available\nNo interests added");
    }

    #[test]
    fn test_full_profile() {
        let mut p = bare_profile();
        p.first_name = "Ana".to_string();
        p.last_name = "Lee".to_string();
        p.age = Some(27);
        p.bio = Some("Coffee first".to_string());
        p.interests = vec!["food".to_string(), "gym".to_string()];

        let card = ProfileCard::from_profile(&p);
        assert_eq!(card.render(), "Ana Lee\n27 years old\nCoffee first\n#food #gym");
    }

    #[test]
    fn test_unknown_name() {
        let mut p = bare_profile();
        p.username = String::new();
        assert_eq!(ProfileCard::from_profile(&p).name, "Unknown");
    }

    #[test]
    fn test_session_fallback() {
        let session = Session {
            access_token: "t".to_string(),
            refresh_token: None,
            user: UserSnapshot {
                id: 1,
                username: "ana".to_string(),
                display_name: "Ana Lee".to_string(),
            },
        };
        let card = ProfileCard::from_session(&session);
        assert_eq!(card.name, "Ana Lee");
        assert_eq!(card.bio, NO_BIO);
    }
}
