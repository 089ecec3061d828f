use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::domain::SwipeAction;

/// Maximum number of interests a profile may carry
pub const MAX_LIKES: usize = 5;

/// Login credentials for the token endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Credentials {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Body of a swipe submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwipeRequest {
    pub target_id: i64,
    pub action: SwipeAction,
}

/// Body of a token refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(format!("unknown gender '{}'", other)),
        }
    }
}

/// Partial profile update for `PATCH /users/me/`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    #[serde(rename = "likes", skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.bio.is_none()
            && self.gender.is_none()
            && self.birth_date.is_none()
            && self.cover_image_url.is_none()
            && self.interests.is_none()
    }
}

/// Full-profile sign-up form
///
/// Submitted as multipart form-data; the cover image travels as a separate part.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegistrationForm {
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[validate(length(min = 1, max = 160))]
    pub bio: String,
    pub gender: Gender,
    pub birth_date: NaiveDate,
    #[validate(custom(function = "validate_likes"))]
    #[serde(default)]
    pub likes: Vec<String>,
}

impl RegistrationForm {
    /// Add an interest the way the sign-up form does: trimmed, lowercased, no duplicates
    pub fn add_like(&mut self, raw: &str) -> bool {
        let like = raw.trim().to_lowercase();
        if like.is_empty() || self.likes.contains(&like) {
            return false;
        }
        self.likes.push(like);
        true
    }

    pub fn remove_like(&mut self, like: &str) {
        self.likes.retain(|l| l != like);
    }

    /// Likes as the comma-separated string the register endpoint expects
    pub fn likes_field(&self) -> String {
        self.likes.join(",")
    }

    /// Text fields in submission order
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("username", self.username.clone()),
            ("email", self.email.clone()),
            ("password", self.password.clone()),
            ("first_name", self.first_name.clone()),
            ("last_name", self.last_name.clone()),
            ("bio", self.bio.clone()),
            ("gender", self.gender.as_str().to_string()),
            ("birth_date", self.birth_date.format("%Y-%m-%d").to_string()),
            ("likes", self.likes_field()),
        ]
    }
}

fn validate_likes(likes: &Vec<String>) -> Result<(), ValidationError> {
    if likes.len() > MAX_LIKES {
        let mut err = ValidationError::new("too_many_likes");
        err.message = Some(format!("at most {} likes", MAX_LIKES).into());
        return Err(err);
    }

    let is_token = |s: &String| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !likes.iter().all(is_token) {
        let mut err = ValidationError::new("invalid_like");
        err.message = Some("likes must be tokens without spaces (e.g. 'food','songs','gym')".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> RegistrationForm {
        RegistrationForm {
            username: "ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "longenough".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Lee".to_string(),
            bio: "Coffee first".to_string(),
            gender: Gender::Female,
            birth_date: NaiveDate::from_ymd_opt(1998, 3, 1).unwrap(),
            likes: vec![],
        }
    }

    #[test]
    fn test_valid_form_passes() {
        assert!(form().validate().is_ok());
    }

    #[test]
    fn test_short_password_rejected() {
        let mut f = form();
        f.password = "short".to_string();
        let errors = f.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_bio_limit() {
        let mut f = form();
        f.bio = "x".repeat(161);
        assert!(f.validate().is_err());
        f.bio = "x".repeat(160);
        assert!(f.validate().is_ok());
    }

    #[test]
    fn test_add_like_normalizes_and_dedupes() {
        let mut f = form();
        assert!(f.add_like("  Food "));
        assert!(!f.add_like("food"));
        assert!(!f.add_like("   "));
        assert!(f.add_like("gym"));
        assert_eq!(f.likes, vec!["food", "gym"]);
        assert_eq!(f.likes_field(), "food,gym");

        f.remove_like("food");
        assert_eq!(f.likes_field(), "gym");
    }

    #[test]
    fn test_likes_rules() {
        let mut f = form();
        f.likes = vec!["a", "b", "c", "d", "e", "f"].into_iter().map(String::from).collect();
        assert!(f.validate().unwrap_err().field_errors().contains_key("likes"));

        f.likes = vec!["board games".to_string()];
        assert!(f.validate().is_err());
    }

    #[test]
    fn test_empty_likes_field() {
        assert_eq!(form().likes_field(), "");
    }

    #[test]
    fn test_profile_update_skips_absent_fields() {
        let update = ProfileUpdate {
            bio: Some("new".to_string()),
            interests: Some(vec!["gym".to_string()]),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({"bio": "new", "likes": ["gym"]}));
        assert!(ProfileUpdate::default().is_empty());
    }

    #[test]
    fn test_gender_parse() {
        assert_eq!("Female".parse::<Gender>().unwrap(), Gender::Female);
        assert!("robot".parse::<Gender>().is_err());
    }
}
