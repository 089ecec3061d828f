use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Public profile of another user as served by the feed, swipe and match endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(rename = "likes", default, deserialize_with = "null_as_empty")]
    pub interests: Vec<String>,
}

impl CandidateProfile {
    /// "First Last", trimmed when either half is blank
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Full profile of the logged-in user (`/users/me/`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnProfile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(rename = "likes", default, deserialize_with = "null_as_empty")]
    pub interests: Vec<String>,
}

impl OwnProfile {
    /// Name shown in the navbar and profile header
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// `likes` may be sent as `null`
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Swipe decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeAction {
    Like,
    Pass,
}

impl SwipeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeAction::Like => "like",
            SwipeAction::Pass => "pass",
        }
    }
}

impl std::fmt::Display for SwipeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a swipe submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionResult {
    #[serde(default)]
    pub matched: bool,
    #[serde(default)]
    pub match_id: Option<i64>,
    #[serde(rename = "next", default)]
    pub next_candidate: Option<CandidateProfile>,
}

/// Mutual like between two users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: i64,
    #[serde(rename = "user1")]
    pub user_a: CandidateProfile,
    #[serde(rename = "user2")]
    pub user_b: CandidateProfile,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Match {
    /// The party that is not `own_user_id`
    pub fn counterpart(&self, own_user_id: i64) -> &CandidateProfile {
        if self.user_a.id == own_user_id {
            &self.user_b
        } else {
            &self.user_a
        }
    }
}

/// Minimal user snapshot persisted alongside the tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub id: i64,
    pub username: String,
    pub display_name: String,
}

impl From<&OwnProfile> for UserSnapshot {
    fn from(profile: &OwnProfile) -> Self {
        Self {
            id: profile.id,
            username: profile.username.clone(),
            display_name: profile.display_name(),
        }
    }
}

/// Authenticated session owned by the auth layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub user: UserSnapshot,
}

impl Session {
    pub fn user_id(&self) -> i64 {
        self.user.id
    }

    pub fn display_name(&self) -> &str {
        &self.user.display_name
    }
}

/// In-memory file for multipart uploads
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime_type: Option<String>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
            mime_type: None,
        }
    }

    pub fn with_mime(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Guess the mime type from the file extension
    pub fn guessed_mime(&self) -> &str {
        if let Some(mime) = &self.mime_type {
            return mime;
        }
        let ext = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "gif" => "image/gif",
            "webp" => "image/webp",
            _ => "application/octet-stream",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: i64) -> CandidateProfile {
        CandidateProfile {
            id,
            username: format!("user{}", id),
            first_name: "Ana".to_string(),
            last_name: String::new(),
            age: Some(27),
            bio: None,
            gender: None,
            birth_date: None,
            cover_image_url: None,
            interests: vec![],
        }
    }

    #[test]
    fn test_candidate_decodes_server_shape() {
        let json = r#"{
            "id": 7, "username": "ana", "first_name": "Ana", "last_name": "Lee",
            "bio": null, "gender": "female", "age": 27, "birth_date": "1998-03-01",
            "cover_image_url": "http://x/y.jpg", "likes": ["food", "gym"]
        }"#;
        let parsed: CandidateProfile = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.id, 7);
        assert_eq!(parsed.interests, vec!["food", "gym"]);
        assert!(parsed.bio.is_none());
        assert_eq!(parsed.full_name(), "Ana Lee");
    }

    #[test]
    fn test_null_likes_decode_as_empty() {
        let parsed: CandidateProfile =
            serde_json::from_str(r#"{"id": 1, "first_name": "A", "likes": null}"#).unwrap();
        assert!(parsed.interests.is_empty());

        let own: OwnProfile =
            serde_json::from_str(r#"{"id": 2, "username": "ana", "likes": null}"#).unwrap();
        assert!(own.interests.is_empty());

        let feed: Vec<CandidateProfile> =
            serde_json::from_str(r#"[{"id": 3, "likes": ["gym"]}, {"id": 4, "likes": null}, {"id": 5}]"#).unwrap();
        assert_eq!(feed.len(), 3);
        assert_eq!(feed[0].interests, vec!["gym"]);
    }

    #[test]
    fn test_interaction_result_next_key() {
        let json = r#"{"matched": true, "match_id": 3, "next": {"id": 9}}"#;
        let parsed: InteractionResult = serde_json::from_str(json).unwrap();
        assert!(parsed.matched);
        assert_eq!(parsed.next_candidate.map(|c| c.id), Some(9));

        let parsed: InteractionResult = serde_json::from_str(r#"{"matched": false, "next": null}"#).unwrap();
        assert!(parsed.next_candidate.is_none());
    }

    #[test]
    fn test_match_counterpart() {
        let m = Match {
            id: 1,
            user_a: profile(10),
            user_b: profile(20),
            created_at: None,
        };
        assert_eq!(m.counterpart(10).id, 20);
        assert_eq!(m.counterpart(20).id, 10);
    }

    #[test]
    fn test_full_name_trims_blank_half() {
        assert_eq!(profile(1).full_name(), "Ana");
    }

    #[test]
    fn test_upload_mime_guess() {
        assert_eq!(UploadFile::new("me.JPG", vec![]).guessed_mime(), "image/jpeg");
        assert_eq!(UploadFile::new("doc", vec![]).guessed_mime(), "application/octet-stream");
        assert_eq!(
            UploadFile::new("doc", vec![]).with_mime("text/plain").guessed_mime(),
            "text/plain"
        );
    }
}
