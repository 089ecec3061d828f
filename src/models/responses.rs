use serde::{Deserialize, Serialize};
use crate::models::domain::OwnProfile;

/// Token pair returned by `/auth/token/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Response of `/auth/token/refresh/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Response of `/auth/register/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user: OwnProfile,
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Tokens plus the user they belong to
#[derive(Debug, Clone)]
pub struct AuthGrant {
    pub access: String,
    pub refresh: Option<String>,
    pub user: OwnProfile,
}

impl From<RegisterResponse> for AuthGrant {
    fn from(resp: RegisterResponse) -> Self {
        Self {
            access: resp.access,
            refresh: resp.refresh,
            user: resp.user,
        }
    }
}

/// Stored file descriptor returned by `/upload/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFile {
    pub url: String,
}
