use crate::config::ApiSettings;
use crate::models::{
    AuthGrant, CandidateProfile, Credentials, InteractionResult, Match, OwnProfile, ProfileUpdate,
    RefreshRequest, RefreshResponse, RegisterResponse, RegistrationForm, SwipeAction, SwipeRequest,
    TokenPair, UploadFile, UploadedFile,
};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Field-keyed validation messages returned with a 400
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Parse a `{"field": ["msg", ...]}` or `{"field": "msg"}` body
    pub fn from_json(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let mut fields = BTreeMap::new();
        for (field, messages) in obj {
            let messages = match messages {
                Value::String(s) => vec![s.clone()],
                Value::Array(items) => items
                    .iter()
                    .map(|m| m.as_str().map(str::to_string).unwrap_or_else(|| m.to_string()))
                    .collect(),
                other => vec![other.to_string()],
            };
            fields.insert(field.clone(), messages);
        }
        Some(Self(fields))
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::default();
        for (field, errs) in errors.field_errors() {
            for err in errs {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("invalid ({})", err.code));
                fields.insert(field.to_string(), message);
            }
        }
        fields
    }
}

/// Errors that can occur when talking to the dating API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: missing or expired token")]
    Unauthorized,

    #[error("Validation failed: {0}")]
    ValidationFailed(FieldErrors),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ApiError::ValidationFailed(fields) => Some(fields),
            _ => None,
        }
    }

    /// Map a non-success response onto the error taxonomy
    async fn from_response(response: Response) -> Self {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read body".to_string());

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized,
            StatusCode::NOT_FOUND => ApiError::NotFound(body),
            StatusCode::BAD_REQUEST => serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| FieldErrors::from_json(&v))
                .map(ApiError::ValidationFailed)
                .unwrap_or(ApiError::Server {
                    status: status.as_u16(),
                    message: body,
                }),
            _ => ApiError::Server {
                status: status.as_u16(),
                message: body,
            },
        }
    }
}

/// Calls the swipe loop and the read-only views depend on
#[async_trait]
pub trait DatingApi: Send + Sync {
    async fn get_feed(&self) -> Result<Vec<CandidateProfile>, ApiError>;

    async fn swipe(&self, target_id: i64, action: SwipeAction) -> Result<InteractionResult, ApiError>;

    async fn get_matches(&self) -> Result<Vec<Match>, ApiError>;

    async fn get_profile(&self) -> Result<OwnProfile, ApiError>;
}

/// Dating API client
///
/// Handles all communication with the backend including:
/// - Token issue, refresh and registration
/// - Profile read/update and uploads
/// - Feed, swipe and match retrieval
///
/// The bearer token is injected by the session layer through [`ApiClient::with_token`];
/// the client itself never touches persisted state.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    dating_prefix: String,
    client: Client,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new client without a token
    pub fn new(
        base_url: impl Into<String>,
        dating_prefix: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            dating_prefix: normalize_prefix(&dating_prefix.into()),
            client,
            token: None,
        })
    }

    pub fn from_settings(settings: &ApiSettings) -> Result<Self, ApiError> {
        Self::new(
            settings.base_url.clone(),
            settings.dating_prefix.clone(),
            settings.timeout_secs.map(Duration::from_secs),
        )
    }

    /// A copy of this client that authenticates as `token`
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..self.clone()
        }
    }

    /// A copy of this client with no credentials attached
    pub fn anonymous(&self) -> Self {
        Self {
            token: None,
            ..self.clone()
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn dating_url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, self.dating_prefix, path)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let request_id = Uuid::new_v4();
        tracing::debug!("{} {} (request {})", method, url, request_id);

        let mut builder = self
            .client
            .request(method, url)
            .header("X-Request-Id", request_id.to_string());
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await?;

        if !response.status().is_success() {
            let err = ApiError::from_response(response).await;
            tracing::debug!("Request failed: {}", err);
            return Err(err);
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }

    /// Full-profile registration; returns the created user and tokens
    pub async fn register(
        &self,
        form: &RegistrationForm,
        cover: Option<&UploadFile>,
    ) -> Result<AuthGrant, ApiError> {
        let mut multipart = Form::new();
        for (name, value) in form.text_fields() {
            multipart = multipart.text(name, value);
        }
        if let Some(file) = cover {
            multipart = multipart.part("cover", file_part(file)?);
        }

        let url = self.url("/auth/register/");
        let builder = self.anonymous().request(Method::POST, &url).multipart(multipart);
        let response: RegisterResponse = self.send(builder).await?;

        tracing::info!("Registered user {}", response.user.username);
        Ok(response.into())
    }

    /// Exchange credentials for tokens, then load the user they belong to
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthGrant, ApiError> {
        let url = self.url("/auth/token/");
        let builder = self.anonymous().request(Method::POST, &url).json(credentials);
        let tokens: TokenPair = self.send(builder).await?;

        let user = self.with_token(&tokens.access).get_profile().await?;

        tracing::info!("Logged in as {}", user.username);
        Ok(AuthGrant {
            access: tokens.access,
            refresh: tokens.refresh,
            user,
        })
    }

    /// Trade a refresh token for a new access token
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, ApiError> {
        let url = self.url("/auth/token/refresh/");
        let body = RefreshRequest {
            refresh: refresh_token.to_string(),
        };
        let builder = self.anonymous().request(Method::POST, &url).json(&body);
        self.send(builder).await
    }

    pub async fn get_profile(&self) -> Result<OwnProfile, ApiError> {
        let url = self.url("/users/me/");
        self.send(self.request(Method::GET, &url)).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<OwnProfile, ApiError> {
        let url = self.url("/users/me/");
        self.send(self.request(Method::PATCH, &url).json(update)).await
    }

    /// Server-ranked discovery feed; already-swiped users are excluded server-side
    pub async fn get_feed(&self) -> Result<Vec<CandidateProfile>, ApiError> {
        let url = self.dating_url("/feed/");
        let feed: Vec<CandidateProfile> = self.send(self.request(Method::GET, &url)).await?;
        tracing::debug!("Fetched {} candidates", feed.len());
        Ok(feed)
    }

    pub async fn swipe(&self, target_id: i64, action: SwipeAction) -> Result<InteractionResult, ApiError> {
        let url = self.dating_url("/swipe/");
        let body = SwipeRequest { target_id, action };
        self.send(self.request(Method::POST, &url).json(&body)).await
    }

    pub async fn get_matches(&self) -> Result<Vec<Match>, ApiError> {
        let url = self.dating_url("/matches/");
        self.send(self.request(Method::GET, &url)).await
    }

    /// Upload a file; with `set_as_cover` the server also makes it the profile cover
    pub async fn upload_file(&self, file: &UploadFile, set_as_cover: bool) -> Result<UploadedFile, ApiError> {
        let url = self.url("/upload/");
        let mut builder = self.request(Method::POST, &url);
        if set_as_cover {
            builder = builder.query(&[("set_as_cover", "true")]);
        }
        let multipart = Form::new().part("file", file_part(file)?);
        let uploaded: UploadedFile = self.send(builder.multipart(multipart)).await?;

        tracing::info!("Uploaded {} -> {}", file.file_name, uploaded.url);
        Ok(uploaded)
    }
}

#[async_trait]
impl DatingApi for ApiClient {
    async fn get_feed(&self) -> Result<Vec<CandidateProfile>, ApiError> {
        ApiClient::get_feed(self).await
    }

    async fn swipe(&self, target_id: i64, action: SwipeAction) -> Result<InteractionResult, ApiError> {
        ApiClient::swipe(self, target_id, action).await
    }

    async fn get_matches(&self) -> Result<Vec<Match>, ApiError> {
        ApiClient::get_matches(self).await
    }

    async fn get_profile(&self) -> Result<OwnProfile, ApiError> {
        ApiClient::get_profile(self).await
    }
}

fn file_part(file: &UploadFile) -> Result<Part, ApiError> {
    let part = Part::bytes(file.bytes.clone())
        .file_name(file.file_name.clone())
        .mime_str(file.guessed_mime())?;
    Ok(part)
}

/// "/dating", "dating/" and "dating" all become "/dating"; blank stays blank
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_client_creation() {
        let client = ApiClient::new("http://127.0.0.1:8000/api/", "dating/", None).unwrap();

        assert_eq!(client.base_url(), "http://127.0.0.1:8000/api");
        assert_eq!(client.dating_url("/feed/"), "http://127.0.0.1:8000/api/dating/feed/");
        assert_eq!(client.url("/users/me/"), "http://127.0.0.1:8000/api/users/me/");
        assert!(client.token().is_none());
    }

    #[test]
    fn test_legacy_prefix() {
        let client = ApiClient::new("http://host/api", "", None).unwrap();
        assert_eq!(client.dating_url("/swipe/"), "http://host/api/swipe/");
    }

    #[test]
    fn test_with_token_leaves_original_untouched() {
        let client = ApiClient::new("http://host/api", "/dating", None).unwrap();
        let authed = client.with_token("abc");
        assert_eq!(authed.token(), Some("abc"));
        assert!(client.token().is_none());
        assert!(authed.anonymous().token().is_none());
    }

    #[test]
    fn test_field_errors_from_json() {
        let fields = FieldErrors::from_json(&json!({
            "email": ["already taken"],
            "detail": "cover too large (max 5MB)"
        }))
        .unwrap();

        assert_eq!(fields.get("email"), Some(&["already taken".to_string()][..]));
        assert_eq!(fields.get("detail").map(|m| m.len()), Some(1));
        assert!(FieldErrors::from_json(&json!(["not", "an", "object"])).is_none());
    }

    #[test]
    fn test_error_classification() {
        assert!(ApiError::Unauthorized.is_unauthorized());
        assert!(!ApiError::NotFound("x".into()).is_unauthorized());
        let err = ApiError::ValidationFailed(FieldErrors::default());
        assert!(err.field_errors().is_some());
    }
}
