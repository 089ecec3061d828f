use crate::models::{AuthGrant, Credentials, RegistrationForm, Session, UploadFile, UserSnapshot};
use crate::services::api::{ApiClient, ApiError, FieldErrors};
use crate::services::store::SessionStore;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;
use validator::Validate;

/// Where the auth state machine currently is
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    LoggedOut,
    Authenticating,
    LoggedIn(Session),
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    #[allow(dead_code)]
    exp: u64,
}

/// True when `token` is a JWT whose `exp` has not passed
///
/// The signature is not checked; the server remains the authority and will
/// answer 401 for a forged or revoked token.
pub fn token_is_live(token: &str) -> bool {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_aud = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp"]);

    decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation).is_ok()
}

/// Owner of the current session
///
/// # Transitions
/// LoggedOut -> Authenticating -> LoggedIn on login/register/restore, back to
/// LoggedOut on failure, logout, or any Unauthorized reported through
/// [`AuthSession::observe`]. The store is written on entry to LoggedIn and
/// cleared on exit.
pub struct AuthSession<S: SessionStore> {
    api: ApiClient,
    store: S,
    state: AuthState,
}

impl<S: SessionStore> AuthSession<S> {
    pub fn new(api: ApiClient, store: S) -> Self {
        Self {
            api: api.anonymous(),
            store,
            state: AuthState::LoggedOut,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            AuthState::LoggedIn(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.session().is_some()
    }

    /// Gate for protected views
    pub fn require_session(&self) -> Result<&Session, ApiError> {
        self.session().ok_or(ApiError::Unauthorized)
    }

    /// API client carrying the current token
    pub fn client(&self) -> Result<ApiClient, ApiError> {
        let session = self.require_session()?;
        Ok(self.api.with_token(&session.access_token))
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Try to resume from the persisted session
    pub async fn restore(&mut self) -> &AuthState {
        let mut stored = match self.store.load() {
            Ok(Some(session)) => session,
            Ok(None) => {
                tracing::debug!("No persisted session");
                self.state = AuthState::LoggedOut;
                return &self.state;
            }
            Err(e) => {
                tracing::warn!("Discarding unreadable session: {}", e);
                self.clear_store();
                self.state = AuthState::LoggedOut;
                return &self.state;
            }
        };

        if token_is_live(&stored.access_token) {
            tracing::info!("Restored session for {}", stored.user.username);
            self.state = AuthState::LoggedIn(stored);
            return &self.state;
        }

        let refresh = match stored.refresh_token.clone() {
            Some(refresh) if token_is_live(&refresh) => refresh,
            _ => {
                tracing::info!("Persisted session expired");
                self.clear_store();
                self.state = AuthState::LoggedOut;
                return &self.state;
            }
        };

        self.state = AuthState::Authenticating;
        match self.api.refresh(&refresh).await {
            Ok(resp) => {
                stored.access_token = resp.access;
                if resp.refresh.is_some() {
                    stored.refresh_token = resp.refresh;
                }
                tracing::info!("Refreshed session for {}", stored.user.username);
                self.persist(&stored);
                self.state = AuthState::LoggedIn(stored);
            }
            Err(e) if e.is_network() => {
                // Keep the stored tokens for the next start-up
                tracing::warn!("Could not reach the server to refresh the session: {}", e);
                self.state = AuthState::LoggedOut;
            }
            Err(e) => {
                tracing::info!("Session refresh rejected: {}", e);
                self.clear_store();
                self.state = AuthState::LoggedOut;
            }
        }
        &self.state
    }

    pub async fn login(&mut self, credentials: &Credentials) -> Result<&Session, ApiError> {
        if let Err(errors) = credentials.validate() {
            return Err(ApiError::ValidationFailed(FieldErrors::from(errors)));
        }

        self.begin_authentication();
        match self.api.login(credentials).await {
            Ok(grant) => self.enter(grant),
            Err(e) => {
                tracing::info!("Login failed for {}: {}", credentials.username, e);
                self.state = AuthState::LoggedOut;
                Err(e)
            }
        }
    }

    pub async fn register(
        &mut self,
        form: &RegistrationForm,
        cover: Option<&UploadFile>,
    ) -> Result<&Session, ApiError> {
        if let Err(errors) = form.validate() {
            return Err(ApiError::ValidationFailed(FieldErrors::from(errors)));
        }

        self.begin_authentication();
        match self.api.register(form, cover).await {
            Ok(grant) => self.enter(grant),
            Err(e) => {
                tracing::info!("Registration failed for {}: {}", form.username, e);
                self.state = AuthState::LoggedOut;
                Err(e)
            }
        }
    }

    pub fn logout(&mut self) {
        if let AuthState::LoggedIn(session) = &self.state {
            tracing::info!("Logging out {}", session.user.username);
        }
        self.clear_store();
        self.state = AuthState::LoggedOut;
    }

    /// Feed any API outcome through the session; Unauthorized logs the user out
    ///
    /// Returns true when the session was dropped.
    pub fn observe<T>(&mut self, result: &Result<T, ApiError>) -> bool {
        match result {
            Err(e) if e.is_unauthorized() && self.is_logged_in() => {
                tracing::warn!("Token rejected by server, ending session");
                self.logout();
                true
            }
            _ => false,
        }
    }

    /// Leaving LoggedIn for a new attempt drops the persisted session first
    fn begin_authentication(&mut self) {
        if self.is_logged_in() {
            self.logout();
        }
        self.state = AuthState::Authenticating;
    }

    fn enter(&mut self, grant: AuthGrant) -> Result<&Session, ApiError> {
        let session = Session {
            access_token: grant.access,
            refresh_token: grant.refresh,
            user: UserSnapshot::from(&grant.user),
        };
        self.persist(&session);
        self.state = AuthState::LoggedIn(session);
        self.require_session()
    }

    fn persist(&self, session: &Session) {
        if let Err(e) = self.store.save(session) {
            tracing::error!("Failed to persist session: {}", e);
        }
    }

    fn clear_store(&self) {
        if let Err(e) = self.store.clear() {
            tracing::error!("Failed to clear persisted session: {}", e);
        }
    }
}
