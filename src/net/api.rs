//! Domain operations of the identity service.
//!
//! SYSTEM CONTEXT
//! ==============
//! `AuthService` is what pages hold. Login and signup are the only calls that
//! suspend; every accessor is a synchronous read of the credential store.
//!
//! ERROR HANDLING
//! ==============
//! Every async operation fails with a `NormalizedError` only, so forms can
//! render `user_message()` without inspecting transport details.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use super::error::NormalizedError;
use super::http::{BrowserHttpClient, HttpClient};
use super::transport::{AuthorizedTransport, SessionEvent};
use super::types::{AuthResponse, LoginCredentials, Session, SignupData, User};
use crate::config::AuthConfig;
use crate::state::session::{BrowserStorage, CredentialStore, StorageBackend};

/// Service wired to `localStorage` and `fetch`.
pub type BrowserAuthService = AuthService<BrowserStorage, BrowserHttpClient>;

pub struct AuthService<B, C> {
    transport: AuthorizedTransport<B, C>,
}

impl<B: Clone, C: Clone> Clone for AuthService<B, C> {
    fn clone(&self) -> Self {
        Self { transport: self.transport.clone() }
    }
}

impl BrowserAuthService {
    #[must_use]
    pub fn browser(config: AuthConfig) -> Self {
        let store = CredentialStore::new(BrowserStorage, &config);
        Self::new(AuthorizedTransport::new(store, BrowserHttpClient, config))
    }
}

impl<B: StorageBackend, C: HttpClient> AuthService<B, C> {
    pub fn new(transport: AuthorizedTransport<B, C>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &AuthorizedTransport<B, C> {
        &self.transport
    }

    pub fn store(&self) -> &CredentialStore<B> {
        self.transport.store()
    }

    pub fn config(&self) -> &AuthConfig {
        self.transport.config()
    }

    /// Register a new account via `POST /auth/signup`.
    ///
    /// Roles default to `AuthConfig::default_roles` when none are supplied. A
    /// session is stored only if the response carries a token.
    ///
    /// # Errors
    ///
    /// Returns a `NormalizedError` if the request fails or the response has no profile.
    pub async fn signup(&self, data: SignupData) -> Result<User, NormalizedError> {
        let endpoint = self.config().signup_endpoint.clone();
        let data = data.with_default_roles(&self.config().default_roles);
        let resp: AuthResponse = self.transport.post_json(&endpoint, &data).await?;
        if let Some(session) = resp.session() {
            self.establish(&session)?;
            return Ok(session.user);
        }
        profile_of(&resp)
    }

    /// Create a service-admin account via `POST /auth/signup/admin`.
    ///
    /// Issued by a signed-in super admin on behalf of someone else, so the
    /// caller's session is never replaced, even if the response carries a token.
    ///
    /// # Errors
    ///
    /// Returns `Malformed` when `service` is missing; otherwise as [`AuthService::signup`].
    pub async fn signup_admin(&self, data: SignupData) -> Result<User, NormalizedError> {
        let service = data.service.as_deref().map(|s| s.trim().to_uppercase()).filter(|s| !s.is_empty());
        if service.is_none() {
            return Err(NormalizedError::invalid_input("Service is required for admin registration"));
        }
        let data = SignupData { service, ..data };
        let endpoint = self.config().admin_signup_endpoint.clone();
        let resp: AuthResponse = self.transport.post_json(&endpoint, &data).await?;
        profile_of(&resp)
    }

    /// Sign in via `POST /auth/signin` and store the returned session.
    ///
    /// # Errors
    ///
    /// Returns `Malformed` for blank credentials or a response lacking a token or
    /// profile; otherwise the normalized transport failure.
    pub async fn login(&self, credentials: LoginCredentials) -> Result<Session, NormalizedError> {
        credentials.validate()?;
        let endpoint = self.config().signin_endpoint.clone();
        let resp: AuthResponse = self.transport.post_json(&endpoint, &credentials).await?;
        let session = resp
            .session()
            .ok_or_else(|| NormalizedError::malformed("login response did not include a session"))?;
        self.establish(&session)?;
        Ok(session)
    }

    /// Clear the session locally. No remote call is made.
    pub fn logout(&self) {
        self.store().clear();
        leptos::logging::log!("signed out");
        self.transport.emit(&SessionEvent::LoggedOut);
    }

    /// Refresh the stored profile from `GET /users/me`.
    ///
    /// # Errors
    ///
    /// Returns a `NormalizedError` on failure; a 401 also clears the session.
    pub async fn fetch_profile(&self) -> Result<User, NormalizedError> {
        let endpoint = self.config().profile_endpoint.clone();
        let requested_by = self.store().read();
        let resp: AuthResponse = self.transport.get_json(&endpoint).await?;
        let mut user = resp
            .user()
            .ok_or_else(|| NormalizedError::malformed("profile response did not include a user"))?;
        let (Some(before), Some(current)) = (requested_by, self.store().read()) else {
            return Ok(user);
        };
        // The session may have changed while the request was in flight.
        if current.token != before.token || current.user.id != user.id {
            leptos::logging::warn!("session changed during profile refresh; not storing profile {}", user.id);
            return Ok(user);
        }
        if user.roles.is_empty() {
            user.roles = current.user.roles;
        }
        self.store().save(&Session { token: current.token, user: user.clone() });
        Ok(user)
    }

    pub fn current_user(&self) -> Option<User> {
        self.store().user()
    }

    pub fn token(&self) -> Option<String> {
        self.store().token()
    }

    pub fn is_authenticated(&self) -> bool {
        self.store().has_session()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.store().has_role(role)
    }

    fn establish(&self, session: &Session) -> Result<(), NormalizedError> {
        self.store().save(session);
        if !self.store().has_session() {
            return Err(NormalizedError::malformed("session could not be persisted"));
        }
        leptos::logging::log!("session established for user {}", session.user.id);
        self.transport
            .emit(&SessionEvent::Established { user_id: session.user.id.clone() });
        Ok(())
    }
}

fn profile_of(resp: &AuthResponse) -> Result<User, NormalizedError> {
    resp.user()
        .ok_or_else(|| NormalizedError::malformed("signup response did not include a profile"))
}
