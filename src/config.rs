//! Static client configuration for the auth layer.
//!
//! SYSTEM CONTEXT
//! ==============
//! The browser build has no process environment, so the API origin is baked in
//! at compile time from `RWANDABILL_API_URL`; everything else has fixed
//! defaults that match the identity service routes.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8083/api";
pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_TOKEN_KEY: &str = "token";
pub const DEFAULT_USER_KEY: &str = "user";
pub const DEFAULT_ROLE: &str = "ROLE_USER";
pub const UNAUTHORIZED_STATUS: u16 = 401;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// API origin plus prefix, without a trailing slash.
    pub api_base_url: String,
    /// Unauthenticated entry point the guard and teardown redirect to.
    pub login_path: String,
    pub signup_endpoint: String,
    pub admin_signup_endpoint: String,
    pub signin_endpoint: String,
    pub profile_endpoint: String,
    /// Storage key holding the bearer token.
    pub token_key: String,
    /// Storage key holding the serialized user profile.
    pub user_key: String,
    /// Roles sent on signup when the caller supplies none.
    pub default_roles: Vec<String>,
    /// Response statuses meaning the credential is missing, expired, or invalid.
    pub rejection_statuses: Vec<u16>,
    /// Query parameter carrying the original location through the login page.
    pub redirect_param: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
            signup_endpoint: "/auth/signup".to_owned(),
            admin_signup_endpoint: "/auth/signup/admin".to_owned(),
            signin_endpoint: "/auth/signin".to_owned(),
            profile_endpoint: "/users/me".to_owned(),
            token_key: DEFAULT_TOKEN_KEY.to_owned(),
            user_key: DEFAULT_USER_KEY.to_owned(),
            default_roles: vec![DEFAULT_ROLE.to_owned()],
            rejection_statuses: vec![UNAUTHORIZED_STATUS],
            redirect_param: "from".to_owned(),
        }
    }
}

impl AuthConfig {
    /// Build config from values captured at compile time.
    ///
    /// Optional:
    /// - `RWANDABILL_API_URL`: default `http://localhost:8083/api`
    #[must_use]
    pub fn from_build_env() -> Self {
        Self::default().with_api_base_url(option_env!("RWANDABILL_API_URL").unwrap_or(DEFAULT_API_BASE_URL))
    }

    #[must_use]
    pub fn with_api_base_url(mut self, base: &str) -> Self {
        self.api_base_url = base.trim_end_matches('/').to_owned();
        self
    }

    /// Absolute URL for an API path such as `/auth/signin`.
    #[must_use]
    pub fn endpoint_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_owned();
        }
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }

    #[must_use]
    pub fn is_rejection(&self, status: u16) -> bool {
        self.rejection_statuses.contains(&status)
    }
}
