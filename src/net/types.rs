//! Wire and session DTOs shared by the store, transport, and guard.
//!
//! DESIGN
//! ======
//! Field names follow the identity service's camelCase JSON so the persisted
//! profile and the login response deserialize through the same types.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use super::error::NormalizedError;

/// Profile of the authenticated user, as persisted next to the token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Account identifier. The service sends a number; stored copies hold a string.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub telephone: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub sector: String,
    pub roles: Vec<String>,
}

impl User {
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// True when any of `required` is held. An empty list is never satisfied here;
    /// the guard treats "no restriction" separately.
    #[must_use]
    pub fn has_any_role(&self, required: &[String]) -> bool {
        required.iter().any(|r| self.has_role(r))
    }
}

/// The authenticated identity held by the client. Token and user travel together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Success body of `POST /auth/signin` and `POST /auth/signup`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    /// Credential scheme, normally `"Bearer"`. Informational only.
    #[serde(default, rename = "type")]
    pub token_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub telephone: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    /// Single-role variant some service builds return instead of `roles`.
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl AuthResponse {
    /// Profile portion of the response, if it identifies a user.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        let id = self.id.clone()?;
        let mut roles = self.roles.clone();
        if roles.is_empty() {
            roles.extend(self.role.clone());
        }
        Some(User {
            id,
            username: self.username.clone().unwrap_or_default(),
            email: self.email.clone().unwrap_or_default(),
            full_name: self.full_name.clone().unwrap_or_default(),
            telephone: self.telephone.clone().unwrap_or_default(),
            district: self.district.clone().unwrap_or_default(),
            sector: self.sector.clone().unwrap_or_default(),
            roles,
        })
    }

    /// Token and profile as a unit, or `None` when either half is missing.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        let token = self.token.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
        let user = self.user()?;
        Some(Session { token: token.to_owned(), user })
    }
}

/// Registration payload for `POST /auth/signup`.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupData {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub telephone: String,
    pub district: String,
    pub sector: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
    /// Utility a service admin manages (e.g. `"WATER"`). Required by admin signup only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

impl SignupData {
    /// Fill in `defaults` when no role set (or an empty one) was supplied.
    #[must_use]
    pub fn with_default_roles(mut self, defaults: &[String]) -> Self {
        if self.roles.as_ref().is_none_or(Vec::is_empty) {
            self.roles = Some(defaults.to_vec());
        }
        self
    }
}

impl fmt::Debug for SignupData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupData")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("full_name", &self.full_name)
            .field("telephone", &self.telephone)
            .field("district", &self.district)
            .field("sector", &self.sector)
            .field("roles", &self.roles)
            .field("service", &self.service)
            .finish()
    }
}

/// Which identifier a login attempt uses. Exactly one is sent per call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoginIdentifier {
    Email(String),
    Phone(String),
}

/// Credentials for `POST /auth/signin`.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    pub identifier: LoginIdentifier,
    pub password: String,
}

impl LoginCredentials {
    #[must_use]
    pub fn email(email: &str, password: &str) -> Self {
        Self { identifier: LoginIdentifier::Email(email.trim().to_owned()), password: password.to_owned() }
    }

    #[must_use]
    pub fn phone(phone: &str, password: &str) -> Self {
        Self { identifier: LoginIdentifier::Phone(phone.trim().to_owned()), password: password.to_owned() }
    }

    /// Classify a single "email or phone" form input.
    ///
    /// # Errors
    ///
    /// Returns `Malformed` when the identifier or password is blank.
    pub fn from_identifier(input: &str, password: &str) -> Result<Self, NormalizedError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(NormalizedError::invalid_input("Enter an email or phone number."));
        }
        let creds = if input.contains('@') { Self::email(input, password) } else { Self::phone(input, password) };
        creds.validate()?;
        Ok(creds)
    }

    /// Build from separate optional form fields.
    ///
    /// # Errors
    ///
    /// Returns `Malformed` unless exactly one of `email`/`phone` is non-blank and
    /// the password is non-blank.
    pub fn from_fields(email: Option<&str>, phone: Option<&str>, password: &str) -> Result<Self, NormalizedError> {
        let email = email.map(str::trim).filter(|v| !v.is_empty());
        let phone = phone.map(str::trim).filter(|v| !v.is_empty());
        let creds = match (email, phone) {
            (Some(email), None) => Self::email(email, password),
            (None, Some(phone)) => Self::phone(phone, password),
            (Some(_), Some(_)) => {
                return Err(NormalizedError::invalid_input("Provide either an email or a phone number, not both."));
            }
            (None, None) => return Err(NormalizedError::invalid_input("Enter an email or phone number.")),
        };
        creds.validate()?;
        Ok(creds)
    }

    /// # Errors
    ///
    /// Returns `Malformed` when the identifier or password is blank.
    pub fn validate(&self) -> Result<(), NormalizedError> {
        let id = match &self.identifier {
            LoginIdentifier::Email(v) | LoginIdentifier::Phone(v) => v,
        };
        if id.trim().is_empty() {
            return Err(NormalizedError::invalid_input("Enter an email or phone number."));
        }
        if self.password.trim().is_empty() {
            return Err(NormalizedError::invalid_input("Password is required."));
        }
        Ok(())
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("identifier", &self.identifier)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone_number: Option<&'a str>,
    password: &'a str,
}

impl Serialize for LoginCredentials {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let (email, phone_number) = match &self.identifier {
            LoginIdentifier::Email(v) => (Some(v.as_str()), None),
            LoginIdentifier::Phone(v) => (None, Some(v.as_str())),
        };
        LoginBody { email, phone_number, password: &self.password }.serialize(serializer)
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_optional_id(deserializer)?.ok_or_else(|| D::Error::custom("expected id"))
}

fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s)),
        serde_json::Value::Number(n) => Ok(Some(n.to_string())),
        _ => Err(D::Error::custom("expected string or number id")),
    }
}
