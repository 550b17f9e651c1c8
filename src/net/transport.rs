//! Authorized request/response pipeline.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every identity-service call goes through `AuthorizedTransport::execute`.
//! Outbound, the current token is attached as a bearer credential; there is
//! no per-call opt-out. Inbound, a status in the rejection class clears the
//! credential store before the caller sees the result, whichever endpoint
//! produced it.
//!
//! Navigation is not this module's concern: teardown is announced through a
//! `SessionEvent` listener and the hosting app decides where to go.

#[cfg(test)]
#[path = "transport_test.rs"]
mod transport_test;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::{NormalizedError, TransportFailure, normalize};
use super::http::{AUTHORIZATION_HEADER, HttpClient, HttpRequest, HttpResponse};
use crate::config::AuthConfig;
use crate::state::session::{CredentialStore, StorageBackend};

/// Session lifecycle change announced to the hosting app.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// Login (or a signup that returned a token) stored a session.
    Established { user_id: String },
    /// A rejection-class response tore down an existing session.
    Invalidated { status: u16 },
    /// The user signed out explicitly.
    LoggedOut,
}

pub type SessionListener = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

pub struct AuthorizedTransport<B, C> {
    store: CredentialStore<B>,
    client: C,
    config: AuthConfig,
    listener: Option<SessionListener>,
}

impl<B: Clone, C: Clone> Clone for AuthorizedTransport<B, C> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            client: self.client.clone(),
            config: self.config.clone(),
            listener: self.listener.clone(),
        }
    }
}

impl<B: StorageBackend, C: HttpClient> AuthorizedTransport<B, C> {
    pub fn new(store: CredentialStore<B>, client: C, config: AuthConfig) -> Self {
        Self { store, client, config, listener: None }
    }

    /// Register the single session-event listener, replacing any previous one.
    #[must_use]
    pub fn with_listener<F>(mut self, listener: F) -> Self
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.listener = Some(Arc::new(listener));
        self
    }

    pub fn store(&self) -> &CredentialStore<B> {
        &self.store
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub(crate) fn emit(&self, event: &SessionEvent) {
        if let Some(listener) = &self.listener {
            listener(event);
        }
    }

    /// Send `request` with credentials attached and rejection handling applied.
    ///
    /// # Errors
    ///
    /// Returns a `NormalizedError` for any status >= 400 or transport failure.
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, NormalizedError> {
        let request = self.authorize(request);
        let outcome = self.client.send(request).await;
        self.inspect(outcome)
    }

    /// `GET` an API path and decode the JSON body.
    ///
    /// # Errors
    ///
    /// Returns a `NormalizedError` on failure or an undecodable body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, NormalizedError> {
        let resp = self.execute(HttpRequest::get(self.config.endpoint_url(path))).await?;
        decode(&resp)
    }

    /// `POST` a JSON body to an API path and decode the JSON answer.
    ///
    /// # Errors
    ///
    /// Returns a `NormalizedError` on failure or an undecodable body.
    pub async fn post_json<T, R>(&self, path: &str, body: &T) -> Result<R, NormalizedError>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let request = HttpRequest::post_json(self.config.endpoint_url(path), body).map_err(normalize)?;
        let resp = self.execute(request).await?;
        decode(&resp)
    }

    fn authorize(&self, mut request: HttpRequest) -> HttpRequest {
        if let Some(token) = self.store.token() {
            request.set_header(AUTHORIZATION_HEADER, format!("Bearer {token}"));
        }
        request
    }

    fn inspect(&self, outcome: Result<HttpResponse, TransportFailure>) -> Result<HttpResponse, NormalizedError> {
        let failure = match outcome {
            Ok(resp) if !resp.is_error() => return Ok(resp),
            Ok(resp) => TransportFailure::Response { status: resp.status, body: resp.body },
            Err(failure) => failure,
        };
        if let TransportFailure::Response { status, .. } = &failure
            && self.config.is_rejection(*status)
        {
            self.teardown(*status);
        }
        let err = normalize(failure);
        if !matches!(err, NormalizedError::RemoteRejection { .. }) {
            leptos::logging::warn!("auth transport failure: {err}");
        }
        Err(err)
    }

    fn teardown(&self, status: u16) {
        let had_session = self.store.has_session();
        self.store.clear();
        if had_session {
            leptos::logging::warn!("credential rejected with status {status}; session cleared");
            self.emit(&SessionEvent::Invalidated { status });
        }
    }
}

fn decode<R: DeserializeOwned>(resp: &HttpResponse) -> Result<R, NormalizedError> {
    serde_json::from_str(&resp.body).map_err(|e| NormalizedError::malformed(format!("invalid response body: {e}")))
}
