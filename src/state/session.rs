//! Durable credential store for the browser session.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session lives in two string entries of browser-scoped storage (token
//! and serialized profile) so it survives reloads. `CredentialStore` is the
//! only writer of those entries: `save` writes both, `clear` removes both.
//!
//! TRADE-OFFS
//! ==========
//! Stored profiles carry no version. A payload that no longer parses into
//! `User` is treated as no session at all rather than trusted partially.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::config::AuthConfig;
use crate::net::types::{Session, User};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("storage unavailable")]
    Unavailable,
    #[error("storage write rejected: {0}")]
    WriteRejected(String),
}

/// String key/value storage with `localStorage` semantics.
pub trait StorageBackend {
    fn get_item(&self, key: &str) -> Option<String>;
    /// # Errors
    ///
    /// Returns an error when the backend is unavailable or refuses the write.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str);
}

/// `window.localStorage`, looked up per call.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStorage;

impl StorageBackend for BrowserStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        #[cfg(feature = "hydrate")]
        {
            let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten())?;
            storage.get_item(key).ok().flatten()
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = key;
            None
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        #[cfg(feature = "hydrate")]
        {
            let storage = web_sys::window()
                .and_then(|w| w.local_storage().ok().flatten())
                .ok_or(StorageError::Unavailable)?;
            storage
                .set_item(key, value)
                .map_err(|e| StorageError::WriteRejected(format!("{e:?}")))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (key, value);
            Err(StorageError::Unavailable)
        }
    }

    fn remove_item(&self, key: &str) {
        #[cfg(feature = "hydrate")]
        {
            if let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) {
                let _ = storage.remove_item(key);
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = key;
        }
    }
}

/// One mutation observed by `MemoryStorage`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageWrite {
    Set(String),
    Remove(String),
}

#[derive(Debug, Default)]
struct MemoryInner {
    items: HashMap<String, String>,
    journal: Vec<StorageWrite>,
    rejected_key: Option<String>,
}

/// In-memory backend. Clones share the same entries, so a test can keep a
/// handle and inspect what the store wrote.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `set_item`/`remove_item` call in order.
    #[must_use]
    pub fn journal(&self) -> Vec<StorageWrite> {
        self.inner.borrow().journal.clone()
    }

    /// Number of `remove_item` calls for `key`.
    #[must_use]
    pub fn removals(&self, key: &str) -> usize {
        self.inner
            .borrow()
            .journal
            .iter()
            .filter(|w| matches!(w, StorageWrite::Remove(k) if k == key))
            .count()
    }

    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner.borrow().items.get(key).cloned()
    }

    /// Make subsequent writes to `key` fail, like a full quota.
    pub fn reject_writes_to(&self, key: &str) {
        self.inner.borrow_mut().rejected_key = Some(key.to_owned());
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.inner.borrow().items.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.borrow_mut();
        if inner.rejected_key.as_deref() == Some(key) {
            return Err(StorageError::WriteRejected(format!("quota exceeded for {key}")));
        }
        inner.journal.push(StorageWrite::Set(key.to_owned()));
        inner.items.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        let mut inner = self.inner.borrow_mut();
        inner.journal.push(StorageWrite::Remove(key.to_owned()));
        inner.items.remove(key);
    }
}

/// Single source of truth for the current `Session`.
#[derive(Clone, Debug)]
pub struct CredentialStore<B> {
    backend: B,
    token_key: String,
    user_key: String,
}

impl<B: StorageBackend> CredentialStore<B> {
    pub fn new(backend: B, config: &AuthConfig) -> Self {
        Self { backend, token_key: config.token_key.clone(), user_key: config.user_key.clone() }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Persist token and profile together.
    ///
    /// The profile is written before the token so a reader never sees a token
    /// without its profile. A failed write clears both entries.
    pub fn save(&self, session: &Session) {
        let profile = match serde_json::to_string(&session.user) {
            Ok(profile) => profile,
            Err(e) => {
                leptos::logging::warn!("session profile not serializable: {e}");
                self.clear();
                return;
            }
        };
        let written = self
            .backend
            .set_item(&self.user_key, &profile)
            .and_then(|()| self.backend.set_item(&self.token_key, &session.token));
        if let Err(e) = written {
            leptos::logging::warn!("session write failed, clearing: {e}");
            self.clear();
        }
    }

    /// Current session, or `None` when absent, partial, or unparsable.
    pub fn read(&self) -> Option<Session> {
        let token = self.backend.get_item(&self.token_key).filter(|t| !t.is_empty())?;
        let Some(raw) = self.backend.get_item(&self.user_key) else {
            leptos::logging::warn!("stored token has no profile; treating as signed out");
            return None;
        };
        match serde_json::from_str::<User>(&raw) {
            Ok(user) => Some(Session { token, user }),
            Err(e) => {
                leptos::logging::warn!("stored profile unreadable ({e}); treating as signed out");
                None
            }
        }
    }

    /// Remove token and profile. Clearing an empty store is a no-op.
    pub fn clear(&self) {
        self.backend.remove_item(&self.token_key);
        self.backend.remove_item(&self.user_key);
    }

    pub fn has_session(&self) -> bool {
        self.read().is_some()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.read().is_some_and(|s| s.user.has_role(role))
    }

    pub fn token(&self) -> Option<String> {
        self.read().map(|s| s.token)
    }

    pub fn user(&self) -> Option<User> {
        self.read().map(|s| s.user)
    }
}
