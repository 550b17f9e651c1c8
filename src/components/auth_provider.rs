//! Context provider for the browser session.

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::config::AuthConfig;
use crate::net::api::{AuthService, BrowserAuthService};
use crate::net::http::BrowserHttpClient;
use crate::net::transport::AuthorizedTransport;
use crate::state::auth::AuthState;
use crate::state::session::{BrowserStorage, CredentialStore};
use crate::util::auth::install_unauth_redirect;

/// Provides `BrowserAuthService` and `RwSignal<AuthState>` to its children.
///
/// Must be rendered inside `<Router>`: session teardown navigates to
/// `AuthConfig::login_path`.
#[component]
pub fn AuthProvider(#[prop(optional)] config: Option<AuthConfig>, children: Children) -> impl IntoView {
    let config = config.unwrap_or_else(AuthConfig::from_build_env);
    let auth = RwSignal::new(AuthState::hydrating());

    let store = CredentialStore::new(BrowserStorage, &config);
    let listener_store = store.clone();
    let transport = AuthorizedTransport::new(store.clone(), BrowserHttpClient, config.clone()).with_listener(
        move |event| {
            let user = listener_store.user();
            auth.update(|s| s.apply(event, user));
        },
    );
    let service: BrowserAuthService = AuthService::new(transport);

    // Effects only run in the browser, where the stored session is readable.
    Effect::new(move || {
        let user = store.user();
        auth.update(|s| {
            s.user = user;
            s.loading = false;
        });
    });

    install_unauth_redirect(auth, config.login_path.clone(), use_navigate());

    provide_context(service);
    provide_context(auth);

    children()
}

/// The session service provided by the nearest `AuthProvider`.
pub fn use_auth() -> BrowserAuthService {
    expect_context::<BrowserAuthService>()
}

/// Reactive auth state provided by the nearest `AuthProvider`.
pub fn use_auth_state() -> RwSignal<AuthState> {
    expect_context::<RwSignal<AuthState>>()
}
