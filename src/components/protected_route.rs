//! Route guard rendering protected content, a loading state, or a login redirect.

#[cfg(test)]
#[path = "protected_route_test.rs"]
mod protected_route_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::components::Redirect;
use leptos_router::hooks::use_location;

use crate::components::auth_provider::use_auth;
use crate::state::guard::{AccessDecision, AccessGuard};
use crate::util::auth::login_redirect_url;

/// Gate `children` behind a session and, optionally, one of `required_roles`.
///
/// The guard evaluates on mount and again whenever `required_roles` changes.
/// A logout elsewhere while mounted is picked up on the next mount.
#[component]
pub fn ProtectedRoute(
    #[prop(optional, into)] required_roles: MaybeProp<Vec<String>>,
    children: ChildrenFn,
) -> impl IntoView {
    let service = use_auth();
    let config = service.config().clone();
    let store = service.store().clone();
    let location = use_location();
    let decision = RwSignal::new(AccessDecision::Pending);

    let guard = StoredValue::new(AccessGuard::default());

    // Re-runs on mount and whenever `required_roles` changes; a new policy
    // drops the guard back to Pending before it re-checks the store.
    Effect::new(move || {
        let roles = required_roles.get().unwrap_or_default();
        guard.update_value(|guard| {
            guard.set_required_roles(roles);
            decision.set(guard.check(&store));
        });
    });

    move || match decision.get() {
        AccessDecision::Pending => view! {
            <div class="auth-guard auth-guard--checking" role="status" aria-busy="true">
                <span class="auth-guard__spinner"></span>
            </div>
        }
        .into_any(),
        AccessDecision::Denied => {
            let from = location_target(&location.pathname.get_untracked(), &location.search.get_untracked());
            let target = login_redirect_url(&config, &from);
            let options = NavigateOptions { replace: true, ..NavigateOptions::default() };
            view! { <Redirect path=target options=options/> }.into_any()
        }
        AccessDecision::Granted => children().into_any(),
    }
}

/// Path plus query of the location being guarded.
fn location_target(pathname: &str, search: &str) -> String {
    let search = search.trim_start_matches('?');
    if search.is_empty() { pathname.to_owned() } else { format!("{pathname}?{search}") }
}
