use super::*;
use crate::net::error::TransportFailure;
use crate::net::http::AUTHORIZATION_HEADER;
use crate::net::test_support::{EventLog, ScriptedClient, session};
use crate::state::session::MemoryStorage;

const LOGIN_OK: &str = r#"{"token":"t1","type":"Bearer","id":"u1","username":"alice","email":"a@x.com",
    "fullName":"Alice Uwase","telephone":"+250788123456","district":"Gasabo","sector":"Kimironko",
    "roles":["member"]}"#;

fn service() -> (AuthService<MemoryStorage, ScriptedClient>, ScriptedClient, MemoryStorage, EventLog) {
    let backend = MemoryStorage::new();
    let client = ScriptedClient::default();
    let events = EventLog::default();
    let config = AuthConfig::default();
    let store = CredentialStore::new(backend.clone(), &config);
    let transport = AuthorizedTransport::new(store, client.clone(), config).with_listener(events.listener());
    (AuthService::new(transport), client, backend, events)
}

fn signup_data(roles: Option<Vec<String>>) -> SignupData {
    SignupData {
        username: "alice".to_owned(),
        email: "a@x.com".to_owned(),
        password: "Secret#123".to_owned(),
        full_name: "Alice Uwase".to_owned(),
        telephone: "+250788123456".to_owned(),
        district: "Gasabo".to_owned(),
        sector: "Kimironko".to_owned(),
        roles,
        service: None,
    }
}

// =============================================================
// login
// =============================================================

#[tokio::test]
async fn login_stores_session_and_reports_roles() {
    let (auth, client, _, events) = service();
    client.respond(200, LOGIN_OK);

    let session = auth.login(LoginCredentials::email("a@x.com", "p")).await.unwrap();

    assert_eq!(session.token, "t1");
    assert!(auth.is_authenticated());
    assert!(auth.has_role("member"));
    assert!(!auth.has_role("admin"));
    assert_eq!(auth.token().as_deref(), Some("t1"));
    assert_eq!(auth.current_user().unwrap().full_name, "Alice Uwase");
    assert_eq!(events.events(), vec![SessionEvent::Established { user_id: "u1".to_owned() }]);

    let sent = client.sent();
    assert_eq!(sent[0].url, "http://localhost:8083/api/auth/signin");
    assert_eq!(sent[0].body, Some(serde_json::json!({ "email": "a@x.com", "password": "p" })));
}

#[tokio::test]
async fn login_by_phone_sends_phone_number() {
    let (auth, client, _, _) = service();
    client.respond(200, LOGIN_OK);

    auth.login(LoginCredentials::phone("0788123456", "p")).await.unwrap();

    let body = client.sent()[0].body.clone().unwrap();
    assert_eq!(body["phoneNumber"], "0788123456");
    assert!(body.get("email").is_none());
}

#[tokio::test]
async fn login_with_bad_credentials_fails_without_session() {
    let (auth, client, _, events) = service();
    client.respond(401, r#"{"message":"Invalid email or password"}"#);

    let err = auth.login(LoginCredentials::email("a@x.com", "wrong")).await.unwrap_err();

    assert_eq!(err.user_message(), "Invalid email or password");
    assert!(!auth.is_authenticated());
    assert!(events.events().is_empty());
}

#[tokio::test]
async fn login_blank_password_is_malformed_and_not_sent() {
    let (auth, client, _, _) = service();

    let err = auth.login(LoginCredentials::email("a@x.com", " ")).await.unwrap_err();

    assert!(matches!(err, NormalizedError::Malformed { .. }));
    assert_eq!(err.user_message(), "Password is required.");
    assert!(client.sent().is_empty());
}

#[tokio::test]
async fn login_response_without_token_is_malformed() {
    let (auth, client, backend, _) = service();
    client.respond(200, r#"{"id":"u1","roles":["member"]}"#);

    let err = auth.login(LoginCredentials::email("a@x.com", "p")).await.unwrap_err();

    assert!(matches!(err, NormalizedError::Malformed { .. }));
    assert!(backend.journal().is_empty());
}

#[tokio::test]
async fn login_unreachable_service() {
    let (auth, client, _, _) = service();
    client.fail(TransportFailure::NoResponse("Failed to fetch".to_owned()));

    let err = auth.login(LoginCredentials::email("a@x.com", "p")).await.unwrap_err();

    assert_eq!(err, NormalizedError::Unreachable);
}

#[tokio::test]
async fn login_fails_when_session_cannot_be_persisted() {
    let (auth, client, backend, events) = service();
    backend.reject_writes_to("token");
    client.respond(200, LOGIN_OK);

    let err = auth.login(LoginCredentials::email("a@x.com", "p")).await.unwrap_err();

    assert!(matches!(err, NormalizedError::Malformed { .. }));
    assert!(!auth.is_authenticated());
    assert!(events.events().is_empty());
}

// =============================================================
// signup
// =============================================================

#[tokio::test]
async fn signup_applies_default_role() {
    let (auth, client, _, _) = service();
    client.respond(201, r#"{"id":9,"username":"alice","roles":["ROLE_USER"]}"#);

    let user = auth.signup(signup_data(None)).await.unwrap();

    assert_eq!(user.id, "9");
    let body = client.sent()[0].body.clone().unwrap();
    assert_eq!(body["roles"], serde_json::json!(["ROLE_USER"]));
    assert_eq!(body["fullName"], "Alice Uwase");
    assert_eq!(client.sent()[0].url, "http://localhost:8083/api/auth/signup");
}

#[tokio::test]
async fn signup_without_token_does_not_store_session() {
    let (auth, client, backend, _) = service();
    client.respond(201, r#"{"id":9,"roles":["ROLE_USER"],"message":"User registered"}"#);

    auth.signup(signup_data(Some(vec!["member".to_owned()]))).await.unwrap();

    assert!(!auth.is_authenticated());
    assert!(backend.journal().is_empty());
    let body = client.sent()[0].body.clone().unwrap();
    assert_eq!(body["roles"], serde_json::json!(["member"]));
}

#[tokio::test]
async fn signup_with_token_establishes_session() {
    let (auth, client, _, events) = service();
    client.respond(200, LOGIN_OK);

    auth.signup(signup_data(None)).await.unwrap();

    assert!(auth.is_authenticated());
    assert_eq!(events.events().len(), 1);
}

#[tokio::test]
async fn signup_duplicate_account_surfaces_message() {
    let (auth, client, _, _) = service();
    client.respond(409, r#"{"status":409,"message":"Username is already taken"}"#);

    let err = auth.signup(signup_data(None)).await.unwrap_err();

    assert_eq!(err.status(), Some(409));
    assert_eq!(err.user_message(), "Username is already taken");
}

#[tokio::test]
async fn signup_validation_errors_carry_fields() {
    let (auth, client, _, _) = service();
    client.respond(400, r#"{"password":"Password must be at least 8 characters long"}"#);

    let err = auth.signup(signup_data(None)).await.unwrap_err();

    assert!(err.field_errors().unwrap().contains_key("password"));
}

fn admin_data(service: Option<&str>) -> SignupData {
    SignupData { service: service.map(str::to_owned), ..signup_data(None) }
}

#[tokio::test]
async fn signup_admin_targets_admin_endpoint_with_service() {
    let (auth, client, _, _) = service();
    client.respond(201, r#"{"id":3,"role":"ROLE_ADMIN","message":"Admin registered successfully"}"#);

    let user = auth.signup_admin(admin_data(Some(" water "))).await.unwrap();

    assert_eq!(user.roles, vec!["ROLE_ADMIN".to_owned()]);
    let sent = client.sent();
    assert_eq!(sent[0].url, "http://localhost:8083/api/auth/signup/admin");
    let body = sent[0].body.clone().unwrap();
    assert_eq!(body["service"], "WATER");
    assert!(body.get("roles").is_none());
}

#[tokio::test]
async fn signup_admin_keeps_the_super_admin_session() {
    let (auth, client, _, events) = service();
    auth.store().save(&session("super-token", &["ROLE_SUPERADMIN"]));
    client.respond(200, r#"{"token":"admin-token","id":"a7","roles":["ROLE_ADMIN"]}"#);

    let user = auth.signup_admin(admin_data(Some("ELECTRICITY"))).await.unwrap();

    assert_eq!(user.id, "a7");
    let stored = auth.store().read().unwrap();
    assert_eq!(stored.token, "super-token");
    assert_eq!(stored.user.id, "u1");
    assert!(auth.has_role("ROLE_SUPERADMIN"));
    assert!(events.events().is_empty());
    assert_eq!(client.sent()[0].header(AUTHORIZATION_HEADER), Some("Bearer super-token"));
}

#[tokio::test]
async fn signup_admin_without_service_is_malformed_and_not_sent() {
    let (auth, client, _, _) = service();

    for missing in [None, Some("  ")] {
        let err = auth.signup_admin(admin_data(missing)).await.unwrap_err();
        assert_eq!(err.user_message(), "Service is required for admin registration");
    }
    assert!(client.sent().is_empty());
}

#[tokio::test]
async fn signup_omits_service_when_absent() {
    let (auth, client, _, _) = service();
    client.respond(201, r#"{"id":9,"roles":["ROLE_USER"]}"#);

    auth.signup(signup_data(None)).await.unwrap();

    assert!(client.sent()[0].body.clone().unwrap().get("service").is_none());
}

// =============================================================
// logout / profile
// =============================================================

#[test]
fn logout_clears_session_and_notifies() {
    let (auth, _, _, events) = service();
    auth.store().save(&session("t1", &["member"]));

    auth.logout();

    assert!(!auth.is_authenticated());
    assert_eq!(events.events(), vec![SessionEvent::LoggedOut]);
}

#[test]
fn logout_without_session_is_harmless() {
    let (auth, _, _, _) = service();
    auth.logout();
    assert!(!auth.is_authenticated());
}

#[tokio::test]
async fn fetch_profile_refreshes_stored_user() {
    let (auth, client, _, _) = service();
    auth.store().save(&session("t1", &["member"]));
    client.respond(200, r#"{"id":"u1","fullName":"Alice U.","district":"Kicukiro"}"#);

    let user = auth.fetch_profile().await.unwrap();

    assert_eq!(user.full_name, "Alice U.");
    assert_eq!(user.roles, vec!["member".to_owned()]);
    let stored = auth.store().read().unwrap();
    assert_eq!(stored.token, "t1");
    assert_eq!(stored.user.district, "Kicukiro");
    assert_eq!(client.sent()[0].header(AUTHORIZATION_HEADER), Some("Bearer t1"));
}

#[tokio::test]
async fn fetch_profile_rejection_tears_down_session() {
    let (auth, client, _, events) = service();
    auth.store().save(&session("t1", &["member"]));
    client.respond(401, "");

    assert!(auth.fetch_profile().await.is_err());

    assert!(!auth.is_authenticated());
    assert_eq!(events.events(), vec![SessionEvent::Invalidated { status: 401 }]);
}

#[tokio::test]
async fn fetch_profile_does_not_overwrite_a_session_replaced_in_flight() {
    let (auth, client, _, _) = service();
    auth.store().save(&session("t1", &["member"]));
    let store = auth.store().clone();
    client
        .respond(200, r#"{"id":"u1","fullName":"Alice U.","roles":["member"]}"#)
        .while_in_flight(move || {
            let mut other = session("t2", &["ROLE_ADMIN"]);
            other.user.id = "u2".to_owned();
            store.save(&other);
        });

    let user = auth.fetch_profile().await.unwrap();

    assert_eq!(user.id, "u1");
    let stored = auth.store().read().unwrap();
    assert_eq!(stored.token, "t2");
    assert_eq!(stored.user.id, "u2");
    assert_eq!(stored.user.roles, vec!["ROLE_ADMIN".to_owned()]);
}

#[tokio::test]
async fn fetch_profile_for_another_user_is_not_stored() {
    let (auth, client, _, _) = service();
    auth.store().save(&session("t1", &["member"]));
    client.respond(200, r#"{"id":"u9","fullName":"Someone Else","roles":["member"]}"#);

    auth.fetch_profile().await.unwrap();

    assert_eq!(auth.current_user().unwrap().id, "u1");
}

#[tokio::test]
async fn fetch_profile_without_session_is_not_stored() {
    let (auth, client, backend, _) = service();
    client.respond(200, r#"{"id":"u1","roles":["member"]}"#);

    let user = auth.fetch_profile().await.unwrap();

    assert_eq!(user.id, "u1");
    assert!(backend.journal().is_empty());
}

#[cfg(not(feature = "hydrate"))]
#[test]
fn browser_service_starts_signed_out() {
    let auth = BrowserAuthService::browser(AuthConfig::default());
    assert!(!auth.is_authenticated());
    assert!(auth.current_user().is_none());
}
