//! E2E tests for registration, login, dashboard access and logout

mod common;

use common::{TestServer, location, session_cookie};

#[tokio::test]
async fn test_full_session_lifecycle() {
    let server = TestServer::new().await;

    let response = server.post_credentials("/register", "alice", "pw123").await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/login");
    assert!(session_cookie(&response).is_none(), "registration must not log in");

    let response = server.post_credentials("/login", "alice", "pw123").await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/dashboard");
    let cookie = session_cookie(&response).expect("session cookie set");

    let response = server.get("/dashboard", Some(&cookie)).await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.expect("response body");
    assert!(body.contains("alice"));

    let response = server.get("/logout", Some(&cookie)).await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/login");

    let response = server.get("/dashboard", Some(&cookie)).await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_login_unknown_user() {
    let server = TestServer::new().await;

    let response = server.post_credentials("/login", "bob", "anything").await;
    assert!(session_cookie(&response).is_none());
    let body = response.text().await.expect("response body");
    assert!(body.contains("User not found"));
}

#[tokio::test]
async fn test_login_wrong_password() {
    let server = TestServer::new().await;
    server.post_credentials("/register", "alice", "pw123").await;

    let response = server.post_credentials("/login", "alice", "wrong").await;
    assert!(session_cookie(&response).is_none());
    let body = response.text().await.expect("response body");
    assert!(body.contains("Invalid credentials"));
}

#[tokio::test]
async fn test_duplicate_registration_keeps_original_password() {
    let server = TestServer::new().await;
    server.post_credentials("/register", "alice", "pw123").await;

    let response = server.post_credentials("/register", "alice", "hijack").await;
    let body = response.text().await.expect("response body");
    assert!(body.contains("User already exists."));
    assert!(body.contains("/register"));

    let response = server.post_credentials("/login", "alice", "hijack").await;
    assert!(session_cookie(&response).is_none());

    let response = server.post_credentials("/login", "alice", "pw123").await;
    assert_eq!(location(&response), "/dashboard");
}

#[tokio::test]
async fn test_dashboard_without_cookie_redirects() {
    let server = TestServer::new().await;

    let response = server.get("/dashboard", None).await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_dashboard_rejects_forged_cookie() {
    let server = TestServer::new().await;
    let cookie = server.login_as("alice", "pw123").await;

    // Same id, signature from a different key
    let token = cookie.trim_start_matches("session=");
    let (id, _) = token.split_once('.').expect("signed token");
    let forged = format!("session={id}.AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA");

    let response = server.get("/dashboard", Some(&forged)).await;
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_logout_clears_session_cookie() {
    let server = TestServer::new().await;
    let cookie = server.login_as("alice", "pw123").await;

    let response = server.get("/logout", Some(&cookie)).await;
    let set_cookie_values: Vec<String> = response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok().map(ToString::to_string))
        .collect();
    assert!(
        set_cookie_values.iter().any(|v| v.starts_with("session=")),
        "expected cookie removal header, got: {set_cookie_values:?}"
    );
    assert!(server.state.sessions.is_empty().await);
}

#[tokio::test]
async fn test_logout_without_session_is_harmless() {
    let server = TestServer::new().await;

    let response = server.get("/logout", None).await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let server = TestServer::new().await;
    let alice = server.login_as("alice", "pw123").await;
    let bob = server.login_as("bob", "hunter2").await;

    server.get("/logout", Some(&alice)).await;

    let response = server.get("/dashboard", Some(&bob)).await;
    assert_eq!(response.status(), 200);
    assert!(response.text().await.unwrap().contains("bob"));
}

#[tokio::test]
async fn test_concurrent_registrations_of_same_username() {
    let server = TestServer::new().await;

    let handles: Vec<_> = (0..5)
        .map(|i| {
            let client = server.client.clone();
            let url = server.url("/register");
            tokio::spawn(async move {
                let password = format!("pw-{i}");
                client
                    .post(url)
                    .form(&[("username", "carol"), ("password", password.as_str())])
                    .send()
                    .await
                    .expect("request succeeds")
                    .status()
                    .is_redirection()
            })
        })
        .collect();

    let mut registered = 0;
    for handle in handles {
        if handle.await.unwrap() {
            registered += 1;
        }
    }

    assert_eq!(registered, 1);
}

#[tokio::test]
async fn test_relogin_revokes_previous_cookie() {
    let server = TestServer::new().await;
    let first = server.login_as("alice", "pw123").await;

    let response = server
        .client
        .post(server.url("/login"))
        .header("Cookie", &first)
        .form(&[("username", "alice"), ("password", "pw123")])
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(location(&response), "/dashboard");
    let second = session_cookie(&response).expect("session cookie set");

    let response = server.get("/dashboard", Some(&first)).await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/login");

    let response = server.get("/dashboard", Some(&second)).await;
    assert_eq!(response.status(), 200);
    assert_eq!(server.state.sessions.len().await, 1);
}

#[tokio::test]
async fn test_missing_form_field_is_rejected_cleanly() {
    let server = TestServer::new().await;

    let response = server
        .client
        .post(server.url("/login"))
        .form(&[("username", "bob")])
        .send()
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), 400);
    let body = response.text().await.expect("response body");
    assert_eq!(body, "username and password are required");
}
