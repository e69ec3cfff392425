//! Integration tests for email/password sign-in against a mock identity
//! provider.

mod common;

use common::MockServer;
use common::Recorded;
use delivery_lib::DeliveryClient;
use delivery_lib::auth::AutoRefreshTokenProvider;
use delivery_lib::auth::IdentityPasswordFlow;
use delivery_lib::auth::TokenProvider;
use delivery_lib::error::AuthError;
use delivery_lib::model::Product;
use pretty_assertions::assert_eq;
use serde_json::json;

fn identity(req: &Recorded) -> (u16, String) {
    if req.target.starts_with("/accounts:signInWithPassword") {
        let body: serde_json::Value = serde_json::from_str(&req.body).unwrap_or_default();
        if body["password"] == "secret" {
            return (
                200,
                json!({
                    "idToken": "id-token-1",
                    "refreshToken": "refresh-1",
                    "expiresIn": "3600",
                    "localId": "uid-1",
                    "email": body["email"],
                    "displayName": "Admin"
                })
                .to_string(),
            );
        }
        return (
            400,
            json!({"error": {"code": 400, "message": "INVALID_PASSWORD"}}).to_string(),
        );
    }
    if req.target.starts_with("/accounts:signUp") {
        return (
            400,
            json!({"error": {"code": 400, "message": "EMAIL_EXISTS"}}).to_string(),
        );
    }
    if req.target.starts_with("/token") {
        return (
            200,
            json!({
                "id_token": "id-token-2",
                "refresh_token": "refresh-2",
                "expires_in": "3600"
            })
            .to_string(),
        );
    }
    (404, String::new())
}

fn flow(server: &MockServer, password: &str) -> IdentityPasswordFlow {
    IdentityPasswordFlow::new("api-key", "admin@example.com", password)
        .with_identity_url(server.url())
        .with_secure_token_url(server.url())
}

#[tokio::test]
async fn test_sign_in_returns_profile() {
    let server = MockServer::start(identity).await;

    let profile = flow(&server, "secret").sign_in().await.unwrap();
    assert_eq!(profile.uid, "uid-1");
    assert_eq!(profile.email.as_deref(), Some("admin@example.com"));
    assert_eq!(profile.display_name.as_deref(), Some("Admin"));
    assert_eq!(profile.token.access_token, "id-token-1");
    assert!(profile.token.can_refresh());

    let request = &server.requests()[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.target, "/accounts:signInWithPassword?key=api-key");
    let sent: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(sent["returnSecureToken"], true);
}

#[tokio::test]
async fn test_provider_error_codes_are_mapped() {
    let server = MockServer::start(identity).await;

    let err = flow(&server, "wrong").sign_in().await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    let err = flow(&server, "secret").sign_up(Some("Admin")).await.unwrap_err();
    assert!(matches!(err, AuthError::EmailExists));
}

#[tokio::test]
async fn test_refresh_uses_secure_token_endpoint() {
    let server = MockServer::start(identity).await;

    let token = flow(&server, "secret").refresh_token("refresh-1").await.unwrap();
    assert_eq!(token.access_token, "id-token-2");
    assert_eq!(token.refresh_token.as_deref(), Some("refresh-2"));

    let request = &server.requests()[0];
    assert_eq!(request.target, "/token?key=api-key");
    assert!(request.body.contains("grant_type=refresh_token"));
    assert!(request.body.contains("refresh_token=refresh-1"));
}

#[tokio::test]
async fn test_provider_signs_in_lazily_and_caches() {
    let server = MockServer::start(identity).await;
    let provider = AutoRefreshTokenProvider::new(flow(&server, "secret"));

    let first = provider.get_token(false).await.unwrap();
    let second = provider.get_token(false).await.unwrap();
    assert_eq!(first.access_token, "id-token-1");
    assert_eq!(second.access_token, "id-token-1");
    assert_eq!(server.requests().len(), 1);

    let forced = provider.get_token(true).await.unwrap();
    assert_eq!(forced.access_token, "id-token-2");

    provider.sign_out().await;
    assert!(matches!(
        provider.get_token(false).await,
        Err(AuthError::NotSignedIn)
    ));
}

#[tokio::test]
async fn test_identity_token_reaches_backend() {
    let identity_server = MockServer::start(identity).await;
    let backend = MockServer::start(|_| (200, "[]".to_string())).await;

    let client = DeliveryClient::builder()
        .url(backend.url())
        .token_provider(AutoRefreshTokenProvider::new(flow(&identity_server, "secret")))
        .build()
        .unwrap();

    client.resource::<Product>().list().await.unwrap();
    assert_eq!(
        backend.requests()[0].authorization.as_deref(),
        Some("Bearer id-token-1")
    );

    client.sign_out().await;
    client.resource::<Product>().list().await.unwrap();
    assert_eq!(backend.requests()[1].authorization, None);
}
