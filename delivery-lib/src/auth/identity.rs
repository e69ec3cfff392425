//! Email/password sign-in against a Firebase-style identity REST API.

use async_trait::async_trait;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::AccessToken;
use super::auto_refresh::AuthFlow;
use crate::error::AuthError;

/// Default identity endpoint (`accounts:*` methods).
pub const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Default secure-token endpoint used for refresh.
pub const DEFAULT_SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1";

/// The signed-in user as reported by the identity provider.
#[derive(Debug, Clone)]
pub struct UserProfile {
    /// Provider-assigned user id.
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    /// The ID token sent as the bearer token.
    pub token: AccessToken,
}

/// Email and password flow.
///
/// # Example
///
/// ```ignore
/// use delivery_lib::auth::IdentityPasswordFlow;
///
/// let flow = IdentityPasswordFlow::new("api-key", "admin@example.com", "secret");
/// let profile = flow.sign_in().await?;
/// println!("Signed in as {}", profile.uid);
/// ```
#[derive(Clone)]
pub struct IdentityPasswordFlow {
    api_key: String,
    email: String,
    password: String,
    identity_url: String,
    secure_token_url: String,
    http_client: reqwest::Client,
}

impl IdentityPasswordFlow {
    pub fn new(
        api_key: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            email: email.into(),
            password: password.into(),
            identity_url: DEFAULT_IDENTITY_URL.to_string(),
            secure_token_url: DEFAULT_SECURE_TOKEN_URL.to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Overrides the identity endpoint base URL.
    pub fn with_identity_url(mut self, url: impl Into<String>) -> Self {
        self.identity_url = url.into();
        self
    }

    /// Overrides the secure-token endpoint base URL.
    pub fn with_secure_token_url(mut self, url: impl Into<String>) -> Self {
        self.secure_token_url = url.into();
        self
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = client;
        self
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Signs in with the configured email and password.
    pub async fn sign_in(&self) -> Result<UserProfile, AuthError> {
        let body = AccountRequest {
            email: &self.email,
            password: &self.password,
            display_name: None,
            return_secure_token: true,
        };
        self.account_call("accounts:signInWithPassword", &body).await
    }

    /// Creates an account with the configured email and password.
    pub async fn sign_up(&self, display_name: Option<&str>) -> Result<UserProfile, AuthError> {
        let body = AccountRequest {
            email: &self.email,
            password: &self.password,
            display_name,
            return_secure_token: true,
        };
        self.account_call("accounts:signUp", &body).await
    }

    /// Exchanges a refresh token for a new ID token.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<AccessToken, AuthError> {
        let url = format!(
            "{}/token?key={}",
            self.secure_token_url.trim_end_matches('/'),
            urlencoding::encode(&self.api_key)
        );
        log::debug!("POST {}/token", self.secure_token_url.trim_end_matches('/'));

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];
        let response = self.http_client.post(&url).form(&params).send().await?;
        let refreshed: RefreshResponse = Self::handle_response(response).await?;

        Ok(AccessToken::with_refresh(
            refreshed.id_token,
            expires_at(refreshed.expires_in.as_deref()),
            refreshed.refresh_token,
        ))
    }

    async fn account_call(
        &self,
        method: &str,
        body: &AccountRequest<'_>,
    ) -> Result<UserProfile, AuthError> {
        let base = self.identity_url.trim_end_matches('/');
        let url = format!("{}/{}?key={}", base, method, urlencoding::encode(&self.api_key));
        log::debug!("POST {}/{}", base, method);

        let response = self.http_client.post(&url).json(body).send().await?;
        let account: AccountResponse = Self::handle_response(response).await?;
        Ok(account.into_profile())
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AuthError> {
        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            serde_json::from_str(&text).map_err(|e| AuthError::Parse(e.to_string()))
        } else {
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("HTTP {}", status.as_u16()));
            Err(map_error_code(&message))
        }
    }
}

impl std::fmt::Debug for IdentityPasswordFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityPasswordFlow")
            .field("api_key", &"[REDACTED]")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("identity_url", &self.identity_url)
            .field("secure_token_url", &self.secure_token_url)
            .finish()
    }
}

#[async_trait]
impl AuthFlow for IdentityPasswordFlow {
    async fn authenticate(&self) -> Result<AccessToken, AuthError> {
        Ok(self.sign_in().await?.token)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AccessToken, AuthError> {
        self.refresh_token(refresh_token).await
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountRequest<'a> {
    email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<&'a str>,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    id_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<String>,
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default, rename = "profilePicture")]
    photo_url: Option<String>,
}

impl AccountResponse {
    fn into_profile(self) -> UserProfile {
        let expires_at = expires_at(self.expires_in.as_deref());
        let token = match self.refresh_token {
            Some(refresh) => AccessToken::with_refresh(self.id_token, expires_at, refresh),
            None => AccessToken {
                access_token: self.id_token,
                expires_at,
                refresh_token: None,
            },
        };
        UserProfile {
            uid: self.local_id,
            email: self.email.filter(|e| !e.is_empty()),
            display_name: self.display_name.filter(|n| !n.is_empty()),
            photo_url: self.photo_url.filter(|p| !p.is_empty()),
            token,
        }
    }
}

/// Response of the secure-token endpoint (snake_case, unlike `accounts:*`).
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// `expires_in` is a number of seconds sent as a string.
fn expires_at(expires_in: Option<&str>) -> Option<chrono::DateTime<Utc>> {
    expires_in
        .and_then(|s| s.trim().parse::<i64>().ok())
        .map(|secs| Utc::now() + Duration::seconds(secs))
}

/// Maps provider error codes to [`AuthError`] variants.
///
/// Codes may carry a detail suffix (`WEAK_PASSWORD : Password should be at
/// least 6 characters`).
fn map_error_code(message: &str) -> AuthError {
    let (code, detail) = match message.split_once(':') {
        Some((code, detail)) => (code.trim(), detail.trim()),
        None => (message.trim(), ""),
    };

    match code {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "USER_DISABLED" => {
            AuthError::InvalidCredentials
        }
        "EMAIL_EXISTS" => AuthError::EmailExists,
        "WEAK_PASSWORD" => AuthError::WeakPassword,
        "INVALID_EMAIL" | "MISSING_EMAIL" => AuthError::InvalidEmail,
        "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" | "USER_NOT_FOUND" => AuthError::TokenExpired {
            message: code.to_string(),
        },
        _ => AuthError::Provider {
            code: code.to_string(),
            message: if detail.is_empty() {
                code.to_string()
            } else {
                detail.to_string()
            },
        },
    }
}
