//! Authentication error types

/// Errors that can occur while obtaining or refreshing tokens.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No user is signed in.
    #[error("Not signed in")]
    NotSignedIn,

    /// Unknown email or wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Sign-up with an email that already has an account.
    #[error("Email already in use")]
    EmailExists,

    /// Sign-up password rejected by the provider.
    #[error("Password is too weak")]
    WeakPassword,

    /// Malformed email address.
    #[error("Invalid email")]
    InvalidEmail,

    /// Access token expired and refresh failed.
    #[error("Token expired and refresh failed: {message}")]
    TokenExpired { message: String },

    /// Network error during authentication.
    #[error("Network error during auth: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to parse authentication response.
    #[error("Auth response parse error: {0}")]
    Parse(String),

    /// Any other error code reported by the identity provider.
    #[error("Identity provider error {code}: {message}")]
    Provider { code: String, message: String },
}
