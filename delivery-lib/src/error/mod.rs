//! Error types

mod api;
mod auth;
mod validation;

pub use api::*;
pub use auth::*;
pub use validation::*;

/// Top-level error returned by client operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The backend or the transport failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The identity provider refused or could not issue a token.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A payload was rejected before any request was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A payload could not be encoded as JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Missing or malformed configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A lookup that is resolved client-side found nothing.
    #[error("{resource} with id {id} not found")]
    NotFound { resource: &'static str, id: i64 },
}

impl Error {
    /// Returns the single human-readable message shown to the user.
    ///
    /// Backend failures prefer the message supplied by the backend and fall
    /// back to the transport status text.
    pub fn message(&self) -> String {
        match self {
            Error::Api(ApiError::Http { message, .. }) => message.clone(),
            Error::Validation(err) => err
                .errors()
                .first()
                .map(|e| e.to_string())
                .unwrap_or_else(|| err.to_string()),
            other => other.to_string(),
        }
    }

    /// Returns the HTTP status code if the backend answered with an error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api(api) => api.status_code(),
            _ => None,
        }
    }
}
