//! CLI error type

/// Errors a command can end with.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Delivery(#[from] delivery_lib::Error),

    #[error("Page {page} is out of range (1-{total})")]
    PageOutOfRange { page: usize, total: usize },

    #[error("There is no FAQ {number} (1-{total})")]
    UnknownFaq { number: usize, total: usize },

    #[error("Cannot sign in with email: DELIVERY_IDENTITY_API_KEY is not set")]
    MissingApiKey,

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// The message printed before exiting.
    pub fn message(&self) -> String {
        match self {
            CliError::Delivery(e) => e.message(),
            other => other.to_string(),
        }
    }
}

impl From<delivery_lib::error::AuthError> for CliError {
    fn from(err: delivery_lib::error::AuthError) -> Self {
        CliError::Delivery(err.into())
    }
}
