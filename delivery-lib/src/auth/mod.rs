//! Authentication

mod auto_refresh;
mod bearer;
mod identity;
mod token;

pub use auto_refresh::AuthFlow;
pub use auto_refresh::AutoRefreshTokenProvider;
pub use bearer::AuthScope;
pub use bearer::BearerAuth;
pub use identity::DEFAULT_IDENTITY_URL;
pub use identity::DEFAULT_SECURE_TOKEN_URL;
pub use identity::IdentityPasswordFlow;
pub use identity::UserProfile;
pub use token::AccessToken;
pub use token::StaticTokenProvider;
pub use token::TokenProvider;
