mod auth;

pub use auth::TOKEN_SAFETY_MARGIN_SECS;
pub use auth::TokenManager;
