mod credentials;
mod guard;
mod password;

pub use credentials::BearerToken;
pub use guard::AuthenticatedUser;
pub use password::{hash_password, validate_credentials};

/// Lifetime of issued access tokens
#[derive(Debug, Clone, Copy)]
pub struct TokenExpiry(pub chrono::Duration);
