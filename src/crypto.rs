mod access_token;
mod signing_key;
mod token;

pub use access_token::AccessToken;
pub use signing_key::SigningKey;
pub use token::{Token, TokenBuilder, TokenError, TokenResult};
