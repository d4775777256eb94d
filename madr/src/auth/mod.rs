//! Credential handling: password hashing, access tokens, and resolution of
//! the authenticated account for protected endpoints

pub mod extractor;
pub mod password;
pub mod tokens;

pub use extractor::{extract_token, CurrentAccount};
pub use password::PasswordHasher;
pub use tokens::{AccessToken, Claims, TokenIssuer};
