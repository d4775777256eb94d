//! Access token issuance and verification
//!
//! Tokens are HMAC-signed JWTs whose subject names an account as
//! `user:<id>`. Each token carries a fresh `jti`, so two tokens issued for
//! the same account within the same second still differ.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::error::{Error, Result};

const SUBJECT_PREFIX: &str = "user:";

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (`user:<account id>`)
    pub sub: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Token ID
    pub jti: String,
}

impl Claims {
    /// Check if the token belongs to an account (sub starts with "user:")
    pub fn is_user(&self) -> bool {
        self.sub.starts_with(SUBJECT_PREFIX)
    }

    /// The account id named by the subject, if it is a well-formed account subject
    pub fn account_id(&self) -> Option<i64> {
        self.sub
            .strip_prefix(SUBJECT_PREFIX)
            .and_then(|id| id.parse::<i64>().ok())
            .filter(|id| *id > 0)
    }
}

/// Token response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
}

impl AccessToken {
    fn bearer(token: String) -> Self {
        Self {
            access_token: token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Signs and verifies access tokens with the configured HMAC key
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    algorithm: Algorithm,
    validation: Validation,
    lifetime: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("algorithm", &self.algorithm)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Build the issuer from configuration
    ///
    /// Only HMAC algorithms are accepted; anything else is a configuration error.
    pub fn new(config: &JwtConfig) -> Result<Self> {
        let algorithm = parse_algorithm(&config.algorithm)?;

        if config.secret_key.is_empty() {
            return Err(config_error("JWT secret key must not be empty".to_string()));
        }
        if config.access_token_expire_minutes <= 0 {
            return Err(config_error(format!(
                "access_token_expire_minutes must be positive, got {}",
                config.access_token_expire_minutes
            )));
        }

        let secret = config.secret_key.as_bytes();

        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: Arc::new(EncodingKey::from_secret(secret)),
            decoding_key: Arc::new(DecodingKey::from_secret(secret)),
            algorithm,
            validation,
            lifetime: Duration::minutes(config.access_token_expire_minutes),
        })
    }

    /// Issue a token for an account, valid from now
    pub fn issue(&self, account_id: i64) -> Result<AccessToken> {
        self.issue_at(account_id, Utc::now())
    }

    /// Issue a token as if signed at `issued_at`
    pub fn issue_at(&self, account_id: i64, issued_at: DateTime<Utc>) -> Result<AccessToken> {
        let claims = Claims {
            sub: format!("{}{}", SUBJECT_PREFIX, account_id),
            exp: (issued_at + self.lifetime).timestamp(),
            iat: issued_at.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding_key)?;
        Ok(AccessToken::bearer(token))
    }

    /// Verify signature and expiry and return the claims
    ///
    /// Every failure collapses into the generic 401.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            tracing::debug!("Token rejected: {}", e);
            Error::not_authorized()
        })?;

        if !data.claims.is_user() {
            tracing::debug!("Token subject is not an account");
            return Err(Error::not_authorized());
        }

        Ok(data.claims)
    }
}

fn parse_algorithm(alg: &str) -> Result<Algorithm> {
    match alg.to_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        _ => Err(config_error(format!("Unsupported JWT algorithm: {}", alg))),
    }
}

fn config_error(message: String) -> Error {
    Error::Config(Box::new(figment::Error::from(message)))
}
