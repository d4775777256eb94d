//! Password hashing using Argon2id
//!
//! Stored hashes use the self-describing PHC string format, so verification
//! reads the cost parameters from the hash itself and older hashes keep
//! working after the configured costs change.

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as Argon2Hasher, PasswordVerifier,
        SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

use crate::config::PasswordConfig;
use crate::error::{Error, Result};
use crate::messages;

/// Password hasher using Argon2id
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
    min_password_length: usize,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("m_cost", &self.params.m_cost())
            .field("t_cost", &self.params.t_cost())
            .field("p_cost", &self.params.p_cost())
            .field("min_password_length", &self.min_password_length)
            .finish()
    }
}

impl PasswordHasher {
    /// Create a hasher from configuration
    ///
    /// Fails with a configuration error when the Argon2 cost parameters are
    /// out of range.
    pub fn new(config: &PasswordConfig) -> Result<Self> {
        let params = Params::new(
            config.memory_cost_kib,
            config.time_cost,
            config.parallelism,
            None,
        )
        .map_err(|e| {
            Error::Config(Box::new(figment::Error::from(format!(
                "Invalid Argon2 parameters: {}",
                e
            ))))
        })?;

        Ok(Self {
            params,
            min_password_length: config.min_password_length,
        })
    }

    /// Hash a password into a PHC string
    ///
    /// Rejects passwords shorter than the configured minimum (counted in
    /// characters) with a validation error.
    pub fn hash(&self, password: &str) -> Result<String> {
        if password.chars().count() < self.min_password_length {
            return Err(Error::ValidationError(messages::password_too_short(
                self.min_password_length,
            )));
        }

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| Error::Auth(format!("Failed to hash password: {}", e)))?;

        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash
    ///
    /// A wrong password is `Ok(false)`; a hash that cannot be parsed is an error.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| Error::Auth(format!("Invalid password hash format: {}", e)))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(Error::Auth(format!("Password verification failed: {}", e))),
        }
    }

    /// Whether a stored hash was produced with different parameters
    pub fn needs_rehash(&self, hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return true;
        };

        if parsed_hash.algorithm != Algorithm::Argon2id.ident() {
            return true;
        }

        // Version 0x13 = 19
        if parsed_hash.version != Some(19) {
            return true;
        }

        let param = |name: &str| {
            parsed_hash
                .params
                .iter()
                .find(|(k, _)| k.as_str() == name)
                .and_then(|(_, v)| v.decimal().ok())
        };

        param("m") != Some(self.params.m_cost())
            || param("t") != Some(self.params.t_cost())
            || param("p") != Some(self.params.p_cost())
    }

    /// Minimum accepted password length
    pub fn min_password_length(&self) -> usize {
        self.min_password_length
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> PasswordConfig {
    PasswordConfig {
        memory_cost_kib: 8192,
        time_cost: 1,
        parallelism: 1,
        min_password_length: 6,
    }
}
