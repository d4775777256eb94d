//! Login and token refresh

use axum::extract::State;
use serde::Deserialize;

use super::extract::{Form, Json};
use crate::auth::{AccessToken, CurrentAccount};
use crate::error::{Error, Result};
use crate::messages;
use crate::state::AppState;

/// OAuth2 password-grant form; `username` carries the email
///
/// Other grant fields (`grant_type`, `scope`, client credentials) are
/// accepted and ignored.
#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

fn invalid_credentials() -> Error {
    Error::Unauthorized(messages::AUTH_INVALID_CREDENTIALS.to_string())
}

/// `POST /token`
///
/// An unknown email and a wrong password produce the same response.
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<AccessToken>> {
    let Some(account) = state.accounts().find_by_email(form.username.trim()).await? else {
        tracing::debug!("Login for unknown email");
        return Err(invalid_credentials());
    };

    if !state.hasher().verify(&form.password, &account.password)? {
        tracing::debug!(account_id = account.id, "Login with wrong password");
        return Err(invalid_credentials());
    }

    if state.hasher().needs_rehash(&account.password) {
        match state.hasher().hash(&form.password) {
            Ok(hash) => {
                if let Err(e) = state.accounts().update_password_hash(account.id, &hash).await {
                    tracing::warn!(account_id = account.id, "Failed to upgrade password hash: {}", e);
                }
            }
            Err(e) => {
                tracing::warn!(account_id = account.id, "Failed to rehash password: {}", e);
            }
        }
    }

    let token = state.tokens().issue(account.id)?;
    tracing::info!(account_id = account.id, "Account logged in");
    Ok(Json(token))
}

/// `POST /refresh-token`
pub async fn refresh_token(
    State(state): State<AppState>,
    CurrentAccount(account): CurrentAccount,
) -> Result<Json<AccessToken>> {
    let token = state.tokens().issue(account.id)?;
    tracing::debug!(account_id = account.id, "Token refreshed");
    Ok(Json(token))
}
