//! Axum extractor resolving the authenticated account
//!
//! Handlers that take [`CurrentAccount`] are protected: the request must
//! carry `Authorization: Bearer <token>` with a valid, unexpired token whose
//! subject names an existing account. Every failure renders the same 401.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

use crate::error::{Error, Result};
use crate::models::Account;
use crate::state::AppState;

/// The account the request is authenticated as
#[derive(Debug, Clone)]
pub struct CurrentAccount(pub Account);

impl CurrentAccount {
    /// Fail unless the authenticated account is the one with `id`
    pub fn ensure_owns(&self, id: i64) -> Result<()> {
        if self.0.id == id {
            Ok(())
        } else {
            tracing::info!(
                account_id = self.0.id,
                target_id = id,
                "Account tried to act on another account"
            );
            Err(Error::not_authorized())
        }
    }
}

impl FromRequestParts<AppState> for CurrentAccount {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = extract_token(&parts.headers)?;
        let claims = state.tokens().verify(token)?;

        let Some(account_id) = claims.account_id() else {
            tracing::debug!("Token subject does not name an account id");
            return Err(Error::not_authorized());
        };

        match state.accounts().find_by_id(account_id).await? {
            Some(account) => Ok(CurrentAccount(account)),
            None => {
                tracing::debug!(account_id, "Token subject no longer exists");
                Err(Error::not_authorized())
            }
        }
    }
}

/// Extract the token from the Authorization header (Bearer scheme)
pub fn extract_token(headers: &HeaderMap) -> Result<&str> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(Error::not_authorized)?;

    let (scheme, token) = auth_header
        .split_once(' ')
        .ok_or_else(Error::not_authorized)?;

    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(Error::not_authorized());
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewAccount;
    use crate::state::test_state;
    use axum::http::{HeaderValue, Request};

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    async fn extract(state: &AppState, authorization: Option<&str>) -> Result<CurrentAccount> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        CurrentAccount::from_request_parts(&mut parts, state).await
    }

    #[test]
    fn test_extract_token() {
        assert_eq!(extract_token(&headers("Bearer abc")).unwrap(), "abc");
        assert_eq!(extract_token(&headers("bearer abc")).unwrap(), "abc");
        assert!(extract_token(&headers("Basic abc")).is_err());
        assert!(extract_token(&headers("Bearer ")).is_err());
        assert!(extract_token(&headers("Bearer")).is_err());
        assert!(extract_token(&HeaderMap::new()).is_err());
    }

    #[tokio::test]
    async fn test_resolves_existing_account() {
        let state = test_state().await;
        let account = state
            .accounts()
            .create(NewAccount {
                username: "dudu".into(),
                email: "dudu@dudu.com".into(),
                password_hash: "h".into(),
            })
            .await
            .unwrap();
        let token = state.tokens().issue(account.id).unwrap();

        let current = extract(&state, Some(&format!("Bearer {}", token.access_token)))
            .await
            .unwrap();
        assert_eq!(current.0, account);
        assert!(current.ensure_owns(account.id).is_ok());
        assert!(matches!(current.ensure_owns(account.id + 1), Err(Error::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_rejects_missing_and_unknown_subjects() {
        let state = test_state().await;
        assert!(matches!(extract(&state, None).await, Err(Error::Unauthorized(_))));

        // Valid signature, but no such account
        let token = state.tokens().issue(404).unwrap();
        assert!(matches!(
            extract(&state, Some(&format!("Bearer {}", token.access_token))).await,
            Err(Error::Unauthorized(_))
        ));

        assert!(matches!(
            extract(&state, Some("Bearer garbage")).await,
            Err(Error::Unauthorized(_))
        ));
    }
}
