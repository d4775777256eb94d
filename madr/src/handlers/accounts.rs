//! Account registration, update and removal

use axum::extract::State;

use super::extract::{Json, Path};
use crate::auth::CurrentAccount;
use crate::error::Result;
use crate::messages;
use crate::models::{AccountPatch, AccountPublic, AccountSchema, NewAccount};
use crate::responses::{Created, Message};
use crate::state::AppState;

/// `POST /conta`
pub async fn create_account(
    State(state): State<AppState>,
    Json(payload): Json<AccountSchema>,
) -> Result<Created<AccountPublic>> {
    let input = payload.validate()?;
    let password_hash = state.hasher().hash(&input.password)?;

    let account = state
        .accounts()
        .create(NewAccount {
            username: input.username,
            email: input.email,
            password_hash,
        })
        .await?;

    let location = format!("/conta/{}", account.id);
    Ok(Created::new(AccountPublic::from(account)).with_location(location))
}

/// `PUT /conta/{id}`
///
/// Only the account itself may change its data. A new password is hashed
/// before it reaches the repository.
pub async fn update_account(
    State(state): State<AppState>,
    current: CurrentAccount,
    Path(id): Path<i64>,
    Json(patch): Json<AccountPatch>,
) -> Result<Json<AccountPublic>> {
    current.ensure_owns(id)?;

    let mut changes = patch.validate()?;
    if let Some(password) = changes.password.take() {
        changes.password = Some(state.hasher().hash(&password)?);
    }

    let account = state.accounts().update(id, changes).await?;
    tracing::info!(account_id = account.id, "Account updated");
    Ok(Json(account.into()))
}

/// `DELETE /conta/{id}`
pub async fn delete_account(
    State(state): State<AppState>,
    current: CurrentAccount,
    Path(id): Path<i64>,
) -> Result<Message> {
    current.ensure_owns(id)?;
    state.accounts().delete(id).await?;
    Ok(Message::new(messages::ACCOUNT_DELETED))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::handlers::test_support::{app, login, register, send};
    use crate::messages;

    #[tokio::test]
    async fn test_create_account_normalizes_and_hides_password() {
        let app = app().await;
        let body = register(&app, "Dunossauro!", "dudu@dudu.com", "123456").await;

        assert_eq!(body["username"], "dunossauro");
        assert_eq!(body["email"], "dudu@dudu.com");
        assert!(body["id"].is_i64());
        assert!(body.get("senha").is_none());
        assert!(body.get("password").is_none());
    }

    #[tokio::test]
    async fn test_username_and_email_conflicts() {
        let app = app().await;
        register(&app, "dudu", "dudu@dudu.com", "123456").await;

        for (payload, message) in [
            (
                json!({"username": "dudu", "email": "x@x.com", "senha": "123456"}),
                messages::ACCOUNT_USERNAME_CONFLICT,
            ),
            (
                json!({"username": "outro", "email": "dudu@dudu.com", "senha": "123456"}),
                messages::ACCOUNT_EMAIL_CONFLICT,
            ),
            (
                json!({"username": "dudu", "email": "dudu@dudu.com", "senha": "123456"}),
                messages::ACCOUNT_USERNAME_CONFLICT,
            ),
        ] {
            let (status, body) = send(&app, Method::POST, "/conta", None, Some(payload)).await;
            assert_eq!(status, StatusCode::CONFLICT);
            assert_eq!(body["message"], message);
        }
    }

    #[tokio::test]
    async fn test_create_rejects_bad_payloads() {
        let app = app().await;

        let (status, _) = send(
            &app,
            Method::POST,
            "/conta/",
            None,
            Some(json!({"username": "a", "email": "not-an-email", "senha": "123456"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            Method::POST,
            "/conta",
            None,
            Some(json!({"username": "a", "email": "a@a.com", "senha": "123"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], messages::password_too_short(6));

        let (status, _) = send(
            &app,
            Method::POST,
            "/conta",
            None,
            Some(json!({"username": "a"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_own_account() {
        let app = app().await;
        let me = register(&app, "dudu", "dudu@dudu.com", "123456").await;
        let token = login(&app, "dudu@dudu.com", "123456").await;
        let uri = format!("/conta/{}", me["id"]);

        let (status, body) = send(
            &app,
            Method::PUT,
            &uri,
            Some(&token),
            Some(json!({"username": "Novo Nome"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "novonome");
        assert_eq!(body["email"], "dudu@dudu.com");

        let (status, _) = send(
            &app,
            Method::PUT,
            &uri,
            Some(&token),
            Some(json!({"senha": "nova-senha"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        login(&app, "dudu@dudu.com", "nova-senha").await;
    }

    #[tokio::test]
    async fn test_update_with_no_fields_is_rejected() {
        let app = app().await;
        let me = register(&app, "dudu", "dudu@dudu.com", "123456").await;
        let token = login(&app, "dudu@dudu.com", "123456").await;

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/conta/{}", me["id"]),
            Some(&token),
            Some(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], messages::DATA_MISSING_FIELDS);
    }

    #[tokio::test]
    async fn test_acting_on_another_account_is_unauthorized() {
        let app = app().await;
        register(&app, "x", "x@x.com", "123456").await;
        let other = register(&app, "y", "y@y.com", "123456").await;
        let token = login(&app, "x@x.com", "123456").await;
        let uri = format!("/conta/{}", other["id"]);

        let (status, body) = send(
            &app,
            Method::PUT,
            &uri,
            Some(&token),
            Some(json!({"username": "hacked"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], messages::AUTH_NOT_AUTHORIZED);

        let (status, body) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], messages::AUTH_NOT_AUTHORIZED);
    }

    #[tokio::test]
    async fn test_delete_account_invalidates_its_token() {
        let app = app().await;
        let me = register(&app, "dudu", "dudu@dudu.com", "123456").await;
        let token = login(&app, "dudu@dudu.com", "123456").await;
        let uri = format!("/conta/{}", me["id"]);

        let (status, body) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], messages::ACCOUNT_DELETED);

        let (status, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let app = app().await;
        let (status, body) = send(
            &app,
            Method::PUT,
            "/conta/1",
            None,
            Some(json!({"username": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], messages::AUTH_NOT_AUTHORIZED);
    }
}
