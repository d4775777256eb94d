//! Novelist endpoints

use axum::extract::State;
use serde::Serialize;

use super::extract::{Json, Path, Query};
use super::query::NovelistListQuery;
use crate::auth::CurrentAccount;
use crate::error::{Error, Result};
use crate::messages;
use crate::models::{Novelist, NovelistPatch, NovelistSchema};
use crate::repository::Repository;
use crate::responses::{Created, Message};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct NovelistList {
    pub romancistas: Vec<Novelist>,
}

/// `POST /romancista`
pub async fn create_novelist(
    State(state): State<AppState>,
    _current: CurrentAccount,
    Json(payload): Json<NovelistSchema>,
) -> Result<Created<Novelist>> {
    let novelist = state.novelists().create(payload.validate()?).await?;
    let location = format!("/romancista/{}", novelist.id);
    Ok(Created::new(novelist).with_location(location))
}

/// `GET /romancista/{id}`
pub async fn get_novelist(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Novelist>> {
    state
        .novelists()
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| Error::NotFound(messages::NOVELIST_NOT_FOUND.to_string()))
}

/// `GET /romancista?nome=&pagina=`
pub async fn list_novelists(
    State(state): State<AppState>,
    Query(query): Query<NovelistListQuery>,
) -> Result<Json<NovelistList>> {
    let pagination = query.pagination()?;
    let romancistas = state
        .novelists()
        .find_all(&query.filters(), &pagination)
        .await?;
    Ok(Json(NovelistList { romancistas }))
}

/// `PATCH /romancista/{id}`
pub async fn update_novelist(
    State(state): State<AppState>,
    _current: CurrentAccount,
    Path(id): Path<i64>,
    Json(patch): Json<NovelistPatch>,
) -> Result<Json<Novelist>> {
    let novelist = state.novelists().update(id, patch.validate()?).await?;
    Ok(Json(novelist))
}

/// `DELETE /romancista/{id}`
///
/// The novelist's books are removed in the same transaction.
pub async fn delete_novelist(
    State(state): State<AppState>,
    _current: CurrentAccount,
    Path(id): Path<i64>,
) -> Result<Message> {
    state.novelists().delete(id).await?;
    Ok(Message::new(messages::NOVELIST_DELETED))
}
