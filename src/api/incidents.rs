use crate::api::auth::{AdminUser, AuthUser};
use crate::api::error::ApiError;
use crate::api::AppState;
use crate::models::incident::{Incident, NewIncident, RegisteredIncident};
use crate::service::{registration, store};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

pub const DEFAULT_LIMIT: i64 = 5;
pub const MAX_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
}

pub async fn register(
    State(state): State<AppState>,
    _user: AuthUser,
    payload: Result<Json<NewIncident>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisteredIncident>), ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    request.check().map_err(ApiError::InvalidRequest)?;

    // Detached so a dropped client cannot abandon the open write transaction.
    let pool = state.pool.clone();
    let registered = tokio::spawn(async move {
        let mut conn = pool.acquire().await?;
        registration::register_incident(&mut conn, request).await
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok((StatusCode::CREATED, Json(registered)))
}

pub async fn list_recent(
    State(state): State<AppState>,
    _user: AuthUser,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Incident>>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(ApiError::InvalidRequest(format!(
            "limit must be between 1 and {}, got {}",
            MAX_LIMIT, limit
        )));
    }

    let mut conn = state.pool.acquire().await?;
    let incidents = store::list_recent(&mut conn, limit as u32).await?;

    Ok(Json(incidents))
}

pub async fn remove(
    State(state): State<AppState>,
    _admin: AdminUser,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;

    let mut conn = state.pool.acquire().await?;
    if !store::delete_by_id(&mut conn, id).await? {
        return Err(ApiError::NotFound(format!("incident {} not found", id)));
    }

    info!("Deleted incident {}", id);
    Ok(Json(json!({ "deleted": true, "id": id })))
}
