//! JSON REST handlers for apps.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use stratum_app::ports::AppMapper;
use stratum_domain::app::App;
use stratum_domain::error::{NotFoundError, StratumError, ValidationError};
use stratum_domain::id::AppId;
use stratum_domain::time::now;

use crate::error::ApiError;
use crate::state::AppState;

const ENTITY: &str = "app";

/// Optional probe fields accepted by the list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub app_key: Option<String>,
    pub name: Option<String>,
    pub available: Option<bool>,
}

impl ListQuery {
    fn into_probe(self) -> Option<App> {
        if self.app_key.is_none() && self.name.is_none() && self.available.is_none() {
            return None;
        }
        Some(App {
            app_key: self.app_key,
            name: self.name,
            available: self.available,
            ..App::default()
        })
    }
}

/// Request body for registering an app.
#[derive(Deserialize)]
pub struct CreateAppRequest {
    pub app_key: String,
    pub app_secret: String,
    pub name: String,
    pub description: Option<String>,
    pub available: Option<bool>,
}

/// Request body for `PUT` and `PATCH`.
///
/// `PATCH` only touches the fields that are present. `PUT` clears absent
/// fields, except the secret which is kept unless a new one is given.
#[derive(Default, Deserialize)]
pub struct UpdateAppRequest {
    pub app_key: Option<String>,
    pub app_secret: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub available: Option<bool>,
}

impl UpdateAppRequest {
    fn is_empty(&self) -> bool {
        self.app_key.is_none()
            && self.app_secret.is_none()
            && self.name.is_none()
            && self.description.is_none()
            && self.available.is_none()
    }
}

/// Request body for bulk deletion.
#[derive(Deserialize)]
pub struct DeleteManyRequest {
    pub ids: Vec<AppId>,
}

/// Number of rows removed by a bulk deletion.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Affected {
    pub affected: u64,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<App>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get, put and patch endpoints.
pub enum GetResponse {
    Ok(Json<App>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<App>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the delete endpoints.
pub enum DeleteResponse {
    NoContent,
    Affected(Json<Affected>),
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
            Self::Affected(json) => json.into_response(),
        }
    }
}

fn parse_id(raw: &str) -> Result<AppId, ApiError> {
    AppId::from_str(raw).map_err(|_| {
        ApiError::from(StratumError::from(ValidationError::InvalidId(
            raw.to_string(),
        )))
    })
}

fn not_found(id: AppId) -> ApiError {
    ApiError::from(StratumError::from(NotFoundError {
        entity: ENTITY,
        id: id.to_string(),
    }))
}

fn reject_blank(field: &'static str, value: Option<&str>) -> Result<(), ApiError> {
    match value {
        Some(value) if value.trim().is_empty() => {
            Err(StratumError::from(ValidationError::Empty(field)).into())
        }
        _ => Ok(()),
    }
}

/// Fail with a conflict when `app_key` belongs to an app other than `owner`.
async fn ensure_key_free<M>(
    state: &AppState<M>,
    app_key: &str,
    owner: Option<AppId>,
) -> Result<(), ApiError>
where
    M: AppMapper + Send + Sync + 'static,
{
    match state.apps.get_by_entity(&App::with_app_key(app_key)).await? {
        Some(existing) if existing.id != owner => {
            Err(StratumError::from(ValidationError::Duplicate("app_key")).into())
        }
        _ => Ok(()),
    }
}

fn hash_secret<M>(state: &AppState<M>, secret: Option<&str>) -> Result<Option<String>, ApiError> {
    reject_blank("app_secret", secret)?;
    secret
        .map(|secret| state.passwords.hash(secret))
        .transpose()
        .map_err(ApiError::from)
}

/// `GET /api/apps`
pub async fn list<M>(
    State(state): State<AppState<M>>,
    Query(query): Query<ListQuery>,
) -> Result<ListResponse, ApiError>
where
    M: AppMapper + Send + Sync + 'static,
{
    let apps = match query.into_probe() {
        Some(probe) => state.apps.list(&probe).await?,
        None => state.apps.list_all().await?,
    };
    Ok(ListResponse::Ok(Json(apps)))
}

/// `GET /api/apps/:id`
pub async fn get<M>(
    State(state): State<AppState<M>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    M: AppMapper + Send + Sync + 'static,
{
    let id = parse_id(&id)?;
    let app = state.apps.get_by_id(&id).await?.ok_or_else(|| not_found(id))?;
    Ok(GetResponse::Ok(Json(app)))
}

/// `POST /api/apps`
pub async fn create<M>(
    State(state): State<AppState<M>>,
    Json(req): Json<CreateAppRequest>,
) -> Result<CreateResponse, ApiError>
where
    M: AppMapper + Send + Sync + 'static,
{
    let mut builder = App::builder()
        .app_key(req.app_key)
        .name(req.name)
        .available(req.available.unwrap_or(true))
        .created_at(now());
    if let Some(description) = req.description {
        builder = builder.description(description);
    }
    let mut app = builder.build()?;
    if let Some(app_key) = app.app_key.as_deref() {
        ensure_key_free(&state, app_key, None).await?;
    }
    app.app_secret = hash_secret(&state, Some(req.app_secret.as_str()))?;

    let created = state.apps.save(app).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PUT /api/apps/:id`
pub async fn replace<M>(
    State(state): State<AppState<M>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateAppRequest>,
) -> Result<GetResponse, ApiError>
where
    M: AppMapper + Send + Sync + 'static,
{
    let id = parse_id(&id)?;
    let existing = state.apps.get_by_id(&id).await?.ok_or_else(|| not_found(id))?;

    let mut replacement = App {
        id: Some(id),
        app_key: req.app_key,
        app_secret: existing.app_secret,
        name: req.name,
        description: req.description,
        available: req.available,
        created_at: existing.created_at,
    };
    replacement.validate()?;
    if let Some(app_key) = replacement.app_key.as_deref() {
        ensure_key_free(&state, app_key, Some(id)).await?;
    }
    if let Some(secret) = hash_secret(&state, req.app_secret.as_deref())? {
        replacement.app_secret = Some(secret);
    }

    if state.apps.update_entity(&replacement).await? == 0 {
        return Err(not_found(id));
    }
    Ok(GetResponse::Ok(Json(replacement)))
}

/// `PATCH /api/apps/:id`
pub async fn patch<M>(
    State(state): State<AppState<M>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateAppRequest>,
) -> Result<GetResponse, ApiError>
where
    M: AppMapper + Send + Sync + 'static,
{
    let id = parse_id(&id)?;
    if !req.is_empty() {
        reject_blank("app_key", req.app_key.as_deref())?;
        reject_blank("name", req.name.as_deref())?;
        if let Some(app_key) = req.app_key.as_deref() {
            ensure_key_free(&state, app_key, Some(id)).await?;
        }
        let changes = App {
            id: Some(id),
            app_secret: hash_secret(&state, req.app_secret.as_deref())?,
            app_key: req.app_key,
            name: req.name,
            description: req.description,
            available: req.available,
            created_at: None,
        };
        if state.apps.update(&changes).await? == 0 {
            return Err(not_found(id));
        }
    }

    let app = state.apps.get_by_id(&id).await?.ok_or_else(|| not_found(id))?;
    Ok(GetResponse::Ok(Json(app)))
}

/// `DELETE /api/apps/:id`
pub async fn delete<M>(
    State(state): State<AppState<M>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    M: AppMapper + Send + Sync + 'static,
{
    let id = parse_id(&id)?;
    if state.apps.delete(&id).await? == 0 {
        return Err(not_found(id));
    }
    Ok(DeleteResponse::NoContent)
}

/// `POST /api/apps/delete`
pub async fn delete_many<M>(
    State(state): State<AppState<M>>,
    Json(req): Json<DeleteManyRequest>,
) -> Result<DeleteResponse, ApiError>
where
    M: AppMapper + Send + Sync + 'static,
{
    let affected = state.apps.delete_ids(&req.ids).await?;
    Ok(DeleteResponse::Affected(Json(Affected { affected })))
}
