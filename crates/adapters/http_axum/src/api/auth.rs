//! Authentication endpoints backed by the realms.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use stratum_app::ports::{AppMapper, Realm};
use stratum_domain::auth::{AuthenticationInfo, AuthenticationToken};

use crate::error::ApiError;
use crate::state::AppState;

/// Client credentials submitted to the app realm.
#[derive(Deserialize)]
pub struct AppLoginRequest {
    pub app_key: String,
    pub app_secret: String,
}

/// Any credential shape a realm understands.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum TokenRequest {
    Client { app_key: String, app_secret: String },
    User { username: String, password: String },
}

impl From<TokenRequest> for AuthenticationToken {
    fn from(req: TokenRequest) -> Self {
        match req {
            TokenRequest::Client {
                app_key,
                app_secret,
            } => Self::client(app_key, app_secret),
            TokenRequest::User { username, password } => Self::UsernamePassword { username, password },
        }
    }
}

/// `POST /api/auth/app`
pub async fn app<M>(
    State(state): State<AppState<M>>,
    Json(req): Json<AppLoginRequest>,
) -> Result<Json<AuthenticationInfo>, ApiError>
where
    M: AppMapper + Send + Sync + 'static,
{
    let token = AuthenticationToken::client(req.app_key, req.app_secret);
    let info = state.app_realm.authenticate(&token).await?;
    Ok(Json(info))
}

/// `POST /api/auth/client`
pub async fn client<M>(
    State(state): State<AppState<M>>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<AuthenticationInfo>, ApiError>
where
    M: AppMapper + Send + Sync + 'static,
{
    let token = AuthenticationToken::from(req);
    let info = state.client_realm.authenticate(&token).await?;
    Ok(Json(info))
}
