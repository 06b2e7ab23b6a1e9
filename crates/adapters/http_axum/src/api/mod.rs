//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod apps;
#[allow(clippy::missing_errors_doc)]
pub mod auth;

use axum::Router;
use axum::routing::{get, post};

use stratum_app::ports::AppMapper;

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<M>() -> Router<AppState<M>>
where
    M: AppMapper + Send + Sync + 'static,
{
    Router::new()
        // Apps
        .route("/apps", get(apps::list::<M>).post(apps::create::<M>))
        .route("/apps/delete", post(apps::delete_many::<M>))
        .route(
            "/apps/{id}",
            get(apps::get::<M>)
                .put(apps::replace::<M>)
                .patch(apps::patch::<M>)
                .delete(apps::delete::<M>),
        )
        // Authentication
        .route("/auth/app", post(auth::app::<M>))
        .route("/auth/client", post(auth::client::<M>))
}
