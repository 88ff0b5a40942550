//! Gateway functionality - task endpoints and sign-in.
//!
//! - Task CRUD, completion and listing under `/api/task*`
//! - Next-date computation at `/api/nextdate`
//! - Password sign-in at `/api/signin` and the cookie session guard

pub mod auth;
pub mod tasks;

use axum::{extract::rejection::JsonRejection, middleware, routing::post, Json, Router};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Create the gateway router.
///
/// Task routes sit behind [`auth::auth_middleware`]; the guard lets every
/// request through when no password is configured.
pub fn create_router(state: &AppState) -> Router<AppState> {
    let protected = tasks::router().route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth::auth_middleware,
    ));

    Router::new()
        .merge(protected)
        .merge(tasks::public_router())
        .route("/api/signin", post(auth::sign_in))
}

/// Unwrap a JSON body, turning extractor rejections into `{"error"}` 400s.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::validation(format!("invalid request body: {}", rejection.body_text())))
}
