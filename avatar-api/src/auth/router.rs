use axum::{
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Redirect},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::{app_state::AppState, routes::ApiError};

use super::backend::{AuthSession, Credentials};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(me))
        .route("/auth/login", post(login))
        .route("/auth/logout", get(logout))
}

#[derive(Debug, Deserialize)]
struct NextUrl {
    next: Option<String>,
}

async fn login(
    mut auth_session: AuthSession,
    Query(NextUrl { next }): Query<NextUrl>,
    Json(creds): Json<Credentials>,
) -> Result<impl IntoResponse, ApiError> {
    let user = match auth_session.authenticate(creds).await {
        Ok(Some(user)) => user,
        Ok(None) => return Err(ApiError::unauthorized("invalid credentials")),
        Err(err) => {
            tracing::error!("authentication backend error: {err}");
            return Err(ApiError::internal("authentication backend error"));
        }
    };

    auth_session
        .login(&user)
        .await
        .map_err(|_| ApiError::internal("failed to create session"))?;

    Ok(Redirect::to(next.as_deref().unwrap_or("/")))
}

async fn me(auth_session: AuthSession) -> Result<impl IntoResponse, ApiError> {
    let user = auth_session
        .user
        .ok_or_else(|| ApiError::unauthorized("not authenticated"))?;

    Ok(Json(serde_json::json!({
        "id": user.id,
        "email": user.email,
        "fullName": user.full_name,
        "role": user.role.to_string(),
    })))
}

async fn logout(mut auth_session: AuthSession) -> Result<impl IntoResponse, ApiError> {
    auth_session
        .logout()
        .await
        .map_err(|_| ApiError::internal("failed to destroy session"))?;

    Ok(StatusCode::NO_CONTENT)
}
