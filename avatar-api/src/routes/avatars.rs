//! The avatar action surface.
//!
//! Every mutating action finishes with a redirect to the owner's listing,
//! whether or not the mutation was applied. Authorization failures degrade
//! the same way: anonymous callers go to the login flow, unprivileged ones
//! get the redirect with nothing applied.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    app_state::AppState,
    auth::AuthContext,
    domain::{
        authorize,
        models::{AvatarId, UserId},
        AccessDecision, AvatarAction, AvatarError,
    },
    routes::ApiError,
};

// Multipart overhead on top of the 5 MiB payload policy.
const AVATAR_UPLOAD_BODY_LIMIT: usize = 6 * 1024 * 1024;

pub fn user_router() -> Router<AppState> {
    Router::new()
        .route("/:user_id/avatars", get(show_list).post(upload))
        .route_layer(DefaultBodyLimit::max(AVATAR_UPLOAD_BODY_LIMIT))
        .route("/:user_id/avatars/primary", post(select_primary))
        .route("/:user_id/avatars/gravatar", post(enable_gravatar))
        .route("/:user_id/avatars/gravatar/disable", post(disable_gravatar))
        .route("/:user_id/avatars/default", post(enable_default))
}

pub fn avatar_router() -> Router<AppState> {
    Router::new().route("/:avatar_id/delete", post(delete_avatar))
}

#[derive(Debug, Deserialize)]
struct ListingQuery {
    size: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectPrimaryRequest {
    avatar_id: AvatarId,
}

fn show_list_path(user_id: &UserId) -> String {
    format!("/users/{user_id}/avatars")
}

fn redirect_to_show_list(user_id: &UserId) -> Response {
    Redirect::to(&show_list_path(user_id)).into_response()
}

fn login_redirect(state: &AppState, attempted: &str) -> Response {
    Redirect::to(&format!("{}?next={}", state.login_url, attempted)).into_response()
}

/// Evaluate the action policy; `Some` means "stop here and respond with
/// this redirect".
fn check_access(
    state: &AppState,
    action: AvatarAction,
    caller: &AuthContext,
    owner: &UserId,
    attempted: &str,
) -> Option<Response> {
    match authorize(action, caller, owner) {
        AccessDecision::Allowed => None,
        AccessDecision::RedirectToLogin => Some(login_redirect(state, attempted)),
        AccessDecision::RedirectNoop => {
            tracing::debug!(%owner, ?action, "avatar action denied, redirecting unchanged");
            Some(redirect_to_show_list(owner))
        }
    }
}

/// Mutations swallow validation failures: the caller is redirected to the
/// listing either way and must not branch on the outcome.
fn completed(result: Result<(), AvatarError>, owner: &UserId) -> Result<Response, ApiError> {
    match result {
        Ok(()) => Ok(redirect_to_show_list(owner)),
        Err(AvatarError::ValidationFailed(reason)) => {
            tracing::debug!(%owner, %reason, "avatar mutation skipped");
            Ok(redirect_to_show_list(owner))
        }
        Err(err) => Err(err.into()),
    }
}

#[instrument(name = "GET /users/:user_id/avatars", skip(ctx, state))]
async fn show_list(
    ctx: AuthContext,
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    Query(query): Query<ListingQuery>,
) -> Result<Response, ApiError> {
    let user_id = UserId::from(user_id);
    let path = show_list_path(&user_id);

    match authorize(AvatarAction::ShowList, &ctx, &user_id) {
        AccessDecision::Allowed => {}
        AccessDecision::RedirectToLogin => return Ok(login_redirect(&state, &path)),
        // Unprivileged viewers land on their own listing.
        AccessDecision::RedirectNoop => {
            return Ok(match ctx.id() {
                Some(caller_id) => redirect_to_show_list(&caller_id),
                None => login_redirect(&state, &path),
            });
        }
    }

    let size = query.size.unwrap_or(state.default_listing_size);
    let listing = state.avatar_service.list_avatars(&user_id, size).await?;

    Ok(Json(listing).into_response())
}

async fn select_primary(
    ctx: AuthContext,
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    Json(request): Json<SelectPrimaryRequest>,
) -> Result<Response, ApiError> {
    let user_id = UserId::from(user_id);
    let path = show_list_path(&user_id);
    if let Some(response) =
        check_access(&state, AvatarAction::SelectPrimary, &ctx, &user_id, &path)
    {
        return Ok(response);
    }

    let result = state
        .avatar_service
        .select_primary(&user_id, &request.avatar_id)
        .await;

    completed(result, &user_id)
}

#[instrument(name = "POST /users/:user_id/avatars", skip(ctx, state, multipart))]
async fn upload(
    ctx: AuthContext,
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let user_id = UserId::from(user_id);
    let path = show_list_path(&user_id);
    if let Some(response) = check_access(&state, AvatarAction::Upload, &ctx, &user_id, &path) {
        return Ok(response);
    }

    let (image, content_type) = match extract_image_from_multipart(&mut multipart).await {
        Ok(parts) => parts,
        Err(reason) => {
            tracing::debug!(%user_id, %reason, "avatar upload skipped");
            return Ok(redirect_to_show_list(&user_id));
        }
    };

    let result = state
        .avatar_service
        .upload(&user_id, image, content_type)
        .await;

    completed(result, &user_id)
}

async fn delete_avatar(
    ctx: AuthContext,
    State(state): State<AppState>,
    Path(avatar_id): Path<i32>,
) -> Result<Response, ApiError> {
    let avatar_id = AvatarId::from(avatar_id);
    let avatar = state.avatar_service.get_avatar(&avatar_id).await?;

    let owner = avatar.user_id;
    let path = show_list_path(&owner);
    if let Some(response) = check_access(&state, AvatarAction::Delete, &ctx, &owner, &path) {
        return Ok(response);
    }

    let result = state.avatar_service.delete(&avatar_id).await;

    completed(result, &owner)
}

async fn enable_gravatar(
    ctx: AuthContext,
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<Response, ApiError> {
    let user_id = UserId::from(user_id);
    let path = show_list_path(&user_id);
    if let Some(response) =
        check_access(&state, AvatarAction::EnableGravatar, &ctx, &user_id, &path)
    {
        return Ok(response);
    }

    completed(state.avatar_service.enable_gravatar(&user_id).await, &user_id)
}

async fn enable_default(
    ctx: AuthContext,
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<Response, ApiError> {
    let user_id = UserId::from(user_id);
    let path = show_list_path(&user_id);
    if let Some(response) = check_access(&state, AvatarAction::EnableDefault, &ctx, &user_id, &path)
    {
        return Ok(response);
    }

    completed(state.avatar_service.enable_default(&user_id).await, &user_id)
}

async fn disable_gravatar(
    ctx: AuthContext,
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<Response, ApiError> {
    let user_id = UserId::from(user_id);
    let path = show_list_path(&user_id);
    if let Some(response) =
        check_access(&state, AvatarAction::DisableGravatar, &ctx, &user_id, &path)
    {
        return Ok(response);
    }

    completed(state.avatar_service.disable_gravatar(&user_id).await, &user_id)
}

async fn extract_image_from_multipart(
    multipart: &mut Multipart,
) -> Result<(Vec<u8>, Option<String>), String> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| "failed to parse multipart field".to_string())?
    {
        if field.name() != Some("avatar") {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|_| "failed to read avatar payload".to_string())?;

        return Ok((bytes.to_vec(), content_type));
    }

    Err("missing avatar file field".to_string())
}
