use std::ops::Deref;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::{domain::Caller, routes::ApiError};

use super::AuthSession;

/// Axum extractor producing the [`Caller`] identity for avatar actions.
///
/// Unlike a `login_required` guard, this never rejects anonymous requests:
/// unauthenticated callers surface as [`Caller::anonymous`] so the per-action
/// policy can decide to redirect to the login flow instead of erroring.
#[derive(Debug, Clone, Copy)]
pub struct AuthContext(Caller);

impl Deref for AuthContext {
    type Target = Caller;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
    AuthSession: FromRequestParts<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_session = AuthSession::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::internal("session layer missing"))?;

        let caller = auth_session
            .user
            .map(|user| Caller::authenticated(user.id, user.role))
            .unwrap_or_else(Caller::anonymous);

        Ok(AuthContext(caller))
    }
}
