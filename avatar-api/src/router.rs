use axum::{http::Method, Router};
use axum_login::{
    tower_sessions::{cookie::SameSite, Expiry, SessionManagerLayer},
    AuthManagerLayerBuilder,
};
use sqlx::PgPool;
use time::Duration;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, TraceLayer},
};
use tower_sessions_moka_store::MokaStore;

use crate::{app_state::AppState, auth, auth::AuthBackend, config::Settings, routes};

pub async fn create(connection_pool: PgPool, config: Settings) -> Router<()> {
    // In-memory session store; sessions do not survive restarts, which is
    // acceptable for a token login flow.
    let session_store = MokaStore::new(Some(2_000));
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::days(7)));

    let backend = AuthBackend::new(connection_pool.clone());
    let auth_layer = AuthManagerLayerBuilder::new(backend, session_layer).build();

    let app_state = AppState::new(connection_pool, &config);

    let app_url = config.application.app_url.clone();
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(["content-type".parse().unwrap()])
        .allow_credentials(true)
        .allow_origin(AllowOrigin::predicate(move |origin, _| {
            origin.to_str().unwrap_or_default() == app_url
        }));

    Router::new()
        .nest("/users", routes::avatars::user_router())
        .nest("/avatars", routes::avatars::avatar_router())
        .merge(auth::router())
        .layer(auth_layer)
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
}
