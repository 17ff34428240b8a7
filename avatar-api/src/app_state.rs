use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    adapters::outbound::{
        postgres::PostgresAvatarStore, EmailHashGravatarUrls, StaticDefaultAvatarUrls,
    },
    config::Settings,
    domain::{ports::inbound::AvatarService, services::AvatarServiceImpl},
};

/// Shared application state; the composition root for the avatar service.
#[derive(Clone)]
pub struct AppState {
    pub avatar_service: Arc<dyn AvatarService>,
    pub login_url: String,
    pub default_listing_size: u32,
}

impl AppState {
    pub fn new(db_pool: PgPool, settings: &Settings) -> Self {
        let store = Arc::new(PostgresAvatarStore::new(
            db_pool,
            settings.avatars.media_base_url.clone(),
        ));
        let gravatar = Arc::new(EmailHashGravatarUrls::new(
            settings.avatars.gravatar_host.clone(),
        ));
        let default_avatar = Arc::new(StaticDefaultAvatarUrls::new(
            settings.avatars.default_avatar_url.clone(),
        ));

        let avatar_service = AvatarServiceImpl::new(
            store,
            gravatar,
            default_avatar,
            settings.avatars.max_avatars_per_user,
        );

        Self {
            avatar_service: Arc::new(avatar_service),
            login_url: settings.application.login_url.clone(),
            default_listing_size: settings.avatars.default_listing_size,
        }
    }
}
