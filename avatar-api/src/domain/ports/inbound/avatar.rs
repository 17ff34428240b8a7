use async_trait::async_trait;

use crate::domain::{
    models::{AvatarId, AvatarListing, UploadedAvatar, UserId},
    AvatarError,
};

/// The avatar action surface consumed by the HTTP layer.
///
/// Mutations return `Ok(())` on success; callers are expected to redirect to
/// the listing afterwards rather than branch on the internal outcome.
#[async_trait]
pub trait AvatarService: Send + Sync + 'static {
    /// Normalized listing: primary entry first, exactly one primary.
    async fn list_avatars(&self, user_id: &UserId, size: u32)
        -> Result<AvatarListing, AvatarError>;

    /// Look up a single uploaded avatar, e.g. to authorize a delete.
    async fn get_avatar(&self, avatar_id: &AvatarId) -> Result<UploadedAvatar, AvatarError>;

    async fn select_primary(
        &self,
        user_id: &UserId,
        avatar_id: &AvatarId,
    ) -> Result<(), AvatarError>;

    async fn upload(
        &self,
        user_id: &UserId,
        image: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<(), AvatarError>;

    async fn delete(&self, avatar_id: &AvatarId) -> Result<(), AvatarError>;

    async fn enable_gravatar(&self, user_id: &UserId) -> Result<(), AvatarError>;

    async fn enable_default(&self, user_id: &UserId) -> Result<(), AvatarError>;

    async fn disable_gravatar(&self, user_id: &UserId) -> Result<(), AvatarError>;
}
