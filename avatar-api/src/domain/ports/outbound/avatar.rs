use async_trait::async_trait;

use crate::domain::{
    models::{AvatarId, AvatarOwner, AvatarType, NewUploadedAvatar, UploadedAvatar, UserId},
    AvatarError,
};

/// A single write primitive against a user's avatar state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvatarWrite {
    SetAvatarType(AvatarType),
    SetPrimary { avatar_id: AvatarId, primary: bool },
    ClearPrimaries,
    Insert(NewUploadedAvatar),
    Delete(AvatarId),
}

/// Storage collaborator for avatar state.
///
/// Reads may observe concurrent writes; `apply` must execute its batch as
/// one atomic unit per user, serialized against other batches for the same
/// user. Every call may fail with [`AvatarError::StorageUnavailable`].
#[async_trait]
pub trait AvatarStore: Send + Sync + 'static {
    async fn owner(&self, user_id: &UserId) -> Result<AvatarOwner, AvatarError>;

    /// All uploaded avatars of a user, in storage order.
    async fn list_uploaded(&self, user_id: &UserId) -> Result<Vec<UploadedAvatar>, AvatarError>;

    async fn get(&self, avatar_id: &AvatarId) -> Result<UploadedAvatar, AvatarError>;

    /// Display URL for an uploaded avatar at the requested pixel size.
    fn url_for(&self, avatar: &UploadedAvatar, size: u32) -> String;

    /// Apply a write batch atomically for one user.
    async fn apply(&self, user_id: &UserId, writes: &[AvatarWrite]) -> Result<(), AvatarError>;
}
