//! In-memory avatar store for tests and local development.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{
    models::{AvatarId, AvatarOwner, AvatarType, UploadedAvatar, UserId},
    ports::outbound::{AvatarStore, AvatarWrite},
    AvatarError,
};

#[derive(Debug, Clone)]
struct StoredAvatar {
    id: AvatarId,
    image_ref: String,
    primary: bool,
    #[allow(dead_code)]
    image: Vec<u8>,
}

#[derive(Debug, Clone)]
struct UserEntry {
    email: String,
    avatar_type: AvatarType,
    avatars: Vec<StoredAvatar>,
}

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<i32, UserEntry>,
    next_avatar_id: i32,
}

/// The single mutex doubles as the per-user write serialization the
/// store contract asks for.
#[derive(Debug, Default)]
pub struct InMemoryAvatarStore {
    inner: Mutex<Inner>,
}

impl InMemoryAvatarStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user_id: UserId, email: &str, avatar_type: AvatarType) {
        let mut inner = self.inner.lock().expect("avatar store lock poisoned");
        inner.users.insert(
            user_id.as_i32(),
            UserEntry {
                email: email.to_string(),
                avatar_type,
                avatars: Vec::new(),
            },
        );
    }

    /// Seed an uploaded avatar directly, bypassing the upload transition.
    pub fn add_avatar(&self, user_id: &UserId, primary: bool) -> AvatarId {
        let mut inner = self.inner.lock().expect("avatar store lock poisoned");
        inner.next_avatar_id += 1;
        let id = AvatarId::new(inner.next_avatar_id);
        let entry = inner
            .users
            .get_mut(&user_id.as_i32())
            .expect("add_avatar for unknown user");
        entry.avatars.push(StoredAvatar {
            id,
            image_ref: format!("{user_id}/{id}.img"),
            primary,
            image: Vec::new(),
        });
        id
    }

    pub fn avatar_type_of(&self, user_id: &UserId) -> Option<AvatarType> {
        let inner = self.inner.lock().expect("avatar store lock poisoned");
        inner
            .users
            .get(&user_id.as_i32())
            .map(|entry| entry.avatar_type)
    }

    /// Primary flags in storage order, for asserting transition effects.
    pub fn primary_flags(&self, user_id: &UserId) -> Vec<(AvatarId, bool)> {
        let inner = self.inner.lock().expect("avatar store lock poisoned");
        inner
            .users
            .get(&user_id.as_i32())
            .map(|entry| {
                entry
                    .avatars
                    .iter()
                    .map(|avatar| (avatar.id, avatar.primary))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl AvatarStore for InMemoryAvatarStore {
    async fn owner(&self, user_id: &UserId) -> Result<AvatarOwner, AvatarError> {
        let inner = self.inner.lock().expect("avatar store lock poisoned");
        let entry = inner
            .users
            .get(&user_id.as_i32())
            .ok_or(AvatarError::NotFound)?;

        Ok(AvatarOwner {
            id: *user_id,
            email: entry.email.clone(),
            avatar_type: entry.avatar_type,
        })
    }

    async fn list_uploaded(&self, user_id: &UserId) -> Result<Vec<UploadedAvatar>, AvatarError> {
        let inner = self.inner.lock().expect("avatar store lock poisoned");
        let entry = inner
            .users
            .get(&user_id.as_i32())
            .ok_or(AvatarError::NotFound)?;

        Ok(entry
            .avatars
            .iter()
            .map(|avatar| UploadedAvatar {
                id: avatar.id,
                user_id: *user_id,
                image_ref: avatar.image_ref.clone(),
                primary: avatar.primary,
            })
            .collect())
    }

    async fn get(&self, avatar_id: &AvatarId) -> Result<UploadedAvatar, AvatarError> {
        let inner = self.inner.lock().expect("avatar store lock poisoned");
        for (user_id, entry) in &inner.users {
            if let Some(avatar) = entry.avatars.iter().find(|avatar| avatar.id == *avatar_id) {
                return Ok(UploadedAvatar {
                    id: avatar.id,
                    user_id: UserId::new(*user_id),
                    image_ref: avatar.image_ref.clone(),
                    primary: avatar.primary,
                });
            }
        }
        Err(AvatarError::NotFound)
    }

    fn url_for(&self, avatar: &UploadedAvatar, size: u32) -> String {
        format!("memory://avatars/{}?s={size}", avatar.image_ref)
    }

    async fn apply(&self, user_id: &UserId, writes: &[AvatarWrite]) -> Result<(), AvatarError> {
        let mut inner = self.inner.lock().expect("avatar store lock poisoned");
        if !inner.users.contains_key(&user_id.as_i32()) {
            return Err(AvatarError::NotFound);
        }

        for write in writes {
            match write {
                AvatarWrite::SetAvatarType(avatar_type) => {
                    let entry = inner
                        .users
                        .get_mut(&user_id.as_i32())
                        .ok_or(AvatarError::NotFound)?;
                    entry.avatar_type = *avatar_type;
                }
                AvatarWrite::SetPrimary { avatar_id, primary } => {
                    let entry = inner
                        .users
                        .get_mut(&user_id.as_i32())
                        .ok_or(AvatarError::NotFound)?;
                    if let Some(avatar) =
                        entry.avatars.iter_mut().find(|avatar| avatar.id == *avatar_id)
                    {
                        avatar.primary = *primary;
                    }
                }
                AvatarWrite::ClearPrimaries => {
                    let entry = inner
                        .users
                        .get_mut(&user_id.as_i32())
                        .ok_or(AvatarError::NotFound)?;
                    for avatar in &mut entry.avatars {
                        avatar.primary = false;
                    }
                }
                AvatarWrite::Insert(new_avatar) => {
                    inner.next_avatar_id += 1;
                    let id = AvatarId::new(inner.next_avatar_id);
                    let entry = inner
                        .users
                        .get_mut(&user_id.as_i32())
                        .ok_or(AvatarError::NotFound)?;
                    entry.avatars.push(StoredAvatar {
                        id,
                        image_ref: format!("{user_id}/{id}.img"),
                        primary: new_avatar.primary,
                        image: new_avatar.image.clone(),
                    });
                }
                AvatarWrite::Delete(avatar_id) => {
                    let entry = inner
                        .users
                        .get_mut(&user_id.as_i32())
                        .ok_or(AvatarError::NotFound)?;
                    entry.avatars.retain(|avatar| avatar.id != *avatar_id);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn apply_for_unknown_user_is_not_found() {
        let store = InMemoryAvatarStore::new();

        let err = store
            .apply(&UserId::new(42), &[AvatarWrite::ClearPrimaries])
            .await
            .unwrap_err();

        assert!(matches!(err, AvatarError::NotFound));
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids_in_storage_order() {
        let store = InMemoryAvatarStore::new();
        let user = UserId::new(1);
        store.add_user(user, "ada@example.com", AvatarType::Default);

        let a = store.add_avatar(&user, false);
        let b = store.add_avatar(&user, false);

        let listed = store.list_uploaded(&user).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, a);
        assert_eq!(listed[1].id, b);
    }
}
