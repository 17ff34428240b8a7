use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    models::{
        AvatarDatum, AvatarId, AvatarKind, AvatarListing, AvatarType, NewUploadedAvatar,
        UploadedAvatar, UserId,
    },
    ports::{
        inbound::AvatarService,
        outbound::{AvatarStore, AvatarWrite, DefaultAvatarUrls, GravatarUrls},
    },
    selector, AvatarError,
};

const MAX_AVATAR_SIZE: usize = 5 * 1024 * 1024;

/// Primary Selector: builds candidate listings from the three avatar
/// sources and drives the `avatar_type` state machine through the store.
pub struct AvatarServiceImpl<S, G, D> {
    store: Arc<S>,
    gravatar: Arc<G>,
    default_avatar: Arc<D>,
    max_avatars_per_user: u32,
}

impl<S, G, D> AvatarServiceImpl<S, G, D>
where
    S: AvatarStore,
    G: GravatarUrls,
    D: DefaultAvatarUrls,
{
    pub fn new(
        store: Arc<S>,
        gravatar: Arc<G>,
        default_avatar: Arc<D>,
        max_avatars_per_user: u32,
    ) -> Self {
        Self {
            store,
            gravatar,
            default_avatar,
            max_avatars_per_user,
        }
    }

    /// Raw candidate listing: uploaded avatars in storage order, then the
    /// gravatar entry, then the default entry. Primary flags are taken as
    /// stored; reconciliation happens in [`selector::normalize`].
    async fn list_candidates(
        &self,
        user_id: &UserId,
        size: u32,
    ) -> Result<Vec<AvatarDatum>, AvatarError> {
        let owner = self.store.owner(user_id).await?;
        let uploaded = self.store.list_uploaded(user_id).await?;

        let mut candidates: Vec<AvatarDatum> = uploaded
            .iter()
            .map(|avatar| AvatarDatum {
                id: Some(avatar.id),
                kind: AvatarKind::Uploaded,
                url: self.store.url_for(avatar, size),
                is_primary: avatar.primary,
            })
            .collect();

        candidates.push(AvatarDatum {
            id: None,
            kind: AvatarKind::Gravatar,
            url: self.gravatar.url_for(&owner.email, size),
            is_primary: owner.avatar_type == AvatarType::Gravatar,
        });

        candidates.push(AvatarDatum {
            id: None,
            kind: AvatarKind::Default,
            url: self.default_avatar.url_for(user_id, size),
            is_primary: owner.avatar_type == AvatarType::Default,
        });

        Ok(candidates)
    }
}

#[async_trait]
impl<S, G, D> AvatarService for AvatarServiceImpl<S, G, D>
where
    S: AvatarStore,
    G: GravatarUrls,
    D: DefaultAvatarUrls,
{
    async fn list_avatars(
        &self,
        user_id: &UserId,
        size: u32,
    ) -> Result<AvatarListing, AvatarError> {
        let candidates = self.list_candidates(user_id, size).await?;
        let (avatars, has_uploaded_avatar) = selector::normalize(candidates);

        Ok(AvatarListing {
            avatars,
            has_uploaded_avatar,
            max_avatars: self.max_avatars_per_user,
        })
    }

    async fn get_avatar(&self, avatar_id: &AvatarId) -> Result<UploadedAvatar, AvatarError> {
        self.store.get(avatar_id).await
    }

    async fn select_primary(
        &self,
        user_id: &UserId,
        avatar_id: &AvatarId,
    ) -> Result<(), AvatarError> {
        let avatar = self.store.get(avatar_id).await?;
        if avatar.user_id != *user_id {
            return Err(AvatarError::validation(format!(
                "avatar {avatar_id} does not belong to user {user_id}"
            )));
        }

        self.store
            .apply(
                user_id,
                &[
                    AvatarWrite::SetAvatarType(AvatarType::Uploaded),
                    AvatarWrite::ClearPrimaries,
                    AvatarWrite::SetPrimary {
                        avatar_id: *avatar_id,
                        primary: true,
                    },
                ],
            )
            .await?;

        tracing::info!(%user_id, %avatar_id, "avatar updated: primary selected");
        Ok(())
    }

    async fn upload(
        &self,
        user_id: &UserId,
        image: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<(), AvatarError> {
        if image.is_empty() {
            return Err(AvatarError::validation("empty avatar payload"));
        }
        if image.len() > MAX_AVATAR_SIZE {
            return Err(AvatarError::validation("avatar payload exceeds size limit"));
        }
        if let Some(content_type) = content_type.as_deref() {
            if !content_type.starts_with("image/") {
                return Err(AvatarError::validation(format!(
                    "unsupported content type: {content_type}"
                )));
            }
        }

        let existing = self.store.list_uploaded(user_id).await?;
        if existing.len() as u32 >= self.max_avatars_per_user {
            return Err(AvatarError::validation(format!(
                "avatar limit of {} reached",
                self.max_avatars_per_user
            )));
        }

        self.store
            .apply(
                user_id,
                &[
                    AvatarWrite::ClearPrimaries,
                    AvatarWrite::Insert(NewUploadedAvatar {
                        image,
                        primary: true,
                    }),
                    AvatarWrite::SetAvatarType(AvatarType::Uploaded),
                ],
            )
            .await?;

        tracing::info!(%user_id, "avatar updated: new upload made primary");
        Ok(())
    }

    async fn delete(&self, avatar_id: &AvatarId) -> Result<(), AvatarError> {
        let avatar = self.store.get(avatar_id).await?;
        // Capture the active type before the row disappears.
        let owner = self.store.owner(&avatar.user_id).await?;

        let mut writes = vec![AvatarWrite::Delete(*avatar_id)];
        // Deleting while gravatar is active resets the remaining uploaded
        // primaries instead of promoting one. Longstanding policy; the
        // listing path copes either way.
        if owner.avatar_type == AvatarType::Gravatar {
            writes.push(AvatarWrite::ClearPrimaries);
        }

        self.store.apply(&avatar.user_id, &writes).await
    }

    async fn enable_gravatar(&self, user_id: &UserId) -> Result<(), AvatarError> {
        self.store
            .apply(
                user_id,
                &[
                    AvatarWrite::SetAvatarType(AvatarType::Gravatar),
                    AvatarWrite::ClearPrimaries,
                ],
            )
            .await
    }

    async fn enable_default(&self, user_id: &UserId) -> Result<(), AvatarError> {
        self.store
            .apply(
                user_id,
                &[
                    AvatarWrite::SetAvatarType(AvatarType::Default),
                    AvatarWrite::ClearPrimaries,
                ],
            )
            .await
    }

    async fn disable_gravatar(&self, user_id: &UserId) -> Result<(), AvatarError> {
        let uploaded = self.store.list_uploaded(user_id).await?;

        let mut writes = vec![AvatarWrite::SetAvatarType(AvatarType::Uploaded)];
        if let Some(first) = uploaded.first() {
            writes.push(AvatarWrite::SetPrimary {
                avatar_id: first.id,
                primary: true,
            });
        }

        self.store.apply(user_id, &writes).await?;

        if let Some(first) = uploaded.first() {
            tracing::info!(%user_id, avatar_id = %first.id, "avatar updated: first upload promoted");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::InMemoryAvatarStore;

    struct FixedGravatar;

    impl GravatarUrls for FixedGravatar {
        fn url_for(&self, email: &str, size: u32) -> String {
            format!("gravatar://{email}?s={size}")
        }
    }

    struct FixedDefault;

    impl DefaultAvatarUrls for FixedDefault {
        fn url_for(&self, user_id: &UserId, size: u32) -> String {
            format!("default://{user_id}?s={size}")
        }
    }

    fn service(
        store: Arc<InMemoryAvatarStore>,
        max_avatars: u32,
    ) -> AvatarServiceImpl<InMemoryAvatarStore, FixedGravatar, FixedDefault> {
        AvatarServiceImpl::new(store, Arc::new(FixedGravatar), Arc::new(FixedDefault), max_avatars)
    }

    fn uid(id: i32) -> UserId {
        UserId::new(id)
    }

    fn kinds(listing: &AvatarListing) -> Vec<AvatarKind> {
        listing.avatars.iter().map(|d| d.kind).collect()
    }

    #[tokio::test]
    async fn gravatar_user_without_uploads_lists_gravatar_first() {
        let store = Arc::new(InMemoryAvatarStore::new());
        store.add_user(uid(1), "ada@example.com", AvatarType::Gravatar);
        let service = service(store, 10);

        let listing = service.list_avatars(&uid(1), 128).await.unwrap();

        assert_eq!(kinds(&listing), vec![AvatarKind::Gravatar, AvatarKind::Default]);
        assert!(listing.avatars[0].is_primary);
        assert!(!listing.avatars[1].is_primary);
        assert!(!listing.has_uploaded_avatar);
    }

    #[tokio::test]
    async fn first_upload_becomes_primary_and_switches_type() {
        let store = Arc::new(InMemoryAvatarStore::new());
        store.add_user(uid(1), "ada@example.com", AvatarType::Default);
        let service = service(Arc::clone(&store), 10);

        service
            .upload(&uid(1), vec![0xFF, 0xD8, 0xFF], Some("image/jpeg".into()))
            .await
            .unwrap();

        assert_eq!(store.avatar_type_of(&uid(1)), Some(AvatarType::Uploaded));

        let listing = service.list_avatars(&uid(1), 128).await.unwrap();
        assert!(listing.has_uploaded_avatar);
        assert_eq!(listing.avatars[0].kind, AvatarKind::Uploaded);
        assert!(listing.avatars[0].is_primary);
    }

    #[tokio::test]
    async fn enable_gravatar_clears_uploaded_primaries() {
        let store = Arc::new(InMemoryAvatarStore::new());
        store.add_user(uid(1), "ada@example.com", AvatarType::Uploaded);
        let x = store.add_avatar(&uid(1), true);
        let y = store.add_avatar(&uid(1), false);
        let service = service(Arc::clone(&store), 10);

        service.enable_gravatar(&uid(1)).await.unwrap();

        assert_eq!(store.avatar_type_of(&uid(1)), Some(AvatarType::Gravatar));
        assert_eq!(store.primary_flags(&uid(1)), vec![(x, false), (y, false)]);

        let listing = service.list_avatars(&uid(1), 128).await.unwrap();
        assert_eq!(
            kinds(&listing),
            vec![
                AvatarKind::Gravatar,
                AvatarKind::Uploaded,
                AvatarKind::Uploaded,
                AvatarKind::Default,
            ]
        );
        assert!(listing.avatars[0].is_primary);
    }

    #[tokio::test]
    async fn delete_while_on_gravatar_clears_remaining_primaries() {
        // Stale primary flags can survive from before the switch to
        // gravatar; deleting in that state resets the siblings rather than
        // promoting one. Documented policy, kept as-is.
        let store = Arc::new(InMemoryAvatarStore::new());
        store.add_user(uid(1), "ada@example.com", AvatarType::Gravatar);
        let z = store.add_avatar(&uid(1), true);
        let w = store.add_avatar(&uid(1), true);
        let service = service(Arc::clone(&store), 10);

        service.delete(&z).await.unwrap();

        assert_eq!(store.avatar_type_of(&uid(1)), Some(AvatarType::Gravatar));
        assert_eq!(store.primary_flags(&uid(1)), vec![(w, false)]);
    }

    #[tokio::test]
    async fn delete_while_on_uploaded_leaves_siblings_untouched() {
        let store = Arc::new(InMemoryAvatarStore::new());
        store.add_user(uid(1), "ada@example.com", AvatarType::Uploaded);
        let x = store.add_avatar(&uid(1), false);
        let y = store.add_avatar(&uid(1), true);
        let service = service(Arc::clone(&store), 10);

        service.delete(&x).await.unwrap();

        assert_eq!(store.primary_flags(&uid(1)), vec![(y, true)]);
    }

    #[tokio::test]
    async fn disable_gravatar_promotes_first_upload() {
        let store = Arc::new(InMemoryAvatarStore::new());
        store.add_user(uid(1), "ada@example.com", AvatarType::Gravatar);
        let w = store.add_avatar(&uid(1), false);
        let x = store.add_avatar(&uid(1), false);
        let service = service(Arc::clone(&store), 10);

        service.disable_gravatar(&uid(1)).await.unwrap();

        assert_eq!(store.avatar_type_of(&uid(1)), Some(AvatarType::Uploaded));
        assert_eq!(store.primary_flags(&uid(1)), vec![(w, true), (x, false)]);
    }

    #[tokio::test]
    async fn disable_gravatar_without_uploads_only_switches_type() {
        let store = Arc::new(InMemoryAvatarStore::new());
        store.add_user(uid(1), "ada@example.com", AvatarType::Gravatar);
        let service = service(Arc::clone(&store), 10);

        service.disable_gravatar(&uid(1)).await.unwrap();

        assert_eq!(store.avatar_type_of(&uid(1)), Some(AvatarType::Uploaded));
    }

    #[tokio::test]
    async fn select_primary_demotes_previous_primary() {
        let store = Arc::new(InMemoryAvatarStore::new());
        store.add_user(uid(1), "ada@example.com", AvatarType::Uploaded);
        let x = store.add_avatar(&uid(1), true);
        let y = store.add_avatar(&uid(1), false);
        let service = service(Arc::clone(&store), 10);

        service.select_primary(&uid(1), &y).await.unwrap();

        assert_eq!(store.avatar_type_of(&uid(1)), Some(AvatarType::Uploaded));
        assert_eq!(store.primary_flags(&uid(1)), vec![(x, false), (y, true)]);

        let listing = service.list_avatars(&uid(1), 128).await.unwrap();
        assert_eq!(listing.avatars[0].id, Some(y));
    }

    #[tokio::test]
    async fn select_primary_rejects_foreign_avatar() {
        let store = Arc::new(InMemoryAvatarStore::new());
        store.add_user(uid(1), "ada@example.com", AvatarType::Uploaded);
        store.add_user(uid(2), "bob@example.com", AvatarType::Uploaded);
        let theirs = store.add_avatar(&uid(2), true);
        let service = service(Arc::clone(&store), 10);

        let err = service.select_primary(&uid(1), &theirs).await.unwrap_err();

        assert!(matches!(err, AvatarError::ValidationFailed(_)));
        assert_eq!(store.primary_flags(&uid(2)), vec![(theirs, true)]);
    }

    #[tokio::test]
    async fn upload_rejects_when_limit_reached() {
        let store = Arc::new(InMemoryAvatarStore::new());
        store.add_user(uid(1), "ada@example.com", AvatarType::Uploaded);
        store.add_avatar(&uid(1), true);
        store.add_avatar(&uid(1), false);
        let service = service(Arc::clone(&store), 2);

        let err = service
            .upload(&uid(1), vec![1, 2, 3], Some("image/png".into()))
            .await
            .unwrap_err();

        assert!(matches!(err, AvatarError::ValidationFailed(_)));
        assert_eq!(store.primary_flags(&uid(1)).len(), 2);
    }

    #[tokio::test]
    async fn upload_rejects_non_image_content_type() {
        let store = Arc::new(InMemoryAvatarStore::new());
        store.add_user(uid(1), "ada@example.com", AvatarType::Default);
        let service = service(Arc::clone(&store), 10);

        let err = service
            .upload(&uid(1), vec![1, 2, 3], Some("text/plain".into()))
            .await
            .unwrap_err();

        assert!(matches!(err, AvatarError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn delete_of_unknown_avatar_is_not_found() {
        let store = Arc::new(InMemoryAvatarStore::new());
        store.add_user(uid(1), "ada@example.com", AvatarType::Uploaded);
        let service = service(store, 10);

        let err = service.delete(&AvatarId::new(999)).await.unwrap_err();

        assert!(matches!(err, AvatarError::NotFound));
    }

    #[tokio::test]
    async fn listing_repairs_conflicting_primary_flags() {
        // avatar_type says gravatar while an uploaded row still claims
        // primary: the listing reconciles instead of erroring.
        let store = Arc::new(InMemoryAvatarStore::new());
        store.add_user(uid(1), "ada@example.com", AvatarType::Gravatar);
        store.add_avatar(&uid(1), true);
        let service = service(store, 10);

        let listing = service.list_avatars(&uid(1), 128).await.unwrap();

        let primaries: Vec<_> = listing.avatars.iter().filter(|d| d.is_primary).collect();
        assert_eq!(primaries.len(), 1);
        assert_eq!(primaries[0].kind, AvatarKind::Gravatar);
        assert_eq!(listing.avatars[0].kind, AvatarKind::Gravatar);
    }
}
