use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::domain::{
    models::{AvatarId, AvatarOwner, AvatarType, UploadedAvatar, UserId},
    ports::outbound::{AvatarStore, AvatarWrite},
    AvatarError,
};

pub struct PostgresAvatarStore {
    pool: PgPool,
    media_base_url: String,
}

impl PostgresAvatarStore {
    pub fn new(pool: PgPool, media_base_url: impl Into<String>) -> Self {
        Self {
            pool,
            media_base_url: media_base_url.into(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct OwnerRow {
    id: i32,
    email: String,
    avatar_type: String,
}

impl OwnerRow {
    fn into_owner(self) -> Result<AvatarOwner, AvatarError> {
        Ok(AvatarOwner {
            id: UserId::new(self.id),
            email: self.email,
            avatar_type: AvatarType::from_tag(&self.avatar_type)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AvatarRow {
    id: i32,
    user_id: i32,
    image_ref: String,
    is_primary: bool,
}

impl From<AvatarRow> for UploadedAvatar {
    fn from(row: AvatarRow) -> Self {
        UploadedAvatar {
            id: AvatarId::new(row.id),
            user_id: UserId::new(row.user_id),
            image_ref: row.image_ref,
            primary: row.is_primary,
        }
    }
}

fn storage_err(err: sqlx::Error) -> AvatarError {
    AvatarError::storage(err.to_string())
}

#[async_trait]
impl AvatarStore for PostgresAvatarStore {
    async fn owner(&self, user_id: &UserId) -> Result<AvatarOwner, AvatarError> {
        let row = sqlx::query_as::<_, OwnerRow>(
            r#"
            SELECT id, email, avatar_type
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_i32())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?
        .ok_or(AvatarError::NotFound)?;

        row.into_owner()
    }

    async fn list_uploaded(&self, user_id: &UserId) -> Result<Vec<UploadedAvatar>, AvatarError> {
        let rows = sqlx::query_as::<_, AvatarRow>(
            r#"
            SELECT id, user_id, image_ref, is_primary
            FROM uploaded_avatars
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id.as_i32())
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(rows.into_iter().map(UploadedAvatar::from).collect())
    }

    async fn get(&self, avatar_id: &AvatarId) -> Result<UploadedAvatar, AvatarError> {
        let row = sqlx::query_as::<_, AvatarRow>(
            r#"
            SELECT id, user_id, image_ref, is_primary
            FROM uploaded_avatars
            WHERE id = $1
            "#,
        )
        .bind(avatar_id.as_i32())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?
        .ok_or(AvatarError::NotFound)?;

        Ok(row.into())
    }

    fn url_for(&self, avatar: &UploadedAvatar, size: u32) -> String {
        format!(
            "{}/{}?s={}",
            self.media_base_url.trim_end_matches('/'),
            avatar.image_ref,
            size
        )
    }

    async fn apply(&self, user_id: &UserId, writes: &[AvatarWrite]) -> Result<(), AvatarError> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        // Row lock serializes transitions per user; listings read without it.
        let locked = sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id.as_i32())
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage_err)?;
        if locked.is_none() {
            return Err(AvatarError::NotFound);
        }

        for write in writes {
            match write {
                AvatarWrite::SetAvatarType(avatar_type) => {
                    sqlx::query("UPDATE users SET avatar_type = $1 WHERE id = $2")
                        .bind(avatar_type.as_tag())
                        .bind(user_id.as_i32())
                        .execute(&mut *tx)
                        .await
                        .map_err(storage_err)?;
                }
                AvatarWrite::SetPrimary { avatar_id, primary } => {
                    sqlx::query(
                        "UPDATE uploaded_avatars SET is_primary = $1 WHERE id = $2 AND user_id = $3",
                    )
                    .bind(primary)
                    .bind(avatar_id.as_i32())
                    .bind(user_id.as_i32())
                    .execute(&mut *tx)
                    .await
                    .map_err(storage_err)?;
                }
                AvatarWrite::ClearPrimaries => {
                    sqlx::query("UPDATE uploaded_avatars SET is_primary = FALSE WHERE user_id = $1")
                        .bind(user_id.as_i32())
                        .execute(&mut *tx)
                        .await
                        .map_err(storage_err)?;
                }
                AvatarWrite::Insert(new_avatar) => {
                    let image_ref = format!(
                        "{}/{}.img",
                        user_id,
                        OffsetDateTime::now_utc().unix_timestamp_nanos()
                    );
                    sqlx::query(
                        r#"
                        INSERT INTO uploaded_avatars (user_id, image, image_ref, is_primary)
                        VALUES ($1, $2, $3, $4)
                        "#,
                    )
                    .bind(user_id.as_i32())
                    .bind(new_avatar.image.as_slice())
                    .bind(&image_ref)
                    .bind(new_avatar.primary)
                    .execute(&mut *tx)
                    .await
                    .map_err(storage_err)?;
                }
                AvatarWrite::Delete(avatar_id) => {
                    sqlx::query("DELETE FROM uploaded_avatars WHERE id = $1")
                        .bind(avatar_id.as_i32())
                        .execute(&mut *tx)
                        .await
                        .map_err(storage_err)?;
                }
            }
        }

        tx.commit().await.map_err(storage_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_row_rejects_unknown_tag() {
        let row = OwnerRow {
            id: 1,
            email: "ada@example.com".to_string(),
            avatar_type: "x".to_string(),
        };

        let err = row.into_owner().unwrap_err();
        assert!(matches!(err, AvatarError::UnknownAvatarType(tag) if tag == "x"));
    }

    #[test]
    fn owner_row_decodes_known_tags() {
        for (tag, expected) in [
            ("a", AvatarType::Uploaded),
            ("g", AvatarType::Gravatar),
            ("n", AvatarType::Default),
        ] {
            let row = OwnerRow {
                id: 1,
                email: "ada@example.com".to_string(),
                avatar_type: tag.to_string(),
            };
            assert_eq!(row.into_owner().unwrap().avatar_type, expected);
        }
    }
}
