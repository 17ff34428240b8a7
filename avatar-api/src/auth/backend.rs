use async_trait::async_trait;
use axum_login::{AuthnBackend, UserId as SessionUserId};
use serde::Deserialize;
use sqlx::PgPool;

use crate::domain::{models::UserId, Role, User};

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub access_token: String,
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct AuthBackend {
    db: PgPool,
}

impl AuthBackend {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    email: String,
    full_name: String,
    access_token: String,
    role: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId::new(row.id),
            email: row.email,
            full_name: row.full_name,
            role: Role::from(row.role),
            access_token: row.access_token,
        }
    }
}

#[async_trait]
impl AuthnBackend for AuthBackend {
    type User = User;
    type Credentials = Credentials;
    type Error = BackendError;

    async fn authenticate(
        &self,
        creds: Self::Credentials,
    ) -> Result<Option<Self::User>, Self::Error> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, full_name, access_token, role
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(&creds.email)
        .fetch_optional(&self.db)
        .await?;

        Ok(row
            .map(User::from)
            .filter(|user| user.access_token == creds.access_token))
    }

    async fn get_user(
        &self,
        user_id: &SessionUserId<Self>,
    ) -> Result<Option<Self::User>, Self::Error> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, full_name, access_token, role
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(User::from))
    }
}

pub type AuthSession = axum_login::AuthSession<AuthBackend>;
