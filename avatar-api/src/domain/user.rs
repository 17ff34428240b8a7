use std::fmt;

use crate::domain::models::UserId;
use axum_login::AuthUser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Moderator,
    User,
}

impl From<String> for Role {
    fn from(role: String) -> Self {
        match role.as_str() {
            "Admin" => Role::Admin,
            "Moderator" => Role::Moderator,
            _ => Role::User,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let role_str = match self {
            Role::Admin => "Admin",
            Role::Moderator => "Moderator",
            Role::User => "User",
        };
        write!(f, "{role_str}")
    }
}

/// A platform account. Avatar state is not carried here; the avatar store
/// is the source of truth for `avatar_type` and the uploaded set.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub access_token: String,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .field("role", &self.role)
            .field("access_token", &"[redacted]")
            .finish()
    }
}

impl AuthUser for User {
    type Id = i32;

    fn id(&self) -> Self::Id {
        self.id.as_i32()
    }

    fn session_auth_hash(&self) -> &[u8] {
        self.access_token.as_bytes()
    }
}

/// The identity an avatar action runs as, possibly anonymous.
///
/// This is the whole authentication surface the avatar domain consumes;
/// how the identity was established is the auth layer's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    id: Option<UserId>,
    role: Role,
}

impl Caller {
    pub fn authenticated(id: UserId, role: Role) -> Self {
        Self { id: Some(id), role }
    }

    pub fn anonymous() -> Self {
        Self {
            id: None,
            role: Role::User,
        }
    }

    pub fn id(&self) -> Option<UserId> {
        self.id
    }

    pub fn is_authenticated(&self) -> bool {
        self.id.is_some()
    }

    pub fn is_administrator(&self) -> bool {
        self.id.is_some() && self.role == Role::Admin
    }

    pub fn is_administrator_or_moderator(&self) -> bool {
        self.id.is_some() && matches!(self.role, Role::Admin | Role::Moderator)
    }
}
