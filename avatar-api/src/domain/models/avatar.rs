use serde::Serialize;

use crate::domain::AvatarError;

use super::{AvatarId, UserId};

/// Which avatar source is active for a user. Exactly one at a time.
///
/// Persisted as the legacy single-character tags; anything else is rejected
/// at the storage boundary instead of leaking into the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarType {
    Uploaded,
    Gravatar,
    Default,
}

impl AvatarType {
    pub fn as_tag(&self) -> &'static str {
        match self {
            AvatarType::Uploaded => "a",
            AvatarType::Gravatar => "g",
            AvatarType::Default => "n",
        }
    }

    pub fn from_tag(tag: &str) -> Result<Self, AvatarError> {
        match tag {
            "a" => Ok(AvatarType::Uploaded),
            "g" => Ok(AvatarType::Gravatar),
            "n" => Ok(AvatarType::Default),
            other => Err(AvatarError::UnknownAvatarType(other.to_string())),
        }
    }
}

/// The kind of a single candidate entry in a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AvatarKind {
    Uploaded,
    Gravatar,
    Default,
}

/// A persisted user-submitted avatar row. The image bytes themselves are
/// owned by the storage adapter; `image_ref` is its opaque handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAvatar {
    pub id: AvatarId,
    pub user_id: UserId,
    pub image_ref: String,
    pub primary: bool,
}

/// A new avatar submission, not yet assigned an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUploadedAvatar {
    pub image: Vec<u8>,
    pub primary: bool,
}

/// The avatar-relevant slice of a user row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarOwner {
    pub id: UserId,
    pub email: String,
    pub avatar_type: AvatarType,
}

/// One entry of a listing response. Computed fresh on every request,
/// never persisted. `id` is absent for the gravatar and default entries.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AvatarDatum {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<AvatarId>,
    pub kind: AvatarKind,
    pub url: String,
    pub is_primary: bool,
}

/// The normalized listing: primary entry first, plus the flags the
/// original avatar page rendered next to it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AvatarListing {
    pub avatars: Vec<AvatarDatum>,
    pub has_uploaded_avatar: bool,
    pub max_avatars: u32,
}
