use crate::domain::{models::UserId, ports::outbound::DefaultAvatarUrls};

/// Platform placeholder avatars served from a configured base URL.
pub struct StaticDefaultAvatarUrls {
    base_url: String,
}

impl StaticDefaultAvatarUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl DefaultAvatarUrls for StaticDefaultAvatarUrls {
    fn url_for(&self, user_id: &UserId, size: u32) -> String {
        format!(
            "{}/{}?s={}",
            self.base_url.trim_end_matches('/'),
            user_id,
            size
        )
    }
}
