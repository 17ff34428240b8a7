use crate::domain::models::UserId;

/// Gravatar URL composition. Offline and infallible: the URL is derived
/// from the email alone, whether or not the remote service is reachable.
pub trait GravatarUrls: Send + Sync + 'static {
    fn url_for(&self, email: &str, size: u32) -> String;
}

/// Platform-generated placeholder avatar, always available.
pub trait DefaultAvatarUrls: Send + Sync + 'static {
    fn url_for(&self, user_id: &UserId, size: u32) -> String;
}
