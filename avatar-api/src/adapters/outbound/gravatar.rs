use crate::domain::ports::outbound::GravatarUrls;

/// Gravatar URL composition from the md5 of the normalized email.
pub struct EmailHashGravatarUrls {
    host: String,
}

impl EmailHashGravatarUrls {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }
}

impl GravatarUrls for EmailHashGravatarUrls {
    fn url_for(&self, email: &str, size: u32) -> String {
        let hash = md5::compute(email.trim().to_lowercase().as_bytes());
        format!("https://{}/avatar/{:x}?s={}&d=identicon", self.host, hash, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_normalized_before_hashing() {
        let urls = EmailHashGravatarUrls::new("www.gravatar.com");

        assert_eq!(
            urls.url_for("Ada@Example.com", 128),
            urls.url_for("  ada@example.com ", 128),
        );
    }

    #[test]
    fn url_carries_host_and_size() {
        let urls = EmailHashGravatarUrls::new("gravatar.test");
        let url = urls.url_for("ada@example.com", 48);

        assert!(url.starts_with("https://gravatar.test/avatar/"));
        assert!(url.ends_with("?s=48&d=identicon"));
    }
}
