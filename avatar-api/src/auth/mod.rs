mod backend;
mod extractor;
mod router;

pub use backend::AuthBackend;
pub use backend::AuthSession;
pub use backend::Credentials;
pub use extractor::AuthContext;
pub use router::router;
