pub mod avatars;
pub mod error;

pub use error::ApiError;
