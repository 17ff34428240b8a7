mod avatar;
mod avatar_urls;

pub use avatar::*;
pub use avatar_urls::*;
