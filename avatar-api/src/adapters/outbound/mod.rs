mod default_avatar;
mod gravatar;
mod memory;
pub mod postgres;

pub use default_avatar::*;
pub use gravatar::*;
pub use memory::*;
