mod error;
mod policy;
mod selector;
mod user;

pub mod models;
pub mod ports;
pub mod services;

pub use error::*;
pub use policy::*;
pub use selector::*;
pub use user::*;
