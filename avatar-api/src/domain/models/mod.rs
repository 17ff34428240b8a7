mod avatar;
mod ids;

pub use avatar::*;
pub use ids::*;
