mod avatar;

pub use avatar::PostgresAvatarStore;
