mod auth;
mod playlist;

pub use auth::TokenManager;
pub use playlist::PlaylistCacheManager;
