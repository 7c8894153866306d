//! Stateless repositories over `PgPool`.

pub mod playlist_repo;
pub mod screen_repo;

pub use playlist_repo::PlaylistRepo;
pub use screen_repo::ScreenRepo;
