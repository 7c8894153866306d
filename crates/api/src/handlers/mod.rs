//! Request handlers, grouped by resource.

pub mod bulk;
pub mod device;
pub mod playlists;
