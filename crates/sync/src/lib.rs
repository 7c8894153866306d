//! Playlist resolution, default caching, and bulk assignment.

pub mod bulk;
pub mod cache;
pub mod resolver;

#[cfg(test)]
pub(crate) mod teststore;

pub use bulk::{AssignmentOutcome, BulkAssignmentEngine, SkippedScreen};
pub use cache::{Clock, DefaultPlaylistCache, SystemClock};
pub use resolver::PlaylistResolver;
