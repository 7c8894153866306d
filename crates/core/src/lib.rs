//! Domain types and pure logic for the Beamview content sync engine.
//!
//! Zero internal deps so the store layer, the sync services, and any future
//! worker or CLI tooling can all build on it.

pub mod error;
pub mod store;
pub mod types;
pub mod version;
