//! Deterministic content-version computation.
//!
//! The version is a pure function of the display-relevant fields of a
//! playlist's ordered items. Row ids and timestamps are excluded on purpose:
//! deleting and recreating an identical item set must reproduce the same
//! version, so devices comparing versions for equality see no change.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::store::PlaylistItem;

/// Reserved version for a playlist with zero items (and for screens that
/// resolve to no playlist at all). Distinct from any hash output so callers
/// can special-case "no content" without hashing an empty sequence.
pub const EMPTY_VERSION: &str = "pl-empty";

/// The display-relevant subset of an item, serialized in fixed field order.
#[derive(Serialize)]
struct ItemFingerprint<'a> {
    kind: &'static str,
    src: &'a str,
    duration: i32,
    checksum: Option<&'a str>,
    sort: i32,
}

impl<'a> From<&'a PlaylistItem> for ItemFingerprint<'a> {
    fn from(item: &'a PlaylistItem) -> Self {
        Self {
            kind: item.kind.as_str(),
            src: &item.src,
            duration: item.duration_secs,
            checksum: item.checksum.as_deref(),
            sort: item.sort,
        }
    }
}

/// Compute the content version of an ordered item sequence.
///
/// Canonical JSON encoding of the fingerprint tuples, SHA-256 over the
/// bytes, `"sha256:" + hex`. Order matters; the empty sequence yields
/// [`EMPTY_VERSION`].
pub fn compute_version(items: &[PlaylistItem]) -> String {
    if items.is_empty() {
        return EMPTY_VERSION.to_string();
    }

    let fingerprints: Vec<ItemFingerprint<'_>> = items.iter().map(Into::into).collect();
    let payload = serde_json::to_vec(&fingerprints)
        .expect("fingerprint serialization is infallible for these field types");

    let hash = Sha256::digest(&payload);
    format!("sha256:{hash:x}")
}
