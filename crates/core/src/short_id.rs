//! Short work ids.
//!
//! A work id is derived from the submitting artist and the item URLs, so
//! resubmitting the same set of files produces the same id and is caught as
//! a duplicate instead of creating a second record.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};

/// Length of every derived work id.
pub const SHORT_ID_LEN: usize = 8;

/// Derive the 8-character id for a new work.
///
/// SHA-256 over the artist id and the URLs (newline separated), base64
/// encoded, with `/`, `+` and `=` removed, lowercased and truncated.
pub fn determine_short_id<S: AsRef<str>>(artist_id: &str, urls: &[S]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(artist_id.as_bytes());
    for url in urls {
        hasher.update(b"\n");
        hasher.update(url.as_ref().as_bytes());
    }
    let encoded = STANDARD.encode(hasher.finalize());

    encoded
        .chars()
        .filter(|c| !matches!(c, '/' | '+' | '='))
        .map(|c| c.to_ascii_lowercase())
        .take(SHORT_ID_LEN)
        .collect()
}

/// Whether `id` has the shape of a derived work id.
pub fn is_short_id(id: &str) -> bool {
    id.len() == SHORT_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
}
