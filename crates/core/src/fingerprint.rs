//! Short, stable digests for values that must not appear in logs verbatim.

/// Number of digest bytes kept in a fingerprint.
const FINGERPRINT_BYTES: usize = 6;

/// BLAKE3 fingerprint of `value`, hex encoded.
///
/// Input is case-folded first so `Nova@Gmail.com` and `nova@gmail.com`
/// correlate in log search.
pub fn fingerprint(value: &str) -> String {
    let hash = blake3::hash(value.trim().to_lowercase().as_bytes());
    hex::encode(&hash.as_bytes()[..FINGERPRINT_BYTES])
}
