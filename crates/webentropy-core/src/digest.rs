//! Deterministic concatenation and the dual-provider digest.
//!
//! The digest preimage is the exact concatenation of every successful
//! source's bytes in registry order — identical outcome sets always produce
//! identical preimages. SHA-256 runs on one of two implementations: the
//! platform-accelerated provider, or the bundled pure-Rust one as an
//! explicit choice or as a fallback. The provider label records which path
//! executed so operators can audit it.

use sha2::{Digest as _, Sha256};

use crate::source::SourceOutcome;

/// Which implementation path produced the digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestProvider {
    /// The assembly-accelerated primary implementation.
    Accelerated,
    /// The pure-Rust implementation, selected explicitly by configuration.
    SoftwareForced,
    /// The pure-Rust implementation, reached because the primary failed.
    SoftwareFallback,
}

impl std::fmt::Display for DigestProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accelerated => write!(f, "accelerated"),
            Self::SoftwareForced => write!(f, "software-forced"),
            Self::SoftwareFallback => write!(f, "software-fallback"),
        }
    }
}

/// A computed digest with both textual encodings.
#[derive(Debug, Clone)]
pub struct DigestResult {
    pub bytes: [u8; 32],
    pub provider: DigestProvider,
    pub hex: String,
    pub base64: String,
}

/// Join the successful outcomes' payloads, preserving input order.
///
/// Pure: no timestamps, no separators, no reordering. Total length equals
/// the sum of the parts.
pub fn concat_successful(outcomes: &[SourceOutcome]) -> Vec<u8> {
    let total: usize = outcomes.iter().filter(|o| o.ok).map(|o| o.bytes).sum();
    let mut buffer = Vec::with_capacity(total);
    for outcome in outcomes {
        if !outcome.ok {
            continue;
        }
        if let Some(data) = &outcome.data {
            buffer.extend_from_slice(data);
        }
    }
    buffer
}

/// Reduce a buffer to its SHA-256 digest.
///
/// `force_soft` selects the pure-Rust provider directly. Otherwise the
/// accelerated provider runs first and any panic inside it demotes the
/// request to the software fallback instead of taking down the invocation.
pub fn compute_digest(data: &[u8], force_soft: bool) -> DigestResult {
    if force_soft {
        return finish(soft_sha256(data), DigestProvider::SoftwareForced);
    }
    match accelerated_sha256(data) {
        Some(bytes) => finish(bytes, DigestProvider::Accelerated),
        None => finish(soft_sha256(data), DigestProvider::SoftwareFallback),
    }
}

fn accelerated_sha256(data: &[u8]) -> Option<[u8; 32]> {
    let digest = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        ring::digest::digest(&ring::digest::SHA256, data)
    }))
    .ok()?;
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(digest.as_ref());
    Some(bytes)
}

fn soft_sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

fn finish(bytes: [u8; 32], provider: DigestProvider) -> DigestResult {
    use base64::Engine as _;
    DigestResult {
        bytes,
        provider,
        hex: hex::encode(bytes),
        base64: base64::engine::general_purpose::STANDARD.encode(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceOutcome;
    use base64::Engine as _;

    fn ok(id: &str, data: &[u8]) -> SourceOutcome {
        SourceOutcome::success(id, data.to_vec(), 1, &[], false, Some(200))
    }

    fn fail(id: &str) -> SourceOutcome {
        SourceOutcome::failure(id, "HTTP 500".to_string(), 1, &[], false, Some(500))
    }

    #[test]
    fn concat_preserves_order_and_length() {
        let outcomes = vec![ok("a", b"one"), fail("b"), ok("c", b"two"), ok("d", b"")];
        let buf = concat_successful(&outcomes);
        assert_eq!(buf, b"onetwo");
        assert_eq!(
            buf.len(),
            outcomes.iter().filter(|o| o.ok).map(|o| o.bytes).sum::<usize>()
        );
    }

    #[test]
    fn concat_is_deterministic() {
        let outcomes = vec![ok("a", &[1, 2, 3]), ok("b", &[4, 5])];
        assert_eq!(concat_successful(&outcomes), concat_successful(&outcomes));
    }

    #[test]
    fn concat_order_changes_the_preimage() {
        let ab = concat_successful(&[ok("a", b"ab"), ok("b", b"cd")]);
        let ba = concat_successful(&[ok("b", b"cd"), ok("a", b"ab")]);
        assert_ne!(ab, ba);
    }

    #[test]
    fn providers_agree_on_the_digest_value() {
        let data = b"the same preimage";
        let fast = compute_digest(data, false);
        let soft = compute_digest(data, true);
        assert_eq!(fast.bytes, soft.bytes);
        assert_eq!(fast.hex, soft.hex);
    }

    #[test]
    fn digest_matches_reference_vector() {
        // SHA-256 of the empty string.
        let d = compute_digest(b"", true);
        assert_eq!(
            d.hex,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn forced_flag_selects_the_software_provider() {
        let d = compute_digest(b"x", true);
        assert_eq!(d.provider, DigestProvider::SoftwareForced);
        let d = compute_digest(b"x", false);
        // The accelerated provider is expected on every supported target;
        // the fallback label only appears if it panicked.
        assert!(matches!(
            d.provider,
            DigestProvider::Accelerated | DigestProvider::SoftwareFallback
        ));
    }

    #[test]
    fn encodings_round_trip_to_identical_bytes() {
        let d = compute_digest(b"round trip", false);
        let from_hex = hex::decode(&d.hex).unwrap();
        let from_b64 = base64::engine::general_purpose::STANDARD
            .decode(&d.base64)
            .unwrap();
        assert_eq!(from_hex, d.bytes);
        assert_eq!(from_b64, d.bytes);
        assert_eq!(from_hex, from_b64);
    }

    #[test]
    fn provider_labels() {
        assert_eq!(DigestProvider::Accelerated.to_string(), "accelerated");
        assert_eq!(DigestProvider::SoftwareForced.to_string(), "software-forced");
        assert_eq!(
            DigestProvider::SoftwareFallback.to_string(),
            "software-fallback"
        );
    }
}
