//! Content fingerprints for board descriptions.
//!
//! The fingerprint covers everything a build consumes (IO table, device,
//! clock, command sequences, programmers), so two builds with the same
//! fingerprint were constrained identically.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::Result;

/// A 32-byte SHA-256 content hash.
pub type ContentHash = [u8; 32];

/// Compute the SHA-256 content hash of any serializable value.
pub fn content_hash<T: Serialize>(value: &T) -> Result<ContentHash> {
    let json = serde_json::to_vec(value)?;
    let mut hasher = Sha256::new();
    hasher.update(&json);
    Ok(hasher.finalize().into())
}

/// Format a content hash as a hex string.
pub fn hash_hex(hash: &ContentHash) -> String {
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::PlatformDescriptor;

    #[test]
    fn deterministic_hash() {
        let p = PlatformDescriptor::ocp_tap_timecard("vivado");
        assert_eq!(content_hash(&p).unwrap(), content_hash(&p.clone()).unwrap());
    }

    #[test]
    fn pin_change_changes_hash() {
        let a = PlatformDescriptor::ocp_tap_timecard("vivado");
        let mut b = a.clone();
        b.io[3].pins = vec!["A1".into()];
        assert_ne!(content_hash(&a).unwrap(), content_hash(&b).unwrap());
    }

    #[test]
    fn hash_hex_format() {
        let h = content_hash(&42u32).unwrap();
        assert_eq!(hash_hex(&h).len(), 64);
    }
}
