//! Content hashing for deterministic launcher names.

use sha2::{Digest, Sha256};

use crate::consts::SCRIPT_DIGEST_LEN;

/// Compute a short, content-derived hex digest.
///
/// The digest is a truncated SHA-256 of the input. Identical content always
/// produces the identical digest, so names derived from it are reproducible
/// across runs.
pub fn short_digest(data: &[u8]) -> String {
  let mut hasher = Sha256::new();
  hasher.update(data);
  let full = hex::encode(hasher.finalize());
  full[..SCRIPT_DIGEST_LEN].to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn digest_is_deterministic() {
    assert_eq!(short_digest(b"launcher body"), short_digest(b"launcher body"));
  }

  #[test]
  fn digest_changes_with_content() {
    assert_ne!(short_digest(b"a"), short_digest(b"b"));
  }

  #[test]
  fn digest_has_fixed_length() {
    assert_eq!(short_digest(b"").len(), SCRIPT_DIGEST_LEN);
    assert!(short_digest(b"x").chars().all(|c| c.is_ascii_hexdigit()));
  }
}
