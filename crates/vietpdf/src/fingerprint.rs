//! Content fingerprinting for the artifact cache.
//!
//! The fingerprint is a SHA-256 over the raw uploaded bytes, rendered as
//! lowercase hex. Byte-identical resubmissions hash identically, which is
//! what makes the cache content-addressed.

use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Fingerprints a byte slice already held in memory (ingress path).
pub fn fingerprint_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Fingerprints a file on disk without loading it whole (worker path; the
/// worker recomputes rather than trusting the ingress).
pub fn fingerprint_file(path: &Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
