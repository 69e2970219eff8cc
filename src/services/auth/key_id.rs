//! libtrust-style key identifiers, the `kid` format registries use to pick a
//! trusted signing key.

use data_encoding::BASE32_NOPAD;
use sha2::{Digest, Sha256};

const FINGERPRINT_LEN: usize = 30;
const GROUP_LEN: usize = 4;

/// Derive the key id from a DER-encoded SubjectPublicKeyInfo.
///
/// sha256(der)[..30] -> base32 (no padding) -> `ABCD:EFGH:...` (12 groups).
pub fn from_public_key_der(der: &[u8]) -> String {
    let digest = Sha256::digest(der);
    let encoded = BASE32_NOPAD.encode(&digest[..FINGERPRINT_LEN]);

    encoded
        .as_bytes()
        .chunks(GROUP_LEN)
        .map(|chunk| String::from_utf8_lossy(chunk))
        .collect::<Vec<_>>()
        .join(":")
}
