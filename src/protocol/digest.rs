//! Handshake digest algorithms
//!
//! The server's greeting names the hash to use for the challenge-response
//! login.  The client proves knowledge of the password by returning
//! `hex(hash(password_bytes ++ challenge_bytes))`.

use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::error::{ClientError, Result};
use crate::protocol::codec::to_hex;

/// Digest algorithms recognized in the server greeting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl DigestAlgorithm {
    /// Look up an algorithm by its greeting name, case-insensitively.
    ///
    /// An unrecognized name is a parse error rather than a silent failure.
    pub fn from_name(name: &str) -> Result<Self> {
        if name.eq_ignore_ascii_case("sha1") {
            Ok(DigestAlgorithm::Sha1)
        } else if name.eq_ignore_ascii_case("sha256") {
            Ok(DigestAlgorithm::Sha256)
        } else if name.eq_ignore_ascii_case("sha384") {
            Ok(DigestAlgorithm::Sha384)
        } else if name.eq_ignore_ascii_case("sha512") {
            Ok(DigestAlgorithm::Sha512)
        } else {
            Err(ClientError::Parse(format!(
                "unknown authentication algorithm: {}",
                name
            )))
        }
    }

    /// Compute the login digest over the password followed by the raw
    /// challenge bytes, hex-encoded.
    pub fn respond(self, password: &str, challenge: &[u8]) -> String {
        match self {
            DigestAlgorithm::Sha1 => {
                let mut h = Sha1::new();
                h.update(password.as_bytes());
                h.update(challenge);
                to_hex(&h.finalize())
            }
            DigestAlgorithm::Sha256 => {
                let mut h = Sha256::new();
                h.update(password.as_bytes());
                h.update(challenge);
                to_hex(&h.finalize())
            }
            DigestAlgorithm::Sha384 => {
                let mut h = Sha384::new();
                h.update(password.as_bytes());
                h.update(challenge);
                to_hex(&h.finalize())
            }
            DigestAlgorithm::Sha512 => {
                let mut h = Sha512::new();
                h.update(password.as_bytes());
                h.update(challenge);
                to_hex(&h.finalize())
            }
        }
    }
}
