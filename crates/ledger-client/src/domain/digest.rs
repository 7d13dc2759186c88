//! # Digest Utility
//!
//! Fixed-length, uppercase hexadecimal labels for arbitrary names.
//! Not security-sensitive; kept for callers that need a stable label.

use crate::errors::DigestError;
use md5::Md5;
use sha2::{Digest, Sha256};
use std::str::FromStr;

/// Hash algorithms the digest utility can resolve by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashAlgorithm {
    /// 128-bit MD5, the default label algorithm.
    Md5,
    /// 256-bit SHA-2.
    Sha256,
}

impl HashAlgorithm {
    /// Digest `input` and render it as uppercase hex.
    #[must_use]
    pub fn hex_upper(self, input: &[u8]) -> String {
        match self {
            Self::Md5 => hex::encode_upper(Md5::digest(input)),
            Self::Sha256 => hex::encode_upper(Sha256::digest(input)),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = DigestError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_uppercase().as_str() {
            "MD5" => Ok(Self::Md5),
            "SHA-256" | "SHA256" => Ok(Self::Sha256),
            _ => Err(DigestError::UnsupportedAlgorithm(name.to_string())),
        }
    }
}

/// MD5 of `name` as 32 uppercase hex characters, `None` when `name` is absent.
pub fn hash_hex(name: Option<&str>) -> Result<Option<String>, DigestError> {
    hash_hex_with("MD5", name)
}

/// Like [`hash_hex`] with the algorithm resolved by name.
pub fn hash_hex_with(algorithm: &str, name: Option<&str>) -> Result<Option<String>, DigestError> {
    let algorithm = algorithm.parse::<HashAlgorithm>()?;
    Ok(name.map(|name| algorithm.hex_upper(name.as_bytes())))
}
