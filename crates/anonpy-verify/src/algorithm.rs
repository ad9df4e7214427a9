use std::fmt;
use std::str::FromStr;

use crate::error::{Result, VerificationError};
use crate::hasher::BoxedHasher;

/// Hash algorithms understood by [`crate::digest_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    Md5,
    Sha1,
    #[default]
    Sha256,
    Sha512,
    Sha3_256,
    Blake3,
}

impl Algorithm {
    pub const ALL: [Algorithm; 6] = [
        Algorithm::Md5,
        Algorithm::Sha1,
        Algorithm::Sha256,
        Algorithm::Sha512,
        Algorithm::Sha3_256,
        Algorithm::Blake3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Md5 => "md5",
            Algorithm::Sha1 => "sha1",
            Algorithm::Sha256 => "sha256",
            Algorithm::Sha512 => "sha512",
            Algorithm::Sha3_256 => "sha3-256",
            Algorithm::Blake3 => "blake3",
        }
    }

    /// Digest length in bytes.
    pub fn digest_length(&self) -> usize {
        match self {
            Algorithm::Md5 => 16,
            Algorithm::Sha1 => 20,
            Algorithm::Sha256 | Algorithm::Sha3_256 | Algorithm::Blake3 => 32,
            Algorithm::Sha512 => 64,
        }
    }

    /// MD5 and SHA-1 have practical collision attacks.
    pub fn is_insecure(&self) -> bool { matches!(self, Algorithm::Md5 | Algorithm::Sha1) }

    /// Create a fresh hasher for this algorithm.
    pub fn hasher(&self) -> Result<BoxedHasher> {
        match self {
            #[cfg(feature = "legacy")]
            Algorithm::Md5 => Ok(Box::new(crate::hasher::Md5Hasher::new())),
            #[cfg(feature = "legacy")]
            Algorithm::Sha1 => Ok(Box::new(crate::hasher::Sha1Hasher::new())),
            #[cfg(feature = "sha256")]
            Algorithm::Sha256 => Ok(Box::new(crate::hasher::Sha256Hasher::new())),
            #[cfg(feature = "sha256")]
            Algorithm::Sha512 => Ok(Box::new(crate::hasher::Sha512Hasher::new())),
            #[cfg(feature = "sha3")]
            Algorithm::Sha3_256 => Ok(Box::new(crate::hasher::Sha3_256Hasher::new())),
            #[cfg(feature = "blake3")]
            Algorithm::Blake3 => Ok(Box::new(crate::hasher::Blake3Hasher::new())),
            #[allow(unreachable_patterns)]
            other => Err(VerificationError::Unsupported(*other)),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Algorithm {
    type Err = VerificationError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], "");
        match normalized.as_str() {
            "md5" => Ok(Algorithm::Md5),
            "sha1" => Ok(Algorithm::Sha1),
            "sha256" => Ok(Algorithm::Sha256),
            "sha512" => Ok(Algorithm::Sha512),
            "sha3256" | "sha3" => Ok(Algorithm::Sha3_256),
            "blake3" => Ok(Algorithm::Blake3),
            _ => Err(VerificationError::UnknownAlgorithm(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_spellings() {
        assert_eq!("SHA-256".parse::<Algorithm>().unwrap(), Algorithm::Sha256);
        assert_eq!("sha3_256".parse::<Algorithm>().unwrap(), Algorithm::Sha3_256);
        assert_eq!("md5".parse::<Algorithm>().unwrap(), Algorithm::Md5);
        assert!("crc32".parse::<Algorithm>().is_err());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm.to_string().parse::<Algorithm>().unwrap(), algorithm);
        }
    }

    #[test]
    fn only_md5_and_sha1_are_insecure() {
        let insecure: Vec<_> = Algorithm::ALL.iter().filter(|a| a.is_insecure()).collect();
        assert_eq!(insecure, [&Algorithm::Md5, &Algorithm::Sha1]);
    }

    #[cfg(all(feature = "sha256", feature = "sha3", feature = "blake3", feature = "legacy"))]
    #[test]
    fn hasher_output_matches_digest_length() {
        for algorithm in Algorithm::ALL {
            let mut hasher = algorithm.hasher().unwrap();
            crate::Hasher::update(&mut hasher, b"anonpy");
            assert_eq!(
                crate::Hasher::finalize(hasher).len(),
                algorithm.digest_length(),
                "{algorithm}"
            );
        }
    }
}
