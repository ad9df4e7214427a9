//! Checksum primitives for files moved through an anonymous file host.
//!
//! Digests are computed incrementally so that a file never has to be held in
//! memory, and compared as lowercase hex strings because that is the form in
//! which providers publish them.
//!
//! # Example
//!
//! ```
//! use anonpy_verify::{Algorithm, digest_bytes};
//!
//! let hex = digest_bytes(b"hello world", Algorithm::Sha256).unwrap();
//! assert_eq!(
//!     hex,
//!     "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
//! );
//! ```

pub use self::algorithm::Algorithm;
pub use self::error::{Result, VerificationError};
pub use self::file::{digest_bytes, digest_file, digest_reader, verify_file};
pub use self::hasher::{BoxedHasher, DigestHasher, Hasher};
pub use self::reader::VerifiedReader;

#[cfg(feature = "sha256")]
pub use self::hasher::{Sha256Hasher, Sha512Hasher};

#[cfg(feature = "sha3")]
pub use self::hasher::Sha3_256Hasher;

#[cfg(feature = "blake3")]
pub use self::hasher::Blake3Hasher;

#[cfg(feature = "legacy")]
pub use self::hasher::{Md5Hasher, Sha1Hasher};

mod algorithm;
mod error;
mod file;
mod hasher;
mod reader;
