use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{Result, VerificationError};
use crate::{Algorithm, VerifiedReader};

const BUFFER_SIZE: usize = 64 * 1024;

/// Hash everything `reader` yields and return the lowercase hex digest.
pub fn digest_reader(reader: impl Read, algorithm: Algorithm) -> Result<String> {
    advise(algorithm);
    let mut verified = VerifiedReader::new(reader, algorithm.hasher()?);
    let mut buffer = vec![0u8; BUFFER_SIZE];

    while verified.read(&mut buffer)? != 0 {}

    Ok(verified.finalize())
}

pub fn digest_bytes(data: &[u8], algorithm: Algorithm) -> Result<String> {
    digest_reader(data, algorithm)
}

/// Stream the file at `path` through `algorithm`.
pub fn digest_file(path: impl AsRef<Path>, algorithm: Algorithm) -> Result<String> {
    let file = File::open(path.as_ref())?;
    digest_reader(BufReader::new(file), algorithm)
}

/// Compare the digest of `path` with a hex digest published elsewhere.
///
/// Case and surrounding whitespace of `expected` are ignored.
pub fn verify_file(
    path: impl AsRef<Path>,
    algorithm: Algorithm,
    expected: &str,
) -> Result<String> {
    let expected = expected.trim().to_ascii_lowercase();
    if expected.len() != algorithm.digest_length() * 2
        || !expected.chars().all(|c| c.is_ascii_hexdigit())
    {
        return Err(VerificationError::InvalidDigest(expected));
    }

    let actual = digest_file(path, algorithm)?;
    if actual != expected {
        return Err(VerificationError::Mismatch { expected, actual });
    }
    Ok(actual)
}

fn advise(algorithm: Algorithm) {
    if algorithm.is_insecure() {
        tracing::warn!(
            target: "anonpy::security",
            "{} is an insecure hashing algorithm",
            algorithm.as_str().to_uppercase()
        );
    }
}
