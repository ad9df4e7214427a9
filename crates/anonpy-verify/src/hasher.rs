use digest::Digest;

/// Incremental hash computation.
pub trait Hasher: Send {
    fn update(&mut self, data: &[u8]);

    fn finalize(self) -> Vec<u8>
    where
        Self: Sized;

    /// Object-safe variant of [`Hasher::finalize`].
    fn finalize_boxed(self: Box<Self>) -> Vec<u8>;
}

/// A hasher picked at runtime, see [`crate::Algorithm::hasher`].
pub type BoxedHasher = Box<dyn Hasher>;

impl Hasher for BoxedHasher {
    fn update(&mut self, data: &[u8]) { (**self).update(data); }

    fn finalize(self) -> Vec<u8> { self.finalize_boxed() }

    fn finalize_boxed(self: Box<Self>) -> Vec<u8> { (*self).finalize_boxed() }
}

/// Adapter for every RustCrypto [`Digest`].
pub struct DigestHasher<D>(D);

impl<D: Digest> DigestHasher<D> {
    pub fn new() -> Self { Self(D::new()) }

    pub fn digest(data: &[u8]) -> Vec<u8> { D::digest(data).to_vec() }
}

impl<D: Digest> Default for DigestHasher<D> {
    fn default() -> Self { Self::new() }
}

impl<D: Digest + Send> Hasher for DigestHasher<D> {
    fn update(&mut self, data: &[u8]) { Digest::update(&mut self.0, data); }

    fn finalize(self) -> Vec<u8> { self.0.finalize().to_vec() }

    fn finalize_boxed(self: Box<Self>) -> Vec<u8> { (*self).finalize() }
}

#[cfg(feature = "sha256")]
pub type Sha256Hasher = DigestHasher<sha2::Sha256>;

#[cfg(feature = "sha256")]
pub type Sha512Hasher = DigestHasher<sha2::Sha512>;

#[cfg(feature = "sha3")]
pub type Sha3_256Hasher = DigestHasher<sha3::Sha3_256>;

#[cfg(feature = "legacy")]
pub type Md5Hasher = DigestHasher<md5::Md5>;

#[cfg(feature = "legacy")]
pub type Sha1Hasher = DigestHasher<sha1::Sha1>;

#[cfg(feature = "blake3")]
pub struct Blake3Hasher(blake3::Hasher);

#[cfg(feature = "blake3")]
impl Blake3Hasher {
    pub fn new() -> Self { Self(blake3::Hasher::new()) }

    pub fn digest(data: &[u8]) -> Vec<u8> { blake3::hash(data).as_bytes().to_vec() }
}

#[cfg(feature = "blake3")]
impl Default for Blake3Hasher {
    fn default() -> Self { Self::new() }
}

#[cfg(feature = "blake3")]
impl Hasher for Blake3Hasher {
    fn update(&mut self, data: &[u8]) { self.0.update(data); }

    fn finalize(self) -> Vec<u8> { self.0.finalize().as_bytes().to_vec() }

    fn finalize_boxed(self: Box<Self>) -> Vec<u8> { (*self).finalize() }
}
