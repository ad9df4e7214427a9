/// Largest chunk read from disk or the network in one step.
pub const MAX_CHUNK_SIZE: u64 = 1024 * 1024;

/// Chunk size for streaming a transfer of `total` bytes.
///
/// `min(1 MiB, total / 2)`, so that any file of two bytes or more is moved in
/// at least two chunks, but never less than one byte.
///
/// # Examples
///
/// ```
/// use anonpy_fetch::core::chunk_size;
///
/// assert_eq!(chunk_size(10), 5);
/// assert_eq!(chunk_size(1), 1);
/// assert_eq!(chunk_size(64 * 1024 * 1024), 1024 * 1024);
/// ```
pub fn chunk_size(total: u64) -> usize { (total / 2).clamp(1, MAX_CHUNK_SIZE) as usize }

/// Number of chunks needed to move `total` bytes.
pub fn chunk_count(total: u64) -> u64 { total.div_ceil(chunk_size(total) as u64) }
