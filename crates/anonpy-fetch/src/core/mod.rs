//! Pure transformations used by the request layer.
//!
//! Nothing in here performs I/O; the functions are exposed so that callers
//! can reproduce URLs, chunking and backoff decisions exactly.

mod chunk;
mod retry;
mod url;
mod user_agent;

pub use chunk::{MAX_CHUNK_SIZE, chunk_count, chunk_size};
pub use retry::{BACKOFF_MAX, honours_retry_after, parse_retry_after, retry_delay};
pub use url::{
    content_disposition_filename, join_url, resource_from_url, sanitize_file_name, url_scheme,
    validate_base_url,
};
pub use user_agent::build_user_agent;
