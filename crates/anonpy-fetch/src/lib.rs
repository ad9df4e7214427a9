//! Resilient upload, preview and download client for anonymous file hosts.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - `data` - Immutable configuration and result types
//! - [`core`] - Pure transformations (URL joining, chunking, backoff)
//! - `effects` - Blocking I/O behind the [`HttpClient`] trait
//!
//! # Key Features
//!
//! - **Retrying Session**: Forcelisted statuses and transient transport
//!   failures are retried with exponential backoff
//! - **Chunked Uploads**: Files are streamed one chunk at a time and progress
//!   never moves backwards across retries
//! - **Atomic Downloads**: Bodies are staged next to the destination and
//!   renamed into place once the byte count matches
//! - **Provider Agnostic**: Endpoints are templates, pixeldrain.com is a preset
//!
//! # Example
//!
//! ```
//! use anonpy_fetch::Endpoint;
//!
//! let endpoint = Endpoint::pixeldrain();
//! assert_eq!(endpoint.upload(), "/file");
//! assert_eq!(endpoint.preview("abc123"), "/file/abc123/info");
//! ```

pub mod core;
mod data;
mod effects;
mod error;

pub use data::{
    Authorization, DEFAULT_STATUS_FORCELIST, DownloadMode, DownloadRequest, DownloadResult,
    Endpoint, PreviewResult, RetryPolicy, SessionConfig, Timeout, TransferProgress, UploadResult,
};
pub use effects::{
    ChunkedReader, FilePart, HttpClient, HttpRequest, HttpResponse, Method, NoProgress, Payload,
    ProgressReporter, ProgressTracker, RequestOptions, ResourceClient, Session, Sleeper, Transport,
    basic_credentials,
};
#[cfg(feature = "reqwest")]
pub use effects::ReqwestClient;

pub use error::{Error, Result};
