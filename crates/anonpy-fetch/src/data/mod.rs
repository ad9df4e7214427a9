//! Immutable data types for talking to an anonymous file host.
//!
//! Everything in here is validated on construction and never mutated while a
//! request is in flight.

pub mod auth;
pub mod config;
pub mod download;
pub mod endpoint;
pub mod progress;
pub mod response;
pub mod retry;
pub mod timeout;

pub use auth::Authorization;
pub use config::SessionConfig;
pub use download::{DownloadMode, DownloadRequest};
pub use endpoint::Endpoint;
pub use progress::TransferProgress;
pub use response::{DownloadResult, PreviewResult, UploadResult};
pub use retry::{DEFAULT_STATUS_FORCELIST, RetryPolicy};
pub use timeout::Timeout;
