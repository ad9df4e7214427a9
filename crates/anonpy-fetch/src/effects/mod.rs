//! Network and filesystem side effects.
//!
//! Everything that blocks lives here: the [`HttpClient`] seam, the retrying
//! [`Session`], verb-level [`Transport`] and the [`ResourceClient`] built on
//! top of them.

mod client;
mod credentials;
mod http;
mod progress;
mod session;
mod transport;

pub use client::ResourceClient;
pub use credentials::basic_credentials;
#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
pub use http::{ChunkedReader, FilePart, HttpClient, HttpRequest, HttpResponse, Method, Payload};
pub use progress::{NoProgress, ProgressReporter, ProgressTracker};
pub use session::{Session, Sleeper};
pub use transport::{RequestOptions, Transport};
