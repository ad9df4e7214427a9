use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use crate::core::{
    MAX_CHUNK_SIZE, chunk_size, content_disposition_filename, join_url, resource_from_url,
    sanitize_file_name,
};
use crate::data::response::UploadResponse;
use crate::data::{
    Authorization, DownloadMode, DownloadRequest, DownloadResult, Endpoint, PreviewResult,
    SessionConfig, UploadResult,
};
use crate::effects::http::{FilePart, HttpClient, Payload};
use crate::effects::progress::{NoProgress, ProgressReporter, ProgressTracker};
use crate::effects::session::Session;
use crate::effects::transport::{RequestOptions, Transport};
use crate::error::{Error, Result};

#[cfg(feature = "reqwest")]
use crate::effects::http::ReqwestClient;

/// Upload, preview and download against one provider.
///
/// # Examples
///
/// ```no_run
/// use anonpy_fetch::{DownloadRequest, ResourceClient};
///
/// let client = ResourceClient::pixeldrain(None, None)?;
/// let uploaded = client.upload("notes.txt", false)?;
/// let preview = client.preview(&uploaded.resource)?;
/// let request =
///     DownloadRequest::with_progress(&preview.resource, ".", preview.size, &preview.name);
/// client.download(&request)?;
/// # Ok::<(), anonpy_fetch::Error>(())
/// ```
pub struct ResourceClient<C: HttpClient> {
    transport: Transport<C>,
    endpoint:  Arc<Endpoint>,
    reporter:  Arc<dyn ProgressReporter>,
    logging:   bool,
}

#[cfg(feature = "reqwest")]
impl ResourceClient<ReqwestClient> {
    pub fn new(config: SessionConfig, endpoint: impl Into<Arc<Endpoint>>) -> Result<Self> {
        let client = ReqwestClient::new(&config)?;
        Self::with_client(config, endpoint, client)
    }

    /// Client for pixeldrain.com. A token is sent both as `Basic`
    /// credentials and as the `token` upload parameter.
    pub fn pixeldrain(user_agent: Option<String>, token: Option<String>) -> Result<Self> {
        let mut config = SessionConfig::new("https://pixeldrain.com/api/")?;
        if let Some(user_agent) = user_agent {
            config = config.user_agent(user_agent);
        }
        if let Some(token) = token {
            config = config.token(token).credential_header(Authorization::Basic);
        }
        Self::new(config, Endpoint::pixeldrain())
    }
}

impl<C: HttpClient> ResourceClient<C> {
    pub fn with_client(
        config: SessionConfig,
        endpoint: impl Into<Arc<Endpoint>>,
        client: C,
    ) -> Result<Self> {
        let credentials = config.credential_header.zip(config.token.clone());
        let mut session = Session::new(config, client);
        if let Some((scheme, token)) = credentials {
            session.apply_credentials(scheme, &token)?;
        }

        Ok(Self {
            transport: Transport::new(session),
            endpoint:  endpoint.into(),
            reporter:  Arc::new(NoProgress),
            logging:   false,
        })
    }

    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Emit an `info` record for every finished transfer.
    #[must_use]
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.logging = enabled;
        self
    }

    pub fn endpoint(&self) -> &Endpoint { &self.endpoint }

    pub fn transport(&self) -> &Transport<C> { &self.transport }

    pub fn session(&self) -> &Session<C> { self.transport.session() }

    pub fn session_mut(&mut self) -> &mut Session<C> { self.transport.session_mut() }

    /// Switch to `scheme` using the configured token.
    pub fn set_credentials(&mut self, scheme: Authorization) -> Result<()> {
        let token = self
            .session()
            .config()
            .token
            .clone()
            .ok_or_else(|| Error::Configuration("credentials require a token".to_string()))?;
        self.session_mut().apply_credentials(scheme, &token)
    }

    /// Absolute download URL of `resource`.
    pub fn download_url(&self, resource: &str) -> String {
        join_url(self.transport.base_url(), &self.endpoint.download(resource))
    }

    /// Upload the file at `path`.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if the file cannot be read
    /// - [`Error::HttpStatus`] for a non-success status after retries
    /// - [`Error::Rejected`] if the provider answers `success: false`
    /// - [`Error::Truncated`] if fewer bytes than the file size were sent
    pub fn upload(&self, path: impl AsRef<Path>, enable_progress: bool) -> Result<UploadResult> {
        let path = path.as_ref();
        let metadata = fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            )));
        }

        let length = metadata.len();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::Io(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} has no file name", path.display()),
                ))
            })?;

        let tracker = ProgressTracker::new(self.reporter_for(enable_progress), &name, Some(length));
        let part = FilePart::new("file", &name, path, length, chunk_size(length))
            .with_tracker(tracker.clone());

        let mut options = RequestOptions::default()
            .payload(Payload::Multipart(part))
            .streaming(true);
        if let Some(token) = &self.session().config().token {
            options = options.query("token", token);
        }

        let response = self.transport.post(self.endpoint.upload(), options)?;
        let sent = tracker.bytes();
        if sent != length {
            return Err(Error::Truncated {
                expected: length,
                actual:   sent,
            });
        }
        tracker.finish();

        let body = response.json::<UploadResponse>()?.into_checked()?;
        let resource = body
            .id
            .clone()
            .or_else(|| body.url.as_deref().and_then(resource_from_url))
            .unwrap_or_default();
        let url = match body.url {
            Some(url) => url,
            None => self.download_url(&resource),
        };

        if self.logging {
            tracing::info!("Uploaded {} to {}", path.display(), url);
        }

        Ok(UploadResult {
            resource,
            name,
            size: length,
            url,
        })
    }

    /// Fetch the metadata of `resource` without downloading it.
    pub fn preview(&self, resource: &str) -> Result<PreviewResult> {
        let response = self
            .transport
            .get(&self.endpoint.preview(resource), RequestOptions::default())?;
        let value: Value = response.json()?;
        let preview = PreviewResult::from_json(value, resource, self.download_url(resource))?;

        tracing::debug!(
            resource = %preview.resource,
            name = %preview.name,
            size = preview.size,
            fields = preview.field_count(),
            "fetched preview"
        );
        Ok(preview)
    }

    /// Download `request.resource` into `request.directory`.
    ///
    /// The body is staged in a temporary file next to the destination and
    /// renamed into place only after the byte count checked out.
    pub fn download(&self, request: &DownloadRequest) -> Result<DownloadResult> {
        let (expected_size, expected_name) = match &request.mode {
            DownloadMode::WithProgress { size, name } => (Some(*size), Some(name.as_str())),
            DownloadMode::Simple => (None, None),
        };

        let url = self.download_url(&request.resource);
        let response = self
            .transport
            .get(&self.endpoint.download(&request.resource), RequestOptions::default())?;

        let name = expected_name
            .and_then(sanitize_file_name)
            .or_else(|| {
                response
                    .header("content-disposition")
                    .and_then(content_disposition_filename)
            })
            .or_else(|| sanitize_file_name(&request.resource))
            .ok_or_else(|| {
                let resource = &request.resource;
                Error::Configuration(format!("cannot derive a file name for '{resource}'"))
            })?;
        let total = expected_size.or_else(|| response.content_length());

        fs::create_dir_all(&request.directory)?;
        let destination = request.directory.join(&name);
        let mut staging = tempfile::Builder::new()
            .prefix(".anonpy-")
            .suffix(".part")
            .tempfile_in(&request.directory)?;

        let reporter = self.reporter_for(request.progress_enabled());
        let tracker = ProgressTracker::new(reporter, &name, total);
        let chunk = total.map_or(MAX_CHUNK_SIZE as usize, chunk_size);
        let written = copy_chunked(response.into_body(), staging.as_file_mut(), chunk, &tracker)?;

        if let Some(expected) = total {
            if written != expected {
                return Err(Error::Truncated {
                    expected,
                    actual: written,
                });
            }
        }

        staging.as_file().sync_all()?;
        staging.persist(&destination).map_err(|e| Error::Io(e.error))?;
        tracker.finish();

        if self.logging {
            tracing::info!("Downloaded {} to {}", url, destination.display());
        }

        Ok(DownloadResult {
            resource: request.resource.clone(),
            name,
            size: written,
            url,
            path: destination,
        })
    }

    fn reporter_for(&self, enabled: bool) -> Arc<dyn ProgressReporter> {
        if enabled { self.reporter.clone() } else { Arc::new(NoProgress) }
    }
}

/// Copy `reader` into `writer` one full chunk at a time.
fn copy_chunked(
    mut reader: impl Read,
    writer: &mut impl Write,
    chunk: usize,
    tracker: &ProgressTracker,
) -> Result<u64> {
    let mut buffer = vec![0u8; chunk.max(1)];
    let mut written = 0u64;

    loop {
        let n = read_full(&mut reader, &mut buffer).map_err(Error::from_body_read)?;
        if n == 0 {
            break;
        }
        writer.write_all(&buffer[..n])?;
        written += n as u64;
        tracker.advance(n as u64);
    }

    writer.flush()?;
    Ok(written)
}

/// Fill `buffer` unless the reader ends first.
fn read_full(reader: &mut impl Read, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
            let n = out.len().min(self.0.len()).min(3);
            out[..n].copy_from_slice(&self.0[..n]);
            self.0 = &self.0[n..];
            Ok(n)
        }
    }

    #[test]
    fn copy_chunked_fills_whole_chunks() {
        let tracker = ProgressTracker::silent("x", Some(10));
        let mut out = Vec::new();
        let written = copy_chunked(Trickle(b"0123456789"), &mut out, 4, &tracker).unwrap();
        assert_eq!(written, 10);
        assert_eq!(out, b"0123456789");
        assert_eq!(tracker.bytes(), 10);
    }

    struct Broken(io::ErrorKind);

    impl Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> { Err(self.0.into()) }
    }

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> { Err(self.0.into()) }

        fn flush(&mut self) -> io::Result<()> { Ok(()) }
    }

    #[test]
    fn body_read_failures_are_network_errors() {
        let tracker = ProgressTracker::silent("x", None);

        let mut sink = Vec::<u8>::new();
        let reset = copy_chunked(Broken(io::ErrorKind::ConnectionReset), &mut sink, 4, &tracker);
        assert!(matches!(reset, Err(Error::Connection(_))));

        let stalled = copy_chunked(Broken(io::ErrorKind::TimedOut), &mut sink, 4, &tracker);
        assert!(matches!(stalled, Err(Error::Timeout(_))));
    }

    #[test]
    fn write_failures_stay_local() {
        let tracker = ProgressTracker::silent("x", None);
        let mut disk = Broken(io::ErrorKind::StorageFull);
        let result = copy_chunked(Trickle(b"abc"), &mut disk, 4, &tracker);
        assert!(matches!(result, Err(Error::Io(ref e)) if e.kind() == io::ErrorKind::StorageFull));
    }
}
