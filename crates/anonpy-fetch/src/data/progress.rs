/// State of one upload or download while it is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferProgress {
    /// Bytes handed to the transport (upload) or written to disk (download).
    pub bytes_transferred: u64,

    /// Declared size of the transfer, if known.
    pub total_bytes: Option<u64>,

    /// Display name, usually the file name.
    pub label: String,
}

impl TransferProgress {
    pub fn new(label: impl Into<String>, total_bytes: Option<u64>) -> Self {
        Self {
            bytes_transferred: 0,
            total_bytes,
            label: label.into(),
        }
    }

    /// Percentage of completion, `None` while the total is unknown.
    #[must_use]
    pub fn percentage(&self) -> Option<f64> {
        self.total_bytes.map(|total| {
            if total == 0 {
                100.0
            } else {
                (self.bytes_transferred as f64 / total as f64) * 100.0
            }
        })
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total_bytes
            .is_some_and(|total| self.bytes_transferred >= total)
    }
}
