use std::time::Duration;

use crate::error::{Error, Result};

/// Connect and read timeouts applied to every request.
///
/// There is no "wait indefinitely" value: constructing a `Timeout` from
/// nothing is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeout {
    connect: Duration,
    read:    Duration,
}

impl Default for Timeout {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(5),
            read:    Duration::from_secs(5),
        }
    }
}

impl Timeout {
    /// General constructor. A single value is applied to both phases.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] if both values are missing or any value is
    /// not a positive, finite number of seconds.
    pub fn new(connect: Option<f64>, read: Option<f64>) -> Result<Self> {
        match (connect, read) {
            (None, None) => {
                tracing::warn!(
                    "not specifying a timeout may cause your program to hang indefinitely"
                );
                Err(Error::Configuration(
                    "a connect or read timeout must be specified".to_string(),
                ))
            }
            (Some(value), None) | (None, Some(value)) => Self::uniform(value),
            (Some(connect), Some(read)) => Self::split(connect, read),
        }
    }

    /// Same timeout for connecting and reading.
    pub fn uniform(seconds: f64) -> Result<Self> { Self::split(seconds, seconds) }

    pub fn split(connect: f64, read: f64) -> Result<Self> {
        Ok(Self {
            connect: to_duration("connect", connect)?,
            read:    to_duration("read", read)?,
        })
    }

    pub fn connect(&self) -> Duration { self.connect }

    pub fn read(&self) -> Duration { self.read }

    pub fn as_secs_f64(&self) -> (f64, f64) {
        (self.connect.as_secs_f64(), self.read.as_secs_f64())
    }
}

fn to_duration(name: &str, seconds: f64) -> Result<Duration> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(Error::Configuration(format!(
            "{name} timeout must be a positive number of seconds, got {seconds}"
        )));
    }
    Duration::try_from_secs_f64(seconds)
        .map_err(|e| Error::Configuration(format!("{name} timeout {seconds}: {e}")))
}
