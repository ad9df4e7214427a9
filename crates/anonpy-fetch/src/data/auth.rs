use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// HTTP authorization schemes a session can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Authorization {
    Basic,
    Digest,
}

impl Authorization {
    pub fn as_str(&self) -> &'static str {
        match self {
            Authorization::Basic => "Basic",
            Authorization::Digest => "Digest",
        }
    }
}

impl fmt::Display for Authorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Authorization {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Authorization::Basic),
            "digest" => Ok(Authorization::Digest),
            other => Err(Error::Configuration(format!("unknown authorization scheme {other:?}"))),
        }
    }
}
