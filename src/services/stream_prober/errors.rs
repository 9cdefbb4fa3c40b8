use std::time::Duration;
use thiserror::Error;

use crate::codec::{AvcError, FlvError, SpsError};

/// Live stream probe failures
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Only http and https sources can be pulled
    #[error("Unsupported protocol '{scheme}', expected http or https")]
    UnsupportedProtocol { scheme: String },

    #[error("Invalid stream URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// Connect or HTTP failure, or the stream ended before a sequence header
    #[error("Connection to {url} failed: {message}")]
    Connection { url: String, message: String },

    #[error("No sequence header received within {after:?}")]
    Timeout { after: Duration },

    #[error("AVC sequence header too short: {len} bytes")]
    ShortSequenceHeader { len: usize },

    #[error("Malformed decoder configuration record: {0}")]
    ConfigurationRecord(#[from] AvcError),

    #[error("Decoder configuration record carries no SPS")]
    EmptySps,

    #[error("SPS parse error: {0}")]
    Sps(#[from] SpsError),

    #[error("Malformed FLV stream: {0}")]
    Container(#[from] FlvError),

    #[error("Probe task panicked: {message}")]
    Panicked { message: String },
}

impl ProbeError {
    /// Failures caused by the request itself rather than the remote stream
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedProtocol { .. } | Self::InvalidUrl { .. }
        )
    }
}
