// This is free and unencumbered software released into the public domain.

use std::error::Error as StdError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CameraError {
    #[error("no suitable camera backend available")]
    NoDriver,

    #[error("no camera device available")]
    NoCamera,

    #[error("driver is not configured")]
    NotConfigured,

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A captured frame is missing one of its Y/U/V planes.
    #[error("invalid frame: {0}")]
    InvalidFrame(&'static str),

    #[error("stream closed")]
    Closed,

    #[error("driver error while {context}")]
    DriverError {
        context: &'static str,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("{0}")]
    Other(String),
}

impl CameraError {
    #[inline]
    pub fn driver(context: &'static str, source: impl StdError + Send + Sync + 'static) -> Self {
        Self::DriverError {
            context,
            source: Box::new(source),
        }
    }

    #[inline]
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    #[inline]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    #[inline]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Whether the error only concerns the current frame, which should be
    /// skipped while capture continues.
    pub fn is_frame_drop(&self) -> bool {
        matches!(self, Self::InvalidFrame(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = CameraError::driver("reading frames", io);
        assert_eq!(err.to_string(), "driver error while reading frames");
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("pipe closed"));
    }

    #[test]
    fn only_invalid_frames_are_droppable() {
        assert!(CameraError::InvalidFrame("missing U plane").is_frame_drop());
        assert!(!CameraError::NoCamera.is_frame_drop());
        assert!(!CameraError::Closed.is_frame_drop());
    }
}
