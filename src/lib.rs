// This is free and unencumbered software released into the public domain.

//! Camera preview capture delivering NV21 frames.
//!
//! [`shared::open_camera`] selects the platform backend (Camera2 on Android,
//! an `ffmpeg` child process elsewhere); every captured YUV 4:2:0 image is
//! packed by [`shared::pack`] into one NV21 buffer and dispatched to the
//! registered frame sinks.

extern crate alloc;

pub mod cli;
pub mod shared;
