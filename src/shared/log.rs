// This is free and unencumbered software released into the public domain.

//! Library diagnostics, routed to `tracing` when the feature is enabled.

use core::fmt::Display;

const TARGET: &str = "asimov_camera_loader";

#[inline]
pub(crate) fn debug(msg: impl Display) {
    #[cfg(feature = "tracing")]
    asimov_module::tracing::debug!(target: TARGET, "{msg}");

    #[cfg(not(feature = "tracing"))]
    let _ = (TARGET, msg);
}

#[inline]
pub(crate) fn info(msg: impl Display) {
    #[cfg(feature = "tracing")]
    asimov_module::tracing::info!(target: TARGET, "{msg}");

    #[cfg(not(feature = "tracing"))]
    let _ = (TARGET, msg);
}

#[inline]
pub(crate) fn warn(msg: impl Display, error: Option<&dyn std::error::Error>) {
    #[cfg(feature = "tracing")]
    match error {
        Some(error) => asimov_module::tracing::warn!(target: TARGET, error = %error, "{msg}"),
        None => asimov_module::tracing::warn!(target: TARGET, "{msg}"),
    }

    #[cfg(not(feature = "tracing"))]
    let _ = (TARGET, msg, error);
}
