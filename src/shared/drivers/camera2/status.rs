// This is free and unencumbered software released into the public domain.

use crate::shared::CameraError;
use derive_more::Display;
use ndk_sys::{camera_status_t, media_status_t};

pub type CameraResult<T = ()> = core::result::Result<T, CameraStatus>;
pub type MediaResult<T = ()> = core::result::Result<T, MediaStatus>;

/// A failed `ACamera*` call.
#[derive(Clone, Copy, Debug, Display)]
#[display("camera status {}", _0.0)]
pub struct CameraStatus(pub(crate) camera_status_t);

impl core::error::Error for CameraStatus {}

impl CameraStatus {
    #[inline]
    pub(crate) fn check(status: camera_status_t) -> CameraResult {
        if status == camera_status_t::ACAMERA_OK {
            Ok(())
        } else {
            Err(Self(status))
        }
    }
}

/// A failed `AImage*`/`AImageReader*` call.
#[derive(Clone, Copy, Debug, Display)]
#[display("media status {}", _0.0)]
pub struct MediaStatus(pub(crate) media_status_t);

impl core::error::Error for MediaStatus {}

impl MediaStatus {
    #[inline]
    pub(crate) fn check(status: media_status_t) -> MediaResult {
        if status == media_status_t::AMEDIA_OK {
            Ok(())
        } else {
            Err(Self(status))
        }
    }
}

pub(crate) trait StatusContext<T> {
    fn context(self, context: &'static str) -> Result<T, CameraError>;
}

impl<T> StatusContext<T> for CameraResult<T> {
    fn context(self, context: &'static str) -> Result<T, CameraError> {
        self.map_err(|status| CameraError::driver(context, status))
    }
}

impl<T> StatusContext<T> for MediaResult<T> {
    fn context(self, context: &'static str) -> Result<T, CameraError> {
        self.map_err(|status| CameraError::driver(context, status))
    }
}
