// This is free and unencumbered software released into the public domain.

use super::{
    Camera, CameraBackend, CameraConfig, CameraDriver, CameraError, Dispatcher, FrameHandoff,
};
use std::sync::mpsc::sync_channel;

const EVENT_CAPACITY: usize = 64;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "android", target_os = "android"))] {
        fn default_backend() -> Result<CameraBackend, CameraError> {
            Ok(CameraBackend::Android)
        }

        fn open_driver(
            input_url: &str,
            config: CameraConfig,
            handoff: FrameHandoff,
        ) -> Result<Box<dyn CameraDriver>, CameraError> {
            let driver = super::drivers::camera2::Camera2CameraDriver::open(input_url, config, handoff)?;
            Ok(Box::new(driver))
        }
    } else if #[cfg(feature = "ffmpeg")] {
        fn default_backend() -> Result<CameraBackend, CameraError> {
            Ok(CameraBackend::Ffmpeg)
        }

        fn open_driver(
            input_url: &str,
            config: CameraConfig,
            handoff: FrameHandoff,
        ) -> Result<Box<dyn CameraDriver>, CameraError> {
            let driver = super::drivers::ffmpeg::FfmpegCameraDriver::open(input_url, config, handoff)?;
            Ok(Box::new(driver))
        }
    } else {
        fn default_backend() -> Result<CameraBackend, CameraError> {
            Err(CameraError::NoDriver)
        }

        fn open_driver(
            _input_url: &str,
            _config: CameraConfig,
            _handoff: FrameHandoff,
        ) -> Result<Box<dyn CameraDriver>, CameraError> {
            Err(CameraError::NoDriver)
        }
    }
}

/// Opens the platform camera; frames flow to the sinks added to the
/// returned [`Camera`] once it is started.
pub fn open_camera(
    input_url: impl AsRef<str>,
    config: CameraConfig,
) -> Result<Camera, CameraError> {
    config.validate()?;
    let backend = default_backend()?;

    let (events_tx, events_rx) = sync_channel(EVENT_CAPACITY);
    let dispatcher = Dispatcher::new(config.buffer_frames, backend, events_tx.clone());
    let handoff = FrameHandoff::new(backend, dispatcher.sender(), events_tx);

    let driver = open_driver(input_url.as_ref(), config, handoff)?;
    Ok(Camera::new(driver, dispatcher, events_rx))
}
