// This is free and unencumbered software released into the public domain.

//! Android capture through the NDK Camera2 API.

mod camera_device;
pub use camera_device::*;

mod camera_manager;
pub use camera_manager::*;

mod capture_request;
pub use capture_request::*;

mod capture_session;
pub use capture_session::*;

mod image;
pub use image::*;

mod image_reader;
pub use image_reader::*;

mod metadata;
pub use metadata::*;

mod native_window;
pub use native_window::*;

mod outputs;
pub use outputs::*;

mod status;
pub use status::*;

use crate::shared::{
    CameraBackend, CameraCharacteristics, CameraConfig, CameraDriver, CameraError,
    CameraLoader, CameraPlatform, DeviceEvent, FrameHandoff, Size, log,
};
use alloc::borrow::Cow;
use ndk_sys::android_get_device_api_level;
use std::sync::mpsc::SyncSender;

#[link(name = "camera2ndk")]
unsafe extern "C" {}

#[link(name = "mediandk")]
unsafe extern "C" {}

/// The reader, session and repeating request of one preview.
///
/// Fields drop in order: the session closes before its outputs and reader.
#[derive(Debug)]
pub struct Camera2Session {
    session: CameraCaptureSession,
    _request: CaptureRequest,
    _target: CameraOutputTarget,
    _container: CaptureSessionOutputContainer,
    _output: CaptureSessionOutput,
    _reader: ImageReader,
}

unsafe impl Send for Camera2Session {}

impl Drop for Camera2Session {
    fn drop(&mut self) {
        let _ = self.session.stop_repeating();
    }
}

#[derive(Debug)]
pub struct Camera2Platform {
    manager: CameraManager,
}

impl Camera2Platform {
    pub fn new() -> Self {
        Self {
            manager: CameraManager::new(),
        }
    }
}

impl CameraPlatform for Camera2Platform {
    type Device = CameraDevice;
    type Session = Camera2Session;

    fn camera_ids(&self) -> Result<Vec<String>, CameraError> {
        self.manager.camera_ids().context("listing cameras")
    }

    fn characteristics(&self, id: &str) -> Result<CameraCharacteristics, CameraError> {
        self.manager
            .characteristics(id)
            .context("reading camera characteristics")
    }

    fn open_device(
        &mut self,
        id: &str,
        events: SyncSender<DeviceEvent>,
    ) -> Result<CameraDevice, CameraError> {
        self.manager.open_camera(id, events).context("opening camera")
    }

    fn start_capture(
        &mut self,
        device: &mut CameraDevice,
        size: Size,
        max_images: usize,
        handoff: FrameHandoff,
    ) -> Result<Camera2Session, CameraError> {
        let mut reader = ImageReader::new(size, FORMAT_YUV_420_888, max_images)
            .context("creating image reader")?;
        reader
            .set_frame_handoff(handoff)
            .context("installing image listener")?;
        let window = reader.window().context("getting reader surface")?;

        let output = CaptureSessionOutput::new(&window).context("creating session output")?;
        let mut container =
            CaptureSessionOutputContainer::new().context("creating output container")?;
        container.add(&output).context("adding session output")?;

        let target = CameraOutputTarget::new(&window).context("creating output target")?;
        let mut request = CaptureRequest::preview(device).context("creating preview request")?;
        request.add_target(&target).context("adding request target")?;

        let mut session =
            CameraCaptureSession::open(device, &container).context("creating capture session")?;
        session
            .set_repeating_request(&request)
            .context("starting repeating request")?;

        Ok(Camera2Session {
            session,
            _request: request,
            _target: target,
            _container: container,
            _output: output,
            _reader: reader,
        })
    }
}

pub struct Camera2CameraDriver {
    pub api_level: u32,
    loader: CameraLoader<Camera2Platform>,
}

impl core::fmt::Debug for Camera2CameraDriver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Camera2CameraDriver")
            .field("api_level", &self.api_level)
            .field("state", &self.loader.state())
            .field("facing", &self.loader.facing())
            .finish()
    }
}

impl Camera2CameraDriver {
    pub fn open(
        input_url: impl AsRef<str>,
        mut config: CameraConfig,
        handoff: FrameHandoff,
    ) -> Result<Self, CameraError> {
        let api_level = unsafe { android_get_device_api_level() }.max(0) as u32;
        log::debug(format_args!("android_get_device_api_level={api_level}"));

        let input_url = input_url.as_ref().trim();
        if config.device.is_none() && !input_url.is_empty() {
            config.device = Some(input_url.to_string());
        }

        let loader = CameraLoader::new(Camera2Platform::new(), config, handoff);
        if loader.platform().camera_ids()?.is_empty() {
            return Err(CameraError::NoCamera);
        }

        Ok(Self { api_level, loader })
    }

    pub fn loader(&self) -> &CameraLoader<Camera2Platform> {
        &self.loader
    }

    pub fn loader_mut(&mut self) -> &mut CameraLoader<Camera2Platform> {
        &mut self.loader
    }
}

impl dogma::Named for Camera2CameraDriver {
    fn name(&self) -> Cow<'_, str> {
        "camera2".into()
    }
}

impl CameraDriver for Camera2CameraDriver {
    fn backend(&self) -> CameraBackend {
        CameraBackend::Android
    }

    fn start(&mut self) -> Result<(), CameraError> {
        self.loader.start()
    }

    fn stop(&mut self) -> Result<(), CameraError> {
        CameraDriver::stop(&mut self.loader)
    }

    fn poll(&mut self) -> Result<(), CameraError> {
        self.loader.poll()
    }

    fn switch_camera(&mut self) -> Result<(), CameraError> {
        self.loader.switch_camera()
    }

    fn orientation(&self) -> u32 {
        self.loader.camera_orientation()
    }
}
