// This is free and unencumbered software released into the public domain.

//! Camera lifecycle: device selection, session setup and release.

use crate::shared::{
    CameraBackend, CameraCharacteristics, CameraConfig, CameraDriver, CameraError, CameraEvent,
    FrameHandoff, LensFacing, Size, camera_orientation, choose_optimal_size, log,
};
use core::fmt;
use std::sync::mpsc::{Receiver, SyncSender, TryRecvError, sync_channel};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Opening,
    Open,
    Capturing,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionState::Closed => "closed",
            SessionState::Opening => "opening",
            SessionState::Open => "open",
            SessionState::Capturing => "capturing",
        })
    }
}

/// Asynchronous notifications about an open device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceEvent {
    Disconnected,
    Error(i32),
}

/// The platform camera service the loader drives.
///
/// Dropping a `Device` or `Session` releases it.
pub trait CameraPlatform {
    type Device;
    type Session;

    fn camera_ids(&self) -> Result<Vec<String>, CameraError>;

    fn characteristics(&self, id: &str) -> Result<CameraCharacteristics, CameraError>;

    /// Opens a device; disconnects and errors are reported on `events`.
    fn open_device(
        &mut self,
        id: &str,
        events: SyncSender<DeviceEvent>,
    ) -> Result<Self::Device, CameraError>;

    /// Creates a YUV 4:2:0 reader of `max_images` images of `size`, a capture
    /// session targeting it and a repeating preview request. Every acquired
    /// image goes through `handoff` and is released afterwards.
    fn start_capture(
        &mut self,
        device: &mut Self::Device,
        size: Size,
        max_images: usize,
        handoff: FrameHandoff,
    ) -> Result<Self::Session, CameraError>;
}

struct ActiveCamera<P: CameraPlatform> {
    id: String,
    size: Size,
    // Declared first: the session goes away before its device.
    session: Option<P::Session>,
    device: P::Device,
}

pub struct CameraLoader<P: CameraPlatform> {
    platform: P,
    config: CameraConfig,
    facing: LensFacing,
    state: SessionState,
    handoff: FrameHandoff,
    active: Option<ActiveCamera<P>>,
    device_events_tx: SyncSender<DeviceEvent>,
    device_events_rx: Receiver<DeviceEvent>,
}

impl<P: CameraPlatform> CameraLoader<P> {
    pub fn new(platform: P, config: CameraConfig, handoff: FrameHandoff) -> Self {
        let (device_events_tx, device_events_rx) = sync_channel(8);
        Self {
            platform,
            facing: config.facing,
            config,
            state: SessionState::Closed,
            handoff,
            active: None,
            device_events_tx,
            device_events_rx,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn facing(&self) -> LensFacing {
        self.facing
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn camera_id(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.id.as_str())
    }

    pub fn preview_size(&self) -> Option<Size> {
        self.active.as_ref().map(|a| a.size)
    }

    /// Opens the camera for the current facing and starts the preview.
    ///
    /// Having no camera with that facing is not an error: the loader stays
    /// closed.
    pub fn resume(&mut self) -> Result<(), CameraError> {
        if self.state != SessionState::Closed {
            return Ok(());
        }

        let Some(id) = self.select_camera()? else {
            log::info(format_args!("no {} camera available", self.facing));
            return Ok(());
        };

        self.set_state(SessionState::Opening);
        let device = match self.platform.open_device(&id, self.device_events_tx.clone()) {
            Ok(device) => device,
            Err(err) => {
                log::warn(format_args!("opening camera (ID: {id}) failed"), Some(&err));
                self.set_state(SessionState::Closed);
                return Err(err);
            },
        };

        self.active = Some(ActiveCamera {
            id,
            size: Size::ZERO,
            session: None,
            device,
        });
        self.set_state(SessionState::Open);

        self.start_capture_session()
    }

    /// Releases the reader, session and device. Idempotent.
    pub fn pause(&mut self) {
        self.release();
    }

    /// Flips between the back and front cameras and restarts the preview.
    ///
    /// Other facings are left as they are.
    pub fn switch_camera(&mut self) -> Result<(), CameraError> {
        let Some(next) = self.facing.switched() else {
            return Ok(());
        };
        self.facing = next;
        self.release();
        self.resume()
    }

    pub fn has_multiple_cameras(&self) -> Result<bool, CameraError> {
        Ok(self.platform.camera_ids()?.len() > 1)
    }

    /// Rotation of the current camera's output relative to the display, in
    /// `[0, 360)`; 0 when the camera or its sensor orientation is unknown.
    pub fn camera_orientation(&self) -> u32 {
        let Ok(Some(id)) = self.camera_id_for(self.facing) else {
            return 0;
        };
        let Ok(characteristics) = self.platform.characteristics(&id) else {
            return 0;
        };
        match characteristics.sensor_orientation {
            Some(sensor) => camera_orientation(self.facing, sensor, self.config.rotation),
            None => 0,
        }
    }

    /// First camera reporting `facing`.
    pub fn camera_id_for(&self, facing: LensFacing) -> Result<Option<String>, CameraError> {
        for id in self.platform.camera_ids()? {
            if self.platform.characteristics(&id)?.facing == Some(facing) {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }

    /// Preview size shared by the back and front cameras.
    pub fn negotiate_size(&self) -> Result<Size, CameraError> {
        let sizes_for = |facing| -> Result<Option<Vec<Size>>, CameraError> {
            match self.camera_id_for(facing)? {
                Some(id) => Ok(Some(self.platform.characteristics(&id)?.yuv_output_sizes)),
                None => Ok(None),
            }
        };
        let back = sizes_for(LensFacing::Back)?;
        let front = sizes_for(LensFacing::Front)?;
        Ok(choose_optimal_size(back.as_deref(), front.as_deref()))
    }

    /// Handles pending device notifications; a disconnected or failed device
    /// is closed.
    pub fn poll_device_events(&mut self) {
        loop {
            match self.device_events_rx.try_recv() {
                Ok(event) => self.on_device_event(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    fn on_device_event(&mut self, event: DeviceEvent) {
        if self.active.is_none() {
            return;
        }
        let message = match event {
            DeviceEvent::Disconnected => "camera disconnected".to_string(),
            DeviceEvent::Error(code) => format!("camera device error {code}"),
        };
        self.warn(message, None);
        self.release();
    }

    fn warn(&self, message: String, error: Option<&CameraError>) {
        log::warn(&message, error.map(|e| e as &dyn std::error::Error));
        let message = match error {
            Some(err) => format!("{message}: {err}"),
            None => message,
        };
        self.handoff.notify(CameraEvent::Warning {
            backend: self.handoff.backend(),
            message,
        });
    }

    fn select_camera(&self) -> Result<Option<String>, CameraError> {
        match self.config.device.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => Ok(Some(id.to_string())),
            _ => self.camera_id_for(self.facing),
        }
    }

    fn start_capture_session(&mut self) -> Result<(), CameraError> {
        let size = match self.config.requested_size() {
            Some(size) => size,
            None => match self.negotiate_size() {
                Ok(size) => size,
                Err(err) => {
                    log::warn("preview size negotiation failed", Some(&err));
                    self.release();
                    return Err(err);
                },
            },
        };
        let max_images = self.config.buffer_frames.max(1);

        let Some(active) = self.active.as_mut() else {
            return Ok(());
        };
        active.size = size;

        if size.is_zero() {
            self.warn("no YUV preview size shared by the cameras".into(), None);
            return Ok(());
        }

        match self
            .platform
            .start_capture(&mut active.device, size, max_images, self.handoff.clone())
        {
            Ok(session) => {
                active.session = Some(session);
                log::debug(format_args!("capturing {size} from camera {}", active.id));
                self.set_state(SessionState::Capturing);
            },
            Err(err) => self.warn("failed to configure capture session".into(), Some(&err)),
        }
        Ok(())
    }

    fn release(&mut self) {
        if let Some(mut active) = self.active.take() {
            drop(active.session.take());
            drop(active);
        }
        if self.state != SessionState::Closed {
            self.set_state(SessionState::Closed);
        }
    }

    fn set_state(&mut self, state: SessionState) {
        log::debug(format_args!("camera {} -> {}", self.state, state));
        self.state = state;
        self.handoff.notify(CameraEvent::StateChanged {
            backend: self.handoff.backend(),
            state,
        });
    }
}

impl<P> CameraDriver for CameraLoader<P>
where
    P: CameraPlatform + Send,
    P::Device: Send,
    P::Session: Send,
{
    fn backend(&self) -> CameraBackend {
        self.handoff.backend()
    }

    fn start(&mut self) -> Result<(), CameraError> {
        self.poll_device_events();
        self.resume()
    }

    fn stop(&mut self) -> Result<(), CameraError> {
        self.pause();
        Ok(())
    }

    fn poll(&mut self) -> Result<(), CameraError> {
        self.poll_device_events();
        Ok(())
    }

    fn switch_camera(&mut self) -> Result<(), CameraError> {
        CameraLoader::switch_camera(self)
    }

    fn orientation(&self) -> u32 {
        self.camera_orientation()
    }
}

impl<P: CameraPlatform> Drop for CameraLoader<P> {
    fn drop(&mut self) {
        self.release();
    }
}
