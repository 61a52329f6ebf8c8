// This is free and unencumbered software released into the public domain.

use crate::shared::{CameraError, DisplayRotation, LensFacing, PixelFormat, Size};

#[derive(Clone, Debug)]
pub struct CameraConfig {
    pub device: Option<String>,
    pub facing: LensFacing,
    pub rotation: DisplayRotation,
    /// Requested preview size; zero means negotiate with the device.
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub pixel_format: Option<PixelFormat>,
    /// Images the capture source may hold in flight.
    pub buffer_frames: usize,
    pub diagnostics: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: None,
            facing: LensFacing::Back,
            rotation: DisplayRotation::Rotation0,
            width: 640,
            height: 480,
            fps: 30.0,
            pixel_format: None,
            buffer_frames: 2,
            diagnostics: false,
        }
    }
}

impl CameraConfig {
    pub fn new(width: u32, height: u32, fps: f64) -> Self {
        Self {
            width,
            height,
            fps,
            ..Default::default()
        }
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    pub fn with_facing(mut self, facing: LensFacing) -> Self {
        self.facing = facing;
        self
    }

    pub fn with_rotation(mut self, rotation: DisplayRotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_pixel_format(mut self, fmt: PixelFormat) -> Self {
        self.pixel_format = Some(fmt);
        self
    }

    pub fn with_buffer_frames(mut self, n: usize) -> Self {
        self.buffer_frames = n.max(1);
        self
    }

    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    /// The explicitly requested size, if any.
    pub fn requested_size(&self) -> Option<Size> {
        let size = Size::new(self.width, self.height);
        (!size.is_zero()).then_some(size)
    }

    pub fn validate(&self) -> Result<(), CameraError> {
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(CameraError::invalid_config(format!(
                "frame rate must be positive, got {}",
                self.fps
            )));
        }
        if let Some(fmt) = self.pixel_format {
            if fmt != PixelFormat::Nv21 {
                return Err(CameraError::unsupported(format!(
                    "output pixel format {fmt:?}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_means_negotiate() {
        assert_eq!(CameraConfig::new(0, 0, 30.0).requested_size(), None);
        assert_eq!(
            CameraConfig::default().requested_size(),
            Some(Size::new(640, 480))
        );
    }

    #[test]
    fn buffer_frames_is_at_least_one() {
        assert_eq!(CameraConfig::default().with_buffer_frames(0).buffer_frames, 1);
    }

    #[test]
    fn validation_rejects_bad_rates_and_formats() {
        assert!(CameraConfig::new(640, 480, 0.0).validate().is_err());
        assert!(CameraConfig::new(640, 480, f64::NAN).validate().is_err());
        assert!(
            CameraConfig::default()
                .with_pixel_format(PixelFormat::Yuv420)
                .validate()
                .is_err()
        );
        assert!(
            CameraConfig::default()
                .with_pixel_format(PixelFormat::Nv21)
                .validate()
                .is_ok()
        );
    }
}
