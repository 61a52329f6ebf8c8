// This is free and unencumbered software released into the public domain.

use core::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LensFacing {
    #[default]
    Back,
    Front,
    External,
}

impl LensFacing {
    /// The other side of the device, for facings that have one.
    pub fn switched(self) -> Option<Self> {
        match self {
            LensFacing::Back => Some(LensFacing::Front),
            LensFacing::Front => Some(LensFacing::Back),
            LensFacing::External => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LensFacing::Back => "back",
            LensFacing::Front => "front",
            LensFacing::External => "external",
        }
    }
}

impl fmt::Display for LensFacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for LensFacing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "back" | "rear" => Ok(LensFacing::Back),
            "front" | "user" => Ok(LensFacing::Front),
            "external" => Ok(LensFacing::External),
            other => Err(format!("unknown lens facing '{other}'")),
        }
    }
}

/// Rotation of the display relative to its natural orientation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DisplayRotation {
    #[default]
    Rotation0,
    Rotation90,
    Rotation180,
    Rotation270,
}

impl DisplayRotation {
    pub fn degrees(&self) -> u32 {
        match self {
            DisplayRotation::Rotation0 => 0,
            DisplayRotation::Rotation90 => 90,
            DisplayRotation::Rotation180 => 180,
            DisplayRotation::Rotation270 => 270,
        }
    }

    /// Maps a rotation in degrees; anything that is not a quarter turn is 0.
    pub fn from_degrees(degrees: u32) -> Self {
        match degrees % 360 {
            90 => DisplayRotation::Rotation90,
            180 => DisplayRotation::Rotation180,
            270 => DisplayRotation::Rotation270,
            _ => DisplayRotation::Rotation0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0,
        height: 0,
    };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_zero(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Static properties of one camera device.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CameraCharacteristics {
    pub facing: Option<LensFacing>,
    pub sensor_orientation: Option<u32>,
    /// Output sizes supported for YUV 4:2:0 capture.
    pub yuv_output_sizes: Vec<Size>,
}

/// Clockwise rotation, in `[0, 360)`, that brings sensor output upright on
/// the display.
pub fn camera_orientation(
    facing: LensFacing,
    sensor_orientation: u32,
    rotation: DisplayRotation,
) -> u32 {
    let sensor = sensor_orientation as i64;
    let display = rotation.degrees() as i64;
    let degrees = match facing {
        LensFacing::Front => sensor + display,
        LensFacing::Back | LensFacing::External => sensor - display,
    };
    degrees.rem_euclid(360) as u32
}

/// Largest back-camera size that the front camera can also produce, so that
/// switching cameras keeps the preview size.
///
/// `None` for a camera means it was not found; an empty size list for the
/// front camera accepts every back size.
pub fn choose_optimal_size(back: Option<&[Size]>, front: Option<&[Size]>) -> Size {
    let (Some(back), Some(front)) = (back, front) else {
        return Size::ZERO;
    };
    back.iter()
        .filter(|size| front.is_empty() || front.contains(size))
        .max_by_key(|size| size.area())
        .copied()
        .unwrap_or(Size::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn back_camera_orientation_never_goes_negative() {
        let o = camera_orientation(LensFacing::Back, 90, DisplayRotation::Rotation180);
        assert_eq!(o, 270);
        let o = camera_orientation(LensFacing::Back, 0, DisplayRotation::Rotation270);
        assert_eq!(o, 90);
        let o = camera_orientation(LensFacing::Back, 90, DisplayRotation::Rotation90);
        assert_eq!(o, 0);
    }

    #[test]
    fn front_camera_orientation_wraps() {
        let o = camera_orientation(LensFacing::Front, 270, DisplayRotation::Rotation90);
        assert_eq!(o, 0);
        let o = camera_orientation(LensFacing::Front, 270, DisplayRotation::Rotation0);
        assert_eq!(o, 270);
    }

    #[test]
    fn rotation_from_degrees() {
        assert_eq!(DisplayRotation::from_degrees(90), DisplayRotation::Rotation90);
        assert_eq!(DisplayRotation::from_degrees(450), DisplayRotation::Rotation90);
        assert_eq!(DisplayRotation::from_degrees(45), DisplayRotation::Rotation0);
    }

    #[test]
    fn facing_switch_and_parse() {
        assert_eq!(LensFacing::Back.switched(), Some(LensFacing::Front));
        assert_eq!(LensFacing::Front.switched(), Some(LensFacing::Back));
        assert_eq!(LensFacing::External.switched(), None);
        assert_eq!("Rear".parse::<LensFacing>(), Ok(LensFacing::Back));
        assert!("sideways".parse::<LensFacing>().is_err());
    }

    #[test]
    fn optimal_size_is_largest_common_size() {
        let back = [Size::new(1920, 1080), Size::new(4000, 3000), Size::new(640, 480)];
        let front = [Size::new(640, 480), Size::new(1920, 1080)];
        assert_eq!(
            choose_optimal_size(Some(&back), Some(&front)),
            Size::new(1920, 1080)
        );
    }

    #[test]
    fn optimal_size_without_front_sizes_takes_largest_back() {
        let back = [Size::new(1920, 1080), Size::new(4000, 3000)];
        assert_eq!(choose_optimal_size(Some(&back), Some(&[])), Size::new(4000, 3000));
    }

    #[test]
    fn optimal_size_needs_both_cameras() {
        let sizes = [Size::new(640, 480)];
        assert_eq!(choose_optimal_size(None, Some(&sizes)), Size::ZERO);
        assert_eq!(choose_optimal_size(Some(&sizes), None), Size::ZERO);
        let other = [Size::new(320, 240)];
        assert_eq!(choose_optimal_size(Some(&sizes), Some(&other)), Size::ZERO);
    }
}
