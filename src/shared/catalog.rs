// This is free and unencumbered software released into the public domain.

use crate::shared::{CameraError, LensFacing, Size};

/// One camera found on the system.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CameraInfo {
    pub id: String,
    pub name: String,
    pub facing: Option<LensFacing>,
    pub sensor_orientation: Option<u32>,
    pub sizes: Vec<Size>,
    pub is_usb: bool,
}

impl CameraInfo {
    pub fn largest_size(&self) -> Option<Size> {
        self.sizes.iter().max_by_key(|s| s.area()).copied()
    }
}

/// Enumerates the cameras of this system, sorted by id.
pub fn list_cameras() -> Result<Vec<CameraInfo>, CameraError> {
    let mut cameras = platform_cameras()?;
    cameras.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.name.cmp(&b.name)));
    Ok(cameras)
}

/// The camera to use when none was requested: the first USB camera, else the
/// first back-facing one, else the first one found.
pub fn preferred_camera(cameras: &[CameraInfo]) -> Option<&CameraInfo> {
    cameras
        .iter()
        .find(|c| c.is_usb)
        .or_else(|| cameras.iter().find(|c| c.facing == Some(LensFacing::Back)))
        .or_else(|| cameras.first())
}

#[cfg(all(feature = "android", target_os = "android"))]
fn platform_cameras() -> Result<Vec<CameraInfo>, CameraError> {
    use crate::shared::{CameraPlatform, drivers::camera2::Camera2Platform};

    let platform = Camera2Platform::new();
    let mut out = Vec::new();
    for id in platform.camera_ids()? {
        let characteristics = platform.characteristics(&id)?;
        out.push(CameraInfo {
            name: format!("camera {id}"),
            id,
            facing: characteristics.facing,
            sensor_orientation: characteristics.sensor_orientation,
            sizes: characteristics.yuv_output_sizes,
            is_usb: characteristics.facing == Some(LensFacing::External),
        });
    }
    Ok(out)
}

#[cfg(all(target_os = "linux", not(all(feature = "android", target_os = "android"))))]
fn platform_cameras() -> Result<Vec<CameraInfo>, CameraError> {
    linux::video4linux_devices(std::path::Path::new("/sys/class/video4linux"))
}

#[cfg(not(any(target_os = "linux", all(feature = "android", target_os = "android"))))]
fn platform_cameras() -> Result<Vec<CameraInfo>, CameraError> {
    Ok(Vec::new())
}

#[cfg(target_os = "linux")]
mod linux {
    use super::CameraInfo;
    use crate::shared::{CameraError, LensFacing};
    use std::{
        fs,
        path::{Path, PathBuf},
    };

    pub(super) fn video4linux_devices(base: &Path) -> Result<Vec<CameraInfo>, CameraError> {
        let rd = match fs::read_dir(base) {
            Ok(v) => v,
            Err(_) => return Ok(Vec::new()),
        };

        let mut entries: Vec<u32> = rd
            .flatten()
            .filter_map(|e| e.file_name().to_str().and_then(video_index))
            .collect();
        entries.sort_unstable();

        let mut out = Vec::new();
        for idx in entries {
            let devnode = format!("/dev/video{idx}");
            if !Path::new(&devnode).exists() {
                continue;
            }
            let sys_entry = base.join(format!("video{idx}"));
            let name = fs::read_to_string(sys_entry.join("name"))
                .map(|s| s.trim().to_string())
                .unwrap_or_else(|_| devnode.clone());
            out.push(CameraInfo {
                id: format!("file:{devnode}"),
                name,
                facing: Some(LensFacing::External),
                is_usb: device_is_usb(sys_entry),
                ..Default::default()
            });
        }

        Ok(out)
    }

    pub(super) fn video_index(name: &str) -> Option<u32> {
        name.strip_prefix("video")?.parse().ok()
    }

    fn device_is_usb(sys_entry: PathBuf) -> bool {
        let device_link = sys_entry.join("device");
        let mut p = match fs::read_link(&device_link) {
            Ok(p) => p,
            Err(_) => return false,
        };

        if !p.is_absolute() {
            p = sys_entry.join(p);
        }

        if let Ok(canon) = p.canonicalize() {
            p = canon;
        }

        p.to_string_lossy().contains("/usb")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera(id: &str, facing: Option<LensFacing>, is_usb: bool) -> CameraInfo {
        CameraInfo {
            id: id.into(),
            facing,
            is_usb,
            ..Default::default()
        }
    }

    #[test]
    fn usb_cameras_are_preferred() {
        let cameras = [
            camera("0", Some(LensFacing::Back), false),
            camera("1", Some(LensFacing::External), true),
        ];
        assert_eq!(preferred_camera(&cameras).map(|c| c.id.as_str()), Some("1"));
    }

    #[test]
    fn back_camera_beats_front() {
        let cameras = [
            camera("0", Some(LensFacing::Front), false),
            camera("1", Some(LensFacing::Back), false),
        ];
        assert_eq!(preferred_camera(&cameras).map(|c| c.id.as_str()), Some("1"));
        assert!(preferred_camera(&[]).is_none());
    }

    #[test]
    fn largest_size_by_area() {
        let info = CameraInfo {
            sizes: vec![Size::new(640, 480), Size::new(1280, 720), Size::new(800, 600)],
            ..Default::default()
        };
        assert_eq!(info.largest_size(), Some(Size::new(1280, 720)));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn video_node_names() {
        assert_eq!(linux::video_index("video12"), Some(12));
        assert_eq!(linux::video_index("vbi0"), None);
        assert_eq!(linux::video_index("video"), None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn missing_sysfs_yields_no_cameras() {
        let cameras =
            linux::video4linux_devices(std::path::Path::new("/nonexistent/video4linux")).unwrap();
        assert!(cameras.is_empty());
    }
}
