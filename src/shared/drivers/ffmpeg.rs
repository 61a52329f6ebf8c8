// This is free and unencumbered software released into the public domain.

//! Desktop capture through an `ffmpeg` child process emitting raw I420.

use crate::shared::{
    CameraBackend, CameraConfig, CameraDriver, CameraError, CameraEvent, FrameHandoff,
    I420Buffer, PixelFormat, log,
};
use alloc::borrow::Cow;
use std::{
    env,
    io::Read,
    process::{Child, Command, Stdio},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::JoinHandle,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

pub struct FfmpegCameraDriver {
    config: CameraConfig,
    child: Option<Child>,
    stop: Arc<AtomicBool>,
    reader_join: Option<JoinHandle<()>>,
    handoff: FrameHandoff,
}

impl core::fmt::Debug for FfmpegCameraDriver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FfmpegCameraDriver")
            .field("config", &self.config)
            .field("child", &self.child.as_ref().map(|_| "<child>"))
            .finish()
    }
}

impl dogma::Named for FfmpegCameraDriver {
    fn name(&self) -> Cow<'_, str> {
        "ffmpeg".into()
    }
}

impl FfmpegCameraDriver {
    pub fn open(
        input_url: impl AsRef<str>,
        mut config: CameraConfig,
        handoff: FrameHandoff,
    ) -> Result<Self, CameraError> {
        if config.requested_size().is_none() {
            return Err(CameraError::invalid_config(
                "the ffmpeg backend needs an explicit frame size",
            ));
        }
        let input_url = input_url.as_ref().trim();
        if config.device.is_none() && !input_url.is_empty() {
            config.device = Some(input_url.to_string());
        }
        Ok(Self {
            config,
            child: None,
            stop: Arc::new(AtomicBool::new(false)),
            reader_join: None,
            handoff,
        })
    }

    #[inline]
    fn now_ns_best_effort() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    }

    fn spawn(&self) -> Result<Child, CameraError> {
        spawn_reader(&self.config)
    }

    fn stop_child(&mut self) {
        if let Some(mut child) = self.child.take() {
            #[cfg(unix)]
            {
                unsafe {
                    let _ = libc::kill(child.id() as i32, libc::SIGTERM);
                }
                let start = std::time::Instant::now();
                while start.elapsed() < Duration::from_millis(900) {
                    if let Ok(Some(_)) = child.try_wait() {
                        break;
                    }
                    std::thread::sleep(Duration::from_millis(20));
                }
            }
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl CameraDriver for FfmpegCameraDriver {
    fn backend(&self) -> CameraBackend {
        CameraBackend::Ffmpeg
    }

    fn start(&mut self) -> Result<(), CameraError> {
        if self.child.is_some() {
            return Ok(());
        }

        self.stop.store(false, Ordering::Relaxed);

        let mut child = self.spawn()?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| CameraError::other("ffmpeg stdout not piped"))?;

        let width = self.config.width;
        let height = self.config.height;
        let frame_size = I420Buffer::frame_size(width, height);

        let stop = Arc::clone(&self.stop);
        let handoff = self.handoff.clone();

        let join = std::thread::spawn(move || {
            let mut reader = std::io::BufReader::new(stdout);
            // The packer copies out of the buffer, so one is enough.
            let mut buf = vec![0u8; frame_size];

            while !stop.load(Ordering::Relaxed) {
                match reader.read_exact(&mut buf) {
                    Ok(()) => {
                        let ts = FfmpegCameraDriver::now_ns_best_effort();
                        let image = I420Buffer::new(&buf, width, height).with_timestamp_ns(ts);
                        handoff.deliver(&image);
                    },
                    Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                    Err(e) => {
                        handoff.notify(CameraEvent::Error {
                            backend: CameraBackend::Ffmpeg,
                            error: CameraError::driver("ffmpeg read", e),
                        });
                        break;
                    },
                }
            }
        });

        log::debug(format_args!(
            "ffmpeg capturing {width}x{height} ({frame_size} bytes per frame)"
        ));
        self.reader_join = Some(join);
        self.child = Some(child);

        Ok(())
    }

    fn stop(&mut self) -> Result<(), CameraError> {
        self.stop.store(true, Ordering::Relaxed);
        self.stop_child();
        if let Some(j) = self.reader_join.take() {
            let _ = j.join();
        }
        self.handoff.stop();
        Ok(())
    }
}

impl Drop for FfmpegCameraDriver {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Command-line arguments for capturing `config` as raw I420 on stdout.
pub fn ffmpeg_args(config: &CameraConfig) -> Vec<String> {
    let device = config.device.as_deref().unwrap_or("").trim();
    let input_device = get_input_device(device);

    let framerate = if config.fps.is_finite() && config.fps > 0.0 {
        config.fps.round().max(1.0) as u32
    } else {
        30
    };

    let mut ffargs: Vec<String> = vec![
        "-hide_banner".into(),
        "-nostdin".into(),
        "-nostats".into(),
        "-f".into(),
        ffmpeg_format().into(),
        "-loglevel".into(),
        "error".into(),
        "-video_size".into(),
        format!("{}x{}", config.width, config.height),
        "-framerate".into(),
        framerate.to_string(),
    ];

    ffargs.extend([
        "-i".into(),
        input_device,
        "-vf".into(),
        format!("scale={}:{}", config.width, config.height),
        "-pix_fmt".into(),
        PixelFormat::Yuv420.ffmpeg_name().into(),
        "-f".into(),
        "rawvideo".into(),
        "pipe:1".into(),
    ]);

    ffargs
}

fn spawn_reader(config: &CameraConfig) -> Result<Child, CameraError> {
    let ffargs = ffmpeg_args(config);

    let stderr = if config.diagnostics || env::var_os("ASIMOV_CAMERA_FFMPEG_STDERR").is_some() {
        Stdio::inherit()
    } else {
        Stdio::null()
    };

    Command::new("ffmpeg")
        .args(&ffargs)
        .stdout(Stdio::piped())
        .stderr(stderr)
        .spawn()
        .map_err(|e| CameraError::driver("spawning ffmpeg", e))
}

#[cfg(target_os = "macos")]
fn ffmpeg_format() -> &'static str {
    "avfoundation"
}

#[cfg(target_os = "windows")]
fn ffmpeg_format() -> &'static str {
    "dshow"
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn ffmpeg_format() -> &'static str {
    "v4l2"
}

#[cfg(target_os = "macos")]
fn get_input_device(device: &str) -> String {
    device.strip_prefix("avf:").unwrap_or(device).to_string()
}

#[cfg(target_os = "windows")]
fn get_input_device(device: &str) -> String {
    device.strip_prefix("dshow:").unwrap_or(device).to_string()
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn get_input_device(device: &str) -> String {
    let d = device.strip_prefix("file:").unwrap_or(device);
    if d.is_empty() {
        "/dev/video0".to_string()
    } else if d.chars().all(|c| c.is_ascii_digit()) {
        format!("/dev/video{d}")
    } else {
        d.to_string()
    }
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;

    #[test]
    fn device_index_maps_to_video_node() {
        assert_eq!(get_input_device("2"), "/dev/video2");
        assert_eq!(get_input_device("file:/dev/video1"), "/dev/video1");
        assert_eq!(get_input_device(""), "/dev/video0");
    }

    #[test]
    fn args_request_raw_i420() {
        let config = CameraConfig::new(320, 240, 15.0).with_device("1");
        let args = ffmpeg_args(&config);
        let joined = args.join(" ");
        assert!(joined.contains("-f v4l2"));
        assert!(joined.contains("-video_size 320x240"));
        assert!(joined.contains("-framerate 15"));
        assert!(joined.contains("-i /dev/video1"));
        assert!(joined.contains("-pix_fmt yuv420p"));
        assert_eq!(args.last().map(String::as_str), Some("pipe:1"));
    }
}
