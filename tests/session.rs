// This is free and unencumbered software released into the public domain.

use asimov_camera_loader::shared::{
    CameraBackend, CameraCharacteristics, CameraConfig, CameraDriver, CameraError, CameraEvent,
    CameraLoader, CameraPlatform, DeviceEvent, DisplayRotation, FrameHandoff, FrameMsg,
    I420Buffer, LensFacing, SessionState, Size,
};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
    mpsc::{Receiver, SyncSender, sync_channel},
};

type Log = Arc<Mutex<Vec<String>>>;

#[derive(Default)]
struct MockPlatform {
    cameras: Vec<(String, CameraCharacteristics)>,
    fail_open: bool,
    fail_capture: bool,
    /// Characteristics become unreadable after the next open.
    fail_characteristics_when_open: bool,
    characteristics_broken: Arc<AtomicBool>,
    log: Log,
    device_events: Arc<Mutex<Option<SyncSender<DeviceEvent>>>>,
}

struct MockDevice {
    id: String,
    log: Log,
}

impl Drop for MockDevice {
    fn drop(&mut self) {
        self.log.lock().unwrap().push(format!("close device {}", self.id));
    }
}

struct MockSession {
    log: Log,
}

impl Drop for MockSession {
    fn drop(&mut self) {
        self.log.lock().unwrap().push("close session".into());
    }
}

impl CameraPlatform for MockPlatform {
    type Device = MockDevice;
    type Session = MockSession;

    fn camera_ids(&self) -> Result<Vec<String>, CameraError> {
        Ok(self.cameras.iter().map(|(id, _)| id.clone()).collect())
    }

    fn characteristics(&self, id: &str) -> Result<CameraCharacteristics, CameraError> {
        if self.characteristics_broken.load(Ordering::SeqCst) {
            return Err(CameraError::other("camera service died"));
        }
        self.cameras
            .iter()
            .find(|(cid, _)| cid == id)
            .map(|(_, c)| c.clone())
            .ok_or(CameraError::NoCamera)
    }

    fn open_device(
        &mut self,
        id: &str,
        events: SyncSender<DeviceEvent>,
    ) -> Result<MockDevice, CameraError> {
        if self.fail_open {
            return Err(CameraError::other("camera in use"));
        }
        *self.device_events.lock().unwrap() = Some(events);
        if std::mem::take(&mut self.fail_characteristics_when_open) {
            self.characteristics_broken.store(true, Ordering::SeqCst);
        }
        self.log.lock().unwrap().push(format!("open {id}"));
        Ok(MockDevice {
            id: id.to_string(),
            log: Arc::clone(&self.log),
        })
    }

    fn start_capture(
        &mut self,
        device: &mut MockDevice,
        size: Size,
        max_images: usize,
        handoff: FrameHandoff,
    ) -> Result<MockSession, CameraError> {
        if self.fail_capture {
            return Err(CameraError::other("configure failed"));
        }
        self.log
            .lock()
            .unwrap()
            .push(format!("capture {} {size} x{max_images}", device.id));

        let data = vec![1u8; I420Buffer::frame_size(4, 2)];
        handoff.deliver(&I420Buffer::new(&data, 4, 2));

        Ok(MockSession {
            log: Arc::clone(&self.log),
        })
    }
}

fn characteristics(facing: LensFacing, orientation: u32, sizes: &[Size]) -> CameraCharacteristics {
    CameraCharacteristics {
        facing: Some(facing),
        sensor_orientation: Some(orientation),
        yuv_output_sizes: sizes.to_vec(),
    }
}

fn phone() -> MockPlatform {
    MockPlatform {
        cameras: vec![
            (
                "0".into(),
                characteristics(
                    LensFacing::Back,
                    90,
                    &[Size::new(4000, 3000), Size::new(1920, 1080), Size::new(640, 480)],
                ),
            ),
            (
                "1".into(),
                characteristics(LensFacing::Front, 270, &[Size::new(1920, 1080), Size::new(640, 480)]),
            ),
        ],
        ..Default::default()
    }
}

struct Harness {
    frames: Receiver<FrameMsg>,
    events: Receiver<CameraEvent>,
    handoff: FrameHandoff,
}

fn harness() -> Harness {
    let (frame_tx, frames) = sync_channel(4);
    let (events_tx, events) = sync_channel(64);
    Harness {
        frames,
        events,
        handoff: FrameHandoff::new(CameraBackend::Android, frame_tx, events_tx),
    }
}

fn negotiated() -> CameraConfig {
    CameraConfig::new(0, 0, 30.0)
}

fn states(events: &Receiver<CameraEvent>) -> Vec<SessionState> {
    events
        .try_iter()
        .filter_map(|e| match e {
            CameraEvent::StateChanged { state, .. } => Some(state),
            _ => None,
        })
        .collect()
}

#[test]
fn resume_opens_back_camera_and_captures() {
    let h = harness();
    let platform = phone();
    let log = Arc::clone(&platform.log);
    let mut loader = CameraLoader::new(platform, negotiated(), h.handoff.clone());

    loader.resume().unwrap();

    assert_eq!(loader.state(), SessionState::Capturing);
    assert_eq!(loader.camera_id(), Some("0"));
    assert_eq!(loader.preview_size(), Some(Size::new(1920, 1080)));
    assert_eq!(
        states(&h.events),
        vec![SessionState::Opening, SessionState::Open, SessionState::Capturing]
    );
    assert_eq!(
        log.lock().unwrap().as_slice(),
        &["open 0".to_string(), "capture 0 1920x1080 x2".to_string()]
    );

    match h.frames.try_recv() {
        Ok(FrameMsg::Frame(frame)) => {
            assert_eq!((frame.width, frame.height), (4, 2));
            assert_eq!(frame.data.len(), 12);
        },
        _ => panic!("expected the captured frame"),
    }
}

#[test]
fn explicit_size_skips_negotiation() {
    let h = harness();
    let platform = phone();
    let log = Arc::clone(&platform.log);
    let config = CameraConfig::new(640, 480, 30.0).with_buffer_frames(3);
    let mut loader = CameraLoader::new(platform, config, h.handoff);

    loader.resume().unwrap();
    assert_eq!(loader.preview_size(), Some(Size::new(640, 480)));
    assert!(log.lock().unwrap().contains(&"capture 0 640x480 x3".to_string()));
}

#[test]
fn pause_releases_session_before_device() {
    let h = harness();
    let platform = phone();
    let log = Arc::clone(&platform.log);
    let mut loader = CameraLoader::new(platform, negotiated(), h.handoff);

    loader.resume().unwrap();
    loader.pause();
    loader.pause();

    assert_eq!(loader.state(), SessionState::Closed);
    assert_eq!(loader.camera_id(), None);
    let log = log.lock().unwrap();
    assert_eq!(&log[2..], &["close session".to_string(), "close device 0".to_string()]);
}

#[test]
fn resume_twice_is_a_no_op() {
    let h = harness();
    let platform = phone();
    let log = Arc::clone(&platform.log);
    let mut loader = CameraLoader::new(platform, negotiated(), h.handoff);

    loader.resume().unwrap();
    loader.resume().unwrap();
    assert_eq!(log.lock().unwrap().iter().filter(|l| l.starts_with("open")).count(), 1);
}

#[test]
fn switch_camera_restarts_on_the_other_side() {
    let h = harness();
    let platform = phone();
    let log = Arc::clone(&platform.log);
    let mut loader = CameraLoader::new(platform, negotiated(), h.handoff);

    loader.resume().unwrap();
    loader.switch_camera().unwrap();

    assert_eq!(loader.facing(), LensFacing::Front);
    assert_eq!(loader.camera_id(), Some("1"));
    assert_eq!(loader.state(), SessionState::Capturing);
    assert!(log.lock().unwrap().contains(&"close device 0".to_string()));
    assert!(log.lock().unwrap().contains(&"open 1".to_string()));

    loader.switch_camera().unwrap();
    assert_eq!(loader.camera_id(), Some("0"));
}

#[test]
fn external_camera_does_not_switch() {
    let h = harness();
    let platform = MockPlatform {
        cameras: vec![("usb".into(), characteristics(LensFacing::External, 0, &[]))],
        ..Default::default()
    };
    let log = Arc::clone(&platform.log);
    let config = CameraConfig::new(640, 480, 30.0).with_facing(LensFacing::External);
    let mut loader = CameraLoader::new(platform, config, h.handoff);

    loader.resume().unwrap();
    loader.switch_camera().unwrap();

    assert_eq!(loader.facing(), LensFacing::External);
    assert_eq!(loader.camera_id(), Some("usb"));
    assert_eq!(log.lock().unwrap().iter().filter(|l| l.starts_with("open")).count(), 1);
}

#[test]
fn missing_facing_leaves_loader_closed() {
    let h = harness();
    let platform = MockPlatform {
        cameras: vec![("0".into(), characteristics(LensFacing::Back, 90, &[]))],
        ..Default::default()
    };
    let config = negotiated().with_facing(LensFacing::Front);
    let mut loader = CameraLoader::new(platform, config, h.handoff);

    loader.resume().unwrap();
    assert_eq!(loader.state(), SessionState::Closed);
    assert!(!loader.has_multiple_cameras().unwrap());
    assert_eq!(loader.camera_orientation(), 0);
}

#[test]
fn failed_open_returns_to_closed() {
    let h = harness();
    let platform = MockPlatform {
        fail_open: true,
        ..phone()
    };
    let mut loader = CameraLoader::new(platform, negotiated(), h.handoff);

    assert!(loader.resume().is_err());
    assert_eq!(loader.state(), SessionState::Closed);
    assert_eq!(
        states(&h.events),
        vec![SessionState::Opening, SessionState::Closed]
    );
}

#[test]
fn failed_session_keeps_device_open() {
    let h = harness();
    let platform = MockPlatform {
        fail_capture: true,
        ..phone()
    };
    let mut loader = CameraLoader::new(platform, negotiated(), h.handoff);

    loader.resume().unwrap();
    assert_eq!(loader.state(), SessionState::Open);
    assert!(
        h.events
            .try_iter()
            .any(|e| matches!(e, CameraEvent::Warning { .. }))
    );
}

#[test]
fn disconnect_closes_the_device() {
    let h = harness();
    let platform = phone();
    let log = Arc::clone(&platform.log);
    let device_events = Arc::clone(&platform.device_events);
    let mut loader = CameraLoader::new(platform, negotiated(), h.handoff);

    loader.resume().unwrap();
    let tx = device_events.lock().unwrap().clone().unwrap();
    tx.send(DeviceEvent::Disconnected).unwrap();
    loader.poll_device_events();

    assert_eq!(loader.state(), SessionState::Closed);
    assert!(log.lock().unwrap().contains(&"close device 0".to_string()));

    // Late errors for a released device are ignored.
    tx.send(DeviceEvent::Error(4)).unwrap();
    loader.poll_device_events();
    assert_eq!(loader.state(), SessionState::Closed);
}

#[test]
fn orientation_follows_facing_and_rotation() {
    let h = harness();
    let config = negotiated().with_rotation(DisplayRotation::Rotation180);
    let mut loader = CameraLoader::new(phone(), config, h.handoff);

    // back: (90 - 180) mod 360
    assert_eq!(loader.camera_orientation(), 270);
    assert!(loader.has_multiple_cameras().unwrap());

    loader.switch_camera().unwrap();
    // front: (270 + 180) mod 360
    assert_eq!(loader.camera_orientation(), 90);
}

#[test]
fn explicit_device_overrides_facing() {
    let h = harness();
    let config = negotiated().with_device("1");
    let mut loader = CameraLoader::new(phone(), config, h.handoff);

    loader.resume().unwrap();
    assert_eq!(loader.camera_id(), Some("1"));
}

#[test]
fn drop_releases_everything() {
    let h = harness();
    let platform = phone();
    let log = Arc::clone(&platform.log);
    {
        let mut loader = CameraLoader::new(platform, negotiated(), h.handoff);
        loader.resume().unwrap();
    }
    let log = log.lock().unwrap();
    assert_eq!(log.last().map(String::as_str), Some("close device 0"));
}

#[test]
fn disconnect_while_capturing_is_reported() {
    let h = harness();
    let platform = phone();
    let log = Arc::clone(&platform.log);
    let device_events = Arc::clone(&platform.device_events);
    let mut loader = CameraLoader::new(platform, negotiated(), h.handoff);
    let driver: &mut dyn CameraDriver = &mut loader;

    driver.start().unwrap();
    driver.poll().unwrap();
    assert_eq!(
        states(&h.events),
        vec![SessionState::Opening, SessionState::Open, SessionState::Capturing]
    );

    let tx = device_events.lock().unwrap().clone().unwrap();
    tx.send(DeviceEvent::Disconnected).unwrap();
    driver.poll().unwrap();

    let events: Vec<_> = h.events.try_iter().collect();
    assert!(events.iter().any(
        |e| matches!(e, CameraEvent::Warning { message, .. } if message == "camera disconnected")
    ));
    assert!(events.iter().any(|e| matches!(
        e,
        CameraEvent::StateChanged {
            state: SessionState::Closed,
            ..
        }
    )));
    assert_eq!(loader.state(), SessionState::Closed);
    assert!(log.lock().unwrap().contains(&"close device 0".to_string()));
}

#[test]
fn loader_drives_switch_and_orientation_as_a_driver() {
    let h = harness();
    let mut loader = CameraLoader::new(phone(), negotiated(), h.handoff);
    let driver: &mut dyn CameraDriver = &mut loader;

    assert_eq!(driver.backend(), CameraBackend::Android);
    assert_eq!(driver.orientation(), 90);
    driver.start().unwrap();
    driver.switch_camera().unwrap();
    assert_eq!(driver.orientation(), 270);
    driver.stop().unwrap();
    assert_eq!(loader.state(), SessionState::Closed);
}

#[test]
fn failed_negotiation_releases_the_device() {
    let h = harness();
    let platform = MockPlatform {
        fail_characteristics_when_open: true,
        ..phone()
    };
    let log = Arc::clone(&platform.log);
    let broken = Arc::clone(&platform.characteristics_broken);
    let mut loader = CameraLoader::new(platform, negotiated(), h.handoff);

    assert!(loader.resume().is_err());
    assert_eq!(loader.state(), SessionState::Closed);
    assert_eq!(loader.camera_id(), None);
    assert_eq!(
        log.lock().unwrap().as_slice(),
        &["open 0".to_string(), "close device 0".to_string()]
    );

    // Once the service recovers a new resume captures again.
    broken.store(false, Ordering::SeqCst);
    loader.resume().unwrap();
    assert_eq!(loader.state(), SessionState::Capturing);
}

#[test]
fn back_camera_alone_negotiates_no_size() {
    let h = harness();
    let platform = MockPlatform {
        cameras: vec![(
            "0".into(),
            characteristics(LensFacing::Back, 90, &[Size::new(1280, 720)]),
        )],
        ..Default::default()
    };
    let log = Arc::clone(&platform.log);
    let mut loader = CameraLoader::new(platform, negotiated(), h.handoff);

    assert_eq!(loader.negotiate_size().unwrap(), Size::ZERO);
    loader.resume().unwrap();

    assert_eq!(loader.state(), SessionState::Open);
    assert_eq!(loader.preview_size(), Some(Size::ZERO));
    assert!(
        h.events
            .try_iter()
            .any(|e| matches!(e, CameraEvent::Warning { .. }))
    );
    assert!(!log.lock().unwrap().iter().any(|l| l.starts_with("capture")));
}
