// This is free and unencumbered software released into the public domain.

use crate::shared::{CameraError, Frame, SessionState, Yuv420Image, log, pack_image};
use std::{
    sync::{
        Arc, RwLock,
        atomic::{AtomicBool, Ordering},
        mpsc::{Receiver, RecvTimeoutError, SyncSender, TrySendError, sync_channel},
    },
    thread::JoinHandle,
    time::Duration,
};

const DISPATCH_TICK: Duration = Duration::from_millis(200);

pub type FrameSink = Arc<dyn Fn(Frame) + Send + Sync + 'static>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraBackend {
    Android,
    Ffmpeg,
}

#[derive(Debug)]
pub enum CameraEvent {
    Started {
        backend: CameraBackend,
    },
    Stopped {
        backend: CameraBackend,
    },
    StateChanged {
        backend: CameraBackend,
        state: SessionState,
    },
    FrameDropped {
        backend: CameraBackend,
    },
    Warning {
        backend: CameraBackend,
        message: String,
    },
    Error {
        backend: CameraBackend,
        error: CameraError,
    },
}

pub enum FrameMsg {
    Frame(Frame),
    Stop,
}

/// Fans queued frames out to every sink on a dedicated thread.
pub struct Dispatcher {
    frame_tx: SyncSender<FrameMsg>,
    sinks: Arc<RwLock<Vec<FrameSink>>>,
    halted: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl Dispatcher {
    pub fn new(
        capacity: usize,
        backend: CameraBackend,
        events_tx: SyncSender<CameraEvent>,
    ) -> Self {
        let (frame_tx, frame_rx) = sync_channel::<FrameMsg>(capacity.max(1));
        let sinks: Arc<RwLock<Vec<FrameSink>>> = Arc::default();
        let halted = Arc::new(AtomicBool::new(false));

        let worker = {
            let sinks = Arc::clone(&sinks);
            let halted = Arc::clone(&halted);
            std::thread::spawn(move || {
                let _ = events_tx.try_send(CameraEvent::Started { backend });
                dispatch_frames(&frame_rx, &sinks, &halted);
                let _ = events_tx.try_send(CameraEvent::Stopped { backend });
            })
        };

        Self {
            frame_tx,
            sinks,
            halted,
            worker: Some(worker),
        }
    }

    pub fn sender(&self) -> SyncSender<FrameMsg> {
        self.frame_tx.clone()
    }

    pub fn add_sink(&self, sink: FrameSink) {
        match self.sinks.write() {
            Ok(mut sinks) => sinks.push(sink),
            Err(poisoned) => poisoned.into_inner().push(sink),
        }
    }

    /// Halts the worker and waits for it. Idempotent.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        self.halted.store(true, Ordering::Relaxed);
        let _ = self.frame_tx.try_send(FrameMsg::Stop);
        let _ = worker.join();
    }
}

fn dispatch_frames(
    frame_rx: &Receiver<FrameMsg>,
    sinks: &RwLock<Vec<FrameSink>>,
    halted: &AtomicBool,
) {
    while !halted.load(Ordering::Relaxed) {
        let frame = match frame_rx.recv_timeout(DISPATCH_TICK) {
            Ok(FrameMsg::Frame(frame)) => frame,
            Ok(FrameMsg::Stop) | Err(RecvTimeoutError::Disconnected) => return,
            Err(RecvTimeoutError::Timeout) => continue,
        };
        let Ok(sinks) = sinks.read() else {
            return;
        };
        for sink in sinks.iter() {
            sink(frame.clone());
        }
    }
}

/// Hands captured images over to the dispatcher as NV21 frames.
///
/// Cloned into capture callbacks; never blocks the capture thread.
#[derive(Clone, Debug)]
pub struct FrameHandoff {
    backend: CameraBackend,
    frame_tx: SyncSender<FrameMsg>,
    events_tx: SyncSender<CameraEvent>,
}

impl FrameHandoff {
    pub fn new(
        backend: CameraBackend,
        frame_tx: SyncSender<FrameMsg>,
        events_tx: SyncSender<CameraEvent>,
    ) -> Self {
        Self {
            backend,
            frame_tx,
            events_tx,
        }
    }

    pub fn backend(&self) -> CameraBackend {
        self.backend
    }

    /// Packs `image` and queues it; a malformed image is dropped.
    ///
    /// Returns whether a frame was queued.
    pub fn deliver(&self, image: &impl Yuv420Image) -> bool {
        let packed = match pack_image(image) {
            Ok(packed) => packed,
            Err(err) => {
                log::debug(format_args!("dropping frame: {err}"));
                self.notify(CameraEvent::FrameDropped {
                    backend: self.backend,
                });
                return false;
            },
        };

        let frame = Frame::new_nv21(packed.into_bytes(), image.width(), image.height())
            .with_stride(image.luma_row_stride())
            .with_timestamp_ns(image.timestamp_ns());
        match self.frame_tx.try_send(FrameMsg::Frame(frame)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.notify(CameraEvent::FrameDropped {
                    backend: self.backend,
                });
                false
            },
            Err(TrySendError::Disconnected(_)) => {
                self.notify(CameraEvent::Error {
                    backend: self.backend,
                    error: CameraError::Closed,
                });
                false
            },
        }
    }

    pub fn notify(&self, event: CameraEvent) {
        let _ = self.events_tx.try_send(event);
    }

    pub fn stop(&self) {
        let _ = self.frame_tx.try_send(FrameMsg::Stop);
    }
}

/// A capture backend driven through [`Camera`].
pub trait CameraDriver: Send {
    fn backend(&self) -> CameraBackend;

    fn start(&mut self) -> Result<(), CameraError>;

    fn stop(&mut self) -> Result<(), CameraError> {
        Ok(())
    }

    /// Handles asynchronous device notifications. Called periodically while
    /// the camera runs.
    fn poll(&mut self) -> Result<(), CameraError> {
        Ok(())
    }

    /// Moves to the camera on the other side of the device.
    fn switch_camera(&mut self) -> Result<(), CameraError> {
        Err(CameraError::unsupported("this backend cannot switch cameras"))
    }

    /// Clockwise rotation of the frames relative to the display, in degrees.
    fn orientation(&self) -> u32 {
        0
    }
}

/// An opened camera: its driver, the frame dispatcher and the event channel.
pub struct Camera {
    driver: Box<dyn CameraDriver>,
    dispatcher: Dispatcher,
    events_rx: Receiver<CameraEvent>,
}

impl Camera {
    pub(crate) fn new(
        driver: Box<dyn CameraDriver>,
        dispatcher: Dispatcher,
        events_rx: Receiver<CameraEvent>,
    ) -> Self {
        Self {
            driver,
            dispatcher,
            events_rx,
        }
    }

    pub fn backend(&self) -> CameraBackend {
        self.driver.backend()
    }

    pub fn add_sink(&self, sink: FrameSink) {
        self.dispatcher.add_sink(sink);
    }

    pub fn events(&self) -> &Receiver<CameraEvent> {
        &self.events_rx
    }

    pub fn start(&mut self) -> Result<(), CameraError> {
        self.driver.start()
    }

    /// Processes pending device notifications; disconnects surface as
    /// [`CameraEvent::Warning`]s.
    pub fn poll(&mut self) -> Result<(), CameraError> {
        self.driver.poll()
    }

    pub fn switch_camera(&mut self) -> Result<(), CameraError> {
        self.driver.switch_camera()
    }

    pub fn orientation(&self) -> u32 {
        self.driver.orientation()
    }

    pub fn stop(&mut self) -> Result<(), CameraError> {
        let result = self.driver.stop();
        self.dispatcher.stop();
        result
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
