// This is free and unencumbered software released into the public domain.

use crate::shared::DeviceEvent;
use core::{
    ffi::{c_int, c_void},
    ptr::null_mut,
};
use ndk_sys::{ACameraDevice, ACameraDevice_StateCallbacks, ACameraDevice_close};
use std::sync::mpsc::SyncSender;

/// An open camera device, closed on drop.
#[derive(Debug)]
pub struct CameraDevice {
    pub(crate) id: String,
    pub(crate) handle: *mut ACameraDevice,
    // Boxed so the callback context outlives moves of the device.
    pub(crate) state_callbacks: Box<ACameraDevice_StateCallbacks>,
    #[allow(unused)]
    events: Box<SyncSender<DeviceEvent>>,
}

unsafe impl Send for CameraDevice {}

impl Drop for CameraDevice {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe { ACameraDevice_close(self.handle) };
            self.handle = null_mut();
        }
    }
}

impl CameraDevice {
    pub(crate) fn new(id: &str, events: SyncSender<DeviceEvent>) -> Self {
        let events = Box::new(events);

        unsafe extern "C" fn on_disconnected(context: *mut c_void, _device: *mut ACameraDevice) {
            let events = unsafe { &*(context as *const SyncSender<DeviceEvent>) };
            let _ = events.try_send(DeviceEvent::Disconnected);
        }

        unsafe extern "C" fn on_error(
            context: *mut c_void,
            _device: *mut ACameraDevice,
            error: c_int,
        ) {
            let events = unsafe { &*(context as *const SyncSender<DeviceEvent>) };
            let _ = events.try_send(DeviceEvent::Error(error as i32));
        }

        let state_callbacks = Box::new(ACameraDevice_StateCallbacks {
            context: (&*events as *const SyncSender<DeviceEvent>) as *mut c_void,
            onDisconnected: Some(on_disconnected),
            onError: Some(on_error),
        });

        Self {
            id: id.to_string(),
            handle: null_mut(),
            state_callbacks,
            events,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}
