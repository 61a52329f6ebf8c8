// This is free and unencumbered software released into the public domain.

//! Session outputs and request targets wrapping a [`NativeWindow`].

use super::{CameraResult, CameraStatus, NativeWindow};
use core::ptr::null_mut;
use ndk_sys::{
    ACameraOutputTarget, ACameraOutputTarget_create, ACameraOutputTarget_free,
    ACaptureSessionOutput, ACaptureSessionOutput_create, ACaptureSessionOutput_free,
    ACaptureSessionOutputContainer, ACaptureSessionOutputContainer_add,
    ACaptureSessionOutputContainer_create, ACaptureSessionOutputContainer_free,
};

#[derive(Debug)]
pub struct CaptureSessionOutput {
    pub(crate) handle: *mut ACaptureSessionOutput,
}

impl Drop for CaptureSessionOutput {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe { ACaptureSessionOutput_free(self.handle) };
            self.handle = null_mut();
        }
    }
}

impl CaptureSessionOutput {
    /// See: https://developer.android.com/ndk/reference/group/camera#acapturesessionoutput_create
    pub fn new(window: &NativeWindow) -> CameraResult<Self> {
        let mut result = Self { handle: null_mut() };
        CameraStatus::check(unsafe { ACaptureSessionOutput_create(window.handle, &mut result.handle) })?;
        Ok(result)
    }
}

#[derive(Debug)]
pub struct CaptureSessionOutputContainer {
    pub(crate) handle: *mut ACaptureSessionOutputContainer,
}

impl Drop for CaptureSessionOutputContainer {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe { ACaptureSessionOutputContainer_free(self.handle) };
            self.handle = null_mut();
        }
    }
}

impl CaptureSessionOutputContainer {
    pub fn new() -> CameraResult<Self> {
        let mut result = Self { handle: null_mut() };
        CameraStatus::check(unsafe { ACaptureSessionOutputContainer_create(&mut result.handle) })?;
        Ok(result)
    }

    pub fn add(&mut self, output: &CaptureSessionOutput) -> CameraResult {
        CameraStatus::check(unsafe {
            ACaptureSessionOutputContainer_add(self.handle, output.handle)
        })
    }
}

#[derive(Debug)]
pub struct CameraOutputTarget {
    pub(crate) handle: *mut ACameraOutputTarget,
}

impl Drop for CameraOutputTarget {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe { ACameraOutputTarget_free(self.handle) };
            self.handle = null_mut();
        }
    }
}

impl CameraOutputTarget {
    /// See: https://developer.android.com/ndk/reference/group/camera#acameraoutputtarget_create
    pub fn new(window: &NativeWindow) -> CameraResult<Self> {
        let mut result = Self { handle: null_mut() };
        CameraStatus::check(unsafe { ACameraOutputTarget_create(window.handle, &mut result.handle) })?;
        Ok(result)
    }
}
