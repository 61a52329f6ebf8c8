// This is free and unencumbered software released into the public domain.

use super::{CameraDevice, CameraMetadata, CameraResult, CameraStatus};
use crate::shared::{CameraCharacteristics, DeviceEvent};
use alloc::ffi::CString;
use core::{ffi::CStr, ptr::null_mut};
use ndk_sys::{
    ACameraManager, ACameraManager_create, ACameraManager_delete,
    ACameraManager_deleteCameraIdList, ACameraManager_getCameraCharacteristics,
    ACameraManager_getCameraIdList, ACameraManager_openCamera, camera_status_t,
};
use scopeguard::defer;
use std::sync::mpsc::SyncSender;

#[derive(Debug)]
pub struct CameraManager {
    pub(crate) handle: *mut ACameraManager,
}

unsafe impl Send for CameraManager {}

impl Drop for CameraManager {
    fn drop(&mut self) {
        unsafe {
            ACameraManager_delete(self.handle);
            self.handle = null_mut();
        }
    }
}

impl CameraManager {
    pub fn new() -> Self {
        Self {
            handle: unsafe { ACameraManager_create() },
        }
    }

    pub fn camera_ids(&self) -> CameraResult<Vec<String>> {
        let mut list_ptr = null_mut();
        CameraStatus::check(unsafe { ACameraManager_getCameraIdList(self.handle, &mut list_ptr) })?;

        defer! {
            unsafe { ACameraManager_deleteCameraIdList(list_ptr); }
        }

        let list = unsafe { &*list_ptr };
        if list.numCameras < 1 {
            return Ok(Vec::new());
        }

        let ids = unsafe { core::slice::from_raw_parts(list.cameraIds, list.numCameras as usize) };
        Ok(ids
            .iter()
            .filter_map(|p| unsafe { CStr::from_ptr(*p) }.to_str().ok())
            .map(String::from)
            .collect())
    }

    pub fn characteristics(&self, id: &str) -> CameraResult<CameraCharacteristics> {
        let id = camera_id(id)?;
        let mut metadata = CameraMetadata::default();
        CameraStatus::check(unsafe {
            ACameraManager_getCameraCharacteristics(self.handle, id.as_ptr(), &mut metadata.handle)
        })?;
        Ok(metadata.characteristics())
    }

    pub fn open_camera(
        &self,
        id: &str,
        events: SyncSender<DeviceEvent>,
    ) -> CameraResult<CameraDevice> {
        let c_id = camera_id(id)?;
        let mut device = CameraDevice::new(id, events);
        CameraStatus::check(unsafe {
            ACameraManager_openCamera(
                self.handle,
                c_id.as_ptr(),
                device.state_callbacks.as_mut(),
                &mut device.handle,
            )
        })?;
        Ok(device)
    }
}

fn camera_id(id: &str) -> CameraResult<CString> {
    CString::new(id).map_err(|_| CameraStatus(camera_status_t::ACAMERA_ERROR_INVALID_PARAMETER))
}
