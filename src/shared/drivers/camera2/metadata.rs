// This is free and unencumbered software released into the public domain.

use crate::shared::{CameraCharacteristics, LensFacing, Size};
use core::{mem::zeroed, ptr::null_mut};
use ndk_sys::{
    ACameraMetadata, ACameraMetadata_const_entry, ACameraMetadata_free,
    ACameraMetadata_getConstEntry, acamera_metadata_tag, camera_status_t,
};

/// `AIMAGE_FORMAT_YUV_420_888`.
pub const FORMAT_YUV_420_888: i32 = 0x23;

const LENS_FACING_FRONT: u8 = 0;
const LENS_FACING_BACK: u8 = 1;
const LENS_FACING_EXTERNAL: u8 = 2;

const STREAM_CONFIGURATION_OUTPUT: i32 = 0;

#[derive(Debug)]
pub struct CameraMetadata {
    pub(crate) handle: *mut ACameraMetadata,
}

impl Default for CameraMetadata {
    fn default() -> Self {
        Self { handle: null_mut() }
    }
}

impl Drop for CameraMetadata {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe { ACameraMetadata_free(self.handle) };
            self.handle = null_mut();
        }
    }
}

impl CameraMetadata {
    pub fn characteristics(&self) -> CameraCharacteristics {
        CameraCharacteristics {
            facing: self.lens_facing(),
            sensor_orientation: self.sensor_orientation(),
            yuv_output_sizes: self.output_sizes(FORMAT_YUV_420_888),
        }
    }

    pub fn lens_facing(&self) -> Option<LensFacing> {
        let entry = self.entry(acamera_metadata_tag::ACAMERA_LENS_FACING.0)?;
        let values = unsafe { core::slice::from_raw_parts(entry.data.u8_, entry.count as usize) };
        match values.first()? {
            &LENS_FACING_FRONT => Some(LensFacing::Front),
            &LENS_FACING_BACK => Some(LensFacing::Back),
            &LENS_FACING_EXTERNAL => Some(LensFacing::External),
            _ => None,
        }
    }

    pub fn sensor_orientation(&self) -> Option<u32> {
        let entry = self.entry(acamera_metadata_tag::ACAMERA_SENSOR_ORIENTATION.0)?;
        let values = unsafe { core::slice::from_raw_parts(entry.data.i32_, entry.count as usize) };
        values.first().map(|&degrees| degrees.rem_euclid(360) as u32)
    }

    /// Output sizes advertised for `format`, as (format, width, height,
    /// input) quadruples in the stream configuration map.
    pub fn output_sizes(&self, format: i32) -> Vec<Size> {
        let Some(entry) =
            self.entry(acamera_metadata_tag::ACAMERA_SCALER_AVAILABLE_STREAM_CONFIGURATIONS.0)
        else {
            return Vec::new();
        };
        let values = unsafe { core::slice::from_raw_parts(entry.data.i32_, entry.count as usize) };
        values
            .chunks_exact(4)
            .filter(|c| c[0] == format && c[3] == STREAM_CONFIGURATION_OUTPUT)
            .filter(|c| c[1] > 0 && c[2] > 0)
            .map(|c| Size::new(c[1] as u32, c[2] as u32))
            .collect()
    }

    fn entry(&self, tag: u32) -> Option<ACameraMetadata_const_entry> {
        if self.handle.is_null() {
            return None;
        }
        let mut entry: ACameraMetadata_const_entry = unsafe { zeroed() };
        let status = unsafe { ACameraMetadata_getConstEntry(self.handle, tag, &mut entry) };
        (status == camera_status_t::ACAMERA_OK && entry.count > 0).then_some(entry)
    }
}
