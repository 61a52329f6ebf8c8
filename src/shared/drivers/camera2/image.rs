// This is free and unencumbered software released into the public domain.

use crate::shared::{ImagePlane, Yuv420Image};
use core::ptr::null_mut;
use ndk_sys::{
    AImage, AImage_delete, AImage_getHeight, AImage_getNumberOfPlanes, AImage_getPlaneData,
    AImage_getPlaneRowStride, AImage_getTimestamp, AImage_getWidth, media_status_t,
};

/// An image acquired from an [`ImageReader`](super::ImageReader), returned to
/// the reader on drop.
#[derive(Debug)]
pub struct Image {
    pub(crate) handle: *mut AImage,
}

impl Default for Image {
    fn default() -> Self {
        Self { handle: null_mut() }
    }
}

impl Drop for Image {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe { AImage_delete(self.handle) };
            self.handle = null_mut();
        }
    }
}

impl Image {
    fn query(&self, f: unsafe extern "C" fn(*const AImage, *mut i32) -> media_status_t) -> Option<i32> {
        let mut result = 0;
        let status = unsafe { f(self.handle, &mut result) };
        (status == media_status_t::AMEDIA_OK).then_some(result)
    }

    pub fn number_of_planes(&self) -> usize {
        self.query(AImage_getNumberOfPlanes)
            .map(|n| n.max(0) as usize)
            .unwrap_or(0)
    }
}

impl Yuv420Image for Image {
    fn width(&self) -> u32 {
        self.query(AImage_getWidth).unwrap_or(0).max(0) as u32
    }

    fn height(&self) -> u32 {
        self.query(AImage_getHeight).unwrap_or(0).max(0) as u32
    }

    fn plane(&self, index: usize) -> Option<ImagePlane<'_>> {
        if index >= self.number_of_planes() {
            return None;
        }
        let mut data = null_mut();
        let mut len = 0;
        let status = unsafe { AImage_getPlaneData(self.handle, index as _, &mut data, &mut len) };
        if status != media_status_t::AMEDIA_OK || data.is_null() || len < 0 {
            return None;
        }
        // Valid until the image is deleted, which cannot happen while borrowed.
        let bytes = unsafe { core::slice::from_raw_parts(data as *const u8, len as usize) };
        Some(ImagePlane::new(bytes))
    }

    fn luma_row_stride(&self) -> u32 {
        let mut stride = 0;
        let status = unsafe { AImage_getPlaneRowStride(self.handle, 0, &mut stride) };
        if status == media_status_t::AMEDIA_OK && stride > 0 {
            stride as u32
        } else {
            self.width()
        }
    }

    fn timestamp_ns(&self) -> u64 {
        let mut result = 0i64;
        let status = unsafe { AImage_getTimestamp(self.handle, &mut result) };
        if status == media_status_t::AMEDIA_OK {
            result.max(0) as u64
        } else {
            0
        }
    }
}
