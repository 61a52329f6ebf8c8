// This is free and unencumbered software released into the public domain.

use super::{Image, MediaResult, MediaStatus, NativeWindow};
use crate::shared::{FrameHandoff, Size};
use core::{ffi::c_void, ptr::null_mut};
use ndk_sys::{
    AImageReader, AImageReader_ImageListener, AImageReader_acquireNextImage, AImageReader_delete,
    AImageReader_getWindow, AImageReader_new, AImageReader_setImageListener, media_status_t,
};

/// A pool of `max_images` capture buffers feeding a [`FrameHandoff`].
#[derive(Debug)]
pub struct ImageReader {
    pub(crate) handle: *mut AImageReader,
    listener: Option<Box<AImageReader_ImageListener>>,
    handoff: Option<Box<FrameHandoff>>,
}

unsafe impl Send for ImageReader {}

impl Drop for ImageReader {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe { AImageReader_delete(self.handle) };
            self.handle = null_mut();
        }
    }
}

impl ImageReader {
    pub fn new(size: Size, format: i32, max_images: usize) -> MediaResult<Self> {
        let mut result = Self {
            handle: null_mut(),
            listener: None,
            handoff: None,
        };
        MediaStatus::check(unsafe {
            AImageReader_new(
                size.width as _,
                size.height as _,
                format,
                max_images as _,
                &mut result.handle,
            )
        })?;
        Ok(result)
    }

    /// The reader's surface; owned by the reader.
    pub fn window(&self) -> MediaResult<NativeWindow> {
        let mut window = null_mut();
        MediaStatus::check(unsafe { AImageReader_getWindow(self.handle, &mut window) })?;
        Ok(NativeWindow { handle: window })
    }

    /// Packs every image that becomes available and hands it over, then
    /// releases it back to the reader.
    pub fn set_frame_handoff(&mut self, handoff: FrameHandoff) -> MediaResult {
        unsafe extern "C" fn on_image_available(context: *mut c_void, reader: *mut AImageReader) {
            let handoff = unsafe { &*(context as *const FrameHandoff) };
            let mut image = Image::default();
            let status = unsafe { AImageReader_acquireNextImage(reader, &mut image.handle) };
            if status != media_status_t::AMEDIA_OK || image.handle.is_null() {
                return;
            }
            handoff.deliver(&image);
        }

        let handoff = Box::new(handoff);
        let mut listener = Box::new(AImageReader_ImageListener {
            context: (&*handoff as *const FrameHandoff) as *mut c_void,
            onImageAvailable: Some(on_image_available),
        });
        MediaStatus::check(unsafe { AImageReader_setImageListener(self.handle, listener.as_mut()) })?;

        self.handoff = Some(handoff);
        self.listener = Some(listener);
        Ok(())
    }
}
