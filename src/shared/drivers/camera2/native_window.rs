// This is free and unencumbered software released into the public domain.

use ndk_sys::ANativeWindow;

/// A surface borrowed from its producer (here, an image reader); not
/// released by this handle.
#[derive(Clone, Copy, Debug)]
pub struct NativeWindow {
    pub(crate) handle: *mut ANativeWindow,
}
