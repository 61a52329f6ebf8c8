// This is free and unencumbered software released into the public domain.

use bytes::Bytes;
use core::ops::Range;

/// A borrowed view over one colour plane of a captured image.
///
/// The plane carries a read position: only the bytes between the position and
/// the end of the buffer are valid, and reading them advances the position.
#[derive(Clone, Debug)]
pub struct ImagePlane<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ImagePlane<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Number of valid (unread) bytes.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    #[inline]
    pub fn has_remaining(&self) -> bool {
        self.remaining() > 0
    }

    /// The valid bytes, without consuming them.
    #[inline]
    pub fn as_slice(&self) -> &'a [u8] {
        &self.data[self.position..]
    }

    /// Skips `count` bytes, clamped to what remains.
    pub fn advance(&mut self, count: usize) {
        self.position += count.min(self.remaining());
    }

    /// Consumes and returns every remaining byte.
    pub fn take_remaining(&mut self) -> &'a [u8] {
        let rest = self.as_slice();
        self.position = self.data.len();
        rest
    }
}

impl<'a> From<&'a [u8]> for ImagePlane<'a> {
    fn from(data: &'a [u8]) -> Self {
        Self::new(data)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for ImagePlane<'a> {
    fn from(data: &'a [u8; N]) -> Self {
        Self::new(data)
    }
}

/// One owned frame holding the Y, U and V segments back to back.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PackedFrame {
    data: Bytes,
    y_len: usize,
    u_len: usize,
}

impl PackedFrame {
    pub(crate) fn from_parts(data: Bytes, y_len: usize, u_len: usize) -> Self {
        debug_assert!(y_len + u_len <= data.len());
        Self { data, y_len, u_len }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Bytes {
        self.data
    }

    pub fn y_range(&self) -> Range<usize> {
        0..self.y_len
    }

    pub fn u_range(&self) -> Range<usize> {
        self.y_len..self.y_len + self.u_len
    }

    pub fn v_range(&self) -> Range<usize> {
        self.y_len + self.u_len..self.data.len()
    }

    pub fn y(&self) -> &[u8] {
        &self.data[self.y_range()]
    }

    pub fn u(&self) -> &[u8] {
        &self.data[self.u_range()]
    }

    pub fn v(&self) -> &[u8] {
        &self.data[self.v_range()]
    }
}

impl AsRef<[u8]> for PackedFrame {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
