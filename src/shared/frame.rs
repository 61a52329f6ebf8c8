// This is free and unencumbered software released into the public domain.

use alloc::borrow::Cow;
use bytes::Bytes;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    /// Planar YUV 4:2:0 as delivered by the capture source.
    Yuv420,
    /// Y plane followed by the chroma planes, V first.
    Nv21,
}

impl PixelFormat {
    /// The `ffmpeg -pix_fmt` name of the format.
    pub fn ffmpeg_name(&self) -> &'static str {
        match self {
            PixelFormat::Yuv420 => "yuv420p",
            PixelFormat::Nv21 => "nv21",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Frame {
    pub data: Bytes,
    pub width: u32,
    pub height: u32,
    /// Y row stride; camera planes may pad each row past `width`.
    pub stride: u32,
    pub pixel_format: PixelFormat,
    pub timestamp_ns: u64,
}

impl Frame {
    pub fn new_nv21(data: Bytes, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
            stride: width,
            pixel_format: PixelFormat::Nv21,
            timestamp_ns: 0,
        }
    }

    pub fn with_stride(mut self, stride: u32) -> Self {
        self.stride = stride.max(self.width);
        self
    }

    pub fn with_timestamp_ns(mut self, timestamp_ns: u64) -> Self {
        self.timestamp_ns = timestamp_ns;
        self
    }

    /// The luma plane as stored, row padding included. The last row may stop
    /// at `width`.
    pub fn luma(&self) -> Option<&[u8]> {
        let rows = (self.height as usize).checked_sub(1)?;
        let len = (self.stride as usize)
            .checked_mul(rows)?
            .checked_add(self.width as usize)?;
        self.data.get(..len)
    }

    /// The luma plane as `width * height` tightly packed pixels.
    pub fn luma_pixels(&self) -> Option<Cow<'_, [u8]>> {
        let luma = self.luma()?;
        if self.stride == self.width {
            return Some(Cow::Borrowed(luma));
        }
        let (stride, width) = (self.stride as usize, self.width as usize);
        let mut pixels = Vec::with_capacity(width * self.height as usize);
        for row in luma.chunks(stride) {
            pixels.extend_from_slice(row.get(..width)?);
        }
        Some(Cow::Owned(pixels))
    }
}
