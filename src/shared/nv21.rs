// This is free and unencumbered software released into the public domain.

//! Packing of YUV 4:2:0 planes into one NV21 buffer.
//!
//! The planes are concatenated as they come: any row padding beyond the
//! valid bytes of a plane is not part of its remaining length, so it never
//! reaches the output. Chroma is not re-interleaved; a semi-planar source
//! (pixel stride 2) already holds the VU pairs in its V plane.

use super::{CameraError, ImagePlane, PackedFrame};
use bytes::BytesMut;

/// A captured YUV 4:2:0 image exposing its three planes.
///
/// Plane indices follow the capture convention: 0 is Y, 1 is U (Cb) and
/// 2 is V (Cr).
pub trait Yuv420Image {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn plane(&self, index: usize) -> Option<ImagePlane<'_>>;

    /// Distance in bytes between the starts of consecutive Y rows.
    fn luma_row_stride(&self) -> u32 {
        self.width()
    }

    fn timestamp_ns(&self) -> u64 {
        0
    }
}

/// Concatenates the remaining bytes of `y`, `u` and `v`, in that order.
///
/// Every plane is read to its end. Fails with [`CameraError::InvalidFrame`]
/// when a plane is absent, in which case no plane is read.
pub fn pack(
    y: Option<&mut ImagePlane<'_>>,
    u: Option<&mut ImagePlane<'_>>,
    v: Option<&mut ImagePlane<'_>>,
) -> Result<PackedFrame, CameraError> {
    let y = y.ok_or(CameraError::InvalidFrame("missing Y plane"))?;
    let u = u.ok_or(CameraError::InvalidFrame("missing U plane"))?;
    let v = v.ok_or(CameraError::InvalidFrame("missing V plane"))?;

    let (y_len, u_len, v_len) = (y.remaining(), u.remaining(), v.remaining());

    let mut out = BytesMut::with_capacity(y_len + u_len + v_len);
    out.extend_from_slice(y.take_remaining());
    out.extend_from_slice(u.take_remaining());
    out.extend_from_slice(v.take_remaining());

    Ok(PackedFrame::from_parts(out.freeze(), y_len, u_len))
}

/// Packs a captured image into NV21 order: Y, then V, then U.
pub fn pack_image(image: &impl Yuv420Image) -> Result<PackedFrame, CameraError> {
    let mut y = image.plane(0);
    let mut cb = image.plane(1);
    let mut cr = image.plane(2);
    pack(y.as_mut(), cr.as_mut(), cb.as_mut())
}

/// A contiguous planar I420 buffer (`ffmpeg -pix_fmt yuv420p`).
#[derive(Clone, Debug)]
pub struct I420Buffer<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    timestamp_ns: u64,
}

impl<'a> I420Buffer<'a> {
    pub fn new(data: &'a [u8], width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
            timestamp_ns: 0,
        }
    }

    pub fn with_timestamp_ns(mut self, timestamp_ns: u64) -> Self {
        self.timestamp_ns = timestamp_ns;
        self
    }

    /// Byte size of one frame of the given dimensions.
    pub fn frame_size(width: u32, height: u32) -> usize {
        let luma = width as usize * height as usize;
        luma + 2 * Self::chroma_size(width, height)
    }

    fn chroma_size(width: u32, height: u32) -> usize {
        width.div_ceil(2) as usize * height.div_ceil(2) as usize
    }

    fn plane_range(&self, index: usize) -> Option<core::ops::Range<usize>> {
        let luma = self.width as usize * self.height as usize;
        let chroma = Self::chroma_size(self.width, self.height);
        let range = match index {
            0 => 0..luma,
            1 => luma..luma + chroma,
            2 => luma + chroma..luma + 2 * chroma,
            _ => return None,
        };
        (range.end <= self.data.len()).then_some(range)
    }
}

impl Yuv420Image for I420Buffer<'_> {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn plane(&self, index: usize) -> Option<ImagePlane<'_>> {
        self.plane_range(index)
            .map(|range| ImagePlane::new(&self.data[range]))
    }

    fn timestamp_ns(&self) -> u64 {
        self.timestamp_ns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn i420_planes_split_at_quarter_chroma() {
        let data: Vec<u8> = (0..24).collect();
        let image = I420Buffer::new(&data, 4, 4);
        assert_eq!(I420Buffer::frame_size(4, 4), 24);
        assert_eq!(image.plane(0).map(|p| p.remaining()), Some(16));
        assert_eq!(image.plane(1).map(|p| p.as_slice().to_vec()), Some(vec![16, 17, 18, 19]));
        assert_eq!(image.plane(2).map(|p| p.as_slice().to_vec()), Some(vec![20, 21, 22, 23]));
        assert!(image.plane(3).is_none());
    }

    #[test]
    fn odd_dimensions_round_chroma_up() {
        assert_eq!(I420Buffer::frame_size(3, 3), 9 + 2 * 4);
    }

    #[test]
    fn truncated_buffer_is_missing_planes() {
        let data = vec![0u8; 18];
        let image = I420Buffer::new(&data, 4, 4);
        assert!(image.plane(0).is_some());
        assert!(image.plane(2).is_none());
        assert!(matches!(pack_image(&image), Err(CameraError::InvalidFrame(_))));
    }

    #[test]
    fn image_is_packed_v_before_u() {
        let data: Vec<u8> = (0..24).collect();
        let frame = pack_image(&I420Buffer::new(&data, 4, 4)).unwrap();
        assert_eq!(frame.len(), 24);
        assert_eq!(&frame.as_bytes()[16..20], &[20, 21, 22, 23]);
        assert_eq!(&frame.as_bytes()[20..], &[16, 17, 18, 19]);
    }
}
