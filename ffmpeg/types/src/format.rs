/*!
    Pixel format types.
*/

use std::fmt;
use std::str::FromStr;

/**
    Video pixel formats.

    The formats decoders commonly emit, plus the packed RGB layouts used as
    output targets. Full-range (JPEG) YUV keeps its own variants so the
    range survives the trip into the filter graph. Engine formats outside
    this set are rejected at the backend boundary.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Planar YUV 4:2:0, 12bpp (most common video format)
    Yuv420p,
    /// Planar YUV 4:2:0, full range (MJPEG)
    Yuvj420p,
    /// Semi-planar YUV 4:2:0, 12bpp (common hardware decoder output)
    Nv12,
    /// Packed BGRA, 32bpp
    Bgra,
    /// Packed RGBA, 32bpp
    Rgba,
    /// Packed RGB, 24bpp
    Rgb24,
    /// Packed BGR, 24bpp
    Bgr24,
    /// Planar YUV 4:2:2, 16bpp
    Yuv422p,
    /// Planar YUV 4:2:2, full range
    Yuvj422p,
    /// Planar YUV 4:4:4, 24bpp
    Yuv444p,
    /// Planar YUV 4:4:4, full range
    Yuvj444p,
    /// Planar YUV 4:2:0, 10-bit little-endian
    Yuv420p10,
    /// Planar YUV 4:2:2, 10-bit little-endian (ProRes, DNxHR)
    Yuv422p10,
    /// Planar YUV 4:4:4, 10-bit little-endian
    Yuv444p10,
    /// Planar YUV 4:2:0, 12-bit little-endian
    Yuv420p12,
    /// Semi-planar YUV 4:2:0, 10-bit little-endian
    P010le,
    /// Single 8-bit luma plane
    Gray,
}

/**
    Byte layout of one plane of a tightly packed frame buffer.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaneSize {
    /// Bytes of visible data per row.
    pub row_bytes: usize,
    /// Number of rows.
    pub rows: usize,
}

impl PlaneSize {
    pub const fn len(self) -> usize {
        self.row_bytes * self.rows
    }

    pub const fn is_empty(self) -> bool {
        self.len() == 0
    }
}

impl PixelFormat {
    pub const ALL: [Self; 17] = [
        Self::Yuv420p,
        Self::Yuvj420p,
        Self::Nv12,
        Self::Bgra,
        Self::Rgba,
        Self::Rgb24,
        Self::Bgr24,
        Self::Yuv422p,
        Self::Yuvj422p,
        Self::Yuv444p,
        Self::Yuvj444p,
        Self::Yuv420p10,
        Self::Yuv422p10,
        Self::Yuv444p10,
        Self::Yuv420p12,
        Self::P010le,
        Self::Gray,
    ];

    /**
        Returns the plane layout of a tightly packed `width` x `height` frame.

        Chroma dimensions round up, matching how the engine sizes odd frames.
    */
    pub fn planes(self, width: u32, height: u32) -> Vec<PlaneSize> {
        let w = width as usize;
        let h = height as usize;
        let half_w = w.div_ceil(2);
        let half_h = h.div_ceil(2);
        let plane = |row_bytes, rows| PlaneSize { row_bytes, rows };

        match self {
            Self::Bgra | Self::Rgba => vec![plane(w * 4, h)],
            Self::Rgb24 | Self::Bgr24 => vec![plane(w * 3, h)],
            Self::Gray => vec![plane(w, h)],
            Self::Yuv420p | Self::Yuvj420p => {
                vec![plane(w, h), plane(half_w, half_h), plane(half_w, half_h)]
            }
            Self::Yuv422p | Self::Yuvj422p => {
                vec![plane(w, h), plane(half_w, h), plane(half_w, h)]
            }
            Self::Yuv444p | Self::Yuvj444p => vec![plane(w, h), plane(w, h), plane(w, h)],
            Self::Yuv420p10 | Self::Yuv420p12 => vec![
                plane(w * 2, h),
                plane(half_w * 2, half_h),
                plane(half_w * 2, half_h),
            ],
            Self::Yuv422p10 => vec![plane(w * 2, h), plane(half_w * 2, h), plane(half_w * 2, h)],
            Self::Yuv444p10 => vec![plane(w * 2, h), plane(w * 2, h), plane(w * 2, h)],
            Self::Nv12 => vec![plane(w, h), plane(half_w * 2, half_h)],
            Self::P010le => vec![plane(w * 2, h), plane(half_w * 4, half_h)],
        }
    }

    /**
        Returns the size in bytes of a tightly packed `width` x `height` frame.
    */
    pub fn buffer_size(self, width: u32, height: u32) -> usize {
        self.planes(width, height).iter().map(|p| p.len()).sum()
    }

    /**
        Returns the short lowercase name used on the command line and in logs.
    */
    pub const fn name(self) -> &'static str {
        match self {
            Self::Yuv420p => "yuv420p",
            Self::Yuvj420p => "yuvj420p",
            Self::Nv12 => "nv12",
            Self::Bgra => "bgra",
            Self::Rgba => "rgba",
            Self::Rgb24 => "rgb24",
            Self::Bgr24 => "bgr24",
            Self::Yuv422p => "yuv422p",
            Self::Yuvj422p => "yuvj422p",
            Self::Yuv444p => "yuv444p",
            Self::Yuvj444p => "yuvj444p",
            Self::Yuv420p10 => "yuv420p10le",
            Self::Yuv422p10 => "yuv422p10le",
            Self::Yuv444p10 => "yuv444p10le",
            Self::Yuv420p12 => "yuv420p12le",
            Self::P010le => "p010le",
            Self::Gray => "gray",
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PixelFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.name() == lower)
            .ok_or_else(|| format!("unknown pixel format '{s}'"))
    }
}
