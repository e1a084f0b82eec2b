/*!
    Decoded frame types.
*/

use std::fmt;

use crate::{MediaDuration, PixelFormat, Pts, Rational};

/**
    The shape of a video frame: dimensions and pixel format.

    Scalers are cached per source geometry and the scale stage compares
    geometries to decide whether conversion is needed.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

impl FrameGeometry {
    pub const fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
        }
    }

    /**
        Returns true if both dimensions are positive.
    */
    pub const fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /**
        Returns the size in bytes of a tightly packed frame with this geometry.
    */
    pub fn buffer_size(&self) -> usize {
        self.format.buffer_size(self.width, self.height)
    }
}

impl fmt::Display for FrameGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} {}", self.width, self.height, self.format)
    }
}

/**
    A decoded video frame.

    Pixel data is stored tightly packed, plane after plane, following
    [`PixelFormat::planes`].
*/
#[derive(Clone, Debug, PartialEq)]
pub struct VideoFrame {
    /// Raw pixel data.
    pub data: Vec<u8>,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Pixel format of the data.
    pub format: PixelFormat,
    /// Presentation timestamp (None for frames without timing).
    pub pts: Option<Pts>,
    /// Frame duration, when the producer knows it.
    pub duration: Option<MediaDuration>,
    /// Time base for interpreting the PTS and duration.
    pub time_base: Rational,
    /// Sample (pixel) aspect ratio, `Rational::UNKNOWN` when unset.
    pub sample_aspect_ratio: Rational,
}

impl VideoFrame {
    /**
        Create a new video frame.
    */
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: PixelFormat,
        pts: Option<Pts>,
        time_base: Rational,
    ) -> Self {
        Self {
            data,
            width,
            height,
            format,
            pts,
            duration: None,
            time_base,
            sample_aspect_ratio: Rational::UNKNOWN,
        }
    }

    /**
        Create a zero-filled frame with the given geometry and no timing.
    */
    pub fn blank(geometry: FrameGeometry, time_base: Rational) -> Self {
        Self::new(
            vec![0; geometry.buffer_size()],
            geometry.width,
            geometry.height,
            geometry.format,
            None,
            time_base,
        )
    }

    pub fn geometry(&self) -> FrameGeometry {
        FrameGeometry::new(self.width, self.height, self.format)
    }

    /**
        Copy timing and aspect ratio from `other`.
    */
    pub fn copy_metadata_from(&mut self, other: &VideoFrame) {
        self.pts = other.pts;
        self.duration = other.duration;
        self.time_base = other.time_base;
        self.sample_aspect_ratio = other.sample_aspect_ratio;
    }

    /**
        Returns the presentation time as a Duration, if PTS is set.
    */
    pub fn presentation_time(&self) -> Option<std::time::Duration> {
        self.pts.map(|pts| pts.to_duration(self.time_base))
    }
}

static_assertions::assert_impl_all!(VideoFrame: Send, Sync);
static_assertions::assert_impl_all!(FrameGeometry: Send, Sync, Copy);
