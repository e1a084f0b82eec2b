/*!
    Stream information types.
*/

use crate::{CodecId, MediaType, PixelFormat, Rational};

/**
    Static parameters of one stream in a container.

    Owned by the demuxer and handed out by reference; the position of a
    descriptor in the demuxer's stream list equals its `index`.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct StreamDescriptor {
    /// Position of this stream in the container.
    pub index: usize,
    /// Codec used, or None for codecs outside [`CodecId`].
    pub codec_id: Option<CodecId>,
    /// Kind of media carried.
    pub media_type: MediaType,
    /// Time base for packet timestamps.
    pub time_base: Rational,
    /// Frame rate (may be unavailable).
    pub frame_rate: Option<Rational>,
    /// Frame width in pixels (0 for non-video streams).
    pub width: u32,
    /// Frame height in pixels (0 for non-video streams).
    pub height: u32,
    /// Pixel format, if video and recognised.
    pub pixel_format: Option<PixelFormat>,
}

impl StreamDescriptor {
    /**
        Create a descriptor for a video stream.
    */
    pub fn video(
        index: usize,
        codec_id: CodecId,
        time_base: Rational,
        width: u32,
        height: u32,
        pixel_format: PixelFormat,
    ) -> Self {
        Self {
            index,
            codec_id: Some(codec_id),
            media_type: MediaType::Video,
            time_base,
            frame_rate: None,
            width,
            height,
            pixel_format: Some(pixel_format),
        }
    }

    pub fn with_frame_rate(mut self, frame_rate: Rational) -> Self {
        self.frame_rate = Some(frame_rate);
        self
    }

    pub fn is_video(&self) -> bool {
        self.media_type == MediaType::Video
    }

    /**
        Returns the frame rate as fps, if available.
    */
    pub fn fps(&self) -> Option<f64> {
        self.frame_rate.map(|r| r.to_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_descriptor() {
        let stream = StreamDescriptor::video(
            0,
            CodecId::H264,
            Rational::new(1, 90000),
            1920,
            1080,
            PixelFormat::Yuv420p,
        )
        .with_frame_rate(Rational::new(30, 1));

        assert!(stream.is_video());
        assert_eq!(stream.fps(), Some(30.0));
        assert_eq!(stream.pixel_format, Some(PixelFormat::Yuv420p));
    }

    #[test]
    fn fps_unavailable() {
        let stream = StreamDescriptor {
            index: 1,
            codec_id: None,
            media_type: MediaType::Audio,
            time_base: Rational::new(1, 48000),
            frame_rate: None,
            width: 0,
            height: 0,
            pixel_format: None,
        };

        assert!(!stream.is_video());
        assert_eq!(stream.fps(), None);
    }
}
