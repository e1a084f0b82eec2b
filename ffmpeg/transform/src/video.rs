/*!
    libswscale-backed scaler.
*/

use ffmpeg_next::software::scaling::{context::Context as ScalerContext, flag::Flags as ScalerFlags};

use ffmpeg_source::{frame_from_ffmpeg, frame_to_ffmpeg, pixel_format_to_ffmpeg};
use ffmpeg_types::{Error, FrameGeometry, Result, VideoFrame};

use crate::scale::Scaler;

/**
    Scaling algorithm for video resizing.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScalingAlgorithm {
    /// Nearest neighbor - fastest, lowest quality.
    Nearest,
    /// Bilinear interpolation - fast, acceptable quality.
    #[default]
    Bilinear,
    /// Bicubic interpolation - moderate speed, good quality.
    Bicubic,
    /// Lanczos resampling - slowest, highest quality.
    Lanczos,
}

impl ScalingAlgorithm {
    fn to_ffmpeg_flags(self) -> ScalerFlags {
        match self {
            Self::Nearest => ScalerFlags::POINT,
            Self::Bilinear => ScalerFlags::BILINEAR,
            Self::Bicubic => ScalerFlags::BICUBIC,
            Self::Lanczos => ScalerFlags::LANCZOS,
        }
    }
}

/**
    Software scaler converting between two fixed geometries.

    [`Scaler::build`] uses [`ScalingAlgorithm::Bilinear`]; use
    [`SwsScaler::with_algorithm`] directly for anything else.
*/
pub struct SwsScaler {
    context: ScalerContext,
    target: FrameGeometry,
}

impl SwsScaler {
    pub fn with_algorithm(
        source: FrameGeometry,
        target: FrameGeometry,
        algorithm: ScalingAlgorithm,
    ) -> Result<Self> {
        let context = ScalerContext::get(
            pixel_format_to_ffmpeg(source.format),
            source.width,
            source.height,
            pixel_format_to_ffmpeg(target.format),
            target.width,
            target.height,
            algorithm.to_ffmpeg_flags(),
        )
        .map_err(|e| Error::scaler_init(format!("{source} -> {target}: {e}")))?;

        Ok(Self { context, target })
    }
}

impl Scaler for SwsScaler {
    fn build(source: FrameGeometry, target: FrameGeometry) -> Result<Self> {
        Self::with_algorithm(source, target, ScalingAlgorithm::default())
    }

    fn convert(&mut self, source: &VideoFrame, destination: &mut VideoFrame) -> Result<()> {
        let src_frame = frame_to_ffmpeg(source).map_err(|e| Error::conversion(e.to_string()))?;
        let mut dst_frame = ffmpeg_next::util::frame::video::Video::new(
            pixel_format_to_ffmpeg(self.target.format),
            self.target.width,
            self.target.height,
        );

        self.context
            .run(&src_frame, &mut dst_frame)
            .map_err(|e| Error::conversion(format!("scaling failed: {e}")))?;

        let converted = frame_from_ffmpeg(&dst_frame, source.time_base)
            .map_err(|e| Error::conversion(e.to_string()))?;
        destination.data = converted.data;
        Ok(())
    }
}

impl std::fmt::Debug for SwsScaler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwsScaler")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use ffmpeg_types::{PixelFormat, Pts, Rational};

    use super::*;
    use crate::scale::ScaleStage;

    const TB: Rational = Rational { num: 1, den: 30 };

    #[test]
    fn converts_to_target_geometry() {
        let source = FrameGeometry::new(16, 8, PixelFormat::Yuv420p);
        let target = FrameGeometry::new(8, 4, PixelFormat::Rgba);
        let mut scaler = SwsScaler::build(source, target).unwrap();

        let mut input = VideoFrame::blank(source, TB);
        input.data.fill(128);
        let mut output = VideoFrame::blank(target, TB);
        scaler.convert(&input, &mut output).unwrap();

        assert_eq!(output.geometry(), target);
        assert_eq!(output.data.len(), 8 * 4 * 4);
        assert!(output.data.chunks(4).all(|px| px[3] == 255));
    }

    #[test]
    fn scale_stage_drives_the_software_scaler() {
        let target = FrameGeometry::new(9, 5, PixelFormat::Bgra);
        let mut stage = ScaleStage::<SwsScaler>::new(target);

        let mut input = VideoFrame::blank(FrameGeometry::new(13, 7, PixelFormat::Yuvj420p), TB);
        input.pts = Some(Pts(12));
        let output = stage.process(input).unwrap();

        assert_eq!(output.geometry(), target);
        assert_eq!(output.pts, Some(Pts(12)));
        assert_eq!(stage.rebuilds(), 1);
        assert!(stage.is_engaged());
    }

    #[test]
    fn every_algorithm_builds() {
        let source = FrameGeometry::new(16, 16, PixelFormat::Nv12);
        let target = FrameGeometry::new(4, 4, PixelFormat::Yuv420p);
        for algorithm in [
            ScalingAlgorithm::Nearest,
            ScalingAlgorithm::Bilinear,
            ScalingAlgorithm::Bicubic,
            ScalingAlgorithm::Lanczos,
        ] {
            assert!(SwsScaler::with_algorithm(source, target, algorithm).is_ok());
        }
    }
}
