/*!
    Frame filtering and scaling for the frame pipeline crates.

    Two stages live here:

    - [`FilterStage`] runs decoded frames through a compiled filter graph
      (frame-rate conversion, optional resize, output pixel format). The
      graph buffers across inputs, so one push never guarantees one output:
      pull until `NeedMoreInput` or `EndOfStream` after every push and after
      [`FilterStage::send_eof`].
    - [`ScaleStage`] converts filtered frames to the target geometry when
      they don't already match, rebuilding its scaler lazily.

    The engine work sits behind the [`FilterGraph`] and [`Scaler`] traits.
    With the `ffmpeg` feature (default), [`FfmpegGraph`] implements the graph
    on libavfilter and [`SwsScaler`] implements scaling on libswscale.
*/

mod config;
mod filter;
mod graph;
mod scale;

#[cfg(feature = "ffmpeg")]
mod avfilter;
#[cfg(feature = "ffmpeg")]
mod video;

pub use config::FilterConfig;
pub use filter::FilterStage;
pub use graph::{FilterGraph, GraphSpec};
pub use scale::{ScaleStage, Scaler};

#[cfg(feature = "ffmpeg")]
pub use avfilter::FfmpegGraph;
#[cfg(feature = "ffmpeg")]
pub use video::{ScalingAlgorithm, SwsScaler};

pub use ffmpeg_types::{Error, Flow, FrameGeometry, PixelFormat, Rational, Result, VideoFrame};
