/*!
    Filter graph seam.
*/

use ffmpeg_types::{Flow, FrameGeometry, PixelFormat, Rational, Result, VideoFrame};

/**
    Everything needed to compile a graph: the buffer source parameters, the
    filter chain, and the sink's pixel format.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct GraphSpec {
    /// Geometry of frames pushed into the source.
    pub input: FrameGeometry,
    /// Time base of frames pushed into the source.
    pub input_time_base: Rational,
    /// Sample aspect ratio of frames pushed into the source.
    pub sample_aspect_ratio: Rational,
    /// Filter chain between source and sink, e.g. `fps=30,scale=640:360`.
    pub filters: String,
    /// Pixel format the sink is constrained to.
    pub output_format: PixelFormat,
}

/**
    A compiled graph with one source and one sink.

    Implementations translate engine status codes only:

    - `push`: `Ready(())` accepted, `NeedMoreInput` when the source is not
      ready for more, `EndOfStream` when the source is already closed.
    - `pull`: `Ready(frame)`, `NeedMoreInput`, or `EndOfStream` once the sink
      is drained after end of input.

    Sticky end-of-stream and the tolerance rules around EOF live in
    [`FilterStage`](crate::FilterStage).
*/
pub trait FilterGraph: Sized {
    /**
        Compile a graph. Failures are reported as `Error::GraphBuild`.
    */
    fn build(spec: &GraphSpec) -> Result<Self>;

    /**
        Push a frame into the source, or `None` to signal end of input.
    */
    fn push(&mut self, frame: Option<&VideoFrame>) -> Result<Flow<()>>;

    /**
        Pull the next frame from the sink.
    */
    fn pull(&mut self) -> Result<Flow<VideoFrame>>;
}
