/*!
    Demux, decode, filter and scale video frames.

    A [`Pipeline`] reads packets from a demuxer and runs each registered
    stream through its own decoder, filter graph and scaler, handing out
    finished frames one at a time:

    ```ignore
    let config = FilterConfig::new(Rational::new(1, 90000), 30, PixelFormat::Rgba)
        .with_size(1280, 720);
    let mut pipeline = FfmpegPipeline::open("input.mp4", config)?;

    while let Flow::Ready(output) = pipeline.next_frame()? {
        // output.stream_index, output.frame
    }
    ```

    Every stage is generic over its engine, so the pipeline runs just as well
    on scripted engines as on FFmpeg (the default `ffmpeg` feature).
*/

mod pipeline;

pub use pipeline::{OutputFrame, Pipeline, PipelineStats};

#[cfg(feature = "ffmpeg")]
pub use pipeline::FfmpegPipeline;

pub use ffmpeg_decode::{DecodeEngine, Decoder, DecoderState};
pub use ffmpeg_source::{Demuxer, PacketReader};
pub use ffmpeg_transform::{FilterConfig, FilterGraph, FilterStage, GraphSpec, ScaleStage, Scaler};
pub use ffmpeg_types::{
    Error, Flow, FrameGeometry, Packet, PixelFormat, Rational, Result, StreamDescriptor,
    VideoFrame,
};
