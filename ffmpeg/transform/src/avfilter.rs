/*!
    libavfilter-backed filter graph.
*/

use ffmpeg_next::{ffi, filter, util::frame::video::Video as VideoFrameFFmpeg};

use ffmpeg_source::{frame_from_ffmpeg, frame_to_ffmpeg, pixel_format_to_ffmpeg, rational_from_ffmpeg};
use ffmpeg_types::{Error, Flow, Rational, Result, VideoFrame};

use crate::graph::{FilterGraph, GraphSpec};

const SOURCE: &str = "in";
const SINK: &str = "out";

/**
    A `buffer -> <filters> -> buffersink` graph.
*/
pub struct FfmpegGraph {
    graph: filter::Graph,
    output_time_base: Rational,
}

impl FfmpegGraph {
    /**
        Time base of frames leaving the sink.
    */
    pub fn output_time_base(&self) -> Rational {
        self.output_time_base
    }

    fn context(&mut self, name: &str) -> Result<filter::Context<'_>> {
        self.graph
            .get(name)
            .ok_or_else(|| Error::graph(format!("filter graph has no '{name}' endpoint")))
    }
}

fn source_args(spec: &GraphSpec) -> String {
    let sar = if spec.sample_aspect_ratio.is_positive() {
        spec.sample_aspect_ratio
    } else {
        Rational::new(1, 1)
    };
    format!(
        "video_size={}x{}:pix_fmt={}:time_base={}/{}:pixel_aspect={}/{}",
        spec.input.width,
        spec.input.height,
        ffi::AVPixelFormat::from(pixel_format_to_ffmpeg(spec.input.format)) as i32,
        spec.input_time_base.num,
        spec.input_time_base.den,
        sar.num,
        sar.den,
    )
}

impl FilterGraph for FfmpegGraph {
    fn build(spec: &GraphSpec) -> Result<Self> {
        ffmpeg_next::init().map_err(|e| Error::graph_build(e.to_string()))?;

        let build_err = |e: ffmpeg_next::Error| Error::graph_build(e.to_string());

        let buffer = filter::find("buffer")
            .ok_or_else(|| Error::graph_build("buffer filter unavailable"))?;
        let buffersink = filter::find("buffersink")
            .ok_or_else(|| Error::graph_build("buffersink filter unavailable"))?;

        let mut graph = filter::Graph::new();
        graph
            .add(&buffer, SOURCE, &source_args(spec))
            .map_err(build_err)?;
        graph.add(&buffersink, SINK, "").map_err(build_err)?;

        graph
            .get(SINK)
            .ok_or_else(|| Error::graph_build("buffersink missing after add"))?
            .set_pixel_format(pixel_format_to_ffmpeg(spec.output_format));

        graph
            .output(SOURCE, 0)
            .and_then(|parser| parser.input(SINK, 0))
            .and_then(|parser| parser.parse(&spec.filters))
            .map_err(build_err)?;
        graph.validate().map_err(build_err)?;

        let output_time_base = {
            let sink = graph
                .get(SINK)
                .ok_or_else(|| Error::graph_build("buffersink missing after validate"))?;
            // SAFETY: the sink context belongs to the validated graph held above.
            let tb = unsafe { ffi::av_buffersink_get_time_base(sink.as_ptr()) };
            rational_from_ffmpeg(tb.into())
        };

        Ok(Self {
            graph,
            output_time_base,
        })
    }

    fn push(&mut self, frame: Option<&VideoFrame>) -> Result<Flow<()>> {
        let result = match frame {
            Some(frame) => {
                let ffmpeg_frame = frame_to_ffmpeg(frame)?;
                self.context(SOURCE)?.source().add(&ffmpeg_frame)
            }
            None => self.context(SOURCE)?.source().flush(),
        };

        match result {
            Ok(()) => Ok(Flow::Ready(())),
            Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => {
                Ok(Flow::NeedMoreInput)
            }
            Err(ffmpeg_next::Error::Eof) => Ok(Flow::EndOfStream),
            Err(e) => Err(Error::graph(e.to_string())),
        }
    }

    fn pull(&mut self) -> Result<Flow<VideoFrame>> {
        let time_base = self.output_time_base;
        let mut filtered = VideoFrameFFmpeg::empty();

        match self.context(SINK)?.sink().frame(&mut filtered) {
            Ok(()) => frame_from_ffmpeg(&filtered, time_base).map(Flow::Ready),
            Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => {
                Ok(Flow::NeedMoreInput)
            }
            Err(ffmpeg_next::Error::Eof) => Ok(Flow::EndOfStream),
            Err(e) => Err(Error::graph(e.to_string())),
        }
    }
}

impl std::fmt::Debug for FfmpegGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegGraph")
            .field("output_time_base", &self.output_time_base)
            .finish_non_exhaustive()
    }
}
