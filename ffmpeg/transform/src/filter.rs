/*!
    Graph-based frame transformation stage.
*/

use ffmpeg_types::{Error, Flow, FrameGeometry, Result, VideoFrame};

use crate::config::FilterConfig;
use crate::graph::{FilterGraph, GraphSpec};

/**
    Runs frames through a compiled filter graph.

    The graph is built once, from the geometry of the first frame the stage
    sees. Frame-rate conversion makes the graph buffer across inputs: a push
    may yield nothing, one frame, or several, so every push and every
    [`send_eof`](Self::send_eof) is followed by pulling with
    [`filter_frame`](Self::filter_frame) until it stops returning `Ready`.
*/
pub struct FilterStage<G> {
    graph: G,
    input: FrameGeometry,
    target: FrameGeometry,
    eof_sent: bool,
    eof_received: bool,
    failed: bool,
    frames_in: u64,
    frames_out: u64,
}

impl<G: FilterGraph> FilterStage<G> {
    /**
        Compile a graph for frames shaped like `sample`.

        Fails with `Error::InvalidGeometry` when the sample has a zero
        dimension, the configured rate or size is zero, or the input time base
        is not positive. Graph compilation failures surface as
        `Error::GraphBuild`.
    */
    pub fn open(sample: &VideoFrame, config: &FilterConfig) -> Result<Self> {
        let input = sample.geometry();
        if !input.is_valid() {
            return Err(Error::invalid_geometry(format!("input frame is {input}")));
        }
        if config.output_frame_rate == 0 {
            return Err(Error::invalid_geometry("output frame rate must be positive"));
        }
        if !config.input_time_base.is_positive() {
            return Err(Error::invalid_geometry(format!(
                "input time base {} is not positive",
                config.input_time_base
            )));
        }
        if config.output_width == Some(0) || config.output_height == Some(0) {
            return Err(Error::invalid_geometry("output size must be positive"));
        }

        let spec = GraphSpec {
            input,
            input_time_base: config.input_time_base,
            sample_aspect_ratio: sample.sample_aspect_ratio,
            filters: config.filter_description(),
            output_format: config.output_format,
        };

        let graph = G::build(&spec).map_err(|e| match e {
            Error::GraphBuild { .. } => e,
            other => Error::graph_build(other.to_string()),
        })?;

        let target = config.target_geometry(input);
        tracing::debug!(
            input = %input,
            target = %target,
            filters = %spec.filters,
            "filter graph built"
        );

        Ok(Self {
            graph,
            input,
            target,
            eof_sent: false,
            eof_received: false,
            failed: false,
            frames_in: 0,
            frames_out: 0,
        })
    }

    /**
        The geometry the graph was built for.
    */
    pub fn input_geometry(&self) -> FrameGeometry {
        self.input
    }

    /**
        The geometry the graph was configured to emit.
    */
    pub fn target_geometry(&self) -> FrameGeometry {
        self.target
    }

    pub fn frames_in(&self) -> u64 {
        self.frames_in
    }

    pub fn frames_out(&self) -> u64 {
        self.frames_out
    }

    /**
        Returns true once the graph has reported end of stream.
    */
    pub fn is_finished(&self) -> bool {
        self.eof_received
    }

    /**
        Push a frame into the graph. The frame is only borrowed.

        Returns `EndOfStream` once the graph has drained, and `Busy` when end
        of input was already signalled and the graph no longer takes frames.
        Neither is an error: keep pulling.
    */
    pub fn send_frame(&mut self, frame: &VideoFrame) -> Result<Flow<()>> {
        if self.failed {
            return Err(Error::Unusable {
                stage: "filter stage",
            });
        }
        if self.eof_received {
            return Ok(Flow::EndOfStream);
        }

        match self.graph.push(Some(frame)) {
            Ok(Flow::Ready(())) => {
                self.frames_in += 1;
                Ok(Flow::Ready(()))
            }
            Ok(flow) if self.eof_sent => {
                tracing::trace!(?flow, "filter graph closed to input after end of input");
                Ok(Flow::Busy)
            }
            Ok(flow) => Err(self.fail(Error::graph(format!(
                "filter graph rejected a frame before end of input ({flow:?})"
            )))),
            Err(e) => Err(self.fail(e)),
        }
    }

    /**
        Pull the next filtered frame.

        `EndOfStream` is sticky: once seen, the graph is never consulted again.
    */
    pub fn filter_frame(&mut self) -> Result<Flow<VideoFrame>> {
        if self.failed {
            return Err(Error::Unusable {
                stage: "filter stage",
            });
        }
        if self.eof_received {
            return Ok(Flow::EndOfStream);
        }

        match self.graph.pull() {
            Ok(Flow::Ready(frame)) => {
                self.frames_out += 1;
                Ok(Flow::Ready(frame))
            }
            Ok(Flow::EndOfStream) => {
                tracing::debug!(
                    frames_in = self.frames_in,
                    frames_out = self.frames_out,
                    "filter graph drained"
                );
                self.eof_received = true;
                Ok(Flow::EndOfStream)
            }
            Ok(_) => Ok(Flow::NeedMoreInput),
            Err(e) => Err(self.fail(e)),
        }
    }

    /**
        Signal end of input so the graph releases what it buffered.

        Idempotent. Returns `NeedMoreInput` on success: drain with
        [`filter_frame`](Self::filter_frame) until `EndOfStream`.
    */
    pub fn send_eof(&mut self) -> Result<Flow<()>> {
        if self.failed {
            return Err(Error::Unusable {
                stage: "filter stage",
            });
        }
        if self.eof_sent || self.eof_received {
            return Ok(Flow::NeedMoreInput);
        }

        match self.graph.push(None) {
            Ok(_) => {
                self.eof_sent = true;
                tracing::debug!(frames_in = self.frames_in, "filter input closed");
                Ok(Flow::NeedMoreInput)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn fail(&mut self, error: Error) -> Error {
        self.failed = true;
        tracing::warn!(%error, "filter stage failed");
        match error {
            Error::Graph { .. } => error,
            other => Error::graph(other.to_string()),
        }
    }
}

impl<G> std::fmt::Debug for FilterStage<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterStage")
            .field("input", &self.input)
            .field("target", &self.target)
            .field("eof_sent", &self.eof_sent)
            .field("eof_received", &self.eof_received)
            .field("failed", &self.failed)
            .finish_non_exhaustive()
    }
}
