/*!
    Cooperative driver moving packets through every stage.
*/

use std::collections::{BTreeMap, VecDeque};
use std::ops::ControlFlow;
use std::time::Duration;

use ffmpeg_decode::{DecodeEngine, Decoder};
use ffmpeg_source::{Demuxer, PacketReader};
use ffmpeg_transform::{FilterConfig, FilterGraph, FilterStage, ScaleStage, Scaler};
use ffmpeg_types::{Error, Flow, Packet, Result, VideoFrame};

/**
    A frame that made it through every stage of a stream's chain.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct OutputFrame {
    pub stream_index: usize,
    pub frame: VideoFrame,
}

/**
    Counters collected while the pipeline runs.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Packets read from the demuxer.
    pub packets_read: u64,
    /// Packets for streams without a registered decoder.
    pub packets_dropped: u64,
    pub frames_decoded: u64,
    pub frames_filtered: u64,
    /// Frames that went through a scaler rather than passing through.
    pub frames_scaled: u64,
    /// Frames handed to the caller.
    pub frames_emitted: u64,
}

/**
    Decoder, filter and scaler for one stream.

    The filter and scaler are created from the first decoded frame, since
    the graph needs the real frame geometry.
*/
struct Chain<D, G, S> {
    decoder: Decoder<D>,
    filter: Option<FilterStage<G>>,
    scale: Option<ScaleStage<S>>,
}

/**
    Where a chain's finished frames go.
*/
struct Sink<'a> {
    config: &'a FilterConfig,
    output: &'a mut VecDeque<OutputFrame>,
    stats: &'a mut PipelineStats,
}

impl<D: DecodeEngine, G: FilterGraph, S: Scaler> Chain<D, G, S> {
    fn new(decoder: Decoder<D>) -> Self {
        Self {
            decoder,
            filter: None,
            scale: None,
        }
    }

    fn stream_index(&self) -> usize {
        self.decoder.stream_index()
    }

    /**
        Submit a packet, draining decoded frames whenever the decoder is busy.
    */
    fn submit(&mut self, packet: &Packet, sink: &mut Sink<'_>) -> Result<()> {
        loop {
            match self.decoder.send_packet(packet)? {
                Flow::Ready(()) => break,
                Flow::Busy => {
                    if self.drain_decoder(sink)? == 0 {
                        return Err(Error::fatal_decode(format!(
                            "decoder for stream {} stayed busy with no frames to drain",
                            self.stream_index()
                        )));
                    }
                }
                Flow::EndOfStream => {
                    tracing::warn!(
                        stream = self.stream_index(),
                        "packet after end of stream dropped"
                    );
                    break;
                }
                Flow::NeedMoreInput => break,
            }
        }
        self.drain_decoder(sink)?;
        Ok(())
    }

    /**
        Pull every frame the decoder has ready. Returns how many there were.
    */
    fn drain_decoder(&mut self, sink: &mut Sink<'_>) -> Result<usize> {
        let mut drained = 0;
        while let Flow::Ready(frame) = self.decoder.decode_next_frame()? {
            sink.stats.frames_decoded += 1;
            drained += 1;
            self.filter(frame, sink)?;
        }
        Ok(drained)
    }

    fn filter(&mut self, frame: VideoFrame, sink: &mut Sink<'_>) -> Result<()> {
        let filter = match self.filter.take() {
            Some(filter) => filter,
            None => {
                let config = sink
                    .config
                    .clone()
                    .with_input_time_base(self.decoder.time_base());
                let filter = FilterStage::open(&frame, &config)?;
                // A scaler that survived a seek keeps its activation.
                let target = filter.target_geometry();
                if self.scale.as_ref().is_none_or(|scale| scale.target() != target) {
                    self.scale = Some(ScaleStage::new(target));
                }
                filter
            }
        };
        let filter = self.filter.insert(filter);

        match filter.send_frame(&frame)? {
            Flow::EndOfStream => {
                tracing::warn!(
                    stream = self.decoder.stream_index(),
                    "frame after filter end of stream dropped"
                );
                return Ok(());
            }
            flow => tracing::trace!(?flow, "frame pushed to filter"),
        }
        self.drain_filter(sink)?;
        Ok(())
    }

    /**
        Pull every frame the graph has ready and queue it. Returns true once
        the graph reports end of stream.
    */
    fn drain_filter(&mut self, sink: &mut Sink<'_>) -> Result<bool> {
        let (Some(filter), Some(scale)) = (&mut self.filter, &mut self.scale) else {
            return Ok(true);
        };
        let stream_index = self.decoder.stream_index();

        loop {
            match filter.filter_frame()? {
                Flow::Ready(frame) => {
                    sink.stats.frames_filtered += 1;
                    let scaled_before = scale.frames_scaled();
                    let frame = scale.process(frame)?;
                    sink.stats.frames_scaled += scale.frames_scaled() - scaled_before;
                    sink.output.push_back(OutputFrame {
                        stream_index,
                        frame,
                    });
                }
                Flow::EndOfStream => return Ok(true),
                Flow::NeedMoreInput | Flow::Busy => return Ok(false),
            }
        }
    }

    /**
        Flush the decoder and the graph, queueing everything still buffered.
    */
    fn finish(&mut self, sink: &mut Sink<'_>) -> Result<()> {
        loop {
            match self.decoder.send_flush()? {
                Flow::Busy => {
                    if self.drain_decoder(sink)? == 0 {
                        return Err(Error::fatal_decode(format!(
                            "decoder for stream {} stayed busy while flushing",
                            self.stream_index()
                        )));
                    }
                }
                _ => break,
            }
        }

        loop {
            self.drain_decoder(sink)?;
            match self.decoder.decode_next_frame()? {
                Flow::EndOfStream => break,
                Flow::Ready(frame) => {
                    sink.stats.frames_decoded += 1;
                    self.filter(frame, sink)?;
                }
                Flow::NeedMoreInput | Flow::Busy => {
                    return Err(Error::fatal_decode(format!(
                        "decoder for stream {} stalled while draining",
                        self.stream_index()
                    )));
                }
            }
        }

        let Some(filter) = &mut self.filter else {
            return Ok(());
        };
        let flow = filter.send_eof()?;
        tracing::trace!(?flow, "filter input closed");
        if !self.drain_filter(sink)? {
            return Err(Error::graph(format!(
                "filter for stream {} stalled while draining",
                self.stream_index()
            )));
        }
        Ok(())
    }
}

/**
    Drives a demuxer and one decode, filter and scale chain per registered
    stream.

    Frames come out one at a time through [`next_frame`](Self::next_frame),
    in the order the graphs release them. Packets for streams without a
    registered decoder are dropped.
*/
pub struct Pipeline<R, D, G, S> {
    demuxer: Demuxer<R>,
    config: FilterConfig,
    chains: BTreeMap<usize, Chain<D, G, S>>,
    output: VecDeque<OutputFrame>,
    finished: bool,
    stats: PipelineStats,
}

impl<R, D, G, S> Pipeline<R, D, G, S>
where
    R: PacketReader,
    D: DecodeEngine,
    G: FilterGraph,
    S: Scaler,
{
    /**
        Create a pipeline with no registered streams.

        The input time base of `config` is replaced per stream by the time
        base of the stream's decoder.
    */
    pub fn new(demuxer: Demuxer<R>, config: FilterConfig) -> Self {
        Self {
            demuxer,
            config,
            chains: BTreeMap::new(),
            output: VecDeque::new(),
            finished: false,
            stats: PipelineStats::default(),
        }
    }

    /**
        Attach a decoder to the stream it was opened for.

        Fails with `Error::NotFound` when the demuxer has no such stream. A
        decoder already registered for the stream is replaced.
    */
    pub fn register(&mut self, decoder: Decoder<D>) -> Result<()> {
        let index = decoder.stream_index();
        if self.demuxer.stream(index).is_none() {
            return Err(Error::not_found(format!("stream {index}")));
        }
        if self.chains.insert(index, Chain::new(decoder)).is_some() {
            tracing::warn!(stream = index, "replaced decoder for stream");
        } else {
            tracing::debug!(stream = index, "stream registered");
        }
        Ok(())
    }

    pub fn demuxer(&self) -> &Demuxer<R> {
        &self.demuxer
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /**
        Indices of the registered streams, ascending.
    */
    pub fn streams(&self) -> impl Iterator<Item = usize> + '_ {
        self.chains.keys().copied()
    }

    /**
        Produce the next output frame.

        `NeedMoreInput` means the demuxer had nothing yet; call again.
        `EndOfStream` is sticky until [`seek`](Self::seek).
    */
    pub fn next_frame(&mut self) -> Result<Flow<OutputFrame>> {
        loop {
            if let Some(frame) = self.output.pop_front() {
                self.stats.frames_emitted += 1;
                return Ok(Flow::Ready(frame));
            }
            if self.finished {
                return Ok(Flow::EndOfStream);
            }

            match self.demuxer.read_packet()? {
                Flow::Ready(packet) => self.route(packet)?,
                Flow::EndOfStream => self.finish()?,
                Flow::NeedMoreInput | Flow::Busy => return Ok(Flow::NeedMoreInput),
            }
        }
    }

    /**
        Run to completion, handing every frame to `callback`. Stops early
        when the callback breaks. Returns the number of frames handed over.
    */
    pub fn run<F>(&mut self, mut callback: F) -> Result<u64>
    where
        F: FnMut(OutputFrame) -> ControlFlow<()>,
    {
        let mut produced = 0;
        loop {
            match self.next_frame()? {
                Flow::Ready(frame) => {
                    produced += 1;
                    if callback(frame).is_break() {
                        break;
                    }
                }
                Flow::EndOfStream => break,
                Flow::NeedMoreInput | Flow::Busy => {}
            }
        }
        Ok(produced)
    }

    /**
        Reposition the input, discarding everything buffered downstream.

        Decoders are reset and filter graphs rebuilt from the next frame, so
        output after a seek never mixes with output from before it. Scale
        stages are kept: a stream that needed scaling keeps scaling.
    */
    pub fn seek(&mut self, position: Duration) -> Result<()> {
        self.demuxer.seek(position)?;
        for chain in self.chains.values_mut() {
            chain.decoder.reset();
            chain.filter = None;
        }
        let discarded = self.output.len();
        self.output.clear();
        self.finished = false;
        tracing::debug!(?position, discarded, "pipeline seeked");
        Ok(())
    }

    fn route(&mut self, packet: Packet) -> Result<()> {
        self.stats.packets_read += 1;

        let Some(chain) = self.chains.get_mut(&packet.stream_index) else {
            self.stats.packets_dropped += 1;
            tracing::trace!(stream = packet.stream_index, "packet for unregistered stream dropped");
            return Ok(());
        };

        let mut sink = Sink {
            config: &self.config,
            output: &mut self.output,
            stats: &mut self.stats,
        };
        chain.submit(&packet, &mut sink)
    }

    fn finish(&mut self) -> Result<()> {
        let mut sink = Sink {
            config: &self.config,
            output: &mut self.output,
            stats: &mut self.stats,
        };
        for chain in self.chains.values_mut() {
            chain.finish(&mut sink)?;
        }
        self.finished = true;
        tracing::debug!(
            packets = self.stats.packets_read,
            queued = self.output.len(),
            "input exhausted"
        );
        Ok(())
    }
}

impl<R, D, G, S> std::fmt::Debug for Pipeline<R, D, G, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("streams", &self.chains.keys().collect::<Vec<_>>())
            .field("queued", &self.output.len())
            .field("finished", &self.finished)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "ffmpeg")]
mod ffmpeg {
    use std::path::Path;

    use ffmpeg_decode::FfmpegDecoder;
    use ffmpeg_source::FfmpegInput;
    use ffmpeg_transform::{FfmpegGraph, SwsScaler};

    use super::*;

    /**
        A pipeline running entirely on FFmpeg.
    */
    pub type FfmpegPipeline = Pipeline<FfmpegInput, FfmpegDecoder, FfmpegGraph, SwsScaler>;

    impl FfmpegPipeline {
        /**
            Open `path` and register a decoder for its best video stream.
        */
        pub fn open<P: AsRef<Path>>(path: P, config: FilterConfig) -> Result<Self> {
            let demuxer = Demuxer::open(path)?;
            let index = demuxer.best_video_stream()?;
            let decoder = Decoder::for_stream(&demuxer, index)?;

            let mut pipeline = Self::new(demuxer, config);
            pipeline.register(decoder)?;
            Ok(pipeline)
        }
    }
}

#[cfg(feature = "ffmpeg")]
pub use ffmpeg::FfmpegPipeline;
