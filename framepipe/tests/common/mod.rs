//! Scripted engines standing in for FFmpeg in the pipeline tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::time::Duration;

use framepipe::{
    DecodeEngine, Decoder, Demuxer, Error, FilterConfig, FilterGraph, Flow, FrameGeometry,
    GraphSpec, Packet, PacketReader, Pipeline, PixelFormat, Rational, Result, Scaler,
    StreamDescriptor, VideoFrame,
};
use ffmpeg_types::{CodecId, Pts};

pub const TB: Rational = Rational { num: 1, den: 30 };
pub const WIDTH: u32 = 8;
pub const HEIGHT: u32 = 6;

pub type TestPipeline = Pipeline<ScriptedReader, QueueDecoder, FpsGraph, FillScaler>;

/**
    Serves a fixed packet list; seeking restarts from the first packet at
    or after the requested time.
*/
pub struct ScriptedReader {
    streams: Vec<StreamDescriptor>,
    packets: Vec<Packet>,
    cursor: usize,
}

impl ScriptedReader {
    /// `count` packets per stream, interleaved, one every 1/30s.
    pub fn interleaved(stream_count: usize, count: i64) -> Self {
        let streams = (0..stream_count)
            .map(|i| {
                StreamDescriptor::video(i, CodecId::H264, TB, WIDTH, HEIGHT, PixelFormat::Yuv420p)
                    .with_frame_rate(Rational::new(30, 1))
            })
            .collect();
        let packets = (0..count)
            .flat_map(|pts| {
                (0..stream_count).map(move |stream| {
                    Packet::new(stream, vec![pts as u8], TB)
                        .with_pts(pts)
                        .with_duration(1)
                        .with_keyframe(pts == 0)
                })
            })
            .collect();
        Self {
            streams,
            packets,
            cursor: 0,
        }
    }
}

impl PacketReader for ScriptedReader {
    fn streams(&self) -> &[StreamDescriptor] {
        &self.streams
    }

    fn best_video_stream(&self) -> Option<usize> {
        self.streams.iter().position(|s| s.is_video())
    }

    fn read_packet(&mut self) -> Result<Flow<Packet>> {
        match self.packets.get(self.cursor) {
            Some(packet) => {
                self.cursor += 1;
                Ok(Flow::Ready(packet.clone()))
            }
            None => Ok(Flow::EndOfStream),
        }
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        self.cursor = self
            .packets
            .iter()
            .position(|p| p.presentation_time().is_some_and(|t| t >= position))
            .unwrap_or(self.packets.len());
        Ok(())
    }
}

/**
    Decoder holding `delay` frames back, like a codec with reordering
    latency. Can be told to report busy once at a given packet, releasing
    what it holds, or to stay busy forever.
*/
pub struct QueueDecoder {
    queued: VecDeque<VideoFrame>,
    delay: usize,
    busy_at: Option<usize>,
    stuck: bool,
    oversized_before: i64,
    releasing: bool,
    flushed: bool,
    accepted: usize,
    pub busy_reported: usize,
}

impl QueueDecoder {
    pub fn new(delay: usize) -> Self {
        Self {
            queued: VecDeque::new(),
            delay,
            busy_at: None,
            stuck: false,
            oversized_before: 0,
            releasing: false,
            flushed: false,
            accepted: 0,
            busy_reported: 0,
        }
    }

    /// Report busy once when the `ordinal`-th packet (1-based) arrives.
    pub fn busy_at(mut self, ordinal: usize) -> Self {
        self.busy_at = Some(ordinal);
        self
    }

    pub fn stuck(mut self) -> Self {
        self.stuck = true;
        self
    }

    /// Frames with pts below `pts` come out at twice the nominal size.
    pub fn oversized_before(mut self, pts: i64) -> Self {
        self.oversized_before = pts;
        self
    }
}

impl DecodeEngine for QueueDecoder {
    fn send(&mut self, packet: Option<&Packet>) -> Result<Flow<()>> {
        if self.flushed {
            return Ok(Flow::EndOfStream);
        }
        let Some(packet) = packet else {
            self.flushed = true;
            return Ok(Flow::Ready(()));
        };
        if self.stuck {
            self.busy_reported += 1;
            return Ok(Flow::Busy);
        }
        if self.busy_at == Some(self.accepted + 1) {
            self.busy_at = None;
            self.busy_reported += 1;
            self.releasing = true;
            return Ok(Flow::Busy);
        }

        let scale = if packet.pts.is_some_and(|p| p.0 < self.oversized_before) {
            2
        } else {
            1
        };
        let geometry = FrameGeometry::new(WIDTH * scale, HEIGHT * scale, PixelFormat::Yuv420p);
        let mut frame = VideoFrame::blank(geometry, TB);
        frame.pts = packet.pts;
        frame.sample_aspect_ratio = Rational::new(1, 1);
        self.queued.push_back(frame);
        self.accepted += 1;
        Ok(Flow::Ready(()))
    }

    fn receive(&mut self) -> Result<Flow<VideoFrame>> {
        let release = self.releasing || self.flushed || self.queued.len() > self.delay;
        match self.queued.pop_front() {
            Some(frame) if release => Ok(Flow::Ready(frame)),
            Some(frame) => {
                self.queued.push_front(frame);
                Ok(Flow::NeedMoreInput)
            }
            None if self.flushed => Ok(Flow::EndOfStream),
            None => {
                self.releasing = false;
                Ok(Flow::NeedMoreInput)
            }
        }
    }

    fn reset(&mut self) {
        self.queued.clear();
        self.releasing = false;
        self.flushed = false;
    }
}

/**
    Constant-rate graph: emits the latest input frame once per output tick,
    holding the last one for one more input interval at end of input.
    Converts pixel format but ignores `scale=`, leaving resizing to the
    scale stage.
*/
pub struct FpsGraph {
    fps: i64,
    time_base: Rational,
    output: FrameGeometry,
    pending: VecDeque<VideoFrame>,
    previous: Option<VideoFrame>,
    last_gap: i64,
    next_tick: Option<i64>,
    closed: bool,
}

impl FpsGraph {
    fn first_tick_at_or_after(&self, pts: i64) -> i64 {
        let num = pts * self.time_base.num as i64 * self.fps;
        let den = self.time_base.den as i64;
        (num + den - 1).div_euclid(den)
    }

    fn emit_until(&mut self, end: i64) {
        let (Some(start), Some(previous)) = (self.next_tick, &self.previous) else {
            return;
        };
        for tick in start..end {
            let mut frame = VideoFrame::blank(self.output, Rational::new(1, self.fps as i32));
            frame.pts = Some(Pts(tick));
            frame.sample_aspect_ratio = previous.sample_aspect_ratio;
            self.pending.push_back(frame);
        }
        self.next_tick = Some(start.max(end));
    }
}

impl FilterGraph for FpsGraph {
    fn build(spec: &GraphSpec) -> Result<Self> {
        let fps = spec
            .filters
            .split(',')
            .find_map(|f| f.strip_prefix("fps="))
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| Error::graph_build(format!("no fps filter in '{}'", spec.filters)))?;
        Ok(Self {
            fps,
            time_base: spec.input_time_base,
            output: FrameGeometry::new(spec.input.width, spec.input.height, spec.output_format),
            pending: VecDeque::new(),
            previous: None,
            last_gap: 0,
            next_tick: None,
            closed: false,
        })
    }

    fn push(&mut self, frame: Option<&VideoFrame>) -> Result<Flow<()>> {
        if self.closed {
            return Ok(Flow::EndOfStream);
        }
        match frame {
            Some(frame) => {
                let pts = frame.pts.map_or(0, |p| p.0);
                let tick = self.first_tick_at_or_after(pts);
                if self.next_tick.is_none() {
                    self.next_tick = Some(tick);
                }
                if let Some(previous) = self.previous.as_ref().and_then(|f| f.pts) {
                    self.emit_until(tick);
                    self.last_gap = pts - previous.0;
                }
                self.previous = Some(frame.clone());
            }
            None => {
                self.closed = true;
                if let Some(previous) = self.previous.as_ref().and_then(|f| f.pts) {
                    let end = self.first_tick_at_or_after(previous.0 + self.last_gap.max(1));
                    self.emit_until(end);
                }
                self.previous = None;
            }
        }
        Ok(Flow::Ready(()))
    }

    fn pull(&mut self) -> Result<Flow<VideoFrame>> {
        match self.pending.pop_front() {
            Some(frame) => Ok(Flow::Ready(frame)),
            None if self.closed => Ok(Flow::EndOfStream),
            None => Ok(Flow::NeedMoreInput),
        }
    }
}

/// Fills the destination with 0x80.
pub struct FillScaler;

impl Scaler for FillScaler {
    fn build(_source: FrameGeometry, _target: FrameGeometry) -> Result<Self> {
        Ok(Self)
    }

    fn convert(&mut self, _source: &VideoFrame, destination: &mut VideoFrame) -> Result<()> {
        destination.data.fill(0x80);
        Ok(())
    }
}

pub fn decoder(demuxer: &Demuxer<ScriptedReader>, index: usize, engine: QueueDecoder) -> Decoder<QueueDecoder> {
    let stream = demuxer.stream(index).expect("stream exists");
    Decoder::new(stream, engine).expect("decoder opens")
}

/// A pipeline over `stream_count` interleaved streams with decoders for `registered`.
pub fn pipeline(
    stream_count: usize,
    packets: i64,
    registered: &[usize],
    config: FilterConfig,
) -> TestPipeline {
    let demuxer = Demuxer::new(ScriptedReader::interleaved(stream_count, packets)).unwrap();
    let decoders: Vec<_> = registered
        .iter()
        .map(|&i| decoder(&demuxer, i, QueueDecoder::new(2)))
        .collect();
    let mut pipeline = Pipeline::new(demuxer, config);
    for decoder in decoders {
        pipeline.register(decoder).unwrap();
    }
    pipeline
}

pub fn config(fps: u32) -> FilterConfig {
    FilterConfig::new(TB, fps, PixelFormat::Yuv420p)
}
