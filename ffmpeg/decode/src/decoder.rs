/*!
    Per-stream decoding session.
*/

use ffmpeg_types::{Error, Flow, Packet, Rational, Result, StreamDescriptor, VideoFrame};

use crate::engine::DecodeEngine;

/**
    Lifecycle of a [`Decoder`].
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecoderState {
    /// Accepting packets.
    Open,
    /// Flush submitted; buffered frames are still being drained.
    Draining,
    /// End of stream observed. Sticky until [`Decoder::reset`].
    Closed,
    /// The codec reported a fatal error. Every call fails.
    Failed,
}

/**
    Video decoder for a single stream.

    Packets go in through [`send_packet`](Self::send_packet), frames come out
    of [`decode_next_frame`](Self::decode_next_frame). One packet may yield
    zero, one, or several frames depending on codec buffering, so callers
    drain after every submission.
*/
pub struct Decoder<E> {
    engine: E,
    stream_index: usize,
    time_base: Rational,
    state: DecoderState,
    frames_decoded: u64,
}

impl<E: DecodeEngine> Decoder<E> {
    /**
        Create a decoder for `stream` on top of an opened codec.

        Fails with `Error::UnsupportedCodec` for non-video streams. Whether
        the codec itself is supported was settled when `engine` was opened.
    */
    pub fn new(stream: &StreamDescriptor, engine: E) -> Result<Self> {
        if !stream.is_video() {
            return Err(Error::unsupported_codec(format!(
                "stream {} carries {:?}, not video",
                stream.index, stream.media_type
            )));
        }
        tracing::debug!(
            stream = stream.index,
            codec = ?stream.codec_id,
            time_base = %stream.time_base,
            "decoder opened"
        );

        Ok(Self {
            engine,
            stream_index: stream.index,
            time_base: stream.time_base,
            state: DecoderState::Open,
            frames_decoded: 0,
        })
    }

    pub fn stream_index(&self) -> usize {
        self.stream_index
    }

    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    pub fn frames_decoded(&self) -> u64 {
        self.frames_decoded
    }

    /**
        Submit a packet.

        Returns `Ready(())` when accepted and `Busy` when frames must be
        drained before the same packet is resubmitted. After a flush the
        decoder takes no more packets and returns `EndOfStream`.
    */
    pub fn send_packet(&mut self, packet: &Packet) -> Result<Flow<()>> {
        match self.state {
            DecoderState::Failed => return Err(Error::Unusable { stage: "decoder" }),
            DecoderState::Draining | DecoderState::Closed => return Ok(Flow::EndOfStream),
            DecoderState::Open => {}
        }

        if packet.stream_index != self.stream_index {
            return Err(Error::fatal_decode(format!(
                "packet for stream {} sent to decoder for stream {}",
                packet.stream_index, self.stream_index
            )));
        }

        match self.engine.send(Some(packet)) {
            Ok(Flow::Ready(())) => Ok(Flow::Ready(())),
            Ok(Flow::EndOfStream) => {
                self.state = DecoderState::Draining;
                Ok(Flow::EndOfStream)
            }
            Ok(_) => {
                tracing::trace!(stream = self.stream_index, "decoder busy");
                Ok(Flow::Busy)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /**
        Submit the flush request that makes the codec release buffered frames.

        Idempotent. Returns `Busy` if the codec needs draining first.
    */
    pub fn send_flush(&mut self) -> Result<Flow<()>> {
        match self.state {
            DecoderState::Failed => return Err(Error::Unusable { stage: "decoder" }),
            DecoderState::Draining | DecoderState::Closed => return Ok(Flow::Ready(())),
            DecoderState::Open => {}
        }

        match self.engine.send(None) {
            Ok(Flow::Ready(())) | Ok(Flow::EndOfStream) => {
                tracing::debug!(stream = self.stream_index, "decoder flushing");
                self.state = DecoderState::Draining;
                Ok(Flow::Ready(()))
            }
            Ok(_) => Ok(Flow::Busy),
            Err(e) => Err(self.fail(e)),
        }
    }

    /**
        Pull the next decoded frame.

        Once `EndOfStream` has been observed it is returned for every further
        call without consulting the codec.
    */
    pub fn decode_next_frame(&mut self) -> Result<Flow<VideoFrame>> {
        match self.state {
            DecoderState::Failed => return Err(Error::Unusable { stage: "decoder" }),
            DecoderState::Closed => return Ok(Flow::EndOfStream),
            DecoderState::Open | DecoderState::Draining => {}
        }

        match self.engine.receive() {
            Ok(Flow::Ready(frame)) => {
                if !frame.geometry().is_valid() {
                    return Err(self.fail(Error::fatal_decode(format!(
                        "decoder produced a {} frame",
                        frame.geometry()
                    ))));
                }
                self.frames_decoded += 1;
                Ok(Flow::Ready(frame))
            }
            Ok(Flow::EndOfStream) => {
                tracing::debug!(
                    stream = self.stream_index,
                    frames = self.frames_decoded,
                    "decoder reached end of stream"
                );
                self.state = DecoderState::Closed;
                Ok(Flow::EndOfStream)
            }
            Ok(_) => Ok(Flow::NeedMoreInput),
            Err(e) => Err(self.fail(e)),
        }
    }

    /**
        Discard buffered state after a seek and accept packets again.

        A failed decoder stays failed.
    */
    pub fn reset(&mut self) {
        if self.state == DecoderState::Failed {
            return;
        }
        self.engine.reset();
        self.state = DecoderState::Open;
        tracing::debug!(stream = self.stream_index, "decoder reset");
    }

    fn fail(&mut self, error: Error) -> Error {
        tracing::warn!(stream = self.stream_index, %error, "decoder failed");
        self.state = DecoderState::Failed;
        match error {
            Error::FatalDecode { .. } => error,
            other => Error::fatal_decode(other.to_string()),
        }
    }
}

impl<E> std::fmt::Debug for Decoder<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decoder")
            .field("stream_index", &self.stream_index)
            .field("time_base", &self.time_base)
            .field("state", &self.state)
            .field("frames_decoded", &self.frames_decoded)
            .finish_non_exhaustive()
    }
}
