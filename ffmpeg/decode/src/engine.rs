/*!
    Codec access seam.
*/

use ffmpeg_types::{Flow, Packet, Result, VideoFrame};

/**
    Raw push-encoded / pull-decoded access to a codec.

    Implementations translate engine status codes only:

    - `send`: `Ready(())` accepted, `Busy` when output must be drained first,
      `EndOfStream` when the codec was already flushed.
    - `receive`: `Ready(frame)`, `NeedMoreInput`, or `EndOfStream` once fully
      drained after a flush.

    Anything else is an `Err`. Sticky end-of-stream and failure tracking are
    handled by [`Decoder`](crate::Decoder).
*/
pub trait DecodeEngine {
    /**
        Submit a packet, or `None` to request a flush.
    */
    fn send(&mut self, packet: Option<&Packet>) -> Result<Flow<()>>;

    /**
        Pull the next decoded frame.
    */
    fn receive(&mut self) -> Result<Flow<VideoFrame>>;

    /**
        Drop all buffered state, returning the codec to accepting input.
    */
    fn reset(&mut self);
}

impl<E: DecodeEngine + ?Sized> DecodeEngine for Box<E> {
    fn send(&mut self, packet: Option<&Packet>) -> Result<Flow<()>> {
        (**self).send(packet)
    }

    fn receive(&mut self) -> Result<Flow<VideoFrame>> {
        (**self).receive()
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}
