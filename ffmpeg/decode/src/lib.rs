/*!
    Video decoding for the frame pipeline crates.

    This crate transforms encoded packets into raw frames, one [`Decoder`]
    per stream. The decoder owns the session state machine (busy handling,
    flushing, sticky end of stream); the codec itself sits behind the
    [`DecodeEngine`] trait, implemented by [`FfmpegDecoder`] with the
    `ffmpeg` feature (default).

    # Decoding loop

    ```ignore
    match decoder.send_packet(&packet)? {
        Flow::Ready(()) => {}
        Flow::Busy => { /* drain decode_next_frame, then resend */ }
        _ => {}
    }
    while let Flow::Ready(frame) = decoder.decode_next_frame()? {
        // hand the frame downstream
    }
    ```
*/

mod decoder;
mod engine;

#[cfg(feature = "ffmpeg")]
mod video;

pub use decoder::{Decoder, DecoderState};
pub use engine::DecodeEngine;

#[cfg(feature = "ffmpeg")]
pub use video::FfmpegDecoder;

pub use ffmpeg_types::{Error, Flow, Packet, Result, VideoFrame};
