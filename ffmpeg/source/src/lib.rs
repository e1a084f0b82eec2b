/*!
    Container demuxing for the frame pipeline crates.

    This crate handles the input side of the pipeline. It opens a container,
    describes its streams, and produces encoded packets in container order
    for the decoders to consume.

    The [`Demuxer`] owns the end-of-stream bookkeeping and packet validation;
    the container access itself sits behind the [`PacketReader`] trait. With
    the `ffmpeg` feature (default), [`FfmpegInput`] implements it on top of
    libavformat.
*/

mod demuxer;
mod reader;

#[cfg(feature = "ffmpeg")]
mod codec_config;
#[cfg(feature = "ffmpeg")]
mod convert;
#[cfg(feature = "ffmpeg")]
mod input;
#[cfg(feature = "ffmpeg")]
mod probe;

pub use demuxer::Demuxer;
pub use reader::PacketReader;

#[cfg(feature = "ffmpeg")]
pub use codec_config::CodecConfig;
#[cfg(feature = "ffmpeg")]
pub use convert::{
    frame_from_ffmpeg, frame_to_ffmpeg, pixel_format_from_ffmpeg, pixel_format_to_ffmpeg,
    rational_from_ffmpeg, rational_to_ffmpeg,
};
#[cfg(feature = "ffmpeg")]
pub use input::FfmpegInput;
#[cfg(feature = "ffmpeg")]
pub use probe::probe;

pub use ffmpeg_types::{Error, Flow, Packet, Result, StreamDescriptor};
