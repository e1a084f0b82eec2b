/*!
    FFmpeg-backed video codec.
*/

use ffmpeg_next::{
    codec::{self, decoder::Video as VideoDecoderFFmpeg},
    ffi,
    util::frame::video::Video as VideoFrameFFmpeg,
};

use ffmpeg_source::{CodecConfig, Demuxer, FfmpegInput, frame_from_ffmpeg};
use ffmpeg_types::{Error, Flow, Packet, Rational, Result, StreamDescriptor, VideoFrame};

use crate::decoder::Decoder;
use crate::engine::DecodeEngine;

/**
    Video codec opened through libavcodec.
*/
pub struct FfmpegDecoder {
    decoder: VideoDecoderFFmpeg,
    time_base: Rational,
}

impl FfmpegDecoder {
    /**
        Open a codec from the parameters of a container stream.

        Fails with `Error::UnsupportedCodec` when no decoder exists for the
        codec and `Error::Open` when the decoder refuses the parameters.
    */
    pub fn open(codec_config: CodecConfig, time_base: Rational) -> Result<Self> {
        ffmpeg_next::init().map_err(|e| Error::open(e.to_string()))?;

        let decoder_ctx = codec::context::Context::from_parameters(codec_config.into_parameters())
            .map_err(|e| Error::open(e.to_string()))?;

        let decoder = decoder_ctx.decoder().video().map_err(|e| match e {
            ffmpeg_next::Error::DecoderNotFound => Error::unsupported_codec(e.to_string()),
            _ => Error::open(e.to_string()),
        })?;

        Ok(Self { decoder, time_base })
    }
}

impl DecodeEngine for FfmpegDecoder {
    fn send(&mut self, packet: Option<&Packet>) -> Result<Flow<()>> {
        let result = match packet {
            Some(packet) => {
                let mut ffmpeg_pkt = ffmpeg_next::Packet::copy(&packet.data);
                ffmpeg_pkt.set_pts(packet.pts.map(|pts| pts.0));
                ffmpeg_pkt.set_dts(packet.dts.map(|dts| dts.0));
                ffmpeg_pkt.set_duration(packet.duration.0);
                ffmpeg_pkt.set_stream(packet.stream_index);
                self.decoder.send_packet(&ffmpeg_pkt)
            }
            None => self.decoder.send_eof(),
        };

        match result {
            Ok(()) => Ok(Flow::Ready(())),
            // Decoder buffer full - receive frames first then retry
            Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => Ok(Flow::Busy),
            Err(ffmpeg_next::Error::Eof) => Ok(Flow::EndOfStream),
            Err(e) => Err(Error::fatal_decode(e.to_string())),
        }
    }

    fn receive(&mut self) -> Result<Flow<VideoFrame>> {
        let mut decoded_frame = VideoFrameFFmpeg::empty();

        match self.decoder.receive_frame(&mut decoded_frame) {
            Ok(()) => frame_from_ffmpeg(&decoded_frame, self.time_base)
                .map(Flow::Ready)
                .map_err(|e| Error::fatal_decode(e.to_string())),
            Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => {
                Ok(Flow::NeedMoreInput)
            }
            Err(ffmpeg_next::Error::Eof) => Ok(Flow::EndOfStream),
            Err(e) => Err(Error::fatal_decode(e.to_string())),
        }
    }

    fn reset(&mut self) {
        self.decoder.flush();
    }
}

impl Decoder<FfmpegDecoder> {
    /**
        Open a decoder for `stream` using the codec parameters from its container.
    */
    pub fn open(stream: &StreamDescriptor, codec_config: CodecConfig) -> Result<Self> {
        let engine = FfmpegDecoder::open(codec_config, stream.time_base)?;
        Self::new(stream, engine)
    }

    /**
        Open a decoder for stream `index` of an FFmpeg-backed demuxer.
    */
    pub fn for_stream(demuxer: &Demuxer<FfmpegInput>, index: usize) -> Result<Self> {
        let stream = demuxer
            .stream(index)
            .ok_or_else(|| Error::not_found(format!("stream {index}")))?;
        let codec_config = demuxer
            .codec_config(index)
            .ok_or_else(|| Error::not_found(format!("codec parameters for stream {index}")))?;
        Self::open(stream, codec_config)
    }
}

impl std::fmt::Debug for FfmpegDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegDecoder")
            .field("time_base", &self.time_base)
            .finish_non_exhaustive()
    }
}
