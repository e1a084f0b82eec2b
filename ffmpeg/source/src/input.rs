/*!
    FFmpeg-backed container reader.
*/

use std::path::Path;
use std::time::Duration;

use ffmpeg_next::{ffi, format::context::Input as InputContext, format::stream::Stream, media::Type};

use ffmpeg_types::{
    Error, Flow, MediaDuration, MediaType, Packet, Pts, Result, StreamDescriptor,
};

use crate::codec_config::CodecConfig;
use crate::convert::{
    codec_id_from_ffmpeg, media_type_from_ffmpeg, pixel_format_from_ffmpeg, rational_from_ffmpeg,
};
use crate::demuxer::Demuxer;
use crate::reader::PacketReader;

/**
    A container opened through libavformat.
*/
pub struct FfmpegInput {
    input: InputContext,
    streams: Vec<StreamDescriptor>,
    best_video: Option<usize>,
}

impl FfmpegInput {
    /**
        Open a media file and read its stream information.
    */
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        ffmpeg_next::init().map_err(|e| Error::open(e.to_string()))?;

        let input = ffmpeg_next::format::input(&path).map_err(|e| match e {
            ffmpeg_next::Error::Other { errno } if errno == ffi::ENOENT => Error::Io(
                std::io::Error::new(std::io::ErrorKind::NotFound, path.as_ref().display().to_string()),
            ),
            _ => Error::open(format!("{}: {e}", path.as_ref().display())),
        })?;

        let streams = input.streams().map(|stream| describe_stream(&stream)).collect();
        let best_video = input.streams().best(Type::Video).map(|stream| stream.index());

        Ok(Self {
            input,
            streams,
            best_video,
        })
    }

    /**
        Codec parameters for opening a decoder on the given stream.
    */
    pub fn codec_config(&self, index: usize) -> Option<CodecConfig> {
        self.input
            .stream(index)
            .map(|stream| CodecConfig::new(stream.parameters()))
    }
}

impl PacketReader for FfmpegInput {
    fn streams(&self) -> &[StreamDescriptor] {
        &self.streams
    }

    fn best_video_stream(&self) -> Option<usize> {
        self.best_video
    }

    fn read_packet(&mut self) -> Result<Flow<Packet>> {
        let mut ffmpeg_packet = ffmpeg_next::Packet::empty();

        match ffmpeg_packet.read(&mut self.input) {
            Ok(()) => {}
            Err(ffmpeg_next::Error::Eof) => return Ok(Flow::EndOfStream),
            // Live inputs can report "try again" between bursts.
            Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => {
                return Ok(Flow::NeedMoreInput);
            }
            Err(e) => return Err(Error::decode(e.to_string())),
        }

        let stream_index = ffmpeg_packet.stream();
        let time_base = self
            .streams
            .get(stream_index)
            .map(|stream| stream.time_base)
            .ok_or_else(|| Error::decode(format!("packet for unknown stream {stream_index}")))?;

        Ok(Flow::Ready(Packet {
            stream_index,
            data: ffmpeg_packet.data().map(|d| d.to_vec()).unwrap_or_default(),
            pts: ffmpeg_packet.pts().map(Pts),
            dts: ffmpeg_packet.dts().map(Pts),
            duration: MediaDuration(ffmpeg_packet.duration()),
            time_base,
            is_keyframe: ffmpeg_packet.is_key(),
        }))
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        // Container-level seeks are expressed in AV_TIME_BASE (microseconds)
        let timestamp = (position.as_secs_f64() * ffi::AV_TIME_BASE as f64) as i64;

        self.input
            .seek(timestamp, ..timestamp)
            .map_err(|e| Error::decode(format!("seek failed: {e}")))
    }
}

impl Demuxer<FfmpegInput> {
    /**
        Open a media file.

        # Example

        ```ignore
        let demuxer = Demuxer::open("video.mp4")?;
        let video = demuxer.best_video_stream()?;
        ```
    */
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(FfmpegInput::open(path)?)
    }

    /**
        Codec parameters for opening a decoder on the given stream.
    */
    pub fn codec_config(&self, index: usize) -> Option<CodecConfig> {
        self.reader().codec_config(index)
    }
}

/**
    Build a descriptor from a libavformat stream.
*/
fn describe_stream(stream: &Stream) -> StreamDescriptor {
    let parameters = stream.parameters();
    let media_type = media_type_from_ffmpeg(parameters.medium());

    let frame_rate = [stream.avg_frame_rate(), stream.rate()]
        .into_iter()
        .map(rational_from_ffmpeg)
        .find(|rate| rate.is_positive());

    // Dimensions and format live on a decoder context built from the parameters
    let video = (media_type == MediaType::Video)
        .then(|| ffmpeg_next::codec::context::Context::from_parameters(parameters.clone()).ok())
        .flatten()
        .and_then(|context| context.decoder().video().ok());

    let (width, height, pixel_format) = match &video {
        Some(decoder) => (
            decoder.width(),
            decoder.height(),
            pixel_format_from_ffmpeg(decoder.format()),
        ),
        None => (0, 0, None),
    };

    StreamDescriptor {
        index: stream.index(),
        codec_id: codec_id_from_ffmpeg(parameters.id()),
        media_type,
        time_base: rational_from_ffmpeg(stream.time_base()),
        frame_rate,
        width,
        height,
        pixel_format,
    }
}

impl std::fmt::Debug for FfmpegInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegInput")
            .field("streams", &self.streams)
            .field("best_video", &self.best_video)
            .finish_non_exhaustive()
    }
}
