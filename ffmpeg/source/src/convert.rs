/*!
    Conversion utilities between ffmpeg-next types and ffmpeg-types.
*/

use ffmpeg_next::util::frame::video::Video as VideoFrameFFmpeg;

use ffmpeg_types::{CodecId, Error, MediaType, PixelFormat, Pts, Rational, Result, VideoFrame};

/**
    Convert ffmpeg_next::Rational to our Rational.

    A zero denominator (engine's "unset") maps to 0/1.
*/
pub fn rational_from_ffmpeg(r: ffmpeg_next::Rational) -> Rational {
    if r.denominator() == 0 {
        return Rational::UNKNOWN;
    }
    Rational::new(r.numerator(), r.denominator())
}

/**
    Convert our Rational to ffmpeg_next::Rational.
*/
pub fn rational_to_ffmpeg(r: Rational) -> ffmpeg_next::Rational {
    ffmpeg_next::Rational::new(r.num, r.den)
}

/**
    Convert ffmpeg_next pixel format to our PixelFormat.
*/
pub fn pixel_format_from_ffmpeg(format: ffmpeg_next::format::Pixel) -> Option<PixelFormat> {
    use ffmpeg_next::format::Pixel;

    match format {
        Pixel::YUV420P => Some(PixelFormat::Yuv420p),
        Pixel::YUVJ420P => Some(PixelFormat::Yuvj420p),
        Pixel::NV12 => Some(PixelFormat::Nv12),
        Pixel::BGRA => Some(PixelFormat::Bgra),
        Pixel::RGBA => Some(PixelFormat::Rgba),
        Pixel::RGB24 => Some(PixelFormat::Rgb24),
        Pixel::BGR24 => Some(PixelFormat::Bgr24),
        Pixel::YUV422P => Some(PixelFormat::Yuv422p),
        Pixel::YUVJ422P => Some(PixelFormat::Yuvj422p),
        Pixel::YUV444P => Some(PixelFormat::Yuv444p),
        Pixel::YUVJ444P => Some(PixelFormat::Yuvj444p),
        Pixel::YUV420P10LE => Some(PixelFormat::Yuv420p10),
        Pixel::YUV422P10LE => Some(PixelFormat::Yuv422p10),
        Pixel::YUV444P10LE => Some(PixelFormat::Yuv444p10),
        Pixel::YUV420P12LE => Some(PixelFormat::Yuv420p12),
        Pixel::P010LE => Some(PixelFormat::P010le),
        Pixel::GRAY8 => Some(PixelFormat::Gray),
        _ => None,
    }
}

/**
    Convert our PixelFormat to ffmpeg_next's Pixel format.
*/
pub fn pixel_format_to_ffmpeg(format: PixelFormat) -> ffmpeg_next::format::Pixel {
    use ffmpeg_next::format::Pixel;

    match format {
        PixelFormat::Yuv420p => Pixel::YUV420P,
        PixelFormat::Yuvj420p => Pixel::YUVJ420P,
        PixelFormat::Nv12 => Pixel::NV12,
        PixelFormat::Bgra => Pixel::BGRA,
        PixelFormat::Rgba => Pixel::RGBA,
        PixelFormat::Rgb24 => Pixel::RGB24,
        PixelFormat::Bgr24 => Pixel::BGR24,
        PixelFormat::Yuv422p => Pixel::YUV422P,
        PixelFormat::Yuvj422p => Pixel::YUVJ422P,
        PixelFormat::Yuv444p => Pixel::YUV444P,
        PixelFormat::Yuvj444p => Pixel::YUVJ444P,
        PixelFormat::Yuv420p10 => Pixel::YUV420P10LE,
        PixelFormat::Yuv422p10 => Pixel::YUV422P10LE,
        PixelFormat::Yuv444p10 => Pixel::YUV444P10LE,
        PixelFormat::Yuv420p12 => Pixel::YUV420P12LE,
        PixelFormat::P010le => Pixel::P010LE,
        PixelFormat::Gray => Pixel::GRAY8,
    }
}

/**
    Convert ffmpeg_next media type to our MediaType.
*/
pub fn media_type_from_ffmpeg(medium: ffmpeg_next::media::Type) -> MediaType {
    use ffmpeg_next::media::Type;

    match medium {
        Type::Video => MediaType::Video,
        Type::Audio => MediaType::Audio,
        Type::Subtitle => MediaType::Subtitle,
        Type::Data | Type::Attachment => MediaType::Data,
        _ => MediaType::Unknown,
    }
}

/**
    Convert ffmpeg_next codec ID to our CodecId.
*/
pub fn codec_id_from_ffmpeg(id: ffmpeg_next::codec::Id) -> Option<CodecId> {
    use ffmpeg_next::codec::Id;

    match id {
        Id::H264 => Some(CodecId::H264),
        Id::HEVC => Some(CodecId::H265),
        Id::VP8 => Some(CodecId::Vp8),
        Id::VP9 => Some(CodecId::Vp9),
        Id::AV1 => Some(CodecId::Av1),
        Id::MPEG4 => Some(CodecId::Mpeg4),
        Id::MPEG2VIDEO => Some(CodecId::Mpeg2Video),
        Id::MJPEG => Some(CodecId::Mjpeg),
        Id::RAWVIDEO => Some(CodecId::RawVideo),
        _ => None,
    }
}

/**
    Copy an FFmpeg video frame into a tightly packed [`VideoFrame`].

    Fails with `Error::InvalidGeometry` for zero-sized frames or pixel formats
    outside [`PixelFormat`].
*/
pub fn frame_from_ffmpeg(frame: &VideoFrameFFmpeg, time_base: Rational) -> Result<VideoFrame> {
    let width = frame.width();
    let height = frame.height();
    if width == 0 || height == 0 {
        return Err(Error::invalid_geometry("frame has zero dimensions"));
    }

    let format = pixel_format_from_ffmpeg(frame.format()).ok_or_else(|| {
        Error::invalid_geometry(format!("unsupported pixel format: {:?}", frame.format()))
    })?;

    let planes = format.planes(width, height);
    let mut data = Vec::with_capacity(format.buffer_size(width, height));

    for (index, plane) in planes.iter().enumerate() {
        let stride = frame.stride(index);
        let source = frame.data(index);
        for row in 0..plane.rows {
            let start = row * stride;
            data.extend_from_slice(&source[start..start + plane.row_bytes]);
        }
    }

    let mut output = VideoFrame::new(
        data,
        width,
        height,
        format,
        frame.pts().or_else(|| frame.timestamp()).map(Pts),
        time_base,
    );
    output.sample_aspect_ratio = rational_from_ffmpeg(frame.aspect_ratio());
    Ok(output)
}

/**
    Copy a tightly packed [`VideoFrame`] into a newly allocated FFmpeg frame.
*/
pub fn frame_to_ffmpeg(frame: &VideoFrame) -> Result<VideoFrameFFmpeg> {
    let expected = frame.geometry().buffer_size();
    if frame.data.len() < expected {
        return Err(Error::invalid_geometry(format!(
            "frame buffer holds {} bytes, {} needed for {}",
            frame.data.len(),
            expected,
            frame.geometry()
        )));
    }

    let mut output =
        VideoFrameFFmpeg::new(pixel_format_to_ffmpeg(frame.format), frame.width, frame.height);

    let mut offset = 0;
    for (index, plane) in frame.format.planes(frame.width, frame.height).iter().enumerate() {
        let stride = output.stride(index);
        let destination = output.data_mut(index);
        for row in 0..plane.rows {
            let start = row * stride;
            destination[start..start + plane.row_bytes]
                .copy_from_slice(&frame.data[offset..offset + plane.row_bytes]);
            offset += plane.row_bytes;
        }
    }

    output.set_pts(frame.pts.map(|pts| pts.0));
    // SAFETY: the frame was allocated above and is exclusively owned here
    unsafe {
        (*output.as_mut_ptr()).sample_aspect_ratio =
            rational_to_ffmpeg(frame.sample_aspect_ratio).into();
    }
    Ok(output)
}
