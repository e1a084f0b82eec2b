/*!
    Codec and media type identification.
*/

/**
    Codec identifiers.

    Video codecs the pipeline names in logs and descriptors. Streams with
    any other codec report `None`; whether they decode is up to the engine.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CodecId {
    /// H.264 / AVC
    H264,
    /// H.265 / HEVC
    H265,
    /// VP8
    Vp8,
    /// VP9
    Vp9,
    /// AV1
    Av1,
    /// MPEG-4 Part 2
    Mpeg4,
    /// MPEG-2 Video
    Mpeg2Video,
    /// Motion JPEG
    Mjpeg,
    /// Uncompressed video
    RawVideo,
}

/**
    Kind of media carried by a stream.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaType {
    Video,
    Audio,
    Subtitle,
    Data,
    Unknown,
}
