/*!
    Encoded packet type.
*/

use crate::{MediaDuration, Pts, Rational};

/**
    An encoded media packet.

    Contains compressed data from a single stream, with timing information.
    Created by the demuxer and consumed exactly once by the decoder that owns
    `stream_index`.
*/
#[derive(Clone, Debug)]
pub struct Packet {
    /// Index of the stream this packet belongs to.
    pub stream_index: usize,
    /// Compressed data.
    pub data: Vec<u8>,
    /// Presentation timestamp.
    pub pts: Option<Pts>,
    /// Decode timestamp (may differ from PTS for B-frames).
    pub dts: Option<Pts>,
    /// Duration of this packet's content.
    pub duration: MediaDuration,
    /// Time base for interpreting timestamps.
    pub time_base: Rational,
    /// Whether this is a keyframe (can be decoded independently).
    pub is_keyframe: bool,
}

impl Packet {
    /**
        Create a new packet with no timing information.
    */
    pub fn new(stream_index: usize, data: Vec<u8>, time_base: Rational) -> Self {
        Self {
            stream_index,
            data,
            pts: None,
            dts: None,
            duration: MediaDuration(0),
            time_base,
            is_keyframe: false,
        }
    }

    pub fn with_pts(mut self, pts: impl Into<Pts>) -> Self {
        let pts = pts.into();
        self.pts = Some(pts);
        self.dts.get_or_insert(pts);
        self
    }

    pub fn with_duration(mut self, duration: i64) -> Self {
        self.duration = MediaDuration(duration);
        self
    }

    pub fn with_keyframe(mut self, is_keyframe: bool) -> Self {
        self.is_keyframe = is_keyframe;
        self
    }

    /**
        Returns the presentation time as a Duration, if PTS is set.
    */
    pub fn presentation_time(&self) -> Option<std::time::Duration> {
        self.pts.map(|pts| pts.to_duration(self.time_base))
    }
}

static_assertions::assert_impl_all!(Packet: Send, Sync);
