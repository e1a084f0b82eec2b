/*!
    Container access seam.
*/

use std::time::Duration;

use ffmpeg_types::{Flow, Packet, Result, StreamDescriptor};

/**
    Raw access to an opened container.

    Implementations translate engine status codes only: exhausted input is
    `Flow::EndOfStream`, malformed data is `Error::Decode`. Sticky
    end-of-stream and packet validation are handled by [`Demuxer`](crate::Demuxer).
*/
pub trait PacketReader {
    /**
        Descriptors for every stream in the container, in index order.
    */
    fn streams(&self) -> &[StreamDescriptor];

    /**
        The engine's choice of primary video stream, if any.
    */
    fn best_video_stream(&self) -> Option<usize>;

    /**
        Read the next packet in container order.
    */
    fn read_packet(&mut self) -> Result<Flow<Packet>>;

    /**
        Reposition to the nearest keyframe at or before `position`.
    */
    fn seek(&mut self, position: Duration) -> Result<()>;
}

impl<R: PacketReader + ?Sized> PacketReader for Box<R> {
    fn streams(&self) -> &[StreamDescriptor] {
        (**self).streams()
    }

    fn best_video_stream(&self) -> Option<usize> {
        (**self).best_video_stream()
    }

    fn read_packet(&mut self) -> Result<Flow<Packet>> {
        (**self).read_packet()
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        (**self).seek(position)
    }
}
