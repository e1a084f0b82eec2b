/*!
    Demuxer implementation.
*/

use std::time::Duration;

use ffmpeg_types::{Error, Flow, Packet, Result, StreamDescriptor};

use crate::reader::PacketReader;

/**
    A demuxer that produces encoded packets in container order.

    Created by [`Demuxer::new`] around any [`PacketReader`], or by
    `Demuxer::open` with the `ffmpeg` feature.
*/
pub struct Demuxer<R> {
    reader: R,
    /// Set once the reader reports end of stream; cleared by seeking.
    eof: bool,
    packets_read: u64,
}

impl<R: PacketReader> Demuxer<R> {
    /**
        Wrap an opened container.

        Fails with `Error::Open` if the container exposes no streams.
    */
    pub fn new(reader: R) -> Result<Self> {
        if reader.streams().is_empty() {
            return Err(Error::open("container has no streams"));
        }

        tracing::debug!(streams = reader.streams().len(), "demuxer opened");

        Ok(Self {
            reader,
            eof: false,
            packets_read: 0,
        })
    }

    /**
        Descriptors for every stream, in index order.
    */
    pub fn streams(&self) -> &[StreamDescriptor] {
        self.reader.streams()
    }

    /**
        Descriptor for a single stream.
    */
    pub fn stream(&self, index: usize) -> Option<&StreamDescriptor> {
        self.reader.streams().get(index)
    }

    /**
        Index of the engine's preferred video stream.
    */
    pub fn best_video_stream(&self) -> Result<usize> {
        self.reader
            .best_video_stream()
            .ok_or_else(|| Error::not_found("no video stream in container"))
    }

    /**
        Number of packets handed out since opening.
    */
    pub fn packets_read(&self) -> u64 {
        self.packets_read
    }

    /**
        Read the next packet in container order.

        Returns `Flow::EndOfStream` once the container is exhausted, and keeps
        returning it without touching the container until the next seek.
    */
    pub fn read_packet(&mut self) -> Result<Flow<Packet>> {
        if self.eof {
            return Ok(Flow::EndOfStream);
        }

        match self.reader.read_packet()? {
            Flow::Ready(packet) => {
                if packet.stream_index >= self.reader.streams().len() {
                    return Err(Error::decode(format!(
                        "packet references unknown stream {}",
                        packet.stream_index
                    )));
                }
                self.packets_read += 1;
                Ok(Flow::Ready(packet))
            }
            Flow::EndOfStream => {
                tracing::debug!(packets = self.packets_read, "demuxer reached end of stream");
                self.eof = true;
                Ok(Flow::EndOfStream)
            }
            other => Ok(other),
        }
    }

    /**
        Seek to a position in the media.

        Seeks to the nearest keyframe at or before the target position.
        Decoders fed from this demuxer hold stale state afterwards and must
        be reset before further packets are sent.
    */
    pub fn seek(&mut self, position: Duration) -> Result<()> {
        self.reader.seek(position)?;
        self.eof = false;
        tracing::debug!(?position, "demuxer seeked");
        Ok(())
    }

    /**
        Borrow the underlying reader.
    */
    pub fn reader(&self) -> &R {
        &self.reader
    }
}

impl<R> std::fmt::Debug for Demuxer<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Demuxer")
            .field("eof", &self.eof)
            .field("packets_read", &self.packets_read)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use ffmpeg_types::{CodecId, PixelFormat, Rational};

    use super::*;

    const TB: Rational = Rational { num: 1, den: 30 };

    struct ScriptedReader {
        streams: Vec<StreamDescriptor>,
        script: VecDeque<Result<Flow<Packet>>>,
        reads: usize,
        seeks: Vec<Duration>,
    }

    impl ScriptedReader {
        fn new(stream_count: usize, script: Vec<Result<Flow<Packet>>>) -> Self {
            let streams = (0..stream_count)
                .map(|i| StreamDescriptor::video(i, CodecId::H264, TB, 64, 48, PixelFormat::Yuv420p))
                .collect();
            Self {
                streams,
                script: script.into(),
                reads: 0,
                seeks: Vec::new(),
            }
        }
    }

    impl PacketReader for ScriptedReader {
        fn streams(&self) -> &[StreamDescriptor] {
            &self.streams
        }

        fn best_video_stream(&self) -> Option<usize> {
            self.streams.iter().position(|s| s.is_video())
        }

        fn read_packet(&mut self) -> Result<Flow<Packet>> {
            self.reads += 1;
            self.script.pop_front().unwrap_or(Ok(Flow::EndOfStream))
        }

        fn seek(&mut self, position: Duration) -> Result<()> {
            self.seeks.push(position);
            self.script.push_back(Ok(Flow::Ready(Packet::new(0, vec![9], TB))));
            Ok(())
        }
    }

    fn packet(stream: usize, pts: i64) -> Result<Flow<Packet>> {
        Ok(Flow::Ready(Packet::new(stream, vec![1, 2, 3], TB).with_pts(pts)))
    }

    #[test]
    fn rejects_container_without_streams() {
        let err = Demuxer::new(ScriptedReader::new(0, vec![])).unwrap_err();
        assert!(matches!(err, Error::Open { .. }));
    }

    #[test]
    fn yields_packets_in_order_then_sticky_eof() {
        let reader = ScriptedReader::new(2, vec![packet(0, 0), packet(1, 0), packet(0, 1)]);
        let mut demuxer = Demuxer::new(reader).unwrap();

        let mut seen = Vec::new();
        while let Flow::Ready(packet) = demuxer.read_packet().unwrap() {
            seen.push((packet.stream_index, packet.pts.unwrap().0));
        }
        assert_eq!(seen, vec![(0, 0), (1, 0), (0, 1)]);

        let reads = demuxer.reader().reads;
        assert!(demuxer.read_packet().unwrap().is_end_of_stream());
        assert!(demuxer.read_packet().unwrap().is_end_of_stream());
        assert_eq!(demuxer.reader().reads, reads);
        assert_eq!(demuxer.packets_read(), 3);
    }

    #[test]
    fn unknown_stream_index_is_decode_error() {
        let mut demuxer = Demuxer::new(ScriptedReader::new(1, vec![packet(3, 0)])).unwrap();
        assert!(matches!(demuxer.read_packet(), Err(Error::Decode { .. })));
    }

    #[test]
    fn malformed_data_propagates() {
        let reader = ScriptedReader::new(1, vec![Err(Error::decode("bad box"))]);
        let mut demuxer = Demuxer::new(reader).unwrap();
        assert!(matches!(demuxer.read_packet(), Err(Error::Decode { .. })));
    }

    #[test]
    fn seek_clears_end_of_stream() {
        let mut demuxer = Demuxer::new(ScriptedReader::new(1, vec![])).unwrap();
        assert!(demuxer.read_packet().unwrap().is_end_of_stream());

        demuxer.seek(Duration::from_secs(2)).unwrap();
        assert_eq!(demuxer.reader().seeks, vec![Duration::from_secs(2)]);
        let packet = demuxer.read_packet().unwrap().ready().unwrap();
        assert_eq!(packet.data, vec![9]);
    }

    #[test]
    fn best_video_stream_lookup() {
        let demuxer = Demuxer::new(ScriptedReader::new(2, vec![])).unwrap();
        assert_eq!(demuxer.best_video_stream().unwrap(), 0);
        assert_eq!(demuxer.stream(1).unwrap().index, 1);
        assert!(demuxer.stream(2).is_none());

        let mut reader = ScriptedReader::new(1, vec![]);
        reader.streams[0].media_type = ffmpeg_types::MediaType::Audio;
        let demuxer = Demuxer::new(reader).unwrap();
        assert!(matches!(demuxer.best_video_stream(), Err(Error::NotFound { .. })));
    }
}
