mod common;

use std::ops::ControlFlow;
use std::time::Duration;

use common::{QueueDecoder, ScriptedReader, TestPipeline, config, decoder, pipeline};
use framepipe::{Demuxer, Error, Flow, FrameGeometry, OutputFrame, Pipeline, PixelFormat};

fn collect(pipeline: &mut TestPipeline) -> Vec<OutputFrame> {
    let mut frames = Vec::new();
    let produced = pipeline
        .run(|frame| {
            frames.push(frame);
            ControlFlow::Continue(())
        })
        .unwrap();
    assert_eq!(produced, frames.len() as u64);
    frames
}

#[test]
fn constant_rate_passthrough() {
    let mut pipeline = pipeline(1, 30, &[0], config(30));
    let frames = collect(&mut pipeline);

    assert_eq!(frames.len(), 30);
    let pts: Vec<_> = frames.iter().map(|f| f.frame.pts.unwrap().0).collect();
    assert_eq!(pts, (0..30).collect::<Vec<_>>());

    let stats = pipeline.stats();
    assert_eq!(stats.packets_read, 30);
    assert_eq!(stats.frames_decoded, 30);
    assert_eq!(stats.frames_filtered, 30);
    assert_eq!(stats.frames_emitted, 30);
    assert_eq!(stats.packets_dropped, 0);
}

#[test]
fn doubling_rate_doubles_output() {
    let mut pipeline = pipeline(1, 30, &[0], config(60));
    let frames = collect(&mut pipeline);
    assert!((58..=62).contains(&frames.len()), "got {}", frames.len());
}

#[test]
fn busy_decoder_is_drained_before_resubmitting() {
    let demuxer = Demuxer::new(ScriptedReader::interleaved(1, 10)).unwrap();
    let decoder = decoder(&demuxer, 0, QueueDecoder::new(2).busy_at(7));
    let mut pipeline: TestPipeline = Pipeline::new(demuxer, config(30));
    pipeline.register(decoder).unwrap();

    let frames = collect(&mut pipeline);
    assert_eq!(frames.len(), 10);
    assert_eq!(pipeline.stats().frames_decoded, 10);

    let pts: Vec<_> = frames.iter().map(|f| f.frame.pts.unwrap().0).collect();
    assert_eq!(pts, (0..10).collect::<Vec<_>>());
}

#[test]
fn decoder_busy_with_nothing_to_drain_is_fatal() {
    let demuxer = Demuxer::new(ScriptedReader::interleaved(1, 3)).unwrap();
    let decoder = decoder(&demuxer, 0, QueueDecoder::new(0).stuck());
    let mut pipeline: TestPipeline = Pipeline::new(demuxer, config(30));
    pipeline.register(decoder).unwrap();

    assert!(matches!(pipeline.next_frame(), Err(Error::FatalDecode { .. })));
}

#[test]
fn unregistered_streams_are_dropped() {
    let mut pipeline = pipeline(2, 5, &[1], config(30));
    let frames = collect(&mut pipeline);

    assert_eq!(frames.len(), 5);
    assert!(frames.iter().all(|f| f.stream_index == 1));
    assert_eq!(pipeline.stats().packets_read, 10);
    assert_eq!(pipeline.stats().packets_dropped, 5);
}

#[test]
fn streams_run_independently() {
    let mut pipeline = pipeline(2, 12, &[0, 1], config(30));
    assert_eq!(pipeline.streams().collect::<Vec<_>>(), vec![0, 1]);

    let frames = collect(&mut pipeline);
    assert_eq!(frames.iter().filter(|f| f.stream_index == 0).count(), 12);
    assert_eq!(frames.iter().filter(|f| f.stream_index == 1).count(), 12);
}

#[test]
fn end_of_stream_is_sticky() {
    let mut pipeline = pipeline(1, 4, &[0], config(30));
    collect(&mut pipeline);

    assert!(pipeline.next_frame().unwrap().is_end_of_stream());
    assert!(pipeline.next_frame().unwrap().is_end_of_stream());
}

#[test]
fn matching_geometry_skips_the_scaler() {
    let mut pipeline = pipeline(1, 6, &[0], config(30));
    let frames = collect(&mut pipeline);

    assert_eq!(pipeline.stats().frames_scaled, 0);
    for output in &frames {
        assert_eq!(
            output.frame.geometry(),
            FrameGeometry::new(common::WIDTH, common::HEIGHT, PixelFormat::Yuv420p)
        );
        assert!(output.frame.data.iter().all(|&b| b == 0));
    }
}

#[test]
fn resize_goes_through_the_scaler() {
    let mut pipeline = pipeline(1, 6, &[0], config(30).with_size(4, 2));
    let frames = collect(&mut pipeline);

    assert_eq!(frames.len(), 6);
    assert_eq!(pipeline.stats().frames_scaled, 6);
    for output in &frames {
        assert_eq!(output.frame.geometry(), FrameGeometry::new(4, 2, PixelFormat::Yuv420p));
        assert!(output.frame.data.iter().all(|&b| b == 0x80));
        assert!(output.frame.pts.is_some());
    }
}

#[test]
fn seek_restarts_output() {
    let mut pipeline = pipeline(1, 30, &[0], config(30));

    let mut first = 0;
    pipeline
        .run(|_| {
            first += 1;
            if first == 5 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .unwrap();
    assert_eq!(first, 5);

    pipeline.seek(Duration::from_millis(490)).unwrap();
    let frames = collect(&mut pipeline);
    assert_eq!(frames.len(), 15);
    assert_eq!(frames[0].frame.pts.unwrap().0, 15);

    pipeline.seek(Duration::ZERO).unwrap();
    assert_eq!(collect(&mut pipeline).len(), 30);
}

#[test]
fn scaling_stays_engaged_across_seek() {
    let demuxer = Demuxer::new(ScriptedReader::interleaved(1, 30)).unwrap();
    let decoder = decoder(&demuxer, 0, QueueDecoder::new(2).oversized_before(3));
    let native = config(30).with_size(common::WIDTH, common::HEIGHT);
    let mut pipeline: TestPipeline = Pipeline::new(demuxer, native);
    pipeline.register(decoder).unwrap();

    let before = collect(&mut pipeline);
    assert_eq!(before.len(), 30);
    assert!(before.iter().all(|f| f.frame.data.iter().all(|&b| b == 0x80)));

    // Every frame after this point already has the target size.
    pipeline.seek(Duration::from_millis(490)).unwrap();
    let after = collect(&mut pipeline);
    assert_eq!(after.len(), 15);
    for output in &after {
        assert_eq!(
            output.frame.geometry(),
            FrameGeometry::new(common::WIDTH, common::HEIGHT, PixelFormat::Yuv420p)
        );
        assert!(output.frame.data.iter().all(|&b| b == 0x80));
    }
    assert_eq!(pipeline.stats().frames_scaled, 45);
}

#[test]
fn register_rejects_unknown_streams() {
    let demuxer = Demuxer::new(ScriptedReader::interleaved(1, 1)).unwrap();
    let other = Demuxer::new(ScriptedReader::interleaved(3, 1)).unwrap();
    let stray = decoder(&other, 2, QueueDecoder::new(0));

    let mut pipeline: TestPipeline = Pipeline::new(demuxer, config(30));
    assert!(matches!(pipeline.register(stray), Err(Error::NotFound { .. })));
}

#[test]
fn invalid_filter_config_surfaces_on_first_frame() {
    let mut pipeline = pipeline(1, 3, &[0], config(0));
    assert!(matches!(
        pipeline.next_frame(),
        Err(Error::InvalidGeometry { .. })
    ));
}

#[test]
fn empty_input_ends_immediately() {
    let mut pipeline = pipeline(1, 0, &[0], config(30));
    assert_eq!(pipeline.next_frame().unwrap(), Flow::EndOfStream);
    assert_eq!(pipeline.stats(), Default::default());
}
