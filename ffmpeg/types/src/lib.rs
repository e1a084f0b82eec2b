/*!
    Shared types for the frame pipeline crates.

    This crate defines the vocabulary that crosses stage boundaries. It has no
    dependency on FFmpeg, so the stage state machines can be exercised against
    scripted engines without linking any native libraries.

    # Core Types

    - [`Rational`] - Rational numbers for time bases, frame rates and aspect ratios
    - [`Pts`] and [`MediaDuration`] - Timestamps in time_base units
    - [`Packet`] - Encoded packet data tagged with a stream index
    - [`VideoFrame`] and [`FrameGeometry`] - Decoded pictures and their shape
    - [`StreamDescriptor`] - Static per-stream parameters

    # Control Flow

    - [`Flow`] - The non-error outcome of every stage call
    - [`Error`] and [`Result`] - The error outcome
*/

mod codec;
mod error;
mod flow;
mod format;
mod frame;
mod packet;
mod rational;
mod stream;
mod timestamp;

pub use codec::{CodecId, MediaType};
pub use error::{Error, Result};
pub use flow::Flow;
pub use format::{PixelFormat, PlaneSize};
pub use frame::{FrameGeometry, VideoFrame};
pub use packet::Packet;
pub use rational::Rational;
pub use stream::StreamDescriptor;
pub use timestamp::{MediaDuration, Pts};
