/*!
    Probing functionality for extracting stream metadata.
*/

use std::path::Path;

use ffmpeg_types::{Result, StreamDescriptor};

use crate::input::FfmpegInput;
use crate::reader::PacketReader;

/**
    Open a media file just long enough to describe its streams.

    # Example

    ```ignore
    for stream in probe("video.mp4")? {
        println!("#{} {:?} {}x{}", stream.index, stream.codec_id, stream.width, stream.height);
    }
    ```
*/
pub fn probe<P: AsRef<Path>>(path: P) -> Result<Vec<StreamDescriptor>> {
    let input = FfmpegInput::open(path)?;
    Ok(input.streams().to_vec())
}
