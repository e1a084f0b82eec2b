/*!
    Filter stage configuration.
*/

use ffmpeg_types::{FrameGeometry, PixelFormat, Rational};

/**
    Configuration for a [`FilterStage`](crate::FilterStage).

    Output width and height are optional; an unset dimension passes the
    input dimension through unchanged.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct FilterConfig {
    /// Time base of the frames pushed into the graph.
    pub input_time_base: Rational,
    /// Constant output frame rate, in frames per second.
    pub output_frame_rate: u32,
    /// Output width in pixels, or None to keep the input width.
    pub output_width: Option<u32>,
    /// Output height in pixels, or None to keep the input height.
    pub output_height: Option<u32>,
    /// Output pixel format.
    pub output_format: PixelFormat,
}

impl FilterConfig {
    /**
        Create a configuration that only converts frame rate and pixel format.
    */
    pub fn new(input_time_base: Rational, output_frame_rate: u32, output_format: PixelFormat) -> Self {
        Self {
            input_time_base,
            output_frame_rate,
            output_width: None,
            output_height: None,
            output_format,
        }
    }

    /**
        Resize output frames to `width` x `height`.
    */
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.output_width = Some(width);
        self.output_height = Some(height);
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.output_width = Some(width);
        self
    }

    pub fn with_height(mut self, height: u32) -> Self {
        self.output_height = Some(height);
        self
    }

    /**
        Use a different input time base, e.g. the time base of the decoder
        feeding this stage.
    */
    pub fn with_input_time_base(mut self, time_base: Rational) -> Self {
        self.input_time_base = time_base;
        self
    }

    /**
        Returns true if an output dimension is configured.
    */
    pub fn resizes(&self) -> bool {
        self.output_width.is_some() || self.output_height.is_some()
    }

    /**
        The filter chain for this configuration, e.g. `fps=30,scale=1280:ih`.
    */
    pub fn filter_description(&self) -> String {
        let mut description = format!("fps={}", self.output_frame_rate);
        if self.resizes() {
            let width = self
                .output_width
                .map_or_else(|| "iw".to_string(), |w| w.to_string());
            let height = self
                .output_height
                .map_or_else(|| "ih".to_string(), |h| h.to_string());
            description.push_str(&format!(",scale={width}:{height}"));
        }
        description
    }

    /**
        The geometry frames leave the graph with, given the input geometry.
    */
    pub fn target_geometry(&self, input: FrameGeometry) -> FrameGeometry {
        FrameGeometry::new(
            self.output_width.unwrap_or(input.width),
            self.output_height.unwrap_or(input.height),
            self.output_format,
        )
    }
}
