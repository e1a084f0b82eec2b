/*!
    Conditional re-scaling stage.
*/

use ffmpeg_types::{Error, FrameGeometry, Result, VideoFrame};

/**
    A conversion context from one frame geometry to another.
*/
pub trait Scaler: Sized {
    /**
        Create a context converting `source` frames into `target` frames.
        Failures are reported as `Error::ScalerInit`.
    */
    fn build(source: FrameGeometry, target: FrameGeometry) -> Result<Self>;

    /**
        Convert `source` into `destination`, which is already allocated with
        the target geometry.
    */
    fn convert(&mut self, source: &VideoFrame, destination: &mut VideoFrame) -> Result<()>;
}

/**
    Converts frames to a fixed target geometry when they don't already match.

    The scaler is built lazily for the geometry of the frame being converted
    and rebuilt whenever that geometry changes. Once a frame has needed
    scaling the stage stays engaged, so every later frame goes through the
    scaler too, even frames that already match the target.
*/
pub struct ScaleStage<S> {
    target: FrameGeometry,
    scaler: Option<(S, FrameGeometry)>,
    engaged: bool,
    rebuilds: u64,
    frames_scaled: u64,
}

impl<S: Scaler> ScaleStage<S> {
    pub fn new(target: FrameGeometry) -> Self {
        Self {
            target,
            scaler: None,
            engaged: false,
            rebuilds: 0,
            frames_scaled: 0,
        }
    }

    pub fn target(&self) -> FrameGeometry {
        self.target
    }

    /**
        Returns true once any frame has gone through the scaler.
    */
    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    /**
        Number of times a scaler was constructed.
    */
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    pub fn frames_scaled(&self) -> u64 {
        self.frames_scaled
    }

    /**
        Returns true if `frame` would go through the scaler in [`process`](Self::process).
    */
    pub fn needs_scaling(&self, frame: &VideoFrame) -> bool {
        self.engaged || frame.geometry() != self.target
    }

    /**
        Make sure a scaler exists for the geometry of `frame`.

        Returns true if a scaler was (re)built. Fails with
        `Error::ScalerInit` when either geometry is unusable or the engine
        rejects the pair.
    */
    pub fn rebuild_if_needed(&mut self, frame: &VideoFrame) -> Result<bool> {
        let source = frame.geometry();
        if matches!(&self.scaler, Some((_, cached)) if *cached == source) {
            return Ok(false);
        }

        self.scaler = None;
        if !source.is_valid() || !self.target.is_valid() {
            return Err(Error::scaler_init(format!(
                "cannot scale {source} to {}",
                self.target
            )));
        }

        let scaler = S::build(source, self.target).map_err(|e| match e {
            Error::ScalerInit { .. } => e,
            other => Error::scaler_init(other.to_string()),
        })?;

        self.rebuilds += 1;
        tracing::debug!(
            source = %source,
            target = %self.target,
            rebuilds = self.rebuilds,
            "scaler built"
        );

        self.scaler = Some((scaler, source));
        Ok(true)
    }

    /**
        Convert `frame` to the target geometry, carrying its timing and
        aspect ratio over.

        On a conversion failure the scaler is discarded and rebuilt for the
        next frame.
    */
    pub fn scale(&mut self, frame: &VideoFrame) -> Result<VideoFrame> {
        self.rebuild_if_needed(frame)?;
        self.engaged = true;

        let Some((scaler, _)) = self.scaler.as_mut() else {
            return Err(Error::conversion("scaler missing after rebuild"));
        };

        let mut output = VideoFrame::blank(self.target, frame.time_base);
        if let Err(e) = scaler.convert(frame, &mut output) {
            self.scaler = None;
            tracing::warn!(error = %e, "scaler conversion failed");
            return Err(match e {
                Error::Conversion { .. } => e,
                other => Error::conversion(other.to_string()),
            });
        }

        output.copy_metadata_from(frame);
        self.frames_scaled += 1;
        Ok(output)
    }

    /**
        Pass `frame` through untouched when it already matches the target and
        the stage has never scaled, otherwise scale it.
    */
    pub fn process(&mut self, frame: VideoFrame) -> Result<VideoFrame> {
        if !self.needs_scaling(&frame) {
            return Ok(frame);
        }
        self.scale(&frame)
    }
}

impl<S> std::fmt::Debug for ScaleStage<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScaleStage")
            .field("target", &self.target)
            .field("source", &self.scaler.as_ref().map(|(_, g)| *g))
            .field("engaged", &self.engaged)
            .field("rebuilds", &self.rebuilds)
            .finish()
    }
}
