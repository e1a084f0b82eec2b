/*!
    Opaque codec configuration for passing to decoders.
*/

use ffmpeg_next::codec;

/**
    Opaque codec configuration extracted from a container stream.

    Holds the codec parameters needed to open a decoder without exposing
    ffmpeg-next types in the public API. Pass this to `ffmpeg-decode`.
*/
pub struct CodecConfig {
    parameters: codec::Parameters,
}

impl CodecConfig {
    pub(crate) fn new(parameters: codec::Parameters) -> Self {
        Self { parameters }
    }

    /**
        Consume the config, yielding the raw parameters for decoder setup.
    */
    pub fn into_parameters(self) -> codec::Parameters {
        self.parameters
    }
}

impl Clone for CodecConfig {
    fn clone(&self) -> Self {
        Self {
            parameters: self.parameters.clone(),
        }
    }
}

impl std::fmt::Debug for CodecConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecConfig")
            .field("codec_id", &self.parameters.id())
            .finish_non_exhaustive()
    }
}
