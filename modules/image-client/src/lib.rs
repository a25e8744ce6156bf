pub mod error;
pub mod openai;
pub mod replicate;
pub mod stability;
pub mod util;

pub use error::{ImageError, Result};
pub use openai::OpenAiImages;
pub use replicate::{JobState, Prediction, ReplicateImages};
pub use stability::StabilityImages;

/// Requested output dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const SQUARE: ImageSize = ImageSize {
        width: 1024,
        height: 1024,
    };

    /// OpenAI-style `"{w}x{h}"` size string.
    pub fn as_dimensions(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

impl Default for ImageSize {
    fn default() -> Self {
        Self::SQUARE
    }
}
