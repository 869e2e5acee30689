use serde::{Deserialize, Serialize};

/// Layout algorithm used to arrange the sources on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Grid,
    Horizontal,
    Vertical,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Grid => "grid",
            Strategy::Horizontal => "horizontal",
            Strategy::Vertical => "vertical",
        }
    }
}

/// Pixel dimensions of one decoded source image.
///
/// The planner only ever reads dimensions; pixel data stays with the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSize {
    pub width: u32,
    pub height: u32,
}

/// Top-left canvas coordinate at which one source is stamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub image_index: usize,
    pub x: u32,
    pub y: u32,
}

/// Canvas dimensions plus the ordered placements that fill it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasPlan {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub placements: Vec<Placement>,
}

/// Output resolution requested by the user. Both dimensions are required.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OutputSpec {
    pub target_width: u32,
    pub target_height: u32,
}
