use core_types::{CanvasPlan, OutputSpec};
use image::imageops::{overlay, resize, FilterType};
use image::{ImageFormat, Rgb, RgbImage};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Invalid output dimensions {width}x{height}")]
    InvalidOutputDimensions { width: u32, height: u32 },

    #[error("Placement references image {index} but only {count} were supplied")]
    MissingSource { index: usize, count: usize },
}

pub type Result<T> = std::result::Result<T, EngineError>;

const BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);

pub struct CollageEngine;

impl CollageEngine {
    pub fn new() -> Self {
        Self
    }

    /// Decode a file into an RGB raster. Alpha, if present, is dropped.
    pub fn open_image<P: AsRef<Path>>(&self, path: P) -> Result<RgbImage> {
        let dyn_img =
            image::open(path.as_ref()).map_err(|e| EngineError::Decode(e.to_string()))?;
        Ok(dyn_img.to_rgb8())
    }

    /// Stamp `sources` onto a background-filled canvas per `plan`, then
    /// resample to the exact output dimensions with Lanczos filtering.
    ///
    /// Later placements overwrite earlier ones where they overlap, and a
    /// source extending past the canvas is clipped there. The composer has no
    /// side effects beyond the returned image.
    pub fn compose(
        &self,
        sources: &[RgbImage],
        plan: &CanvasPlan,
        output: &OutputSpec,
    ) -> Result<RgbImage> {
        if output.target_width == 0 || output.target_height == 0 {
            return Err(EngineError::InvalidOutputDimensions {
                width: output.target_width,
                height: output.target_height,
            });
        }

        let canvas = assemble(sources, plan)?;
        Ok(resample(canvas, output))
    }

    /// Encode `image` as PNG at `path`, whatever the path's extension says.
    pub fn save_png<P: AsRef<Path>>(&self, image: &RgbImage, path: P) -> Result<()> {
        image
            .save_with_format(path.as_ref(), ImageFormat::Png)
            .map_err(|e| EngineError::Encode(e.to_string()))
    }
}

impl Default for CollageEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn assemble(sources: &[RgbImage], plan: &CanvasPlan) -> Result<RgbImage> {
    let mut canvas = RgbImage::from_pixel(plan.canvas_width, plan.canvas_height, BACKGROUND);
    for placement in &plan.placements {
        let source = sources
            .get(placement.image_index)
            .ok_or(EngineError::MissingSource {
                index: placement.image_index,
                count: sources.len(),
            })?;
        overlay(
            &mut canvas,
            source,
            i64::from(placement.x),
            i64::from(placement.y),
        );
    }
    Ok(canvas)
}

fn resample(canvas: RgbImage, output: &OutputSpec) -> RgbImage {
    let (width, height) = canvas.dimensions();
    if width == output.target_width && height == output.target_height {
        return canvas;
    }
    resize(
        &canvas,
        output.target_width,
        output.target_height,
        FilterType::Lanczos3,
    )
}
