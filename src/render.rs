//! Pixel side of the plate map: tiles, canvas, labels.

use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;

use crate::error::TileError;
use crate::planner::{CellSize, GridPlan, Label};

const CANVAS_FILL: Rgb<u8> = Rgb([255, 255, 255]);

/// Font, size and colour used for well labels.
pub struct LabelStyle {
    font: Option<FontVec>,
    scale: PxScale,
    color: Rgb<u8>,
}

impl LabelStyle {
    /// Label size is a quarter of the cell height.
    pub fn new(font: Option<FontVec>, cell: CellSize, grey: u8) -> Self {
        Self {
            font,
            scale: PxScale::from((cell.height / 4).max(1) as f32),
            color: Rgb([grey, grey, grey]),
        }
    }

    /// Loads a TrueType/OpenType font. Labels are skipped when this fails.
    pub fn load_font(path: &Path) -> Option<FontVec> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Font {} unavailable ({e}); labels will not be drawn", path.display());
                return None;
            }
        };
        match FontVec::try_from_vec(bytes) {
            Ok(font) => Some(font),
            Err(e) => {
                log::warn!("Font {} is not usable ({e}); labels will not be drawn", path.display());
                None
            }
        }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    pub fn color(&self) -> Rgb<u8> {
        self.color
    }
}

/// Stacks the channel images of one well vertically on a black tile.
pub fn build_tile(cell: CellSize, files: &[PathBuf]) -> Result<RgbImage, TileError> {
    let mut tile = RgbImage::new(cell.width, cell.height * files.len() as u32);
    for (ch, path) in files.iter().enumerate() {
        let original = image::open(path)?;
        let resized = original
            .resize_exact(cell.width, cell.height, FilterType::Triangle)
            .to_rgb8();
        imageops::replace(&mut tile, &resized, 0, i64::from(cell.height) * ch as i64);
    }
    Ok(tile)
}

pub fn save_jpeg(image: &RgbImage, path: &Path) -> Result<(), TileError> {
    image.save_with_format(path, ImageFormat::Jpeg)?;
    Ok(())
}

/// The plate-map canvas, mutated in well traversal order.
pub struct Compositor {
    canvas: RgbImage,
    labels: LabelStyle,
}

impl Compositor {
    pub fn new(plan: &GridPlan, labels: LabelStyle) -> Self {
        let (width, height) = plan.canvas_size();
        Self {
            canvas: RgbImage::from_pixel(width, height, CANVAS_FILL),
            labels,
        }
    }

    /// Pastes an overlay at the canvas origin; anything beyond the canvas is clipped.
    pub fn paste_background(&mut self, background: &DynamicImage) {
        imageops::replace(&mut self.canvas, &background.to_rgb8(), 0, 0);
    }

    pub fn paste_tile(&mut self, tile: &RgbImage, origin: (u32, u32)) {
        imageops::replace(
            &mut self.canvas,
            tile,
            i64::from(origin.0),
            i64::from(origin.1),
        );
    }

    /// Draws a label on top of whatever was pasted before it.
    pub fn draw_label(&mut self, label: &Label) {
        let Some(font) = self.labels.font.as_ref() else {
            return;
        };
        draw_text_mut(
            &mut self.canvas,
            self.labels.color,
            label.x as i32,
            label.y as i32,
            self.labels.scale,
            font,
            &label.text,
        );
    }

    pub fn canvas(&self) -> &RgbImage {
        &self.canvas
    }

    pub fn into_canvas(self) -> RgbImage {
        self.canvas
    }

    pub fn save(&self, path: &Path) -> Result<(), TileError> {
        save_jpeg(&self.canvas, path)
    }
}
