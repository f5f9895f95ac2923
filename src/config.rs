//! Run configuration, built once from the command line and validated up front.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::TileError;
use crate::plate::PlateFormat;

pub const DEFAULT_CELL_WIDTH: u32 = 400;
pub const DEFAULT_TEXT_COLOR: u8 = 255;
pub const DEFAULT_FONT: &str = "CenturyGothic.ttf";

/// How channel groups in the image set line up with well sequence positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum SourceAlignment {
    /// The image set holds only the wells of the target range, in order.
    #[default]
    Packed,
    /// Group `i` of the image set belongs to sequence position `i + 1`.
    Absolute,
}

impl SourceAlignment {
    /// Flat index of the first file consumed by the first populated well.
    pub fn first_file_index(self, range: TargetRange, channels: usize) -> usize {
        match self {
            SourceAlignment::Packed => 0,
            SourceAlignment::Absolute => range.start.saturating_sub(1) * channels,
        }
    }

    /// Number of complete channel groups the image set must provide.
    pub fn required_sets(self, range: TargetRange) -> usize {
        match self {
            SourceAlignment::Packed => range.len(),
            SourceAlignment::Absolute => range.end,
        }
    }
}

/// Inclusive, 1-based range of well sequence positions that receive images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TargetRange {
    pub start: usize,
    pub end: usize,
}

impl TargetRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Resolves the requested range against the plate and the scanned image set.
    ///
    /// A missing `end` defaults to the number of available image sets, capped at
    /// the plate's well count.
    pub fn resolve(
        start: usize,
        end: Option<usize>,
        available_sets: usize,
        format: PlateFormat,
        alignment: SourceAlignment,
    ) -> Result<Self, TileError> {
        let wells = format.well_count();
        let end = match end {
            Some(end) => end,
            None if available_sets > wells => {
                log::warn!(
                    "{available_sets} image sets found but the {format} plate has {wells} wells; tiling up to {wells}"
                );
                wells
            }
            None => available_sets,
        };

        if start == 0 || start > end || end > wells {
            return Err(TileError::InvalidRange { start, end, wells });
        }

        let range = Self { start, end };
        let required = alignment.required_sets(range);
        if available_sets < required {
            return Err(TileError::InsufficientImages {
                found: available_sets,
                required,
            });
        }
        Ok(range)
    }

    pub fn contains(&self, target_idx: usize) -> bool {
        self.start <= target_idx && target_idx <= self.end
    }

    pub fn len(&self) -> usize {
        (self.end + 1).saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

/// Immutable settings for one tiling run.
#[derive(Debug, Clone)]
pub struct TileConfig {
    pub dir: PathBuf,
    pub format: PlateFormat,
    pub channels: usize,
    pub start: usize,
    pub end: Option<usize>,
    pub export_all: bool,
    pub dry_run: bool,
    pub background: Option<PathBuf>,
    pub cell_width: u32,
    pub text_color: u8,
    pub font: PathBuf,
    pub alignment: SourceAlignment,
}

impl TileConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            format: PlateFormat::default(),
            channels: 1,
            start: 1,
            end: None,
            export_all: false,
            dry_run: false,
            background: None,
            cell_width: DEFAULT_CELL_WIDTH,
            text_color: DEFAULT_TEXT_COLOR,
            font: PathBuf::from(DEFAULT_FONT),
            alignment: SourceAlignment::Packed,
        }
    }

    /// Checks everything that can be checked without listing the directory,
    /// then that the directory exists.
    pub fn validate(&self) -> Result<(), TileError> {
        if self.channels == 0 {
            return Err(TileError::InvalidChannelCount);
        }
        let wells = self.format.well_count();
        if let Some(end) = self.end
            && (self.start == 0 || self.start > end || end > wells)
        {
            return Err(TileError::InvalidRange {
                start: self.start,
                end,
                wells,
            });
        }
        if self.start == 0 || self.start > wells {
            return Err(TileError::InvalidRange {
                start: self.start,
                end: self.end.unwrap_or(wells),
                wells,
            });
        }
        if !self.dir.is_dir() {
            return Err(TileError::DirectoryNotFound(self.dir.clone()));
        }
        Ok(())
    }

    /// Directory receiving per-well exports.
    pub fn well_image_dir(&self) -> PathBuf {
        self.dir.join("grid_img")
    }

    /// Path of the composite plate image for a resolved range.
    pub fn tiled_path(&self, range: TargetRange) -> PathBuf {
        self.dir
            .join(format!("_tiled_{:03}_{:03}.jpg", range.start, range.end))
    }
}
