//! Grid layout planner.
//!
//! Maps the time-ordered channel groups of a run onto the wells of a plate,
//! row-major, and computes where each well's tile and label go on the canvas.
//! No pixel data is touched here.

use std::iter::FusedIterator;
use std::ops::Range;

use serde::Serialize;

use crate::config::{SourceAlignment, TargetRange};
use crate::error::TileError;
use crate::plate::{PlateFormat, WellAddress};

/// Horizontal gap between neighbouring well columns, in pixels.
pub const MARGIN_X: u32 = 4;
/// Vertical gap after every channel row of a tile, in pixels.
pub const MARGIN_Y: u32 = 2;
/// Offset of a label from the top-left corner of its cell.
pub const LABEL_OFFSET: u32 = 10;

/// Size of a single resized channel image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellSize {
    pub width: u32,
    pub height: u32,
}

impl CellSize {
    /// Scales `(width, height)` to `target_width`, keeping the aspect ratio.
    ///
    /// The height is floored. Heights beyond `u32` saturate and are rejected
    /// by [`GridPlan::new`].
    pub fn fit_width(source: (u32, u32), target_width: u32) -> Self {
        let (width, height) = source;
        let scaled = if width == 0 {
            0
        } else {
            let exact = u64::from(height) * u64::from(target_width) / u64::from(width);
            u32::try_from(exact).unwrap_or(u32::MAX)
        };
        Self {
            width: target_width,
            height: scaled.max(1),
        }
    }
}

/// Text drawn over a well cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Label {
    pub x: u32,
    pub y: u32,
    pub text: String,
}

/// Everything needed to render one visited well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WellLayout {
    pub address: WellAddress,
    /// 1-based sequence position of the well.
    pub target_idx: usize,
    /// Top-left pixel of the well's tile on the canvas.
    pub origin: (u32, u32),
    /// Flat indices into the image set, present only for wells inside the target range.
    pub sources: Option<Range<usize>>,
    pub label: Label,
}

impl WellLayout {
    pub fn name(&self) -> String {
        self.address.name()
    }

    pub fn is_populated(&self) -> bool {
        self.sources.is_some()
    }
}

/// Validated inputs of a layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridPlan {
    pub format: PlateFormat,
    pub channels: usize,
    pub range: TargetRange,
    pub cell: CellSize,
    pub alignment: SourceAlignment,
    #[serde(skip)]
    canvas: (u32, u32),
}

/// Canvas size in pixels, or `None` when it overflows `u32` or an RGB buffer.
fn canvas_dimensions(format: PlateFormat, channels: usize, cell: CellSize) -> Option<(u32, u32)> {
    let cols = u32::try_from(format.cols).ok()?;
    let rows = u32::try_from(format.rows).ok()?;
    let channels = u32::try_from(channels).ok()?;
    let width = cell.width.checked_add(MARGIN_X)?.checked_mul(cols)?;
    let height = cell
        .height
        .checked_add(MARGIN_Y)?
        .checked_mul(channels)?
        .checked_mul(rows)?;
    let bytes = (u64::from(width) * u64::from(height)).checked_mul(3)?;
    usize::try_from(bytes).ok()?;
    Some((width, height))
}

impl GridPlan {
    pub fn new(
        format: PlateFormat,
        channels: usize,
        range: TargetRange,
        available_sets: usize,
        cell: CellSize,
        alignment: SourceAlignment,
    ) -> Result<Self, TileError> {
        if channels == 0 {
            return Err(TileError::InvalidChannelCount);
        }
        let range = TargetRange::resolve(
            range.start,
            Some(range.end),
            available_sets,
            format,
            alignment,
        )?;
        let canvas = canvas_dimensions(format, channels, cell).ok_or(TileError::CanvasTooLarge {
            format,
            channels,
            width: cell.width,
            height: cell.height,
        })?;
        Ok(Self {
            format,
            channels,
            range,
            cell,
            alignment,
            canvas,
        })
    }

    /// Size of one well's tile with all channels stacked.
    pub fn tile_size(&self) -> (u32, u32) {
        (self.cell.width, self.cell.height * self.channels as u32)
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        self.canvas
    }

    /// Canvas position of the tile at a 0-based row and column.
    ///
    /// Only meaningful for wells on the plate, which always fit the canvas.
    pub fn origin(&self, row: usize, col: usize) -> (u32, u32) {
        (
            (self.cell.width + MARGIN_X) * col as u32,
            (self.cell.height + MARGIN_Y) * self.channels as u32 * row as u32,
        )
    }

    /// A fresh pass over the wells. Each call starts again from `R01_C01`.
    pub fn wells(&self) -> WellLayouts {
        WellLayouts {
            plan: *self,
            position: 0,
            target_idx: 1,
            file_idx: self.alignment.first_file_index(self.range, self.channels),
        }
    }
}

/// Row-major walk over the plate that stops after the well at `range.end`.
#[derive(Debug, Clone)]
pub struct WellLayouts {
    plan: GridPlan,
    position: usize,
    target_idx: usize,
    file_idx: usize,
}

impl WellLayouts {
    fn last_position(&self) -> usize {
        self.plan.range.end.min(self.plan.format.well_count())
    }
}

impl Iterator for WellLayouts {
    type Item = WellLayout;

    fn next(&mut self) -> Option<Self::Item> {
        if self.target_idx > self.plan.range.end {
            return None;
        }
        let address = self.plan.format.address_at(self.position)?;
        let origin = self.plan.origin(address.row - 1, address.col - 1);

        let sources = if self.plan.range.contains(self.target_idx) {
            let slice = self.file_idx..self.file_idx + self.plan.channels;
            self.file_idx = slice.end;
            Some(slice)
        } else {
            None
        };

        let label = Label {
            x: origin.0.saturating_add(LABEL_OFFSET),
            y: origin.1.saturating_add(LABEL_OFFSET),
            text: format!("{}  ({})", address, self.target_idx),
        };

        let layout = WellLayout {
            address,
            target_idx: self.target_idx,
            origin,
            sources,
            label,
        };

        self.position += 1;
        self.target_idx += 1;
        Some(layout)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.last_position().saturating_sub(self.position);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for WellLayouts {}

impl FusedIterator for WellLayouts {}
