//! One tiling run: validate, scan, plan, composite, save.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;

use crate::config::{TargetRange, TileConfig};
use crate::error::TileError;
use crate::image_set::ImageSet;
use crate::planner::{CellSize, GridPlan, WellLayout};
use crate::render::{Compositor, LabelStyle, build_tile, save_jpeg};

/// A validated run ready for composition. No image has been decoded yet,
/// only the header of the first one.
#[derive(Debug, Clone)]
pub struct PreparedRun {
    pub images: ImageSet,
    pub plan: GridPlan,
}

/// Validates the configuration and computes the layout.
pub fn prepare(config: &TileConfig) -> Result<PreparedRun, TileError> {
    config.validate()?;
    log::debug!("Working directory: {}", config.dir.display());

    let images = ImageSet::scan(&config.dir, config.channels)?;
    log::debug!(
        "{} png files read. ({} image sets)",
        images.file_count(),
        images.set_count()
    );

    let range = TargetRange::resolve(
        config.start,
        config.end,
        images.set_count(),
        config.format,
        config.alignment,
    )?;
    log::debug!("Tiling target index is from {} to {}", range.start, range.end);

    let original = image::image_dimensions(images.first())?;
    log::info!("Original image size ({},{})", original.0, original.1);

    let cell = CellSize::fit_width(original, config.cell_width);
    let plan = GridPlan::new(
        config.format,
        config.channels,
        range,
        images.set_count(),
        cell,
        config.alignment,
    )?;
    Ok(PreparedRun { images, plan })
}

/// One well of a printed plan, with the files it will be built from.
#[derive(Debug, Serialize)]
pub struct PlannedWell {
    #[serde(flatten)]
    pub layout: WellLayout,
    pub files: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PlanReport {
    pub plan: GridPlan,
    pub canvas: (u32, u32),
    pub wells: Vec<PlannedWell>,
}

impl PreparedRun {
    pub fn report(&self) -> PlanReport {
        let wells = self
            .plan
            .wells()
            .map(|layout| {
                let files = layout
                    .sources
                    .clone()
                    .and_then(|r| self.images.slice(r))
                    .unwrap_or_default()
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect();
                PlannedWell { layout, files }
            })
            .collect();
        PlanReport {
            plan: self.plan,
            canvas: self.plan.canvas_size(),
            wells,
        }
    }
}

/// What a run produced, or would have produced in dry-run mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSummary {
    pub range: TargetRange,
    pub wells_visited: usize,
    pub wells_populated: usize,
    pub tiled_path: PathBuf,
    pub well_images: Vec<PathBuf>,
    pub written: bool,
}

/// Builds the plate map described by `config`.
///
/// In dry-run mode every tile is still composed but nothing is written.
pub fn tile_plate(config: &TileConfig) -> Result<TileSummary, TileError> {
    let prepared = prepare(config)?;
    let plan = prepared.plan;
    let images = &prepared.images;
    let write = !config.dry_run;

    let well_dir = config.well_image_dir();
    if config.export_all && !well_dir.exists() {
        if write {
            fs::create_dir_all(&well_dir)?;
            log::info!("grid_img directory created.");
        } else {
            log::info!("grid_img directory will be created.");
        }
    }

    let font = LabelStyle::load_font(&config.font);
    let mut compositor = Compositor::new(&plan, LabelStyle::new(font, plan.cell, config.text_color));

    if let Some(background) = &config.background {
        if background.exists() {
            compositor.paste_background(&image::open(background)?);
        } else {
            log::warn!("Background image {} not found; skipped", background.display());
        }
    }

    log::info!(
        "Format {}, (cols,rows)=({},{}), channels:{}",
        plan.format,
        plan.format.cols,
        plan.format.rows,
        plan.channels
    );

    let mut wells_visited = 0;
    let mut wells_populated = 0;
    let mut well_images = Vec::new();

    for layout in plan.wells() {
        wells_visited += 1;
        let name = layout.name();

        if let Some(sources) = layout.sources.clone() {
            log::debug!(
                "(col,row)=({},{}),  (wellName,fileIdx,targetIdx)=({},{},{})",
                layout.address.col - 1,
                layout.address.row - 1,
                name,
                sources.start,
                layout.target_idx
            );
            let files = images.slice(sources.clone()).ok_or(TileError::InsufficientImages {
                found: images.set_count(),
                required: sources.end.div_ceil(plan.channels),
            })?;
            let tile = build_tile(plan.cell, files)?;

            if config.export_all {
                let path = well_dir.join(format!("{name}.jpg"));
                if write {
                    save_jpeg(&tile, &path)?;
                } else {
                    log::info!("Well image ({name}) will be saved.");
                }
                well_images.push(path);
            }

            compositor.paste_tile(&tile, layout.origin);
            log::debug!("Pasted to whole image at ({},{})", layout.origin.0, layout.origin.1);
            wells_populated += 1;
        }

        compositor.draw_label(&layout.label);
    }

    let tiled_path = config.tiled_path(plan.range);
    if write {
        compositor.save(&tiled_path)?;
        log::info!("Saved as {}", tiled_path.display());
    } else {
        let (w, h) = compositor.canvas().dimensions();
        log::info!("Whole image ({w}x{h}) will be saved, {}", tiled_path.display());
    }

    Ok(TileSummary {
        range: plan.range,
        wells_visited,
        wells_populated,
        tiled_path,
        well_images,
        written: write,
    })
}
