use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;
use std::error::Error;
use std::path::PathBuf;

use plate_tiler::config::{DEFAULT_CELL_WIDTH, DEFAULT_FONT, DEFAULT_TEXT_COLOR};
use plate_tiler::{PlateFormat, SourceAlignment, TileConfig, prepare, tile_plate};

#[derive(Parser, Debug)]
#[command(
    name = "plate_tiler",
    about = "Tiles per-well run images into a labeled well-plate map",
    version
)]
struct Cli {
    /// Directory containing the *Run.png images
    dir: PathBuf,

    /// Plate format as <cols>x<rows> (12x8, 24x16) or 96 / 384
    #[arg(short = 'f', long = "format", default_value = "12x8")]
    format: String,

    /// First sequence position to fill with images
    #[arg(short = 's', long = "start", default_value_t = 1)]
    start: usize,

    /// Last sequence position to fill (defaults to the number of image sets)
    #[arg(short = 'e', long = "end")]
    end: Option<usize>,

    /// Number of channel images per well
    #[arg(short = 'c', long = "channel", default_value_t = 1)]
    channel: usize,

    /// Also export every well tile to grid_img/
    #[arg(short = 'a', long = "export-all", alias = "export_all")]
    export_all: bool,

    /// Dry run: report what would be written without writing anything
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    /// Image pasted at the canvas origin before tiling
    #[arg(short = 'b', long = "background")]
    background: Option<PathBuf>,

    /// Width of each resized image in pixels
    #[arg(
        short = 'w',
        long = "width-to",
        alias = "width_to",
        default_value_t = DEFAULT_CELL_WIDTH,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    width_to: u32,

    /// Label colour as a grey level
    #[arg(short = 't', long = "text-color", alias = "text_color", default_value_t = DEFAULT_TEXT_COLOR)]
    text_color: u8,

    /// Font used for well labels
    #[arg(long = "font", default_value = DEFAULT_FONT)]
    font: PathBuf,

    /// Image sets are numbered from position 1 even when --start is later
    #[arg(long = "absolute-index")]
    absolute_index: bool,

    /// Print the layout plan as JSON and exit
    #[arg(long = "plan")]
    plan: bool,
}

impl Cli {
    fn into_config(self) -> Result<TileConfig, Box<dyn Error>> {
        let format: PlateFormat = self.format.parse()?;
        Ok(TileConfig {
            dir: self.dir,
            format,
            channels: self.channel,
            start: self.start,
            end: self.end,
            export_all: self.export_all,
            dry_run: self.debug,
            background: self.background,
            cell_width: self.width_to,
            text_color: self.text_color,
            font: self.font,
            alignment: if self.absolute_index {
                SourceAlignment::Absolute
            } else {
                SourceAlignment::Packed
            },
        })
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let level = if cli.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();

    let print_plan = cli.plan;
    let config = cli.into_config()?;

    if print_plan {
        let prepared = prepare(&config)?;
        println!("{}", serde_json::to_string_pretty(&prepared.report())?);
        return Ok(());
    }

    let summary = tile_plate(&config)?;
    log::info!(
        "{} wells labeled, {} populated ({}..={})",
        summary.wells_visited,
        summary.wells_populated,
        summary.range.start,
        summary.range.end
    );
    Ok(())
}
