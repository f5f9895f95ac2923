use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use plate_tiler::{SourceAlignment, TileConfig, TileError, prepare, tile_plate};

const RED: Rgb<u8> = Rgb([220, 20, 20]);
const GREEN: Rgb<u8> = Rgb([20, 200, 20]);
const BLUE: Rgb<u8> = Rgb([20, 20, 220]);

fn write_run_images(dir: &Path, colors: &[Rgb<u8>]) -> Vec<PathBuf> {
    colors
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let path = dir.join(format!("A{:03}_Run.png", i + 1));
            RgbImage::from_pixel(64, 48, *c).save(&path).expect("write fixture");
            path
        })
        .collect()
}

fn config(dir: &Path) -> TileConfig {
    let mut config = TileConfig::new(dir);
    config.format = "3x2".parse().expect("format");
    config.cell_width = 32;
    config.font = dir.join("missing-font.ttf");
    config
}

fn assert_dominant(img: &RgbImage, x: u32, y: u32, expected: Rgb<u8>) {
    let p = img.get_pixel(x, y);
    let dominant = |c: &Rgb<u8>| (0..3).max_by_key(|&i| c[i]).expect("channel");
    assert_eq!(dominant(p), dominant(&expected), "pixel ({x},{y}) = {p:?}, expected ~{expected:?}");
}

#[test]
fn writes_plate_map_with_stacked_channels() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_run_images(tmp.path(), &[RED, BLUE, GREEN, RED, BLUE, GREEN]);

    let mut config = config(tmp.path());
    config.channels = 2;
    config.start = 2;
    config.end = Some(4);

    let summary = tile_plate(&config).expect("tile");
    assert_eq!(summary.wells_visited, 4);
    assert_eq!(summary.wells_populated, 3);
    assert_eq!(summary.tiled_path, tmp.path().join("_tiled_002_004.jpg"));
    assert!(summary.written);

    let out = image::open(&summary.tiled_path).expect("open output").to_rgb8();
    assert_eq!(out.dimensions(), ((32 + 4) * 3, (24 + 2) * 2 * 2));

    // R01_C01 is outside the range and keeps the white canvas.
    let white = out.get_pixel(16, 12);
    assert!(white.0.iter().all(|&v| v > 200), "{white:?}");

    // R01_C02 gets files 0 and 1.
    assert_dominant(&out, 36 + 16, 12, RED);
    assert_dominant(&out, 36 + 16, 24 + 12, BLUE);
    // R01_C03 gets files 2 and 3.
    assert_dominant(&out, 72 + 16, 12, GREEN);
    assert_dominant(&out, 72 + 16, 24 + 12, RED);
    // R02_C01 starts two channel rows down.
    assert_dominant(&out, 16, 52 + 12, BLUE);
    assert_dominant(&out, 16, 52 + 24 + 12, GREEN);
}

#[test]
fn dry_run_writes_nothing() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_run_images(tmp.path(), &[RED, GREEN, BLUE]);

    let mut config = config(tmp.path());
    config.dry_run = true;
    config.export_all = true;

    let summary = tile_plate(&config).expect("tile");
    assert!(!summary.written);
    assert_eq!(summary.wells_populated, 3);
    assert_eq!(summary.well_images.len(), 3);
    assert!(!summary.tiled_path.exists());
    assert!(!config.well_image_dir().exists());
}

#[test]
fn export_all_saves_each_populated_well() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_run_images(tmp.path(), &[RED, GREEN, BLUE, RED]);

    let mut config = config(tmp.path());
    config.export_all = true;
    config.start = 3;
    config.end = Some(4);

    let summary = tile_plate(&config).expect("tile");
    let names: Vec<String> = summary
        .well_images
        .iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    assert_eq!(names, ["R01_C03.jpg", "R02_C01.jpg"]);
    for path in &summary.well_images {
        let tile = image::open(path).expect("well image");
        assert_eq!((tile.width(), tile.height()), (32, 24));
    }
    assert!(tmp.path().join("_tiled_003_004.jpg").exists());
}

#[test]
fn insufficient_images_fail_before_decoding() {
    let tmp = tempfile::tempdir().expect("tempdir");
    // Not valid PNG data: any decode attempt would surface as an image error.
    for i in 0..5 {
        fs::write(tmp.path().join(format!("{i:02}_Run.png")), b"not a png").expect("write");
    }

    let mut config = TileConfig::new(tmp.path());
    config.end = Some(10);

    let err = tile_plate(&config).expect_err("too few images");
    assert!(
        matches!(err, TileError::InsufficientImages { found: 5, required: 10 }),
        "{err}"
    );
}

#[test]
fn missing_directory_is_reported() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = TileConfig::new(tmp.path().join("nope.RUN"));
    let err = prepare(&config).expect_err("missing dir");
    assert!(matches!(err, TileError::DirectoryNotFound(ref p) if p.ends_with("nope.RUN")));
}

#[test]
fn directory_without_run_images_is_reported() {
    let tmp = tempfile::tempdir().expect("tempdir");
    RgbImage::from_pixel(4, 4, RED).save(tmp.path().join("overview.png")).expect("write");
    let err = prepare(&TileConfig::new(tmp.path())).expect_err("no images");
    assert!(matches!(err, TileError::NoImages(_)));
}

#[test]
fn prepared_plan_lists_source_files() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let files = write_run_images(tmp.path(), &[RED, GREEN, BLUE, RED, GREEN, BLUE, RED, GREEN]);

    let mut config = config(tmp.path());
    config.channels = 2;
    config.start = 2;
    config.end = Some(4);
    config.alignment = SourceAlignment::Absolute;

    let report = prepare(&config).expect("prepare").report();
    assert_eq!(report.canvas, (108, 104));
    assert_eq!(report.wells.len(), 4);
    assert!(report.wells[0].files.is_empty());
    assert_eq!(
        report.wells[1].files,
        vec![files[2].display().to_string(), files[3].display().to_string()]
    );
    assert_eq!(report.wells[3].layout.label.text, "R02_C01  (4)");

    let json = serde_json::to_value(&report).expect("json");
    assert_eq!(json["wells"][1]["address"]["col"], 2);
}
