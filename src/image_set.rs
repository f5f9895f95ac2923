//! Discovery of the per-channel source images of a run directory.

use std::ffi::OsStr;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::error::TileError;

/// Suffix shared by every acquisition image the instrument writes.
pub const RUN_IMAGE_SUFFIX: &str = "Run.png";

fn is_run_image(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(OsStr::to_str) else {
        return false;
    };
    // Hidden files such as macOS `._` sidecars never count as acquisitions.
    !name.starts_with('.') && name.ends_with(RUN_IMAGE_SUFFIX)
}

/// Source images sorted by file name, read as consecutive channel groups.
///
/// File names encode the acquisition sequence, so the lexicographic order is
/// the well order. Never empty.
#[derive(Debug, Clone)]
pub struct ImageSet {
    files: Vec<PathBuf>,
    channels: usize,
}

impl ImageSet {
    /// Groups `files` found in `dir`.
    pub fn new(dir: &Path, mut files: Vec<PathBuf>, channels: usize) -> Result<Self, TileError> {
        if channels == 0 {
            return Err(TileError::InvalidChannelCount);
        }
        if files.is_empty() {
            return Err(TileError::NoImages(dir.to_path_buf()));
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(Self { files, channels })
    }

    /// Lists `*Run.png` files in `dir`.
    pub fn scan(dir: &Path, channels: usize) -> Result<Self, TileError> {
        if !dir.is_dir() {
            return Err(TileError::DirectoryNotFound(dir.to_path_buf()));
        }

        let files: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.is_file() && is_run_image(p))
            .collect();

        let set = Self::new(dir, files, channels)?;
        let leftover = set.files.len() % channels;
        if leftover != 0 {
            log::warn!(
                "{} trailing file(s) do not form a complete {}-channel set and are ignored",
                leftover,
                channels
            );
        }
        Ok(set)
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// First file in acquisition order; its size sets the cell aspect ratio.
    pub fn first(&self) -> &Path {
        &self.files[0]
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of complete channel groups.
    pub fn set_count(&self) -> usize {
        self.files.len() / self.channels
    }

    /// Files behind a flat index range produced by the layout planner.
    pub fn slice(&self, range: Range<usize>) -> Option<&[PathBuf]> {
        self.files.get(range)
    }
}
