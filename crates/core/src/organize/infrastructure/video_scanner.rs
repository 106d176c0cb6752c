use std::fs;
use std::path::{Path, PathBuf};

use crate::shared::constants::VIDEO_EXTENSIONS;

/// True if the path has a known video extension (case-insensitive).
pub fn is_video(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// All video files directly under `source_dir`, sorted by path.
///
/// Subdirectories are not descended into; a previous run's output
/// folders would otherwise be rescanned. The sorted order is what makes
/// cluster ids reproducible for a given directory.
pub fn scan_videos(source_dir: &Path) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut videos = Vec::new();
    for entry in fs::read_dir(source_dir)? {
        let path = entry?.path();
        if path.is_file() && is_video(&path) {
            videos.push(path);
        }
    }
    videos.sort();
    Ok(videos)
}
