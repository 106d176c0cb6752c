use std::path::{Path, PathBuf};

/// One `video | timestamps` pair from a batch sheet.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchPair {
    pub video: PathBuf,
    pub timestamps: PathBuf,
}

/// Parse a batch sheet of `video | timestamps` lines.
///
/// Empty lines and `#` comments are skipped; lines without a `|`
/// separator are warned about and skipped. Relative paths resolve
/// against `sheet_dir`, the directory the sheet lives in.
pub fn parse_batch_sheet(text: &str, sheet_dir: &Path) -> Vec<BatchPair> {
    let mut pairs = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((video, timestamps)) = line.split_once('|') else {
            log::warn!("Skipping batch line without '|' separator: {line}");
            continue;
        };

        pairs.push(BatchPair {
            video: resolve(video.trim(), sheet_dir),
            timestamps: resolve(timestamps.trim(), sheet_dir),
        });
    }

    pairs
}

fn resolve(path: &str, sheet_dir: &Path) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        sheet_dir.join(path)
    }
}
