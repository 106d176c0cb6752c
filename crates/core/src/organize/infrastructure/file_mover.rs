use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::organize::domain::placement_planner::MoveEntry;

/// Applies a move plan under `output_root`, creating destination folders
/// as needed.
///
/// A source that no longer exists is skipped with a warning rather than
/// aborting the batch. Returns the final path of every file that was
/// moved.
pub fn apply_plan(
    plan: &[MoveEntry],
    output_root: &Path,
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    fs::create_dir_all(output_root)?;

    let mut moved = Vec::new();
    for entry in plan {
        if !entry.source.exists() {
            log::warn!("Skipping missing file: {}", entry.source.display());
            continue;
        }

        let folder = output_root.join(&entry.folder);
        fs::create_dir_all(&folder)?;

        let file_name = entry
            .source
            .file_name()
            .ok_or_else(|| format!("Source has no file name: {}", entry.source.display()))?;
        let dest = folder.join(file_name);

        move_file(&entry.source, &dest)?;
        moved.push(dest);
    }

    Ok(moved)
}

/// Rename, falling back to copy + remove when the rename fails (e.g.
/// across filesystems).
fn move_file(source: &Path, dest: &Path) -> io::Result<()> {
    match fs::rename(source, dest) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(source, dest)?;
            fs::remove_file(source)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(source: PathBuf, folder: &str) -> MoveEntry {
        MoveEntry {
            source,
            folder: folder.to_string(),
        }
    }

    #[test]
    fn test_moves_files_into_planned_folders() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("a.mp4");
        fs::write(&src, b"video bytes").unwrap();
        let out = tmp.path().join("organized");

        let moved = apply_plan(&[entry(src.clone(), "Dancer_01")], &out).unwrap();

        assert_eq!(moved, vec![out.join("Dancer_01").join("a.mp4")]);
        assert!(!src.exists());
        assert_eq!(fs::read(&moved[0]).unwrap(), b"video bytes");
    }

    #[test]
    fn test_missing_source_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let present = tmp.path().join("b.mp4");
        fs::write(&present, b"x").unwrap();
        let out = tmp.path().join("out");

        let plan = vec![
            entry(tmp.path().join("gone.mp4"), "Unknown"),
            entry(present, "Unknown"),
        ];
        let moved = apply_plan(&plan, &out).unwrap();
        assert_eq!(moved.len(), 1);
    }

    #[test]
    fn test_creates_nested_output_root() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("c.mp4");
        fs::write(&src, b"x").unwrap();
        let out = tmp.path().join("deep").join("organized");

        apply_plan(&[entry(src, "Error")], &out).unwrap();
        assert!(out.join("Error").join("c.mp4").exists());
    }

    #[test]
    fn test_empty_plan_moves_nothing() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("out");
        assert!(apply_plan(&[], &out).unwrap().is_empty());
        assert!(out.exists());
    }

    #[test]
    fn test_multiple_files_same_folder() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.mp4");
        let b = tmp.path().join("b.mp4");
        fs::write(&a, b"1").unwrap();
        fs::write(&b, b"2").unwrap();
        let out = tmp.path().join("out");

        let plan = vec![entry(a, "Dancer_01"), entry(b, "Dancer_01")];
        let moved = apply_plan(&plan, &out).unwrap();
        assert_eq!(moved.len(), 2);
        assert!(out.join("Dancer_01").join("a.mp4").exists());
        assert!(out.join("Dancer_01").join("b.mp4").exists());
    }
}
