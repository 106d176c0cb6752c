use std::path::PathBuf;

/// Stream-level facts about one video, captured when the reader opens it.
///
/// `total_frames` may be an estimate (duration × fps) for containers that
/// do not declare a frame count.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
    pub duration_secs: f64,
    pub source_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> VideoMetadata {
        VideoMetadata {
            width: 1080,
            height: 1920,
            fps: 30.0,
            total_frames: 5400,
            duration_secs: 180.0,
            source_path: Some(PathBuf::from("/tmp/fancam.mp4")),
        }
    }

    #[test]
    fn test_construction() {
        let m = meta();
        assert_eq!(m.width, 1080);
        assert_eq!(m.height, 1920);
        assert_eq!(m.total_frames, 5400);
        assert_eq!(m.duration_secs, 180.0);
    }

    #[test]
    fn test_clone_is_equal() {
        let m = meta();
        assert_eq!(m, m.clone());
    }
}
