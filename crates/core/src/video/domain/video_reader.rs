use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Decodes frames from a video container.
///
/// Frames are yielded lazily in decode order; the fingerprint extractor
/// selects the sampled indices from the stream and stops early. A single
/// reader instance is reused across videos (`open` → `frames` → `close`).
pub trait VideoReader: Send {
    /// Opens a video file and returns its metadata.
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>>;

    /// Returns an iterator over decoded frames. An `Err` item is a
    /// per-frame decode failure; the stream continues afterwards.
    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_>;

    /// Releases any resources held for the currently open video.
    fn close(&mut self);
}
