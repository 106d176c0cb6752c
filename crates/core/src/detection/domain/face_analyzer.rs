use crate::detection::domain::detected_face::DetectedFace;
use crate::shared::frame::Frame;

/// Domain interface for per-frame face analysis: detect every face in a
/// frame and compute an identity embedding for each.
///
/// This is the heavyweight model boundary; it is injected into the
/// fingerprint extractor so tests can stub it without running inference.
pub trait FaceAnalyzer: Send {
    fn detect_and_embed(
        &mut self,
        frame: &Frame,
    ) -> Result<Vec<DetectedFace>, Box<dyn std::error::Error>>;
}
