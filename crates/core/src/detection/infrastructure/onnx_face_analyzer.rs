use crate::detection::domain::detected_face::DetectedFace;
use crate::detection::domain::face_analyzer::FaceAnalyzer;
use crate::detection::domain::face_locator::FaceLocator;
use crate::shared::frame::Frame;

use super::arcface_embedder::ArcFaceEmbedder;

/// Composes a locator backend with the ArcFace embedder into the
/// [`FaceAnalyzer`] port: every located face gets an identity embedding.
pub struct OnnxFaceAnalyzer {
    locator: Box<dyn FaceLocator>,
    embedder: ArcFaceEmbedder,
}

impl OnnxFaceAnalyzer {
    pub fn new(locator: Box<dyn FaceLocator>, embedder: ArcFaceEmbedder) -> Self {
        Self { locator, embedder }
    }
}

impl FaceAnalyzer for OnnxFaceAnalyzer {
    fn detect_and_embed(
        &mut self,
        frame: &Frame,
    ) -> Result<Vec<DetectedFace>, Box<dyn std::error::Error>> {
        let located = self.locator.locate(frame)?;
        let mut faces = Vec::with_capacity(located.len());
        for l in located {
            let embedding = self.embedder.embed(frame, &l.bbox)?;
            faces.push(DetectedFace {
                bbox: l.bbox,
                embedding,
            });
        }
        Ok(faces)
    }
}
