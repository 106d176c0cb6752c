use crate::detection::domain::detected_face::DetectedFace;

/// Policy for choosing the main subject among the faces found in a frame.
///
/// Swappable so alternatives (center-most, highest-confidence) can be
/// added without touching the fingerprint extractor.
pub trait FaceSelectionPolicy: Send {
    fn select<'a>(&self, faces: &'a [DetectedFace]) -> Option<&'a DetectedFace>;
}

/// Picks the face with the largest bounding-box area.
///
/// The main dancer is assumed closest to the camera. Mis-selections in
/// crowded frames are tolerated: fingerprints average over many frames.
pub struct LargestFacePolicy;

impl FaceSelectionPolicy for LargestFacePolicy {
    fn select<'a>(&self, faces: &'a [DetectedFace]) -> Option<&'a DetectedFace> {
        let mut best: Option<&DetectedFace> = None;
        for face in faces {
            // Strict comparison keeps the first face on equal areas.
            match best {
                Some(b) if face.bbox.area() <= b.bbox.area() => {}
                _ => best = Some(face),
            }
        }
        best
    }
}
