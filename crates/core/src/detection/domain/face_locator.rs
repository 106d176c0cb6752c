use crate::detection::domain::detected_face::FaceBox;
use crate::shared::frame::Frame;

/// A face location with the detector's confidence score, before any
/// embedding has been computed.
#[derive(Clone, Copy, Debug)]
pub struct LocatedFace {
    pub bbox: FaceBox,
    pub score: f64,
}

/// Domain interface for face detection (boxes only).
///
/// Implementations may be stateful, hence `&mut self`.
pub trait FaceLocator: Send {
    fn locate(&mut self, frame: &Frame) -> Result<Vec<LocatedFace>, Box<dyn std::error::Error>>;
}
