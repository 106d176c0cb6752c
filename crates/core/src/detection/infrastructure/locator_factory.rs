use std::path::Path;

use crate::detection::domain::face_locator::FaceLocator;
use crate::shared::constants::{
    RETINAFACE_MODEL_NAME, RETINAFACE_MODEL_URL, YOLO_FACE_MODEL_NAME, YOLO_FACE_MODEL_URL,
};

use super::onnx_retinaface_locator::{self, OnnxRetinaFaceLocator};
use super::onnx_yolo_locator::{self, OnnxYoloLocator};

/// Selectable face-detection backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectorBackend {
    RetinaFace,
    Yolo,
}

impl DetectorBackend {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "retinaface" => Some(Self::RetinaFace),
            "yolo" => Some(Self::Yolo),
            _ => None,
        }
    }

    pub fn model_name(&self) -> &'static str {
        match self {
            Self::RetinaFace => RETINAFACE_MODEL_NAME,
            Self::Yolo => YOLO_FACE_MODEL_NAME,
        }
    }

    pub fn model_url(&self) -> &'static str {
        match self {
            Self::RetinaFace => RETINAFACE_MODEL_URL,
            Self::Yolo => YOLO_FACE_MODEL_URL,
        }
    }

    /// Backend-specific default confidence threshold.
    pub fn default_confidence(&self) -> f64 {
        match self {
            Self::RetinaFace => onnx_retinaface_locator::DEFAULT_CONFIDENCE,
            Self::Yolo => onnx_yolo_locator::DEFAULT_CONFIDENCE,
        }
    }
}

impl Default for DetectorBackend {
    fn default() -> Self {
        Self::RetinaFace
    }
}

/// Build the locator for a backend from a resolved model file.
pub fn create_locator(
    backend: DetectorBackend,
    model_path: &Path,
    confidence: f64,
) -> Result<Box<dyn FaceLocator>, Box<dyn std::error::Error>> {
    match backend {
        DetectorBackend::RetinaFace => {
            Ok(Box::new(OnnxRetinaFaceLocator::new(model_path, confidence)?))
        }
        DetectorBackend::Yolo => Ok(Box::new(OnnxYoloLocator::new(model_path, confidence)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_backends() {
        assert_eq!(
            DetectorBackend::parse("retinaface"),
            Some(DetectorBackend::RetinaFace)
        );
        assert_eq!(DetectorBackend::parse("YOLO"), Some(DetectorBackend::Yolo));
    }

    #[test]
    fn test_parse_unknown_backend() {
        assert!(DetectorBackend::parse("mtcnn").is_none());
    }

    #[test]
    fn test_default_is_retinaface() {
        assert_eq!(DetectorBackend::default(), DetectorBackend::RetinaFace);
    }

    #[test]
    fn test_model_names_differ_per_backend() {
        assert_ne!(
            DetectorBackend::RetinaFace.model_name(),
            DetectorBackend::Yolo.model_name()
        );
    }
}
