/// File extensions treated as video input when scanning a source folder.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "webm", "flv", "wmv"];

pub const RETINAFACE_MODEL_NAME: &str = "retinaface_mnet025.onnx";
pub const RETINAFACE_MODEL_URL: &str =
    "https://github.com/fancam-tools/fancam-tools/releases/download/v0.1.0/retinaface_mnet025.onnx";

pub const YOLO_FACE_MODEL_NAME: &str = "yolo11n_widerface.onnx";
pub const YOLO_FACE_MODEL_URL: &str =
    "https://github.com/fancam-tools/fancam-tools/releases/download/v0.1.0/yolo11n_widerface.onnx";

pub const ARCFACE_MODEL_NAME: &str = "w600k_r50.onnx";
pub const ARCFACE_MODEL_URL: &str =
    "https://github.com/fancam-tools/fancam-tools/releases/download/v0.1.0/w600k_r50.onnx";

/// Output dimensionality of the ArcFace embedding model.
pub const EMBEDDING_DIM: usize = 512;
