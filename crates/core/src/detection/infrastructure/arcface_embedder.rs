/// ArcFace identity embedder using ONNX Runtime.
///
/// Crops a square region around a detected box, resizes to 112×112, and
/// runs the recognition model. Outputs are L2-normalized so cosine math
/// downstream reduces to dot products.
use std::path::Path;

use crate::detection::domain::detected_face::FaceBox;
use crate::shared::frame::Frame;

use super::execution_provider::preferred_execution_providers;

const INPUT_SIZE: usize = 112;
const NORM_MEAN: f32 = 127.5;
const NORM_STD: f32 = 127.5;

pub struct ArcFaceEmbedder {
    session: ort::session::Session,
}

impl ArcFaceEmbedder {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let intra_threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let session = ort::session::Session::builder()?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)?
            .with_inter_threads(1)?
            .with_intra_threads(intra_threads)?
            .with_execution_providers(preferred_execution_providers())?
            .commit_from_file(model_path)?;
        Ok(Self { session })
    }

    /// Embed the face inside `bbox`.
    pub fn embed(
        &mut self,
        frame: &Frame,
        bbox: &FaceBox,
    ) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
        let tensor = preprocess_crop(frame, bbox);
        let input_value = ort::value::Tensor::from_array(tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        let embedding_array = outputs[0].try_extract_array::<f32>()?;
        let embedding_slice = embedding_array
            .as_slice()
            .ok_or("Cannot get embedding slice")?;

        let mut embedding = embedding_slice.to_vec();
        l2_normalize(&mut embedding);
        Ok(embedding)
    }
}

/// Square crop centered on the box (clamped to frame bounds), resized to
/// 112×112 with nearest-neighbor sampling, normalized, NCHW layout.
fn preprocess_crop(frame: &Frame, bbox: &FaceBox) -> ndarray::Array4<f32> {
    let fw = frame.width() as f64;
    let fh = frame.height() as f64;

    let cx = bbox.x + bbox.width / 2.0;
    let cy = bbox.y + bbox.height / 2.0;
    let half = (bbox.width.max(bbox.height) / 2.0).max(1.0);

    let x1 = (cx - half).max(0.0);
    let y1 = (cy - half).max(0.0);
    let x2 = (cx + half).min(fw);
    let y2 = (cy + half).min(fh);

    let crop_w = (x2 - x1).max(1.0);
    let crop_h = (y2 - y1).max(1.0);

    let src = frame.as_ndarray();
    let src_w = frame.width() as usize;
    let src_h = frame.height() as usize;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, INPUT_SIZE, INPUT_SIZE));

    for y in 0..INPUT_SIZE {
        let src_y = ((y1 + (y as f64 + 0.5) * crop_h / INPUT_SIZE as f64) as usize).min(src_h - 1);
        for x in 0..INPUT_SIZE {
            let src_x =
                ((x1 + (x as f64 + 0.5) * crop_w / INPUT_SIZE as f64) as usize).min(src_w - 1);
            for c in 0..3 {
                tensor[[0, c, y, x]] = (src[[src_y, src_x, c]] as f32 - NORM_MEAN) / NORM_STD;
            }
        }
    }

    tensor
}

pub fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
