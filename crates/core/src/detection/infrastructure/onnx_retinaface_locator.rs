/// RetinaFace locator using ONNX Runtime via `ort`.
///
/// Standard single-stage RetinaFace export: three FPN levels (strides 8,
/// 16, 32) with two anchor sizes per cell, box deltas decoded against
/// prior boxes with variances 0.1/0.2. Landmark outputs are ignored.
use std::path::Path;

use crate::detection::domain::detected_face::FaceBox;
use crate::detection::domain::face_locator::{FaceLocator, LocatedFace};
use crate::shared::frame::Frame;

use super::execution_provider::preferred_execution_providers;
use super::math;

/// Fallback input resolution when the model doesn't declare dimensions.
const DEFAULT_INPUT_SIZE: u32 = 640;

/// Default confidence threshold for face detection.
pub const DEFAULT_CONFIDENCE: f64 = 0.6;

/// NMS IoU threshold.
const NMS_IOU_THRESH: f64 = 0.4;

/// Per-channel BGR means subtracted during preprocessing.
const BGR_MEAN: [f32; 3] = [104.0, 117.0, 123.0];

/// Prior-box layout of the standard RetinaFace export.
const STRIDES: [usize; 3] = [8, 16, 32];
const MIN_SIZES: [[f64; 2]; 3] = [[16.0, 32.0], [64.0, 128.0], [256.0, 512.0]];

/// Center/size decode variances.
const VARIANCES: [f64; 2] = [0.1, 0.2];

pub struct OnnxRetinaFaceLocator {
    session: ort::session::Session,
    confidence: f64,
    input_size: u32,
    priors: Vec<Prior>,
}

/// Prior box in coordinates relative to the model input.
#[derive(Clone, Copy)]
struct Prior {
    cx: f64,
    cy: f64,
    w: f64,
    h: f64,
}

impl OnnxRetinaFaceLocator {
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?
            .with_execution_providers(preferred_execution_providers())?
            .commit_from_file(model_path)?;

        let input_size = session
            .inputs()
            .first()
            .and_then(|input| {
                if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                    if shape.len() >= 4 && shape[2] > 0 {
                        Some(shape[2] as u32)
                    } else {
                        None
                    }
                } else {
                    None
                }
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);

        Ok(Self {
            session,
            confidence,
            input_size,
            priors: generate_priors(input_size as usize),
        })
    }
}

impl FaceLocator for OnnxRetinaFaceLocator {
    fn locate(&mut self, frame: &Frame) -> Result<Vec<LocatedFace>, Box<dyn std::error::Error>> {
        let input_tensor = preprocess(frame, self.input_size);

        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;

        // Identify loc/conf outputs by their trailing dimension; export
        // order varies between converters.
        let mut loc: Option<Vec<f32>> = None;
        let mut conf: Option<Vec<f32>> = None;
        for i in 0..outputs.len() {
            let tensor = outputs[i].try_extract_array::<f32>()?;
            let shape = tensor.shape();
            let Some(&last) = shape.last() else { continue };
            let data = tensor
                .as_slice()
                .ok_or("Cannot get tensor slice")?
                .to_vec();
            match last {
                4 => loc = Some(data),
                2 => conf = Some(data),
                _ => {} // landmark output, unused
            }
        }
        let loc = loc.ok_or("RetinaFace model produced no box output")?;
        let conf = conf.ok_or("RetinaFace model produced no score output")?;

        if loc.len() != self.priors.len() * 4 || conf.len() != self.priors.len() * 2 {
            return Err(format!(
                "RetinaFace output size mismatch: {} priors, {} loc, {} conf",
                self.priors.len(),
                loc.len(),
                conf.len()
            )
            .into());
        }

        let fw = frame.width() as f64;
        let fh = frame.height() as f64;

        let mut raw = Vec::new();
        for (i, prior) in self.priors.iter().enumerate() {
            let score = conf[i * 2 + 1] as f64;
            if score < self.confidence {
                continue;
            }

            let (x1, y1, w, h) = decode_box(prior, &loc[i * 4..i * 4 + 4]);

            // Relative coords map straight onto the frame.
            raw.push(LocatedFace {
                bbox: FaceBox {
                    x: x1 * fw,
                    y: y1 * fh,
                    width: w * fw,
                    height: h * fh,
                },
                score,
            });
        }

        Ok(math::nms(raw, NMS_IOU_THRESH))
    }
}

/// Decode one prior + loc delta into a relative `(x1, y1, w, h)` box.
fn decode_box(prior: &Prior, delta: &[f32]) -> (f64, f64, f64, f64) {
    let cx = prior.cx + delta[0] as f64 * VARIANCES[0] * prior.w;
    let cy = prior.cy + delta[1] as f64 * VARIANCES[0] * prior.h;
    let w = prior.w * (delta[2] as f64 * VARIANCES[1]).exp();
    let h = prior.h * (delta[3] as f64 * VARIANCES[1]).exp();
    (cx - w / 2.0, cy - h / 2.0, w, h)
}

/// Prior boxes for a square input, in row-major feature-map order per
/// level, two sizes per cell.
fn generate_priors(input_size: usize) -> Vec<Prior> {
    let mut priors = Vec::new();
    for (level, &stride) in STRIDES.iter().enumerate() {
        let feature = input_size.div_ceil(stride);
        for i in 0..feature {
            for j in 0..feature {
                for &min_size in &MIN_SIZES[level] {
                    priors.push(Prior {
                        cx: (j as f64 + 0.5) * stride as f64 / input_size as f64,
                        cy: (i as f64 + 0.5) * stride as f64 / input_size as f64,
                        w: min_size / input_size as f64,
                        h: min_size / input_size as f64,
                    });
                }
            }
        }
    }
    priors
}

/// Resize to `size` × `size` and subtract the BGR channel means.
///
/// RetinaFace exports expect BGR input without scaling to [0, 1].
fn preprocess(frame: &Frame, size: u32) -> ndarray::Array4<f32> {
    let src = frame.as_ndarray();
    let src_w = frame.width() as usize;
    let src_h = frame.height() as usize;
    let target = size as usize;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, target, target));

    for y in 0..target {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / target as f64) as usize).min(src_h - 1);
        for x in 0..target {
            let src_x = (((x as f64 + 0.5) * src_w as f64 / target as f64) as usize).min(src_w - 1);
            // Frame is RGB; the model wants BGR.
            for (c, &rgb_c) in [2usize, 1, 0].iter().enumerate() {
                tensor[[0, c, y, x]] = src[[src_y, src_x, rgb_c]] as f32 - BGR_MEAN[c];
            }
        }
    }

    tensor
}
