use std::path::Path;

use crate::detection::domain::face_analyzer::FaceAnalyzer;
use crate::detection::domain::face_selector::FaceSelectionPolicy;
use crate::fingerprint::fingerprint::mean_embedding;
use crate::fingerprint::frame_sampler::sample_indices;
use crate::fingerprint::video_record::{ExtractionStatus, VideoRecord};
use crate::shared::frame::Frame;
use crate::video::domain::video_reader::VideoReader;

/// How frames are drawn from each video for fingerprinting.
#[derive(Clone, Copy, Debug)]
pub struct SamplingConfig {
    pub frames_to_extract: usize,
    pub skip_fraction: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            frames_to_extract: 20,
            skip_fraction: 0.10,
        }
    }
}

/// Produces one identity fingerprint per video.
///
/// Samples evenly spaced frames, asks the analyzer for faces and
/// embeddings, lets the selection policy pick the main subject per
/// frame, and averages the selected embeddings. Any per-frame decode or
/// analysis failure is logged and skipped; only a video with no usable
/// frame at all is marked `DetectionFailed`.
pub struct FingerprintExtractor {
    reader: Box<dyn VideoReader>,
    analyzer: Box<dyn FaceAnalyzer>,
    policy: Box<dyn FaceSelectionPolicy>,
    sampling: SamplingConfig,
}

impl FingerprintExtractor {
    pub fn new(
        reader: Box<dyn VideoReader>,
        analyzer: Box<dyn FaceAnalyzer>,
        policy: Box<dyn FaceSelectionPolicy>,
        sampling: SamplingConfig,
    ) -> Self {
        Self {
            reader,
            analyzer,
            policy,
            sampling,
        }
    }

    pub fn extract(&mut self, path: &Path) -> VideoRecord {
        let mut record = VideoRecord::pending(path.to_path_buf());

        let metadata = match self.reader.open(path) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("Could not open {}: {e}", path.display());
                record.status = ExtractionStatus::DetectionFailed;
                return record;
            }
        };

        // A container without a frame count gets the first N frames
        // instead of an evenly spaced sample.
        let wanted = if metadata.total_frames == 0 {
            (0..self.sampling.frames_to_extract).collect()
        } else {
            sample_indices(
                metadata.total_frames,
                self.sampling.frames_to_extract,
                self.sampling.skip_fraction,
            )
        };

        let frames = self.collect_sampled_frames(&wanted);
        self.reader.close();

        let mut embeddings = Vec::new();
        let mut best_area: Option<f64> = None;

        for frame in &frames {
            let faces = match self.analyzer.detect_and_embed(frame) {
                Ok(faces) => faces,
                Err(e) => {
                    log::debug!(
                        "Face analysis failed on frame {} of {}: {e}",
                        frame.index(),
                        path.display()
                    );
                    continue;
                }
            };

            if let Some(face) = self.policy.select(&faces) {
                let area = face.bbox.area();
                if best_area.map_or(true, |a| area > a) {
                    best_area = Some(area);
                }
                embeddings.push(face.embedding.clone());
            }
        }

        match mean_embedding(&embeddings) {
            Some(fingerprint) => {
                record.status = ExtractionStatus::Fingerprinted;
                record.fingerprint = Some(fingerprint);
                record.face_area = best_area;
            }
            None => {
                log::info!("No usable face in {}", path.display());
                record.status = ExtractionStatus::DetectionFailed;
            }
        }
        record
    }

    /// Decode the stream in order, keeping frames whose index is in
    /// `wanted` (sorted ascending) and stopping after the last one.
    /// Decode failures skip the frame, not the video.
    fn collect_sampled_frames(&mut self, wanted: &[usize]) -> Vec<Frame> {
        let Some(&last) = wanted.last() else {
            return Vec::new();
        };

        let mut sampled = Vec::with_capacity(wanted.len());
        let mut cursor = 0;

        for result in self.reader.frames() {
            let frame = match result {
                Ok(frame) => frame,
                Err(e) => {
                    log::debug!("Frame decode failed: {e}");
                    continue;
                }
            };

            let index = frame.index();
            while cursor < wanted.len() && wanted[cursor] < index {
                cursor += 1;
            }
            if cursor < wanted.len() && wanted[cursor] == index {
                sampled.push(frame);
                cursor += 1;
            }
            if index >= last {
                break;
            }
        }

        sampled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    use crate::detection::domain::detected_face::{DetectedFace, FaceBox};
    use crate::detection::domain::face_selector::LargestFacePolicy;
    use crate::shared::video_metadata::VideoMetadata;

    // --- Stubs ---

    struct StubReader {
        frames: Vec<Frame>,
        total_frames: usize,
        fail_open: bool,
    }

    impl StubReader {
        fn new(frames: Vec<Frame>) -> Self {
            let total = frames.len();
            Self {
                frames,
                total_frames: total,
                fail_open: false,
            }
        }
    }

    impl VideoReader for StubReader {
        fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
            if self.fail_open {
                return Err("cannot open".into());
            }
            Ok(VideoMetadata {
                width: 100,
                height: 100,
                fps: 30.0,
                total_frames: self.total_frames,
                duration_secs: self.total_frames as f64 / 30.0,
                source_path: Some(path.to_path_buf()),
            })
        }

        fn frames(
            &mut self,
        ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
            // Clone so the reader can be reopened for idempotence tests.
            Box::new(self.frames.clone().into_iter().map(Ok))
        }

        fn close(&mut self) {}
    }

    struct StubAnalyzer {
        faces_by_index: HashMap<usize, Vec<DetectedFace>>,
        fail_indices: Vec<usize>,
        seen: Arc<Mutex<Vec<usize>>>,
    }

    impl StubAnalyzer {
        fn new(faces_by_index: HashMap<usize, Vec<DetectedFace>>) -> Self {
            Self {
                faces_by_index,
                fail_indices: Vec::new(),
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl FaceAnalyzer for StubAnalyzer {
        fn detect_and_embed(
            &mut self,
            frame: &Frame,
        ) -> Result<Vec<DetectedFace>, Box<dyn std::error::Error>> {
            self.seen.lock().unwrap().push(frame.index());
            if self.fail_indices.contains(&frame.index()) {
                return Err("inference failed".into());
            }
            Ok(self
                .faces_by_index
                .get(&frame.index())
                .cloned()
                .unwrap_or_default())
        }
    }

    // --- Helpers ---

    fn make_frame(index: usize) -> Frame {
        Frame::new(vec![128; 4 * 4 * 3], 4, 4, 3, index)
    }

    fn face(area_side: f64, embedding: Vec<f32>) -> DetectedFace {
        DetectedFace {
            bbox: FaceBox {
                x: 0.0,
                y: 0.0,
                width: area_side,
                height: area_side,
            },
            embedding,
        }
    }

    fn extractor_with(
        frames: Vec<Frame>,
        analyzer: StubAnalyzer,
        count: usize,
    ) -> FingerprintExtractor {
        FingerprintExtractor::new(
            Box::new(StubReader::new(frames)),
            Box::new(analyzer),
            Box::new(LargestFacePolicy),
            SamplingConfig {
                frames_to_extract: count,
                skip_fraction: 0.0,
            },
        )
    }

    // --- Tests ---

    #[test]
    fn test_all_frames_without_faces_is_detection_failure() {
        let frames = vec![make_frame(0), make_frame(1), make_frame(2)];
        let analyzer = StubAnalyzer::new(HashMap::new());
        let mut extractor = extractor_with(frames, analyzer, 3);

        let record = extractor.extract(&PathBuf::from("v.mp4"));
        assert_eq!(record.status, ExtractionStatus::DetectionFailed);
        assert!(record.fingerprint.is_none());
    }

    #[test]
    fn test_unopenable_video_is_detection_failure() {
        let mut reader = StubReader::new(vec![]);
        reader.fail_open = true;
        let mut extractor = FingerprintExtractor::new(
            Box::new(reader),
            Box::new(StubAnalyzer::new(HashMap::new())),
            Box::new(LargestFacePolicy),
            SamplingConfig::default(),
        );

        let record = extractor.extract(&PathBuf::from("broken.mp4"));
        assert_eq!(record.status, ExtractionStatus::DetectionFailed);
    }

    #[test]
    fn test_fingerprint_is_elementwise_mean() {
        let mut faces = HashMap::new();
        faces.insert(0, vec![face(10.0, vec![1.0, 2.0])]);
        faces.insert(1, vec![face(10.0, vec![3.0, 6.0])]);
        let analyzer = StubAnalyzer::new(faces);
        let mut extractor = extractor_with(vec![make_frame(0), make_frame(1)], analyzer, 2);

        let record = extractor.extract(&PathBuf::from("v.mp4"));
        assert_eq!(record.status, ExtractionStatus::Fingerprinted);
        assert_eq!(record.fingerprint.unwrap(), vec![2.0, 4.0]);
    }

    #[test]
    fn test_per_frame_analyzer_error_is_skipped() {
        let mut faces = HashMap::new();
        faces.insert(0, vec![face(10.0, vec![5.0])]);
        faces.insert(1, vec![face(10.0, vec![7.0])]);
        let mut analyzer = StubAnalyzer::new(faces);
        analyzer.fail_indices = vec![1];
        let mut extractor = extractor_with(vec![make_frame(0), make_frame(1)], analyzer, 2);

        let record = extractor.extract(&PathBuf::from("v.mp4"));
        // Only frame 0 contributes.
        assert_eq!(record.fingerprint.unwrap(), vec![5.0]);
    }

    #[test]
    fn test_policy_picks_largest_face_per_frame() {
        let mut faces = HashMap::new();
        faces.insert(
            0,
            vec![face(5.0, vec![100.0]), face(20.0, vec![1.0]), face(10.0, vec![50.0])],
        );
        let analyzer = StubAnalyzer::new(faces);
        let mut extractor = extractor_with(vec![make_frame(0)], analyzer, 1);

        let record = extractor.extract(&PathBuf::from("v.mp4"));
        assert_eq!(record.fingerprint.unwrap(), vec![1.0]);
        assert_eq!(record.face_area, Some(400.0));
    }

    #[test]
    fn test_only_sampled_frames_are_analyzed() {
        let frames: Vec<Frame> = (0..10).map(make_frame).collect();
        let analyzer = StubAnalyzer::new(HashMap::new());
        let seen = analyzer.seen.clone();
        let mut extractor = extractor_with(frames, analyzer, 2);

        extractor.extract(&PathBuf::from("v.mp4"));
        // 10 frames, 2 requested, no skip → indices 0 and 5
        assert_eq!(*seen.lock().unwrap(), vec![0, 5]);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let mut faces = HashMap::new();
        faces.insert(0, vec![face(10.0, vec![0.25, 0.75])]);
        faces.insert(1, vec![face(12.0, vec![0.75, 0.25])]);

        let run = || {
            let analyzer = StubAnalyzer::new(faces.clone());
            let mut extractor = extractor_with(vec![make_frame(0), make_frame(1)], analyzer, 2);
            extractor.extract(&PathBuf::from("v.mp4"))
        };

        let first = run();
        let second = run();
        assert_eq!(first.fingerprint, second.fingerprint);
    }

    #[test]
    fn test_unknown_frame_count_falls_back_to_leading_frames() {
        let frames = vec![make_frame(0), make_frame(1), make_frame(2)];
        let mut reader = StubReader::new(frames);
        reader.total_frames = 0;
        let mut faces = HashMap::new();
        faces.insert(0, vec![face(10.0, vec![4.0])]);
        let mut extractor = FingerprintExtractor::new(
            Box::new(reader),
            Box::new(StubAnalyzer::new(faces)),
            Box::new(LargestFacePolicy),
            SamplingConfig {
                frames_to_extract: 2,
                skip_fraction: 0.10,
            },
        );

        let record = extractor.extract(&PathBuf::from("v.webm"));
        assert_eq!(record.status, ExtractionStatus::Fingerprinted);
    }
}
