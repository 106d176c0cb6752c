use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::clustering::dbscan;
use crate::fingerprint::extractor::FingerprintExtractor;
use crate::fingerprint::video_record::{ExtractionStatus, VideoRecord};
use crate::organize::domain::placement_planner::{
    plan_moves, ClusterAssignment, Label, MoveEntry,
};

/// DBSCAN parameters for identity clustering.
#[derive(Clone, Copy, Debug)]
pub struct ClusteringConfig {
    pub eps: f64,
    pub min_samples: usize,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            eps: 0.4,
            min_samples: 1,
        }
    }
}

/// Everything one organize run produced.
pub struct OrganizeOutcome {
    pub records: Vec<VideoRecord>,
    pub assignments: Vec<ClusterAssignment>,
    pub plan: Vec<MoveEntry>,
}

impl OrganizeOutcome {
    /// Number of distinct identity clusters found.
    pub fn cluster_count(&self) -> usize {
        self.assignments
            .iter()
            .filter_map(|a| match a.label {
                Label::Dancer(id) => Some(id),
                _ => None,
            })
            .collect::<std::collections::HashSet<_>>()
            .len()
    }

    pub fn unknown_count(&self) -> usize {
        self.count_label(Label::Unknown)
    }

    pub fn error_count(&self) -> usize {
        self.count_label(Label::Error)
    }

    /// Videos per destination folder, sorted by folder name.
    pub fn folder_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.plan {
            *counts.entry(entry.folder.clone()).or_insert(0) += 1;
        }
        counts
    }

    fn count_label(&self, label: Label) -> usize {
        self.assignments.iter().filter(|a| a.label == label).count()
    }
}

/// The full sorting pipeline: fingerprint every video, cluster the
/// fingerprints, derive the move plan.
///
/// Videos are processed one at a time; the analyzer holds heavyweight
/// model sessions that are not worth running concurrently. Clustering
/// runs once, after all extractions. Videos whose extraction failed
/// never enter the distance computation and are planned into `Error`.
pub struct OrganizeVideosUseCase {
    extractor: FingerprintExtractor,
    clustering: ClusteringConfig,
    on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
}

impl OrganizeVideosUseCase {
    pub fn new(
        extractor: FingerprintExtractor,
        clustering: ClusteringConfig,
        on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
    ) -> Self {
        Self {
            extractor,
            clustering,
            on_progress,
        }
    }

    pub fn execute(
        &mut self,
        videos: &[PathBuf],
    ) -> Result<OrganizeOutcome, Box<dyn std::error::Error>> {
        let total = videos.len();
        let mut records = Vec::with_capacity(total);
        for (i, path) in videos.iter().enumerate() {
            self.report_progress(i + 1, total)?;
            records.push(self.extractor.extract(path));
        }

        let points: Vec<Vec<f32>> = records
            .iter()
            .filter(|r| r.status == ExtractionStatus::Fingerprinted)
            .filter_map(|r| r.fingerprint.clone())
            .collect();

        let labels = dbscan::cluster(&points, self.clustering.eps, self.clustering.min_samples);

        let mut labels = labels.into_iter();
        let assignments: Vec<ClusterAssignment> = records
            .iter()
            .map(|record| {
                let label = if record.status == ExtractionStatus::Fingerprinted {
                    labels
                        .next()
                        .map(Label::from_cluster)
                        .unwrap_or(Label::Error)
                } else {
                    Label::Error
                };
                ClusterAssignment {
                    path: record.path.clone(),
                    label,
                }
            })
            .collect();

        let plan = plan_moves(&assignments);

        Ok(OrganizeOutcome {
            records,
            assignments,
            plan,
        })
    }

    fn report_progress(
        &self,
        current: usize,
        total: usize,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(ref callback) = self.on_progress {
            if !callback(current, total) {
                return Err("Cancelled".into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    use crate::detection::domain::detected_face::{DetectedFace, FaceBox};
    use crate::detection::domain::face_analyzer::FaceAnalyzer;
    use crate::detection::domain::face_selector::LargestFacePolicy;
    use crate::fingerprint::extractor::SamplingConfig;
    use crate::shared::frame::Frame;
    use crate::shared::video_metadata::VideoMetadata;
    use crate::video::domain::video_reader::VideoReader;

    // --- Stubs ---

    /// Serves the same single frame for every video.
    struct StubReader;

    impl VideoReader for StubReader {
        fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
            Ok(VideoMetadata {
                width: 4,
                height: 4,
                fps: 30.0,
                total_frames: 1,
                duration_secs: 1.0 / 30.0,
                source_path: Some(path.to_path_buf()),
            })
        }

        fn frames(
            &mut self,
        ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
            Box::new(std::iter::once(Ok(Frame::new(vec![128; 4 * 4 * 3], 4, 4, 3, 0))))
        }

        fn close(&mut self) {}
    }

    /// Pops one scripted response per analyzed frame; `None` means the
    /// frame had no detectable face.
    struct ScriptedAnalyzer {
        responses: Arc<Mutex<VecDeque<Option<Vec<f32>>>>>,
    }

    impl ScriptedAnalyzer {
        fn new(responses: Vec<Option<Vec<f32>>>) -> Self {
            Self {
                responses: Arc::new(Mutex::new(responses.into())),
            }
        }
    }

    impl FaceAnalyzer for ScriptedAnalyzer {
        fn detect_and_embed(
            &mut self,
            _frame: &Frame,
        ) -> Result<Vec<DetectedFace>, Box<dyn std::error::Error>> {
            let embedding = self.responses.lock().unwrap().pop_front().flatten();
            Ok(embedding
                .map(|e| {
                    vec![DetectedFace {
                        bbox: FaceBox {
                            x: 0.0,
                            y: 0.0,
                            width: 10.0,
                            height: 10.0,
                        },
                        embedding: e,
                    }]
                })
                .unwrap_or_default())
        }
    }

    // --- Helpers ---

    fn use_case(
        responses: Vec<Option<Vec<f32>>>,
        clustering: ClusteringConfig,
    ) -> OrganizeVideosUseCase {
        let extractor = FingerprintExtractor::new(
            Box::new(StubReader),
            Box::new(ScriptedAnalyzer::new(responses)),
            Box::new(LargestFacePolicy),
            SamplingConfig {
                frames_to_extract: 1,
                skip_fraction: 0.0,
            },
        );
        OrganizeVideosUseCase::new(extractor, clustering, None)
    }

    fn paths(n: usize) -> Vec<PathBuf> {
        (1..=n).map(|i| PathBuf::from(format!("v{i}.mp4"))).collect()
    }

    // --- Tests ---

    #[test]
    fn test_three_similar_one_isolated_one_failed() {
        // Three near-identical fingerprints, one pointing elsewhere, one
        // video with no detectable face.
        let responses = vec![
            Some(vec![1.0, 0.0]),
            Some(vec![0.995, 0.1]),
            Some(vec![0.99, -0.05]),
            Some(vec![0.0, 1.0]),
            None,
        ];
        let mut uc = use_case(
            responses,
            ClusteringConfig {
                eps: 0.4,
                min_samples: 2,
            },
        );

        let outcome = uc.execute(&paths(5)).unwrap();

        let folders: Vec<&str> = outcome.plan.iter().map(|e| e.folder.as_str()).collect();
        assert_eq!(
            folders,
            vec!["Dancer_01", "Dancer_01", "Dancer_01", "Unknown", "Error"]
        );
        assert_eq!(outcome.cluster_count(), 1);
        assert_eq!(outcome.unknown_count(), 1);
        assert_eq!(outcome.error_count(), 1);
    }

    #[test]
    fn test_min_samples_one_leaves_no_unknown() {
        let responses = vec![
            Some(vec![1.0, 0.0]),
            Some(vec![0.0, 1.0]),
            Some(vec![-1.0, 0.0]),
        ];
        let mut uc = use_case(responses, ClusteringConfig::default());

        let outcome = uc.execute(&paths(3)).unwrap();

        assert_eq!(outcome.unknown_count(), 0);
        assert_eq!(outcome.error_count(), 0);
        assert_eq!(outcome.cluster_count(), 3);
    }

    #[test]
    fn test_all_failed_videos_still_complete_the_run() {
        let mut uc = use_case(vec![None, None], ClusteringConfig::default());

        let outcome = uc.execute(&paths(2)).unwrap();

        assert_eq!(outcome.cluster_count(), 0);
        assert_eq!(outcome.error_count(), 2);
        assert!(outcome.plan.iter().all(|e| e.folder == "Error"));
    }

    #[test]
    fn test_no_videos_yields_empty_outcome() {
        let mut uc = use_case(vec![], ClusteringConfig::default());
        let outcome = uc.execute(&[]).unwrap();
        assert!(outcome.plan.is_empty());
        assert_eq!(outcome.cluster_count(), 0);
    }

    #[test]
    fn test_plan_order_follows_input_order() {
        let responses = vec![Some(vec![1.0, 0.0]), None, Some(vec![1.0, 0.0])];
        let mut uc = use_case(responses, ClusteringConfig::default());

        let outcome = uc.execute(&paths(3)).unwrap();

        assert_eq!(outcome.plan[0].source, PathBuf::from("v1.mp4"));
        assert_eq!(outcome.plan[1].source, PathBuf::from("v2.mp4"));
        assert_eq!(outcome.plan[1].folder, "Error");
        assert_eq!(outcome.plan[2].source, PathBuf::from("v3.mp4"));
        assert_eq!(outcome.plan[2].folder, outcome.plan[0].folder);
    }

    #[test]
    fn test_folder_counts() {
        let responses = vec![
            Some(vec![1.0, 0.0]),
            Some(vec![1.0, 0.01]),
            None,
        ];
        let mut uc = use_case(responses, ClusteringConfig::default());

        let outcome = uc.execute(&paths(3)).unwrap();
        let counts = outcome.folder_counts();

        assert_eq!(counts.get("Dancer_01"), Some(&2));
        assert_eq!(counts.get("Error"), Some(&1));
        assert_eq!(counts.get("Unknown"), None);
    }

    #[test]
    fn test_cancel_via_progress_callback() {
        let extractor = FingerprintExtractor::new(
            Box::new(StubReader),
            Box::new(ScriptedAnalyzer::new(vec![Some(vec![1.0]); 3])),
            Box::new(LargestFacePolicy),
            SamplingConfig {
                frames_to_extract: 1,
                skip_fraction: 0.0,
            },
        );
        let mut uc = OrganizeVideosUseCase::new(
            extractor,
            ClusteringConfig::default(),
            Some(Box::new(|current, _| current < 2)),
        );

        assert!(uc.execute(&paths(3)).is_err());
    }
}
