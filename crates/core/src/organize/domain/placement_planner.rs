use std::path::PathBuf;

use crate::clustering::dbscan::NOISE;

pub const UNKNOWN_FOLDER: &str = "Unknown";
pub const ERROR_FOLDER: &str = "Error";

/// Final destination category for one video.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Label {
    /// Member of an identity cluster.
    Dancer(i32),
    /// Fingerprinted but not density-reachable from any cluster.
    Unknown,
    /// No fingerprint could be extracted.
    Error,
}

impl Label {
    pub fn from_cluster(label: i32) -> Self {
        if label == NOISE {
            Self::Unknown
        } else {
            Self::Dancer(label)
        }
    }

    /// Destination folder name. Dancer folders are 1-indexed and
    /// zero-padded: cluster 0 → `Dancer_01`.
    pub fn folder_name(&self) -> String {
        match self {
            Self::Dancer(id) => format!("Dancer_{:02}", id + 1),
            Self::Unknown => UNKNOWN_FOLDER.to_string(),
            Self::Error => ERROR_FOLDER.to_string(),
        }
    }
}

/// One video's label for this run. Immutable once created.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterAssignment {
    pub path: PathBuf,
    pub label: Label,
}

/// A planned file move; the destination folder is relative to the
/// output root chosen by the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct MoveEntry {
    pub source: PathBuf,
    pub folder: String,
}

/// Derive the move plan from assignments. Pure and order-preserving;
/// no filesystem access happens here.
pub fn plan_moves(assignments: &[ClusterAssignment]) -> Vec<MoveEntry> {
    assignments
        .iter()
        .map(|a| MoveEntry {
            source: a.path.clone(),
            folder: a.label.folder_name(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::first_cluster(Label::Dancer(0), "Dancer_01")]
    #[case::fifth_cluster(Label::Dancer(4), "Dancer_05")]
    #[case::two_digit(Label::Dancer(11), "Dancer_12")]
    #[case::noise(Label::Unknown, "Unknown")]
    #[case::no_fingerprint(Label::Error, "Error")]
    fn test_folder_names(#[case] label: Label, #[case] expected: &str) {
        assert_eq!(label.folder_name(), expected);
    }

    #[test]
    fn test_from_cluster_maps_noise_to_unknown() {
        assert_eq!(Label::from_cluster(-1), Label::Unknown);
        assert_eq!(Label::from_cluster(0), Label::Dancer(0));
        assert_eq!(Label::from_cluster(3), Label::Dancer(3));
    }

    #[test]
    fn test_plan_preserves_order_and_paths() {
        let assignments = vec![
            ClusterAssignment {
                path: PathBuf::from("a.mp4"),
                label: Label::Dancer(0),
            },
            ClusterAssignment {
                path: PathBuf::from("b.mp4"),
                label: Label::Unknown,
            },
            ClusterAssignment {
                path: PathBuf::from("c.mp4"),
                label: Label::Error,
            },
        ];

        let plan = plan_moves(&assignments);
        assert_eq!(plan.len(), 3);
        assert_eq!(plan[0].source, PathBuf::from("a.mp4"));
        assert_eq!(plan[0].folder, "Dancer_01");
        assert_eq!(plan[1].folder, "Unknown");
        assert_eq!(plan[2].folder, "Error");
    }

    #[test]
    fn test_plan_of_nothing_is_empty() {
        assert!(plan_moves(&[]).is_empty());
    }
}
