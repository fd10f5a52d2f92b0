//! Risk classifier over a vitals feature vector.
//!
//! The model is a pre-trained decision forest exported to JSON. Each tree
//! walks `x[feature] <= threshold` to the left child, otherwise right, and
//! ends at a leaf carrying the probability that the sample is critical. The
//! forest verdict is critical when the mean leaf probability exceeds 0.5.

use std::{fs, io, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// heart_rate, systolic, diastolic, spo2
pub const FEATURE_COUNT: usize = 4;

const SUPPORTED_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("model artifact not found at {path}")]
    MissingArtifact { path: PathBuf },
    #[error("failed to read model artifact {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        critical_probability: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn predict(&self, features: &[f64; FEATURE_COUNT]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf {
                    critical_probability,
                } => return *critical_probability,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestModel {
    pub version: u32,
    pub trees: Vec<DecisionTree>,
}

impl ForestModel {
    /// Structural checks that make `predict` total: every split points
    /// strictly forward, so each walk ends at a leaf.
    fn validate(&self) -> Result<(), ClassifierError> {
        if self.version != SUPPORTED_VERSION {
            return Err(ClassifierError::InvalidArtifact(format!(
                "unsupported model version {}",
                self.version
            )));
        }
        if self.trees.is_empty() {
            return Err(ClassifierError::InvalidArtifact("forest has no trees".into()));
        }

        for (tree_idx, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(ClassifierError::InvalidArtifact(format!(
                    "tree {tree_idx} has no nodes"
                )));
            }
            for (node_idx, node) in tree.nodes.iter().enumerate() {
                match node {
                    TreeNode::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } => {
                        if *feature >= FEATURE_COUNT {
                            return Err(ClassifierError::InvalidArtifact(format!(
                                "tree {tree_idx} node {node_idx}: feature {feature} out of range"
                            )));
                        }
                        if !threshold.is_finite() {
                            return Err(ClassifierError::InvalidArtifact(format!(
                                "tree {tree_idx} node {node_idx}: non-finite threshold"
                            )));
                        }
                        for child in [*left, *right] {
                            if child <= node_idx || child >= tree.nodes.len() {
                                return Err(ClassifierError::InvalidArtifact(format!(
                                    "tree {tree_idx} node {node_idx}: bad child index {child}"
                                )));
                            }
                        }
                    }
                    TreeNode::Leaf {
                        critical_probability,
                    } => {
                        if !(0.0..=1.0).contains(critical_probability) {
                            return Err(ClassifierError::InvalidArtifact(format!(
                                "tree {tree_idx} node {node_idx}: probability {critical_probability} out of range"
                            )));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct VitalsClassifier {
    model: ForestModel,
}

impl VitalsClassifier {
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        let contents = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ClassifierError::MissingArtifact {
                    path: path.to_path_buf(),
                }
            } else {
                ClassifierError::Unreadable {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let model: ForestModel = serde_json::from_str(&contents)
            .map_err(|err| ClassifierError::InvalidArtifact(err.to_string()))?;

        let classifier = Self::from_model(model)?;
        log::info!(
            "Loaded vitals classifier from {} ({} trees)",
            path.display(),
            classifier.model.trees.len()
        );
        Ok(classifier)
    }

    pub fn from_model(model: ForestModel) -> Result<Self, ClassifierError> {
        model.validate()?;
        Ok(Self { model })
    }

    pub fn critical_probability(
        &self,
        heart_rate: i64,
        systolic: i64,
        diastolic: i64,
        spo2: i64,
    ) -> f64 {
        let features = [
            heart_rate as f64,
            systolic as f64,
            diastolic as f64,
            spo2 as f64,
        ];
        let total: f64 = self
            .model
            .trees
            .iter()
            .map(|tree| tree.predict(&features))
            .sum();
        total / self.model.trees.len() as f64
    }

    pub fn classify(&self, heart_rate: i64, systolic: i64, diastolic: i64, spo2: i64) -> bool {
        self.critical_probability(heart_rate, systolic, diastolic, spo2) > 0.5
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Single-stump model: critical iff heart rate is above `hr_threshold`.
    pub(crate) fn heart_rate_stump(hr_threshold: f64) -> ForestModel {
        ForestModel {
            version: 1,
            trees: vec![DecisionTree {
                nodes: vec![
                    TreeNode::Split {
                        feature: 0,
                        threshold: hr_threshold,
                        left: 1,
                        right: 2,
                    },
                    TreeNode::Leaf {
                        critical_probability: 0.0,
                    },
                    TreeNode::Leaf {
                        critical_probability: 1.0,
                    },
                ],
            }],
        }
    }

    #[test]
    fn stump_splits_on_heart_rate() {
        let classifier = VitalsClassifier::from_model(heart_rate_stump(120.0)).unwrap();
        assert!(classifier.classify(150, 120, 80, 98));
        assert!(!classifier.classify(120, 120, 80, 98));
    }

    #[test]
    fn even_vote_is_not_critical() {
        let mut model = heart_rate_stump(120.0);
        model.trees.push(DecisionTree {
            nodes: vec![TreeNode::Leaf {
                critical_probability: 0.0,
            }],
        });
        let classifier = VitalsClassifier::from_model(model).unwrap();
        assert_eq!(classifier.critical_probability(150, 120, 80, 98), 0.5);
        assert!(!classifier.classify(150, 120, 80, 98));
    }

    #[test]
    fn missing_artifact_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = VitalsClassifier::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ClassifierError::MissingArtifact { .. }));
    }

    #[test]
    fn garbage_artifact_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, "not json").unwrap();
        let err = VitalsClassifier::load(&path).unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidArtifact(_)));
    }

    #[test]
    fn backward_child_is_rejected() {
        let mut model = heart_rate_stump(120.0);
        model.trees[0].nodes[0] = TreeNode::Split {
            feature: 0,
            threshold: 120.0,
            left: 0,
            right: 2,
        };
        assert!(matches!(
            VitalsClassifier::from_model(model),
            Err(ClassifierError::InvalidArtifact(_))
        ));
    }

    #[test]
    fn unknown_feature_is_rejected() {
        let mut model = heart_rate_stump(120.0);
        model.trees[0].nodes[0] = TreeNode::Split {
            feature: 7,
            threshold: 120.0,
            left: 1,
            right: 2,
        };
        assert!(VitalsClassifier::from_model(model).is_err());
    }

    #[test]
    fn shipped_model_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("models/health_model.json");
        let classifier = VitalsClassifier::load(&path).unwrap();
        assert!(classifier.classify(150, 165, 100, 88));
        assert!(!classifier.classify(72, 118, 76, 98));
    }
}
