use std::path::Path;

use ndarray::Array2;

use crate::error::AppError;
use crate::forest::BaggedForest;
use crate::trainer::{LabelEncoder, ENCODER_FILE, FEATURES_FILE, MODEL_FILE};

/// Outcome of a single model-assisted prediction.
///
/// `MappingFailed` is a soft sentinel: the model produced a label the
/// encoder does not know, which points at a skewed artifact bundle. It
/// never aborts the surrounding flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prediction {
    College(String),
    MappingFailed,
}

/// The three co-versioned artifacts written by the trainer, loaded
/// together or not at all.
#[derive(Debug)]
pub struct ArtifactBundle {
    forest: BaggedForest,
    encoder: LabelEncoder,
    feature_columns: Vec<String>,
}

impl ArtifactBundle {
    /// Load the bundle from `model_dir`.
    ///
    /// Any missing or undecodable artifact yields `ModelUnavailable`;
    /// callers then fall back to filter-only prediction. The feature
    /// column list must match the width the forest was fitted with,
    /// otherwise inference would silently produce nonsense.
    pub fn load(model_dir: &Path) -> Result<Self, AppError> {
        let forest: BaggedForest = read_artifact(model_dir, MODEL_FILE)?;
        let encoder: LabelEncoder = read_artifact(model_dir, ENCODER_FILE)?;
        let feature_columns: Vec<String> = read_artifact(model_dir, FEATURES_FILE)?;

        if feature_columns.is_empty() {
            return Err(AppError::ModelUnavailable(
                "feature column list is empty".to_string(),
            ));
        }
        if forest.n_features() != feature_columns.len() {
            return Err(AppError::ModelUnavailable(format!(
                "model expects {} features but the column list has {}",
                forest.n_features(),
                feature_columns.len()
            )));
        }
        if encoder.is_empty() {
            return Err(AppError::ModelUnavailable(
                "label encoder has no classes".to_string(),
            ));
        }

        Ok(Self {
            forest,
            encoder,
            feature_columns,
        })
    }

    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    /// Predict a college for a rank.
    ///
    /// The feature vector replicates the rank across every feature
    /// column. That is a coarse proxy: training saw distinct
    /// per-category cutoffs, so the prediction is approximate by
    /// construction (interface kept from the original design).
    pub fn predict_college(&self, rank: u32) -> Prediction {
        let sample = Array2::from_elem((1, self.feature_columns.len()), f64::from(rank));
        let label = self.forest.predict(&sample)[0];
        match self.encoder.decode(label) {
            Some(name) => Prediction::College(name.to_string()),
            None => Prediction::MappingFailed,
        }
    }
}

fn read_artifact<T: serde::de::DeserializeOwned>(dir: &Path, file: &str) -> Result<T, AppError> {
    let path = dir.join(file);
    let bytes = std::fs::read(&path)
        .map_err(|e| AppError::ModelUnavailable(format!("{}: {e}", path.display())))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| AppError::ModelUnavailable(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CutoffTable, Offering};
    use crate::trainer;
    use std::collections::HashMap;

    fn trained_dir() -> tempfile::TempDir {
        let mut offerings = Vec::new();
        for (college, base) in [("Alpha", 2000u32), ("Beta", 40000)] {
            for step in 0..3u32 {
                offerings.push(Offering {
                    cet_code: format!("E{college}{step}"),
                    college: college.to_string(),
                    branch: "CSE".to_string(),
                    location: "Bangalore".to_string(),
                    cutoffs: HashMap::from([
                        ("GM".to_string(), base + step * 100),
                        ("1G".to_string(), base + 500 + step * 100),
                    ]),
                });
            }
        }
        let table = CutoffTable {
            columns: vec![
                "CETCode".to_string(),
                "College".to_string(),
                "Branch".to_string(),
                "Location".to_string(),
                "GM".to_string(),
                "1G".to_string(),
            ],
            categories: vec!["GM".to_string(), "1G".to_string()],
            offerings,
        };
        let dir = tempfile::tempdir().unwrap();
        trainer::train(&table, dir.path()).unwrap();
        dir
    }

    #[test]
    fn trained_bundle_loads_and_predicts_a_known_college() {
        let dir = trained_dir();
        let bundle = ArtifactBundle::load(dir.path()).unwrap();

        assert_eq!(bundle.feature_columns(), ["GM", "1G"]);
        match bundle.predict_college(2100) {
            Prediction::College(name) => assert!(name == "Alpha" || name == "Beta"),
            Prediction::MappingFailed => panic!("decoding failed for a fresh bundle"),
        }
    }

    #[test]
    fn missing_artifact_disables_the_predictor() {
        let dir = trained_dir();
        std::fs::remove_file(dir.path().join(ENCODER_FILE)).unwrap();
        let err = ArtifactBundle::load(dir.path()).unwrap_err();
        assert!(matches!(err, AppError::ModelUnavailable(_)));
    }

    #[test]
    fn empty_directory_disables_the_predictor() {
        let dir = tempfile::tempdir().unwrap();
        let err = ArtifactBundle::load(dir.path()).unwrap_err();
        assert!(matches!(err, AppError::ModelUnavailable(_)));
    }

    #[test]
    fn skewed_feature_list_is_rejected_at_load() {
        let dir = trained_dir();
        std::fs::write(
            dir.path().join(FEATURES_FILE),
            serde_json::to_vec(&vec!["GM".to_string()]).unwrap(),
        )
        .unwrap();
        let err = ArtifactBundle::load(dir.path()).unwrap_err();
        assert!(matches!(err, AppError::ModelUnavailable(_)));
    }

    #[test]
    fn corrupt_artifact_is_reported_not_panicked() {
        let dir = trained_dir();
        std::fs::write(dir.path().join(MODEL_FILE), b"not json").unwrap();
        let err = ArtifactBundle::load(dir.path()).unwrap_err();
        assert!(matches!(err, AppError::ModelUnavailable(_)));
    }
}
