use std::collections::HashMap;
use std::path::Path;

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::forest::BaggedForest;
use crate::models::CutoffTable;

pub const MODEL_FILE: &str = "forest.json";
pub const ENCODER_FILE: &str = "label_encoder.json";
pub const FEATURES_FILE: &str = "feature_columns.json";

/// Category columns preferred as features, in whitelist order.
const FEATURE_WHITELIST: [&str; 16] = [
    "GM", "1G", "1K", "1R", "2AG", "2AK", "2AR", "2BG", "2BK", "2BR", "3AG", "3AK", "3AR", "3BG",
    "3BK", "3BR",
];

const N_TREES: usize = 200;
const SPLIT_SEED: u64 = 42;
const TEST_RATIO: f64 = 0.2;

/// Bidirectional mapping between college names and dense integer codes.
///
/// Classes are stored in sorted-name order; the code assigned to a name
/// is its index in that order, which makes the encoding part of the
/// persisted artifact's meaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn fit<'a, I: IntoIterator<Item = &'a str>>(names: I) -> Self {
        let mut classes: Vec<String> = names.into_iter().map(str::to_string).collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    pub fn encode(&self, name: &str) -> Option<usize> {
        self.classes.binary_search_by(|c| c.as_str().cmp(name)).ok()
    }

    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Informational training metrics; the artifacts are saved regardless.
#[derive(Debug, Clone)]
pub struct TrainReport {
    pub feature_columns: Vec<String>,
    pub n_classes: usize,
    pub n_train: usize,
    pub n_test: usize,
    pub accuracy: f64,
}

/// Fit the college predictor and persist the artifact bundle.
///
/// Encodes distinct college names as labels, selects cutoff feature
/// columns, stratifies an 80/20 split by label with a fixed seed, fits
/// the bagged forest and writes the three co-versioned artifacts
/// (model, label encoder, ordered feature-column list) to `model_dir`.
pub fn train(table: &CutoffTable, model_dir: &Path) -> Result<TrainReport, AppError> {
    for required in ["College", "Branch"] {
        if !table.has_column(required) {
            return Err(AppError::Schema(format!(
                "dataset must contain a '{required}' column"
            )));
        }
    }
    if table.offerings.is_empty() {
        return Err(AppError::DataQuality("dataset has no rows".to_string()));
    }

    let encoder = LabelEncoder::fit(table.offerings.iter().map(|o| o.college.as_str()));
    let feature_columns = select_feature_columns(table)?;

    let targets: Vec<usize> = table
        .offerings
        .iter()
        .map(|o| {
            encoder.encode(&o.college).ok_or_else(|| {
                AppError::DataQuality(format!("college '{}' missing from encoder", o.college))
            })
        })
        .collect::<Result<_, _>>()?;

    // Missing cutoffs are imputed with 0 before fitting.
    let n_rows = table.offerings.len();
    let mut features = Array2::<f64>::zeros((n_rows, feature_columns.len()));
    for (row, offering) in table.offerings.iter().enumerate() {
        for (col, column) in feature_columns.iter().enumerate() {
            features[(row, col)] = offering.cutoff(column).map(f64::from).unwrap_or(0.0);
        }
    }
    let targets = Array1::from(targets);

    let (train_idx, test_idx) = stratified_split(&targets, &encoder)?;
    let train_records = select_rows(&features, &train_idx);
    let train_targets = select_targets(&targets, &train_idx);
    let test_records = select_rows(&features, &test_idx);
    let test_targets = select_targets(&targets, &test_idx);

    let forest = BaggedForest::fit(&train_records, &train_targets, N_TREES, SPLIT_SEED)?;
    let accuracy = forest.accuracy(&test_records, &test_targets);

    save_artifacts(model_dir, &forest, &encoder, &feature_columns)?;

    Ok(TrainReport {
        feature_columns,
        n_classes: encoder.len(),
        n_train: train_idx.len(),
        n_test: test_idx.len(),
        accuracy,
    })
}

/// Whitelisted cutoff columns that are present, falling back to every
/// category column when none of the whitelist survives.
fn select_feature_columns(table: &CutoffTable) -> Result<Vec<String>, AppError> {
    let whitelisted: Vec<String> = FEATURE_WHITELIST
        .iter()
        .copied()
        .filter(|&c| table.has_column(c))
        .map(str::to_string)
        .collect();
    if !whitelisted.is_empty() {
        return Ok(whitelisted);
    }
    if table.categories.is_empty() {
        return Err(AppError::NoFeatures);
    }
    Ok(table.categories.clone())
}

/// Stratified 80/20 split over encoded labels with a fixed seed.
///
/// Every class must have at least two rows so both partitions can see
/// it; thinner classes are surfaced as a data-quality error rather than
/// silently subset.
fn stratified_split(
    targets: &Array1<usize>,
    encoder: &LabelEncoder,
) -> Result<(Vec<usize>, Vec<usize>), AppError> {
    let mut by_class: HashMap<usize, Vec<usize>> = HashMap::new();
    for (row, label) in targets.iter().enumerate() {
        by_class.entry(*label).or_default().push(row);
    }

    let mut rng = StdRng::seed_from_u64(SPLIT_SEED);
    let mut train_idx = Vec::new();
    let mut test_idx = Vec::new();

    let mut classes: Vec<usize> = by_class.keys().copied().collect();
    classes.sort_unstable();
    for class in classes {
        let mut rows = by_class.remove(&class).unwrap_or_default();
        if rows.len() < 2 {
            let name = encoder.decode(class).unwrap_or("<unknown>");
            return Err(AppError::DataQuality(format!(
                "college '{name}' has only {} row(s); stratified split needs at least 2 per class",
                rows.len()
            )));
        }
        rows.shuffle(&mut rng);
        let n_test = ((rows.len() as f64) * TEST_RATIO).round() as usize;
        let n_test = n_test.clamp(1, rows.len() - 1);
        test_idx.extend_from_slice(&rows[..n_test]);
        train_idx.extend_from_slice(&rows[n_test..]);
    }

    train_idx.sort_unstable();
    test_idx.sort_unstable();
    Ok((train_idx, test_idx))
}

fn select_rows(features: &Array2<f64>, indices: &[usize]) -> Array2<f64> {
    features.select(ndarray::Axis(0), indices)
}

fn select_targets(targets: &Array1<usize>, indices: &[usize]) -> Array1<usize> {
    targets.select(ndarray::Axis(0), indices)
}

fn save_artifacts(
    model_dir: &Path,
    forest: &BaggedForest,
    encoder: &LabelEncoder,
    feature_columns: &[String],
) -> Result<(), AppError> {
    let persist = |e: &dyn std::fmt::Display| AppError::Persist(e.to_string());

    std::fs::create_dir_all(model_dir).map_err(|e| persist(&e))?;
    let model = serde_json::to_vec(forest).map_err(|e| persist(&e))?;
    std::fs::write(model_dir.join(MODEL_FILE), model).map_err(|e| persist(&e))?;
    let enc = serde_json::to_vec_pretty(encoder).map_err(|e| persist(&e))?;
    std::fs::write(model_dir.join(ENCODER_FILE), enc).map_err(|e| persist(&e))?;
    let cols = serde_json::to_vec_pretty(feature_columns).map_err(|e| persist(&e))?;
    std::fs::write(model_dir.join(FEATURES_FILE), cols).map_err(|e| persist(&e))?;
    Ok(())
}
