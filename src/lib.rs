//! College admission prediction over a static entrance-exam cutoff
//! table: rank/category eligibility filtering with chance scores, an
//! optional tree-ensemble assist trained offline, and interest-based
//! branch recommendation.

pub mod analyzer;
pub mod branches;
pub mod dataset;
pub mod error;
pub mod forest;
pub mod geo;
pub mod models;
pub mod predictor;
pub mod trainer;
