use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub dataset_file: String,
    pub model_directory: String,
    pub default_category: String,
    pub shortlist_size: usize,
    pub enable_geocode: bool,
    pub geocode_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset_file: "CET-CUTOFF2025.csv".to_string(),
            model_directory: "models".to_string(),
            default_category: "GM".to_string(),
            shortlist_size: 5,
            enable_geocode: true,
            geocode_timeout_secs: 10,
        }
    }
}

impl Config {
    pub fn load_from_file(file_path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(file_path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, file_path: &str) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(file_path, content)?;
        Ok(())
    }
}

/// One college+branch+location combination with its per-category cutoffs.
///
/// A cutoff is the worst (numerically highest) rank historically admitted
/// under a given category. A missing key means the offering does not admit
/// under that category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offering {
    pub cet_code: String,
    pub college: String,
    pub branch: String,
    pub location: String,
    pub cutoffs: HashMap<String, u32>,
}

impl Offering {
    pub fn cutoff(&self, category: &str) -> Option<u32> {
        self.cutoffs.get(category).copied()
    }
}

/// In-memory cutoff dataset: offerings in row order plus the header
/// columns they were read from.
///
/// `columns` keeps the full header (metadata columns included) so the
/// trainer can run its own schema check; `categories` is the subset of
/// columns carrying cutoff ranks, in header order.
#[derive(Debug, Clone)]
pub struct CutoffTable {
    pub columns: Vec<String>,
    pub categories: Vec<String>,
    pub offerings: Vec<Offering>,
}

impl CutoffTable {
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn has_category(&self, code: &str) -> bool {
        self.categories.iter().any(|c| c == code)
    }
}

/// Ephemeral per-request input.
#[derive(Debug, Clone)]
pub struct StudentQuery {
    pub rank: u32,
    pub category: String,
}

/// One shortlist entry, computed per query and discarded after display.
///
/// `chance_score` is `cutoff[category] - rank`; positive means the
/// student's rank beats the historical cutoff with that much margin.
/// `chance_percent` is a display-only confidence drawn inside a fixed
/// bucket of the score.
#[derive(Debug, Clone)]
pub struct ChanceResult {
    pub offering: Offering,
    pub cutoff: u32,
    pub chance_score: i64,
    pub chance_percent: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.dataset_file, config.dataset_file);
        assert_eq!(back.shortlist_size, 5);
        assert_eq!(back.default_category, "GM");
    }

    #[test]
    fn offering_cutoff_lookup() {
        let offering = Offering {
            cet_code: "E001".to_string(),
            college: "X".to_string(),
            branch: "CSE Engg".to_string(),
            location: "Bangalore".to_string(),
            cutoffs: HashMap::from([("GM".to_string(), 6000)]),
        };
        assert_eq!(offering.cutoff("GM"), Some(6000));
        assert_eq!(offering.cutoff("1G"), None);
    }
}
