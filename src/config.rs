//! JSON-loadable configuration for indexing and search.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IndexError, IndexResult};

/// File-name options for the auxiliary index files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileNames {
    #[serde(default = "default_champion_file")]
    pub champion: String,
    #[serde(default = "default_lengths_file")]
    pub lengths: String,
    #[serde(default = "default_stop_words_file")]
    pub stop_words: String,
    #[serde(default = "default_thesaurus_file")]
    pub thesaurus: String,
}

fn default_champion_file() -> String {
    "champion.txt".to_string()
}
fn default_lengths_file() -> String {
    "lengths.txt".to_string()
}
fn default_stop_words_file() -> String {
    "stopwords.txt".to_string()
}
fn default_thesaurus_file() -> String {
    "thesaurus.json".to_string()
}

impl Default for FileNames {
    fn default() -> Self {
        FileNames {
            champion: default_champion_file(),
            lengths: default_lengths_file(),
            stop_words: default_stop_words_file(),
            thesaurus: default_thesaurus_file(),
        }
    }
}

/// Rocchio coefficients.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RocchioConfig {
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_beta")]
    pub beta: f64,
    /// When `true`, use the textbook `alpha*q[t] + beta*centroid[t]` update
    /// instead of the `alpha*q[t] + beta*q[t]` quirk on the existing-term
    /// branch. Defaults to `false` to preserve the original behavior.
    #[serde(default)]
    pub conventional_formula: bool,
}

fn default_alpha() -> f64 {
    1.0
}
fn default_beta() -> f64 {
    0.75
}

impl Default for RocchioConfig {
    fn default() -> Self {
        RocchioConfig {
            alpha: default_alpha(),
            beta: default_beta(),
            conventional_formula: false,
        }
    }
}

fn default_k() -> usize {
    1000
}

/// Top-level configuration, loaded from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Champion list size per document.
    #[serde(rename = "K", alias = "k", default = "default_k")]
    pub k: usize,
    #[serde(default)]
    pub write_pos_indices: bool,
    #[serde(default)]
    pub run_query_expansion: bool,
    #[serde(default)]
    pub run_rocchio: bool,
    #[serde(default)]
    pub rocchio: RocchioConfig,
    #[serde(rename = "file_names", default)]
    pub file_names: FileNames,
}

impl Default for IndexConfig {
    fn default() -> Self {
        IndexConfig {
            k: default_k(),
            write_pos_indices: true,
            run_query_expansion: false,
            run_rocchio: false,
            rocchio: RocchioConfig::default(),
            file_names: FileNames::default(),
        }
    }
}

impl IndexConfig {
    /// Load configuration from a JSON file, falling back to defaults for
    /// any option that is absent.
    pub fn load(path: &Path) -> IndexResult<IndexConfig> {
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| IndexError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = IndexConfig::default();
        assert_eq!(cfg.k, 1000);
        assert!(!cfg.run_rocchio);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let cfg: IndexConfig = serde_json::from_str(r#"{"run_rocchio": true}"#).unwrap();
        assert!(cfg.run_rocchio);
        assert_eq!(cfg.k, 1000);
        assert_eq!(cfg.rocchio.alpha, 1.0);
    }

    #[test]
    fn champion_list_size_is_read_from_top_level_k() {
        let cfg: IndexConfig = serde_json::from_str(r#"{"K": 500}"#).unwrap();
        assert_eq!(cfg.k, 500);
    }
}
