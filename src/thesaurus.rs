//! Thesaurus loading: a persisted `term -> set(term)` mapping over
//! already-stemmed terms. Construction of the mapping is out of scope;
//! this module only consumes a prebuilt one.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IndexError, IndexResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Thesaurus(pub HashMap<String, HashSet<String>>);

impl Thesaurus {
    pub fn load(path: &Path) -> IndexResult<Thesaurus> {
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| IndexError::Config(e.to_string()))
    }

    pub fn synonyms(&self, stem: &str) -> impl Iterator<Item = &String> {
        self.0.get(stem).into_iter().flatten()
    }
}
