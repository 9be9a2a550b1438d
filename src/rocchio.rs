//! Pseudo-relevance feedback: pulls the query vector towards the centroid
//! of a set of relevant documents' champion lists.

use std::collections::HashMap;

use crate::config::RocchioConfig;
use crate::types::{DocId, Term, TermWeight};

/// Update `q` in place towards the champion-weight centroid of `relevant`.
/// A no-op if `relevant` is empty.
pub fn apply(
    q: &mut HashMap<Term, TermWeight>,
    relevant: &[DocId],
    champions: &HashMap<DocId, Vec<(Term, TermWeight)>>,
    config: &RocchioConfig,
) {
    if relevant.is_empty() {
        return;
    }

    let mut centroid: HashMap<Term, TermWeight> = HashMap::new();
    for doc_id in relevant {
        if let Some(champs) = champions.get(doc_id) {
            for (term, weight) in champs {
                *centroid.entry(term.clone()).or_insert(0.0) += weight;
            }
        }
    }
    let r = relevant.len() as f64;
    for weight in centroid.values_mut() {
        *weight /= r;
    }

    for (term, centroid_weight) in centroid {
        if centroid_weight <= 0.0 {
            continue;
        }
        match q.get(&term).copied() {
            None => {
                q.insert(term, config.beta * centroid_weight);
            }
            Some(existing) => {
                let updated = if config.conventional_formula {
                    config.alpha * existing + config.beta * centroid_weight
                } else {
                    // Intentional quirk: the second term uses q[t] again
                    // rather than centroid[t].
                    config.alpha * existing + config.beta * existing
                };
                q.insert(term, updated);
            }
        }
    }
}
