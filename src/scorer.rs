//! Zone-weighted lnc.ltc cosine scoring, with optional Rocchio feedback.

use std::collections::HashMap;
use std::path::Path;

use log::debug;

use crate::config::RocchioConfig;
use crate::error::{IndexError, IndexResult};
use crate::rocchio;
use crate::store::PostingReader;
use crate::types::{DocId, DocLength, Term, TermWeight};

/// Holds the open postings cursor plus the in-memory auxiliary tables
/// needed to score a query. One `Scorer` handles any number of queries
/// serially: each query reads a fresh view of the candidate set, but the
/// same file handle is reused across `seek_term` calls.
pub struct Scorer<'a> {
    reader: PostingReader,
    lengths: &'a HashMap<DocId, DocLength>,
    champions: &'a HashMap<DocId, Vec<(Term, TermWeight)>>,
}

impl<'a> Scorer<'a> {
    pub fn open(
        postings_path: &Path,
        dictionary_path: &Path,
        lengths: &'a HashMap<DocId, DocLength>,
        champions: &'a HashMap<DocId, Vec<(Term, TermWeight)>>,
    ) -> IndexResult<Scorer<'a>> {
        let reader = PostingReader::open(postings_path, dictionary_path)?;
        Ok(Scorer {
            reader,
            lengths,
            champions,
        })
    }

    fn corpus_size(&self) -> f64 {
        self.lengths.len() as f64
    }

    /// Document frequency of `term`, or `None` if it is absent from the
    /// dictionary. Unknown terms are silently dropped at query time rather
    /// than propagated as an error.
    fn doc_freq(&mut self, term: &Term) -> IndexResult<Option<u32>> {
        match self.reader.seek_term(term) {
            Ok(()) => Ok(Some(self.reader.doc_freq())),
            Err(IndexError::UnknownTerm(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Build the ltc query vector from a term multiset.
    fn build_query_vector(&mut self, query_terms: &[Term]) -> IndexResult<HashMap<Term, TermWeight>> {
        let mut tf_q: HashMap<Term, u32> = HashMap::new();
        for term in query_terms {
            *tf_q.entry(term.clone()).or_insert(0) += 1;
        }

        let n = self.corpus_size();
        let mut q = HashMap::with_capacity(tf_q.len());
        for (term, tf) in tf_q {
            match self.doc_freq(&term)? {
                None => debug!("query term {} absent from dictionary, dropped", term),
                Some(df) => {
                    let weight = (1.0 + (tf as f64).log10()) * (n / df as f64).log10();
                    q.insert(term, weight);
                }
            }
        }
        Ok(q)
    }

    /// Build the lnc document vectors for every document containing at
    /// least one of `terms`.
    fn build_document_vectors(
        &mut self,
        terms: &[Term],
    ) -> IndexResult<HashMap<DocId, HashMap<Term, TermWeight>>> {
        let mut doc_vecs: HashMap<DocId, HashMap<Term, TermWeight>> = HashMap::new();
        for term in terms {
            match self.reader.seek_term(term) {
                Ok(()) => {}
                Err(IndexError::UnknownTerm(_)) => continue,
                Err(e) => return Err(e),
            }
            for entry in self.reader.entries()? {
                let weight = 1.0 + (entry.term_freq as f64).log10();
                doc_vecs
                    .entry(entry.doc_id)
                    .or_default()
                    .insert(term.clone(), weight);
            }
        }
        Ok(doc_vecs)
    }

    /// Multiply every term weight by its zone weight.
    fn apply_zone_weights(vec: &mut HashMap<Term, TermWeight>) {
        for (term, weight) in vec.iter_mut() {
            let zone_weight = term.zone().map(|z| z.weight()).unwrap_or(1.0);
            *weight *= zone_weight;
        }
    }

    /// Score and rank candidates for `query_terms`, optionally applying
    /// Rocchio feedback using `relevant` and the preloaded champion lists.
    pub fn score(
        &mut self,
        query_terms: &[Term],
        relevant: &[DocId],
        rocchio_config: Option<&RocchioConfig>,
    ) -> IndexResult<Vec<DocId>> {
        let mut q = self.build_query_vector(query_terms)?;

        if let Some(config) = rocchio_config {
            rocchio::apply(&mut q, relevant, self.champions, config);
        }

        let terms: Vec<Term> = q.keys().cloned().collect();
        let mut doc_vecs = self.build_document_vectors(&terms)?;

        Self::apply_zone_weights(&mut q);
        for doc_vec in doc_vecs.values_mut() {
            Self::apply_zone_weights(doc_vec);
        }

        let mut scored: Vec<(DocId, f64)> = doc_vecs
            .into_iter()
            .filter_map(|(doc_id, doc_vec)| {
                let length = *self.lengths.get(&doc_id)?;
                let dot: f64 = doc_vec
                    .iter()
                    .map(|(t, w)| w * q.get(t).copied().unwrap_or(0.0))
                    .sum();
                Some((doc_id, dot / length))
            })
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        Ok(scored.into_iter().map(|(doc_id, _)| doc_id).collect())
    }
}
