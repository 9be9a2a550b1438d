//! Single streaming pass over the corpus: accumulates postings, closes out
//! each document's length as doc boundaries are crossed, and computes the
//! top-K champion list per document once the corpus has been consumed.

use std::collections::HashMap;

use log::{debug, info};

use crate::error::IndexResult;
use crate::store::{write_index, IndexPaths};
use crate::tokenizer::tokenize;
use crate::types::{DocId, DocLength, Term, TermFreq, TermPos, TermWeight, Zone};

/// One document as read from the corpus CSV: `(doc_id, title, content,
/// date_posted, court)`.
#[derive(Debug, Clone)]
pub struct Document {
    pub doc_id: DocId,
    pub title: String,
    pub content: String,
    pub date_posted: String,
    pub court: String,
}

/// Accumulates the in-memory index build across a single streaming pass.
pub struct Indexer {
    dictionary: HashMap<Term, HashMap<DocId, Vec<TermPos>>>,
    term_order: Vec<Term>,
    lengths: HashMap<DocId, DocLength>,
    term_freq_counter: HashMap<Term, TermFreq>,
    current_doc: Option<DocId>,
    next_pos: TermPos,
}

impl Indexer {
    pub fn new() -> Indexer {
        Indexer {
            dictionary: HashMap::new(),
            term_order: Vec::new(),
            lengths: HashMap::new(),
            term_freq_counter: HashMap::new(),
            current_doc: None,
            next_pos: 0,
        }
    }

    /// Close out the document currently being accumulated: compute its lnc
    /// tf-vector L2 norm and reset the per-document counters.
    fn close_current_doc(&mut self) {
        let Some(doc_id) = self.current_doc else {
            return;
        };
        // Fixed iteration order for floating-point determinism across platforms.
        let mut terms: Vec<&Term> = self.term_freq_counter.keys().collect();
        terms.sort();
        let sum_sq: f64 = terms
            .iter()
            .map(|t| {
                let tf = self.term_freq_counter[*t] as f64;
                (1.0 + tf.log10()).powi(2)
            })
            .sum();
        self.lengths.insert(doc_id, sum_sq.sqrt());
        self.term_freq_counter.clear();
    }

    /// Feed one document's zone-ordered token stream into the index. Zones
    /// are tokenized in title, content, date, court order; `TermPos` is the
    /// index of each surviving token in that concatenated stream.
    pub fn add_document(
        &mut self,
        doc: &Document,
        stopwords: &std::collections::HashSet<String>,
    ) {
        if self.current_doc != Some(doc.doc_id) {
            self.close_current_doc();
            self.current_doc = Some(doc.doc_id);
            self.next_pos = 0;
        }

        let zones: [(Zone, &str); 4] = [
            (Zone::Title, doc.title.as_str()),
            (Zone::Content, doc.content.as_str()),
            (Zone::Date, doc.date_posted.as_str()),
            (Zone::Court, doc.court.as_str()),
        ];

        for (zone, text) in zones {
            for term in tokenize(text, zone, stopwords) {
                let pos = self.next_pos;
                self.next_pos += 1;

                *self.term_freq_counter.entry(term.clone()).or_insert(0) += 1;

                let per_doc = self.dictionary.entry(term.clone()).or_insert_with(|| {
                    self.term_order.push(term.clone());
                    HashMap::new()
                });
                per_doc.entry(doc.doc_id).or_default().push(pos);
            }
        }
    }

    /// Finish the pass: close out the final document and compute the
    /// champion list for every document.
    pub fn finish(mut self, k: usize) -> IndexedCorpus {
        self.close_current_doc();

        let n = self.lengths.len() as f64;
        let mut champions: HashMap<DocId, Vec<(Term, TermWeight)>> =
            HashMap::with_capacity(self.lengths.len());

        let mut doc_ids: Vec<DocId> = self.lengths.keys().copied().collect();
        doc_ids.sort_unstable();

        for doc_id in doc_ids {
            let mut weights: Vec<(Term, TermWeight)> = Vec::new();
            for term in &self.term_order {
                let per_doc = &self.dictionary[term];
                if let Some(positions) = per_doc.get(&doc_id) {
                    let tf = positions.len() as f64;
                    let df = per_doc.len() as f64;
                    let w = (1.0 + tf.log10()) * (n / df).log10() / self.lengths[&doc_id];
                    weights.push((term.clone(), w));
                }
            }
            weights.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.0.cmp(&b.0))
            });
            weights.truncate(k);
            champions.insert(doc_id, weights);
        }

        debug!(
            "indexed {} documents, {} distinct terms",
            self.lengths.len(),
            self.term_order.len()
        );

        IndexedCorpus {
            term_order: self.term_order,
            dictionary: self.dictionary,
            lengths: self.lengths,
            champions,
        }
    }
}

impl Default for Indexer {
    fn default() -> Self {
        Self::new()
    }
}

/// The fully-accumulated, in-memory build, ready to be flushed to disk.
pub struct IndexedCorpus {
    pub term_order: Vec<Term>,
    pub dictionary: HashMap<Term, HashMap<DocId, Vec<TermPos>>>,
    pub lengths: HashMap<DocId, DocLength>,
    pub champions: HashMap<DocId, Vec<(Term, TermWeight)>>,
}

impl IndexedCorpus {
    pub fn write(&self, paths: &IndexPaths, positional: bool) -> IndexResult<()> {
        write_index(
            &self.term_order,
            &self.dictionary,
            &self.lengths,
            &self.champions,
            paths,
            positional,
        )
    }
}

/// Run the full indexing pipeline over `documents` and flush to `paths`.
pub fn build_index(
    documents: impl IntoIterator<Item = Document>,
    stopwords: &std::collections::HashSet<String>,
    k: usize,
    positional: bool,
    paths: &IndexPaths,
) -> IndexResult<()> {
    let mut indexer = Indexer::new();
    let mut count = 0usize;
    for doc in documents {
        indexer.add_document(&doc, stopwords);
        count += 1;
    }
    info!("read {} documents", count);
    let corpus = indexer.finish(k);
    corpus.write(paths, positional)
}
