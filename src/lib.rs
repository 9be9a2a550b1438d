//! An inverted-index search engine for a corpus of legal case documents:
//! zone-weighted tf-idf cosine ranking, phrasal and boolean queries, and
//! Rocchio pseudo-relevance feedback over a binary posting-list format.

pub mod codec;
pub mod config;
pub mod error;
pub mod indexer;
pub mod query;
pub mod rocchio;
pub mod scorer;
pub mod store;
pub mod thesaurus;
pub mod tokenizer;
pub mod types;

pub use config::IndexConfig;
pub use error::{IndexError, IndexResult};
pub use indexer::{build_index, Document, Indexer, IndexedCorpus};
pub use query::QueryEngine;
pub use scorer::Scorer;
pub use store::{IndexPaths, PostingReader};
pub use thesaurus::Thesaurus;
pub use types::{DocId, DocLength, Term, TermFreq, TermPos, TermWeight, Zone};
