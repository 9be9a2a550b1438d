//! End-to-end scenarios: build a tiny index through `Indexer`, then query it
//! through `QueryEngine`, covering the concrete cases a zone-weighted,
//! phrase-and-boolean-aware engine needs to get right.

use std::collections::HashSet;

use caselex::indexer::{Document, Indexer};
use caselex::store::IndexPaths;
use caselex::{IndexConfig, QueryEngine};
use tempfile::tempdir;

fn doc(id: u32, title: &str, content: &str) -> Document {
    Document {
        doc_id: id,
        title: title.to_string(),
        content: content.to_string(),
        date_posted: String::new(),
        court: String::new(),
    }
}

#[test]
fn stopword_filtered_query_matches_only_the_doc_with_the_surviving_term() {
    let dir = tempdir().unwrap();
    let stopwords: HashSet<String> = ["the".to_string()].into_iter().collect();

    let mut indexer = Indexer::new();
    indexer.add_document(&doc(1, "", "the cat sat"), &stopwords);
    indexer.add_document(&doc(2, "", "the dog ran"), &stopwords);
    let corpus = indexer.finish(1000);

    let dict_path = dir.path().join("dict");
    let postings_path = dir.path().join("postings");
    let lengths_path = dir.path().join("lengths");
    let champions_path = dir.path().join("champions");
    let paths = IndexPaths {
        dictionary: &dict_path,
        postings: &postings_path,
        lengths: &lengths_path,
        champions: &champions_path,
    };
    corpus.write(&paths, true).unwrap();

    let config = IndexConfig::default();
    let mut engine = QueryEngine::open(
        &postings_path,
        &dict_path,
        &corpus.lengths,
        &corpus.champions,
        None,
        &config,
    )
    .unwrap();

    let results = engine.run("cat", &[]).unwrap();
    assert_eq!(results, vec![1]);
}

#[test]
fn equal_length_documents_break_ties_by_ascending_doc_id() {
    let dir = tempdir().unwrap();
    let stopwords = HashSet::new();

    let mut indexer = Indexer::new();
    indexer.add_document(&doc(1, "", "a b a"), &stopwords);
    indexer.add_document(&doc(2, "", "a b b"), &stopwords);
    let corpus = indexer.finish(1000);

    let dict_path = dir.path().join("dict");
    let postings_path = dir.path().join("postings");
    let lengths_path = dir.path().join("lengths");
    let champions_path = dir.path().join("champions");
    let paths = IndexPaths {
        dictionary: &dict_path,
        postings: &postings_path,
        lengths: &lengths_path,
        champions: &champions_path,
    };
    corpus.write(&paths, true).unwrap();

    let config = IndexConfig::default();
    let mut engine = QueryEngine::open(
        &postings_path,
        &dict_path,
        &corpus.lengths,
        &corpus.champions,
        None,
        &config,
    )
    .unwrap();

    let results = engine.run("a b", &[]).unwrap();
    assert_eq!(results, vec![1, 2]);
}

#[test]
fn title_zone_outranks_content_zone_for_the_same_words() {
    let dir = tempdir().unwrap();
    let stopwords = HashSet::new();

    let mut indexer = Indexer::new();
    indexer.add_document(&doc(1, "", "quick brown fox"), &stopwords);
    indexer.add_document(&doc(2, "quick brown fox", ""), &stopwords);
    let corpus = indexer.finish(1000);

    let dict_path = dir.path().join("dict");
    let postings_path = dir.path().join("postings");
    let lengths_path = dir.path().join("lengths");
    let champions_path = dir.path().join("champions");
    let paths = IndexPaths {
        dictionary: &dict_path,
        postings: &postings_path,
        lengths: &lengths_path,
        champions: &champions_path,
    };
    corpus.write(&paths, true).unwrap();

    let config = IndexConfig::default();
    let mut engine = QueryEngine::open(
        &postings_path,
        &dict_path,
        &corpus.lengths,
        &corpus.champions,
        None,
        &config,
    )
    .unwrap();

    let results = engine.run("brown fox", &[]).unwrap();
    assert_eq!(results, vec![2, 1]);
}

#[test]
fn phrasal_query_requires_adjacent_positions() {
    let dir = tempdir().unwrap();
    let stopwords = HashSet::new();

    let mut indexer = Indexer::new();
    // "basuri" at pos 1, "stopped" at pos 2 in doc 1 -- adjacent.
    indexer.add_document(&doc(1, "", "x basuri stopped"), &stopwords);
    // doc 2 has both words but far apart -- not adjacent.
    indexer.add_document(
        &doc(2, "", "basuri x x x x stopped x x x x"),
        &stopwords,
    );
    let corpus = indexer.finish(1000);

    let dict_path = dir.path().join("dict");
    let postings_path = dir.path().join("postings");
    let lengths_path = dir.path().join("lengths");
    let champions_path = dir.path().join("champions");
    let paths = IndexPaths {
        dictionary: &dict_path,
        postings: &postings_path,
        lengths: &lengths_path,
        champions: &champions_path,
    };
    corpus.write(&paths, true).unwrap();

    let config = IndexConfig::default();
    let mut engine = QueryEngine::open(
        &postings_path,
        &dict_path,
        &corpus.lengths,
        &corpus.champions,
        None,
        &config,
    )
    .unwrap();

    let results = engine.run("\"basuri stopped\"", &[]).unwrap();
    assert_eq!(results, vec![1]);
}

#[test]
fn rocchio_feedback_pulls_empty_query_toward_champion_centroid() {
    let dir = tempdir().unwrap();
    let stopwords = HashSet::new();

    let mut indexer = Indexer::new();
    indexer.add_document(&doc(1, "", "x x x x x x x x x x x x x x x x x x x x x"), &stopwords);
    let corpus = indexer.finish(1000);

    let dict_path = dir.path().join("dict");
    let postings_path = dir.path().join("postings");
    let lengths_path = dir.path().join("lengths");
    let champions_path = dir.path().join("champions");
    let paths = IndexPaths {
        dictionary: &dict_path,
        postings: &postings_path,
        lengths: &lengths_path,
        champions: &champions_path,
    };
    corpus.write(&paths, true).unwrap();

    let mut config = IndexConfig::default();
    config.run_rocchio = true;
    config.rocchio.alpha = 1.0;
    config.rocchio.beta = 10.0;

    let mut scorer = caselex::Scorer::open(
        &postings_path,
        &dict_path,
        &corpus.lengths,
        &corpus.champions,
    )
    .unwrap();

    // An empty query plus Rocchio feedback over {1} should surface doc 1,
    // since its only champion term now has positive query weight.
    let results = scorer.score(&[], &[1], Some(&config.rocchio)).unwrap();
    assert_eq!(results, vec![1]);
}
