//! Flushes an in-memory index build to the four on-disk files.
//!
//! Mirrors `persistence::segment::SegmentWriter`'s "accumulate in memory,
//! then serialize in one pass" shape, but targets a bit-exact varbyte/gap
//! posting format rather than an FST + bytemuck segment.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;

use crate::error::IndexResult;
use crate::store::format::{
    encode_posting_list, write_champions, write_dictionary, write_lengths, PostingRecord,
    MODE_PLAIN, MODE_POSITIONAL,
};
use crate::types::{DocId, DocLength, Term, TermPos, TermWeight};

/// Paths for the four files produced by one indexing run.
#[derive(Debug, Clone)]
pub struct IndexPaths<'a> {
    pub dictionary: &'a Path,
    pub postings: &'a Path,
    pub lengths: &'a Path,
    pub champions: &'a Path,
}

/// Sort a term's postings by descending term frequency, ties broken by
/// ascending doc id.
fn ordered_postings(per_doc: &HashMap<DocId, Vec<TermPos>>) -> Vec<PostingRecord> {
    let mut records: Vec<PostingRecord> = per_doc
        .iter()
        .map(|(&doc_id, positions)| {
            let mut positions = positions.clone();
            positions.sort_unstable();
            PostingRecord {
                doc_id,
                term_freq: positions.len() as u32,
                positions,
            }
        })
        .collect();
    records.sort_by(|a, b| b.term_freq.cmp(&a.term_freq).then(a.doc_id.cmp(&b.doc_id)));
    records
}

/// Write the dictionary, postings, lengths, and champion files for one
/// indexing run. `dictionary` maps each term to its per-document position
/// lists (always tracked, regardless of `positional`); `term_order` fixes
/// the insertion order used for both the postings file and the dictionary's
/// iteration order. `positional` controls only whether positions are
/// serialized into the postings file.
pub fn write_index(
    term_order: &[Term],
    dictionary: &HashMap<Term, HashMap<DocId, Vec<TermPos>>>,
    lengths: &HashMap<DocId, DocLength>,
    champions: &HashMap<DocId, Vec<(Term, TermWeight)>>,
    paths: &IndexPaths,
    positional: bool,
) -> IndexResult<()> {
    let postings_file = File::create(paths.postings)?;
    let mut postings_writer = BufWriter::new(postings_file);
    postings_writer.write_all(&[if positional {
        MODE_POSITIONAL
    } else {
        MODE_PLAIN
    }])?;

    let mut offset: u64 = 1;
    let mut dict_entries: Vec<(Term, u64)> = Vec::with_capacity(term_order.len());

    for term in term_order {
        let per_doc = dictionary
            .get(term)
            .expect("term_order must only contain terms present in dictionary");
        let records = ordered_postings(per_doc);
        let encoded = encode_posting_list(&records, positional);

        dict_entries.push((term.clone(), offset));
        postings_writer.write_all(&encoded)?;
        offset += encoded.len() as u64;
    }
    postings_writer.flush()?;

    let dict_file = File::create(paths.dictionary)?;
    let mut dict_writer = BufWriter::new(dict_file);
    write_dictionary(&mut dict_writer, &dict_entries)?;
    dict_writer.flush()?;

    let lengths_file = File::create(paths.lengths)?;
    let mut lengths_writer = BufWriter::new(lengths_file);
    write_lengths(&mut lengths_writer, lengths)?;
    lengths_writer.flush()?;

    let champions_file = File::create(paths.champions)?;
    let mut champions_writer = BufWriter::new(champions_file);
    write_champions(&mut champions_writer, champions)?;
    champions_writer.flush()?;

    info!(
        "wrote index: {} terms, {} documents, positional={}",
        term_order.len(),
        lengths.len(),
        positional
    );

    Ok(())
}
