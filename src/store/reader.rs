//! Streaming cursor over a single term's posting list.
//!
//! `PostingReader` owns the open postings-file handle for the scope in
//! which it is used (acquired on [`PostingReader::open`], released when the
//! reader is dropped, on every exit path: normal, error, or early return),
//! the same "the type IS the handle" idiom as
//! `persistence::segment::SegmentWriter` owning its `Directory`. Multiple
//! terms may be looked up serially through one reader via repeated
//! `seek_term` calls; readers are not meant to be shared across threads or
//! used concurrently.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{IndexError, IndexResult};
use crate::store::format::{read_dictionary, MODE_PLAIN, MODE_POSITIONAL};
use crate::types::{DocId, Term, TermFreq, TermPos};

/// One step produced by [`PostingReader::read_entry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub doc_id: DocId,
    pub term_freq: TermFreq,
    /// Present only in positional mode; `None` in plain mode.
    pub position: Option<TermPos>,
}

/// A streaming cursor over the postings file, keyed by term.
pub struct PostingReader {
    file: BufReader<File>,
    dictionary: HashMap<Term, u64>,
    positional: bool,

    file_offset: u64,
    done: bool,

    doc_freq: u32,
    remaining_docs: u32,

    current_doc: Option<DocId>,
    current_term_freq: Option<TermFreq>,

    remaining_positions: u32,
    current_position: Option<TermPos>,
}

impl PostingReader {
    /// Open the postings file and its dictionary. Reads the mode byte once.
    pub fn open(postings_path: &Path, dictionary_path: &Path) -> IndexResult<PostingReader> {
        let mut file = BufReader::new(File::open(postings_path)?);
        let mut mode_byte = [0u8; 1];
        file.read_exact(&mut mode_byte)?;
        let positional = match mode_byte[0] {
            MODE_POSITIONAL => true,
            MODE_PLAIN => false,
            other => {
                return Err(IndexError::MalformedInput(format!(
                    "unrecognized mode byte: {:#x}",
                    other
                )))
            }
        };

        let mut dict_file = BufReader::new(File::open(dictionary_path)?);
        let dictionary = read_dictionary(&mut dict_file)?;

        Ok(PostingReader {
            file,
            dictionary,
            positional,
            file_offset: 1,
            done: true,
            doc_freq: 0,
            remaining_docs: 0,
            current_doc: None,
            current_term_freq: None,
            remaining_positions: 0,
            current_position: None,
        })
    }

    /// Whether this reader decodes positions alongside (doc_id, term_freq).
    pub fn positional(&self) -> bool {
        self.positional
    }

    pub fn doc_freq(&self) -> u32 {
        self.doc_freq
    }

    pub fn remaining_docs(&self) -> u32 {
        self.remaining_docs
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn current_doc(&self) -> Option<DocId> {
        self.current_doc
    }

    pub fn current_term_freq(&self) -> Option<TermFreq> {
        self.current_term_freq
    }

    pub fn current_position(&self) -> Option<TermPos> {
        self.current_position
    }

    fn seek_file(&mut self, offset: u64) -> IndexResult<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    fn read_varbyte(&mut self) -> IndexResult<u64> {
        self.seek_file(self.file_offset)?;
        let mut result: u64 = 0;
        let mut shift = 0u32;
        loop {
            let mut byte = [0u8; 1];
            self.file.read_exact(&mut byte)?;
            self.file_offset += 1;
            result |= ((byte[0] & 0x7F) as u64) << shift;
            if byte[0] & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
            if shift >= 64 {
                return Err(IndexError::MalformedInput(
                    "varbyte value overflowed 64 bits".to_string(),
                ));
            }
        }
    }

    /// Seek to `term`'s posting list and prime the cursor. Fails with
    /// [`IndexError::UnknownTerm`] if `term` is not in the dictionary.
    pub fn seek_term(&mut self, term: &Term) -> IndexResult<()> {
        let offset = *self
            .dictionary
            .get(term)
            .ok_or_else(|| IndexError::UnknownTerm(term.as_str().to_string()))?;

        self.file_offset = offset;
        self.current_doc = None;
        self.current_term_freq = None;
        self.current_position = None;
        self.remaining_positions = 0;

        let doc_freq = self.read_varbyte()?;
        self.doc_freq = doc_freq as u32;

        if doc_freq == 0 {
            self.remaining_docs = 0;
            self.done = true;
            return Ok(());
        }

        if self.positional {
            let doc_id = self.read_varbyte()? as DocId;
            let term_freq = self.read_varbyte()? as TermFreq;
            let first_position = self.read_varbyte()? as TermPos;
            self.current_doc = Some(doc_id);
            self.current_term_freq = Some(term_freq);
            self.current_position = Some(first_position);
            self.remaining_positions = term_freq - 1;
            self.remaining_docs = (doc_freq - 1) as u32;
        } else {
            self.remaining_docs = doc_freq as u32;
        }
        self.done = false;
        Ok(())
    }

    /// Advance one unit: a (doc_id, term_freq) pair in plain mode, or one
    /// position in positional mode. Returns the entry just produced.
    pub fn read_entry(&mut self) -> IndexResult<Entry> {
        if self.done {
            return Err(IndexError::ReadAfterDone);
        }

        if !self.positional {
            let doc_id = self.read_varbyte()? as DocId;
            let term_freq = self.read_varbyte()? as TermFreq;
            self.current_doc = Some(doc_id);
            self.current_term_freq = Some(term_freq);
            self.remaining_docs -= 1;
            self.done = self.remaining_docs == 0;
            return Ok(Entry {
                doc_id,
                term_freq,
                position: None,
            });
        }

        if self.remaining_positions > 0 {
            let gap = self.read_varbyte()? as TermPos;
            self.current_position = Some(self.current_position.unwrap_or(0) + gap);
            self.remaining_positions -= 1;
        } else {
            let doc_id = self.read_varbyte()? as DocId;
            let term_freq = self.read_varbyte()? as TermFreq;
            let first_position = self.read_varbyte()? as TermPos;
            self.current_doc = Some(doc_id);
            self.current_term_freq = Some(term_freq);
            self.current_position = Some(first_position);
            self.remaining_positions = term_freq - 1;
            self.remaining_docs -= 1;
        }
        self.done = self.remaining_positions == 0 && self.remaining_docs == 0;

        Ok(Entry {
            doc_id: self.current_doc.unwrap(),
            term_freq: self.current_term_freq.unwrap(),
            position: self.current_position,
        })
    }

    /// Consume the remainder of the current posting list, one [`Entry`] per
    /// document. Meant to be called right after [`PostingReader::seek_term`]
    /// to pull a whole term's postings at once (the scorer's document-vector
    /// pass and the query engine's boolean/phrasal term lookups both do
    /// this rather than driving `read_entry`/`read_next_doc` by hand).
    pub fn entries(&mut self) -> IndexResult<Vec<Entry>> {
        if self.doc_freq == 0 {
            return Ok(Vec::new());
        }
        let mut out = Vec::with_capacity(self.doc_freq as usize);
        if self.positional {
            out.push(Entry {
                doc_id: self.current_doc.unwrap(),
                term_freq: self.current_term_freq.unwrap(),
                position: self.current_position,
            });
            for _ in 1..self.doc_freq {
                out.push(self.read_next_doc()?);
            }
        } else {
            for _ in 0..self.doc_freq {
                out.push(self.read_entry()?);
            }
        }
        Ok(out)
    }

    /// Advance to the next document boundary, discarding any remaining
    /// positions of the current document. In plain mode this is equivalent
    /// to one `read_entry`. Fails with [`IndexError::NoMoreDocs`] if there
    /// is no remaining document.
    pub fn read_next_doc(&mut self) -> IndexResult<Entry> {
        if self.remaining_docs == 0 {
            return Err(IndexError::NoMoreDocs);
        }

        if !self.positional {
            return self.read_entry();
        }

        for _ in 0..self.remaining_positions {
            self.read_varbyte()?;
        }
        self.remaining_positions = 0;

        let doc_id = self.read_varbyte()? as DocId;
        let term_freq = self.read_varbyte()? as TermFreq;
        let first_position = self.read_varbyte()? as TermPos;
        self.current_doc = Some(doc_id);
        self.current_term_freq = Some(term_freq);
        self.current_position = Some(first_position);
        self.remaining_positions = term_freq - 1;
        self.remaining_docs -= 1;
        self.done = self.remaining_positions == 0 && self.remaining_docs == 0;

        Ok(Entry {
            doc_id,
            term_freq,
            position: Some(first_position),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::writer::{write_index, IndexPaths};
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn build_positional_index(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
        let dict_path = dir.join("dict");
        let postings_path = dir.join("postings");
        let lengths_path = dir.join("lengths");
        let champions_path = dir.join("champions");

        let mut dictionary = HashMap::new();
        let mut basuri_docs = HashMap::new();
        basuri_docs.insert(1u32, vec![1u32]);
        basuri_docs.insert(2u32, vec![5u32]);
        dictionary.insert(Term::from("content@basuri"), basuri_docs);

        let mut stopped_docs = HashMap::new();
        stopped_docs.insert(1u32, vec![2u32]);
        stopped_docs.insert(2u32, vec![9u32]);
        dictionary.insert(Term::from("content@stop"), stopped_docs);

        let term_order = vec![Term::from("content@basuri"), Term::from("content@stop")];
        let mut lengths = HashMap::new();
        lengths.insert(1u32, 1.0);
        lengths.insert(2u32, 1.0);
        let champions = HashMap::new();

        let paths = IndexPaths {
            dictionary: &dict_path,
            postings: &postings_path,
            lengths: &lengths_path,
            champions: &champions_path,
        };
        write_index(&term_order, &dictionary, &lengths, &champions, &paths, true).unwrap();
        (postings_path, dict_path)
    }

    #[test]
    fn positional_read_entry_walks_positions_then_docs() {
        let dir = tempdir().unwrap();
        let (postings_path, dict_path) = build_positional_index(dir.path());
        let mut reader = PostingReader::open(&postings_path, &dict_path).unwrap();

        reader.seek_term(&Term::from("content@basuri")).unwrap();
        assert_eq!(reader.doc_freq(), 2);
        assert_eq!(reader.current_doc(), Some(1));
        assert_eq!(reader.current_position(), Some(1));
        assert!(!reader.is_done());

        let next = reader.read_entry().unwrap();
        assert_eq!(next.doc_id, 2);
        assert_eq!(next.position, Some(5));
        assert!(reader.is_done());
    }

    #[test]
    fn read_after_done_errors() {
        let dir = tempdir().unwrap();
        let (postings_path, dict_path) = build_positional_index(dir.path());
        let mut reader = PostingReader::open(&postings_path, &dict_path).unwrap();
        reader.seek_term(&Term::from("content@basuri")).unwrap();
        reader.read_entry().unwrap();
        assert!(reader.is_done());
        let err = reader.read_entry().unwrap_err();
        assert!(matches!(err, IndexError::ReadAfterDone));
    }

    #[test]
    fn unknown_term_errors() {
        let dir = tempdir().unwrap();
        let (postings_path, dict_path) = build_positional_index(dir.path());
        let mut reader = PostingReader::open(&postings_path, &dict_path).unwrap();
        let err = reader.seek_term(&Term::from("content@nope")).unwrap_err();
        assert!(matches!(err, IndexError::UnknownTerm(_)));
    }

    #[test]
    fn read_next_doc_skips_remaining_positions() {
        let dir = tempdir().unwrap();
        let dict_path = dir.path().join("dict");
        let postings_path = dir.path().join("postings");
        let lengths_path = dir.path().join("lengths");
        let champions_path = dir.path().join("champions");

        let mut dictionary = HashMap::new();
        let mut per_doc = HashMap::new();
        per_doc.insert(1u32, vec![0u32, 1, 2]);
        per_doc.insert(2u32, vec![3u32]);
        dictionary.insert(Term::from("content@many"), per_doc);

        let term_order = vec![Term::from("content@many")];
        let mut lengths = HashMap::new();
        lengths.insert(1u32, 1.0);
        lengths.insert(2u32, 1.0);
        let champions = HashMap::new();
        let paths = IndexPaths {
            dictionary: &dict_path,
            postings: &postings_path,
            lengths: &lengths_path,
            champions: &champions_path,
        };
        write_index(&term_order, &dictionary, &lengths, &champions, &paths, true).unwrap();

        let mut reader = PostingReader::open(&postings_path, &dict_path).unwrap();
        reader.seek_term(&Term::from("content@many")).unwrap();
        assert_eq!(reader.current_doc(), Some(1));
        let entry = reader.read_next_doc().unwrap();
        assert_eq!(entry.doc_id, 2);
        assert!(reader.is_done());
    }

    #[test]
    fn read_next_doc_errors_when_exhausted() {
        let dir = tempdir().unwrap();
        let (postings_path, dict_path) = build_positional_index(dir.path());
        let mut reader = PostingReader::open(&postings_path, &dict_path).unwrap();
        reader.seek_term(&Term::from("content@basuri")).unwrap();
        reader.read_next_doc().unwrap();
        let err = reader.read_next_doc().unwrap_err();
        assert!(matches!(err, IndexError::NoMoreDocs));
    }

    #[test]
    fn entries_consumes_whole_posting_list_positional() {
        let dir = tempdir().unwrap();
        let (postings_path, dict_path) = build_positional_index(dir.path());
        let mut reader = PostingReader::open(&postings_path, &dict_path).unwrap();
        reader.seek_term(&Term::from("content@basuri")).unwrap();
        let entries = reader.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].doc_id, 1);
        assert_eq!(entries[1].doc_id, 2);
    }

    #[test]
    fn plain_mode_reads_doc_freq_pairs() {
        let dir = tempdir().unwrap();
        let dict_path = dir.path().join("dict");
        let postings_path = dir.path().join("postings");
        let lengths_path = dir.path().join("lengths");
        let champions_path = dir.path().join("champions");

        let mut dictionary = HashMap::new();
        let mut per_doc = HashMap::new();
        per_doc.insert(1u32, vec![0u32, 1]); // term_freq 2
        per_doc.insert(2u32, vec![0u32, 1, 2]); // term_freq 3
        dictionary.insert(Term::from("content@a"), per_doc);
        let term_order = vec![Term::from("content@a")];
        let mut lengths = HashMap::new();
        lengths.insert(1u32, 1.0);
        lengths.insert(2u32, 1.0);
        let champions = HashMap::new();
        let paths = IndexPaths {
            dictionary: &dict_path,
            postings: &postings_path,
            lengths: &lengths_path,
            champions: &champions_path,
        };
        write_index(&term_order, &dictionary, &lengths, &champions, &paths, false).unwrap();

        let mut reader = PostingReader::open(&postings_path, &dict_path).unwrap();
        reader.seek_term(&Term::from("content@a")).unwrap();
        assert!(!reader.positional());
        // doc 2 has higher term_freq (3) -> comes first
        let first = reader.read_entry().unwrap();
        assert_eq!((first.doc_id, first.term_freq), (2, 3));
        assert!(!reader.is_done());
        let second = reader.read_entry().unwrap();
        assert_eq!((second.doc_id, second.term_freq), (1, 2));
        assert!(reader.is_done());
    }
}
