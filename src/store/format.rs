//! On-disk layout of the dictionary, postings, lengths, and champion files.
//!
//! The postings file layout is bit-exact: byte 0 is the mode marker
//! (`0xFF` positional, `0x00` plain), followed by a concatenation of
//! per-term posting lists with no delimiters; all boundaries are derived
//! from `DocFreq`/`TermFreq`. The other three files use a small
//! language-neutral tagged format (length-prefixed UTF-8 strings,
//! little-endian integers and IEEE-754 doubles), following the
//! magic-bytes-plus-version header convention of `persistence::format`.

use std::collections::HashMap;
use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::codec::{gap_decode, gap_encode, varbyte_decode, varbyte_encode};
use crate::error::{IndexError, IndexResult};
use crate::types::{DocId, DocLength, Term, TermFreq, TermPos, TermWeight};

/// Mode byte for positional postings.
pub const MODE_POSITIONAL: u8 = 0xFF;
/// Mode byte for plain (DocId, TermFreq) postings.
pub const MODE_PLAIN: u8 = 0x00;

/// Magic bytes shared by the dictionary, lengths, and champion files.
pub const AUX_MAGIC: [u8; 4] = *b"CLEX";
/// Format version of the auxiliary files.
pub const AUX_VERSION: u32 = 1;

fn write_string<W: Write>(w: &mut W, s: &str) -> IndexResult<()> {
    let bytes = s.as_bytes();
    w.write_u32::<LittleEndian>(bytes.len() as u32)?;
    w.write_all(bytes)?;
    Ok(())
}

fn read_string<R: Read>(r: &mut R) -> IndexResult<String> {
    let len = r.read_u32::<LittleEndian>()? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|e| IndexError::MalformedInput(e.to_string()))
}

fn write_aux_header<W: Write>(w: &mut W) -> IndexResult<()> {
    w.write_all(&AUX_MAGIC)?;
    w.write_u32::<LittleEndian>(AUX_VERSION)?;
    Ok(())
}

fn read_aux_header<R: Read>(r: &mut R) -> IndexResult<()> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if magic != AUX_MAGIC {
        return Err(IndexError::MalformedInput(format!(
            "bad magic bytes: {:?}",
            magic
        )));
    }
    let version = r.read_u32::<LittleEndian>()?;
    if version != AUX_VERSION {
        return Err(IndexError::MalformedInput(format!(
            "unsupported format version: {}",
            version
        )));
    }
    Ok(())
}

/// One logical posting as held in memory before it is flushed to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct PostingRecord {
    pub doc_id: DocId,
    pub term_freq: TermFreq,
    pub positions: Vec<TermPos>,
}

/// Encode one term's posting list. `postings` must already be
/// sorted by descending `term_freq`, ties broken by ascending `doc_id`.
pub fn encode_posting_list(postings: &[PostingRecord], positional: bool) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&varbyte_encode(postings.len() as u64));
    for p in postings {
        out.extend_from_slice(&varbyte_encode(p.doc_id as u64));
        out.extend_from_slice(&varbyte_encode(p.term_freq as u64));
        if positional {
            let positions: Vec<u64> = p.positions.iter().map(|&x| x as u64).collect();
            out.extend_from_slice(&gap_encode(&positions));
        }
    }
    out
}

/// Decode one term's posting list in full (non-streaming; used by tests and
/// by the writer to validate round-trips). See [`super::reader::PostingReader`]
/// for the streaming cursor used at query time.
pub fn decode_posting_list(data: &[u8], positional: bool) -> IndexResult<Vec<PostingRecord>> {
    let (doc_freq, mut offset) = varbyte_decode(data)?;
    let mut out = Vec::with_capacity(doc_freq as usize);
    for _ in 0..doc_freq {
        let (doc_id, n) = varbyte_decode(&data[offset..])?;
        offset += n;
        let (term_freq, n) = varbyte_decode(&data[offset..])?;
        offset += n;
        let positions = if positional {
            let (positions, n) = gap_decode(&data[offset..], term_freq as usize)?;
            offset += n;
            positions.into_iter().map(|x| x as TermPos).collect()
        } else {
            Vec::new()
        };
        out.push(PostingRecord {
            doc_id: doc_id as DocId,
            term_freq: term_freq as TermFreq,
            positions,
        });
    }
    Ok(out)
}

/// Write the dictionary file: `Term -> byte offset into the postings file`.
pub fn write_dictionary<W: Write>(w: &mut W, dictionary: &[(Term, u64)]) -> IndexResult<()> {
    write_aux_header(w)?;
    w.write_u64::<LittleEndian>(dictionary.len() as u64)?;
    for (term, offset) in dictionary {
        write_string(w, term.as_str())?;
        w.write_u64::<LittleEndian>(*offset)?;
    }
    Ok(())
}

/// Read the dictionary file back into a lookup map.
pub fn read_dictionary<R: Read>(r: &mut R) -> IndexResult<HashMap<Term, u64>> {
    read_aux_header(r)?;
    let count = r.read_u64::<LittleEndian>()?;
    let mut map = HashMap::with_capacity(count as usize);
    for _ in 0..count {
        let term = Term::from(read_string(r)?);
        let offset = r.read_u64::<LittleEndian>()?;
        map.insert(term, offset);
    }
    Ok(map)
}

/// Write the lengths file: `DocId -> DocLength`.
pub fn write_lengths<W: Write>(w: &mut W, lengths: &HashMap<DocId, DocLength>) -> IndexResult<()> {
    write_aux_header(w)?;
    w.write_u64::<LittleEndian>(lengths.len() as u64)?;
    let mut doc_ids: Vec<&DocId> = lengths.keys().collect();
    doc_ids.sort();
    for doc_id in doc_ids {
        w.write_u32::<LittleEndian>(*doc_id)?;
        w.write_f64::<LittleEndian>(lengths[doc_id])?;
    }
    Ok(())
}

/// Read the lengths file back into a lookup map.
pub fn read_lengths<R: Read>(r: &mut R) -> IndexResult<HashMap<DocId, DocLength>> {
    read_aux_header(r)?;
    let count = r.read_u64::<LittleEndian>()?;
    let mut map = HashMap::with_capacity(count as usize);
    for _ in 0..count {
        let doc_id = r.read_u32::<LittleEndian>()?;
        let length = r.read_f64::<LittleEndian>()?;
        map.insert(doc_id, length);
    }
    Ok(map)
}

/// Write the champions file: `DocId -> [(Term, TermWeight)]`, descending by weight.
pub fn write_champions<W: Write>(
    w: &mut W,
    champions: &HashMap<DocId, Vec<(Term, TermWeight)>>,
) -> IndexResult<()> {
    write_aux_header(w)?;
    w.write_u64::<LittleEndian>(champions.len() as u64)?;
    let mut doc_ids: Vec<&DocId> = champions.keys().collect();
    doc_ids.sort();
    for doc_id in doc_ids {
        let list = &champions[doc_id];
        w.write_u32::<LittleEndian>(*doc_id)?;
        w.write_u32::<LittleEndian>(list.len() as u32)?;
        for (term, weight) in list {
            write_string(w, term.as_str())?;
            w.write_f64::<LittleEndian>(*weight)?;
        }
    }
    Ok(())
}

/// Read the champions file back into a lookup map.
pub fn read_champions<R: Read>(r: &mut R) -> IndexResult<HashMap<DocId, Vec<(Term, TermWeight)>>> {
    read_aux_header(r)?;
    let count = r.read_u64::<LittleEndian>()?;
    let mut map = HashMap::with_capacity(count as usize);
    for _ in 0..count {
        let doc_id = r.read_u32::<LittleEndian>()?;
        let list_len = r.read_u32::<LittleEndian>()?;
        let mut list = Vec::with_capacity(list_len as usize);
        for _ in 0..list_len {
            let term = Term::from(read_string(r)?);
            let weight = r.read_f64::<LittleEndian>()?;
            list.push((term, weight));
        }
        map.insert(doc_id, list);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(doc_id: u32, term_freq: u32, positions: &[u32]) -> PostingRecord {
        PostingRecord {
            doc_id,
            term_freq,
            positions: positions.to_vec(),
        }
    }

    #[test]
    fn posting_list_roundtrip_positional() {
        let postings = vec![rec(2, 3, &[1, 4, 9]), rec(1, 2, &[0, 5])];
        let encoded = encode_posting_list(&postings, true);
        let decoded = decode_posting_list(&encoded, true).unwrap();
        assert_eq!(decoded, postings);
    }

    #[test]
    fn posting_list_roundtrip_plain() {
        let postings = vec![rec(2, 3, &[]), rec(1, 2, &[])];
        let encoded = encode_posting_list(&postings, false);
        let decoded = decode_posting_list(&encoded, false).unwrap();
        assert_eq!(decoded, postings);
    }

    #[test]
    fn dictionary_roundtrip() {
        let dict = vec![
            (Term::from("content@cat"), 1u64),
            (Term::from("title@dog"), 42u64),
        ];
        let mut buf = Vec::new();
        write_dictionary(&mut buf, &dict).unwrap();
        let read_back = read_dictionary(&mut &buf[..]).unwrap();
        assert_eq!(read_back.get(&Term::from("content@cat")), Some(&1));
        assert_eq!(read_back.get(&Term::from("title@dog")), Some(&42));
    }

    #[test]
    fn lengths_roundtrip() {
        let mut lengths = HashMap::new();
        lengths.insert(1u32, 1.5f64);
        lengths.insert(2u32, 2.25f64);
        let mut buf = Vec::new();
        write_lengths(&mut buf, &lengths).unwrap();
        let read_back = read_lengths(&mut &buf[..]).unwrap();
        assert_eq!(read_back, lengths);
    }

    #[test]
    fn champions_roundtrip() {
        let mut champions = HashMap::new();
        champions.insert(1u32, vec![(Term::from("content@cat"), 0.9f64)]);
        let mut buf = Vec::new();
        write_champions(&mut buf, &champions).unwrap();
        let read_back = read_champions(&mut &buf[..]).unwrap();
        assert_eq!(read_back, champions);
    }
}
