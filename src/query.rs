//! Query parsing and dispatch: boolean AND, phrasal-augmented free-text,
//! and plain free-text, each routed to the scorer or to positional
//! intersection depending on its shape.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::config::{IndexConfig, RocchioConfig};
use crate::error::{IndexError, IndexResult};
use crate::scorer::Scorer;
use crate::store::PostingReader;
use crate::thesaurus::Thesaurus;
use crate::tokenizer::stem_word;
use crate::types::{DocId, DocLength, Term, TermPos, TermWeight, Zone};

#[derive(Debug, Clone, PartialEq, Eq)]
enum QueryToken {
    Word(String),
    Phrase(Vec<String>),
}

/// Split raw query text into words and double-quoted phrases.
fn lex(raw: &str) -> Vec<QueryToken> {
    let mut tokens = Vec::new();
    let mut chars = raw.chars().peekable();
    let mut buf = String::new();

    while let Some(&c) = chars.peek() {
        if c == '"' {
            chars.next();
            let mut words = Vec::new();
            let mut word = String::new();
            for c2 in chars.by_ref() {
                if c2 == '"' {
                    break;
                }
                if c2.is_whitespace() {
                    if !word.is_empty() {
                        words.push(std::mem::take(&mut word));
                    }
                } else {
                    word.push(c2);
                }
            }
            if !word.is_empty() {
                words.push(word);
            }
            tokens.push(QueryToken::Phrase(words));
        } else if c.is_whitespace() {
            chars.next();
            if !buf.is_empty() {
                tokens.push(QueryToken::Word(std::mem::take(&mut buf)));
            }
        } else {
            buf.push(c);
            chars.next();
        }
    }
    if !buf.is_empty() {
        tokens.push(QueryToken::Word(buf));
    }
    tokens
}

fn intersect_sorted(a: &[DocId], b: &[DocId]) -> Vec<DocId> {
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

/// An ISO `YYYY-MM-DD` literal, recognized by shape only (no calendar
/// validation).
fn detect_iso_date(token: &str) -> Option<&str> {
    let bytes: Vec<char> = token.chars().collect();
    if bytes.len() != 10 {
        return None;
    }
    let digit = |i: usize| bytes[i].is_ascii_digit();
    if (0..4).all(digit) && bytes[4] == '-' && (5..7).all(digit) && bytes[7] == '-' && (8..10).all(digit)
    {
        Some(token)
    } else {
        None
    }
}

pub struct QueryEngine<'a> {
    reader: PostingReader,
    scorer: Scorer<'a>,
    thesaurus: Option<&'a Thesaurus>,
    config: &'a IndexConfig,
}

impl<'a> QueryEngine<'a> {
    pub fn open(
        postings_path: &Path,
        dictionary_path: &Path,
        lengths: &'a HashMap<DocId, DocLength>,
        champions: &'a HashMap<DocId, Vec<(Term, TermWeight)>>,
        thesaurus: Option<&'a Thesaurus>,
        config: &'a IndexConfig,
    ) -> IndexResult<QueryEngine<'a>> {
        let reader = PostingReader::open(postings_path, dictionary_path)?;
        let scorer = Scorer::open(postings_path, dictionary_path, lengths, champions)?;
        Ok(QueryEngine {
            reader,
            scorer,
            thesaurus,
            config,
        })
    }

    fn rocchio_config(&self) -> Option<&RocchioConfig> {
        if self.config.run_rocchio {
            Some(&self.config.rocchio)
        } else {
            None
        }
    }

    /// Doc ids carrying `term`, ignoring positions. Unknown terms yield an
    /// empty set rather than an error.
    fn term_doc_ids(&mut self, term: &Term) -> IndexResult<Vec<DocId>> {
        match self.reader.seek_term(term) {
            Ok(()) => {}
            Err(IndexError::UnknownTerm(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        }
        Ok(self
            .reader
            .entries()?
            .into_iter()
            .map(|e| e.doc_id)
            .collect())
    }

    /// Union, over all content-bearing zones, of doc ids carrying `stem`.
    fn word_doc_ids(&mut self, stem: &str) -> IndexResult<Vec<DocId>> {
        let mut ids: HashSet<DocId> = HashSet::new();
        for zone in Zone::CONTENT_BEARING {
            let term = Term::new(zone, stem);
            ids.extend(self.term_doc_ids(&term)?);
        }
        let mut ids: Vec<DocId> = ids.into_iter().collect();
        ids.sort_unstable();
        Ok(ids)
    }

    /// `DocId -> set(position)` for `stem`, merged across content-bearing
    /// zones.
    fn positions_by_doc(&mut self, stem: &str) -> IndexResult<HashMap<DocId, HashSet<TermPos>>> {
        let mut map: HashMap<DocId, HashSet<TermPos>> = HashMap::new();
        for zone in Zone::CONTENT_BEARING {
            let term = Term::new(zone, stem);
            match self.reader.seek_term(&term) {
                Ok(()) => {}
                Err(IndexError::UnknownTerm(_)) => continue,
                Err(e) => return Err(e),
            }
            for entry in self.reader.entries()? {
                if let Some(pos) = entry.position {
                    map.entry(entry.doc_id).or_default().insert(pos);
                }
            }
        }
        Ok(map)
    }

    /// Positional intersection for a phrase of already-stemmed words.
    fn phrase_doc_ids(&mut self, stems: &[String]) -> IndexResult<Vec<DocId>> {
        if stems.is_empty() {
            return Ok(Vec::new());
        }
        let mut result = self.positions_by_doc(&stems[0])?;
        for (i, stem) in stems.iter().enumerate().skip(1) {
            let posmap_i = self.positions_by_doc(stem)?;
            result.retain(|doc_id, _| posmap_i.contains_key(doc_id));
            for (doc_id, positions) in result.iter_mut() {
                let shifted: HashSet<TermPos> = posmap_i[doc_id]
                    .iter()
                    .filter_map(|&q| q.checked_sub(i as u32))
                    .collect();
                *positions = positions.intersection(&shifted).copied().collect();
            }
            result.retain(|_, positions| !positions.is_empty());
        }
        let mut doc_ids: Vec<DocId> = result.keys().copied().collect();
        doc_ids.sort_unstable();
        Ok(doc_ids)
    }

    fn run_boolean(&mut self, subqueries: &[QueryToken]) -> IndexResult<Vec<DocId>> {
        let mut sets: Vec<Vec<DocId>> = Vec::with_capacity(subqueries.len());
        for token in subqueries {
            let ids = match token {
                QueryToken::Word(w) => self.word_doc_ids(&stem_word(w))?,
                QueryToken::Phrase(words) => {
                    let stems: Vec<String> = words.iter().map(|w| stem_word(w)).collect();
                    self.phrase_doc_ids(&stems)?
                }
            };
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            sets.push(ids);
        }
        let mut result = match sets.pop() {
            Some(first) => first,
            None => return Ok(Vec::new()),
        };
        for set in sets {
            result = intersect_sorted(&result, &set);
            if result.is_empty() {
                break;
            }
        }
        Ok(result)
    }

    /// Expand free-text words into zone-replicated, thesaurus-expanded
    /// query terms, plus any `date@` literal tokens found in the raw words.
    fn expand_free_text(&self, words: &[String]) -> Vec<Term> {
        let mut terms = Vec::new();
        for word in words {
            let stem = stem_word(word);
            let mut stems = vec![stem.clone()];
            if self.config.run_query_expansion {
                if let Some(thesaurus) = self.thesaurus {
                    stems.extend(thesaurus.synonyms(&stem).cloned());
                }
            }
            for s in &stems {
                for zone in Zone::CONTENT_BEARING {
                    terms.push(Term::new(zone, s));
                }
            }
            if let Some(iso) = detect_iso_date(word) {
                terms.push(Term::new(Zone::Date, iso));
            }
        }
        terms
    }

    fn run_phrasal_augmented(
        &mut self,
        phrases: Vec<Vec<String>>,
        free_words: Vec<String>,
        relevant: &[DocId],
    ) -> IndexResult<Vec<DocId>> {
        let mut phrase_filter: Option<Vec<DocId>> = None;
        for phrase in &phrases {
            let stems: Vec<String> = phrase.iter().map(|w| stem_word(w)).collect();
            let ids = self.phrase_doc_ids(&stems)?;
            phrase_filter = Some(match phrase_filter {
                None => ids,
                Some(prev) => intersect_sorted(&prev, &ids),
            });
            if phrase_filter.as_ref().unwrap().is_empty() {
                return Ok(Vec::new());
            }
        }

        let query_terms = self.expand_free_text(&free_words);
        let ranked = if query_terms.is_empty() {
            Vec::new()
        } else {
            self.scorer
                .score(&query_terms, relevant, self.rocchio_config())?
        };

        match phrase_filter {
            None => Ok(ranked),
            Some(allowed) => {
                let allowed_set: HashSet<DocId> = allowed.iter().copied().collect();
                let mut filtered: Vec<DocId> =
                    ranked.into_iter().filter(|d| allowed_set.contains(d)).collect();
                let ranked_set: HashSet<DocId> = filtered.iter().copied().collect();
                let mut unscored: Vec<DocId> = allowed
                    .into_iter()
                    .filter(|d| !ranked_set.contains(d))
                    .collect();
                unscored.sort_unstable();
                filtered.extend(unscored);
                Ok(filtered)
            }
        }
    }

    /// Parse and run one query, returning ranked doc ids.
    pub fn run(&mut self, raw_query: &str, relevant: &[DocId]) -> IndexResult<Vec<DocId>> {
        let tokens = lex(raw_query);

        let has_and = tokens
            .iter()
            .any(|t| matches!(t, QueryToken::Word(w) if w == "AND"));
        if has_and {
            let subqueries: Vec<QueryToken> = tokens
                .into_iter()
                .filter(|t| !matches!(t, QueryToken::Word(w) if w == "AND"))
                .collect();
            return self.run_boolean(&subqueries);
        }

        let has_phrase = tokens.iter().any(|t| matches!(t, QueryToken::Phrase(_)));
        if has_phrase {
            let mut phrases = Vec::new();
            let mut free = Vec::new();
            for token in tokens {
                match token {
                    QueryToken::Phrase(words) => phrases.push(words),
                    QueryToken::Word(w) => free.push(w),
                }
            }
            return self.run_phrasal_augmented(phrases, free, relevant);
        }

        let free: Vec<String> = tokens
            .into_iter()
            .filter_map(|t| match t {
                QueryToken::Word(w) => Some(w),
                QueryToken::Phrase(_) => None,
            })
            .collect();
        let query_terms = self.expand_free_text(&free);
        if query_terms.is_empty() {
            return Ok(Vec::new());
        }
        self.scorer.score(&query_terms, relevant, self.rocchio_config())
    }
}
