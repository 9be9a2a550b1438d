//! Core data model: document ids, zones, and zone-qualified terms.

use std::fmt;

/// Corpus-assigned document identifier.
pub type DocId = u32;

/// Position of a token within the concatenated zone-ordered token stream of a document.
pub type TermPos = u32;

/// Count of occurrences of a term in a document.
pub type TermFreq = u32;

/// Count of documents containing a term.
pub type DocFreq = u32;

/// L2 norm of a document's lnc tf vector.
pub type DocLength = f64;

/// Cosine-normalized lnc weight used in the champion list.
pub type TermWeight = f64;

/// A named region of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Zone {
    Title,
    Content,
    Date,
    Court,
    Parties,
    Section,
}

impl Zone {
    /// All zones that carry free-text content (used to replicate a query token
    /// across zones in free-text search).
    pub const CONTENT_BEARING: [Zone; 5] = [
        Zone::Content,
        Zone::Title,
        Zone::Section,
        Zone::Parties,
        Zone::Court,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Title => "title",
            Zone::Content => "content",
            Zone::Date => "date",
            Zone::Court => "court",
            Zone::Parties => "parties",
            Zone::Section => "section",
        }
    }

    pub fn parse(s: &str) -> Option<Zone> {
        match s {
            "title" => Some(Zone::Title),
            "content" => Some(Zone::Content),
            "date" => Some(Zone::Date),
            "court" => Some(Zone::Court),
            "parties" => Some(Zone::Parties),
            "section" => Some(Zone::Section),
            _ => None,
        }
    }

    /// Zone weight applied to both query and document vectors.
    pub fn weight(&self) -> f64 {
        match self {
            Zone::Title => 1.0,
            Zone::Content => 0.8,
            Zone::Section => 0.6,
            Zone::Parties => 0.4,
            Zone::Court => 0.2,
            Zone::Date => 1.0,
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A zone-qualified, stemmed, lowercased token: `zone@stem`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Term(pub String);

impl Term {
    pub fn new(zone: Zone, stem: &str) -> Term {
        Term(format!("{}@{}", zone.as_str(), stem))
    }

    pub fn zone(&self) -> Option<Zone> {
        self.0.split('@').next().and_then(Zone::parse)
    }

    pub fn stem(&self) -> &str {
        self.0.splitn(2, '@').nth(1).unwrap_or("")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Term {
    fn from(s: String) -> Term {
        Term(s)
    }
}

impl From<&str> for Term {
    fn from(s: &str) -> Term {
        Term(s.to_string())
    }
}
