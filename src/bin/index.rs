//! `index` -- builds a caselex index from a CSV corpus of legal case
//! documents: `index -i <csv> -d <dict> -p <postings>`.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use caselex::indexer::{build_index, Document};
use caselex::store::IndexPaths;
use caselex::tokenizer::load_stopwords;
use caselex::IndexConfig;

#[derive(Parser)]
#[command(author, version, about = "Build an inverted index over a CSV corpus of legal case documents")]
struct Cli {
    /// Path to the corpus CSV: header row, then (doc_id, title, content, date_posted, court).
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Output path for the dictionary file.
    #[arg(short = 'd', long = "dict")]
    dict: PathBuf,

    /// Output path for the postings file.
    #[arg(short = 'p', long = "postings")]
    postings: PathBuf,

    /// Path to a JSON config file; falls back to defaults if absent.
    #[arg(long, default_value = "config.json")]
    config: PathBuf,
}

fn read_document(record: &csv::StringRecord) -> Result<Document> {
    Ok(Document {
        doc_id: record
            .get(0)
            .context("row missing doc_id column")?
            .parse()
            .context("doc_id is not a valid integer")?,
        title: record.get(1).unwrap_or("").to_string(),
        content: record.get(2).unwrap_or("").to_string(),
        date_posted: record.get(3).unwrap_or("").to_string(),
        court: record.get(4).unwrap_or("").to_string(),
    })
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = if cli.config.exists() {
        IndexConfig::load(&cli.config).context("loading config")?
    } else {
        IndexConfig::default()
    };

    let stopwords: HashSet<String> = fs::read_to_string(&config.file_names.stop_words)
        .map(|text| load_stopwords(&text))
        .unwrap_or_default();

    let mut csv_reader = csv::Reader::from_path(&cli.input).context("opening corpus CSV")?;
    let documents = csv_reader
        .records()
        .map(|record| read_document(&record.context("reading CSV row")?))
        .collect::<Result<Vec<Document>>>()?;

    log::info!("read {} documents from {:?}", documents.len(), cli.input);

    let paths = IndexPaths {
        dictionary: &cli.dict,
        postings: &cli.postings,
        lengths: Path::new(&config.file_names.lengths),
        champions: Path::new(&config.file_names.champion),
    };

    build_index(
        documents,
        &stopwords,
        config.k,
        config.write_pos_indices,
        &paths,
    )
    .context("building index")?;

    log::info!("wrote index to {:?} / {:?}", cli.dict, cli.postings);
    Ok(())
}
