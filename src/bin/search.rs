//! `search` -- runs one query against a caselex index:
//! `search -d <dict> -p <postings> -q <query_file> -o <results>`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use caselex::store::format::{read_champions, read_lengths};
use caselex::{IndexConfig, QueryEngine, Thesaurus};

#[derive(Parser)]
#[command(author, version, about = "Run a query against a caselex index")]
struct Cli {
    #[arg(short = 'd', long = "dict")]
    dict: PathBuf,

    #[arg(short = 'p', long = "postings")]
    postings: PathBuf,

    /// First line is the query text; remaining non-empty lines are relevant DocIds.
    #[arg(short = 'q', long = "query")]
    query: PathBuf,

    /// Ranked DocIds, space-separated on a single line.
    #[arg(short = 'o', long = "output")]
    output: PathBuf,

    #[arg(long, default_value = "config.json")]
    config: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = if cli.config.exists() {
        IndexConfig::load(&cli.config).context("loading config")?
    } else {
        IndexConfig::default()
    };

    let mut lengths_file =
        fs::File::open(&config.file_names.lengths).context("opening lengths file")?;
    let lengths = read_lengths(&mut lengths_file).context("reading lengths file")?;

    let mut champions_file =
        fs::File::open(&config.file_names.champion).context("opening champions file")?;
    let champions = read_champions(&mut champions_file).context("reading champions file")?;

    let thesaurus = if config.run_query_expansion {
        Some(
            Thesaurus::load(Path::new(&config.file_names.thesaurus))
                .context("loading thesaurus")?,
        )
    } else {
        None
    };

    let query_text = fs::read_to_string(&cli.query).context("reading query file")?;
    let mut lines = query_text.lines();
    let query = lines.next().unwrap_or("").to_string();
    let relevant = lines
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.trim().parse::<u32>())
        .collect::<Result<Vec<u32>, _>>()
        .context("parsing relevant DocIds")?;

    let mut engine = QueryEngine::open(
        &cli.postings,
        &cli.dict,
        &lengths,
        &champions,
        thesaurus.as_ref(),
        &config,
    )?;
    let results = engine.run(&query, &relevant)?;

    let rendered = results
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    fs::write(&cli.output, rendered).context("writing results file")?;

    log::info!("query {:?} returned {} documents", query, results.len());
    Ok(())
}
