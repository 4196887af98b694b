use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use simtext::{IndexConfig, SimilarityIndex};

#[derive(Parser, Debug)]
#[clap(
    name = "simtext",
    about = "A program to find the most similar indexed document for each query."
)]
struct Args {
    /// File path to documents to be indexed, one `identifier<TAB>text` per line.
    #[clap(short = 'i', long)]
    document_path: PathBuf,

    /// File path to queries, one text per line.
    /// If None, each document is looked up against the documents preceding it
    /// before being indexed.
    #[clap(short = 'q', long)]
    query_path: Option<PathBuf>,

    /// Length of k-mers in characters (must be more than 0).
    #[clap(short = 'k', long, default_value = "13")]
    kmer_len: usize,

    /// Percentage of the expected distinct k-mers under which a document
    /// is rejected as repetitive, in the range of [0,100].
    #[clap(short = 't', long, default_value = "70")]
    repeat_threshold: u32,

    /// Minimum percentage of a document's k-mers a query must share with it.
    #[clap(short = 'm', long)]
    min_match_percent: Option<u32>,

    /// Disables parallel construction.
    #[clap(short = 'p', long)]
    disable_parallel: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = IndexConfig::new(args.kmer_len)?
        .repeat_threshold(args.repeat_threshold)
        .min_match_percent(args.min_match_percent);
    let index = SimilarityIndex::new(config)?;

    let documents = load_documents(&args.document_path)?;
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match &args.query_path {
        Some(path) => {
            build_index(&index, &documents, args.disable_parallel)?;
            let queries: Vec<String> =
                texts_iter(File::open(path).with_context(|| format!("opening {path:?}"))?)
                    .collect::<Result<_>>()?;
            let start = Instant::now();
            lookup_queries(&index, &queries, &mut out)?;
            info!(
                queries = queries.len(),
                secs = start.elapsed().as_secs_f64(),
                "done"
            );
        }
        None => {
            let start = Instant::now();
            scan_documents(&index, &documents, &mut out)?;
            info!(
                documents = index.len(),
                secs = start.elapsed().as_secs_f64(),
                "done"
            );
        }
    }
    out.flush()?;

    Ok(())
}

fn build_index(
    index: &SimilarityIndex,
    documents: &[(String, String)],
    disable_parallel: bool,
) -> Result<()> {
    info!(documents = documents.len(), "building index");
    let start = Instant::now();
    let num_rejected = if disable_parallel {
        let mut num_rejected = 0;
        for (id, text) in documents {
            if index.add_if_absent(id, text)?.is_repetitive() {
                num_rejected += 1;
            }
        }
        num_rejected
    } else {
        index
            .add_batch_in_parallel(documents.iter().map(|(id, text)| (id, text)))?
            .into_iter()
            .filter(|s| s.is_repetitive())
            .count()
    };
    let stats = index.stats();
    info!(
        documents = stats.document_count,
        kmers = stats.distinct_shingle_count,
        rejected = num_rejected,
        secs = start.elapsed().as_secs_f64(),
        "built index"
    );
    Ok(())
}

/// Writes the best match of each query line, keyed by its line number.
fn lookup_queries<W>(index: &SimilarityIndex, queries: &[String], out: &mut W) -> Result<()>
where
    W: Write,
{
    writeln!(out, "query,id,similarity")?;
    for (i, query) in queries.iter().enumerate() {
        match index.lookup_similar(query) {
            Some(found) => writeln!(out, "{i},{},{}", found.id, found.similarity)?,
            None => writeln!(out, "{i},,0")?,
        }
    }
    Ok(())
}

/// Looks each document up against the documents before it, then adds it.
fn scan_documents<W>(
    index: &SimilarityIndex,
    documents: &[(String, String)],
    out: &mut W,
) -> Result<()>
where
    W: Write,
{
    writeln!(out, "query,id,similarity")?;
    let mut num_rejected = 0;
    for (id, text) in documents {
        match index.lookup_similar(text) {
            Some(found) => writeln!(out, "{id},{},{}", found.id, found.similarity)?,
            None => writeln!(out, "{id},,0")?,
        }
        if index.add_if_absent(id, text)?.is_repetitive() {
            num_rejected += 1;
        }
    }
    info!(
        documents = index.len(),
        rejected = num_rejected,
        "scanned documents"
    );
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_documents(path: &Path) -> Result<Vec<(String, String)>> {
    let file = File::open(path).with_context(|| format!("opening {path:?}"))?;
    read_documents(file)
}

fn read_documents<R>(rdr: R) -> Result<Vec<(String, String)>>
where
    R: Read,
{
    let mut documents = vec![];
    for (lineno, line) in texts_iter(rdr).enumerate() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let (id, text) = line
            .split_once('\t')
            .ok_or_else(|| anyhow!("line {}: expected `identifier<TAB>text`", lineno + 1))?;
        if id.is_empty() {
            warn!(line = lineno + 1, "skipping document without identifier");
            continue;
        }
        documents.push((id.to_string(), text.to_string()));
    }
    Ok(documents)
}

fn texts_iter<R>(rdr: R) -> impl Iterator<Item = Result<String>>
where
    R: Read,
{
    BufReader::new(rdr)
        .lines()
        .map(|line| line.context("reading line"))
}
