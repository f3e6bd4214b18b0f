use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use search_core::paginate::format_page;
use search_core::{
    paginate, process_queries, process_queries_joined, remove_duplicates, DocId, DocumentStatus, ExecutionPolicy,
    IndexConfig, RequestQueue, SearchIndex,
};
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct InputDoc {
    id: DocId,
    text: String,
    #[serde(default)]
    status: DocumentStatus,
    #[serde(default)]
    ratings: Vec<i32>,
}

#[derive(Parser)]
#[command(name = "search-cli")]
#[command(about = "Query an in-memory TF-IDF index built from JSON/JSONL documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct IndexArgs {
    /// Input path (file or directory of .json/.jsonl files)
    #[arg(long)]
    input: String,
    /// Space-separated stop words
    #[arg(long, default_value = "")]
    stop_words: String,
    /// Worker threads for parallel execution (defaults to all cores)
    #[arg(long)]
    threads: Option<usize>,
    /// Maximum number of cached query parses
    #[arg(long)]
    cache_capacity: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run queries one by one and report how many found nothing
    Search {
        #[command(flatten)]
        index: IndexArgs,
        /// Rank on the worker pool instead of the calling thread
        #[arg(long, default_value_t = false)]
        parallel: bool,
        /// Results per printed page
        #[arg(long, default_value_t = 2)]
        page_size: usize,
        queries: Vec<String>,
    },
    /// Run queries concurrently
    Batch {
        #[command(flatten)]
        index: IndexArgs,
        /// Print one flat list instead of one list per query
        #[arg(long, default_value_t = false)]
        joined: bool,
        queries: Vec<String>,
    },
    /// Show which query terms a document contains
    Match {
        #[command(flatten)]
        index: IndexArgs,
        #[arg(long)]
        id: DocId,
        query: String,
    },
    /// Remove documents with identical term sets
    Dedup {
        #[command(flatten)]
        index: IndexArgs,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Search { index, parallel, page_size, queries } => {
            let index = load_index(&index)?;
            let policy = if parallel { ExecutionPolicy::Parallel } else { ExecutionPolicy::Sequential };
            run_search(&index, policy, page_size, &queries)
        }
        Commands::Batch { index, joined, queries } => {
            let index = load_index(&index)?;
            if joined {
                for document in process_queries_joined(&index, &queries)? {
                    println!("{document}");
                }
            } else {
                for (query, documents) in queries.iter().zip(process_queries(&index, &queries)?) {
                    println!("{} documents for query: {query}", documents.len());
                    for document in documents {
                        println!("  {document}");
                    }
                }
            }
            Ok(())
        }
        Commands::Match { index, id, query } => {
            let index = load_index(&index)?;
            let (words, status) = index.match_document(&query, id)?;
            println!("{{ document_id = {id}, status = {status}, words = {} }}", words.join(" "));
            Ok(())
        }
        Commands::Dedup { index } => {
            let mut index = load_index(&index)?;
            let before = index.document_count();
            for id in remove_duplicates(&mut index) {
                println!("Found duplicate document id {id}");
            }
            tracing::info!(before, after = index.document_count(), "deduplication complete");
            Ok(())
        }
    }
}

fn run_search(index: &SearchIndex, policy: ExecutionPolicy, page_size: usize, queries: &[String]) -> Result<()> {
    let mut requests = RequestQueue::new(index);
    for query in queries {
        let documents = index
            .find_top_documents_with(policy, query, |_, status, _| status == DocumentStatus::Actual)
            .with_context(|| format!("query '{query}'"))?;
        requests.record(&documents);
        println!("Results for query: {query}");
        for page in paginate(&documents, page_size) {
            println!("{}", format_page(page));
            println!("Page break");
        }
    }
    println!("Total empty requests: {}", requests.no_result_requests());
    Ok(())
}

fn load_index(args: &IndexArgs) -> Result<SearchIndex> {
    let mut config = IndexConfig::new();
    if let Some(threads) = args.threads {
        config = config.parallelism(threads);
    }
    if let Some(capacity) = args.cache_capacity {
        config = config.query_cache_capacity(capacity);
    }
    let mut index = SearchIndex::with_config(config)?;
    index.set_stop_words(&args.stop_words)?;

    let input_path = Path::new(&args.input);
    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && matches!(p.extension().and_then(|s| s.to_str()), Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    } else {
        anyhow::bail!("input path {} does not exist", input_path.display());
    }

    for file in files {
        let docs = if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(&file)?
        } else {
            read_json(&file)?
        };
        for doc in docs {
            index
                .add_document(doc.id, &doc.text, doc.status, &doc.ratings)
                .with_context(|| format!("adding document {} from {}", doc.id, file.display()))?;
        }
    }
    tracing::info!(num_docs = index.document_count(), num_terms = index.term_count(), "documents loaded");
    Ok(index)
}

fn read_jsonl(file: &Path) -> Result<Vec<InputDoc>> {
    let reader = BufReader::new(File::open(file)?);
    let mut docs = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        docs.push(serde_json::from_str(&line)?);
    }
    Ok(docs)
}

fn read_json(file: &Path) -> Result<Vec<InputDoc>> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    let docs = match json {
        serde_json::Value::Array(arr) => arr
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<InputDoc>, _>>()?,
        serde_json::Value::Object(_) => vec![serde_json::from_value(json)?],
        _ => Vec::new(),
    };
    Ok(docs)
}
