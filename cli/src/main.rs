use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::collections::HashSet;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};
use zipsearch_core::pipeline::build_index;
use zipsearch_core::snippet::{highlight_terms, make_snippet};
use zipsearch_core::{
    reformulate, CrawlOptions, DocId, IndexCache, IndexView, InvertedIndex, Query, QueryResult, ReformulateOptions,
};

const SNIPPET_WIDTH: usize = 160;

#[derive(Parser)]
#[command(name = "zipsearch")]
#[command(about = "Crawl a zip of HTML pages and search it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct IndexArgs {
    /// Zip archive holding the pages
    #[arg(long, default_value = "rhf.zip")]
    archive: PathBuf,
    /// Archive entry the crawl starts from
    #[arg(long, default_value = "rhf/index.html")]
    seed: String,
    /// Directory for cached indexes
    #[arg(long, env = "ZIPSEARCH_CACHE_DIR", default_value = "./.zipsearch-cache")]
    cache_dir: PathBuf,
    /// Rebuild without reading or writing the cache
    #[arg(long, default_value_t = false)]
    no_cache: bool,
    /// Skip pages no link reaches from the seed
    #[arg(long, default_value_t = false)]
    no_sweep: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build (or load) the index and list crawled pages
    Build {
        #[command(flatten)]
        index: IndexArgs,
    },
    /// Run one query: "a phrase", a or b, a and b, a but b, or free text
    Search {
        #[command(flatten)]
        index: IndexArgs,
        #[arg(long)]
        query: String,
        /// Maximum ranked hits
        #[arg(short, long, default_value_t = 50)]
        k: usize,
    },
    /// Expand a free-text query from its top hits and rank again
    Expand {
        #[command(flatten)]
        index: IndexArgs,
        #[arg(long)]
        query: String,
        #[arg(long, default_value_t = 5)]
        feedback_depth: usize,
        #[arg(long, default_value_t = 5)]
        max_terms: usize,
        #[arg(short, long, default_value_t = 40)]
        k: usize,
    },
    /// Read queries from stdin until an empty line
    Repl {
        #[command(flatten)]
        index: IndexArgs,
        #[arg(short, long, default_value_t = 50)]
        k: usize,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();
    let mut out = io::stdout().lock();

    match cli.command {
        Commands::Build { index } => {
            let (inv, from_cache) = load_index(&index)?;
            let origin = if from_cache { " (loaded from cache)" } else { "" };
            writeln!(out, "Indexed {} reachable pages, {} terms{origin}.", inv.num_docs, inv.num_terms())?;
            for doc in inv.documents() {
                writeln!(out, "{:>5}  {}", doc.id, doc.path)?;
            }
        }
        Commands::Search { index, query, k } => {
            let (inv, _) = load_index(&index)?;
            run_query(&mut out, &inv, &query, k)?;
        }
        Commands::Expand { index, query, feedback_depth, max_terms, k } => {
            let (inv, _) = load_index(&index)?;
            let opts = ReformulateOptions { feedback_depth, max_expansion_terms: max_terms, top_k: k };
            print_expansion(&mut out, &inv, &query, &opts)?;
        }
        Commands::Repl { index, k } => {
            let (inv, from_cache) = load_index(&index)?;
            tracing::info!(num_docs = inv.num_docs, from_cache, "index ready");
            let stdin = io::stdin();
            let mut lines = stdin.lock().lines();
            loop {
                write!(out, "enter a search key=> ")?;
                out.flush()?;
                let line = match lines.next() {
                    Some(line) => line?,
                    None => break,
                };
                if line.trim().is_empty() { break; }
                run_query(&mut out, &inv, &line, k)?;
            }
            writeln!(out, "Bye")?;
        }
    }
    Ok(())
}

fn load_index(args: &IndexArgs) -> Result<(InvertedIndex, bool)> {
    let crawl = CrawlOptions { sweep_unlinked: !args.no_sweep };
    if args.no_cache {
        return Ok((build_index(&args.archive, &args.seed, &crawl)?, false));
    }
    let cache = IndexCache::new(&args.cache_dir).with_crawl_options(crawl);
    Ok(cache.load_or_build(&args.archive, &args.seed)?)
}

fn run_query(out: &mut impl Write, inv: &InvertedIndex, raw: &str, k: usize) -> io::Result<()> {
    let query = Query::parse(raw);
    let result = query.execute(inv, k);
    if result.is_empty() {
        return writeln!(out, "no match");
    }
    writeln!(out, "Docs matched: {}", result.len())?;
    let terms = query.highlight_terms();
    match &result {
        QueryResult::Matches(docs) => {
            for &d in docs { print_doc(out, inv, d, None, &terms)?; }
        }
        QueryResult::Ranked(hits) => {
            for &(d, score) in hits { print_doc(out, inv, d, Some(score), &terms)?; }
        }
    }
    Ok(())
}

fn print_doc(out: &mut impl Write, inv: &InvertedIndex, id: DocId, score: Option<f32>, terms: &[String]) -> io::Result<()> {
    let Some(doc) = inv.document(id) else { return Ok(()) };
    let head = match score {
        Some(s) => format!("{s:0.4}  {} - {}", doc.label(), doc.path),
        None => format!("{} - {}", doc.label(), doc.path),
    };
    match make_snippet(&doc.text, terms, SNIPPET_WIDTH) {
        Some(snip) => writeln!(out, "{head}\n    {}", highlight_terms(&snip, terms, "*", "*")),
        None => writeln!(out, "{head}"),
    }
}

fn print_expansion(out: &mut impl Write, inv: &InvertedIndex, query: &str, opts: &ReformulateOptions) -> io::Result<()> {
    let r = reformulate(inv, query, opts);
    if r.original.is_empty() {
        return writeln!(out, "No documents matched the original query.");
    }
    writeln!(out, "Expanded query: {}", r.expanded_query)?;
    if r.was_expanded() {
        writeln!(out, "Added terms: {}", r.added_terms.join(", "))?;
    } else {
        writeln!(out, "Added terms: (none, used original query)")?;
    }

    let fresh: HashSet<DocId> = r.new_in_expanded().into_iter().collect();
    for &(d, score) in &r.expanded {
        let Some(doc) = inv.document(d) else { continue };
        let mark = if fresh.contains(&d) { "S'" } else { "S " };
        writeln!(out, "[{mark}] {score:0.4}  {}", doc.path)?;
    }
    writeln!(
        out,
        "Docs matched: {} (S = {}, S' only = {})",
        r.expanded.len(),
        r.original.len(),
        fresh.len()
    )
}
