use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::info;

use sa_locate::harness::{self, BenchOpt};
use sa_locate::index::store::{self, IndexMeta, Origin};
use sa_locate::index::{IndexOpt, SuffixIndex};
use sa_locate::io::reference;
use sa_locate::search::{Located, QueryService, RankWindow};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(
    name = "sa-locate",
    author,
    version,
    about = "Exact k-mer lookup over a suffix array with LCP-bound binary search",
    arg_required_else_help = true
)]
struct Cli {
    /// Reference FASTA file
    reference: PathBuf,
    /// Suffix array cache file (built and written if absent)
    index: PathBuf,
    /// Query length k
    #[arg(short = 'k', long = "kmer", default_value_t = 21)]
    k: usize,
    /// Number of random benchmark queries (0 to skip)
    #[arg(short = 'n', long = "queries", default_value_t = 1_000_000)]
    queries: usize,
    /// Seed for query sampling
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[arg(short = 't', long = "threads", default_value_t = 1)]
    threads: usize,
    /// Upper rank of the search interval
    #[arg(long, value_enum, default_value_t = WindowArg::Full)]
    window: WindowArg,
    /// Build the LCP range-minimum structure
    #[arg(long)]
    rmq: bool,
    /// Explicit query string (repeatable); answered and verified
    #[arg(short = 'q', long = "query")]
    query: Vec<String>,
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum WindowArg {
    /// All ranks [0, n-1]
    Full,
    /// Ranks [0, n-k] only
    Kmer,
}

impl From<WindowArg> for RankWindow {
    fn from(w: WindowArg) -> Self {
        match w {
            WindowArg::Full => RankWindow::Full,
            WindowArg::Kmer => RankWindow::Kmer,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let index = open_index(&cli.reference, &cli.index, cli.k, cli.rmq)?;
    let window = RankWindow::from(cli.window);

    if !cli.query.is_empty() {
        run_queries(&index, window, &cli.query);
        return Ok(());
    }
    if cli.queries == 0 {
        return Ok(());
    }

    let opt = BenchOpt { queries: cli.queries, seed: cli.seed, threads: cli.threads, window };
    let report = harness::run_benchmark(&index, &opt)?;
    println!("binary search time: {:.3}s", report.elapsed.as_secs_f64());
    println!("queries/s: {:.0}", report.queries_per_sec());
    println!("correct: {} out of {}", report.correct, report.queries);
    Ok(())
}

fn open_index(reference_path: &Path, index_path: &Path, k: usize, rmq: bool) -> Result<SuffixIndex> {
    info!(path = %reference_path.display(), "reading reference genome");
    let reference = reference::load_reference(reference_path)?;
    if reference.is_empty() {
        anyhow::bail!("reference '{}' contains no sequence", reference_path.display());
    }
    println!("reference: {}", reference_path.display());
    println!("headers: {}", reference.headers);
    println!("total_len: {}", reference.len());

    let meta = IndexMeta::now(
        Some(reference_path.display().to_string()),
        Some(std::env::args().collect::<Vec<_>>().join(" ")),
    );
    let opt = IndexOpt { k, build_rmq: rmq };
    let (index, origin) = store::load_or_build(reference.into_seq(), index_path, &opt, &meta)
        .map_err(|e| anyhow!("cannot open index '{}': {}", index_path.display(), e))?;

    match origin {
        Origin::Built => println!("index built: {}", index_path.display()),
        Origin::Cached(header) => println!(
            "index loaded: {} (built {})",
            index_path.display(),
            header.meta.build_timestamp.as_deref().unwrap_or("unknown")
        ),
        Origin::Legacy => println!("legacy index loaded: {}", index_path.display()),
    }
    Ok(index)
}

fn run_queries(index: &SuffixIndex, window: RankWindow, queries: &[String]) {
    let svc = QueryService::with_window(index, window);
    for q in queries {
        let norm = q.to_ascii_uppercase().into_bytes();
        match svc.lookup(&norm) {
            Located::Exact { rank, offset } => {
                let hits = svc.occurrences(&norm).len();
                println!("{}\tEXACT\trank={}\toffset={}\thits={}", q, rank, offset, hits);
            }
            Located::Boundary { rank, offset } => {
                println!("{}\tNONE\trank={}\toffset={}", q, rank, offset);
            }
        }
    }
}
