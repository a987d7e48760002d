//! Mismatch kernel command line interface
//!
//! Computes (k,m)-mismatch feature vectors and kernel values for strings
//! over a fixed alphabet, with optional cache snapshots for reuse across
//! invocations.

use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::{error, info};
use mismatch_kernel::core::Result;
use mismatch_kernel::{Alphabet, CacheSnapshot, MismatchKernel};
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "mismatch-kernel")]
#[command(about = "A Rust implementation of the (k,m)-mismatch string kernel")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the sparse feature vector of a string
    Vectorize(VectorizeArgs),
    /// Compute the kernel value between two strings
    Kernel(KernelArgs),
    /// Compute the pairwise kernel matrix of a list of strings
    Matrix(MatrixArgs),
}

#[derive(Args)]
struct KernelParams {
    /// Alphabet symbols in enumeration order
    #[arg(short, long, default_value = "ACGT")]
    alphabet: String,

    /// K-mer length
    #[arg(short, default_value = "3")]
    k: usize,

    /// Maximum tolerated mismatches
    #[arg(short, default_value = "1")]
    m: usize,
}

#[derive(Args)]
struct VectorizeArgs {
    /// Input string (characters outside the alphabet are stripped)
    input: String,

    #[command(flatten)]
    params: KernelParams,

    /// Print every nonzero entry, not just a summary
    #[arg(long)]
    full: bool,
}

#[derive(Args)]
struct KernelArgs {
    /// First input string
    x1: String,

    /// Second input string
    x2: String,

    #[command(flatten)]
    params: KernelParams,

    /// Also print the cosine-normalized kernel
    #[arg(long)]
    normalized: bool,
}

#[derive(Args)]
struct MatrixArgs {
    /// File with one input string per line
    input: PathBuf,

    #[command(flatten)]
    params: KernelParams,

    /// Load a cache snapshot before computing
    #[arg(long)]
    load_cache: Option<PathBuf>,

    /// Save a cache snapshot after computing
    #[arg(long)]
    save_cache: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Vectorize(args) => vectorize_command(args),
        Commands::Kernel(args) => kernel_command(args),
        Commands::Matrix(args) => matrix_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

/// Build an engine from CLI parameters, optionally seeded from a snapshot
fn build_engine(params: &KernelParams, load_cache: Option<&PathBuf>) -> Result<MismatchKernel> {
    if let Some(path) = load_cache {
        info!("Loading cache snapshot from {:?}", path);
        let snapshot = CacheSnapshot::load_from_file(path)?;
        snapshot.ensure_parameters(&params.alphabet, params.k, params.m)?;
        snapshot.into_engine()
    } else {
        let alphabet = Alphabet::new(params.alphabet.chars())?;
        MismatchKernel::new(alphabet, params.k, params.m)
    }
}

fn vectorize_command(args: VectorizeArgs) -> Result<()> {
    let mut engine = build_engine(&args.params, None)?;

    let (normalized, vector) = engine.vectorize(&args.input)?;
    println!("Normalized input: {normalized}");
    println!(
        "Nonzero entries: {} of {}",
        vector.nnz(),
        engine.tree().leaf_count()
    );

    if args.full {
        for (index, count) in vector.iter() {
            println!("{:>12}  {}  {}", index, engine.tree().leaf_string(index), count);
        }
    }

    Ok(())
}

fn kernel_command(args: KernelArgs) -> Result<()> {
    let mut engine = build_engine(&args.params, None)?;

    let value = engine.kernel(&args.x1, &args.x2)?;
    println!("Kernel value: {value}");

    if args.normalized {
        let normalized = engine.normalized_kernel(&args.x1, &args.x2)?;
        println!("Normalized kernel: {normalized:.6}");
    }

    Ok(())
}

fn matrix_command(args: MatrixArgs) -> Result<()> {
    let mut engine = build_engine(&args.params, args.load_cache.as_ref())?;

    let contents = fs::read_to_string(&args.input)?;
    let inputs: Vec<&str> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    info!("Computing {0}x{0} kernel matrix", inputs.len());

    for x1 in &inputs {
        let row: Vec<String> = inputs
            .iter()
            .map(|x2| engine.kernel(x1, x2).map(|v| v.to_string()))
            .collect::<Result<_>>()?;
        println!("{}", row.join("\t"));
    }

    let vector_stats = engine.vector_cache_stats();
    let kernel_stats = engine.kernel_cache_stats();
    info!(
        "Vector cache: {} entries, {:.0}% hit rate",
        vector_stats.size,
        vector_stats.hit_rate() * 100.0
    );
    info!(
        "Kernel cache: {} entries, {:.0}% hit rate",
        kernel_stats.size,
        kernel_stats.hit_rate() * 100.0
    );

    if let Some(path) = args.save_cache {
        CacheSnapshot::from_engine(&engine).save_to_file(&path)?;
        info!("Cache snapshot saved to {:?}", path);
    }

    Ok(())
}
