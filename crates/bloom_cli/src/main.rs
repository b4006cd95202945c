use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, Level};

use bloom_core::{BloomFilter, FilterConfig};

#[derive(Parser)]
#[command(name = "bloom", version, about = "Create, fill and query Bloom filter files")]
struct Cli {
    /// Log debug events to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Args)]
struct FileArgs {
    /// Filter file
    #[arg(long)]
    file: PathBuf,
    /// File is zstd-compressed
    #[arg(long, default_value_t = false)]
    compress: bool,
}

#[derive(Args)]
struct ValueArgs {
    /// Values are hex-encoded bytes
    #[arg(long, default_value_t = false)]
    hex: bool,
    /// Values to use; one per stdin line if none are given
    values: Vec<String>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Create an empty filter sized for a capacity and false-positive rate
    Create {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        capacity: Option<u64>,
        #[arg(long)]
        fp_rate: Option<f64>,
        /// JSON config: {"capacity": .., "fp_rate": .., "compress": ..}
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        compress: bool,
    },

    /// Add values to an existing filter
    Insert {
        #[command(flatten)]
        file: FileArgs,
        #[command(flatten)]
        values: ValueArgs,
    },

    /// Print the values that are possibly in the filter
    Check {
        #[command(flatten)]
        file: FileArgs,
        #[command(flatten)]
        values: ValueArgs,
        /// Print the values that are definitely not in the filter instead
        #[arg(long, default_value_t = false)]
        invert: bool,
    },

    /// Print filter parameters and load as JSON
    Show {
        #[command(flatten)]
        file: FileArgs,
    },

    /// Union several filters with identical size into one
    Combine {
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = false)]
        compress: bool,
        #[arg(required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,
    },
}

#[derive(Serialize)]
struct FilterInfo {
    capacity: u64,
    target_fp_rate: f64,
    num_bits: u64,
    num_hashes: u32,
    bits_set: u64,
    fill_ratio: f64,
    current_fp_rate: f64,
}

impl From<&BloomFilter> for FilterInfo {
    fn from(bf: &BloomFilter) -> Self {
        Self {
            capacity: bf.capacity(),
            target_fp_rate: bf.target_fp_rate(),
            num_bits: bf.num_bits(),
            num_hashes: bf.num_hashes(),
            bits_set: bf.bits_set(),
            fill_ratio: bf.fill_ratio(),
            current_fp_rate: bf.current_fp_rate(),
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn load(args: &FileArgs) -> Result<BloomFilter> {
    BloomFilter::load_file(&args.file, args.compress)
        .with_context(|| format!("loading {}", args.file.display()))
}

fn decode_value(raw: &str, hex: bool) -> Result<Vec<u8>> {
    if hex {
        Ok(hex::decode(raw.trim()).with_context(|| format!("bad hex value {raw:?}"))?)
    } else {
        Ok(raw.as_bytes().to_vec())
    }
}

/// Calls `f` with each value (raw string, decoded bytes), from args or stdin lines.
fn for_each_value(args: &ValueArgs, mut f: impl FnMut(&str, &[u8]) -> Result<()>) -> Result<usize> {
    let mut seen = 0usize;
    if !args.values.is_empty() {
        for v in &args.values {
            f(v, &decode_value(v, args.hex)?)?;
            seen += 1;
        }
        return Ok(seen);
    }
    for line in io::stdin().lock().lines() {
        let line = line?;
        f(&line, &decode_value(&line, args.hex)?)?;
        seen += 1;
    }
    Ok(seen)
}

fn create_config(
    capacity: Option<u64>,
    fp_rate: Option<f64>,
    config: Option<&Path>,
    compress: bool,
) -> Result<FilterConfig> {
    let mut cfg = match config {
        Some(p) => FilterConfig::load(p).with_context(|| format!("reading config {}", p.display()))?,
        None => FilterConfig::default(),
    };
    if let Some(c) = capacity {
        cfg.capacity = c;
    }
    if let Some(r) = fp_rate {
        cfg.fp_rate = r;
    }
    cfg.compress |= compress;
    cfg.validate()?;
    Ok(cfg)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.cmd {
        Cmd::Create { file, capacity, fp_rate, config, compress } => {
            let cfg = create_config(capacity, fp_rate, config.as_deref(), compress)?;
            let bf = BloomFilter::from_config(&cfg)?;
            bf.write_file(&file, cfg.compress)?;
            info!(
                file = %file.display(),
                capacity = cfg.capacity,
                fp_rate = cfg.fp_rate,
                bits = bf.num_bits(),
                hashes = bf.num_hashes(),
                "created filter"
            );
        }
        Cmd::Insert { file, values } => {
            let mut bf = load(&file)?;
            let added = for_each_value(&values, |_, v| {
                bf.add(v);
                Ok(())
            })?;
            bf.write_file(&file.file, file.compress)?;
            info!(file = %file.file.display(), added, "inserted values");
        }
        Cmd::Check { file, values, invert } => {
            let bf = load(&file)?;
            let stdout = io::stdout();
            let mut out = stdout.lock();
            let mut hits = 0usize;
            let total = for_each_value(&values, |raw, v| {
                let found = bf.check(v);
                if found {
                    hits += 1;
                }
                if found != invert {
                    writeln!(out, "{raw}")?;
                }
                Ok(())
            })?;
            debug!(total, hits, "checked values");
        }
        Cmd::Show { file } => {
            let bf = load(&file)?;
            println!("{}", serde_json::to_string_pretty(&FilterInfo::from(&bf))?);
        }
        Cmd::Combine { out, compress, inputs } => {
            let mut iter = inputs.iter();
            let first = iter.next().ok_or_else(|| anyhow!("no input filters"))?;
            let mut acc = BloomFilter::load_file(first, compress)
                .with_context(|| format!("loading {}", first.display()))?;
            for p in iter {
                let next = BloomFilter::load_file(p, compress)
                    .with_context(|| format!("loading {}", p.display()))?;
                if !acc.is_compatible(&next) {
                    bail!("{} has a different size or hash count than {}", p.display(), first.display());
                }
                acc.union(&next)?;
            }
            acc.write_file(&out, compress)?;
            info!(out = %out.display(), inputs = inputs.len(), "combined filters");
        }
    }
    Ok(())
}
