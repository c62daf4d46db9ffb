//! tswindow CLI for inspecting record files, partitions and window batches.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tswindow_core::BatchShape;
use tswindow_data::{
    DataLoader, DataLoaderConfig, DataProvider, DataSource, ProviderConfig, ScalerConfig,
    ScalerKind, SplitConfig, WindowConfig,
};

#[derive(Parser)]
#[command(name = "tswindow")]
#[command(author, version)]
#[command(about = "Inspect time series partitions and sliding-window batches")]
#[command(long_about = "tswindow: load a record file, split it into train/valid/test,
scale it and report how many windowed batches each partition yields.

EXAMPLES:
  # Inspect with the default window geometry
  tswindow inspect --data traffic.npz

  # Lookback 24, 7 daily samples, 1-step horizon, batches of 32
  tswindow inspect --data traffic.npz -T 24 -n 7 --skip 24 --horizon 1 --batch-size 32

  # Read the window geometry from a JSON file
  tswindow inspect --data traffic.npz --config provider.json

  # List metrics usable with --metrics
  tswindow metrics")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, split and scale a record file and report batch counts per partition
    Inspect(InspectArgs),
    /// List the registered metric names
    Metrics,
}

#[derive(clap::Args)]
struct InspectArgs {
    /// Record file (.npz with `features`/`targets` arrays, or a single .npy array)
    #[arg(long, value_name = "FILE")]
    data: PathBuf,

    /// Data set name used for the partitions (defaults to the file stem)
    #[arg(long, value_name = "NAME")]
    name: Option<String>,

    /// Comma-separated metric names
    #[arg(long, value_delimiter = ',', default_value = "mse,mae", value_name = "NAMES")]
    metrics: Vec<String>,

    /// Lookback: most recent contiguous input steps
    #[arg(short = 'T', long, default_value = "24", value_name = "STEPS")]
    lookback: usize,

    /// Number of strided samples before the lookback block
    #[arg(short = 'n', long, default_value = "0", value_name = "N")]
    n_strided: usize,

    /// Spacing between strided samples
    #[arg(long, default_value = "1", value_name = "STEPS")]
    skip: usize,

    /// Future steps used as the label
    #[arg(long, default_value = "1", value_name = "STEPS")]
    horizon: usize,

    /// Windows per batch
    #[arg(long, default_value = "32", value_name = "SIZE")]
    batch_size: usize,

    /// JSON file holding a provider configuration; overrides the window flags
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Keep the full input span instead of the strided samples
    #[arg(long)]
    no_subsample: bool,

    /// Produce features only
    #[arg(long)]
    no_label: bool,

    /// Share of records for training
    #[arg(long, default_value = "0.7", value_name = "RATIO")]
    train_ratio: f32,

    /// Share of records for validation
    #[arg(long, default_value = "0.15", value_name = "RATIO")]
    valid_ratio: f32,

    /// Records dropped between partitions
    #[arg(long, default_value = "0", value_name = "N")]
    gap: usize,

    /// Scaler for features and targets: standard, minmax
    #[arg(long, default_value = "standard", value_name = "KIND")]
    scaler: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::from_level(log_level))
        .init();

    match cli.command {
        Commands::Inspect(args) => handle_inspect(args),
        Commands::Metrics => handle_metrics(),
    }
}

fn handle_metrics() -> Result<()> {
    println!("Registered metrics:\n");
    for name in tswindow_metrics::available_metrics() {
        let metric = tswindow_metrics::resolve(name)?;
        let direction = if metric.higher_is_better() {
            "higher is better"
        } else {
            "lower is better"
        };
        println!("  {:<8} {}", name, direction);
    }
    println!("\nUsage:");
    println!("  tswindow inspect --data FILE --metrics mse,mae");
    Ok(())
}

fn handle_inspect(args: InspectArgs) -> Result<()> {
    if !args.data.exists() {
        bail!("Record file not found: {}", args.data.display());
    }

    let provider_config = match &args.config {
        Some(path) => read_provider_config(path)?,
        None => ProviderConfig::new(WindowConfig::new(
            args.lookback,
            args.n_strided,
            args.skip,
            args.horizon,
            args.batch_size,
        ))
        .with_subsample_input(!args.no_subsample),
    };

    let scaler = ScalerConfig::new(parse_scaler_kind(&args.scaler)?);
    let loader_config = DataLoaderConfig::default()
        .with_split(SplitConfig::new(args.train_ratio, args.valid_ratio).with_gap(args.gap))
        .with_feature_scaler(scaler.clone())
        .with_target_scaler(scaler);

    let name = match args.name {
        Some(name) => name,
        None => args
            .data
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "data".to_string()),
    };

    let loader = DataLoader::new(
        name,
        &args.data,
        &args.metrics,
        tswindow_data::cache_dir(),
        loader_config,
    )
    .context("Failed to create data loader")?;
    let (train, valid, test) = loader
        .get_three_datasource()
        .with_context(|| format!("Failed to load {}", args.data.display()))?;

    let provide_label = !args.no_label;
    let window = &provider_config.window;

    println!("Data: {}", loader.data_name());
    println!("─────────────────────────────────────────");
    println!("  File:           {}", loader.data_filename().display());
    println!("  Metrics:        {}", loader.metrics().names().collect::<Vec<_>>().join(", "));
    println!(
        "  Window:         T={} n={} skip={} horizon={} batch_size={}",
        window.lookback, window.n_strided, window.stride, window.horizon, window.batch_size
    );
    println!("  Window size:    {}", window.window_size(provide_label));
    println!("  Offset:         {}", window.offset(provide_label));
    println!("  Labels:         {}", if provide_label { "yes" } else { "no" });
    println!();

    for source in [train, valid, test] {
        let summary = summarize(source, &provider_config, provide_label)?;
        println!("  {}", summary.name);
        println!("    Records:        {}", summary.records);
        println!("    Batches:        {} (expected {})", summary.batches, summary.expected);
        match summary.shapes {
            Some((features, labels)) => {
                println!("    Features:       {}", features);
                if let Some(labels) = labels {
                    println!("    Labels:         {}", labels);
                }
            }
            None => println!("    (partition shorter than offset, no batches)"),
        }
    }

    Ok(())
}

struct PartitionSummary {
    name: String,
    records: usize,
    batches: usize,
    expected: usize,
    shapes: Option<(BatchShape, Option<BatchShape>)>,
}

fn summarize(
    source: DataSource,
    config: &ProviderConfig,
    provide_label: bool,
) -> Result<PartitionSummary> {
    let name = source.name().to_string();
    let provider = DataProvider::new(source, config.clone())
        .with_context(|| format!("Invalid window configuration for '{}'", name))?;

    let mut batches = 0;
    let mut shapes = None;
    let mut iter = provider.iterate_batch_data(provide_label);
    for batch in iter.by_ref() {
        let batch = batch.with_context(|| format!("Failed to produce a batch for '{}'", name))?;
        if shapes.is_none() {
            shapes = Some((batch.features_shape(), batch.labels_shape()));
        }
        batches += 1;
    }
    let records = iter.records_seen();
    let expected = iter.expected_batches();

    Ok(PartitionSummary {
        name,
        records,
        batches,
        expected,
        shapes,
    })
}

fn read_provider_config(path: &Path) -> Result<ProviderConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse provider config {}", path.display()))
}

fn parse_scaler_kind(kind: &str) -> Result<ScalerKind> {
    match kind.to_lowercase().as_str() {
        "standard" | "std" => Ok(ScalerKind::Standard),
        "minmax" | "min_max" | "min-max" => Ok(ScalerKind::MinMax),
        other => bail!("Unknown scaler '{}'. Available: standard, minmax", other),
    }
}
