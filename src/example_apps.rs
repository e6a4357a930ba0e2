use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum, error::ErrorKind};

use crate::cache::ContentCache;
use crate::config::{CacheConfig, RegistryConfig};
use crate::data::SkipReport;
use crate::datasets::{AuxiliaryDataSource, DatasetRegistry};
use crate::errors::DatasetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModalityArg {
    Feedback,
    Text,
    Visual,
    Graph,
    All,
}

impl ModalityArg {
    fn includes(self, other: ModalityArg) -> bool {
        self == ModalityArg::All || self == other
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "fetch_dataset",
    disable_help_subcommand = true,
    about = "Prefetch and summarize a benchmark dataset",
    long_about = "Download (once), unpack, parse, and align the requested modalities of a built-in dataset, then print record counts.",
    after_help = "The cache root resolves from --cache-dir, then RECDATA_CACHE_DIR, then $HOME/.recdata."
)]
struct FetchDatasetCli {
    #[arg(long, default_value = "amazon_clothing", help = "Registered dataset name")]
    dataset: String,
    #[arg(
        long,
        value_enum,
        default_value_t = ModalityArg::All,
        help = "Modality to load"
    )]
    modality: ModalityArg,
    #[arg(long = "cache-dir", value_name = "PATH", help = "Cache root override")]
    cache_dir: Option<PathBuf>,
    #[arg(long = "timeout-secs", help = "Bound every HTTP exchange, in seconds")]
    timeout_secs: Option<u64>,
    #[arg(long = "list", help = "Print registered dataset names and exit")]
    list: bool,
}

/// Run the `fetch_dataset` demo with `args_iter` (program name excluded).
pub fn run_fetch_dataset<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) = parse_cli::<FetchDatasetCli, _>(
        std::iter::once("fetch_dataset".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let mut cache_config = match cli.cache_dir {
        Some(dir) => CacheConfig::new(dir),
        None => CacheConfig::from_env()?,
    };
    if let Some(secs) = cli.timeout_secs {
        cache_config = cache_config.with_timeout(Duration::from_secs(secs));
    }
    println!("Using cache root {}", cache_config.root.display());
    let registry = DatasetRegistry::new(ContentCache::new(cache_config), RegistryConfig::from_env());

    if cli.list {
        for name in registry.names() {
            println!("{name}");
        }
        return Ok(());
    }

    let facade = registry.get(&cli.dataset)?;
    println!("=== {} ===", facade.name());
    if cli.modality.includes(ModalityArg::Feedback) {
        report("feedback", facade.load_feedback().map(|parsed| (parsed.len(), parsed.skipped)))?;
    }
    if cli.modality.includes(ModalityArg::Text) {
        report("text", facade.load_text().map(|corpus| (corpus.len(), corpus.skipped)))?;
    }
    if cli.modality.includes(ModalityArg::Visual) {
        match facade.load_visual_feature() {
            Ok(features) => println!(
                "visual: {} items x {} features",
                features.len(),
                features.matrix.dim()
            ),
            Err(DatasetError::ModalityUnavailable { .. }) => println!("visual: not provided"),
            Err(err) => return Err(err.into()),
        }
    }
    if cli.modality.includes(ModalityArg::Graph) {
        report("graph", facade.load_graph().map(|edges| (edges.len(), edges.skipped)))?;
    }
    Ok(())
}

fn report(
    label: &str,
    outcome: Result<(usize, SkipReport), DatasetError>,
) -> Result<(), Box<dyn Error>> {
    match outcome {
        Ok((count, skipped)) if skipped.is_clean() => println!("{label}: {count} records"),
        Ok((count, skipped)) => println!(
            "{label}: {count} records ({} malformed lines skipped, first at {:?})",
            skipped.count, skipped.sample_lines
        ),
        Err(DatasetError::ModalityUnavailable { .. }) => println!("{label}: not provided"),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}
