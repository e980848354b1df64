//! Command-line driver for the pipeline stages.

use std::error::Error;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, error::ErrorKind};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::PipelineConfig;
use crate::constants::config::{
    DEFAULT_CACHE_ROOT, DEFAULT_DATA_ROOT, DEFAULT_PARTITION_EXTENSION, DEFAULT_STORE_PATH,
};
use crate::pipeline::{integrate, run_dump, run_parse};
use crate::source::{load_sources, write_common};
use crate::stats::RunStats;
use crate::store::MemoryNameStore;
use crate::writer::WriterReport;

#[derive(Debug, Parser)]
#[command(
    name = "namebase",
    disable_help_subcommand = true,
    about = "Build the bucketed given-name knowledge base",
    long_about = "Parse stored wiki pages into name facts, dump them into bucket partition files, and integrate cached nickname lists into the same partitions."
)]
struct NamebaseCli {
    #[command(flatten)]
    paths: PathArgs,
    #[arg(long, short, global = true, help = "Log at debug level regardless of RUST_LOG")]
    debug: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct PathArgs {
    #[arg(
        long = "data-root",
        value_name = "DIR",
        global = true,
        default_value = DEFAULT_DATA_ROOT,
        help = "Directory holding the partition files"
    )]
    data_root: PathBuf,
    #[arg(
        long = "cache-root",
        value_name = "DIR",
        global = true,
        default_value = DEFAULT_CACHE_ROOT,
        help = "Directory holding cached nickname sources"
    )]
    cache_root: PathBuf,
    #[arg(
        long = "store",
        value_name = "PATH",
        global = true,
        default_value = DEFAULT_STORE_PATH,
        help = "JSON name store file"
    )]
    store_path: PathBuf,
    #[arg(
        long = "extension",
        value_name = "EXT",
        global = true,
        default_value = DEFAULT_PARTITION_EXTENSION,
        help = "Partition file extension"
    )]
    partition_extension: String,
    #[arg(
        long = "languages",
        value_name = "PATH",
        global = true,
        help = "Extra YAML language table layered over the built-in one"
    )]
    language_table: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract facts from stored pages and categories into the name store.
    Parse {
        /// Parse only this name, with verbose diagnostics.
        name: Option<String>,
    },
    /// Write stored facts into the bucket partitions.
    Dump,
    /// Merge cached nickname sources into the bucket partitions.
    Integrate,
    /// Run parse, dump, and integrate in order.
    All,
}

impl NamebaseCli {
    fn config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::default()
            .with_data_root(&self.paths.data_root)
            .with_cache_root(&self.paths.cache_root)
            .with_store_path(&self.paths.store_path)
            .with_partition_extension(&self.paths.partition_extension);
        if let Some(path) = &self.paths.language_table {
            config = config.with_language_table(path);
        }
        if let Command::Parse { name: Some(name) } = &self.command {
            config = config.with_name_filter(name);
        }
        config
    }
}

/// Parse `args` (without the program name) and run the selected stage.
pub fn run_cli<I>(args: I) -> Result<(), Box<dyn Error>>
where
    I: IntoIterator<Item = String>,
{
    let Some(cli) = parse_cli::<NamebaseCli, _>(std::iter::once("namebase".to_string()).chain(args))?
    else {
        return Ok(());
    };
    let config = cli.config();
    init_tracing(cli.debug || config.name_filter.is_some());
    config.validate()?;

    match cli.command {
        Command::Parse { .. } => parse_stage(&config)?.log_summary(),
        Command::Dump => log_report("dump", &dump_stage(&config)?),
        Command::Integrate => log_report("integrate", &integrate_stage(&config)?),
        Command::All => {
            parse_stage(&config)?.log_summary();
            log_report("dump", &dump_stage(&config)?);
            log_report("integrate", &integrate_stage(&config)?);
        }
    }
    Ok(())
}

/// Run the parse stage and persist the updated name store.
pub fn parse_stage(config: &PipelineConfig) -> Result<RunStats, Box<dyn Error>> {
    let languages = config.languages()?;
    let mut store = MemoryNameStore::open(config.store_path())?;
    let stats = run_parse(&mut store, &languages, config.name_filter.as_deref())?;
    store.save(config.store_path())?;
    Ok(stats)
}

/// Run the dump stage against the persisted name store.
pub fn dump_stage(config: &PipelineConfig) -> Result<WriterReport, Box<dyn Error>> {
    let store = MemoryNameStore::open(config.store_path())?;
    Ok(run_dump(&store, config.partition_store())?)
}

/// Parse the cached nickname sources, snapshot them, and integrate them.
pub fn integrate_stage(config: &PipelineConfig) -> Result<WriterReport, Box<dyn Error>> {
    let sources = load_sources(&config.cache_root)?;
    write_common(&config.cache_root, &sources)?;
    Ok(integrate(&sources, config.partition_store())?)
}

fn log_report(stage: &str, report: &WriterReport) {
    info!(
        stage,
        names = report.names,
        loaded = report.partitions_loaded,
        created = report.partitions_created,
        stored = report.partitions_stored,
        revisited = report.revisited,
        "stage finished"
    );
    for ((message, kind), count) in report.errors.most_common() {
        warn!(stage, count, kind, "{message}");
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn subcommands_map_onto_config() {
        let cli = NamebaseCli::try_parse_from(args(&[
            "namebase",
            "parse",
            "Jean",
            "--data-root",
            "/tmp/data",
            "--extension",
            "yml",
        ]))
        .unwrap();
        let config = cli.config();
        assert_eq!(config.name_filter.as_deref(), Some("Jean"));
        assert_eq!(config.data_root, PathBuf::from("/tmp/data"));
        assert_eq!(config.partition_extension, "yml");

        let cli = NamebaseCli::try_parse_from(args(&["namebase", "dump"])).unwrap();
        assert!(matches!(cli.command, Command::Dump));
        assert_eq!(cli.config().store_path, PathBuf::from(DEFAULT_STORE_PATH));
    }

    #[test]
    fn unknown_subcommands_are_errors_and_help_is_not() {
        assert!(run_cli(args(&["frobnicate"])).is_err());
        assert!(run_cli(args(&["--help"])).is_ok());
    }

    #[test]
    fn integrate_runs_end_to_end_from_the_command_line() {
        let temp = tempdir().unwrap();
        let cache = temp.path().join("cache");
        let data = temp.path().join("data");
        fs::create_dir_all(cache.join("brianary")).unwrap();
        fs::write(cache.join("brianary/nicknames.txt"), "Robert\tBob Rob\n").unwrap();

        run_cli(args(&[
            "integrate",
            "--cache-root",
            cache.to_str().unwrap(),
            "--data-root",
            data.to_str().unwrap(),
        ]))
        .unwrap();
        let partition = fs::read_to_string(data.join("Latin_B.yaml")).unwrap();
        assert!(partition.contains("Bob"));
        assert!(data.join("Latin_QR.yaml").exists());
        assert!(cache.join("brianary/common.yaml").exists());
    }
}
