//! smallgiants command-line tool.
//!
//! Walks the registry once, filters by company name and writes JSON or CSV
//! to a file or standard output. Logs go to stderr.
//!
//! Exit codes: 0 on success, 2 for missing or invalid configuration, 1 for
//! upstream and output failures.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use smallgiants_client::{RegistryService, paginator_from_config};
use smallgiants_core::export::write_items;
use smallgiants_core::{AppConfig, CacheScope, Error, Item, OutputFormat, TieredCache};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    init_logging(cli.verbose);

    match run(&cli).await {
        Ok(count) => {
            tracing::debug!(count, "done");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(io::stderr)
        .init();
}

fn exit_code(err: &Error) -> u8 {
    match err {
        Error::Config(_) | Error::InvalidInput(_) | Error::UnsupportedFormat(_) => 2,
        _ => 1,
    }
}

/// Fetch, filter and write; returns the number of items written.
async fn run(cli: &Cli) -> Result<usize, Error> {
    let mut config = AppConfig::load()?;
    if let Some(key) = cli.auth_key.as_deref().filter(|key| !key.trim().is_empty()) {
        config.auth_key = Some(key.to_string());
    }
    let auth_key = config.require_auth_key()?;

    let paginator = paginator_from_config(&config)?;
    let service = RegistryService::new(paginator, Arc::new(TieredCache::new(None)), CacheScope::Fetch);
    let items = service.list(auth_key, &cli.query()).await?;

    write_output(&items, cli.format, cli.output.as_deref())?;
    Ok(items.len())
}

/// Write items to `path`, or to standard output when no path is given.
fn write_output(items: &[Item], format: OutputFormat, path: Option<&Path>) -> Result<(), Error> {
    match path {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            write_items(items, format, &mut writer)?;
            writer.flush()?;
            tracing::info!(path = %path.display(), count = items.len(), %format, "wrote output");
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            write_items(items, format, &mut writer)?;
            writer.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallgiants_core::{COMPANY_NAME_FIELD, ConfigError};

    fn items() -> Vec<Item> {
        let mut a = Item::new();
        a.insert(COMPANY_NAME_FIELD.into(), "Acme".into());
        a.insert("region".into(), "11".into());
        let mut b = Item::new();
        b.insert(COMPANY_NAME_FIELD.into(), "Beta".into());
        vec![a, b]
    }

    #[test]
    fn test_write_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_output(&items(), OutputFormat::Csv, Some(&path)).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "coNm,region\nAcme,11\nBeta,\n");
    }

    #[test]
    fn test_write_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_output(&items(), OutputFormat::Json, Some(&path)).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<Item> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, items());
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_write_to_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.json");
        let err = write_output(&items(), OutputFormat::Json, Some(&path)).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_exit_codes() {
        let missing = Error::from(ConfigError::Missing { field: "auth_key".into(), hint: "set it".into() });
        assert_eq!(exit_code(&missing), 2);
        let upstream = Error::UpstreamFetch { page: 1, reason: "down".into() };
        assert_eq!(exit_code(&upstream), 1);
    }
}
