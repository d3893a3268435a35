//! Command-line argument parsing for the small-giants tool.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use smallgiants_client::{FetchParams, ListingQuery};
use smallgiants_core::{MatchMode, OutputFormat};

/// Error types for CLI argument parsing
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("sleep must be a non-negative number of seconds, got '{0}'")]
    InvalidSleep(String),
}

/// Fetch Work24 small-giant companies and optionally filter by company name.
#[derive(Parser, Debug)]
#[command(name = "smallgiants")]
#[command(about = "Fetch Work24 small-giant companies and optionally filter by company name")]
#[command(version)]
pub struct Cli {
    /// Work24 auth key (prefer the WORK24_AUTH_KEY environment variable)
    #[arg(long, value_name = "KEY")]
    pub auth_key: Option<String>,

    /// Company name keyword to filter by
    #[arg(long, default_value = "")]
    pub company: String,

    /// Company name matching mode: partial or exact
    #[arg(long = "match", value_name = "MODE", default_value = "partial")]
    pub match_mode: MatchMode,

    /// Normalize company names (case, legal-entity markers, punctuation) before matching
    #[arg(long)]
    pub normalize: bool,

    /// Region code
    #[arg(long, default_value = "")]
    pub region: String,

    /// Results per page (clamped to 1..=100)
    #[arg(long, default_value_t = 100)]
    pub display: u32,

    /// Maximum number of pages to scan
    #[arg(long, default_value_t = 1000)]
    pub max_pages: u32,

    /// Output format: json or csv
    #[arg(long, default_value = "json")]
    pub format: OutputFormat,

    /// Output file path; standard output when omitted
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Seconds to sleep between page requests
    #[arg(long, default_value = "0", value_parser = parse_sleep)]
    pub sleep: Duration,

    /// Enable debug logging on stderr
    #[arg(long, short)]
    pub verbose: bool,
}

/// Parses a seconds value such as `0.5` into a delay.
pub fn parse_sleep(s: &str) -> Result<Duration, CliError> {
    s.trim()
        .parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .ok_or_else(|| CliError::InvalidSleep(s.to_string()))
}

impl Cli {
    /// The listing query described by the flags.
    pub fn query(&self) -> ListingQuery {
        ListingQuery {
            company: self.company.trim().to_string(),
            match_mode: self.match_mode,
            normalize: self.normalize,
            fetch: FetchParams {
                region: self.region.trim().to_string(),
                display: self.display,
                max_pages: self.max_pages,
                sleep: self.sleep,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["smallgiants"]).unwrap();
        assert_eq!(cli.auth_key, None);
        assert_eq!(cli.match_mode, MatchMode::Partial);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.display, 100);
        assert_eq!(cli.max_pages, 1000);
        assert_eq!(cli.sleep, Duration::ZERO);
        assert!(cli.output.is_none());
        assert!(!cli.normalize);
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "smallgiants",
            "--auth-key",
            "k",
            "--company",
            " 스몰캡 ",
            "--match",
            "exact",
            "--normalize",
            "--region",
            "11",
            "--display",
            "500",
            "--max-pages",
            "3",
            "--format",
            "CSV",
            "--output",
            "out.csv",
            "--sleep",
            "0.5",
            "--verbose",
        ])
        .unwrap();

        assert_eq!(cli.auth_key.as_deref(), Some("k"));
        assert_eq!(cli.format, OutputFormat::Csv);
        assert_eq!(cli.output, Some(PathBuf::from("out.csv")));
        assert!(cli.verbose);

        let query = cli.query();
        assert_eq!(query.company, "스몰캡");
        assert_eq!(query.match_mode, MatchMode::Exact);
        assert!(query.normalize);
        assert_eq!(query.fetch.region, "11");
        assert_eq!(query.fetch.page_size(), 100);
        assert_eq!(query.fetch.max_pages, 3);
        assert_eq!(query.fetch.sleep, Duration::from_millis(500));
    }

    #[test]
    fn test_rejects_unknown_format_and_match() {
        assert!(Cli::try_parse_from(["smallgiants", "--format", "xml"]).is_err());
        assert!(Cli::try_parse_from(["smallgiants", "--match", "fuzzy"]).is_err());
    }

    #[test]
    fn test_parse_sleep() {
        assert_eq!(parse_sleep("1.25").unwrap(), Duration::from_millis(1250));
        assert!(matches!(parse_sleep("-1"), Err(CliError::InvalidSleep(_))));
        assert!(parse_sleep("soon").is_err());
    }
}
