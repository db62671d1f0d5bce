//! CLI argument definitions for magicrank.
//!
//! Every screening parameter may also come from the environment (or a `.env`
//! file); flags win over environment values.
//!
//! | Option | Environment | Default | Description |
//! |--------|-------------|---------|-------------|
//! | `--api-key` | `MAGICRANK_API_KEY` | required | Financial Modeling Prep key |
//! | `--country` | `MAGICRANK_COUNTRY` | required | Listing country, name or ISO code |
//! | `--industry` | `MAGICRANK_INDUSTRY` | required | Industry label (not filtered yet) |
//! | `--market-cap` | `MAGICRANK_MARKET_CAP` | required | Tier: mega, large, mid, small, micro, nano |
//! | `--output-file` | `MAGICRANK_OUTPUT_FILE` | required | Result file path |
//! | `--head` | `MAGICRANK_HEAD` | all | Keep the first N universe tickers |
//! | `--universe-file` | | FMP screener | Equity directory CSV snapshot |
//! | `--format` | | from extension, else `csv` | Result format (csv, json, xlsx) |
//! | `--requests-per-minute` | | `300` | Upstream request budget |
//! | `--timeout-ms` | | `10000` | Per-request timeout |
//! | `--log-level` | `RUST_LOG` | `info` | Log filter |
//!
//! # Examples
//!
//! ```bash
//! # The FMP screener takes ISO codes; common country names are mapped
//! magicrank --country US --industry Banks --market-cap large \
//!     --output-file ranking.xlsx --head 50
//!
//! # Rank an offline directory snapshot, write JSON
//! magicrank --universe-file equities.csv --format json --output-file ranking.json
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use magicrank_core::OutputFormat;

/// Rank equities by earning yield and return on capital.
#[derive(Debug, Parser)]
#[command(
    name = "magicrank",
    author,
    version,
    about = "Rank equities by earning yield and return on capital"
)]
pub struct Cli {
    /// Financial Modeling Prep API key.
    #[arg(long)]
    pub api_key: Option<String>,

    /// Country of listing. Names are mapped to ISO codes for the FMP screener.
    #[arg(long)]
    pub country: Option<String>,

    /// Industry label. Accepted but not applied as a filter.
    #[arg(long)]
    pub industry: Option<String>,

    /// Result file path. Existing files are overwritten.
    #[arg(long)]
    pub output_file: Option<PathBuf>,

    /// Keep only the first N tickers returned by the universe search.
    #[arg(long)]
    pub head: Option<usize>,

    /// Market capitalization tier.
    #[arg(long)]
    pub market_cap: Option<String>,

    /// Read the universe from an equity directory CSV instead of the FMP screener.
    #[arg(long)]
    pub universe_file: Option<PathBuf>,

    /// Result file format. Defaults to the output file extension, then csv.
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Upstream request budget per minute.
    #[arg(long, default_value_t = 300)]
    pub requests_per_minute: u32,

    /// Timeout for each upstream request in milliseconds.
    #[arg(long, default_value_t = 10_000)]
    pub timeout_ms: u64,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Csv,
    Json,
    Xlsx,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Csv => Self::Csv,
            FormatArg::Json => Self::Json,
            FormatArg::Xlsx => Self::Xlsx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags_with_defaults() {
        let cli = Cli::try_parse_from([
            "magicrank",
            "--country",
            "France",
            "--market-cap",
            "large",
            "--head",
            "25",
        ])
        .expect("valid arguments");

        assert_eq!(cli.country.as_deref(), Some("France"));
        assert_eq!(cli.head, Some(25));
        assert_eq!(cli.format, None);
        assert_eq!(cli.requests_per_minute, 300);
        assert_eq!(cli.timeout_ms, 10_000);
        assert_eq!(cli.log_level, "info");
        assert!(cli.api_key.is_none());
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(Cli::try_parse_from(["magicrank", "--format", "ods"]).is_err());
    }

    #[test]
    fn format_maps_to_core_output_format() {
        assert_eq!(OutputFormat::from(FormatArg::Json), OutputFormat::Json);
        assert_eq!(OutputFormat::from(FormatArg::Xlsx), OutputFormat::Xlsx);
    }
}
