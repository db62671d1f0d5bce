//! Resolve flags and environment into one immutable run configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use magicrank_core::{
    ApiKey, MarketCapTier, OutputFormat, ProviderPolicy, ScreeningCriteria, ValidationError,
};
use thiserror::Error;

use crate::cli::Cli;

pub const ENV_API_KEY: &str = "MAGICRANK_API_KEY";
pub const ENV_COUNTRY: &str = "MAGICRANK_COUNTRY";
pub const ENV_INDUSTRY: &str = "MAGICRANK_INDUSTRY";
pub const ENV_OUTPUT_FILE: &str = "MAGICRANK_OUTPUT_FILE";
pub const ENV_HEAD: &str = "MAGICRANK_HEAD";
pub const ENV_MARKET_CAP: &str = "MAGICRANK_MARKET_CAP";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing the following parameters: {}", .0.join(", "))]
    MissingParameters(Vec<&'static str>),

    #[error("invalid value '{value}' for {name}: expected a positive integer")]
    InvalidNumber { name: &'static str, value: String },

    #[error("output file '{}' does not match --format {format}", path.display())]
    FormatMismatch { path: PathBuf, format: OutputFormat },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Where the ticker universe comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UniverseSource {
    Screener,
    DirectoryFile(PathBuf),
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub api_key: ApiKey,
    pub criteria: ScreeningCriteria,
    pub output_file: PathBuf,
    pub format: OutputFormat,
    pub universe: UniverseSource,
    pub policy: ProviderPolicy,
}

impl RunConfig {
    /// Resolves against the process environment.
    pub fn from_process_env(cli: &Cli) -> Result<Self, ConfigError> {
        Self::resolve(cli, |name| std::env::var(name).ok())
    }

    /// Flags first, then `env`. Blank values count as absent. Every missing
    /// required parameter is reported in one error.
    pub fn resolve(
        cli: &Cli,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let pick = |flag: Option<&str>, name: &str| {
            flag.map(str::to_owned)
                .or_else(|| env(name))
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let api_key = pick(cli.api_key.as_deref(), ENV_API_KEY);
        let country = pick(cli.country.as_deref(), ENV_COUNTRY);
        let industry = pick(cli.industry.as_deref(), ENV_INDUSTRY);
        let market_cap = pick(cli.market_cap.as_deref(), ENV_MARKET_CAP);
        let output_file = cli
            .output_file
            .clone()
            .filter(|path| !path.as_os_str().is_empty())
            .or_else(|| pick(None, ENV_OUTPUT_FILE).map(PathBuf::from));

        let missing: Vec<&'static str> = [
            ("api_key", api_key.is_none()),
            ("country", country.is_none()),
            ("industry", industry.is_none()),
            ("output_file", output_file.is_none()),
            ("market_cap", market_cap.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        let (Some(api_key), Some(country), Some(industry), Some(output_file), Some(market_cap)) =
            (api_key, country, industry, output_file, market_cap)
        else {
            return Err(ConfigError::MissingParameters(missing));
        };

        let head = match cli.head {
            Some(head) => Some(head),
            None => pick(None, ENV_HEAD)
                .map(|raw| {
                    raw.parse::<usize>().map_err(|_| ConfigError::InvalidNumber {
                        name: ENV_HEAD,
                        value: raw.clone(),
                    })
                })
                .transpose()?,
        };

        let tier = market_cap.parse::<MarketCapTier>()?;
        let criteria = ScreeningCriteria::new(country, tier, industry, head)?;
        let policy = ProviderPolicy::fmp_default()
            .with_requests_per_minute(cli.requests_per_minute)
            .with_request_timeout(Duration::from_millis(cli.timeout_ms));
        let format = resolve_format(cli.format.map(OutputFormat::from), &output_file)?;
        let universe = match &cli.universe_file {
            Some(path) => UniverseSource::DirectoryFile(path.clone()),
            None => UniverseSource::Screener,
        };

        Ok(Self {
            api_key: ApiKey::new(api_key)?,
            criteria,
            output_file,
            format,
            universe,
            policy,
        })
    }
}

/// An explicit format must agree with a known extension; without one the
/// extension decides, and unknown extensions fall back to csv.
fn resolve_format(
    requested: Option<OutputFormat>,
    output_file: &Path,
) -> Result<OutputFormat, ConfigError> {
    let implied = OutputFormat::from_extension(output_file);
    match (requested, implied) {
        (Some(format), Some(implied)) if format != implied => Err(ConfigError::FormatMismatch {
            path: output_file.to_path_buf(),
            format,
        }),
        (Some(format), _) => Ok(format),
        (None, implied) => Ok(implied.unwrap_or_default()),
    }
}
