use thiserror::Error;

use crate::data_source::SourceError;
use crate::source::ProviderId;
use crate::writer::WriteError;

/// Validation and contract errors exposed by `magicrank-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ticker cannot be empty")]
    EmptyTicker,
    #[error("ticker length {len} exceeds max {max}")]
    TickerTooLong { len: usize, max: usize },
    #[error("ticker contains invalid character '{ch}' at index {index}")]
    TickerInvalidChar { ch: char, index: usize },

    #[error("country cannot be empty")]
    EmptyCountry,
    #[error("industry cannot be empty")]
    EmptyIndustry,
    #[error(
        "invalid market cap '{value}', expected one of mega, large, mid, small, micro, nano"
    )]
    InvalidMarketCap { value: String },
    #[error("result limit must be greater than zero")]
    ZeroResultLimit,

    #[error("api key cannot be empty")]
    EmptyApiKey,

    #[error("invalid output format '{value}', expected csv, json or xlsx")]
    InvalidOutputFormat { value: String },
}

/// Fatal run errors. Per-ticker failures never surface here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("equity universe from '{provider}' is unavailable: {source}")]
    UniverseUnavailable {
        provider: ProviderId,
        #[source]
        source: SourceError,
    },

    #[error(transparent)]
    Write(#[from] WriteError),
}
