//! Core pipeline for magicrank.
//!
//! This crate contains:
//! - Screening inputs, fundamentals snapshots and derived ratios
//! - Universe and fundamentals provider traits with FMP, directory-file and
//!   in-memory adapters
//! - Ticker validation, per-ticker fetching with a previous-year fallback
//! - The combined earning-yield / return-on-capital ranking
//! - CSV and JSON result writers

pub mod adapters;
pub mod data_source;
pub mod domain;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod http_client;
pub mod provider_policy;
pub mod ranking;
pub mod report;
pub mod source;
pub mod throttling;
pub mod validator;
pub mod writer;

pub use adapters::{DirectoryFileUniverse, FmpAdapter, StaticFundamentals, StaticUniverse};
pub use data_source::{
    Endpoint, FundamentalsSource, LineItemsRequest, Quote, QuoteBatch, QuoteRequest, SourceError,
    SourceErrorKind, SourceFuture, UniverseProvider,
};
pub use domain::{
    beginning_of_year, ApiKey, DerivedMetrics, FundamentalsSnapshot, LineItem, LineItemSet,
    MarketCapTier, PeriodAnchors, ScreeningCriteria, Ticker, SUFFIX_SEPARATOR,
};
pub use engine::RankingEngine;
pub use error::{PipelineError, ValidationError};
pub use fetcher::{FetchFailure, FundamentalsFetcher};
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use provider_policy::ProviderPolicy;
pub use report::{DisplayRow, RankedRow, RankingRun, ResultTable, SkippedTicker};
pub use source::ProviderId;
pub use throttling::RequestPacer;
pub use writer::{
    CsvResultWriter, JsonResultWriter, OutputFormat, ResultWriter, WriteError, XlsxResultWriter,
    RESULT_HEADER,
};
