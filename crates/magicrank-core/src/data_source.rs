//! Provider contracts and request/response types.
//!
//! Two seams separate the ranking pipeline from vendors:
//!
//! | Trait | Request | Response | Description |
//! |-------|---------|----------|-------------|
//! | [`UniverseProvider`] | [`ScreeningCriteria`] | `Vec<Ticker>` | Equity directory search |
//! | [`FundamentalsSource`] | [`LineItemsRequest`] | [`LineItemSet`] | Statement line items for one period |
//! | [`FundamentalsSource`] | [`QuoteRequest`] | [`QuoteBatch`] | Current prices keyed by ticker |
//!
//! # Example
//!
//! ```rust,ignore
//! use magicrank_core::{DirectoryFileUniverse, UniverseProvider, ScreeningCriteria, MarketCapTier};
//!
//! async fn list(universe: &DirectoryFileUniverse) -> Result<(), magicrank_core::SourceError> {
//!     let criteria = ScreeningCriteria::new("France", MarketCapTier::Large, "Banks", Some(10))?;
//!     for ticker in universe.search(&criteria).await? {
//!         println!("{ticker}");
//!     }
//!     Ok(())
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{LineItemSet, ProviderId, ScreeningCriteria, Ticker, ValidationError};

/// Boxed future returned by provider traits.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Provider endpoint used in error messages and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Universe,
    LineItems,
    Quote,
}

impl Endpoint {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Universe => "universe",
            Self::LineItems => "line_items",
            Self::Quote => "quote",
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    UnknownSymbol,
    Unavailable,
    RateLimited,
    InvalidRequest,
    Internal,
}

/// Structured source error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn unknown_symbol(ticker: &Ticker) -> Self {
        Self {
            kind: SourceErrorKind::UnknownSymbol,
            message: format!("ticker '{ticker}' is not known to the provider"),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::UnknownSymbol => "source.unknown_symbol",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

impl From<ValidationError> for SourceError {
    fn from(error: ValidationError) -> Self {
        Self::invalid_request(error.to_string())
    }
}

/// Request payload for statement line items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItemsRequest {
    pub ticker: Ticker,
    /// Earliest acceptable statement period date.
    pub start_date: Date,
}

impl LineItemsRequest {
    pub fn new(ticker: Ticker, start_date: Date) -> Self {
        Self { ticker, start_date }
    }
}

/// Request payload for quote endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub tickers: Vec<Ticker>,
}

impl QuoteRequest {
    pub fn new(tickers: Vec<Ticker>) -> Result<Self, SourceError> {
        if tickers.is_empty() {
            return Err(SourceError::invalid_request(
                "quote request must include at least one ticker",
            ));
        }
        Ok(Self { tickers })
    }
}

/// Latest traded price for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub ticker: Ticker,
    pub price: f64,
}

/// Quote lookup result. Tickers without a price are simply absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuoteBatch {
    pub quotes: Vec<Quote>,
}

impl QuoteBatch {
    pub fn price_of(&self, ticker: &Ticker) -> Option<f64> {
        self.quotes
            .iter()
            .find(|quote| &quote.ticker == ticker)
            .map(|quote| quote.price)
    }
}

/// Equity directory contract.
///
/// Implementations must return tickers in a stable order for identical
/// criteria and an identical directory snapshot, truncated to
/// [`ScreeningCriteria::result_limit`].
pub trait UniverseProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Searches the directory by country and market-cap tier.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the directory cannot be queried. The
    /// pipeline treats this as fatal.
    fn search<'a>(&'a self, criteria: &'a ScreeningCriteria) -> SourceFuture<'a, Vec<Ticker>>;
}

/// Fundamentals provider contract.
pub trait FundamentalsSource: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Fetches the nine line items for the first statement period on or after
    /// `req.start_date`. Missing items are left out of the returned set.
    ///
    /// # Errors
    ///
    /// Returns [`SourceErrorKind::UnknownSymbol`] for tickers the provider does
    /// not cover, and other kinds for transport or payload problems.
    fn line_items<'a>(&'a self, req: LineItemsRequest) -> SourceFuture<'a, LineItemSet>;

    /// Fetches current prices.
    fn quote<'a>(&'a self, req: QuoteRequest) -> SourceFuture<'a, QuoteBatch>;
}
