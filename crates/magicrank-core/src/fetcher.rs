//! Per-ticker fundamentals retrieval.

use std::sync::Arc;

use thiserror::Error;
use time::Date;

use crate::data_source::{
    FundamentalsSource, LineItemsRequest, QuoteRequest, SourceError, SourceErrorKind,
};
use crate::{FundamentalsSnapshot, LineItem, Ticker};

/// Reasons a single fetch attempt produced no snapshot.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchFailure {
    #[error("ticker '{ticker}' is not covered by the provider")]
    InvalidTicker { ticker: Ticker },

    #[error("no annual statement on or after {start}")]
    NoReportingPeriod { start: Date },

    #[error("line item '{item}' is missing")]
    MissingLineItem { item: LineItem },

    #[error("no price available for '{ticker}'")]
    MissingPrice { ticker: Ticker },

    #[error(transparent)]
    Source(SourceError),
}

impl FetchFailure {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidTicker { .. } => "fetch.invalid_ticker",
            Self::NoReportingPeriod { .. } => "fetch.no_reporting_period",
            Self::MissingLineItem { .. } => "fetch.missing_line_item",
            Self::MissingPrice { .. } => "fetch.missing_price",
            Self::Source(error) => error.code(),
        }
    }
}

/// Turns one `(ticker, start_date)` pair into a complete snapshot.
///
/// Line items are requested first; the quote is only requested once the
/// statement period is known to be complete.
#[derive(Clone)]
pub struct FundamentalsFetcher {
    source: Arc<dyn FundamentalsSource>,
}

impl FundamentalsFetcher {
    pub fn new(source: Arc<dyn FundamentalsSource>) -> Self {
        Self { source }
    }

    pub async fn fetch(
        &self,
        ticker: &Ticker,
        start_date: Date,
    ) -> Result<FundamentalsSnapshot, FetchFailure> {
        let items = self
            .source
            .line_items(LineItemsRequest::new(ticker.clone(), start_date))
            .await
            .map_err(|error| classify(ticker, error))?;

        if items.is_empty() {
            return Err(FetchFailure::NoReportingPeriod { start: start_date });
        }
        if let Some(item) = items.first_missing() {
            return Err(FetchFailure::MissingLineItem { item });
        }

        let request = QuoteRequest::new(vec![ticker.clone()]).map_err(FetchFailure::Source)?;
        let quotes = self
            .source
            .quote(request)
            .await
            .map_err(|error| classify(ticker, error))?;
        let price = quotes
            .price_of(ticker)
            .ok_or_else(|| FetchFailure::MissingPrice {
                ticker: ticker.clone(),
            })?;

        FundamentalsSnapshot::from_line_items(ticker.clone(), start_date, &items, price)
            .map_err(|item| FetchFailure::MissingLineItem { item })
    }
}

impl std::fmt::Debug for FundamentalsFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FundamentalsFetcher")
            .field("provider", &self.source.id())
            .finish()
    }
}

fn classify(ticker: &Ticker, error: SourceError) -> FetchFailure {
    match error.kind() {
        SourceErrorKind::UnknownSymbol => FetchFailure::InvalidTicker {
            ticker: ticker.clone(),
        },
        _ => FetchFailure::Source(error),
    }
}
