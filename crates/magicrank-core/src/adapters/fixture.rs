//! In-memory providers for tests and offline dry runs.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::data_source::{
    FundamentalsSource, LineItemsRequest, Quote, QuoteBatch, QuoteRequest, SourceError,
    SourceFuture, UniverseProvider,
};
use crate::{LineItemSet, ProviderId, ScreeningCriteria, Ticker};

/// Universe that returns a fixed ticker list, or a fixed error.
#[derive(Debug, Clone)]
pub struct StaticUniverse {
    result: Result<Vec<Ticker>, SourceError>,
}

impl StaticUniverse {
    pub fn new(tickers: Vec<Ticker>) -> Self {
        Self {
            result: Ok(tickers),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            result: Err(SourceError::unavailable(message)),
        }
    }
}

impl UniverseProvider for StaticUniverse {
    fn id(&self) -> ProviderId {
        ProviderId::Static
    }

    fn search<'a>(&'a self, criteria: &'a ScreeningCriteria) -> SourceFuture<'a, Vec<Ticker>> {
        let result = self.result.clone().map(|tickers| criteria.apply_limit(tickers));
        Box::pin(async move { result })
    }
}

/// Fundamentals source backed by per-ticker statement periods and prices.
///
/// Period selection matches the live adapter: the earliest period ending on or
/// after the requested start date. Tickers with no periods at all are unknown.
#[derive(Debug, Default)]
pub struct StaticFundamentals {
    periods: HashMap<Ticker, Vec<LineItemSet>>,
    prices: HashMap<Ticker, f64>,
    requests: Mutex<Vec<LineItemsRequest>>,
}

impl StaticFundamentals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_period(mut self, ticker: &Ticker, items: LineItemSet) -> Self {
        self.periods.entry(ticker.clone()).or_default().push(items);
        self
    }

    pub fn with_price(mut self, ticker: &Ticker, price: f64) -> Self {
        self.prices.insert(ticker.clone(), price);
        self
    }

    /// Line item requests received so far, in call order.
    pub fn requests(&self) -> Vec<LineItemsRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    fn select(&self, req: &LineItemsRequest) -> Result<LineItemSet, SourceError> {
        let periods = self
            .periods
            .get(&req.ticker)
            .ok_or_else(|| SourceError::unknown_symbol(&req.ticker))?;

        Ok(periods
            .iter()
            .filter(|items| items.period_end.is_some_and(|end| end >= req.start_date))
            .min_by_key(|items| items.period_end)
            .cloned()
            .unwrap_or_default())
    }
}

impl FundamentalsSource for StaticFundamentals {
    fn id(&self) -> ProviderId {
        ProviderId::Static
    }

    fn line_items<'a>(&'a self, req: LineItemsRequest) -> SourceFuture<'a, LineItemSet> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(req.clone());
        }
        let result = self.select(&req);
        Box::pin(async move { result })
    }

    fn quote<'a>(&'a self, req: QuoteRequest) -> SourceFuture<'a, QuoteBatch> {
        let quotes = req
            .tickers
            .iter()
            .filter_map(|ticker| {
                self.prices.get(ticker).map(|price| Quote {
                    ticker: ticker.clone(),
                    price: *price,
                })
            })
            .collect();
        Box::pin(async move { Ok(QuoteBatch { quotes }) })
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;
    use crate::data_source::SourceErrorKind;
    use crate::{LineItem, MarketCapTier};

    #[tokio::test]
    async fn static_universe_honours_limit() {
        let tickers = ["AAA", "BBB", "CCC"]
            .into_iter()
            .map(|raw| Ticker::parse(raw).expect("ticker"))
            .collect();
        let universe = StaticUniverse::new(tickers);
        let criteria = ScreeningCriteria::new("France", MarketCapTier::Small, "Banks", Some(2))
            .expect("criteria");

        let result = universe.search(&criteria).await.expect("search");
        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn unknown_ticker_is_reported_and_recorded() {
        let source = StaticFundamentals::new();
        let ticker = Ticker::parse("NOPE").expect("ticker");

        let error = source
            .line_items(LineItemsRequest::new(ticker.clone(), date!(2026 - 01 - 01)))
            .await
            .expect_err("must fail");

        assert_eq!(error.kind(), SourceErrorKind::UnknownSymbol);
        assert_eq!(source.requests().len(), 1);
        assert_eq!(source.requests()[0].ticker, ticker);
    }

    #[tokio::test]
    async fn selects_first_period_after_start() {
        let ticker = Ticker::parse("AAA").expect("ticker");
        let source = StaticFundamentals::new()
            .with_period(
                &ticker,
                LineItemSet::new(Some(date!(2025 - 12 - 31))).with(LineItem::NetIncome, 2.0),
            )
            .with_period(
                &ticker,
                LineItemSet::new(Some(date!(2024 - 12 - 31))).with(LineItem::NetIncome, 1.0),
            );

        let current = source
            .line_items(LineItemsRequest::new(ticker.clone(), date!(2026 - 01 - 01)))
            .await
            .expect("known ticker");
        assert!(current.is_empty());

        let previous = source
            .line_items(LineItemsRequest::new(ticker, date!(2024 - 01 - 01)))
            .await
            .expect("known ticker");
        assert_eq!(previous.get(LineItem::NetIncome), Some(1.0));
    }
}
