//! Sequential ranking pipeline.
//!
//! ```text
//! universe.search -> validator -> dedup -> fetch (current year, then previous)
//!                 -> derived metrics -> rank -> ResultTable
//! ```
//!
//! Per-ticker failures never abort a run; they are recorded in
//! [`RankingRun::skipped`]. Only an unavailable universe is fatal here.

use std::sync::Arc;

use time::Date;
use tracing::{debug, info, warn};

use crate::data_source::UniverseProvider;
use crate::ranking::{ordinal_first, rank_descending};
use crate::validator::{dedup_preserving_order, partition_supported};
use crate::{
    FetchFailure, FundamentalsFetcher, FundamentalsSnapshot, PeriodAnchors, PipelineError,
    RankedRow, RankingRun, ResultTable, ScreeningCriteria, SkippedTicker, Ticker,
};

/// Outcome of the per-ticker fetch state machine.
#[derive(Debug)]
enum Attempt {
    TryCurrentYear,
    TryPreviousYear,
    Accepted(FundamentalsSnapshot),
    Skipped(FetchFailure),
}

pub struct RankingEngine {
    universe: Arc<dyn UniverseProvider>,
    fetcher: FundamentalsFetcher,
    anchors: PeriodAnchors,
}

impl RankingEngine {
    /// Engine anchored on today's calendar year.
    pub fn new(universe: Arc<dyn UniverseProvider>, fetcher: FundamentalsFetcher) -> Self {
        Self {
            universe,
            fetcher,
            anchors: PeriodAnchors::for_today(),
        }
    }

    pub fn with_anchors(mut self, anchors: PeriodAnchors) -> Self {
        self.anchors = anchors;
        self
    }

    /// Pins the start-of-year anchors to the year containing `today`.
    pub fn for_date(self, today: Date) -> Self {
        self.with_anchors(PeriodAnchors::for_date(today))
    }

    /// Runs the whole pipeline for `criteria`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::UniverseUnavailable`] when the directory
    /// search fails. Writing results is left to the caller.
    pub async fn run(&self, criteria: &ScreeningCriteria) -> Result<RankingRun, PipelineError> {
        let universe = self.universe.search(criteria).await.map_err(|source| {
            PipelineError::UniverseUnavailable {
                provider: self.universe.id(),
                source,
            }
        })?;
        info!(
            provider = %self.universe.id(),
            country = criteria.country(),
            market_cap = criteria.market_cap_tier().label(),
            tickers = universe.len(),
            "universe loaded"
        );

        let (kept, dropped) = partition_supported(universe);
        for ticker in &dropped {
            debug!(%ticker, "dropping ticker with unsupported exchange suffix");
        }
        let tickers = dedup_preserving_order(kept);

        let mut accepted = Vec::with_capacity(tickers.len());
        let mut skipped = Vec::new();
        for ticker in tickers {
            match self.resolve(&ticker).await {
                Ok(snapshot) => accepted.push(snapshot),
                Err(failure) => {
                    warn!(%ticker, code = failure.code(), %failure, "skipping ticker");
                    skipped.push(SkippedTicker { ticker, failure });
                }
            }
        }

        let table = rank(&accepted);
        info!(
            ranked = table.len(),
            dropped = dropped.len(),
            skipped = skipped.len(),
            "ranking complete"
        );

        Ok(RankingRun {
            table,
            dropped,
            skipped,
        })
    }

    async fn resolve(&self, ticker: &Ticker) -> Result<FundamentalsSnapshot, FetchFailure> {
        let mut state = Attempt::TryCurrentYear;
        loop {
            state = match state {
                Attempt::TryCurrentYear => {
                    match self.fetcher.fetch(ticker, self.anchors.current).await {
                        Ok(snapshot) => Attempt::Accepted(snapshot),
                        Err(failure) => {
                            debug!(
                                %ticker,
                                start = %self.anchors.current,
                                %failure,
                                "current-year fetch failed, retrying previous year"
                            );
                            Attempt::TryPreviousYear
                        }
                    }
                }
                Attempt::TryPreviousYear => {
                    match self.fetcher.fetch(ticker, self.anchors.previous).await {
                        Ok(snapshot) => Attempt::Accepted(snapshot),
                        Err(failure) => Attempt::Skipped(failure),
                    }
                }
                Attempt::Accepted(snapshot) => {
                    let metrics = snapshot.metrics();
                    info!(
                        %ticker,
                        earning_yield = metrics.earning_yield,
                        roc = metrics.return_on_capital,
                        "ticker accepted"
                    );
                    return Ok(snapshot);
                }
                Attempt::Skipped(failure) => return Err(failure),
            };
        }
    }
}

impl std::fmt::Debug for RankingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankingEngine")
            .field("universe", &self.universe.id())
            .field("fetcher", &self.fetcher)
            .field("anchors", &self.anchors)
            .finish()
    }
}

/// Combines earning-yield and return-on-capital ranks into the final order.
pub fn rank(snapshots: &[FundamentalsSnapshot]) -> ResultTable {
    let metrics: Vec<_> = snapshots.iter().map(FundamentalsSnapshot::metrics).collect();
    let yields: Vec<f64> = metrics.iter().map(|m| m.earning_yield).collect();
    let returns: Vec<f64> = metrics.iter().map(|m| m.return_on_capital).collect();

    let yield_ranks = rank_descending(&yields);
    let roc_ranks = rank_descending(&returns);
    let combined: Vec<f64> = yield_ranks
        .iter()
        .zip(&roc_ranks)
        .map(|(a, b)| a + b)
        .collect();
    let ordinals = ordinal_first(&combined);

    let rows = snapshots
        .iter()
        .zip(metrics)
        .enumerate()
        .map(|(index, (snapshot, metrics))| RankedRow {
            ticker: snapshot.ticker.clone(),
            earning_yield: metrics.earning_yield,
            return_on_capital: metrics.return_on_capital,
            price: snapshot.price,
            market_value_of_equity: metrics.market_value_of_equity,
            ebit: metrics.ebit,
            working_capital: snapshot.working_capital,
            net_income: snapshot.net_income,
            combined_rank: combined[index],
            final_rank: ordinals[index],
            start_date: snapshot.start_date,
        })
        .collect();

    ResultTable::new(rows)
}
