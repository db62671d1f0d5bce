//! Ranked output of a pipeline run.

use serde::Serialize;
use time::Date;

use crate::{FetchFailure, Ticker};

/// One accepted ticker with every computed field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRow {
    pub ticker: Ticker,
    pub earning_yield: f64,
    pub return_on_capital: f64,
    pub price: f64,
    pub market_value_of_equity: f64,
    pub ebit: f64,
    pub working_capital: f64,
    pub net_income: f64,
    /// Sum of the earning-yield and return-on-capital ranks. Lower is better.
    pub combined_rank: f64,
    /// 1-based position in the final ordering.
    pub final_rank: usize,
    /// Start date of the fetch attempt that succeeded.
    pub start_date: Date,
}

/// Public projection persisted by result writers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayRow<'a> {
    pub ticker: &'a Ticker,
    pub earning_yield: f64,
    pub roc: f64,
    pub price: f64,
}

/// Rows sorted by [`RankedRow::final_rank`], best first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultTable {
    rows: Vec<RankedRow>,
}

impl ResultTable {
    /// Builds a table, sorting rows by final rank.
    pub fn new(mut rows: Vec<RankedRow>) -> Self {
        rows.sort_by_key(|row| row.final_rank);
        Self { rows }
    }

    pub fn rows(&self) -> &[RankedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, ticker: &Ticker) -> Option<&RankedRow> {
        self.rows.iter().find(|row| &row.ticker == ticker)
    }

    pub fn tickers(&self) -> Vec<&Ticker> {
        self.rows.iter().map(|row| &row.ticker).collect()
    }

    pub fn display_rows(&self) -> impl Iterator<Item = DisplayRow<'_>> {
        self.rows.iter().map(|row| DisplayRow {
            ticker: &row.ticker,
            earning_yield: row.earning_yield,
            roc: row.return_on_capital,
            price: row.price,
        })
    }
}

/// A ticker that failed both fetch attempts.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedTicker {
    pub ticker: Ticker,
    /// Failure from the last attempt.
    pub failure: FetchFailure,
}

/// Everything a run produced: the table plus the tickers that never made it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankingRun {
    pub table: ResultTable,
    /// Tickers removed by the validator before any fetch.
    pub dropped: Vec<Ticker>,
    pub skipped: Vec<SkippedTicker>,
}
