//! Ticker filtering ahead of fundamentals retrieval.

use std::collections::HashSet;

use crate::Ticker;

/// Exchange suffixes this short are not served by the fundamentals provider.
const MAX_UNSUPPORTED_SUFFIX_LEN: usize = 2;

/// True unless the ticker carries a suffix of two characters or fewer
/// (`BRK.B`, `SAP.DE`).
pub fn is_supported(ticker: &Ticker) -> bool {
    match ticker.suffix() {
        Some(suffix) => suffix.chars().count() > MAX_UNSUPPORTED_SUFFIX_LEN,
        None => true,
    }
}

/// Order-preserving filter returning `(kept, dropped)`.
pub fn partition_supported(tickers: Vec<Ticker>) -> (Vec<Ticker>, Vec<Ticker>) {
    tickers.into_iter().partition(is_supported)
}

/// Order-preserving filter that drops unsupported exchange notations.
pub fn filter_valid(tickers: Vec<Ticker>) -> Vec<Ticker> {
    partition_supported(tickers).0
}

/// Removes repeated tickers, keeping the first occurrence.
pub fn dedup_preserving_order(tickers: Vec<Ticker>) -> Vec<Ticker> {
    let mut seen = HashSet::with_capacity(tickers.len());
    tickers
        .into_iter()
        .filter(|ticker| seen.insert(ticker.clone()))
        .collect()
}
