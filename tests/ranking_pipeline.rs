//! Behavior tests for the ranking engine: fallback, skipping, ordering.

use std::sync::Arc;

use magicrank_core::{
    FetchFailure, FundamentalsFetcher, LineItem, LineItemSet, MarketCapTier, RankingEngine,
    ScreeningCriteria, StaticFundamentals, StaticUniverse, Ticker,
};
use time::macros::date;
use time::Date;

const TODAY: Date = date!(2026 - 10 - 19);
const CURRENT_PERIOD: Date = date!(2026 - 06 - 30);
const PREVIOUS_PERIOD: Date = date!(2025 - 12 - 31);

fn ticker(raw: &str) -> Ticker {
    Ticker::parse(raw).expect("valid ticker")
}

fn criteria() -> ScreeningCriteria {
    ScreeningCriteria::new("United States", MarketCapTier::Large, "Banks", None)
        .expect("valid criteria")
}

/// Statement with EBIT = `ebit`, equity + debt = 700 and capital = 500.
fn statement(period_end: Date, ebit: f64) -> LineItemSet {
    LineItemSet::new(Some(period_end))
        .with(LineItem::NetIncome, ebit - 30.0)
        .with(LineItem::IncomeTaxExpense, 20.0)
        .with(LineItem::InterestExpense, 10.0)
        .with(LineItem::WeightedAverageShares, 50.0)
        .with(LineItem::FixedAssets, 200.0)
        .with(LineItem::TotalCurrentAssets, 500.0)
        .with(LineItem::TotalCurrentLiabilities, 200.0)
        .with(LineItem::WorkingCapital, 300.0)
        .with(LineItem::TotalDebt, 200.0)
}

fn engine(tickers: &[&str], source: StaticFundamentals) -> RankingEngine {
    let universe = StaticUniverse::new(tickers.iter().map(|raw| ticker(raw)).collect());
    RankingEngine::new(
        Arc::new(universe),
        FundamentalsFetcher::new(Arc::new(source)),
    )
    .for_date(TODAY)
}

fn symbols(tickers: Vec<&Ticker>) -> Vec<&str> {
    tickers.into_iter().map(Ticker::as_str).collect()
}

// =============================================================================
// Fallback state machine
// =============================================================================

#[tokio::test]
async fn when_current_year_fails_previous_year_yields_exactly_one_row() {
    // Given: LATE has only last year's statement
    let late = ticker("LATE");
    let source = StaticFundamentals::new()
        .with_period(&late, statement(PREVIOUS_PERIOD, 130.0))
        .with_price(&late, 10.0);

    // When: the pipeline runs
    let run = engine(&["LATE"], source).run(&criteria()).await.expect("run");

    // Then: one row exists, anchored on the previous year
    assert_eq!(run.table.len(), 1);
    let row = &run.table.rows()[0];
    assert_eq!(row.ticker.as_str(), "LATE");
    assert_eq!(row.start_date, date!(2025 - 01 - 01));
    assert!(run.skipped.is_empty());
}

#[tokio::test]
async fn when_current_year_succeeds_previous_year_is_not_requested() {
    let fresh = ticker("FRESH");
    let source = Arc::new(
        StaticFundamentals::new()
            .with_period(&fresh, statement(CURRENT_PERIOD, 130.0))
            .with_price(&fresh, 10.0),
    );
    let engine = RankingEngine::new(
        Arc::new(StaticUniverse::new(vec![fresh.clone()])),
        FundamentalsFetcher::new(source.clone()),
    )
    .for_date(TODAY);

    let run = engine.run(&criteria()).await.expect("run");

    assert_eq!(run.table.len(), 1);
    assert_eq!(run.table.rows()[0].start_date, date!(2026 - 01 - 01));
    assert_eq!(source.requests().len(), 1);
}

#[tokio::test]
async fn when_both_years_fail_ticker_is_skipped_and_run_continues() {
    // Given: GONE is unknown, GOOD is complete
    let good = ticker("GOOD");
    let source = StaticFundamentals::new()
        .with_period(&good, statement(CURRENT_PERIOD, 130.0))
        .with_price(&good, 10.0);

    // When: the pipeline runs
    let run = engine(&["GONE", "GOOD"], source)
        .run(&criteria())
        .await
        .expect("per-ticker failures are not fatal");

    // Then: only GOOD is ranked and GONE is reported with its last failure
    assert_eq!(symbols(run.table.tickers()), vec!["GOOD"]);
    assert_eq!(run.skipped.len(), 1);
    assert_eq!(run.skipped[0].ticker.as_str(), "GONE");
    assert!(matches!(
        run.skipped[0].failure,
        FetchFailure::InvalidTicker { .. }
    ));
}

#[tokio::test]
async fn when_price_is_missing_ticker_is_skipped() {
    let unpriced = ticker("NOPX");
    let source = StaticFundamentals::new().with_period(&unpriced, statement(CURRENT_PERIOD, 130.0));

    let run = engine(&["NOPX"], source).run(&criteria()).await.expect("run");

    assert!(run.table.is_empty());
    assert!(matches!(
        run.skipped[0].failure,
        FetchFailure::MissingPrice { .. }
    ));
}

#[tokio::test]
async fn when_line_item_is_missing_in_both_years_last_failure_is_reported() {
    let partial = ticker("PART");
    let mut current = LineItemSet::new(Some(CURRENT_PERIOD));
    current.insert(LineItem::NetIncome, 1.0);
    let source = StaticFundamentals::new()
        .with_period(&partial, current)
        .with_price(&partial, 10.0);

    let run = engine(&["PART"], source).run(&criteria()).await.expect("run");

    assert!(run.table.is_empty());
    assert_eq!(
        run.skipped[0].failure,
        FetchFailure::MissingLineItem {
            item: LineItem::IncomeTaxExpense
        }
    );
}

// =============================================================================
// Ranking
// =============================================================================

#[tokio::test]
async fn better_yield_and_return_rank_ahead() {
    // Given: three tickers whose ratios both scale with EBIT
    let (low, mid, high) = (ticker("LOW"), ticker("MID"), ticker("HIGH"));
    let source = StaticFundamentals::new()
        .with_period(&low, statement(CURRENT_PERIOD, 70.0))
        .with_price(&low, 10.0)
        .with_period(&mid, statement(CURRENT_PERIOD, 130.0))
        .with_price(&mid, 10.0)
        .with_period(&high, statement(CURRENT_PERIOD, 210.0))
        .with_price(&high, 10.0);

    // When: the pipeline runs in an unrelated order
    let run = engine(&["MID", "LOW", "HIGH"], source)
        .run(&criteria())
        .await
        .expect("run");

    // Then: the table reads best first with dense final ranks
    assert_eq!(symbols(run.table.tickers()), vec!["HIGH", "MID", "LOW"]);
    let finals: Vec<usize> = run.table.rows().iter().map(|row| row.final_rank).collect();
    assert_eq!(finals, vec![1, 2, 3]);
    let combined: Vec<f64> = run.table.rows().iter().map(|row| row.combined_rank).collect();
    assert_eq!(combined, vec![2.0, 4.0, 6.0]);
}

#[tokio::test]
async fn non_finite_return_on_capital_ranks_last() {
    // Given: ZERO has no capital employed, so its return is not finite
    let (zero, plain) = (ticker("ZERO"), ticker("PLAIN"));
    let no_capital = statement(CURRENT_PERIOD, 500.0)
        .with(LineItem::WorkingCapital, -200.0)
        .with(LineItem::FixedAssets, 200.0);
    let source = StaticFundamentals::new()
        .with_period(&zero, no_capital)
        .with_price(&zero, 10.0)
        .with_period(&plain, statement(CURRENT_PERIOD, 130.0))
        .with_price(&plain, 10.0);

    // When: the pipeline runs
    let run = engine(&["ZERO", "PLAIN"], source)
        .run(&criteria())
        .await
        .expect("run");

    // Then: the better yield only offsets the worst return rank, and the tie
    //       goes to the first ticker processed
    let zero_row = run.table.get(&zero).expect("ZERO is ranked");
    assert!(!zero_row.return_on_capital.is_finite());
    assert_eq!(zero_row.combined_rank, 3.0);
    assert_eq!(run.table.get(&plain).expect("PLAIN is ranked").combined_rank, 3.0);
    assert_eq!(symbols(run.table.tickers()), vec!["ZERO", "PLAIN"]);
}

#[tokio::test]
async fn identical_inputs_produce_identical_tables() {
    let build = || {
        let (a, b, c) = (ticker("AAA"), ticker("BBB"), ticker("CCC"));
        StaticFundamentals::new()
            .with_period(&a, statement(CURRENT_PERIOD, 130.0))
            .with_price(&a, 10.0)
            .with_period(&b, statement(PREVIOUS_PERIOD, 130.0))
            .with_price(&b, 10.0)
            .with_period(&c, statement(CURRENT_PERIOD, 90.0))
            .with_price(&c, 12.0)
    };

    let first = engine(&["AAA", "BBB", "CCC"], build())
        .run(&criteria())
        .await
        .expect("first run");
    let second = engine(&["AAA", "BBB", "CCC"], build())
        .run(&criteria())
        .await
        .expect("second run");

    assert_eq!(first.table, second.table);
    assert_eq!(symbols(first.table.tickers()), vec!["AAA", "BBB", "CCC"]);
}

#[tokio::test]
async fn row_count_is_validated_minus_skipped() {
    let (a, b) = (ticker("AAA"), ticker("BBB"));
    let source = StaticFundamentals::new()
        .with_period(&a, statement(CURRENT_PERIOD, 130.0))
        .with_price(&a, 10.0)
        .with_period(&b, statement(CURRENT_PERIOD, 90.0))
        .with_price(&b, 10.0);

    let run = engine(&["AAA", "BRK.B", "BBB", "MISSING", "AAA", "SAP.DE"], source)
        .run(&criteria())
        .await
        .expect("run");

    let validated_unique = 3;
    assert_eq!(run.dropped.len(), 2);
    assert_eq!(run.skipped.len(), 1);
    assert_eq!(run.table.len(), validated_unique - run.skipped.len());
}
