use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use time::Date;

use crate::Ticker;

/// Statement line items required to evaluate a ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineItem {
    NetIncome,
    IncomeTaxExpense,
    InterestExpense,
    WeightedAverageShares,
    FixedAssets,
    TotalCurrentAssets,
    TotalCurrentLiabilities,
    WorkingCapital,
    TotalDebt,
}

impl LineItem {
    pub const ALL: [Self; 9] = [
        Self::NetIncome,
        Self::IncomeTaxExpense,
        Self::InterestExpense,
        Self::WeightedAverageShares,
        Self::FixedAssets,
        Self::TotalCurrentAssets,
        Self::TotalCurrentLiabilities,
        Self::WorkingCapital,
        Self::TotalDebt,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::NetIncome => "Net Income",
            Self::IncomeTaxExpense => "Income Tax Expense",
            Self::InterestExpense => "Interest Expense",
            Self::WeightedAverageShares => "Weighted Average Shares",
            Self::FixedAssets => "Fixed Assets",
            Self::TotalCurrentAssets => "Total Current Assets",
            Self::TotalCurrentLiabilities => "Total Current Liabilities",
            Self::WorkingCapital => "Working Capital",
            Self::TotalDebt => "Total Debt",
        }
    }
}

impl Display for LineItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Line items reported by a provider for one statement period.
///
/// Entries may be missing; [`FundamentalsSnapshot::from_line_items`] decides
/// whether the set is complete.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LineItemSet {
    pub period_end: Option<Date>,
    values: BTreeMap<LineItem, f64>,
}

impl LineItemSet {
    pub fn new(period_end: Option<Date>) -> Self {
        Self {
            period_end,
            values: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, item: LineItem, value: f64) {
        self.values.insert(item, value);
    }

    pub fn with(mut self, item: LineItem, value: f64) -> Self {
        self.insert(item, value);
        self
    }

    pub fn get(&self, item: LineItem) -> Option<f64> {
        self.values.get(&item).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// First required item that has no value, in [`LineItem::ALL`] order.
    pub fn first_missing(&self) -> Option<LineItem> {
        LineItem::ALL
            .into_iter()
            .find(|item| !self.values.contains_key(item))
    }
}

/// Point-in-time fundamentals for one ticker plus its current price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalsSnapshot {
    pub ticker: Ticker,
    pub start_date: Date,
    pub net_income: f64,
    pub income_tax_expense: f64,
    pub interest_expense: f64,
    pub weighted_average_shares: f64,
    pub fixed_assets: f64,
    pub total_current_assets: f64,
    pub total_current_liabilities: f64,
    pub working_capital: f64,
    pub total_debt: f64,
    pub price: f64,
}

impl FundamentalsSnapshot {
    /// Build a snapshot by key. Returns the first missing item when the set is
    /// incomplete.
    pub fn from_line_items(
        ticker: Ticker,
        start_date: Date,
        items: &LineItemSet,
        price: f64,
    ) -> Result<Self, LineItem> {
        let value = |item: LineItem| items.get(item).ok_or(item);

        Ok(Self {
            ticker,
            start_date,
            net_income: value(LineItem::NetIncome)?,
            income_tax_expense: value(LineItem::IncomeTaxExpense)?,
            interest_expense: value(LineItem::InterestExpense)?,
            weighted_average_shares: value(LineItem::WeightedAverageShares)?,
            fixed_assets: value(LineItem::FixedAssets)?,
            total_current_assets: value(LineItem::TotalCurrentAssets)?,
            total_current_liabilities: value(LineItem::TotalCurrentLiabilities)?,
            working_capital: value(LineItem::WorkingCapital)?,
            total_debt: value(LineItem::TotalDebt)?,
            price,
        })
    }

    pub fn metrics(&self) -> DerivedMetrics {
        DerivedMetrics::from_snapshot(self)
    }
}

/// Ratios derived from a snapshot. Denominators are not guarded; a zero
/// denominator yields a non-finite ratio that ranks last.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub ebit: f64,
    pub market_value_of_equity: f64,
    pub earning_yield: f64,
    pub return_on_capital: f64,
}

impl DerivedMetrics {
    pub fn from_snapshot(snapshot: &FundamentalsSnapshot) -> Self {
        let ebit =
            snapshot.net_income + snapshot.income_tax_expense + snapshot.interest_expense;
        let market_value_of_equity = snapshot.weighted_average_shares * snapshot.price;
        let earning_yield = ebit / (market_value_of_equity + snapshot.total_debt);
        let return_on_capital = ebit / (snapshot.working_capital + snapshot.fixed_assets);

        Self {
            ebit,
            market_value_of_equity,
            earning_yield,
            return_on_capital,
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    fn complete_items() -> LineItemSet {
        LineItemSet::new(Some(date!(2025 - 12 - 31)))
            .with(LineItem::NetIncome, 100.0)
            .with(LineItem::IncomeTaxExpense, 20.0)
            .with(LineItem::InterestExpense, 10.0)
            .with(LineItem::WeightedAverageShares, 50.0)
            .with(LineItem::FixedAssets, 200.0)
            .with(LineItem::TotalCurrentAssets, 500.0)
            .with(LineItem::TotalCurrentLiabilities, 200.0)
            .with(LineItem::WorkingCapital, 300.0)
            .with(LineItem::TotalDebt, 200.0)
    }

    #[test]
    fn derives_ebit_yield_and_return_on_capital() {
        let ticker = Ticker::parse("AAA").expect("ticker");
        let snapshot =
            FundamentalsSnapshot::from_line_items(ticker, date!(2026 - 01 - 01), &complete_items(), 10.0)
                .expect("complete snapshot");

        let metrics = snapshot.metrics();
        assert_eq!(metrics.ebit, 130.0);
        assert_eq!(metrics.market_value_of_equity, 500.0);
        assert!((metrics.earning_yield - 130.0 / 700.0).abs() < 1e-12);
        assert!((metrics.return_on_capital - 0.26).abs() < 1e-12);
    }

    #[test]
    fn zero_capital_yields_non_finite_roc() {
        let items = complete_items()
            .with(LineItem::WorkingCapital, -200.0)
            .with(LineItem::FixedAssets, 200.0);
        let ticker = Ticker::parse("ZERO").expect("ticker");
        let snapshot =
            FundamentalsSnapshot::from_line_items(ticker, date!(2026 - 01 - 01), &items, 10.0)
                .expect("complete snapshot");

        assert!(!snapshot.metrics().return_on_capital.is_finite());
    }

    #[test]
    fn any_missing_item_invalidates_snapshot() {
        let mut items = LineItemSet::new(None);
        for item in LineItem::ALL {
            if item != LineItem::TotalDebt {
                items.insert(item, 1.0);
            }
        }
        assert_eq!(items.first_missing(), Some(LineItem::TotalDebt));

        let ticker = Ticker::parse("AAA").expect("ticker");
        let missing =
            FundamentalsSnapshot::from_line_items(ticker, date!(2026 - 01 - 01), &items, 1.0)
                .expect_err("incomplete snapshot");
        assert_eq!(missing, LineItem::TotalDebt);
    }
}
