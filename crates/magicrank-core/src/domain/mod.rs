//! # Domain Models
//!
//! Screening inputs, fundamentals snapshots, and the derived ratios used for
//! ranking.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Ticker`] | Normalized exchange symbol |
//! | [`ScreeningCriteria`] | Country / market-cap / industry filters |
//! | [`MarketCapTier`] | Market capitalization bucket |
//! | [`ApiKey`] | Provider credential (redacted in `Debug`) |
//! | [`LineItem`] | The nine statement items required per ticker |
//! | [`LineItemSet`] | Possibly incomplete provider result for one period |
//! | [`FundamentalsSnapshot`] | Complete line items plus current price |
//! | [`DerivedMetrics`] | EBIT, equity value, earning yield, ROC |
//! | [`PeriodAnchors`] | Current/previous start-of-year dates |

mod criteria;
mod fundamentals;
mod period;
mod ticker;

pub use criteria::{ApiKey, MarketCapTier, ScreeningCriteria};
pub use fundamentals::{DerivedMetrics, FundamentalsSnapshot, LineItem, LineItemSet};
pub use period::{beginning_of_year, PeriodAnchors};
pub use ticker::{Ticker, SUFFIX_SEPARATOR};
