use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::data_source::{SourceError, SourceFuture, UniverseProvider};
use crate::{MarketCapTier, ProviderId, ScreeningCriteria, Ticker};

const REQUIRED_COLUMNS: [&str; 3] = ["symbol", "country", "market_cap"];

/// Equity directory snapshot stored as CSV.
///
/// The layout follows the public equities database dumps: one row per listing
/// with at least `symbol`, `country` and `market_cap` columns. Other columns
/// are ignored. Results keep file order.
#[derive(Debug, Clone)]
pub struct DirectoryFileUniverse {
    path: PathBuf,
}

impl DirectoryFileUniverse {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self, criteria: &ScreeningCriteria) -> Result<Vec<Ticker>, SourceError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|error| {
            SourceError::unavailable(format!(
                "cannot read equity directory '{}': {error}",
                self.path.display()
            ))
        })?;
        search_snapshot(bytes.as_slice(), criteria)
    }
}

impl UniverseProvider for DirectoryFileUniverse {
    fn id(&self) -> ProviderId {
        ProviderId::EquityDirectory
    }

    fn search<'a>(&'a self, criteria: &'a ScreeningCriteria) -> SourceFuture<'a, Vec<Ticker>> {
        Box::pin(async move { self.load(criteria).await })
    }
}

#[derive(Debug, Deserialize)]
struct DirectoryRow {
    symbol: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    market_cap: String,
}

fn search_snapshot(
    reader: impl std::io::Read,
    criteria: &ScreeningCriteria,
) -> Result<Vec<Ticker>, SourceError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|error| SourceError::unavailable(format!("unreadable directory header: {error}")))?
        .clone();
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|column| !headers.iter().any(|header| header == **column))
    {
        return Err(SourceError::unavailable(format!(
            "equity directory is missing the '{missing}' column"
        )));
    }

    let wanted_tier = criteria.market_cap_tier();
    let mut symbols = Vec::new();
    for record in csv_reader.deserialize::<DirectoryRow>() {
        let row = record.map_err(|error| {
            SourceError::unavailable(format!("malformed equity directory row: {error}"))
        })?;

        if !row.country.eq_ignore_ascii_case(criteria.country()) {
            continue;
        }
        if row.market_cap.parse::<MarketCapTier>().ok() != Some(wanted_tier) {
            continue;
        }

        symbols.push(row.symbol);
        if criteria
            .result_limit()
            .is_some_and(|limit| symbols.len() >= limit)
        {
            break;
        }
    }

    // The limit counts directory rows, so unparsable symbols still use a slot.
    let tickers = symbols
        .into_iter()
        .filter_map(|symbol| match Ticker::parse(&symbol) {
            Ok(ticker) => Some(ticker),
            Err(error) => {
                debug!(%symbol, %error, "skipping unparsable directory symbol");
                None
            }
        })
        .collect();
    Ok(tickers)
}
