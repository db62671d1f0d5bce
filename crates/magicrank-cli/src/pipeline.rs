//! Wire adapters from a [`RunConfig`], run the engine, write the table.

use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::Arc;

use magicrank_core::{
    DirectoryFileUniverse, FmpAdapter, FundamentalsFetcher, FundamentalsSource, PipelineError,
    RankingEngine, UniverseProvider,
};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::config::{RunConfig, UniverseSource};
use crate::error::CliError;

/// What one run wrote and left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub rows: usize,
    pub skipped: usize,
    pub dropped: usize,
    pub output_file: PathBuf,
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "wrote {} rows to {} ({} skipped, {} dropped by validator, run {})",
            self.rows,
            self.output_file.display(),
            self.skipped,
            self.dropped,
            self.run_id
        )
    }
}

pub async fn execute(config: &RunConfig) -> Result<RunSummary, CliError> {
    let fmp = Arc::new(FmpAdapter::new(config.api_key.clone()).with_policy(config.policy.clone()));
    let universe: Arc<dyn UniverseProvider> = match &config.universe {
        UniverseSource::Screener => fmp.clone(),
        UniverseSource::DirectoryFile(path) => Arc::new(DirectoryFileUniverse::new(path.clone())),
    };
    execute_with(config, universe, fmp).await
}

pub async fn execute_with(
    config: &RunConfig,
    universe: Arc<dyn UniverseProvider>,
    fundamentals: Arc<dyn FundamentalsSource>,
) -> Result<RunSummary, CliError> {
    let run_id = Uuid::new_v4();
    let span = info_span!("run", %run_id);

    async move {
        info!(
            country = config.criteria.country(),
            industry = config.criteria.industry(),
            market_cap = config.criteria.market_cap_tier().label(),
            head = ?config.criteria.result_limit(),
            universe = %universe.id(),
            "starting ranking run"
        );

        let engine = RankingEngine::new(universe, FundamentalsFetcher::new(fundamentals));
        let run = engine.run(&config.criteria).await?;

        config
            .format
            .writer()
            .write(&run.table, &config.output_file)
            .map_err(PipelineError::from)?;
        info!(
            rows = run.table.len(),
            path = %config.output_file.display(),
            format = %config.format,
            "results written"
        );

        Ok::<_, CliError>(RunSummary {
            run_id,
            rows: run.table.len(),
            skipped: run.skipped.len(),
            dropped: run.dropped.len(),
            output_file: config.output_file.clone(),
        })
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use magicrank_core::{
        ApiKey, LineItem, LineItemSet, MarketCapTier, OutputFormat, ProviderPolicy,
        ScreeningCriteria, StaticFundamentals, StaticUniverse, Ticker,
    };
    use time::{Month, OffsetDateTime};

    use super::*;

    fn config(output_file: PathBuf) -> RunConfig {
        RunConfig {
            api_key: ApiKey::new("test-key").expect("api key"),
            criteria: ScreeningCriteria::new("United States", MarketCapTier::Large, "Banks", None)
                .expect("criteria"),
            output_file,
            format: OutputFormat::Csv,
            universe: UniverseSource::Screener,
            policy: ProviderPolicy::fmp_default().with_request_timeout(Duration::from_millis(100)),
        }
    }

    fn current_period() -> LineItemSet {
        let year = OffsetDateTime::now_utc().year();
        let period_end =
            time::Date::from_calendar_date(year, Month::December, 31).expect("valid date");
        LineItem::ALL
            .into_iter()
            .fold(LineItemSet::new(Some(period_end)), |items, item| {
                items.with(item, 100.0)
            })
    }

    #[tokio::test]
    async fn run_writes_table_and_reports_summary() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("ranking.csv");
        let aaa = Ticker::parse("AAA").expect("ticker");
        let missing = Ticker::parse("ZZZ").expect("ticker");
        let dropped = Ticker::parse("BBB.X").expect("ticker");

        let universe = Arc::new(StaticUniverse::new(vec![
            aaa.clone(),
            dropped,
            missing,
        ]));
        let fundamentals = Arc::new(
            StaticFundamentals::new()
                .with_period(&aaa, current_period())
                .with_price(&aaa, 10.0),
        );

        let summary = execute_with(&config(output.clone()), universe, fundamentals)
            .await
            .expect("run succeeds");

        assert_eq!(summary.rows, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.dropped, 1);
        let content = std::fs::read_to_string(&output).expect("output written");
        assert!(content.starts_with("Ticker,EarningYield,ROC,Price\nAAA,"));
        assert!(summary.to_string().starts_with("wrote 1 rows to "));
    }

    #[tokio::test]
    async fn unwritable_output_maps_to_write_exit_code() {
        let universe = Arc::new(StaticUniverse::new(Vec::new()));
        let fundamentals = Arc::new(StaticFundamentals::new());

        let error = execute_with(
            &config(PathBuf::from("/nonexistent/dir/ranking.csv")),
            universe,
            fundamentals,
        )
        .await
        .expect_err("write must fail");

        assert_eq!(error.exit_code(), 4);
    }

    #[tokio::test]
    async fn unavailable_universe_maps_to_universe_exit_code() {
        let dir = tempfile::tempdir().expect("tempdir");
        let universe = Arc::new(StaticUniverse::unavailable("directory offline"));
        let fundamentals = Arc::new(StaticFundamentals::new());

        let error = execute_with(&config(dir.path().join("out.csv")), universe, fundamentals)
            .await
            .expect_err("universe must fail");

        assert_eq!(error.exit_code(), 3);
        assert!(!dir.path().join("out.csv").exists());
    }
}
