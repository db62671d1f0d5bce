use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use time::macros::format_description;
use time::Date;
use tracing::{debug, warn};

use crate::data_source::{
    Endpoint, FundamentalsSource, LineItemsRequest, Quote, QuoteBatch, QuoteRequest, SourceError,
    SourceFuture, UniverseProvider,
};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::provider_policy::ProviderPolicy;
use crate::throttling::RequestPacer;
use crate::{ApiKey, LineItem, LineItemSet, ProviderId, ScreeningCriteria, Ticker};

const DEFAULT_BASE_URL: &str = "https://financialmodelingprep.com/api/v3";
const STATEMENT_LIMIT: &str = "5";
const SCREENER_LIMIT: usize = 10_000;

/// Country names as they appear in equity directories, keyed to the ISO
/// 3166-1 alpha-2 codes the screener filters on.
const COUNTRY_CODES: &[(&str, &str)] = &[
    ("argentina", "AR"),
    ("australia", "AU"),
    ("austria", "AT"),
    ("belgium", "BE"),
    ("bermuda", "BM"),
    ("brazil", "BR"),
    ("canada", "CA"),
    ("cayman islands", "KY"),
    ("chile", "CL"),
    ("china", "CN"),
    ("denmark", "DK"),
    ("finland", "FI"),
    ("france", "FR"),
    ("germany", "DE"),
    ("greece", "GR"),
    ("hong kong", "HK"),
    ("india", "IN"),
    ("indonesia", "ID"),
    ("ireland", "IE"),
    ("israel", "IL"),
    ("italy", "IT"),
    ("japan", "JP"),
    ("luxembourg", "LU"),
    ("malaysia", "MY"),
    ("mexico", "MX"),
    ("netherlands", "NL"),
    ("new zealand", "NZ"),
    ("norway", "NO"),
    ("poland", "PL"),
    ("portugal", "PT"),
    ("singapore", "SG"),
    ("south africa", "ZA"),
    ("south korea", "KR"),
    ("spain", "ES"),
    ("sweden", "SE"),
    ("switzerland", "CH"),
    ("taiwan", "TW"),
    ("thailand", "TH"),
    ("turkey", "TR"),
    ("united kingdom", "GB"),
    ("united states", "US"),
];

/// Financial Modeling Prep adapter: stock screener, annual statements, quotes.
#[derive(Clone)]
pub struct FmpAdapter {
    http_client: Arc<dyn HttpClient>,
    api_key: ApiKey,
    base_url: String,
    policy: ProviderPolicy,
    pacer: RequestPacer,
}

impl FmpAdapter {
    pub fn new(api_key: ApiKey) -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()), api_key)
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>, api_key: ApiKey) -> Self {
        let policy = ProviderPolicy::fmp_default();
        Self {
            http_client,
            api_key,
            base_url: String::from(DEFAULT_BASE_URL),
            pacer: RequestPacer::from_policy(&policy),
            policy,
        }
    }

    pub fn with_policy(mut self, policy: ProviderPolicy) -> Self {
        self.pacer = RequestPacer::from_policy(&policy);
        self.policy = policy;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    fn request(&self, path: &str) -> HttpRequest {
        HttpRequest::get(format!("{}/{path}", self.base_url))
            .with_query("apikey", self.api_key.expose())
            .with_timeout_ms(self.policy.request_timeout_ms())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        request: HttpRequest,
    ) -> Result<T, SourceError> {
        self.pacer.acquire().await;
        debug!(%endpoint, url = %request.redacted_url(), "fmp request");

        let response = self.http_client.execute(request).await.map_err(|error| {
            if error.retryable() {
                SourceError::unavailable(format!("fmp transport error: {}", error.message()))
            } else {
                SourceError::internal(format!("fmp transport error: {}", error.message()))
            }
        })?;

        match response.status {
            429 => {
                return Err(SourceError::rate_limited(format!(
                    "fmp {endpoint} quota exhausted"
                )))
            }
            401 | 403 => {
                return Err(SourceError::invalid_request(format!(
                    "fmp rejected credentials for {endpoint} (status {})",
                    response.status
                )))
            }
            _ if !response.is_success() => {
                return Err(SourceError::unavailable(format!(
                    "fmp {endpoint} returned status {}",
                    response.status
                )))
            }
            _ => {}
        }

        let value: serde_json::Value = serde_json::from_str(&response.body).map_err(|e| {
            SourceError::internal(format!("failed to parse fmp {endpoint} response: {e}"))
        })?;

        if let Some(message) = value.get("Error Message").and_then(serde_json::Value::as_str) {
            return Err(SourceError::invalid_request(format!(
                "fmp {endpoint} error: {message}"
            )));
        }

        serde_json::from_value(value).map_err(|e| {
            SourceError::internal(format!("unexpected fmp {endpoint} payload: {e}"))
        })
    }

    async fn fetch_line_items(&self, req: &LineItemsRequest) -> Result<LineItemSet, SourceError> {
        let income: Vec<IncomeStatement> = self
            .get_json(
                Endpoint::LineItems,
                self.request(&format!("income-statement/{}", req.ticker))
                    .with_query("period", "annual")
                    .with_query("limit", STATEMENT_LIMIT),
            )
            .await?;
        let balance: Vec<BalanceSheet> = self
            .get_json(
                Endpoint::LineItems,
                self.request(&format!("balance-sheet-statement/{}", req.ticker))
                    .with_query("period", "annual")
                    .with_query("limit", STATEMENT_LIMIT),
            )
            .await?;

        if income.is_empty() && balance.is_empty() {
            return Err(SourceError::unknown_symbol(&req.ticker));
        }

        Ok(match first_shared_period(income, balance, req.start_date) {
            Some((period_end, income, balance)) => merge_statements(period_end, income, balance),
            None => LineItemSet::new(None),
        })
    }

    async fn fetch_quotes(&self, req: &QuoteRequest) -> Result<QuoteBatch, SourceError> {
        let joined = req
            .tickers
            .iter()
            .map(Ticker::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let rows: Vec<QuoteRow> = self
            .get_json(Endpoint::Quote, self.request(&format!("quote/{joined}")))
            .await?;

        let quotes = rows
            .into_iter()
            .filter_map(|row| {
                let ticker = Ticker::parse(&row.symbol).ok()?;
                let price = row.price.filter(|price| price.is_finite())?;
                Some(Quote { ticker, price })
            })
            .collect();

        Ok(QuoteBatch { quotes })
    }

    async fn screen(&self, criteria: &ScreeningCriteria) -> Result<Vec<Ticker>, SourceError> {
        let (lower, upper) = criteria.market_cap_tier().bounds();
        let limit = criteria.result_limit().unwrap_or(SCREENER_LIMIT);

        let country = screener_country(criteria.country());
        if country.is_none() {
            warn!(
                country = criteria.country(),
                "unknown country name, passing it to the fmp screener unchanged"
            );
        }

        let mut request = self
            .request("stock-screener")
            .with_query(
                "country",
                country.unwrap_or_else(|| criteria.country().to_owned()),
            )
            .with_query("marketCapMoreThan", lower.to_string())
            .with_query("isActivelyTrading", "true")
            .with_query("isEtf", "false")
            .with_query("isFund", "false")
            .with_query("limit", limit.to_string());
        if let Some(upper) = upper {
            request = request.with_query("marketCapLowerThan", upper.to_string());
        }

        let rows: Vec<ScreenerRow> = self.get_json(Endpoint::Universe, request).await?;
        let tickers = criteria
            .apply_limit(rows)
            .into_iter()
            .filter_map(|row| match Ticker::parse(&row.symbol) {
                Ok(ticker) => Some(ticker),
                Err(error) => {
                    debug!(symbol = %row.symbol, %error, "skipping unparsable screener symbol");
                    None
                }
            })
            .collect();

        Ok(tickers)
    }
}

impl UniverseProvider for FmpAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Fmp
    }

    fn search<'a>(&'a self, criteria: &'a ScreeningCriteria) -> SourceFuture<'a, Vec<Ticker>> {
        Box::pin(async move { self.screen(criteria).await })
    }
}

impl FundamentalsSource for FmpAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Fmp
    }

    fn line_items<'a>(&'a self, req: LineItemsRequest) -> SourceFuture<'a, LineItemSet> {
        Box::pin(async move { self.fetch_line_items(&req).await })
    }

    fn quote<'a>(&'a self, req: QuoteRequest) -> SourceFuture<'a, QuoteBatch> {
        Box::pin(async move {
            if req.tickers.is_empty() {
                return Err(SourceError::invalid_request(
                    "fmp quote request requires at least one ticker",
                ));
            }
            self.fetch_quotes(&req).await
        })
    }
}

// FMP response structures. Numeric fields are nullable in practice.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomeStatement {
    date: String,
    #[serde(default)]
    net_income: Option<f64>,
    #[serde(default)]
    income_tax_expense: Option<f64>,
    #[serde(default)]
    interest_expense: Option<f64>,
    #[serde(default)]
    weighted_average_shs_out: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceSheet {
    date: String,
    #[serde(default)]
    property_plant_equipment_net: Option<f64>,
    #[serde(default)]
    total_current_assets: Option<f64>,
    #[serde(default)]
    total_current_liabilities: Option<f64>,
    #[serde(default)]
    total_debt: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct QuoteRow {
    symbol: String,
    #[serde(default)]
    price: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct ScreenerRow {
    symbol: String,
}

/// ISO code for `country`: two-letter codes pass through upper-cased, known
/// names are looked up case-insensitively.
fn screener_country(country: &str) -> Option<String> {
    let country = country.trim();
    if country.len() == 2 && country.bytes().all(|byte| byte.is_ascii_alphabetic()) {
        return Some(country.to_ascii_uppercase());
    }
    COUNTRY_CODES
        .iter()
        .find(|(name, _)| country.eq_ignore_ascii_case(name))
        .map(|(_, code)| (*code).to_owned())
}

fn parse_period_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).ok()
}

fn dated<T>(rows: Vec<T>, date_of: impl Fn(&T) -> &String) -> Vec<(Date, T)> {
    rows.into_iter()
        .filter_map(|row| parse_period_date(date_of(&row)).map(|date| (date, row)))
        .collect()
}

/// Earliest fiscal period on or after `start_date` reported by both statements.
fn first_shared_period(
    income: Vec<IncomeStatement>,
    balance: Vec<BalanceSheet>,
    start_date: Date,
) -> Option<(Date, IncomeStatement, BalanceSheet)> {
    let mut balance = dated(balance, |row| &row.date);
    let (period_end, income) = dated(income, |row| &row.date)
        .into_iter()
        .filter(|(date, _)| *date >= start_date)
        .filter(|(date, _)| balance.iter().any(|(balance_date, _)| balance_date == date))
        .min_by_key(|(date, _)| *date)?;
    let position = balance
        .iter()
        .position(|(balance_date, _)| *balance_date == period_end)?;
    let (_, balance) = balance.swap_remove(position);
    Some((period_end, income, balance))
}

fn merge_statements(
    period_end: Date,
    income: IncomeStatement,
    balance: BalanceSheet,
) -> LineItemSet {
    let mut items = LineItemSet::new(Some(period_end));

    let mut put = |item: LineItem, value: Option<f64>| {
        if let Some(value) = value.filter(|value| value.is_finite()) {
            items.insert(item, value);
        }
    };

    put(LineItem::NetIncome, income.net_income);
    put(LineItem::IncomeTaxExpense, income.income_tax_expense);
    put(LineItem::InterestExpense, income.interest_expense);
    put(LineItem::WeightedAverageShares, income.weighted_average_shs_out);

    put(LineItem::FixedAssets, balance.property_plant_equipment_net);
    put(LineItem::TotalCurrentAssets, balance.total_current_assets);
    put(LineItem::TotalCurrentLiabilities, balance.total_current_liabilities);
    put(LineItem::TotalDebt, balance.total_debt);
    let working_capital = balance
        .total_current_assets
        .zip(balance.total_current_liabilities)
        .map(|(assets, liabilities)| assets - liabilities);
    put(LineItem::WorkingCapital, working_capital);

    items
}
