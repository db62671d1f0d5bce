use std::fmt::{Display, Formatter};
use std::num::NonZeroUsize;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Market capitalization bucket used by equity directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketCapTier {
    Mega,
    Large,
    Mid,
    Small,
    Micro,
    Nano,
}

impl MarketCapTier {
    pub const ALL: [Self; 6] = [
        Self::Mega,
        Self::Large,
        Self::Mid,
        Self::Small,
        Self::Micro,
        Self::Nano,
    ];

    /// Label used by equity directory snapshots (`"Large Cap"`).
    pub const fn label(self) -> &'static str {
        match self {
            Self::Mega => "Mega Cap",
            Self::Large => "Large Cap",
            Self::Mid => "Mid Cap",
            Self::Small => "Small Cap",
            Self::Micro => "Micro Cap",
            Self::Nano => "Nano Cap",
        }
    }

    /// Inclusive lower and exclusive upper market-cap bounds in USD.
    pub const fn bounds(self) -> (u64, Option<u64>) {
        const MILLION: u64 = 1_000_000;
        const BILLION: u64 = 1_000 * MILLION;
        match self {
            Self::Mega => (200 * BILLION, None),
            Self::Large => (10 * BILLION, Some(200 * BILLION)),
            Self::Mid => (2 * BILLION, Some(10 * BILLION)),
            Self::Small => (300 * MILLION, Some(2 * BILLION)),
            Self::Micro => (50 * MILLION, Some(300 * MILLION)),
            Self::Nano => (0, Some(50 * MILLION)),
        }
    }
}

impl Display for MarketCapTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MarketCapTier {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value
            .trim()
            .to_ascii_lowercase()
            .replace(['-', '_'], " ");
        let head = normalized
            .strip_suffix(" cap")
            .unwrap_or(&normalized)
            .trim();

        match head {
            "mega" => Ok(Self::Mega),
            "large" => Ok(Self::Large),
            "mid" => Ok(Self::Mid),
            "small" => Ok(Self::Small),
            "micro" => Ok(Self::Micro),
            "nano" => Ok(Self::Nano),
            _ => Err(ValidationError::InvalidMarketCap {
                value: value.to_owned(),
            }),
        }
    }
}

/// Filters applied to the equity universe query.
///
/// `industry` is carried for reporting but no universe provider filters on it
/// yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningCriteria {
    result_limit: Option<NonZeroUsize>,
    country: String,
    market_cap_tier: MarketCapTier,
    industry: String,
}

impl ScreeningCriteria {
    pub fn new(
        country: impl Into<String>,
        market_cap_tier: MarketCapTier,
        industry: impl Into<String>,
        result_limit: Option<usize>,
    ) -> Result<Self, ValidationError> {
        let country = country.into().trim().to_owned();
        if country.is_empty() {
            return Err(ValidationError::EmptyCountry);
        }

        let industry = industry.into().trim().to_owned();
        if industry.is_empty() {
            return Err(ValidationError::EmptyIndustry);
        }

        let result_limit = match result_limit {
            Some(limit) => Some(NonZeroUsize::new(limit).ok_or(ValidationError::ZeroResultLimit)?),
            None => None,
        };

        Ok(Self {
            result_limit,
            country,
            market_cap_tier,
            industry,
        })
    }

    pub fn result_limit(&self) -> Option<usize> {
        self.result_limit.map(NonZeroUsize::get)
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub const fn market_cap_tier(&self) -> MarketCapTier {
        self.market_cap_tier
    }

    pub fn industry(&self) -> &str {
        &self.industry
    }

    /// Truncate a provider-ordered result set to `result_limit`.
    pub fn apply_limit<T>(&self, mut items: Vec<T>) -> Vec<T> {
        if let Some(limit) = self.result_limit() {
            items.truncate(limit);
        }
        items
    }
}

/// Provider credential. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into().trim().to_owned();
        if value.is_empty() {
            return Err(ValidationError::EmptyApiKey);
        }
        Ok(Self(value))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tier_labels_loosely() {
        assert_eq!("Large Cap".parse::<MarketCapTier>(), Ok(MarketCapTier::Large));
        assert_eq!("mega".parse::<MarketCapTier>(), Ok(MarketCapTier::Mega));
        assert_eq!("small-cap".parse::<MarketCapTier>(), Ok(MarketCapTier::Small));
        assert_eq!(" MID_CAP ".parse::<MarketCapTier>(), Ok(MarketCapTier::Mid));
        assert!(matches!(
            "huge".parse::<MarketCapTier>(),
            Err(ValidationError::InvalidMarketCap { .. })
        ));
    }

    #[test]
    fn tier_bounds_are_contiguous() {
        for pair in MarketCapTier::ALL.windows(2) {
            let (lower_of_bigger, _) = pair[0].bounds();
            let (_, upper_of_smaller) = pair[1].bounds();
            assert_eq!(upper_of_smaller, Some(lower_of_bigger));
        }
    }

    #[test]
    fn rejects_zero_limit_and_blank_fields() {
        assert_eq!(
            ScreeningCriteria::new("United States", MarketCapTier::Large, "Banks", Some(0)),
            Err(ValidationError::ZeroResultLimit)
        );
        assert_eq!(
            ScreeningCriteria::new("  ", MarketCapTier::Large, "Banks", None),
            Err(ValidationError::EmptyCountry)
        );
        assert_eq!(
            ScreeningCriteria::new("France", MarketCapTier::Large, "", None),
            Err(ValidationError::EmptyIndustry)
        );
    }

    #[test]
    fn apply_limit_keeps_leading_entries() {
        let criteria = ScreeningCriteria::new("France", MarketCapTier::Mid, "Banks", Some(2))
            .expect("valid criteria");
        assert_eq!(criteria.apply_limit(vec![1, 2, 3]), vec![1, 2]);

        let unlimited = ScreeningCriteria::new("France", MarketCapTier::Mid, "Banks", None)
            .expect("valid criteria");
        assert_eq!(unlimited.apply_limit(vec![1, 2, 3]), vec![1, 2, 3]);
    }

    #[test]
    fn api_key_debug_is_redacted() {
        let key = ApiKey::new("secret-value").expect("valid key");
        assert_eq!(format!("{key:?}"), "ApiKey(***)");
        assert_eq!(key.expose(), "secret-value");
    }
}
