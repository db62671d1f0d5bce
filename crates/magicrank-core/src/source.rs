use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Provider identifiers used in logs and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    /// Financial Modeling Prep REST API.
    Fmp,
    /// Local equity directory snapshot (CSV).
    EquityDirectory,
    /// In-memory fixtures used by tests and dry runs.
    Static,
}

impl ProviderId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fmp => "fmp",
            Self::EquityDirectory => "equity_directory",
            Self::Static => "static",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
