use magicrank_core::PipelineError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::telemetry::TelemetryError;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::Telemetry(_) => 2,
            Self::Pipeline(PipelineError::UniverseUnavailable { .. }) => 3,
            Self::Pipeline(PipelineError::Write(_)) => 4,
            Self::Io(_) => 10,
        }
    }
}
