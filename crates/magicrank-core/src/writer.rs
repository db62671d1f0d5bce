//! Persist a [`ResultTable`] to disk.
//!
//! | Writer | Format | Non-finite values |
//! |--------|--------|-------------------|
//! | [`XlsxResultWriter`] | Sheet `Ranking`, columns `Ticker,EarningYield,ROC,Price` | empty cell |
//! | [`CsvResultWriter`] | `Ticker,EarningYield,ROC,Price` | `NaN`, `inf`, `-inf` |
//! | [`JsonResultWriter`] | `[{ticker, earning_yield, roc, price}]` | `null` |
//!
//! Every writer creates or truncates the target file.

use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde::Serialize;
use thiserror::Error;

use crate::{ResultTable, ValidationError};

pub const RESULT_HEADER: [&str; 4] = ["Ticker", "EarningYield", "ROC", "Price"];

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("cannot write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("xlsx encoding failed: {0}")]
    Xlsx(#[from] XlsxError),
}

impl WriteError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Destination format for the ranked table.
pub trait ResultWriter: Send + Sync {
    fn format(&self) -> OutputFormat;

    /// Writes `table` to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError`] when the file cannot be created or encoded.
    fn write(&self, table: &ResultTable, path: &Path) -> Result<(), WriteError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
    Xlsx,
}

impl OutputFormat {
    pub const ALL: [Self; 3] = [Self::Csv, Self::Json, Self::Xlsx];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Xlsx => "xlsx",
        }
    }

    /// Format implied by the file extension of `path`, if it names one.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        Self::ALL
            .into_iter()
            .find(|format| extension.eq_ignore_ascii_case(format.as_str()))
    }

    pub fn writer(self) -> Box<dyn ResultWriter> {
        match self {
            Self::Csv => Box::new(CsvResultWriter),
            Self::Json => Box::new(JsonResultWriter),
            Self::Xlsx => Box::new(XlsxResultWriter),
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|format| trimmed.eq_ignore_ascii_case(format.as_str()))
            .ok_or_else(|| ValidationError::InvalidOutputFormat {
                value: value.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvResultWriter;

impl ResultWriter for CsvResultWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Csv
    }

    fn write(&self, table: &ResultTable, path: &Path) -> Result<(), WriteError> {
        let file = File::create(path).map_err(|error| WriteError::io(path, error))?;
        let mut writer = csv::Writer::from_writer(BufWriter::new(file));

        writer.write_record(RESULT_HEADER)?;
        for row in table.display_rows() {
            writer.write_record([
                row.ticker.as_str().to_string(),
                row.earning_yield.to_string(),
                row.roc.to_string(),
                row.price.to_string(),
            ])?;
        }
        writer.flush().map_err(|error| WriteError::io(path, error))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonResultWriter;

#[derive(Serialize)]
struct JsonRow<'a> {
    ticker: &'a str,
    earning_yield: Option<f64>,
    roc: Option<f64>,
    price: Option<f64>,
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

impl ResultWriter for JsonResultWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Json
    }

    fn write(&self, table: &ResultTable, path: &Path) -> Result<(), WriteError> {
        let rows: Vec<JsonRow<'_>> = table
            .display_rows()
            .map(|row| JsonRow {
                ticker: row.ticker.as_str(),
                earning_yield: finite(row.earning_yield),
                roc: finite(row.roc),
                price: finite(row.price),
            })
            .collect();

        let file = File::create(path).map_err(|error| WriteError::io(path, error))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &rows)?;
        writer
            .write_all(b"\n")
            .and_then(|()| writer.flush())
            .map_err(|error| WriteError::io(path, error))
    }
}

const XLSX_SHEET: &str = "Ranking";

#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxResultWriter;

impl ResultWriter for XlsxResultWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Xlsx
    }

    fn write(&self, table: &ResultTable, path: &Path) -> Result<(), WriteError> {
        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();
        let sheet = workbook.add_worksheet();
        sheet.set_name(XLSX_SHEET)?;

        for (col, header) in (0u16..).zip(RESULT_HEADER) {
            sheet.write_string_with_format(0, col, header, &bold)?;
        }
        for (row_num, row) in (1u32..).zip(table.display_rows()) {
            sheet.write_string(row_num, 0, row.ticker.as_str())?;
            // Excel has no NaN or infinity; those cells stay empty.
            for (col, value) in (1u16..).zip([row.earning_yield, row.roc, row.price]) {
                if value.is_finite() {
                    sheet.write_number(row_num, col, value)?;
                }
            }
        }

        workbook.save(path)?;
        Ok(())
    }
}
