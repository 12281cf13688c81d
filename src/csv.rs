use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::{ChargeError, ChargeRequest, CreditCard, Money, TransactionId};

/// Errors that can occur when reading charge rows or writing outcomes
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to open {path}: {source}")]
    Open { path: String, source: csv::Error },

    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: usize, source: csv::Error },

    #[error("line {line}: missing card number")]
    MissingCard { line: usize },

    #[error("failed to write outcome: {0}")]
    Write(#[from] csv::Error),

    #[error("failed to flush outcomes: {0}")]
    Flush(#[from] io::Error),
}

#[derive(Debug, Deserialize)]
struct InputRow {
    currency: String,
    units: i64,
    nanos: i32,
    card_number: String,
    cvv: i32,
    expiration_month: i32,
    expiration_year: i32,
}

#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    line: usize,
    status: &'static str,
    transaction_id: String,
    reason: &'a str,
}

/// Read charge requests from a csv file, each tagged with its line number
pub fn read_charges(
    path: impl AsRef<Path>,
) -> Result<impl Iterator<Item = Result<(usize, ChargeRequest), CsvError>>, CsvError> {
    let path = path.as_ref();
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| CsvError::Open {
            path: path.display().to_string(),
            source,
        })?;

    Ok(reader
        .into_deserialize::<InputRow>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2; // 1-indexed, skip header
            let row = result.map_err(|source| CsvError::Parse { line, source })?;
            if row.card_number.is_empty() {
                return Err(CsvError::MissingCard { line });
            }
            let request = ChargeRequest::new(
                Money::new(row.currency, row.units, row.nanos),
                CreditCard {
                    number: row.card_number,
                    cvv: row.cvv,
                    expiration_month: row.expiration_month,
                    expiration_year: row.expiration_year,
                },
            );
            Ok((line, request))
        }))
}

/// Write one csv row per charge outcome
pub fn write_outcomes<'a>(
    out: impl io::Write,
    outcomes: impl IntoIterator<Item = &'a (usize, Result<TransactionId, ChargeError>)>,
) -> Result<(), CsvError> {
    let mut writer = csv::Writer::from_writer(out);

    for (line, result) in outcomes {
        match result {
            Ok(id) => writer.serialize(OutputRow {
                line: *line,
                status: "ok",
                transaction_id: id.to_hex(),
                reason: "",
            })?,
            Err(e) => writer.serialize(OutputRow {
                line: *line,
                status: "failed",
                transaction_id: String::new(),
                reason: &e.to_string(),
            })?,
        }
    }

    writer.flush()?;
    Ok(())
}
