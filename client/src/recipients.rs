//! Recipient CSV parsing for airdrop creation.
//!
//! Input files carry `address,amount` rows, optionally preceded by a header
//! line. Amounts are kept as the raw strings the file contained so the API
//! receives exactly what the creator uploaded.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    pub address: String,
    pub amount: String,
}

/// Reads and parses a recipient CSV file.
pub fn parse_recipients_file(path: &Path) -> Result<Vec<Recipient>> {
    let contents = std::fs::read_to_string(path)?;
    parse_recipients(&contents)
}

/// Parses `address,amount` CSV text. A leading header row is skipped, blank
/// lines are ignored, and every amount must be a positive number.
pub fn parse_recipients(contents: &str) -> Result<Vec<Recipient>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(contents.as_bytes());

    let mut recipients = Vec::new();
    let mut seen_data = false;
    for result in reader.records() {
        let record = result.map_err(|e| Error::Csv {
            line: e.position().map(|p| p.line() as usize).unwrap_or(0),
            message: e.to_string(),
        })?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        if !seen_data {
            seen_data = true;
            if is_header(&record) {
                continue;
            }
        }

        let address = record.get(0).unwrap_or_default();
        let amount = record.get(1).unwrap_or_default();
        if address.is_empty() || amount.is_empty() {
            return Err(Error::Csv {
                line,
                message: "expected address and amount".to_string(),
            });
        }
        let parsed: f64 = amount.parse().map_err(|_| Error::Csv {
            line,
            message: format!("invalid amount: {amount}"),
        })?;
        if !parsed.is_finite() || parsed <= 0.0 {
            return Err(Error::Csv {
                line,
                message: format!("amount must be a positive number: {amount}"),
            });
        }

        recipients.push(Recipient {
            address: address.to_string(),
            amount: amount.to_string(),
        });
    }

    Ok(recipients)
}

fn is_header(record: &csv::StringRecord) -> bool {
    record.iter().any(|field| {
        let lower = field.to_ascii_lowercase();
        lower.contains("address") || lower.contains("amount")
    })
}

/// Sums the recipient amounts for display purposes.
pub fn total_amount(recipients: &[Recipient]) -> f64 {
    recipients
        .iter()
        .filter_map(|r| r.amount.parse::<f64>().ok())
        .sum()
}
