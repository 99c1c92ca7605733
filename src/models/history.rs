// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;

use super::currency::REFERENCE_CURRENCY;
use crate::error::HistoryError;

/// One (currency, rate) entry of a historical snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRate {
    pub currency: String,
    pub rate: f64,
}

impl HistoryRate {
    pub fn new(currency: impl Into<String>, rate: f64) -> Self {
        Self {
            currency: currency.into(),
            rate,
        }
    }
}

/// All rates published for a single day.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySnapshot {
    pub date: NaiveDate,
    pub rates: Vec<HistoryRate>,
}

/// Time series document as served by the history endpoint.
#[derive(Debug, Deserialize)]
struct TimeSeriesDocument {
    base: String,
    // BTreeMap keeps ISO dates, and codes within a day, in ascending order
    rates: BTreeMap<String, BTreeMap<String, f64>>,
}

/// Parse the raw history document into snapshots ordered by date.
pub fn parse_history_document(raw: &str) -> Result<Vec<HistorySnapshot>, HistoryError> {
    let document: TimeSeriesDocument =
        serde_json::from_str(raw).map_err(|e| HistoryError::Parse(e.to_string()))?;

    if document.base != REFERENCE_CURRENCY {
        return Err(HistoryError::Parse(format!(
            "unexpected base currency {}",
            document.base
        )));
    }

    document
        .rates
        .into_iter()
        .map(|(day, rates)| {
            let date = NaiveDate::parse_from_str(&day, "%Y-%m-%d")
                .map_err(|e| HistoryError::Parse(format!("invalid date {:?}: {}", day, e)))?;
            let rates = rates
                .into_iter()
                .map(|(currency, rate)| HistoryRate { currency, rate })
                .collect();
            Ok(HistorySnapshot { date, rates })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_history_document_orders_dates_and_codes() {
        let raw = r#"{
            "amount": 1.0,
            "base": "EUR",
            "start_date": "2025-01-02",
            "end_date": "2025-01-03",
            "rates": {
                "2025-01-03": {"USD": 1.0299, "GBP": 0.8314},
                "2025-01-02": {"USD": 1.0321, "GBP": 0.8297}
            }
        }"#;

        let snapshots = parse_history_document(raw).unwrap();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].date, NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
        assert_eq!(snapshots[1].date, NaiveDate::from_ymd_opt(2025, 1, 3).unwrap());
        assert_eq!(snapshots[0].rates[0].currency, "GBP");
        assert_eq!(snapshots[0].rates[1].currency, "USD");
        assert_relative_eq!(snapshots[1].rates[1].rate, 1.0299, epsilon = 1e-9);
    }

    #[test]
    fn test_parse_history_document_rejects_other_base() {
        let raw = r#"{"base": "USD", "rates": {}}"#;
        let err = parse_history_document(raw).unwrap_err();
        assert!(matches!(err, HistoryError::Parse(_)));
    }

    #[test]
    fn test_parse_history_document_rejects_bad_date() {
        let raw = r#"{"base": "EUR", "rates": {"yesterday": {"USD": 1.1}}}"#;
        assert!(parse_history_document(raw).is_err());
    }

    #[test]
    fn test_parse_history_document_rejects_garbage() {
        assert!(parse_history_document("<html>").is_err());
    }
}
