// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use chrono::NaiveDateTime;
use serde::Serialize;

/// All scraped rates are expressed as units of currency per one EUR.
pub const REFERENCE_CURRENCY: &str = "EUR";

/// A stored currency row. The code never changes once inserted.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Currency {
    pub id: i64,
    pub code: String,
    pub rate: f64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A currency about to be inserted for the first time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCurrency {
    pub code: String,
    pub rate: f64,
}

/// A (code, rate) pair as produced by a scraper, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCurrencyRecord {
    pub code: String,
    pub rate: f64,
}

impl RawCurrencyRecord {
    pub fn new(code: impl Into<String>, rate: f64) -> Self {
        Self {
            code: code.into(),
            rate,
        }
    }
}

impl From<&RawCurrencyRecord> for NewCurrency {
    fn from(record: &RawCurrencyRecord) -> Self {
        Self {
            code: record.code.clone(),
            rate: record.rate,
        }
    }
}

/// Read-only shape handed to callers of the query service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrencyServiceModel {
    pub code: String,
    pub rate: f64,
    #[serde(rename = "updatedAt")]
    pub updated_at: NaiveDateTime,
}

impl From<Currency> for CurrencyServiceModel {
    fn from(currency: Currency) -> Self {
        Self {
            code: currency.code,
            rate: currency.rate,
            updated_at: currency.updated_at,
        }
    }
}
