// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use crate::error::ValidationError;
use crate::models::{HistoryRate, HistorySnapshot, RawCurrencyRecord};

/// Anything carrying a currency code and a rate against the reference currency.
pub trait CurrencyLike {
    fn code(&self) -> &str;
    fn rate(&self) -> f64;
}

impl CurrencyLike for RawCurrencyRecord {
    fn code(&self) -> &str {
        &self.code
    }

    fn rate(&self) -> f64 {
        self.rate
    }
}

impl CurrencyLike for HistoryRate {
    fn code(&self) -> &str {
        &self.currency
    }

    fn rate(&self) -> f64 {
        self.rate
    }
}

/// Codes are three upper-case ASCII letters, e.g. "USD".
fn is_valid_code(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())
}

pub fn is_valid<T: CurrencyLike + ?Sized>(record: &T) -> bool {
    let rate = record.rate();
    is_valid_code(record.code()) && rate.is_finite() && rate >= 0.0
}

/// All-or-nothing check: the first invalid record rejects the whole batch.
pub fn validate_batch<T: CurrencyLike>(records: &[T]) -> Result<(), ValidationError> {
    match records.iter().find(|record| !is_valid(*record)) {
        Some(record) => Err(ValidationError {
            code: record.code().to_string(),
            rate: record.rate(),
        }),
        None => Ok(()),
    }
}

pub fn validate_snapshots(snapshots: &[HistorySnapshot]) -> Result<(), ValidationError> {
    snapshots
        .iter()
        .try_for_each(|snapshot| validate_batch(&snapshot.rates))
}
