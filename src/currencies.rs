// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;

use crate::error::StoreError;
use crate::models::{Currency, NewCurrency};

/// Persistence for currencies, keyed by code. Each call is atomic on its own;
/// nothing spans several records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CurrencyStore: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Currency>, StoreError>;
    async fn exists_by_code(&self, code: &str) -> Result<bool, StoreError>;
    async fn update_currency_rate(&self, code: &str, rate: f64) -> Result<(), StoreError>;
    async fn save(&self, currency: NewCurrency) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct SqliteCurrencyStore {
    pool: SqlitePool,
}

impl SqliteCurrencyStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CurrencyStore for SqliteCurrencyStore {
    /// List all currencies in insertion order
    async fn get_all(&self) -> Result<Vec<Currency>, StoreError> {
        let records = sqlx::query_as::<_, Currency>(
            r#"
            SELECT id, code, rate, created_at, updated_at
            FROM currencies
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn exists_by_code(&self, code: &str) -> Result<bool, StoreError> {
        let record = sqlx::query_as::<_, (i64,)>(
            r#"
            SELECT id
            FROM currencies
            WHERE code = ?
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.is_some())
    }

    /// Overwrite the rate of an existing currency; unknown codes are left alone
    async fn update_currency_rate(&self, code: &str, rate: f64) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE currencies
            SET rate = ?, updated_at = CURRENT_TIMESTAMP
            WHERE code = ?
            "#,
        )
        .bind(rate)
        .bind(code)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a currency into the database
    async fn save(&self, currency: NewCurrency) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO currencies (code, rate)
            VALUES (?, ?)
            ON CONFLICT(code) DO UPDATE SET
                rate = excluded.rate,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(&currency.code)
        .bind(currency.rate)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
