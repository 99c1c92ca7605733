// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use std::sync::Arc;

use crate::currencies::CurrencyStore;
use crate::error::StoreError;
use crate::models::CurrencyServiceModel;

/// Read-only view of the stored currencies for outside callers.
#[derive(Clone)]
pub struct CurrencyQueryService {
    store: Arc<dyn CurrencyStore>,
}

impl CurrencyQueryService {
    pub fn new(store: Arc<dyn CurrencyStore>) -> Self {
        Self { store }
    }

    /// Every stored currency in store order, projected fresh on each call.
    pub async fn get_all_currencies(&self) -> Result<Vec<CurrencyServiceModel>, StoreError> {
        let currencies = self.store.get_all().await?;
        Ok(currencies
            .into_iter()
            .map(CurrencyServiceModel::from)
            .collect())
    }
}
