// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

pub mod frankfurter;
pub mod open_er;

pub use frankfurter::FrankfurterClient;
pub use open_er::OpenErClient;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::ScrapeError;
use crate::models::RawCurrencyRecord;

/// A source of current rates against the reference currency.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateScraper: Send + Sync {
    async fn fetch_rates(&self) -> Result<Vec<RawCurrencyRecord>, ScrapeError>;
}

/// A source of the raw, serialized rate history.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistoryScraper: Send + Sync {
    async fn fetch_history(&self) -> Result<String, ScrapeError>;
}

/// Build the HTTP client shared by all scrapers. A hanging source fails the
/// call after `timeout` instead of blocking its pipeline forever.
pub fn http_client(timeout: Duration) -> Result<Client, ScrapeError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// GET `url` and return the body, treating non-2xx responses as errors.
pub(crate) async fn get_text(client: &Client, url: &str) -> Result<String, ScrapeError> {
    debug!("GET {}", url);
    let response = client.get(url).send().await?;

    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ScrapeError::Status { status, body });
    }

    Ok(body)
}
