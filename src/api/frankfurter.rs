// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDate};
use reqwest::Client;
use serde::Deserialize;

use super::{get_text, HistoryScraper, RateScraper};
use crate::error::ScrapeError;
use crate::models::{RawCurrencyRecord, REFERENCE_CURRENCY};

#[derive(Debug, Deserialize)]
struct LatestResponse {
    base: String,
    rates: BTreeMap<String, f64>,
}

/// Client for the Frankfurter API (ECB reference rates).
#[derive(Clone)]
pub struct FrankfurterClient {
    client: Client,
    base_url: String,
    history_days: i64,
}

impl FrankfurterClient {
    pub fn new(client: Client, base_url: impl Into<String>, history_days: i64) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            history_days,
        }
    }

    fn latest_url(&self) -> String {
        format!("{}/latest?from={}", self.base_url, REFERENCE_CURRENCY)
    }

    /// Time series from `history_days` before `end` up to `end`.
    fn history_url(&self, end: NaiveDate) -> Result<String, ScrapeError> {
        let start = Duration::try_days(self.history_days)
            .and_then(|span| end.checked_sub_signed(span))
            .ok_or_else(|| {
                ScrapeError::Source(format!(
                    "history window of {} days before {} is out of range",
                    self.history_days, end
                ))
            })?;
        Ok(format!(
            "{}/{}..{}?from={}",
            self.base_url,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
            REFERENCE_CURRENCY
        ))
    }
}

fn parse_latest(body: &str) -> Result<Vec<RawCurrencyRecord>, ScrapeError> {
    let response: LatestResponse = serde_json::from_str(body)?;

    if response.base != REFERENCE_CURRENCY {
        return Err(ScrapeError::Source(format!(
            "unexpected base currency {}",
            response.base
        )));
    }

    Ok(response
        .rates
        .into_iter()
        .map(|(code, rate)| RawCurrencyRecord::new(code, rate))
        .collect())
}

#[async_trait]
impl RateScraper for FrankfurterClient {
    async fn fetch_rates(&self) -> Result<Vec<RawCurrencyRecord>, ScrapeError> {
        let body = get_text(&self.client, &self.latest_url()).await?;
        parse_latest(&body)
    }
}

#[async_trait]
impl HistoryScraper for FrankfurterClient {
    async fn fetch_history(&self) -> Result<String, ScrapeError> {
        let url = self.history_url(Local::now().date_naive())?;
        get_text(&self.client, &url).await
    }
}
