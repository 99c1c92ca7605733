// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{get_text, RateScraper};
use crate::error::ScrapeError;
use crate::models::{RawCurrencyRecord, REFERENCE_CURRENCY};

#[derive(Debug, Deserialize)]
struct LatestResponse {
    result: String,
    base_code: Option<String>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    #[serde(default)]
    rates: BTreeMap<String, f64>,
}

/// Client for the open.er-api.com exchange rate API, used as fallback source.
#[derive(Clone)]
pub struct OpenErClient {
    client: Client,
    base_url: String,
}

impl OpenErClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn latest_url(&self) -> String {
        format!("{}/latest/{}", self.base_url, REFERENCE_CURRENCY)
    }
}

fn parse_latest(body: &str) -> Result<Vec<RawCurrencyRecord>, ScrapeError> {
    let response: LatestResponse = serde_json::from_str(body)?;

    if response.result != "success" {
        return Err(ScrapeError::Source(
            response
                .error_type
                .unwrap_or_else(|| response.result.clone()),
        ));
    }

    if let Some(base) = response.base_code.as_deref() {
        if base != REFERENCE_CURRENCY {
            return Err(ScrapeError::Source(format!(
                "unexpected base currency {}",
                base
            )));
        }
    }

    // The base currency is listed against itself
    Ok(response
        .rates
        .into_iter()
        .filter(|(code, _)| code != REFERENCE_CURRENCY)
        .map(|(code, rate)| RawCurrencyRecord::new(code, rate))
        .collect())
}

#[async_trait]
impl RateScraper for OpenErClient {
    async fn fetch_rates(&self) -> Result<Vec<RawCurrencyRecord>, ScrapeError> {
        let body = get_text(&self.client, &self.latest_url()).await?;
        parse_latest(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_url() {
        let client = OpenErClient::new(Client::new(), "https://open.er-api.com/v6");
        assert_eq!(client.latest_url(), "https://open.er-api.com/v6/latest/EUR");
    }

    #[test]
    fn test_parse_latest_drops_reference_currency() {
        let body = r#"{
            "result": "success",
            "base_code": "EUR",
            "time_last_update_unix": 1741910551,
            "rates": {"EUR": 1, "USD": 1.089, "GBP": 0.84}
        }"#;

        let records = parse_latest(body).unwrap();
        let codes: Vec<&str> = records.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["GBP", "USD"]);
    }

    #[test]
    fn test_parse_latest_error_result() {
        let body = r#"{"result": "error", "error-type": "unsupported-code"}"#;
        match parse_latest(body) {
            Err(ScrapeError::Source(message)) => assert_eq!(message, "unsupported-code"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
