// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use thiserror::Error;

/// Failure of a single scrape call (network, status or decode).
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API request failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Source reported an error: {0}")]
    Source(String),
}

/// A record in a batch did not pass the validator.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Scraped wrong data: invalid record {code:?} with rate {rate}")]
pub struct ValidationError {
    pub code: String,
    pub rate: f64,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Why one source could not provide a usable batch.
#[derive(Error, Debug)]
pub enum SourceFailure {
    #[error(transparent)]
    Scrape(#[from] ScrapeError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Both sources failed (primary: {primary}; secondary: {secondary})")]
    AllSourcesFailed {
        primary: SourceFailure,
        secondary: SourceFailure,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Failed to fetch history: {0}")]
    Scrape(#[from] ScrapeError),
    #[error("Failed to parse history document: {0}")]
    Parse(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
