// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::api::RateScraper;
use crate::currencies::CurrencyStore;
use crate::error::{SeedError, SourceFailure};
use crate::models::{NewCurrency, RawCurrencyRecord};
use crate::scheduler::ScheduledJob;
use crate::validator::validate_batch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Primary,
    Secondary,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Primary => write!(f, "primary"),
            Source::Secondary => write!(f, "secondary"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedOutcome {
    pub source: Source,
    pub inserted: usize,
    pub updated: usize,
}

/// Scrape current rates, validate the whole batch, fall back to the secondary
/// source once, and upsert the result into the store.
pub struct SeedingPipeline {
    primary: Arc<dyn RateScraper>,
    secondary: Arc<dyn RateScraper>,
    store: Arc<dyn CurrencyStore>,
}

impl SeedingPipeline {
    pub fn new(
        primary: Arc<dyn RateScraper>,
        secondary: Arc<dyn RateScraper>,
        store: Arc<dyn CurrencyStore>,
    ) -> Self {
        Self {
            primary,
            secondary,
            store,
        }
    }

    pub async fn run(&self) -> Result<SeedOutcome, SeedError> {
        let (source, records) = match attempt(self.primary.as_ref()).await {
            Ok(records) => (Source::Primary, records),
            Err(primary) => {
                warn!("Primary source failed, trying secondary: {}", primary);
                match attempt(self.secondary.as_ref()).await {
                    Ok(records) => (Source::Secondary, records),
                    Err(secondary) => {
                        return Err(SeedError::AllSourcesFailed { primary, secondary })
                    }
                }
            }
        };

        let outcome = self.persist(source, &records).await?;
        info!(
            "✅ Seeded {} currencies from {} source ({} new, {} updated)",
            records.len(),
            outcome.source,
            outcome.inserted,
            outcome.updated
        );
        Ok(outcome)
    }

    async fn persist(
        &self,
        source: Source,
        records: &[RawCurrencyRecord],
    ) -> Result<SeedOutcome, SeedError> {
        let mut outcome = SeedOutcome {
            source,
            inserted: 0,
            updated: 0,
        };

        for record in records {
            if self.store.exists_by_code(&record.code).await? {
                self.store
                    .update_currency_rate(&record.code, record.rate)
                    .await?;
                outcome.updated += 1;
            } else {
                self.store.save(NewCurrency::from(record)).await?;
                outcome.inserted += 1;
            }
        }

        Ok(outcome)
    }
}

/// One scrape + validation round against a single source.
async fn attempt(scraper: &dyn RateScraper) -> Result<Vec<RawCurrencyRecord>, SourceFailure> {
    let records = scraper.fetch_rates().await?;
    validate_batch(&records)?;
    Ok(records)
}

#[async_trait]
impl ScheduledJob for SeedingPipeline {
    fn name(&self) -> &str {
        "seed-currencies"
    }

    async fn run(&self) -> anyhow::Result<()> {
        SeedingPipeline::run(self).await?;
        Ok(())
    }
}
