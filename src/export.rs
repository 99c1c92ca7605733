// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use csv::Writer;
use tracing::info;

use crate::query::CurrencyQueryService;

/// Export the stored currencies to a timestamped CSV file in `output_dir`
pub async fn export_currencies_csv(
    service: &CurrencyQueryService,
    output_dir: &Path,
) -> Result<PathBuf> {
    // Create output directory if it doesn't exist
    fs::create_dir_all(output_dir)?;

    let currencies = service.get_all_currencies().await?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let csv_path = output_dir.join(format!("currencies_{}.csv", timestamp));
    let mut writer = Writer::from_path(&csv_path)?;

    writer.write_record(["Code", "Rate", "Updated At"])?;
    for currency in &currencies {
        writer.write_record([
            currency.code.as_str(),
            currency.rate.to_string().as_str(),
            currency.updated_at.to_string().as_str(),
        ])?;
    }
    writer.flush()?;

    info!(
        "✅ {} currencies written to {}",
        currencies.len(),
        csv_path.display()
    );
    Ok(csv_path)
}
