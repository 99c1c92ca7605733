// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

//! Plain-text rendering of historical rates and the one-page PDF it is
//! written into.
//!
//! The text layout is one block per snapshot:
//!
//! ```text
//! 2025-01-02
//! GBP - 0.8297
//! USD - 1.0321
//!
//! ```

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::models::{HistoryRate, HistorySnapshot};

const DATE_FORMAT: &str = "%Y-%m-%d";
const PAIR_SEPARATOR: &str = " - ";

// A4 width, points
const PAGE_WIDTH: f32 = 595.0;
const MIN_PAGE_HEIGHT: f32 = 842.0;
// Largest page side allowed by the PDF format
const MAX_PAGE_HEIGHT: f32 = 14_400.0;
const MARGIN: f32 = 36.0;
const LEADING: f32 = 11.0;
const FONT_SIZE: f32 = 9.0;

pub fn format_snapshots(snapshots: &[HistorySnapshot]) -> String {
    let mut out = String::new();
    for snapshot in snapshots {
        out.push_str(&snapshot.date.format(DATE_FORMAT).to_string());
        out.push('\n');
        for rate in &snapshot.rates {
            out.push_str(&format!(
                "{}{}{}\n",
                rate.currency, PAIR_SEPARATOR, rate.rate
            ));
        }
        out.push('\n');
    }
    out
}

/// Inverse of [`format_snapshots`].
pub fn parse_report(text: &str) -> Result<Vec<HistorySnapshot>> {
    let mut snapshots = Vec::new();
    let mut current: Option<HistorySnapshot> = None;

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;

        if line.is_empty() {
            if let Some(snapshot) = current.take() {
                snapshots.push(snapshot);
            }
            continue;
        }

        match current.as_mut() {
            None => {
                let date = NaiveDate::parse_from_str(line, DATE_FORMAT)
                    .with_context(|| format!("line {}: expected a date, got {:?}", line_no, line))?;
                current = Some(HistorySnapshot {
                    date,
                    rates: Vec::new(),
                });
            }
            Some(snapshot) => {
                let (currency, rate) = line
                    .split_once(PAIR_SEPARATOR)
                    .ok_or_else(|| anyhow!("line {}: expected \"CODE - RATE\", got {:?}", line_no, line))?;
                let rate: f64 = rate
                    .parse()
                    .with_context(|| format!("line {}: invalid rate {:?}", line_no, rate))?;
                snapshot.rates.push(HistoryRate::new(currency, rate));
            }
        }
    }

    // Tolerate a missing trailing blank line
    if let Some(snapshot) = current.take() {
        snapshots.push(snapshot);
    }

    Ok(snapshots)
}

/// Write `text` as the body of a single-page PDF at `path`, replacing any
/// existing file. Long reports get a taller page, and past the maximum page
/// height a tighter line spacing, so everything stays on one page.
pub fn write_pdf(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let lines: Vec<&str> = text.lines().collect();
    let (page_height, leading, font_size) = page_layout(lines.len());

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Real(font_size)]),
        Operation::new("TL", vec![Object::Real(leading)]),
        Operation::new(
            "Td",
            vec![Object::Real(MARGIN), Object::Real(page_height - MARGIN)],
        ),
    ];
    for line in &lines {
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        operations.push(Operation::new("T*", vec![]));
    }
    operations.push(Operation::new("ET", vec![]));

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![Object::Reference(page_id)],
        "Count" => Object::Integer(1),
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(PAGE_WIDTH),
            Object::Real(page_height),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    doc.save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Page height, leading and font size for `line_count` lines.
fn page_layout(line_count: usize) -> (f32, f32, f32) {
    let needed = 2.0 * MARGIN + line_count as f32 * LEADING;
    if needed <= MAX_PAGE_HEIGHT {
        return (needed.max(MIN_PAGE_HEIGHT), LEADING, FONT_SIZE);
    }

    let leading = (MAX_PAGE_HEIGHT - 2.0 * MARGIN) / line_count as f32;
    (MAX_PAGE_HEIGHT, leading, leading * FONT_SIZE / LEADING)
}
