// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use tracing::Level;

fn parse_level(verbosity: &str) -> Option<Level> {
    match verbosity.to_uppercase().as_str() {
        "TRACE" => Some(Level::TRACE),
        "DEBUG" => Some(Level::DEBUG),
        "INFO" => Some(Level::INFO),
        "WARN" => Some(Level::WARN),
        "ERROR" => Some(Level::ERROR),
        _ => None,
    }
}

/// Log level comes from `VERBOSITY` (default INFO).
pub fn init_logger() {
    let verbosity = std::env::var("VERBOSITY").unwrap_or_else(|_| "INFO".to_string());
    let level = parse_level(&verbosity).unwrap_or_else(|| {
        eprintln!(
            "Invalid verbosity level '{}', defaulting to INFO",
            verbosity
        );
        Level::INFO
    });

    tracing_subscriber::fmt().with_max_level(level).init();
}
