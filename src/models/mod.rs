// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

// Re-export model modules
mod currency;
mod history;

pub use currency::*;
pub use history::*;
