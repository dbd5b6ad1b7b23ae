// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `-o human`/`-o json` (§6): both modes render the same underlying result
//! structs, only the rendering differs.

use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

/// Prints `value` as pretty JSON in [`OutputFormat::Json`] mode, or calls
/// `human` to render the short human-readable summary otherwise.
pub fn render<T: Serialize>(format: OutputFormat, value: &T, human: impl FnOnce(&T) -> String) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Human => println!("{}", human(value)),
    }
    Ok(())
}
