// 🌱 Seed Data Source - ordered currency definition records
//
// The registry treats its seed as an opaque, finite sequence of attribute
// bags; this module owns the container formats. Ships a bundled ISO 4217
// table and loaders for JSON and CSV files with the same record contract.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use crate::record::CurrencyDef;

/// Bundled ISO 4217 table, embedded at compile time.
const BUNDLED_JSON: &str = include_str!("../data/currencies.json");

/// Definition records for the bundled ISO table, in priority order.
pub fn bundled() -> Vec<CurrencyDef> {
    serde_json::from_str(BUNDLED_JSON).expect("bundled currency table is valid JSON")
}

/// Load definition records from a JSON array file.
pub fn load_json(path: &Path) -> Result<Vec<CurrencyDef>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read currency file: {:?}", path))?;
    serde_json::from_str(&content).context("Failed to parse currency JSON")
}

/// Load definition records from a CSV file, one row per currency. Column
/// headers follow the JSON key names; empty cells leave fields absent.
pub fn load_csv(path: &Path) -> Result<Vec<CurrencyDef>> {
    let rdr = csv::Reader::from_path(path).context("Failed to open currency CSV file")?;
    defs_from_csv(rdr)
}

/// Parse definition records from any CSV byte stream.
pub fn from_csv_reader<R: Read>(reader: R) -> Result<Vec<CurrencyDef>> {
    defs_from_csv(csv::Reader::from_reader(reader))
}

fn defs_from_csv<R: Read>(mut rdr: csv::Reader<R>) -> Result<Vec<CurrencyDef>> {
    let mut defs = Vec::new();

    for result in rdr.deserialize() {
        let def: CurrencyDef = result.context("Failed to deserialize currency row")?;
        defs.push(def);
    }

    Ok(defs)
}

// ============================================================================
// TESTS
// ============================================================================
