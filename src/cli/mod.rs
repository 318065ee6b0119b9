pub mod custodians;
pub mod detect;
pub mod import;
pub mod init;

use std::path::Path;

use clap::{Parser, Subcommand};
use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::{FolioError, Result};
use crate::models::{is_average_cost_name, CanonicalField, ColumnMapping, CustodianDetection};
use crate::tokenizer::SampleRow;

#[derive(Parser)]
#[command(name = "folio", about = "Import brokerage holdings exports from any custodian.")]
pub struct Cli {
    /// Log debug detail (skipped rows, scoring) to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Save default import settings.
    Init {
        /// Minimum detection confidence (0-100) accepted without a manual mapping
        #[arg(long = "auto-accept")]
        auto_accept: Option<u8>,
        /// Number of sample rows shown when a mapping is needed
        #[arg(long = "sample-rows")]
        sample_rows: Option<usize>,
        /// Default log filter, e.g. warn or folio=debug
        #[arg(long = "log-level")]
        log_level: Option<String>,
    },
    /// List the custodian formats recognized automatically.
    Custodians,
    /// Show which custodian a CSV export looks like and how its columns map.
    Detect {
        /// Path to the CSV export
        file: String,
    },
    /// Parse holdings from a CSV export.
    Import {
        /// Path to the CSV export
        file: String,
        /// Manual column mapping FIELD=COLUMN (index or header name), repeatable
        #[arg(long = "map", value_name = "FIELD=COLUMN")]
        map: Vec<String>,
        /// Force a custodian format by key (see `folio custodians`)
        #[arg(long)]
        custodian: Option<String>,
        /// Parse even when detection confidence is below the auto-accept threshold
        #[arg(long)]
        force: bool,
        /// Print detection, holdings and skipped rows as JSON
        #[arg(long)]
        json: bool,
        /// Write canonical holdings CSV to this path
        #[arg(long)]
        output: Option<String>,
    },
}

/// Read an export as text; a UTF-8 byte-order mark is dropped.
pub(crate) fn read_export(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)?;
    Ok(match content.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => content,
    })
}

/// Build a mapping from `FIELD=COLUMN` arguments. COLUMN is a zero-based
/// index or a header name. FIELD may also be `averageCost` for a per-share
/// cost column.
pub(crate) fn parse_map_args(args: &[String], headers: &[String]) -> Result<ColumnMapping> {
    let mut mapping = ColumnMapping::new();
    for arg in args {
        let (field, column) = arg
            .split_once('=')
            .ok_or_else(|| FolioError::InvalidMapping(format!("expected FIELD=COLUMN, got '{arg}'")))?;
        let field = field.trim();
        let column = column.trim();
        let index = match column.parse::<usize>() {
            Ok(i) => i,
            Err(_) => headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(column))
                .ok_or_else(|| FolioError::InvalidMapping(format!("no column named '{column}'")))?,
        };
        if is_average_cost_name(field) {
            mapping.set_average_cost(index);
        } else {
            mapping.insert(field.parse::<CanonicalField>()?, index);
        }
    }
    mapping.validate(headers.len())?;
    Ok(mapping)
}

pub(crate) fn confidence_label(confidence: u8) -> String {
    let text = format!("{confidence}%");
    match confidence {
        80..=100 => text.green().to_string(),
        50..=79 => text.yellow().to_string(),
        _ => text.red().to_string(),
    }
}

/// Columns with their index, mapped field and sample values.
pub(crate) fn print_xray(headers: &[String], detection: &CustodianDetection, samples: &[SampleRow]) {
    let mut table = Table::new();
    let mut header_row = vec!["#".to_string(), "Column".to_string(), "Maps To".to_string()];
    header_row.extend((1..=samples.len()).map(|i| format!("Row {i}")));
    table.set_header(header_row);

    for (i, name) in headers.iter().enumerate() {
        let field = detection
            .column_mappings
            .iter()
            .find(|(_, h)| h.eq_ignore_ascii_case(name.trim()))
            .map(|(f, _)| f.label())
            .or_else(|| {
                detection
                    .average_cost_column
                    .as_deref()
                    .filter(|h| h.eq_ignore_ascii_case(name.trim()))
                    .map(|_| "Average Cost")
            })
            .map(|label| label.green().to_string())
            .unwrap_or_else(|| "-".dimmed().to_string());
        let mut row = vec![Cell::new(i), Cell::new(name), Cell::new(field)];
        row.extend(
            samples
                .iter()
                .map(|s| Cell::new(s.get(name).map(String::as_str).unwrap_or(""))),
        );
        table.add_row(row);
    }
    println!("Columns\n{table}");

    let unmapped = detection.unmapped_columns(headers);
    if !unmapped.is_empty() {
        println!("Unmapped: {}", unmapped.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hdrs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_map_args_by_index_and_name() {
        let headers = hdrs(&["Ticker", "Name", "Units Held", "Last"]);
        let args = vec![
            "symbol=0".to_string(),
            "shares=Units Held".to_string(),
            "price = last".to_string(),
        ];
        let mapping = parse_map_args(&args, &headers).unwrap();
        assert_eq!(mapping.get(CanonicalField::Symbol), Some(0));
        assert_eq!(mapping.get(CanonicalField::Shares), Some(2));
        assert_eq!(mapping.get(CanonicalField::Price), Some(3));
        assert_eq!(mapping.average_cost(), None);
    }

    #[test]
    fn test_parse_map_args_average_cost() {
        let headers = hdrs(&["Ticker", "Units", "Paid"]);
        let args = vec![
            "symbol=0".to_string(),
            "shares=1".to_string(),
            "averageCost=Paid".to_string(),
        ];
        let mapping = parse_map_args(&args, &headers).unwrap();
        assert_eq!(mapping.average_cost(), Some(2));
        assert_eq!(mapping.get(CanonicalField::CostBasis), None);
    }

    #[test]
    fn test_parse_map_args_errors() {
        let headers = hdrs(&["Ticker", "Units"]);
        let bad_syntax = parse_map_args(&["symbol".to_string()], &headers);
        assert!(matches!(bad_syntax, Err(FolioError::InvalidMapping(_))));

        let bad_field = parse_map_args(&["ticker=0".to_string(), "bogus=1".to_string()], &headers);
        assert!(matches!(bad_field, Err(FolioError::UnknownField(_))));

        let bad_column = parse_map_args(
            &["symbol=0".to_string(), "shares=Quantity".to_string()],
            &headers,
        );
        assert!(matches!(bad_column, Err(FolioError::InvalidMapping(_))));

        let missing_shares = parse_map_args(&["symbol=0".to_string()], &headers);
        assert!(matches!(missing_shares, Err(FolioError::InvalidMapping(_))));
    }

    #[test]
    fn test_read_export_strips_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bom.csv");
        std::fs::write(&path, "\u{feff}Symbol,Quantity\nAAPL,1\n").unwrap();
        let content = read_export(&path).unwrap();
        assert!(content.starts_with("Symbol"));
    }
}
