use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{Cell, Table};
use serde::Serialize;
use tracing::info;

use crate::cli::{confidence_label, parse_map_args, print_xray, read_export};
use crate::custodians;
use crate::detector::{self, needs_manual_mapping};
use crate::error::{FolioError, Result};
use crate::export::write_holdings_file;
use crate::fmt::{money, percent, shares};
use crate::mapper;
use crate::models::{CustodianDetection, ParseOutcome, RowRejection};
use crate::portfolio::Portfolio;
use crate::settings::Settings;
use crate::tokenizer;

/// Confidence under which a successful import still carries a warning.
const WARN_BELOW_CONFIDENCE: u8 = 80;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportReport<'a> {
    detection: &'a CustodianDetection,
    rows_processed: usize,
    rows_skipped: usize,
    warnings: &'a [String],
    portfolio: &'a Portfolio,
    rejections: &'a [RowRejection],
}

pub fn run(
    file: &str,
    settings: &Settings,
    map: &[String],
    custodian: Option<&str>,
    force: bool,
    json: bool,
    output: Option<&str>,
) -> Result<()> {
    let content = read_export(&PathBuf::from(file))?;
    let headers = tokenizer::headers(&content);

    let (detection, outcome) = if !map.is_empty() {
        let mapping = parse_map_args(map, &headers)?;
        let outcome = mapper::parse_with_mapping(&content, &mapping)?;
        (detector::user_mapped(&headers, &mapping), outcome)
    } else {
        let detection = match custodian {
            Some(key) => {
                let pattern = custodians::get_by_key(key)
                    .ok_or_else(|| FolioError::UnknownCustodian(key.to_string()))?;
                detector::detect_with(pattern, &headers)
            }
            None => detector::detect(&headers),
        };
        let threshold = settings.auto_accept_confidence;
        if custodian.is_none() && !force && needs_manual_mapping(&detection, threshold) {
            if !json {
                let samples = tokenizer::sample_rows(&content, settings.sample_rows);
                print_xray(&headers, &detection, &samples);
            }
            return Err(FolioError::NeedsMapping {
                custodian: detection.custodian,
                confidence: detection.confidence,
                threshold,
            });
        }
        let outcome = mapper::parse_holdings(&content, &detection)?;
        (detection, outcome)
    };

    info!(
        custodian = %detection.custodian,
        confidence = detection.confidence,
        processed = outcome.rows_processed(),
        skipped = outcome.rows_skipped(),
        "import finished"
    );

    let mut warnings = Vec::new();
    if detection.confidence < WARN_BELOW_CONFIDENCE {
        warnings.push(format!("Confidence: {}%", detection.confidence));
    }
    if outcome.holdings.is_empty() {
        warnings.push("No holdings survived validation".to_string());
    }

    if let Some(path) = output {
        write_holdings_file(&PathBuf::from(path), &outcome.holdings)?;
        if !json {
            println!("Wrote {} holdings to {path}", outcome.holdings.len());
        }
    }

    let portfolio = Portfolio::from_holdings(&outcome.holdings);
    if json {
        let report = ImportReport {
            detection: &detection,
            rows_processed: outcome.rows_processed(),
            rows_skipped: outcome.rows_skipped(),
            warnings: &warnings,
            portfolio: &portfolio,
            rejections: &outcome.rejections,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_summary(&detection, &outcome, &warnings);
    print_holdings(&portfolio);
    Ok(())
}

fn print_summary(detection: &CustodianDetection, outcome: &ParseOutcome, warnings: &[String]) {
    println!(
        "{} ({}, {})",
        detection.custodian.bold(),
        detection.format,
        confidence_label(detection.confidence)
    );
    println!(
        "{} rows processed, {} skipped",
        outcome.rows_processed(),
        outcome.rows_skipped()
    );
    for r in &outcome.rejections {
        println!("  {}", format!("line {}: {}", r.line, r.reason).dimmed());
    }
    for w in warnings {
        println!("{}", format!("Warning: {w}").yellow());
    }
}

fn print_holdings(portfolio: &Portfolio) {
    if portfolio.positions.is_empty() {
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Symbol",
        "Name",
        "Shares",
        "Price",
        "Avg Cost",
        "Market Value",
        "Cost Basis",
        "Gain",
        "Weight",
    ]);
    for p in &portfolio.positions {
        let h = &p.holding;
        let gain = match p.unrealized_gain {
            Some(g) if g >= 0.0 => money(g).green().to_string(),
            Some(g) => money(g).red().to_string(),
            None => String::new(),
        };
        table.add_row(vec![
            Cell::new(&h.symbol),
            Cell::new(&p.name),
            Cell::new(shares(h.shares)),
            Cell::new(money(h.price)),
            Cell::new(p.average_cost.map(money).unwrap_or_default()),
            Cell::new(money(h.market_value)),
            Cell::new(h.cost_basis.map(money).unwrap_or_default()),
            Cell::new(gain),
            Cell::new(percent(p.weight * 100.0)),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new(money(portfolio.total_value)),
        Cell::new(money(portfolio.total_cost)),
        Cell::new(money(portfolio.total_gain)),
        Cell::new(""),
    ]);
    println!("Holdings\n{table}");

    if let Some(largest) = portfolio.largest_position() {
        println!(
            "Largest position: {} ({})",
            largest.holding.symbol,
            percent(largest.weight * 100.0)
        );
    }
    println!("Top 5 weight: {}", percent(portfolio.top_weight(5) * 100.0));
    if let Some(pct) = portfolio.total_gain_pct {
        println!("Unrealized return: {}", percent(pct));
    }
}
