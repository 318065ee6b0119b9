use tracing::{debug, info};

use crate::error::{FolioError, Result};
use crate::models::{
    CanonicalField, ColumnMapping, CustodianDetection, Holding, ParseOutcome, RejectReason,
    RowRejection,
};
use crate::tokenizer::{self, split_line, HeaderRow};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Brokerage-style number: `$`, thousands separators and stray quotes are
/// ignored, `(…)` means negative, anything unparseable is 0.
pub fn parse_amount(raw: &str) -> f64 {
    let s = raw.replace(',', "").replace('"', "").replace('$', "");
    let s = s.trim();
    let value = if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        inner.trim().parse::<f64>().map(|v| -v)
    } else {
        s.parse::<f64>()
    };
    match value {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Re-find the header line by its first token.
fn locate_header(content: &str) -> Result<HeaderRow> {
    let anchor = tokenizer::find_header(content).ok_or(FolioError::HeaderNotFound)?;
    let first = anchor.fields.first().cloned().unwrap_or_default();
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !tokenizer::is_skippable(line))
        .map(|(line, text)| (line, split_line(text)))
        .find(|(_, fields)| fields.first() == Some(&first))
        .map(|(line, fields)| HeaderRow { line, fields })
        .ok_or(FolioError::HeaderNotFound)
}

/// Turn a detection's field -> header-name map into column indices.
pub fn mapping_for_detection(headers: &[String], detection: &CustodianDetection) -> ColumnMapping {
    let mut mapping = ColumnMapping::new();
    for (field, name) in &detection.column_mappings {
        match headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name.trim()))
        {
            Some(index) => mapping.insert(*field, index),
            None => debug!(%field, header = %name, "mapped header not present in file"),
        }
    }
    if let Some(index) = detection.average_cost_column.as_ref().and_then(|name| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name.trim()))
    }) {
        mapping.set_average_cost(index);
    }
    mapping
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn map_row(
    values: &[String],
    width: usize,
    mapping: &ColumnMapping,
) -> std::result::Result<Holding, RejectReason> {
    if values.len() < width {
        return Err(RejectReason::TooFewFields {
            expected: width,
            found: values.len(),
        });
    }

    let cell = |index: Option<usize>| {
        index
            .and_then(|i| values.get(i))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    };
    let text = |field: CanonicalField| cell(mapping.get(field));
    let number = |field: CanonicalField| text(field).map(parse_amount);

    let symbol = text(CanonicalField::Symbol).unwrap_or_default().to_string();
    if symbol.is_empty() {
        return Err(RejectReason::EmptySymbol);
    }
    let shares = number(CanonicalField::Shares).unwrap_or(0.0);
    if shares <= 0.0 {
        return Err(RejectReason::NonPositiveShares);
    }

    let price = number(CanonicalField::Price).unwrap_or(0.0);
    let mut market_value = number(CanonicalField::MarketValue).unwrap_or(0.0);
    if market_value == 0.0 && price != 0.0 {
        market_value = shares * price;
    }
    if !market_value.is_finite() {
        return Err(RejectReason::MarketValueOverflow);
    }

    // A total cost column wins; otherwise derive it from a per-share cost.
    let cost_basis = number(CanonicalField::CostBasis)
        .or_else(|| {
            cell(mapping.average_cost())
                .map(parse_amount)
                .filter(|unit| *unit != 0.0)
                .map(|unit| shares * unit)
        })
        .filter(|cost| cost.is_finite());

    Ok(Holding {
        symbol,
        description: text(CanonicalField::Description).map(str::to_string),
        shares,
        price,
        market_value,
        cost_basis,
    })
}

fn map_rows(content: &str, header: &HeaderRow, mapping: &ColumnMapping) -> ParseOutcome {
    let width = header.fields.len();
    let mut outcome = ParseOutcome::default();

    for (idx, line) in content.lines().enumerate().skip(header.line + 1) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let values = split_line(line);
        match map_row(&values, width, mapping) {
            Ok(holding) => outcome.holdings.push(holding),
            Err(reason) => {
                debug!(line = idx + 1, %reason, "row skipped");
                outcome.rejections.push(RowRejection {
                    line: idx + 1,
                    reason,
                });
            }
        }
    }

    info!(
        processed = outcome.rows_processed(),
        skipped = outcome.rows_skipped(),
        "parsed holdings"
    );
    outcome
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

pub fn parse_holdings(content: &str, detection: &CustodianDetection) -> Result<ParseOutcome> {
    let header = locate_header(content)?;
    let mapping = mapping_for_detection(&header.fields, detection);
    debug!(custodian = %detection.custodian, columns = ?mapping, "mapping rows");
    Ok(map_rows(content, &header, &mapping))
}

pub fn parse_with_mapping(content: &str, mapping: &ColumnMapping) -> Result<ParseOutcome> {
    let header = locate_header(content)?;
    mapping.validate(header.fields.len())?;
    Ok(map_rows(content, &header, mapping))
}
