use std::collections::BTreeMap;

use tracing::debug;

use crate::custodians::{self, CustodianPattern};
use crate::models::{CanonicalField, ColumnMapping, CustodianDetection, CUSTOM_FORMAT};

const REQUIRED_POINTS: f64 = 60.0;
const OPTIONAL_POINTS: f64 = 40.0;

/// Below this a registry match is discarded in favor of keyword detection.
pub const MIN_PATTERN_CONFIDENCE: u8 = 50;

const GENERIC_POINTS_PER_FIELD: u32 = 15;
const GENERIC_MAX_CONFIDENCE: u32 = 65;

const GENERIC_KEYWORDS: &[(CanonicalField, &[&str])] = &[
    (CanonicalField::Symbol, &["symbol", "ticker", "stock", "security"]),
    (CanonicalField::Description, &["description", "name"]),
    (CanonicalField::Shares, &["quantity", "shares", "qty", "units"]),
    (CanonicalField::Price, &["price", "last", "close"]),
    (CanonicalField::MarketValue, &["market value", "value", "mkt val"]),
    (CanonicalField::CostBasis, &["cost", "basis", "book"]),
];

fn normalize(headers: &[String]) -> Vec<String> {
    headers.iter().map(|h| h.trim().to_lowercase()).collect()
}

fn count_matches(wanted: &[&str], normalized: &[String]) -> usize {
    wanted
        .iter()
        .filter(|w| {
            let w = w.to_lowercase();
            normalized.iter().any(|h| *h == w)
        })
        .count()
}

/// Points earned out of the pattern's fixed 100-point budget.
fn score(pattern: &CustodianPattern, normalized: &[String]) -> u8 {
    let mut earned = 0.0;
    if !pattern.required_headers.is_empty() {
        let each = REQUIRED_POINTS / pattern.required_headers.len() as f64;
        earned += each * count_matches(pattern.required_headers, normalized) as f64;
    }
    if !pattern.optional_headers.is_empty() {
        let each = OPTIONAL_POINTS / pattern.optional_headers.len() as f64;
        earned += each * count_matches(pattern.optional_headers, normalized) as f64;
    }
    earned.round().clamp(0.0, 100.0) as u8
}

/// Field -> actual header text, first matching synonym wins.
fn resolve(pattern: &CustodianPattern, headers: &[String]) -> BTreeMap<CanonicalField, String> {
    let mut resolved = BTreeMap::new();
    for field in CanonicalField::ALL {
        let found = pattern.synonyms(field).iter().find_map(|syn| {
            headers
                .iter()
                .find(|h| h.trim().eq_ignore_ascii_case(syn))
                .map(|h| h.trim().to_string())
        });
        if let Some(header) = found {
            resolved.insert(field, header);
        }
    }
    resolved
}

/// First per-share cost header present in the file and not already claimed.
fn resolve_average_cost(
    pattern: &CustodianPattern,
    headers: &[String],
    claimed: &BTreeMap<CanonicalField, String>,
) -> Option<String> {
    pattern.average_cost_headers.iter().find_map(|name| {
        headers
            .iter()
            .map(|h| h.trim())
            .find(|h| h.eq_ignore_ascii_case(name) && !claimed.values().any(|c| c == h))
            .map(str::to_string)
    })
}

fn matched(pattern: &CustodianPattern, confidence: u8, headers: &[String]) -> CustodianDetection {
    let column_mappings = resolve(pattern, headers);
    let average_cost_column = resolve_average_cost(pattern, headers, &column_mappings);
    CustodianDetection {
        custodian: pattern.name.to_string(),
        confidence,
        format: pattern.format.to_string(),
        column_mappings,
        average_cost_column,
    }
}

/// Score one pattern against a header row, without threshold or fallback.
pub fn detect_with(pattern: &CustodianPattern, headers: &[String]) -> CustodianDetection {
    matched(pattern, score(pattern, &normalize(headers)), headers)
}

/// Keyword search used when no registered custodian clears the threshold.
pub fn detect_generic(headers: &[String]) -> CustodianDetection {
    let normalized = normalize(headers);
    let mut claimed = vec![false; headers.len()];
    let mut column_mappings = BTreeMap::new();

    for (field, keywords) in GENERIC_KEYWORDS {
        let hit = normalized
            .iter()
            .enumerate()
            .find(|(i, h)| !claimed[*i] && keywords.iter().any(|k| h.contains(k)));
        if let Some((i, _)) = hit {
            claimed[i] = true;
            column_mappings.insert(*field, headers[i].trim().to_string());
        }
    }

    let confidence = (column_mappings.len() as u32 * GENERIC_POINTS_PER_FIELD)
        .min(GENERIC_MAX_CONFIDENCE) as u8;

    CustodianDetection {
        custodian: CUSTOM_FORMAT.to_string(),
        confidence,
        format: "Generic keyword detection".to_string(),
        column_mappings,
        average_cost_column: None,
    }
}

pub fn detect(headers: &[String]) -> CustodianDetection {
    let normalized = normalize(headers);

    let mut best: Option<(&CustodianPattern, u8)> = None;
    for pattern in custodians::all() {
        let confidence = score(pattern, &normalized);
        debug!(custodian = pattern.name, confidence, "scored custodian pattern");
        if best.map_or(true, |(_, c)| confidence > c) {
            best = Some((pattern, confidence));
        }
    }

    match best {
        Some((pattern, confidence)) if confidence >= MIN_PATTERN_CONFIDENCE => {
            matched(pattern, confidence, headers)
        }
        _ => {
            let generic = detect_generic(headers);
            debug!(
                confidence = generic.confidence,
                fields = generic.column_mappings.len(),
                "no custodian above threshold, using keyword detection"
            );
            generic
        }
    }
}

/// Detection describing a mapping the user picked by column index.
pub fn user_mapped(headers: &[String], mapping: &ColumnMapping) -> CustodianDetection {
    CustodianDetection {
        custodian: CUSTOM_FORMAT.to_string(),
        confidence: 100,
        format: "User Mapped".to_string(),
        column_mappings: mapping
            .iter()
            .filter_map(|(field, i)| headers.get(i).map(|h| (field, h.trim().to_string())))
            .collect(),
        average_cost_column: mapping
            .average_cost()
            .and_then(|i| headers.get(i))
            .map(|h| h.trim().to_string()),
    }
}

/// Keyword-only results and anything under `threshold` go to manual mapping.
pub fn needs_manual_mapping(detection: &CustodianDetection, threshold: u8) -> bool {
    detection.confidence < threshold || detection.is_custom()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hdrs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_schwab_full_match() {
        let d = detect(&hdrs(&[
            "Symbol",
            "Description",
            "Quantity",
            "Price",
            "Position Value",
            "Cost Basis",
        ]));
        assert_eq!(d.custodian, "Charles Schwab");
        assert_eq!(d.confidence, 100);
        assert_eq!(d.column_mappings.len(), 6);
        assert_eq!(d.column_mappings[&CanonicalField::MarketValue], "Position Value");
    }

    #[test]
    fn test_partial_match_falls_back_to_generic() {
        let headers = hdrs(&["Symbol", "Quantity"]);
        let schwab = custodians::get_by_key("schwab").unwrap();
        assert_eq!(detect_with(schwab, &headers).confidence, 40);

        let d = detect(&headers);
        assert_eq!(d.custodian, CUSTOM_FORMAT);
        assert_eq!(d.confidence, 30);
        assert_eq!(d.column_mappings[&CanonicalField::Symbol], "Symbol");
        assert_eq!(d.column_mappings[&CanonicalField::Shares], "Quantity");
    }

    #[test]
    fn test_match_is_case_insensitive_and_trimmed() {
        let d = detect(&hdrs(&[" SYMBOL ", "quantity", "price"]));
        assert_eq!(d.custodian, "Charles Schwab");
        assert_eq!(d.confidence, 60);
        // Resolved mapping keeps the file's own header text.
        assert_eq!(d.column_mappings[&CanonicalField::Symbol], "SYMBOL");
    }

    #[test]
    fn test_fidelity_detected() {
        let d = detect(&hdrs(&[
            "Account Number",
            "Symbol",
            "Description",
            "Quantity",
            "Last Price",
            "Current Value",
            "Cost Basis Total",
        ]));
        assert_eq!(d.custodian, "Fidelity");
        assert_eq!(d.confidence, 100);
        assert_eq!(d.column_mappings[&CanonicalField::Price], "Last Price");
        assert_eq!(d.column_mappings[&CanonicalField::CostBasis], "Cost Basis Total");
    }

    #[test]
    fn test_etrade_detected() {
        let d = detect(&hdrs(&["Symbol", "Last Price $", "Qty #", "Value $", "Total Gain $"]));
        assert_eq!(d.custodian, "E*TRADE");
        // 60 required + 2 of 3 optional.
        assert_eq!(d.confidence, 87);
        assert_eq!(d.average_cost_column, None);
    }

    #[test]
    fn test_per_share_cost_column_resolved() {
        let d = detect(&hdrs(&["Symbol", "Qty #", "Price Paid $", "Last Price $", "Value $"]));
        assert_eq!(d.custodian, "E*TRADE");
        assert_eq!(d.average_cost_column.as_deref(), Some("Price Paid $"));
        assert!(!d.column_mappings.contains_key(&CanonicalField::CostBasis));

        let td = custodians::get_by_key("td").unwrap();
        let d = detect_with(td, &hdrs(&["Symbol", "Qty", "average price", "Market Value"]));
        assert_eq!(d.average_cost_column.as_deref(), Some("average price"));

        let schwab = detect(&hdrs(&["Symbol", "Quantity", "Price", "Price Paid"]));
        assert_eq!(schwab.average_cost_column, None);
    }

    #[test]
    fn test_tie_keeps_registry_order() {
        // Schwab and Fidelity both earn 60 required + 13 for Description.
        let headers = hdrs(&["Symbol", "Quantity", "Description", "Price", "Last Price"]);
        let d = detect(&headers);
        assert_eq!(d.custodian, "Charles Schwab");
        assert_eq!(d.confidence, 73);
        let fidelity = custodians::get_by_key("fidelity").unwrap();
        assert_eq!(detect_with(fidelity, &headers).confidence, 73);
    }

    #[test]
    fn test_no_match_yields_empty_custom_format() {
        let d = detect(&hdrs(&["Foo", "Bar"]));
        assert_eq!(d.custodian, CUSTOM_FORMAT);
        assert_eq!(d.confidence, 0);
        assert!(d.column_mappings.is_empty());

        let empty = detect(&[]);
        assert_eq!(empty.confidence, 0);
        assert!(empty.column_mappings.is_empty());
    }

    #[test]
    fn test_generic_caps_at_65() {
        let d = detect_generic(&hdrs(&[
            "Ticker",
            "Security Name",
            "Units",
            "Close",
            "Mkt Val",
            "Book Cost",
        ]));
        assert_eq!(d.column_mappings.len(), 6);
        assert_eq!(d.confidence, 65);
        assert_eq!(d.column_mappings[&CanonicalField::Description], "Security Name");
        assert_eq!(d.column_mappings[&CanonicalField::CostBasis], "Book Cost");
    }

    #[test]
    fn test_generic_does_not_reuse_a_header() {
        // "Security Name" would satisfy both symbol and description keywords.
        let d = detect_generic(&hdrs(&["Security Name", "Shares"]));
        assert_eq!(d.column_mappings[&CanonicalField::Symbol], "Security Name");
        assert!(!d.column_mappings.contains_key(&CanonicalField::Description));
        assert_eq!(d.confidence, 30);
    }

    #[test]
    fn test_adding_required_header_never_lowers_confidence() {
        let schwab = custodians::get_by_key("schwab").unwrap();
        let mut headers = hdrs(&["Description", "Cost Basis"]);
        let mut last = detect_with(schwab, &headers).confidence;
        for extra in ["Symbol", "Quantity", "Price"] {
            headers.push(extra.to_string());
            let next = detect_with(schwab, &headers).confidence;
            assert!(next >= last, "{extra}: {next} < {last}");
            last = next;
        }
        while headers.pop().is_some() {
            let next = detect_with(schwab, &headers).confidence;
            assert!(next <= last);
            last = next;
        }
    }

    #[test]
    fn test_mappings_always_present() {
        for headers in [hdrs(&[]), hdrs(&["x"]), hdrs(&["Symbol", "Qty #", "Last Price $"])] {
            let d = detect(&headers);
            assert!(d.confidence <= 100);
            // Serialized form always carries the key.
            let json = serde_json::to_value(&d).unwrap();
            assert!(json["columnMappings"].is_object());
        }
    }

    #[test]
    fn test_user_mapped_detection() {
        let headers = hdrs(&["Ticker", "Units", "Last"]);
        let mut mapping = ColumnMapping::new();
        mapping.insert(CanonicalField::Symbol, 0);
        mapping.insert(CanonicalField::Shares, 1);
        let d = user_mapped(&headers, &mapping);
        assert_eq!(d.custodian, CUSTOM_FORMAT);
        assert_eq!(d.confidence, 100);
        assert_eq!(d.format, "User Mapped");
        assert_eq!(d.column_mappings[&CanonicalField::Shares], "Units");
        assert!(!d.column_mappings.contains_key(&CanonicalField::Price));
        assert_eq!(d.average_cost_column, None);

        mapping.set_average_cost(2);
        let d = user_mapped(&headers, &mapping);
        assert_eq!(d.average_cost_column.as_deref(), Some("Last"));
    }

    #[test]
    fn test_needs_manual_mapping() {
        let full = detect(&hdrs(&["Symbol", "Description", "Quantity", "Price"]));
        assert_eq!(full.confidence, 73);
        assert!(!needs_manual_mapping(&full, 70));
        assert!(needs_manual_mapping(&full, 80));

        let generic = detect(&hdrs(&["Ticker", "Shares", "Close", "Value"]));
        assert!(generic.is_custom());
        assert!(needs_manual_mapping(&generic, 0));
    }
}
