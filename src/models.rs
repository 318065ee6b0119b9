use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{FolioError, Result};

pub const CUSTOM_FORMAT: &str = "Custom Format";

/// Holding attributes every custodian's columns are mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CanonicalField {
    Symbol,
    Description,
    Shares,
    Price,
    MarketValue,
    CostBasis,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 6] = [
        Self::Symbol,
        Self::Description,
        Self::Shares,
        Self::Price,
        Self::MarketValue,
        Self::CostBasis,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Symbol => "symbol",
            Self::Description => "description",
            Self::Shares => "shares",
            Self::Price => "price",
            Self::MarketValue => "marketValue",
            Self::CostBasis => "costBasis",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Symbol => "Symbol",
            Self::Description => "Description",
            Self::Shares => "Shares",
            Self::Price => "Price",
            Self::MarketValue => "Market Value",
            Self::CostBasis => "Cost Basis",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for CanonicalField {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_field_name(s).as_str() {
            "symbol" | "ticker" => Ok(Self::Symbol),
            "description" | "name" => Ok(Self::Description),
            "shares" | "quantity" | "qty" => Ok(Self::Shares),
            "price" => Ok(Self::Price),
            "marketvalue" | "value" => Ok(Self::MarketValue),
            "costbasis" | "cost" => Ok(Self::CostBasis),
            _ => Err(FolioError::UnknownField(s.to_string())),
        }
    }
}

fn normalize_field_name(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .collect::<String>()
        .to_lowercase()
}

/// Names accepted for a per-share cost column in `--map`.
pub fn is_average_cost_name(s: &str) -> bool {
    matches!(
        normalize_field_name(s).as_str(),
        "averagecost" | "avgcost" | "averageprice" | "pricepaid"
    )
}

/// Result of matching one file's header row against the custodian registry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustodianDetection {
    pub custodian: String,
    pub confidence: u8,
    pub format: String,
    /// Field -> header text as it appears in this file.
    pub column_mappings: BTreeMap<CanonicalField, String>,
    /// Per-share cost header, used to derive cost basis when no total exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_cost_column: Option<String>,
}

impl CustodianDetection {
    pub fn is_custom(&self) -> bool {
        self.custodian == CUSTOM_FORMAT
    }

    /// Headers not claimed by any canonical field, in file order.
    pub fn unmapped_columns<'a>(&self, headers: &'a [String]) -> Vec<&'a str> {
        headers
            .iter()
            .filter(|h| {
                !self
                    .column_mappings
                    .values()
                    .chain(&self.average_cost_column)
                    .any(|m| m.eq_ignore_ascii_case(h.trim()))
            })
            .map(|h| h.as_str())
            .collect()
    }
}

/// Explicit field -> zero-based column index mapping supplied by the user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMapping {
    columns: BTreeMap<CanonicalField, usize>,
    average_cost: Option<usize>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: CanonicalField, index: usize) {
        // A column feeds one field only; remap instead of duplicating.
        self.columns.retain(|_, i| *i != index);
        if self.average_cost == Some(index) {
            self.average_cost = None;
        }
        self.columns.insert(field, index);
    }

    pub fn set_average_cost(&mut self, index: usize) {
        self.columns.retain(|_, i| *i != index);
        self.average_cost = Some(index);
    }

    pub fn average_cost(&self) -> Option<usize> {
        self.average_cost
    }

    pub fn get(&self, field: CanonicalField) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, usize)> + '_ {
        self.columns.iter().map(|(f, i)| (*f, *i))
    }

    pub fn validate(&self, width: usize) -> Result<()> {
        for required in [CanonicalField::Symbol, CanonicalField::Shares] {
            if self.get(required).is_none() {
                return Err(FolioError::InvalidMapping(format!(
                    "'{required}' must be mapped"
                )));
            }
        }
        if let Some((field, index)) = self.iter().find(|(_, i)| *i >= width) {
            return Err(FolioError::InvalidMapping(format!(
                "'{field}' points at column {index}, but the header row has {width} columns"
            )));
        }
        if let Some(index) = self.average_cost.filter(|i| *i >= width) {
            return Err(FolioError::InvalidMapping(format!(
                "average cost points at column {index}, but the header row has {width} columns"
            )));
        }
        Ok(())
    }
}

/// One canonical position parsed from a data row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub symbol: String,
    pub description: Option<String>,
    pub shares: f64,
    pub price: f64,
    pub market_value: f64,
    pub cost_basis: Option<f64>,
}

impl Holding {
    /// Display name; the symbol stands in for a missing description.
    pub fn name(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.symbol)
    }

    pub fn average_cost(&self) -> Option<f64> {
        self.cost_basis.map(|cost| cost / self.shares)
    }

    pub fn unrealized_gain(&self) -> Option<f64> {
        self.cost_basis.map(|cost| self.market_value - cost)
    }

    pub fn unrealized_gain_pct(&self) -> Option<f64> {
        match self.cost_basis {
            Some(cost) if cost != 0.0 => Some((self.market_value - cost) / cost * 100.0),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RejectReason {
    #[error("expected {expected} fields, found {found}")]
    TooFewFields { expected: usize, found: usize },
    #[error("empty symbol")]
    EmptySymbol,
    #[error("shares not positive")]
    NonPositiveShares,
    #[error("market value out of range")]
    MarketValueOverflow,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowRejection {
    /// 1-based line number in the source text.
    pub line: usize,
    pub reason: RejectReason,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseOutcome {
    pub holdings: Vec<Holding>,
    pub rejections: Vec<RowRejection>,
}

impl ParseOutcome {
    pub fn rows_processed(&self) -> usize {
        self.holdings.len()
    }

    pub fn rows_skipped(&self) -> usize {
        self.rejections.len()
    }
}
