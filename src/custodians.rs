use crate::models::CanonicalField::{self, *};

/// Header signature of one brokerage's positions export.
#[derive(Debug)]
pub struct CustodianPattern {
    pub key: &'static str,
    pub name: &'static str,
    pub format: &'static str,
    /// Strong indicators; share 60 points between them.
    pub required_headers: &'static [&'static str],
    /// Weak indicators; share 40 points between them.
    pub optional_headers: &'static [&'static str],
    /// Field -> header synonyms, most specific first.
    pub column_mappings: &'static [(CanonicalField, &'static [&'static str])],
    /// Per-share cost headers; cost basis is derived from these when no
    /// total cost column is present.
    pub average_cost_headers: &'static [&'static str],
}

impl CustodianPattern {
    pub fn synonyms(&self, field: CanonicalField) -> &'static [&'static str] {
        self.column_mappings
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, names)| *names)
            .unwrap_or(&[])
    }
}

const SCHWAB: CustodianPattern = CustodianPattern {
    key: "schwab",
    name: "Charles Schwab",
    format: "Schwab positions export",
    required_headers: &["Symbol", "Quantity", "Price"],
    optional_headers: &["Description", "Position Value", "Cost Basis"],
    column_mappings: &[
        (Symbol, &["Symbol"]),
        (Description, &["Description"]),
        (Shares, &["Quantity", "Qty (Quantity)"]),
        (Price, &["Price"]),
        (MarketValue, &["Position Value", "Market Value", "Mkt Val (Market Value)"]),
        (CostBasis, &["Cost Basis"]),
    ],
    average_cost_headers: &[],
};

const FIDELITY: CustodianPattern = CustodianPattern {
    key: "fidelity",
    name: "Fidelity",
    format: "Fidelity portfolio positions export",
    required_headers: &["Symbol", "Quantity", "Last Price"],
    optional_headers: &["Description", "Current Value", "Cost Basis Total"],
    column_mappings: &[
        (Symbol, &["Symbol"]),
        (Description, &["Description"]),
        (Shares, &["Quantity"]),
        (Price, &["Last Price"]),
        (MarketValue, &["Current Value"]),
        (CostBasis, &["Cost Basis Total", "Cost Basis"]),
    ],
    average_cost_headers: &[],
};

const TD_AMERITRADE: CustodianPattern = CustodianPattern {
    key: "td",
    name: "TD Ameritrade",
    format: "TD Ameritrade position statement",
    required_headers: &["Symbol", "Qty", "Market Value"],
    optional_headers: &["Description", "Mark", "Cost"],
    column_mappings: &[
        (Symbol, &["Symbol"]),
        (Description, &["Description"]),
        (Shares, &["Qty", "Quantity"]),
        (Price, &["Mark", "Last"]),
        (MarketValue, &["Market Value"]),
        (CostBasis, &["Cost", "Cost Basis"]),
    ],
    average_cost_headers: &["Average Price", "Avg Price"],
};

const INTERACTIVE_BROKERS: CustodianPattern = CustodianPattern {
    key: "ibkr",
    name: "Interactive Brokers",
    format: "IBKR portfolio export",
    required_headers: &["Symbol", "Position", "Market Price"],
    optional_headers: &["Financial Instrument Description", "Market Value", "Cost Basis"],
    column_mappings: &[
        (Symbol, &["Symbol"]),
        (Description, &["Financial Instrument Description", "Description"]),
        (Shares, &["Position"]),
        (Price, &["Market Price", "Last"]),
        (MarketValue, &["Market Value"]),
        (CostBasis, &["Cost Basis"]),
    ],
    average_cost_headers: &[],
};

const ETRADE: CustodianPattern = CustodianPattern {
    key: "etrade",
    name: "E*TRADE",
    format: "E*TRADE portfolio download",
    required_headers: &["Symbol", "Qty #", "Last Price $"],
    optional_headers: &["Value $", "Price Paid $", "Total Gain $"],
    column_mappings: &[
        (Symbol, &["Symbol"]),
        (Shares, &["Qty #", "Quantity"]),
        (Price, &["Last Price $", "Last Price"]),
        (MarketValue, &["Value $", "Value"]),
        (CostBasis, &["Total Cost $", "Cost Basis"]),
    ],
    average_cost_headers: &["Price Paid $", "Price Paid"],
};

/// Registry order doubles as tie-break priority.
const ALL_CUSTODIANS: &[CustodianPattern] = &[
    SCHWAB,
    FIDELITY,
    TD_AMERITRADE,
    INTERACTIVE_BROKERS,
    ETRADE,
];

pub fn all() -> &'static [CustodianPattern] {
    ALL_CUSTODIANS
}

pub fn get_by_key(key: &str) -> Option<&'static CustodianPattern> {
    ALL_CUSTODIANS
        .iter()
        .find(|p| p.key.eq_ignore_ascii_case(key.trim()))
}
