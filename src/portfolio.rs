use serde::Serialize;

use crate::models::Holding;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    #[serde(flatten)]
    pub holding: Holding,
    pub name: String,
    pub average_cost: Option<f64>,
    pub weight: f64,
    pub unrealized_gain: Option<f64>,
    pub unrealized_gain_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub positions: Vec<Position>,
    pub total_value: f64,
    /// Sum over positions that report a cost basis.
    pub total_cost: f64,
    pub total_gain: f64,
    pub total_gain_pct: Option<f64>,
}

impl Portfolio {
    pub fn from_holdings(holdings: &[Holding]) -> Self {
        let total_value: f64 = holdings.iter().map(|h| h.market_value).sum();
        let positions: Vec<Position> = holdings
            .iter()
            .map(|h| Position {
                holding: h.clone(),
                name: h.name().to_string(),
                average_cost: h.average_cost(),
                weight: if total_value != 0.0 && total_value.is_finite() {
                    h.market_value / total_value
                } else {
                    0.0
                },
                unrealized_gain: h.unrealized_gain(),
                unrealized_gain_pct: h.unrealized_gain_pct(),
            })
            .collect();

        let total_cost: f64 = holdings.iter().filter_map(|h| h.cost_basis).sum();
        let total_gain: f64 = positions.iter().filter_map(|p| p.unrealized_gain).sum();
        let total_gain_pct = (total_cost != 0.0).then(|| total_gain / total_cost * 100.0);

        Self {
            positions,
            total_value,
            total_cost,
            total_gain,
            total_gain_pct,
        }
    }

    pub fn largest_position(&self) -> Option<&Position> {
        self.positions
            .iter()
            .max_by(|a, b| a.weight.total_cmp(&b.weight))
    }

    /// Combined weight of the `n` largest positions.
    pub fn top_weight(&self, n: usize) -> f64 {
        let mut weights: Vec<f64> = self.positions.iter().map(|p| p.weight).collect();
        weights.sort_by(|a, b| b.total_cmp(a));
        weights.iter().take(n).sum()
    }
}
