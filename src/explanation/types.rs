use serde::{Deserialize, Serialize};

/// Audit trail of one batch's score
///
/// Every number a reviewer needs to recompute the total by hand: each
/// indicator's contribution to its dimension score and each dimension's
/// contribution to the total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationTrace {
    pub dimension_calculations: Vec<DimensionCalculation>,
    pub total_score_calculation: Vec<DimensionContribution>,
    pub total_score: f64,
}

/// Dimension score = Σ contribution / Σ entropy weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionCalculation {
    pub dimension_code: String,
    pub dimension_name: String,
    pub ahp_weight: f64,
    pub dimension_score: f64,
    pub indicators: Vec<IndicatorContribution>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorContribution {
    pub code: String,
    pub name: String,
    /// None when the cell (or the whole column) was missing
    pub raw_value: Option<f64>,
    pub normalized_value: f64,
    /// Value entering the dimension average: the normalized value for the
    /// additive method, the defuzzified membership for fuzzy and grey
    pub indicator_score: f64,
    pub entropy_weight: f64,
    pub final_weight: f64,
    /// indicator_score × entropy_weight
    pub contribution: f64,
}

/// Total score = Σ contribution over dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionContribution {
    pub dimension_code: String,
    pub dimension_name: String,
    pub ahp_weight: f64,
    pub dimension_score: f64,
    /// ahp_weight × dimension_score
    pub contribution: f64,
}

impl CalculationTrace {
    /// Total recomputed from the dimension contributions
    pub fn recomputed_total(&self) -> f64 {
        self.total_score_calculation.iter().map(|c| c.contribution).sum()
    }
}

impl DimensionCalculation {
    /// Dimension score recomputed from the indicator contributions
    pub fn recomputed_score(&self) -> f64 {
        let weight_sum: f64 = self.indicators.iter().map(|i| i.entropy_weight).sum();
        let contribution_sum: f64 = self.indicators.iter().map(|i| i.contribution).sum();
        if weight_sum > 0.0 {
            contribution_sum / weight_sum
        } else {
            0.0
        }
    }
}
