use crate::data::RawBatchRecord;
use crate::explanation::types::*;
use crate::methods::BatchScore;
use crate::schema::IndicatorSchema;
use crate::utils::normalization::NormalizedTable;
use crate::weights::{EntropyWeights, FinalWeights};

/// Builds calculation traces from computed scores
pub struct TraceGenerator<'a> {
    pub schema: &'a IndicatorSchema,
    pub normalized: &'a NormalizedTable,
    pub entropy: &'a EntropyWeights,
    pub final_weights: &'a FinalWeights,
    pub ahp_weights: &'a [f64],
}

impl<'a> TraceGenerator<'a> {
    /// Trace of one batch
    ///
    /// Takes:
    /// - record: raw values of the batch
    /// - sample: row index of the batch in the normalized table
    /// - score: the batch's computed scores
    pub fn generate(&self, record: &RawBatchRecord, sample: usize, score: &BatchScore) -> CalculationTrace {
        let dimension_calculations: Vec<DimensionCalculation> = self
            .schema
            .dimensions()
            .iter()
            .enumerate()
            .map(|(d, dim)| {
                let indicators = dim
                    .indicators
                    .iter()
                    .enumerate()
                    .map(|(i, ind)| {
                        let entropy_weight = self.entropy.get(d, i);
                        let indicator_score = score.indicator_scores[d][i];
                        IndicatorContribution {
                            code: ind.code.clone(),
                            name: ind.display_name.clone(),
                            raw_value: record.value(&ind.code),
                            normalized_value: self.normalized.value(d, i, sample),
                            indicator_score,
                            entropy_weight,
                            final_weight: self.final_weights.get(d, i),
                            contribution: indicator_score * entropy_weight,
                        }
                    })
                    .collect();

                DimensionCalculation {
                    dimension_code: dim.code.clone(),
                    dimension_name: dim.display_name.clone(),
                    ahp_weight: self.ahp_weights[d],
                    dimension_score: score.dimension_scores[d],
                    indicators,
                }
            })
            .collect();

        let total_score_calculation = dimension_calculations
            .iter()
            .map(|calc| DimensionContribution {
                dimension_code: calc.dimension_code.clone(),
                dimension_name: calc.dimension_name.clone(),
                ahp_weight: calc.ahp_weight,
                dimension_score: calc.dimension_score,
                contribution: calc.ahp_weight * calc.dimension_score,
            })
            .collect();

        CalculationTrace {
            dimension_calculations,
            total_score_calculation,
            total_score: score.total_score,
        }
    }
}
