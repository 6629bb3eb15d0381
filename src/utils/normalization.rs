//! Normalization Utilities
//!
//! Maps raw indicator values onto a common 0-100 scale where 100 is always
//! the best value.
//!
//! Two modes:
//! - `LogMinMax`: population-relative min-max scaling, with a `-log10(v + 1e-10)`
//!   pre-transform for indicators spanning several orders of magnitude
//! - `StandardsBased`: fixed absolute rating curves for delay, packet loss and
//!   bit error rate; plain min-max for everything else

use crate::data::RawBatchTable;
use crate::schema::{Direction, IndicatorDefinition, IndicatorSchema, ValueTransform};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Score assigned when a column carries no discriminating signal
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Offset added before the logarithmic transform
const LOG_EPSILON: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationMode {
    #[default]
    LogMinMax,
    StandardsBased,
}

/// Absolute rating curves anchored to telecom quality thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardCurve {
    /// One-way delay in milliseconds (G.114 bands)
    TransmissionDelay,
    /// Packet loss ratio in [0, 1] (Y.1541 bands)
    PacketLoss,
    /// Bit error rate, rated on its base-10 logarithm (IMT-2000 bands)
    BitErrorRate,
}

const DELAY_POINTS: [(f64, f64); 6] = [
    (0.0, 100.0),
    (100.0, 90.0),
    (150.0, 70.0),
    (300.0, 40.0),
    (400.0, 20.0),
    (600.0, 0.0),
];

const PLR_POINTS: [(f64, f64); 6] = [
    (0.0, 100.0),
    (0.005, 90.0),
    (0.02, 70.0),
    (0.05, 40.0),
    (0.10, 20.0),
    (0.20, 0.0),
];

// x = log10(BER)
const BER_POINTS: [(f64, f64); 6] = [
    (-8.0, 100.0),
    (-7.0, 95.0),
    (-5.0, 80.0),
    (-4.0, 70.0),
    (-3.0, 60.0),
    (-2.0, 30.0),
];

impl StandardCurve {
    /// Rate a raw value on the curve, 0-100
    pub fn rate(&self, raw: f64) -> f64 {
        if raw <= 0.0 {
            return 100.0;
        }
        match self {
            StandardCurve::TransmissionDelay => interpolate(raw, &DELAY_POINTS),
            StandardCurve::PacketLoss => interpolate(raw, &PLR_POINTS),
            StandardCurve::BitErrorRate => {
                let log_ber = raw.log10();
                // Unusable above 1e-2: the curve drops from 30 straight to 0
                if log_ber > -2.0 {
                    0.0
                } else {
                    interpolate(log_ber, &BER_POINTS)
                }
            }
        }
    }
}

/// Piecewise linear interpolation over ascending breakpoints
///
/// Values outside the breakpoint range take the nearest end score.
fn interpolate(x: f64, points: &[(f64, f64)]) -> f64 {
    let (first_x, first_y) = points[0];
    let (last_x, last_y) = points[points.len() - 1];

    if x <= first_x {
        return first_y;
    }
    if x >= last_x {
        return last_y;
    }

    for window in points.windows(2) {
        let (x0, y0) = window[0];
        let (x1, y1) = window[1];
        if x0 <= x && x <= x1 {
            let fraction = if x1 - x0 > 0.0 { (x - x0) / (x1 - x0) } else { 0.0 };
            return y0 + fraction * (y1 - y0);
        }
    }

    last_y
}

/// Per-indicator normalizer
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    mode: NormalizationMode,
}

impl Normalizer {
    pub fn new(mode: NormalizationMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> NormalizationMode {
        self.mode
    }

    /// Normalize one indicator's column across all batches
    ///
    /// Null (or non-finite) cells are excluded from min/max and score 50.
    /// All-null and zero-variance columns score 50 everywhere.
    pub fn normalize(&self, series: &[Option<f64>], indicator: &IndicatorDefinition) -> Vec<f64> {
        let n = series.len();

        if self.mode == NormalizationMode::StandardsBased {
            if let Some(curve) = indicator.standard_curve {
                return series
                    .iter()
                    .map(|v| v.filter(|x| x.is_finite()).map_or(NEUTRAL_SCORE, |x| curve.rate(x)))
                    .collect();
            }
        }

        let log_transform = self.mode == NormalizationMode::LogMinMax
            && indicator.transform == ValueTransform::Logarithmic;

        let values: Vec<Option<f64>> = series
            .iter()
            .map(|v| {
                let v = (*v)?;
                let v = if log_transform { -(v + LOG_EPSILON).log10() } else { v };
                v.is_finite().then_some(v)
            })
            .collect();

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in values.iter().flatten() {
            min = min.min(*v);
            max = max.max(*v);
        }

        if min > max {
            return vec![NEUTRAL_SCORE; n];
        }
        let range = max - min;
        if range <= 0.0 {
            debug!("{}: zero variance across {} batches, scoring neutral", indicator.code, n);
            return vec![NEUTRAL_SCORE; n];
        }

        // -log10 reverses the raw ordering, so the declared direction flips
        let direction = match (log_transform, indicator.direction) {
            (true, Direction::Min) => Direction::Max,
            (true, Direction::Max) => Direction::Min,
            (false, direction) => direction,
        };

        values
            .iter()
            .map(|v| match v {
                None => NEUTRAL_SCORE,
                Some(x) => match direction {
                    Direction::Max => (x - min) / range * 100.0,
                    Direction::Min => (max - x) / range * 100.0,
                },
            })
            .collect()
    }

    /// Normalize every schema indicator of a raw table
    ///
    /// Missing columns are filled with the neutral score and logged.
    pub fn normalize_table(&self, table: &RawBatchTable, schema: &IndicatorSchema) -> NormalizedTable {
        let n = table.len();
        let mut missing = Vec::new();

        let dimensions = schema
            .dimensions()
            .iter()
            .map(|dim| {
                dim.indicators
                    .iter()
                    .map(|ind| match table.column(&ind.code) {
                        Some(series) => {
                            let nulls = series.iter().filter(|v| v.is_none()).count();
                            if nulls > 0 && nulls < n {
                                warn!("{}: {} of {} cells are null, scoring them neutral", ind.code, nulls, n);
                            }
                            let non_finite = series.iter().flatten().filter(|x| !x.is_finite()).count();
                            if non_finite > 0 {
                                warn!("{}: {} non-finite values, scoring them neutral", ind.code, non_finite);
                            }
                            self.normalize(&series, ind)
                        }
                        None => {
                            warn!("Indicator column '{}' missing from raw table, using neutral score {}", ind.code, NEUTRAL_SCORE);
                            missing.push(ind.code.clone());
                            vec![NEUTRAL_SCORE; n]
                        }
                    })
                    .collect()
            })
            .collect();

        NormalizedTable {
            n_samples: n,
            dimensions,
            missing,
        }
    }
}

/// Normalized values in schema order: dimension → indicator → batch
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    n_samples: usize,
    dimensions: Vec<Vec<Vec<f64>>>,
    missing: Vec<String>,
}

impl NormalizedTable {
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Indicator columns of one dimension
    pub fn dimension(&self, dim_idx: usize) -> &[Vec<f64>] {
        &self.dimensions[dim_idx]
    }

    pub fn value(&self, dim_idx: usize, ind_idx: usize, sample: usize) -> f64 {
        self.dimensions[dim_idx][ind_idx][sample]
    }

    /// Indicator codes absent from the raw table
    pub fn missing_indicators(&self) -> &[String] {
        &self.missing
    }
}
