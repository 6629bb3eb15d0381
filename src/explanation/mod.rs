pub mod types;
pub mod generator;
pub mod formatters;

pub use types::{CalculationTrace, DimensionCalculation, DimensionContribution, IndicatorContribution};

pub use generator::TraceGenerator;
pub use formatters::JsonFormatter;
