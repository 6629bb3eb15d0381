//! Data Loading and Management
//!
//! Holds the raw batch table handed over by the extraction layer: one row per
//! test batch with one raw value per indicator code. Loads from CSV, parquet
//! or an in-memory polars DataFrame.

use crate::schema::IndicatorSchema;
use crate::utils::lazy_helpers::materialize_available_columns;
use anyhow::{Context, Result};
use polars::prelude::*;
use rustc_hash::FxHashMap;
use std::path::Path;
use tracing::{info, warn};

pub const TEST_ID_COLUMN: &str = "test_id";
pub const SCENARIO_ID_COLUMN: &str = "scenario_id";
pub const TOTAL_COMMUNICATIONS_COLUMN: &str = "total_communications";
pub const TOTAL_LIFECYCLES_COLUMN: &str = "total_lifecycles";

/// Fill values the extraction layer applies to null aggregates
///
/// A batch without availability samples counts as fully available; without
/// recovery or crash events it has zero recovery time and zero crash rate.
pub const EXTRACTION_DEFAULTS: [(&str, f64); 3] = [
    ("RL_communication_availability_rate", 1.0),
    ("RL_recovery_duration_ms", 0.0),
    ("RL_crash_rate", 0.0),
];

/// One test batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawBatchRecord {
    pub test_id: String,
    pub scenario_id: Option<String>,
    /// Indicator code → raw value (None for a null cell)
    pub values: FxHashMap<String, Option<f64>>,
    pub total_communications: Option<i64>,
    pub total_lifecycles: Option<i64>,
}

impl RawBatchRecord {
    pub fn new(test_id: impl Into<String>) -> Self {
        Self {
            test_id: test_id.into(),
            ..Default::default()
        }
    }

    pub fn with_scenario(mut self, scenario_id: impl Into<String>) -> Self {
        self.scenario_id = Some(scenario_id.into());
        self
    }

    pub fn with_value(mut self, code: &str, value: f64) -> Self {
        self.values.insert(code.to_string(), Some(value));
        self
    }

    pub fn with_null(mut self, code: &str) -> Self {
        self.values.insert(code.to_string(), None);
        self
    }

    pub fn value(&self, code: &str) -> Option<f64> {
        self.values.get(code).copied().flatten()
    }
}

/// Raw indicator table, rows in extraction order
#[derive(Debug, Clone, Default)]
pub struct RawBatchTable {
    records: Vec<RawBatchRecord>,
    /// Indicator columns present in the source
    columns: Vec<String>,
}

impl RawBatchTable {
    /// Build from records; a column is present if any record carries it
    pub fn from_records(records: Vec<RawBatchRecord>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            for code in record.values.keys() {
                if !columns.contains(code) {
                    columns.push(code.clone());
                }
            }
        }
        columns.sort();
        Self { records, columns }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[RawBatchRecord] {
        &self.records
    }

    pub fn has_column(&self, code: &str) -> bool {
        self.columns.iter().any(|c| c == code)
    }

    /// One indicator's values across all batches, None if the column is absent
    pub fn column(&self, code: &str) -> Option<Vec<Option<f64>>> {
        if !self.has_column(code) {
            return None;
        }
        Some(self.records.iter().map(|r| r.value(code)).collect())
    }

    /// Fill null cells of present columns with the extraction-layer defaults
    ///
    /// Returns the number of cells filled.
    pub fn apply_extraction_defaults(&mut self) -> usize {
        let mut filled = 0;
        for (code, default) in EXTRACTION_DEFAULTS {
            if !self.has_column(code) {
                continue;
            }
            for record in &mut self.records {
                let cell = record.values.entry(code.to_string()).or_insert(None);
                if cell.is_none() {
                    *cell = Some(default);
                    filled += 1;
                }
            }
        }
        if filled > 0 {
            info!("Applied extraction defaults to {} null cells", filled);
        }
        filled
    }

    /// Build from a DataFrame holding `test_id`, optional `scenario_id`,
    /// auxiliary counts and indicator columns
    pub fn from_dataframe(df: DataFrame, schema: &IndicatorSchema) -> Result<Self> {
        Self::from_lazy(df.lazy(), schema, "raw batch table")
    }

    /// Load from a CSV file with a header row
    pub fn load_csv(path: &Path, schema: &IndicatorSchema) -> Result<Self> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.into()))
            .with_context(|| format!("Failed to create CSV reader: {:?}", path))?
            .finish()
            .with_context(|| format!("Failed to load raw batch CSV: {:?}", path))?;

        Self::from_lazy(df.lazy(), schema, &path.display().to_string())
    }

    /// Load from a parquet file
    pub fn load_parquet(path: &Path, schema: &IndicatorSchema) -> Result<Self> {
        let lazy = LazyFrame::scan_parquet(path, Default::default())
            .with_context(|| format!("Failed to scan parquet: {:?}", path))?;

        Self::from_lazy(lazy, schema, &path.display().to_string())
    }

    /// Load by file extension (`.parquet`, otherwise CSV)
    pub fn load(path: &Path, schema: &IndicatorSchema) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("parquet") => Self::load_parquet(path, schema),
            _ => Self::load_csv(path, schema),
        }
    }

    fn from_lazy(lazy: LazyFrame, schema: &IndicatorSchema, context: &str) -> Result<Self> {
        let indicator_codes: Vec<&str> = schema.indicators().map(|ind| ind.code.as_str()).collect();

        let mut optional = indicator_codes.clone();
        optional.extend([TOTAL_COMMUNICATIONS_COLUMN, TOTAL_LIFECYCLES_COLUMN]);

        // scenario_id is carried when present but never required
        let (df, missing) = {
            let mut lazy = lazy;
            let has_scenario = lazy
                .collect_schema()
                .with_context(|| format!("{}: Failed to resolve schema", context))?
                .get(SCENARIO_ID_COLUMN)
                .is_some();
            let required: &[&str] = if has_scenario {
                &[TEST_ID_COLUMN, SCENARIO_ID_COLUMN]
            } else {
                &[TEST_ID_COLUMN]
            };
            materialize_available_columns(lazy, required, &optional, context)?
        };

        for code in &missing {
            if indicator_codes.contains(&code.as_str()) {
                warn!("{}: indicator column '{}' not found", context, code);
            }
        }

        let test_ids = df.column(TEST_ID_COLUMN)?.str()?;
        let scenario_ids = match df.column(SCENARIO_ID_COLUMN) {
            Ok(column) => Some(column.str()?.clone()),
            Err(_) => None,
        };

        let present: Vec<&str> = indicator_codes
            .iter()
            .copied()
            .filter(|code| !missing.iter().any(|m| m == code))
            .collect();

        let mut value_columns = Vec::with_capacity(present.len());
        for &code in &present {
            let values = df
                .column(code)
                .with_context(|| format!("Column '{}' not found", code))?
                .f64()
                .with_context(|| format!("Column '{}' is not numeric", code))?
                .clone();
            value_columns.push((code, values));
        }

        let count_column = |name: &str| -> Option<Float64Chunked> {
            df.column(name).ok().and_then(|c| c.f64().ok().cloned())
        };
        let communications = count_column(TOTAL_COMMUNICATIONS_COLUMN);
        let lifecycles = count_column(TOTAL_LIFECYCLES_COLUMN);

        let mut records = Vec::with_capacity(df.height());
        for idx in 0..df.height() {
            let Some(test_id) = test_ids.get(idx) else {
                warn!("{}: row {} has no test_id, skipping", context, idx);
                continue;
            };

            let mut values = FxHashMap::default();
            for (code, column) in &value_columns {
                values.insert(code.to_string(), column.get(idx));
            }

            records.push(RawBatchRecord {
                test_id: test_id.to_string(),
                scenario_id: scenario_ids
                    .as_ref()
                    .and_then(|s| s.get(idx))
                    .map(|s| s.to_string()),
                values,
                total_communications: communications.as_ref().and_then(|c| c.get(idx)).map(|v| v as i64),
                total_lifecycles: lifecycles.as_ref().and_then(|c| c.get(idx)).map(|v| v as i64),
            });
        }

        info!("{}: loaded {} batches, {} of {} indicator columns", context, records.len(), present.len(), indicator_codes.len());

        Ok(Self {
            records,
            columns: present.into_iter().map(String::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_dataframe() {
        let df = df![
            "test_id" => &["T1", "T2"],
            "scenario_id" => &["S1", "S1"],
            "RL_crash_rate" => &[Some(0.1), None],
            "AJ_avg_sinr" => &[10.0, 20.0],
            "total_communications" => &[120i64, 80],
        ]
        .unwrap();

        let schema = IndicatorSchema::default();
        let table = RawBatchTable::from_dataframe(df, &schema).unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.has_column("RL_crash_rate"));
        assert!(!table.has_column("EF_avg_ber"));
        assert_eq!(table.column("RL_crash_rate").unwrap(), vec![Some(0.1), None]);
        assert!(table.column("EF_avg_ber").is_none());

        let first = &table.records()[0];
        assert_eq!(first.test_id, "T1");
        assert_eq!(first.scenario_id.as_deref(), Some("S1"));
        assert_eq!(first.total_communications, Some(120));
        assert_eq!(first.total_lifecycles, None);
    }

    #[test]
    fn test_from_dataframe_without_scenario() {
        let df = df![
            "test_id" => &["T1"],
            "PO_spectral_efficiency" => &[3.5],
        ]
        .unwrap();

        let table = RawBatchTable::from_dataframe(df, &IndicatorSchema::default()).unwrap();
        assert_eq!(table.records()[0].scenario_id, None);
    }

    #[test]
    fn test_from_dataframe_requires_test_id() {
        let df = df![
            "scenario_id" => &["S1"],
        ]
        .unwrap();

        assert!(RawBatchTable::from_dataframe(df, &IndicatorSchema::default()).is_err());
    }

    #[test]
    fn test_extraction_defaults_fill_present_columns_only() {
        let mut table = RawBatchTable::from_records(vec![
            RawBatchRecord::new("T1")
                .with_null("RL_crash_rate")
                .with_null("RL_communication_availability_rate")
                .with_null("AJ_avg_sinr"),
            RawBatchRecord::new("T2")
                .with_value("RL_crash_rate", 0.2)
                .with_value("RL_communication_availability_rate", 0.9)
                .with_value("AJ_avg_sinr", 11.0),
        ]);

        let filled = table.apply_extraction_defaults();

        assert_eq!(filled, 2);
        assert_eq!(table.records()[0].value("RL_crash_rate"), Some(0.0));
        assert_eq!(table.records()[0].value("RL_communication_availability_rate"), Some(1.0));
        assert_eq!(table.records()[0].value("AJ_avg_sinr"), None);
        assert!(!table.has_column("RL_recovery_duration_ms"));
    }

    #[test]
    fn test_from_records_columns() {
        let table = RawBatchTable::from_records(vec![
            RawBatchRecord::new("T1").with_value("B", 1.0),
            RawBatchRecord::new("T2").with_value("A", 2.0),
        ]);
        assert!(table.has_column("A"));
        assert!(table.has_column("B"));
        assert_eq!(table.column("A").unwrap(), vec![None, Some(2.0)]);
    }

    #[test]
    #[ignore] // Requires data files to be present
    fn test_load_csv() {
        let table = RawBatchTable::load_csv(Path::new("data/batches.csv"), &IndicatorSchema::default())
            .expect("Failed to load data");
        assert!(!table.is_empty());
    }
}
