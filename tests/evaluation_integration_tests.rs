// Evaluation Integration Tests
//
// End-to-end checks of the scoring pipeline over hand-built and seeded
// random cohorts.
// Run with: cargo test --test evaluation_integration_tests

use approx::assert_relative_eq;
use comm_effectiveness_rust::methods::{Defuzzification, FuzzyConfig, GreyConfig, WhiteningShape};
use comm_effectiveness_rust::weights::{compute_weights, entropy_weights};
use comm_effectiveness_rust::{
    evaluate_and_store, handle_request, AhpInput, EffectivenessScorer, EvaluationConfig, EvaluationError,
    EvaluationResult, Grade, GradeScale, IndicatorSchema, MemorySink, MethodKind, NormalizationMode,
    PairwiseMatrix, RawBatchRecord, RawBatchTable,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// =========================================================================
// Helpers
// =========================================================================

fn random_cohort(schema: &IndicatorSchema, batches: usize, seed: u64) -> RawBatchTable {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut records = Vec::with_capacity(batches);
    for b in 0..batches {
        let mut record = RawBatchRecord::new(format!("T{:03}", b)).with_scenario(format!("S{}", b % 3));
        for ind in schema.indicators() {
            // Occasional null cells
            if rng.gen_bool(0.05) {
                record = record.with_null(&ind.code);
                continue;
            }
            let value = if ind.probability {
                rng.gen_range(0.0..1.0)
            } else if ind.code == "EF_avg_ber" {
                10f64.powf(rng.gen_range(-8.0..-2.0))
            } else {
                rng.gen_range(1.0..1000.0)
            };
            record = record.with_value(&ind.code, value);
        }
        record.total_communications = Some(rng.gen_range(10..500));
        records.push(record);
    }
    RawBatchTable::from_records(records)
}

fn scorer(method: MethodKind) -> EffectivenessScorer {
    let config = EvaluationConfig {
        method,
        ..Default::default()
    };
    EffectivenessScorer::new(IndicatorSchema::default(), config)
}

fn assert_result_invariants(result: &EvaluationResult) {
    let ahp_sum: f64 = result.dimension_weights.iter().map(|w| w.weight).sum();
    assert_relative_eq!(ahp_sum, 1.0, epsilon = 1e-9);

    let mut final_sum = 0.0;
    for dim in &result.indicator_weights {
        let entropy_sum: f64 = dim.indicators.iter().map(|i| i.entropy_weight).sum();
        assert_relative_eq!(entropy_sum, 1.0, epsilon = 1e-9);
        for ind in &dim.indicators {
            assert!(ind.entropy_weight >= 0.0);
            final_sum += ind.final_weight;
        }
    }
    assert_relative_eq!(final_sum, 1.0, epsilon = 1e-9);

    let n = result.evaluation_results.len();
    assert_eq!(result.evaluation_results[0].rank, 1);
    for pair in result.evaluation_results.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(a.rank <= b.rank);
        assert!(a.total_score >= b.total_score);
        if a.total_score == b.total_score {
            assert_eq!(a.rank, b.rank);
        }
    }

    for batch in &result.evaluation_results {
        assert!(batch.rank >= 1 && batch.rank <= n);
        assert!((0.0..=100.0 + 1e-9).contains(&batch.total_score));
        for score in batch.indicator_scores.values() {
            assert!((0.0..=100.0).contains(score), "indicator score {} out of range", score);
        }
        for score in batch.dimension_scores.values() {
            assert!((0.0..=100.0 + 1e-9).contains(score));
        }
        if let Some(trace) = &batch.calculation {
            assert_relative_eq!(trace.recomputed_total(), batch.total_score, epsilon = 1e-9);
            for dim in &trace.dimension_calculations {
                assert_relative_eq!(dim.recomputed_score(), dim.dimension_score, epsilon = 1e-9);
            }
        }
        if let Some(profile) = &batch.membership {
            let total: f64 = profile.total.iter().sum();
            assert_relative_eq!(total, 1.0, epsilon = 1e-9);
            for vector in &profile.dimensions {
                assert_relative_eq!(vector.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
                assert!(vector.iter().all(|v| *v >= 0.0));
            }
        }
    }
}

// =========================================================================
// Section 1: Normalization
// =========================================================================

#[test]
fn test_normalization_direction() {
    let table = RawBatchTable::from_records(vec![
        RawBatchRecord::new("low")
            .with_value("AJ_avg_sinr", 5.0)
            .with_value("RS_avg_call_setup_duration_ms", 400.0),
        RawBatchRecord::new("mid")
            .with_value("AJ_avg_sinr", 10.0)
            .with_value("RS_avg_call_setup_duration_ms", 200.0),
        RawBatchRecord::new("high")
            .with_value("AJ_avg_sinr", 25.0)
            .with_value("RS_avg_call_setup_duration_ms", 100.0),
    ]);
    let result = scorer(MethodKind::Combination).evaluate(&table, &AhpInput::Default).unwrap();

    let low = result.batch("low").unwrap();
    let high = result.batch("high").unwrap();
    assert_relative_eq!(low.indicator_scores["AJ_avg_sinr"], 0.0);
    assert_relative_eq!(high.indicator_scores["AJ_avg_sinr"], 100.0);
    // Smaller delay is better
    assert_relative_eq!(low.indicator_scores["RS_avg_call_setup_duration_ms"], 0.0);
    assert_relative_eq!(high.indicator_scores["RS_avg_call_setup_duration_ms"], 100.0);
    assert_relative_eq!(result.batch("mid").unwrap().indicator_scores["AJ_avg_sinr"], 25.0);
}

#[test]
fn test_identical_batches_score_neutral() {
    let record = |id: &str| {
        RawBatchRecord::new(id)
            .with_value("RL_communication_success_rate", 0.9)
            .with_value("EF_avg_ber", 1e-5)
    };
    let table = RawBatchTable::from_records(vec![record("A"), record("B"), record("C")]);
    let result = scorer(MethodKind::Combination).evaluate(&table, &AhpInput::Default).unwrap();

    for batch in &result.evaluation_results {
        assert_eq!(batch.rank, 1);
        for score in batch.indicator_scores.values() {
            assert_relative_eq!(*score, 50.0);
        }
        assert_relative_eq!(batch.total_score, 50.0, epsilon = 1e-9);
    }
    assert_result_invariants(&result);
}

#[test]
fn test_ber_log_transform_spreads_small_rates() {
    let table = RawBatchTable::from_records(vec![
        RawBatchRecord::new("A").with_value("EF_avg_ber", 1e-6),
        RawBatchRecord::new("B").with_value("EF_avg_ber", 1e-4),
        RawBatchRecord::new("C").with_value("EF_avg_ber", 1e-2),
    ]);
    let result = scorer(MethodKind::Combination).evaluate(&table, &AhpInput::Default).unwrap();

    assert_relative_eq!(result.batch("A").unwrap().indicator_scores["EF_avg_ber"], 100.0);
    assert_relative_eq!(result.batch("B").unwrap().indicator_scores["EF_avg_ber"], 50.0, epsilon = 0.05);
    assert_relative_eq!(result.batch("C").unwrap().indicator_scores["EF_avg_ber"], 0.0);
}

#[test]
fn test_lower_error_rates_score_higher() {
    let table = RawBatchTable::from_records(vec![
        RawBatchRecord::new("A")
            .with_value("EF_avg_ber", 1e-6)
            .with_value("EF_avg_plr", 1e-4),
        RawBatchRecord::new("B")
            .with_value("EF_avg_ber", 1e-4)
            .with_value("EF_avg_plr", 1e-3),
        RawBatchRecord::new("C")
            .with_value("EF_avg_ber", 1e-2)
            .with_value("EF_avg_plr", 1e-2),
    ]);

    for method in [MethodKind::Combination, MethodKind::Fuzzy, MethodKind::Grey] {
        let result = scorer(method).evaluate(&table, &AhpInput::Default).unwrap();
        let (a, b, c) = (
            result.batch("A").unwrap(),
            result.batch("B").unwrap(),
            result.batch("C").unwrap(),
        );

        for code in ["EF_avg_ber", "EF_avg_plr"] {
            assert!(a.indicator_scores[code] > b.indicator_scores[code], "{} {:?}", code, method);
            assert!(b.indicator_scores[code] > c.indicator_scores[code], "{} {:?}", code, method);
        }
        assert!(a.dimension_scores["EF"] > c.dimension_scores["EF"], "{:?}", method);
        assert!(a.total_score > c.total_score, "{:?}", method);
        assert_eq!(a.rank, 1);
    }
}

#[test]
fn test_non_reciprocal_matrix_rejected() {
    let mut rows = vec![vec![1.0; 8]; 8];
    rows[0][1] = 5.0;
    let table = random_cohort(&IndicatorSchema::default(), 3, 4);
    let err = scorer(MethodKind::Combination)
        .evaluate(&table, &AhpInput::Matrix(rows))
        .unwrap_err();
    assert!(matches!(err, EvaluationError::NotReciprocal { row: 0, col: 1, .. }));
}

#[test]
fn test_standards_based_mode() {
    let config = EvaluationConfig {
        normalization: NormalizationMode::StandardsBased,
        ..Default::default()
    };
    let scorer = EffectivenessScorer::new(IndicatorSchema::default(), config);
    let table = RawBatchTable::from_records(vec![
        RawBatchRecord::new("A")
            .with_value("RS_avg_transmission_delay_ms", 120.0)
            .with_value("EF_avg_ber", 1e-6)
            .with_value("EF_avg_plr", 0.035)
            .with_value("HO_operation_success_rate", 0.8),
        RawBatchRecord::new("B")
            .with_value("RS_avg_transmission_delay_ms", 30.0)
            .with_value("EF_avg_ber", 1e-9)
            .with_value("EF_avg_plr", 0.0)
            .with_value("HO_operation_success_rate", 0.6),
    ]);
    let result = scorer.evaluate(&table, &AhpInput::Default).unwrap();
    assert_eq!(result.normalization, NormalizationMode::StandardsBased);

    let a = result.batch("A").unwrap();
    assert_relative_eq!(a.indicator_scores["RS_avg_transmission_delay_ms"], 82.0, epsilon = 1e-9);
    assert_relative_eq!(a.indicator_scores["EF_avg_ber"], 87.5, epsilon = 1e-9);
    assert_relative_eq!(a.indicator_scores["EF_avg_plr"], 55.0, epsilon = 1e-9);
    // Probability indicators stay population-relative; raw value reported alongside
    assert_relative_eq!(a.indicator_scores["HO_operation_success_rate"], 100.0);
    assert_eq!(a.indicator_raw_values["HO_operation_success_rate"], Some(0.8));

    let b = result.batch("B").unwrap();
    assert_relative_eq!(b.indicator_scores["EF_avg_plr"], 100.0);
}

// =========================================================================
// Section 2: Weights
// =========================================================================

#[test]
fn test_entropy_weights_equal_for_identical_columns() {
    let column = vec![10.0, 40.0, 90.0, 60.0];
    let weights = entropy_weights(&[column.clone(), column.clone(), column]);
    for w in &weights {
        assert_relative_eq!(*w, 1.0 / 3.0, epsilon = 1e-12);
    }
}

#[test]
fn test_default_ahp_weights() {
    let schema = IndicatorSchema::default();
    let matrix = PairwiseMatrix::from_priorities(&schema, &schema.default_priorities()).unwrap();
    let ahp = compute_weights(&matrix);

    assert_relative_eq!(ahp.weights.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    for pair in ahp.weights.windows(2) {
        assert!(pair[0] > pair[1], "weights must follow priority order");
    }
    assert!(ahp.consistency_ratio < 0.10);
    assert_relative_eq!(ahp.weights[0], 0.331325, epsilon = 1e-5);
}

#[test]
fn test_priority_matrix_reciprocity() {
    let schema = IndicatorSchema::default();
    let matrix = PairwiseMatrix::from_priorities(&schema, &schema.default_priorities()).unwrap();
    for i in 0..8 {
        assert_relative_eq!(matrix.get(i, i), 1.0);
        for j in 0..8 {
            assert_relative_eq!(matrix.get(i, j) * matrix.get(j, i), 1.0, epsilon = 1e-12);
        }
    }
    // RL (1) vs RS (8): gap of 7
    assert_relative_eq!(matrix.get(0, 7), 8.0);
    assert_relative_eq!(matrix.get(0, 1), 2.0);
}

#[test]
fn test_inconsistent_matrix_flagged_but_scored() {
    let mut rows = vec![vec![1.0; 8]; 8];
    rows[0][1] = 9.0;
    rows[1][0] = 1.0 / 9.0;
    rows[1][2] = 9.0;
    rows[2][1] = 1.0 / 9.0;
    rows[2][0] = 9.0;
    rows[0][2] = 1.0 / 9.0;

    let table = random_cohort(&IndicatorSchema::default(), 5, 3);
    let result = scorer(MethodKind::Combination)
        .evaluate(&table, &AhpInput::Matrix(rows))
        .unwrap();
    assert!(!result.consistency_passed);
    assert!(result.consistency_ratio >= 0.10);
    assert_eq!(result.evaluation_results.len(), 5);
}

#[test]
fn test_wrong_matrix_order_rejected() {
    let table = random_cohort(&IndicatorSchema::default(), 3, 1);
    let err = scorer(MethodKind::Combination)
        .evaluate(&table, &AhpInput::Matrix(vec![vec![1.0; 3]; 3]))
        .unwrap_err();
    assert!(matches!(err, EvaluationError::DimensionMismatch { expected: 8, actual: 3 }));
}

#[test]
fn test_invalid_priorities_rejected() {
    let schema = IndicatorSchema::default();
    let table = random_cohort(&schema, 3, 1);

    let mut missing = schema.default_priorities();
    missing.remove("RS");
    let mut out_of_range = schema.default_priorities();
    out_of_range.insert("RS".into(), 9);
    let mut unknown = schema.default_priorities();
    unknown.insert("XX".into(), 9);

    for priorities in [missing, out_of_range, unknown] {
        let err = scorer(MethodKind::Combination)
            .evaluate(&table, &AhpInput::Priorities(priorities))
            .unwrap_err();
        assert!(matches!(err, EvaluationError::InvalidPriorities(_)));
    }
}

// =========================================================================
// Section 3: Scoring, grading, ranking
// =========================================================================

#[test]
fn test_crash_rate_end_to_end() {
    let table = RawBatchTable::from_records(vec![
        RawBatchRecord::new("stable")
            .with_value("RL_communication_success_rate", 0.9)
            .with_value("RL_crash_rate", 0.0),
        RawBatchRecord::new("crashy")
            .with_value("RL_communication_success_rate", 0.9)
            .with_value("RL_crash_rate", 0.5),
    ]);

    for method in [MethodKind::Combination, MethodKind::Fuzzy, MethodKind::Grey] {
        let result = scorer(method).evaluate(&table, &AhpInput::Default).unwrap();
        let stable = result.batch("stable").unwrap();
        let crashy = result.batch("crashy").unwrap();

        assert!(stable.dimension_scores["RL"] > crashy.dimension_scores["RL"], "{:?}", method);
        assert!(stable.total_score > crashy.total_score, "{:?}", method);
        assert_eq!(stable.rank, 1);
        assert_eq!(crashy.rank, 2);
    }
}

#[test]
fn test_grade_boundaries() {
    let scale = GradeScale::standard();
    assert_eq!(scale.grade(90.0), Grade::Excellent);
    assert_eq!(scale.grade(89.999), Grade::Good);
    assert_eq!(scale.grade(80.0), Grade::Good);
    assert_eq!(scale.grade(70.0), Grade::Medium);
    assert_eq!(scale.grade(60.0), Grade::Passing);
    assert_eq!(scale.grade(59.999), Grade::Poor);

    let grey = GradeScale::grey();
    assert_eq!(grey.grade(90.0), Grade::Excellent);
    assert_eq!(grey.grade(70.0), Grade::Good);
    assert_eq!(grey.grade(50.0), Grade::Medium);
    assert_eq!(grey.grade(30.0), Grade::Poor);
    assert_eq!(grey.grade(29.9), Grade::VeryPoor);
}

#[test]
fn test_grades_follow_scale() {
    let table = random_cohort(&IndicatorSchema::default(), 40, 11);
    for method in [MethodKind::Combination, MethodKind::Fuzzy, MethodKind::Grey] {
        let s = scorer(method);
        let scale = s.config().grade_scale();
        let result = s.evaluate(&table, &AhpInput::Default).unwrap();
        for batch in &result.evaluation_results {
            assert_eq!(batch.grade, scale.grade(batch.total_score));
        }
    }
}

#[test]
fn test_random_cohorts_hold_invariants() {
    let schema = IndicatorSchema::default();
    for seed in 0..20u64 {
        let mut rng = StdRng::seed_from_u64(seed + 1000);
        let batches = rng.gen_range(1..30);
        let table = random_cohort(&schema, batches, seed);

        for method in [MethodKind::Combination, MethodKind::Fuzzy, MethodKind::Grey] {
            let result = scorer(method).evaluate(&table, &AhpInput::Default).unwrap();
            assert_eq!(result.evaluation_results.len(), batches);
            assert_result_invariants(&result);
        }
    }
}

#[test]
fn test_alternative_method_options() {
    let table = random_cohort(&IndicatorSchema::default(), 12, 5);

    let fuzzy = EvaluationConfig {
        method: MethodKind::Fuzzy,
        fuzzy: FuzzyConfig {
            defuzzification: Defuzzification::MaxMembership,
            normalize_memberships: true,
        },
        ..Default::default()
    };
    let result = EffectivenessScorer::new(IndicatorSchema::default(), fuzzy)
        .evaluate(&table, &AhpInput::Default)
        .unwrap();
    assert_result_invariants(&result);
    for batch in &result.evaluation_results {
        assert_eq!(batch.grade, batch.membership.as_ref().unwrap().dominant);
    }

    let grey = EvaluationConfig {
        method: MethodKind::Grey,
        grey: GreyConfig {
            whitening: WhiteningShape::Trapezoidal,
        },
        ..Default::default()
    };
    let result = EffectivenessScorer::new(IndicatorSchema::default(), grey)
        .evaluate(&table, &AhpInput::Default)
        .unwrap();
    assert_result_invariants(&result);
}

#[test]
fn test_single_batch() {
    let table = random_cohort(&IndicatorSchema::default(), 1, 9);
    for method in [MethodKind::Combination, MethodKind::Fuzzy, MethodKind::Grey] {
        let result = scorer(method).evaluate(&table, &AhpInput::Default).unwrap();
        let batch = &result.evaluation_results[0];
        assert_eq!(batch.rank, 1);
        for score in batch.indicator_scores.values() {
            assert_relative_eq!(*score, 50.0);
        }
    }
}

#[test]
fn test_priorities_shift_ranking() {
    // A is strong on reliability, B on responsiveness
    let table = RawBatchTable::from_records(vec![
        RawBatchRecord::new("A")
            .with_value("RL_communication_success_rate", 0.99)
            .with_value("RS_avg_call_setup_duration_ms", 900.0),
        RawBatchRecord::new("B")
            .with_value("RL_communication_success_rate", 0.60)
            .with_value("RS_avg_call_setup_duration_ms", 50.0),
    ]);
    let s = scorer(MethodKind::Combination);

    let default = s.evaluate(&table, &AhpInput::Default).unwrap();
    assert_eq!(default.evaluation_results[0].test_id, "A");

    let mut responsive_first = s.schema().default_priorities();
    responsive_first.insert("RS".into(), 1);
    responsive_first.insert("RL".into(), 8);
    let flipped = s.evaluate(&table, &AhpInput::Priorities(responsive_first)).unwrap();
    assert_eq!(flipped.evaluation_results[0].test_id, "B");
}

// =========================================================================
// Section 4: Errors, concurrency, service
// =========================================================================

#[test]
fn test_empty_table() {
    let err = scorer(MethodKind::Combination)
        .evaluate(&RawBatchTable::default(), &AhpInput::Default)
        .unwrap_err();
    assert!(matches!(err, EvaluationError::EmptyTable));
}

#[test]
fn test_parallel_evaluate_many() {
    let schema = IndicatorSchema::default();
    let table = random_cohort(&schema, 25, 21);
    let s = scorer(MethodKind::Grey);

    let mut bad = schema.default_priorities();
    bad.insert("SC".into(), 1);
    let inputs = vec![AhpInput::Default, AhpInput::Priorities(bad), AhpInput::Default];

    let results = s.evaluate_many(&table, &inputs);
    assert_eq!(results.len(), 3);
    assert!(results[1].is_err());

    let first = results[0].as_ref().unwrap();
    let third = results[2].as_ref().unwrap();
    for (a, b) in first.evaluation_results.iter().zip(&third.evaluation_results) {
        assert_eq!(a.test_id, b.test_id);
        assert_relative_eq!(a.total_score, b.total_score, epsilon = 1e-12);
    }
}

#[test]
fn test_store_and_service_envelope() {
    let table = random_cohort(&IndicatorSchema::default(), 6, 2);
    let s = scorer(MethodKind::Combination);

    let sink = MemorySink::new();
    let stored = evaluate_and_store(&s, &table, &AhpInput::Default, &sink).unwrap();
    assert!(stored.is_stored());
    assert_eq!(sink.len(), 1);

    let response = handle_request(&s, &table, "");
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["dimensionCodes"].as_array().unwrap().len(), 8);
    assert_eq!(
        json["evaluationResults"][0]["testId"],
        stored.result.evaluation_results[0].test_id.as_str()
    );
    assert!(json["evaluationResults"][0]["calculation"]["totalScoreCalculation"].is_array());

    let failure = handle_request(&s, &table, "not json");
    assert!(!failure.is_success());
}
