//! Integration test: detection engine end-to-end

use findetect::prelude::*;

fn row(pairs: &[(&str, Option<&str>)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| {
            let cell = match v {
                Some(s) => CellValue::from(*s),
                None => CellValue::Null,
            };
            (k.to_string(), cell)
        })
        .collect()
}

fn amount_rows(values: &[&str]) -> Vec<Row> {
    values
        .iter()
        .map(|v| row(&[("Amount", Some(v))]))
        .collect()
}

/// 24 ordinary amounts plus one huge one at a known position.
fn single_outlier_rows(outlier_at: usize) -> Vec<Row> {
    (0..25)
        .map(|i| {
            let amount = if i == outlier_at { "100000" } else { "100" };
            row(&[("Amount", Some(amount))])
        })
        .collect()
}

#[test]
fn test_single_outlier_is_flagged() {
    let rows = single_outlier_rows(7);
    let detector = UnsupervisedAnomalyDetector::new();
    let anomalies = detector.detect_anomalies(&rows);

    assert_eq!(anomalies.len(), 1, "round(0.05 * 25) = 1 row flagged");
    let a = &anomalies[0];
    assert_eq!(a.row_index, 7);
    assert_eq!(a.anomaly_type, "ml_outlier");
    assert_eq!(a.evidence.algorithm, "isolation_forest");
    assert_eq!(a.evidence.key_feature, "Amount");
    assert!(a.evidence.z_score_approx > 0.0, "outlier sits above the mean");
    assert!(a.description.contains("Amount"));
}

#[test]
fn test_below_min_samples_is_noop() {
    let mut values = vec!["100"; 14];
    values.push("100000");
    let rows = amount_rows(&values);
    assert_eq!(rows.len(), 15);

    let anomalies = UnsupervisedAnomalyDetector::new().detect_anomalies(&rows);
    assert!(anomalies.is_empty(), "15 rows is below the default gate of 20");
}

#[test]
fn test_no_numeric_columns_is_noop() {
    let rows: Vec<Row> = (0..25)
        .map(|i| {
            let category = if i % 2 == 0 { "Expense" } else { "Revenue" };
            row(&[("Category", Some(category))])
        })
        .collect();

    let anomalies = UnsupervisedAnomalyDetector::new().detect_anomalies(&rows);
    assert!(anomalies.is_empty());
}

#[test]
fn test_empty_input_is_noop() {
    let anomalies = UnsupervisedAnomalyDetector::new().detect_anomalies(&[]);
    assert!(anomalies.is_empty());
}

#[test]
fn test_currency_formatting_survives_pipeline() {
    let rows: Vec<Row> = (0..25)
        .map(|i| {
            let amount = if i == 12 { "$1,000,000.00" } else { "$1,234.56" };
            row(&[("Amount", Some(amount))])
        })
        .collect();

    let anomalies = UnsupervisedAnomalyDetector::new().detect_anomalies(&rows);
    assert_eq!(anomalies.len(), 1);
    assert_eq!(anomalies[0].row_index, 12);
    assert_eq!(anomalies[0].evidence.feature_value, 1_000_000.0);
}

#[test]
fn test_all_missing_row_never_flagged() {
    // Row 3 has no parseable feature value; it is dropped from scoring.
    let mut rows = single_outlier_rows(20);
    rows[3] = row(&[("Amount", Some("")), ("Note", Some("n/a"))]);

    let anomalies = UnsupervisedAnomalyDetector::new().detect_anomalies(&rows);
    assert!(anomalies.iter().all(|a| a.row_index != 3));
    assert_eq!(anomalies.len(), 1);
    assert_eq!(anomalies[0].row_index, 20);
}

#[test]
fn test_null_cells_are_imputed_not_fatal() {
    let mut rows = single_outlier_rows(10);
    // A null amount alongside a numeric second column keeps the row eligible.
    for r in rows.iter_mut() {
        r.insert("Tax".to_string(), CellValue::from("5"));
    }
    rows[4].insert("Amount".to_string(), CellValue::Null);

    let anomalies = UnsupervisedAnomalyDetector::new().detect_anomalies(&rows);
    assert_eq!(anomalies.len(), 1);
    assert_eq!(anomalies[0].row_index, 10);
}

#[test]
fn test_determinism_across_runs() {
    let rows = single_outlier_rows(7);
    let detector = UnsupervisedAnomalyDetector::new();

    let first = detector.detect_anomalies(&rows);
    let second = detector.detect_anomalies(&rows);

    let a = serde_json::to_string(&first).unwrap();
    let b = serde_json::to_string(&second).unwrap();
    assert_eq!(a, b, "identical input and seed must give identical output");
}

#[test]
fn test_row_index_fidelity_and_ordering() {
    let mut rows: Vec<Row> = (0..100)
        .map(|_| row(&[("Amount", Some("100")), ("Memo", Some("ordinary"))]))
        .collect();
    for &i in &[10usize, 30, 50, 70, 90] {
        rows[i] = row(&[("Amount", Some("99999")), ("Memo", Some("spike"))]);
    }
    // Vary the normal rows slightly so the amount column is not constant
    // outside the spikes.
    for (i, r) in rows.iter_mut().enumerate() {
        if i % 7 == 0 && ![10, 30, 50, 70, 90].contains(&i) {
            r.insert("Amount".to_string(), CellValue::from("101"));
        }
    }

    let anomalies = UnsupervisedAnomalyDetector::new().detect_anomalies(&rows);

    // round(0.05 * 100) = 5
    assert_eq!(anomalies.len(), 5);
    assert_eq!(
        anomalies.iter().map(|a| a.row_index).collect::<Vec<_>>(),
        vec![10, 30, 50, 70, 90],
        "flags land on the spikes, in ascending row order"
    );
    for a in &anomalies {
        assert_eq!(a.raw_json, rows[a.row_index], "raw_json is the original row");
    }
}

#[test]
fn test_contamination_bound() {
    let rows = single_outlier_rows(0);
    let config = DetectorConfig::default().with_contamination(0.2);
    let anomalies = UnsupervisedAnomalyDetector::with_config(config).detect_anomalies(&rows);

    // round(0.2 * 25) = 5, never more.
    assert_eq!(anomalies.len(), 5);
}

#[test]
fn test_custom_min_samples() {
    let rows = single_outlier_rows(7);
    let config = DetectorConfig::default().with_min_samples(30);
    let anomalies = UnsupervisedAnomalyDetector::with_config(config).detect_anomalies(&rows);

    assert!(anomalies.is_empty(), "25 rows is below the raised gate of 30");
}

#[test]
fn test_reserved_columns_never_attributed() {
    let rows: Vec<Row> = (0..25)
        .map(|i| {
            let amount = if i == 5 { "100000" } else { "100" };
            row(&[
                ("Amount", Some(amount)),
                ("Page", Some("1")),
                ("Id", Some("12345")),
            ])
        })
        .collect();

    let anomalies = UnsupervisedAnomalyDetector::new().detect_anomalies(&rows);
    assert_eq!(anomalies.len(), 1);
    assert_eq!(anomalies[0].evidence.key_feature, "Amount");
}

#[test]
fn test_anomaly_record_serialization_shape() {
    let rows = single_outlier_rows(7);
    let anomalies = UnsupervisedAnomalyDetector::new().detect_anomalies(&rows);
    let json = serde_json::to_value(&anomalies[0]).unwrap();

    assert_eq!(json["anomaly_type"], "ml_outlier");
    assert_eq!(json["row_index"], 7);
    assert_eq!(json["evidence"]["algorithm"], "isolation_forest");
    assert_eq!(json["raw_json"]["Amount"], "100000");
    assert!(json["severity"] == "medium" || json["severity"] == "high");
}
