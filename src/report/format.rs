//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

use std::collections::BTreeMap;

use crate::domain::{ColumnKind, Dataset, FittedModel, label_for};
use crate::fit::{FitOptions, SweepEntry};
use crate::report::prediction_rows;

/// Rows shown by [`format_dataset_preview`] by default.
pub const PREVIEW_ROWS: usize = 5;

const PREVIEW_WIDTH: usize = 12;

/// Format the model summary (fit metrics, coefficients, equation).
pub fn format_model_summary(model: &FittedModel, target: &str, opts: &FitOptions) -> String {
    let mut out = String::new();

    out.push_str("=== mlr - Multiple Linear Regression ===\n");
    out.push_str(&format!("Target: {target}\n"));
    out.push_str(&format!(
        "Method: {}{}\n",
        opts.decomposition.display_name(),
        if opts.scale_columns { " + column scaling" } else { "" }
    ));
    out.push_str(&format!(
        "Observations: n={} | features={}\n",
        model.n(),
        model.feature_names().len()
    ));
    out.push_str(&format!(
        "Fit: R2={:.6} RMSE={:.6} MAE={:.6}\n",
        model.r2, model.rmse, model.mae
    ));

    out.push_str("\nCoefficients:\n");
    out.push_str(format!("{:<24} {:>14}", "feature", "coefficient").trim_end());
    out.push('\n');
    out.push_str(&format!("{:-<24} {:-<14}\n", "", ""));
    for (name, beta) in model.features.iter().zip(&model.coefficients) {
        out.push_str(&format!("{:<24} {:>14}\n", truncate(name, 24), format!("{beta:+.6}")));
    }

    out.push_str("\nEquation:\n");
    out.push_str(&format!("{target} = {}\n", format_equation(model)));

    out
}

/// `b0 + b1*x1 - b2*x2 ...` with six decimals.
pub fn format_equation(model: &FittedModel) -> String {
    let mut out = format!("{:.6}", model.intercept());
    for (name, beta) in model.feature_names().iter().zip(model.coefficients.iter().skip(1)) {
        let sign = if *beta < 0.0 { '-' } else { '+' };
        out.push_str(&format!(" {sign} {:.6}*{name}", beta.abs()));
    }
    out
}

/// Fitted coefficients next to the ones synthetic data was generated from.
pub fn format_coefficient_check(model: &FittedModel, truth: &[f64]) -> String {
    let mut out = String::new();
    out.push_str("Generator check:\n");
    out.push_str(&format!(
        "{:<24} {:>14} {:>14} {:>14}\n",
        "feature", "fitted", "true", "difference"
    ));
    out.push_str(&format!("{:-<24} {:-<14} {:-<14} {:-<14}\n", "", "", "", ""));
    for ((name, fitted), actual) in model.features.iter().zip(&model.coefficients).zip(truth) {
        out.push_str(&format!(
            "{:<24} {:>14.6} {:>14.6} {:>14.2e}\n",
            truncate(name, 24),
            fitted,
            actual,
            fitted - actual
        ));
    }
    out
}

/// Format actual vs predicted values, optionally only the first `limit` rows.
pub fn format_predictions_table(model: &FittedModel, limit: Option<usize>) -> String {
    let rows = prediction_rows(model);
    let shown = limit.unwrap_or(rows.len()).min(rows.len());

    let mut out = String::new();
    out.push_str("Predictions:\n");
    out.push_str(&format!(
        "{:>5} {:>12} {:>12} {:>12} {:>9}\n",
        "#", "actual", "predicted", "error", "% error"
    ));
    out.push_str(&format!("{:-<5} {:-<12} {:-<12} {:-<12} {:-<9}\n", "", "", "", "", ""));

    for r in &rows[..shown] {
        out.push_str(&format!(
            "{:>5} {:>12.4} {:>12.4} {:>12.4} {:>8.2}%\n",
            r.index, r.actual, r.predicted, r.error, r.pct_error
        ));
    }
    if shown < rows.len() {
        out.push_str(&format!("... {} more rows\n", rows.len() - shown));
    }

    out
}

/// Format column kinds plus the first `max_rows` rows (labels instead of codes).
pub fn format_dataset_preview(dataset: &Dataset, max_rows: usize) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Dataset: {} rows x {} columns\n",
        dataset.len(),
        dataset.columns.len()
    ));

    out.push_str("\nColumns:\n");
    for name in &dataset.columns {
        let kind = match dataset.column_kind(name) {
            ColumnKind::Numeric => "numeric".to_string(),
            ColumnKind::Categorical => {
                let labels = dataset.encodings.get(name).map(Vec::len).unwrap_or(0);
                format!("categorical ({labels} labels)")
            }
        };
        out.push_str(&format!("  {:<24} {kind}\n", truncate(name, 24)));
    }

    let shown = max_rows.min(dataset.len());
    out.push_str(&format!("\nFirst {shown} rows:\n"));

    let header: Vec<String> = dataset
        .columns
        .iter()
        .map(|c| format!("{:>w$}", truncate(c, PREVIEW_WIDTH), w = PREVIEW_WIDTH))
        .collect();
    out.push_str(header.join(" ").trim_end());
    out.push('\n');
    let rule: Vec<String> = dataset
        .columns
        .iter()
        .map(|_| "-".repeat(PREVIEW_WIDTH))
        .collect();
    out.push_str(&rule.join(" "));
    out.push('\n');

    for row in dataset.rows.iter().take(shown) {
        let cells: Vec<String> = dataset
            .columns
            .iter()
            .map(|c| {
                let text = match row.get(c) {
                    Some(v) => display_value(&dataset.encodings, c, *v),
                    None => String::new(),
                };
                format!("{:>w$}", truncate(&text, PREVIEW_WIDTH), w = PREVIEW_WIDTH)
            })
            .collect();
        out.push_str(cells.join(" ").trim_end());
        out.push('\n');
    }

    out
}

/// Format a single prediction and the inputs it was made from.
pub fn format_prediction(
    target: &str,
    inputs: &[(String, f64)],
    predicted: f64,
    encodings: &BTreeMap<String, Vec<String>>,
) -> String {
    let mut out = String::new();

    out.push_str("Inputs:\n");
    for (name, value) in inputs {
        let text = match label_for(encodings, name, *value) {
            Some(label) => format!("{label} (code {})", fmt_num(value.round())),
            None => fmt_num(*value),
        };
        out.push_str(&format!("  {:<24} {text}\n", truncate(name, 24)));
    }
    out.push_str(&format!("\nPredicted {target}: {predicted:.6}\n"));

    out
}

/// Format a sweep: one line per selection, `*` marking the best.
pub fn format_sweep(target: &str, entries: &[SweepEntry], best: Option<usize>) -> String {
    let mut out = String::new();

    out.push_str(&format!("Feature selection sweep (target: {target}):\n"));
    out.push_str(
        format!(
            "  {:<40} {:>10} {:>10} {:>10}",
            "features", "R2", "RMSE", "MAE"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(&format!("  {:-<40} {:-<10} {:-<10} {:-<10}\n", "", "", "", ""));

    for (idx, entry) in entries.iter().enumerate() {
        let mark = if best == Some(idx) { '*' } else { ' ' };
        let features = truncate(&entry.features.join(", "), 40);
        match &entry.result {
            Ok(model) => out.push_str(&format!(
                "{mark} {features:<40} {:>10.6} {:>10.6} {:>10.6}\n",
                model.r2, model.rmse, model.mae
            )),
            Err(e) => out.push_str(&format!("{mark} {features:<40} failed: {e}\n")),
        }
    }

    out
}

/// Categorical codes become their label; numbers use the shortest exact form.
fn display_value(encodings: &BTreeMap<String, Vec<String>>, column: &str, value: f64) -> String {
    if encodings.contains_key(column) {
        return label_for(encodings, column, value)
            .map(str::to_string)
            .unwrap_or_else(|| "?".to_string());
    }
    fmt_num(value)
}

fn fmt_num(v: f64) -> String {
    format!("{v}")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Decomposition, INTERCEPT, Row};
    use crate::fit::TrainError;

    fn model() -> FittedModel {
        FittedModel {
            coefficients: vec![1.0, 2.0, -0.5],
            features: vec![INTERCEPT.to_string(), "a".to_string(), "b".to_string()],
            r2: 0.75,
            rmse: 0.5,
            mae: 0.25,
            predictions: vec![1.5, 4.0, 6.0],
            actual: vec![2.0, 4.0, 5.0],
        }
    }

    #[test]
    fn equation_shows_signs() {
        assert_eq!(format_equation(&model()), "1.000000 + 2.000000*a - 0.500000*b");
    }

    #[test]
    fn summary_golden() {
        let opts = FitOptions {
            decomposition: Decomposition::GramSchmidt,
            scale_columns: false,
        };
        let expected = "\
=== mlr - Multiple Linear Regression ===
Target: y
Method: QR (Gram-Schmidt)
Observations: n=3 | features=2
Fit: R2=0.750000 RMSE=0.500000 MAE=0.250000

Coefficients:
feature                     coefficient
------------------------ --------------
Intercept                     +1.000000
a                             +2.000000
b                             -0.500000

Equation:
y = 1.000000 + 2.000000*a - 0.500000*b
";
        assert_eq!(format_model_summary(&model(), "y", &opts), expected);
    }

    #[test]
    fn coefficient_check_lists_every_coefficient() {
        let text = format_coefficient_check(&model(), &[1.0, 2.5, -0.5]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3 + 3);
        assert_eq!(
            lines[4].split_whitespace().collect::<Vec<_>>(),
            vec!["a", "2.000000", "2.500000", "-5.00e-1"]
        );
    }

    #[test]
    fn predictions_table_respects_limit() {
        let full = format_predictions_table(&model(), None);
        let lines: Vec<&str> = full.lines().collect();
        assert_eq!(lines.len(), 3 + 3);
        assert_eq!(
            lines[3].split_whitespace().collect::<Vec<_>>(),
            vec!["1", "2.0000", "1.5000", "0.5000", "25.00%"]
        );
        assert_eq!(
            lines[5].split_whitespace().collect::<Vec<_>>(),
            vec!["3", "5.0000", "6.0000", "-1.0000", "-20.00%"]
        );

        let limited = format_predictions_table(&model(), Some(1));
        assert_eq!(limited.lines().count(), 3 + 1 + 1);
        assert!(limited.ends_with("... 2 more rows\n"));

        // A limit above the row count prints everything.
        assert_eq!(format_predictions_table(&model(), Some(10)), full);
    }

    #[test]
    fn preview_shows_labels_and_limits_rows() {
        let mut encodings = BTreeMap::new();
        encodings.insert("city".to_string(), vec!["Lima".to_string(), "Quito".to_string()]);
        let rows: Vec<Row> = (0..7)
            .map(|i| {
                [("x", i as f64 + 0.5), ("city", (i % 2) as f64)]
                    .iter()
                    .map(|(k, v)| (k.to_string(), *v))
                    .collect()
            })
            .collect();
        let ds = Dataset {
            columns: vec!["x".to_string(), "city".to_string()],
            rows,
            encodings,
        };

        let text = format_dataset_preview(&ds, PREVIEW_ROWS);
        assert!(text.starts_with("Dataset: 7 rows x 2 columns\n"));
        assert!(text.contains("  x                        numeric\n"));
        assert!(text.contains("  city                     categorical (2 labels)\n"));
        assert!(text.contains("First 5 rows:\n"));

        let data_lines: Vec<&str> = text
            .lines()
            .skip_while(|l| !l.starts_with("First"))
            .skip(3)
            .collect();
        assert_eq!(data_lines.len(), 5);
        assert_eq!(data_lines[0].split_whitespace().collect::<Vec<_>>(), vec!["0.5", "Lima"]);
        assert_eq!(data_lines[1].split_whitespace().collect::<Vec<_>>(), vec!["1.5", "Quito"]);
    }

    #[test]
    fn prediction_shows_category_labels() {
        let mut encodings = BTreeMap::new();
        encodings.insert("city".to_string(), vec!["Lima".to_string(), "Quito".to_string()]);
        let inputs = vec![("x".to_string(), 2.5), ("city".to_string(), 0.8)];
        let text = format_prediction("y", &inputs, 7.25, &encodings);
        assert_eq!(
            text,
            "Inputs:\n  x                        2.5\n  city                     Quito (code 1)\n\nPredicted y: 7.250000\n"
        );
    }

    #[test]
    fn sweep_marks_best_and_failures() {
        let entries = vec![
            SweepEntry {
                features: vec!["a".to_string(), "b".to_string()],
                result: Ok(model()),
            },
            SweepEntry {
                features: vec!["b".to_string()],
                result: Err(TrainError::NoVariance { variance: 0.0 }),
            },
        ];
        let text = format_sweep("y", &entries, Some(0));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[3].starts_with("* a, b "));
        assert!(lines[3].ends_with("  0.750000   0.500000   0.250000"));
        assert!(lines[4].starts_with("  b "));
        assert!(lines[4].contains("failed: Target has no variance"));
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
