//! Train several feature selections at once.
//!
//! Training calls share no state, so every selection is fitted on its own
//! rayon task. Results come back in input order, each carrying either the
//! fitted model or the reason it could not be fitted.

use log::warn;
use rayon::prelude::*;

use crate::domain::{FittedModel, Row};
use crate::fit::trainer::{FitOptions, TrainError, train_with};

/// Outcome of training one feature selection.
#[derive(Debug, Clone)]
pub struct SweepEntry {
    pub features: Vec<String>,
    pub result: Result<FittedModel, TrainError>,
}

/// Train `target` against every selection in `selections` (in parallel).
pub fn train_many(
    rows: &[Row],
    target: &str,
    selections: &[Vec<String>],
    opts: &FitOptions,
) -> Vec<SweepEntry> {
    let entries: Vec<SweepEntry> = selections
        .par_iter()
        .map(|features| SweepEntry {
            features: features.clone(),
            result: train_with(rows, target, features, opts),
        })
        .collect();

    for entry in &entries {
        if let Err(e) = &entry.result {
            warn!("selection [{}] not fitted: {e}", entry.features.join(", "));
        }
    }
    entries
}

/// The full selection followed by every selection with one feature left out.
pub fn drop_one_selections(features: &[String]) -> Vec<Vec<String>> {
    let mut out = vec![features.to_vec()];
    if features.len() > 1 {
        for skip in 0..features.len() {
            out.push(
                features
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != skip)
                    .map(|(_, f)| f.clone())
                    .collect(),
            );
        }
    }
    out
}

/// Index of the successful entry with the highest R², ties going to the earlier entry.
pub fn best_entry(entries: &[SweepEntry]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, entry) in entries.iter().enumerate() {
        let Ok(model) = &entry.result else {
            continue;
        };
        match best {
            Some((_, r2)) if model.r2 <= r2 => {}
            _ => best = Some((idx, model.r2)),
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::trainer::train;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn rows() -> Vec<Row> {
        // y depends on a and b; c duplicates a.
        (0..10)
            .map(|i| {
                let a = i as f64;
                let b = ((i * 7) % 5) as f64;
                [("a", a), ("b", b), ("c", a), ("y", 1.0 + 2.0 * a - b)]
                    .iter()
                    .map(|(k, v)| (k.to_string(), *v))
                    .collect()
            })
            .collect()
    }

    #[test]
    fn drop_one_lists_full_then_each_omission() {
        let sel = drop_one_selections(&names(&["a", "b", "c"]));
        assert_eq!(
            sel,
            vec![
                names(&["a", "b", "c"]),
                names(&["b", "c"]),
                names(&["a", "c"]),
                names(&["a", "b"]),
            ]
        );
        assert_eq!(drop_one_selections(&names(&["a"])), vec![names(&["a"])]);
    }

    #[test]
    fn sweep_keeps_order_and_errors() {
        let data = rows();
        let selections = drop_one_selections(&names(&["a", "b", "c"]));
        let entries = train_many(&data, "y", &selections, &FitOptions::default());

        assert_eq!(entries.len(), 4);
        for (entry, sel) in entries.iter().zip(&selections) {
            assert_eq!(&entry.features, sel);
        }
        // a and c together are collinear.
        assert!(matches!(entries[0].result, Err(TrainError::Collinearity { .. })));
        assert!(matches!(entries[2].result, Err(TrainError::Collinearity { .. })));
        // Dropping either duplicate leaves an exact fit.
        assert!(entries[1].result.is_ok());
        let exact = entries[3].result.as_ref().unwrap();
        assert!((exact.r2 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn sweep_matches_sequential_training() {
        let data = rows();
        let selections = vec![names(&["a"]), names(&["b"]), names(&["a", "b"])];
        let entries = train_many(&data, "y", &selections, &FitOptions::default());
        for (entry, sel) in entries.iter().zip(&selections) {
            let sequential = train(&data, "y", sel).unwrap();
            assert_eq!(entry.result.as_ref().unwrap(), &sequential);
        }
    }

    #[test]
    fn best_entry_prefers_highest_r2_then_earliest() {
        let data = rows();
        let selections = vec![names(&["b"]), names(&["a", "b"]), names(&["c", "b"])];
        let entries = train_many(&data, "y", &selections, &FitOptions::default());
        assert_eq!(best_entry(&entries), Some(1));
        assert_eq!(best_entry(&[]), None);
    }
}
