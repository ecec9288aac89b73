//! The built-in example dataset.
//!
//! Ten students: weekly study hours, GPA, nightly sleep, exercise sessions,
//! social-support score and a self-reported anxiety level (the usual target).

use std::collections::BTreeMap;

use crate::domain::{Dataset, Row};

/// Default target column of the example table.
pub const EXAMPLE_TARGET: &str = "anxiety";

const COLUMNS: [&str; 6] = [
    "studyHours",
    "gpa",
    "sleepHours",
    "exercise",
    "socialSupport",
    EXAMPLE_TARGET,
];

const VALUES: [[f64; 6]; 10] = [
    [8.0, 3.8, 8.0, 5.0, 8.0, 2.5],
    [10.0, 3.5, 6.0, 2.0, 5.0, 7.2],
    [5.0, 3.2, 7.0, 4.0, 7.0, 4.1],
    [12.0, 4.0, 5.0, 1.0, 4.0, 8.9],
    [6.0, 3.6, 8.0, 5.0, 9.0, 2.3],
    [9.0, 3.4, 6.0, 3.0, 6.0, 6.5],
    [4.0, 3.0, 7.0, 4.0, 8.0, 3.8],
    [11.0, 3.9, 5.0, 2.0, 3.0, 8.4],
    [7.0, 3.7, 8.0, 5.0, 8.0, 3.2],
    [10.0, 3.3, 5.0, 1.0, 5.0, 7.8],
];

pub fn example_dataset() -> Dataset {
    let rows = VALUES
        .iter()
        .map(|values| {
            COLUMNS
                .iter()
                .zip(values)
                .map(|(name, v)| (name.to_string(), *v))
                .collect::<Row>()
        })
        .collect();

    Dataset {
        columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows,
        encodings: BTreeMap::new(),
    }
}
