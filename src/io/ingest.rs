//! Tabular ingest and feature ranges.
//!
//! This module turns a CSV/TSV file or a spreadsheet workbook into a
//! [`Dataset`]: one numeric value per column per row, with text columns
//! replaced by integer codes.
//!
//! Rules:
//! - the first non-empty line is the header (a UTF-8 BOM is stripped)
//! - workbooks (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`) are read from their
//!   first sheet
//! - column kinds are decided from the first data row: a cell that parses as
//!   a number makes the column numeric, anything else makes it categorical
//! - categorical labels get codes `0, 1, 2, …` in order of first appearance
//! - numeric cells that fail to parse become NaN; the trainer rejects them only
//!   if the column is selected
//! - rows with the wrong number of cells are skipped
//! - at least two data rows must remain

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use log::{info, warn};

use crate::domain::{ColumnKind, Dataset, FeatureRange, Row};
use crate::error::AppError;

/// Fewest data rows a file may contain.
pub const MIN_DATA_ROWS: usize = 2;

const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// One data row as trimmed cell text, tagged with its 1-based source line.
type Record = (usize, Vec<String>);

/// Load a CSV (comma), TSV (tab) or spreadsheet file.
pub fn load_dataset(path: &Path) -> Result<Dataset, AppError> {
    let dataset = if is_workbook(path) {
        load_workbook(path)?
    } else {
        let text = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(2, format!("Failed to read data file '{}': {e}", path.display()))
        })?;
        parse_dataset(text.as_bytes(), detect_delimiter(path, &text))?
    };

    info!(
        "loaded {} rows x {} columns from {} ({} categorical)",
        dataset.len(),
        dataset.columns.len(),
        path.display(),
        dataset.encodings.len()
    );
    Ok(dataset)
}

pub fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| WORKBOOK_EXTENSIONS.iter().any(|w| e.eq_ignore_ascii_case(w)))
        .unwrap_or(false)
}

/// Tab for `.tsv`/`.txt` files or a header containing a tab, comma otherwise.
pub fn detect_delimiter(path: &Path, text: &str) -> u8 {
    let by_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("tsv") || e.eq_ignore_ascii_case("txt"))
        .unwrap_or(false);
    let header_has_tab = text
        .lines()
        .find(|l| !l.trim().is_empty())
        .map(|l| l.contains('\t'))
        .unwrap_or(false);

    if by_extension || header_has_tab { b'\t' } else { b',' }
}

/// Parse delimited text into a [`Dataset`].
pub fn parse_dataset<R: Read>(reader: R, delimiter: u8) -> Result<Dataset, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read headers: {e}")))?
        .clone();
    let columns = parse_headers(headers.iter())?;

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records start after the header and lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| AppError::new(2, format!("Parse error at line {line}: {e}")))?;
        records.push((line, record.iter().map(str::to_string).collect()));
    }

    encode_records(columns, records)
}

/// Read the first sheet of a workbook into a [`Dataset`].
///
/// Blank rows are ignored and the first non-blank row is the header. Blank
/// trailing header cells are dropped together with the (blank) cells below them.
pub fn load_workbook(path: &Path) -> Result<Dataset, AppError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| {
        AppError::new(2, format!("Failed to open workbook '{}': {e}", path.display()))
    })?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::new(2, format!("Workbook '{}' has no sheets.", path.display())))?
        .map_err(|e| AppError::new(2, format!("Failed to read first sheet: {e}")))?;

    let mut lines = range
        .rows()
        .enumerate()
        .map(|(idx, cells)| (idx + 1, cells.iter().map(cell_text).collect::<Vec<String>>()))
        .filter(|(_, cells)| cells.iter().any(|c| !c.is_empty()));

    let (_, mut header) = lines
        .next()
        .ok_or_else(|| AppError::new(2, "Data file has no header row."))?;
    let width = header.iter().rposition(|c| !c.is_empty()).map_or(0, |i| i + 1);
    header.truncate(width);
    let columns = parse_headers(header.iter().map(String::as_str))?;

    let records = lines
        .map(|(line, mut cells)| {
            if cells.len() > width && cells[width..].iter().all(String::is_empty) {
                cells.truncate(width);
            }
            (line, cells)
        })
        .collect();

    encode_records(columns, records)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

/// Shared tail of every reader: drop ragged rows, classify columns, encode labels.
fn encode_records(columns: Vec<String>, records: Vec<Record>) -> Result<Dataset, AppError> {
    let records: Vec<Record> = records
        .into_iter()
        .filter(|(line, cells)| {
            if cells.len() == columns.len() {
                return true;
            }
            warn!(
                "line {line}: expected {} cells, found {}; row skipped",
                columns.len(),
                cells.len()
            );
            false
        })
        .collect();

    if records.len() < MIN_DATA_ROWS {
        return Err(AppError::new(
            2,
            format!(
                "Need a header and at least {MIN_DATA_ROWS} data rows, found {} data rows.",
                records.len()
            ),
        ));
    }

    let kinds: Vec<ColumnKind> = records[0].1.iter().map(|c| classify_cell(c)).collect();
    let mut encodings: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut codes: HashMap<usize, HashMap<String, usize>> = HashMap::new();
    for (idx, kind) in kinds.iter().enumerate() {
        if *kind == ColumnKind::Categorical {
            encodings.insert(columns[idx].clone(), Vec::new());
            codes.insert(idx, HashMap::new());
        }
    }

    let mut rows = Vec::with_capacity(records.len());
    for (line, cells) in &records {
        let mut row = Row::with_capacity(columns.len());
        for (idx, cell) in cells.iter().enumerate() {
            let name = &columns[idx];
            let value = match kinds[idx] {
                ColumnKind::Numeric => parse_numeric_cell(cell).unwrap_or_else(|| {
                    warn!("line {line}: column `{name}` value '{cell}' is not numeric; using NaN");
                    f64::NAN
                }),
                ColumnKind::Categorical => {
                    let seen = codes.entry(idx).or_default();
                    let next = seen.len();
                    let code = *seen.entry(cell.clone()).or_insert(next);
                    if code == next {
                        encodings.entry(name.clone()).or_default().push(cell.clone());
                    }
                    code as f64
                }
            };
            row.insert(name.clone(), value);
        }
        rows.push(row);
    }

    Ok(Dataset {
        columns,
        rows,
        encodings,
    })
}

/// Observed min / max / midpoint of each feature, ignoring non-finite values.
///
/// A feature with no finite values gets a zero range.
pub fn feature_ranges(dataset: &Dataset, features: &[String]) -> Vec<FeatureRange> {
    features
        .iter()
        .map(|name| {
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            for v in dataset.rows.iter().filter_map(|r| r.get(name)) {
                if v.is_finite() {
                    min = min.min(*v);
                    max = max.max(*v);
                }
            }
            if !(min.is_finite() && max.is_finite()) {
                warn!("feature `{name}` has no finite values; using a zero range");
                min = 0.0;
                max = 0.0;
            }
            FeatureRange {
                name: name.clone(),
                min,
                max,
                midpoint: (min + max) / 2.0,
            }
        })
        .collect()
}

fn parse_headers<'a>(headers: impl Iterator<Item = &'a str>) -> Result<Vec<String>, AppError> {
    let columns: Vec<String> = headers.map(normalize_header_name).collect();
    if columns.is_empty() || columns.iter().all(|c| c.is_empty()) {
        return Err(AppError::new(2, "Data file has no header row."));
    }

    let mut seen = HashSet::new();
    for (idx, name) in columns.iter().enumerate() {
        if name.is_empty() {
            return Err(AppError::new(2, format!("Header column {} is empty.", idx + 1)));
        }
        if !seen.insert(name.as_str()) {
            return Err(AppError::new(2, format!("Duplicate column name: `{name}`")));
        }
    }
    Ok(columns)
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a BOM.
    name.trim().trim_start_matches('\u{feff}').trim().to_string()
}

fn classify_cell(cell: &str) -> ColumnKind {
    if cell.is_empty() || parse_numeric_cell(cell).is_some() {
        ColumnKind::Numeric
    } else {
        ColumnKind::Categorical
    }
}

fn parse_numeric_cell(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Dataset, AppError> {
        parse_dataset(text.as_bytes(), b',')
    }

    #[test]
    fn numeric_csv_round_values() {
        let ds = parse("a,b,y\n1,2,3\n4,5.5,-6\n").unwrap();
        assert_eq!(ds.columns, vec!["a", "b", "y"]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rows[1]["b"], 5.5);
        assert_eq!(ds.rows[1]["y"], -6.0);
        assert!(ds.encodings.is_empty());
    }

    #[test]
    fn categorical_codes_follow_first_appearance() {
        let ds = parse("city,x,y\nQuito,1,2\nLima,2,3\nQuito,3,4\n Bogota ,4,5\n").unwrap();
        assert_eq!(ds.column_kind("city"), ColumnKind::Categorical);
        assert_eq!(ds.column_kind("x"), ColumnKind::Numeric);
        assert_eq!(ds.encodings["city"], vec!["Quito", "Lima", "Bogota"]);
        let codes: Vec<f64> = ds.rows.iter().map(|r| r["city"]).collect();
        assert_eq!(codes, vec![0.0, 1.0, 0.0, 2.0]);
        assert_eq!(ds.label_for("city", 2.0), Some("Bogota"));
    }

    #[test]
    fn bad_numeric_cells_become_nan() {
        let ds = parse("x,y\n1,2\noops,3\n").unwrap();
        assert!(ds.rows[1]["x"].is_nan());
        assert_eq!(ds.rows[1]["y"], 3.0);
    }

    #[test]
    fn ragged_rows_are_skipped() {
        let ds = parse("x,y\n1,2\n3\n4,5\n6,7,8\n").unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rows[1]["x"], 4.0);
    }

    #[test]
    fn requires_two_data_rows() {
        let err = parse("x,y\n1,2\n").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(parse("x,y\n").is_err());
        assert!(parse("").is_err());
    }

    #[test]
    fn strips_bom_and_rejects_duplicate_headers() {
        let ds = parse("\u{feff}x,y\n1,2\n3,4\n").unwrap();
        assert_eq!(ds.columns[0], "x");

        let err = parse("x,x\n1,2\n3,4\n").unwrap_err();
        assert!(err.to_string().contains("Duplicate"));
    }

    #[test]
    fn tab_separated_input() {
        let ds = parse_dataset("x\ty\n1\t2\n3\t4\n".as_bytes(), b'\t').unwrap();
        assert_eq!(ds.rows[1]["y"], 4.0);
    }

    #[test]
    fn delimiter_detection() {
        assert_eq!(detect_delimiter(Path::new("d.tsv"), "a,b"), b'\t');
        assert_eq!(detect_delimiter(Path::new("d.csv"), "a\tb\n1\t2"), b'\t');
        assert_eq!(detect_delimiter(Path::new("d.csv"), "a,b\n1,2"), b',');
    }

    #[test]
    fn ranges_ignore_non_finite_values() {
        let ds = parse("x,z,y\n1,a,1\n5,b,2\noops,c,3\n").unwrap();
        let ranges = feature_ranges(&ds, &["x".to_string(), "z".to_string()]);
        assert_eq!(
            ranges[0],
            FeatureRange {
                name: "x".to_string(),
                min: 1.0,
                max: 5.0,
                midpoint: 3.0
            }
        );
        assert_eq!(ranges[1].max, 2.0);
        assert_eq!(ranges[1].midpoint, 1.0);
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("mlr-ingest-{}-{name}", std::process::id()))
    }

    #[test]
    fn workbook_first_sheet_is_loaded() {
        let path = temp_path("scores.xlsx");
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "city").unwrap();
        sheet.write_string(0, 1, "hours").unwrap();
        sheet.write_string(0, 2, "score").unwrap();
        let rows = [("Quito", 2.0, 55.5), ("Lima", 4.0, 71.0), ("Quito", 6.0, 90.25)];
        for (i, (city, hours, score)) in rows.iter().enumerate() {
            // Row 2 of the sheet stays blank and must be ignored.
            let r = i as u32 + 2;
            sheet.write_string(r, 0, *city).unwrap();
            sheet.write_number(r, 1, *hours).unwrap();
            sheet.write_number(r, 2, *score).unwrap();
        }
        workbook.add_worksheet().write_string(0, 0, "ignored").unwrap();
        workbook.save(&path).unwrap();

        let ds = load_dataset(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(ds.columns, vec!["city", "hours", "score"]);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.encodings["city"], vec!["Quito", "Lima"]);
        assert_eq!(ds.rows[2]["city"], 0.0);
        assert_eq!(ds.rows[1]["hours"], 4.0);
        assert_eq!(ds.rows[2]["score"], 90.25);
    }

    #[test]
    fn workbook_extensions_are_recognised() {
        assert!(is_workbook(Path::new("data.xlsx")));
        assert!(is_workbook(Path::new("DATA.XLS")));
        assert!(is_workbook(Path::new("data.ods")));
        assert!(!is_workbook(Path::new("data.csv")));
        assert!(!is_workbook(Path::new("data")));
    }

    #[test]
    fn unreadable_workbook_is_an_input_error() {
        let path = temp_path("not-a-workbook.xlsx");
        std::fs::write(&path, "x,y\n1,2\n3,4\n").unwrap();
        let err = load_dataset(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert_eq!(err.exit_code(), 2);
    }
}
