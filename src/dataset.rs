use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use regex::Regex;

use crate::error::AppError;
use crate::models::{CutoffTable, Offering};

/// Header columns that identify the offering rather than carry a cutoff.
/// `College_encoded` is a training-pipeline leftover some exports carry.
const METADATA_COLUMNS: [&str; 5] = ["CETCode", "College", "Branch", "Location", "College_encoded"];

/// Load the cutoff dataset from `path`.
///
/// Accepts either comma-delimited text or a spreadsheet container; one
/// reader is tried first based on the file extension and the other is
/// used as a fallback. Metadata columns may be absent (the trainer does
/// its own schema check), every remaining column is treated as a
/// category code holding integer cutoff ranks.
pub fn load(path: &Path) -> Result<CutoffTable, AppError> {
    if !path.exists() {
        return Err(AppError::MissingDataset(path.to_path_buf()));
    }

    let spreadsheet_first = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("xlsx") | Some("xls") | Some("ods")
    );

    let (first, second): (fn(&Path) -> Result<CutoffTable>, fn(&Path) -> Result<CutoffTable>) =
        if spreadsheet_first {
            (read_workbook, read_csv)
        } else {
            (read_csv, read_workbook)
        };

    match first(path) {
        Ok(table) => Ok(table),
        Err(first_err) => second(path).map_err(|second_err| {
            AppError::DatasetFormat(format!("{first_err}; fallback reader: {second_err}"))
        }),
    }
}

fn read_csv(path: &Path) -> Result<CutoffTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let header: Vec<String> = reader
        .headers()
        .context("failed to read CSV header")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("failed to read CSV row")?;
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }

    build_table(header, rows)
}

fn read_workbook(path: &Path) -> Result<CutoffTable> {
    let mut workbook =
        open_workbook_auto(path).with_context(|| format!("failed to open {}", path.display()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("workbook has no sheets"))?
        .context("failed to read first worksheet")?;

    let mut rows = range.rows();
    let header: Vec<String> = rows
        .next()
        .ok_or_else(|| anyhow!("worksheet is empty"))?
        .iter()
        .map(cell_to_string)
        .collect();
    let rows: Vec<Vec<String>> = rows
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    build_table(header, rows)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

fn build_table(header: Vec<String>, rows: Vec<Vec<String>>) -> Result<CutoffTable> {
    if header.is_empty() {
        return Err(anyhow!("dataset has no header row"));
    }

    let categories: Vec<String> = header
        .iter()
        .filter(|c| !c.is_empty() && !METADATA_COLUMNS.contains(&c.as_str()))
        .cloned()
        .collect();
    if categories.is_empty() {
        return Err(anyhow!("dataset has no category columns"));
    }

    let column_index = |name: &str| header.iter().position(|c| c == name);
    let cet_code_idx = column_index("CETCode");
    let college_idx = column_index("College");
    let branch_idx = column_index("Branch");
    let location_idx = column_index("Location");
    let category_indices: Vec<(String, usize)> = categories
        .iter()
        .map(|c| (c.clone(), column_index(c).expect("category comes from header")))
        .collect();

    // Published cutoff sheets decorate numbers with separators and
    // footnote markers ("57,373*"); keep digits and the decimal point.
    let noise = Regex::new(r"[^0-9.]").unwrap();

    let mut offerings = Vec::with_capacity(rows.len());
    for row in rows {
        let field = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .map(|c| c.trim().to_string())
                .unwrap_or_default()
        };

        let mut cutoffs = HashMap::new();
        for (category, idx) in &category_indices {
            if let Some(rank) = row.get(*idx).and_then(|cell| parse_cutoff(&noise, cell)) {
                cutoffs.insert(category.clone(), rank);
            }
        }

        offerings.push(Offering {
            cet_code: field(cet_code_idx),
            college: field(college_idx),
            branch: field(branch_idx),
            location: field(location_idx),
            cutoffs,
        });
    }

    Ok(CutoffTable {
        columns: header,
        categories,
        offerings,
    })
}

fn parse_cutoff(noise: &Regex, cell: &str) -> Option<u32> {
    let cleaned = noise.replace_all(cell, "");
    if cleaned.is_empty() {
        return None;
    }
    let value = cleaned.parse::<f64>().ok()?;
    if value <= 0.0 || !value.is_finite() {
        return None;
    }
    Some(value.round() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_csv_with_categories_and_metadata() {
        let file = write_csv(
            "CETCode,College,Branch,Location,GM,1G\n\
             E001,X,CSE Engg,Bangalore,6000,7500\n\
             E002,Y,Civil Engineering,Mysore,,9000\n",
        );
        let table = load(file.path()).unwrap();

        assert_eq!(table.categories, vec!["GM", "1G"]);
        assert_eq!(table.offerings.len(), 2);
        assert_eq!(table.offerings[0].college, "X");
        assert_eq!(table.offerings[0].cutoff("GM"), Some(6000));
        // Empty cell means no offering under that category.
        assert_eq!(table.offerings[1].cutoff("GM"), None);
        assert_eq!(table.offerings[1].cutoff("1G"), Some(9000));
    }

    #[test]
    fn parses_decorated_cutoff_cells() {
        let file = write_csv(
            "College,Branch,GM\n\
             X,CSE,\"57,373*\"\n\
             Y,ECE,6000.0\n",
        );
        let table = load(file.path()).unwrap();
        assert_eq!(table.offerings[0].cutoff("GM"), Some(57373));
        assert_eq!(table.offerings[1].cutoff("GM"), Some(6000));
    }

    #[test]
    fn tolerates_missing_metadata_columns() {
        let file = write_csv("College,GM\nX,4000\n");
        let table = load(file.path()).unwrap();
        assert!(table.has_column("College"));
        assert!(!table.has_column("Branch"));
        assert_eq!(table.offerings[0].branch, "");
    }

    #[test]
    fn workbook_fixture_matches_csv_equivalent() {
        let fixture = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/cutoffs.xlsx");
        let from_workbook = load(&fixture).unwrap();

        let csv = write_csv(
            "CETCode,College,Branch,Location,GM,1G\n\
             E001,X,CSE Engg,Bangalore,6000,7500\n\
             E002,Y,Civil Engineering,Mysore,,9000\n",
        );
        let from_csv = load(csv.path()).unwrap();

        assert_eq!(from_workbook.columns, from_csv.columns);
        assert_eq!(from_workbook.categories, from_csv.categories);
        assert_eq!(from_workbook.offerings.len(), from_csv.offerings.len());
        for (wb, plain) in from_workbook.offerings.iter().zip(&from_csv.offerings) {
            assert_eq!(wb.cet_code, plain.cet_code);
            assert_eq!(wb.college, plain.college);
            assert_eq!(wb.branch, plain.branch);
            assert_eq!(wb.location, plain.location);
            assert_eq!(wb.cutoffs, plain.cutoffs);
        }
    }

    #[test]
    fn csv_content_behind_a_spreadsheet_extension_falls_back() {
        let mut file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        file.write_all(b"College,GM\nX,4000\n").unwrap();

        let table = load(file.path()).unwrap();
        assert_eq!(table.offerings.len(), 1);
        assert_eq!(table.offerings[0].cutoff("GM"), Some(4000));
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = load(Path::new("no-such-dataset.csv")).unwrap_err();
        assert!(matches!(err, AppError::MissingDataset(_)));
    }

    #[test]
    fn unreadable_file_reports_both_readers() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xff, 0xfe, 0x00, 0x01]).unwrap();
        let err = load(file.path()).unwrap_err();
        assert!(matches!(err, AppError::DatasetFormat(_)));
    }
}
