use crate::error::{ReportError, Result};
use crate::schema::{CellValue, MasterWorkbook, SourceTable};
use log::{debug, warn};
use std::fs::File;
use std::path::Path;

/// Loads a master workbook serialized as JSON (one table per company).
///
/// Fails with [`ReportError::SourceUnreadable`] if the file cannot be opened
/// or parsed; a structurally valid but useless table (no distance column) is
/// not an error here, it surfaces later as a filter skip.
pub fn load_master_json(path: &Path) -> Result<MasterWorkbook> {
    let file = File::open(path)
        .map_err(|e| ReportError::SourceUnreadable(format!("{}: {}", path.display(), e)))?;

    let mut workbook: MasterWorkbook = serde_json::from_reader(file)
        .map_err(|e| ReportError::SourceUnreadable(format!("{}: {}", path.display(), e)))?;

    workbook.normalize();
    debug!(
        "loaded master workbook {} with {} tables",
        path.display(),
        workbook.tables.len()
    );
    Ok(workbook)
}

/// Loads a master workbook from a directory of CSV files, one `<company>.csv`
/// per table. Files are taken in name order so runs are deterministic.
///
/// An unreadable directory is fatal; a single malformed CSV file is logged
/// and skipped so one bad table cannot take down the whole run.
pub fn load_master_csv_dir(dir: &Path) -> Result<MasterWorkbook> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| ReportError::SourceUnreadable(format!("{}: {}", dir.display(), e)))?;

    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().map(|ext| ext == "csv").unwrap_or(false))
        .collect();
    paths.sort();

    let mut workbook = MasterWorkbook::default();
    for path in paths {
        let company = match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => stem.to_string(),
            None => continue,
        };
        match read_csv_table(&path, &company) {
            Ok(table) => workbook.tables.push(table),
            Err(e) => warn!("skipping malformed table {}: {}", path.display(), e),
        }
    }

    workbook.normalize();
    debug!(
        "loaded {} csv tables from {}",
        workbook.tables.len(),
        dir.display()
    );
    Ok(workbook)
}

fn read_csv_table(path: &Path, company: &str) -> Result<SourceTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)?;

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut table = SourceTable::new(company, columns);
    for record in reader.records() {
        let record = record?;
        table
            .rows
            .push(record.iter().map(cell_from_csv_field).collect());
    }
    Ok(table)
}

fn cell_from_csv_field(field: &str) -> CellValue {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        CellValue::Empty
    } else if let Ok(n) = trimmed.parse::<f64>() {
        CellValue::Number(n)
    } else {
        CellValue::Text(field.to_string())
    }
}
