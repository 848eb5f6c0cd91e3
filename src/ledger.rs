use crate::binder::ReportSection;
use crate::error::{ReportError, Result};
use crate::layout::Layout;
use crate::schema::Period;
use log::debug;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// One KPI ledger row: the computed totals of one employee's report in one
/// period. `value` is unset (not zero) when the rendered document did not
/// yield both a numeric total and a numeric rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub month: String,
    pub year: i32,
    pub company: String,
    pub employee: String,
    pub km: Option<f64>,
    pub value: Option<f64>,
}

impl LedgerEntry {
    /// Derives an entry by reading the *rendered* section back through the
    /// layout: the total cell and the rate cell, multiplied and rounded to
    /// cents. Reading the rendered document rather than the input group is
    /// deliberate, the ledger reflects what the report actually says.
    pub fn from_section(
        section: &ReportSection,
        layout: &Layout,
        period: &Period,
        company: &str,
    ) -> Self {
        let km = section.cell(layout.total).as_f64();
        let rate = section.cell(layout.rate).as_f64();
        let value = match (km, rate) {
            (Some(km), Some(rate)) => Some((km * rate * 100.0).round() / 100.0),
            _ => None,
        };

        Self {
            month: period.month.clone(),
            year: period.year,
            company: company.to_string(),
            employee: section.employee.clone(),
            km,
            value,
        }
    }
}

/// Pure append: the updated ledger is the existing ledger followed by the new
/// entries. No key-based replacement; a (period, company, employee) key that
/// reappears in a later run is a second row, not an update.
pub fn merge(mut existing: Vec<LedgerEntry>, new_entries: &[LedgerEntry]) -> Vec<LedgerEntry> {
    existing.extend_from_slice(new_entries);
    existing
}

/// Durable, append-only store for ledger entries. Injected into the pipeline
/// so tests can run against memory instead of a file.
pub trait LedgerStore {
    fn read_all(&self) -> Result<Vec<LedgerEntry>>;
    fn append(&mut self, entries: &[LedgerEntry]) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct InMemoryLedger {
    entries: Vec<LedgerEntry>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for InMemoryLedger {
    fn read_all(&self) -> Result<Vec<LedgerEntry>> {
        Ok(self.entries.clone())
    }

    fn append(&mut self, entries: &[LedgerEntry]) -> Result<()> {
        self.entries.extend_from_slice(entries);
        Ok(())
    }
}

/// File-backed store, one JSON array per file. Whole-file read-then-write,
/// single process per run; no locking beyond that.
#[derive(Debug)]
pub struct JsonFileLedger {
    path: PathBuf,
}

impl JsonFileLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerStore for JsonFileLedger {
    fn read_all(&self) -> Result<Vec<LedgerEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let file = std::fs::File::open(&self.path)?;
        serde_json::from_reader(file)
            .map_err(|e| ReportError::LedgerUnreadable(format!("{}: {}", self.path.display(), e)))
    }

    fn append(&mut self, entries: &[LedgerEntry]) -> Result<()> {
        let merged = merge(self.read_all()?, entries);
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(&self.path)?;
        serde_json::to_writer_pretty(file, &merged)?;
        debug!(
            "ledger {} now holds {} entries",
            self.path.display(),
            merged.len()
        );
        Ok(())
    }
}

/// Writes the ledger as CSV in the KPI column order:
/// Month, Year, Company, Employee, KM, Value (€). Unset cells stay empty.
pub fn export_csv<W: Write>(entries: &[LedgerEntry], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["Month", "Year", "Company", "Employee", "KM", "Value (€)"])?;
    for entry in entries {
        csv_writer.write_record(&[
            entry.month.clone(),
            entry.year.to_string(),
            entry.company.clone(),
            entry.employee.clone(),
            entry.km.map(|v| v.to_string()).unwrap_or_default(),
            entry.value.map(|v| format!("{:.2}", v)).unwrap_or_default(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::{bind, Template};
    use crate::filter::{EntityGroup, Record};
    use crate::schema::CellValue;

    fn entry(month: &str, company: &str, employee: &str, km: f64, value: f64) -> LedgerEntry {
        LedgerEntry {
            month: month.to_string(),
            year: 2026,
            company: company.to_string(),
            employee: employee.to_string(),
            km: Some(km),
            value: Some(value),
        }
    }

    fn sample_section(rate: Option<f64>) -> (ReportSection, Layout) {
        let template = match rate {
            Some(rate) => Template::with_rate(rate),
            None => Template::default(),
        };
        let layout = template.layout.clone();
        let record = Record {
            employee: "Ana".to_string(),
            distance: 50.0,
            day: CellValue::Number(5.0),
            origin: CellValue::Empty,
            destination: CellValue::Empty,
            objective_time: CellValue::Empty,
            company_display: CellValue::Empty,
            company_address: CellValue::Empty,
            company_tax_id: CellValue::Empty,
            month: CellValue::Empty,
            year: CellValue::Empty,
            employee_address: CellValue::Empty,
            employee_tax_id: CellValue::Empty,
            vehicle: CellValue::Empty,
        };
        let group = EntityGroup {
            employee: "Ana".to_string(),
            total_distance: record.distance,
            records: vec![record],
        };
        let section = bind(&template, "Alfa Lda", &group, &Period::new("May", 2026));
        (section, layout)
    }

    #[test]
    fn test_entry_from_rendered_section() {
        let (section, layout) = sample_section(Some(0.36));
        let entry = LedgerEntry::from_section(&section, &layout, &Period::new("May", 2026), "Alfa Lda");

        assert_eq!(entry.km, Some(50.0));
        assert_eq!(entry.value, Some(18.0));
        assert_eq!(entry.month, "May");
        assert_eq!(entry.company, "Alfa Lda");
        assert_eq!(entry.employee, "Ana");
    }

    #[test]
    fn test_entry_value_unset_without_rate() {
        let (section, layout) = sample_section(None);
        let entry = LedgerEntry::from_section(&section, &layout, &Period::new("May", 2026), "Alfa Lda");

        assert_eq!(entry.km, Some(50.0));
        assert_eq!(entry.value, None);
    }

    #[test]
    fn test_value_rounded_to_cents() {
        let (section, layout) = sample_section(Some(0.333));
        let entry = LedgerEntry::from_section(&section, &layout, &Period::new("May", 2026), "Alfa Lda");
        // 50 * 0.333 = 16.65
        assert_eq!(entry.value, Some(16.65));
    }

    #[test]
    fn test_merge_is_pure_append() {
        let existing = vec![entry("April", "Alfa", "Ana", 100.0, 36.0)];
        let new_entries = vec![
            entry("May", "Alfa", "Ana", 50.0, 18.0),
            entry("May", "Alfa", "Bruno", 20.0, 7.2),
        ];

        let merged = merge(existing.clone(), &new_entries);
        assert_eq!(merged.len(), existing.len() + new_entries.len());
        assert_eq!(merged[0], existing[0]);
        assert_eq!(&merged[1..], &new_entries[..]);
    }

    #[test]
    fn test_merge_keeps_duplicate_keys() {
        let first = vec![entry("May", "Alfa", "Ana", 50.0, 18.0)];
        let merged = merge(first.clone(), &first);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0], merged[1]);
    }

    #[test]
    fn test_json_file_ledger_roundtrip() {
        let dir = std::env::temp_dir().join(format!("mileage_ledger_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let mut store = JsonFileLedger::new(dir.join("KPI.json"));

        assert!(store.read_all().unwrap().is_empty());

        store
            .append(&[entry("May", "Alfa", "Ana", 50.0, 18.0)])
            .unwrap();
        store
            .append(&[entry("May", "Alfa", "Ana", 50.0, 18.0)])
            .unwrap();

        let all = store.read_all().unwrap();
        assert_eq!(all.len(), 2);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_csv_export_column_order() {
        let entries = vec![
            entry("May", "Alfa", "Ana", 50.0, 18.0),
            LedgerEntry {
                month: "May".to_string(),
                year: 2026,
                company: "Alfa".to_string(),
                employee: "Bruno".to_string(),
                km: Some(20.0),
                value: None,
            },
        ];

        let mut out = Vec::new();
        export_csv(&entries, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "Month,Year,Company,Employee,KM,Value (€)"
        );
        assert_eq!(lines.next().unwrap(), "May,2026,Alfa,Ana,50,18.00");
        // unset value stays an empty cell
        assert_eq!(lines.next().unwrap(), "May,2026,Alfa,Bruno,20,");
    }
}
