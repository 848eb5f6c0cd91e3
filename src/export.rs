use crate::binder::ReportSection;
use crate::error::Result;
use crate::schema::Period;
use std::path::PathBuf;

/// The per-company output artifact: every rendered employee section for one
/// company in one period. Persisting it as an actual workbook file is the
/// document collaborator's job, not this crate's.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyReport {
    pub company: String,
    pub period: Period,
    pub sections: Vec<ReportSection>,
}

impl CompanyReport {
    /// Output file name for this report, e.g. `August_Alfa Lda.xlsx`.
    pub fn file_name(&self) -> String {
        format!("{}_{}.xlsx", self.period.month, self.company)
    }
}

/// Print margins in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 0.3,
            right: 0.3,
            top: 0.5,
            bottom: 0.5,
        }
    }
}

/// Page setup the export collaborator applies before rendering: landscape,
/// scaled to a single page, horizontally centered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSetup {
    pub landscape: bool,
    pub fit_to_one_page: bool,
    pub center_horizontally: bool,
    pub margins: Margins,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            landscape: true,
            fit_to_one_page: true,
            center_horizontally: true,
            margins: Margins::default(),
        }
    }
}

/// One printable-PDF request handed to the export collaborator: which section
/// of which company document, the page setup, and the period/company-scoped
/// target path (relative; the collaborator roots it at its own output base).
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub company: String,
    pub employee: String,
    pub section_title: String,
    pub target: PathBuf,
    pub page: PageSetup,
}

/// PDF file name for a section: trimmed title, spaces as underscores.
pub fn pdf_file_name(title: &str) -> String {
    format!("{}.pdf", title.trim().replace(' ', "_"))
}

/// One export request per section, targeted under
/// `<Month>_<Year>/<company>/<employee>.pdf`.
pub fn export_requests(report: &CompanyReport) -> Vec<ExportRequest> {
    let root = PathBuf::from(report.period.folder_name()).join(&report.company);
    report
        .sections
        .iter()
        .map(|section| ExportRequest {
            company: report.company.clone(),
            employee: section.employee.clone(),
            section_title: section.title.clone(),
            target: root.join(pdf_file_name(&section.title)),
            page: PageSetup::default(),
        })
        .collect()
}

/// Document persistence collaborator. The pipeline calls this once per
/// company report; failures count against that company only.
pub trait DocumentSink {
    fn persist(&mut self, report: &CompanyReport) -> Result<()>;
}

/// Sink for callers that only want the in-memory artifacts from a run.
#[derive(Debug, Default)]
pub struct DiscardSink;

impl DocumentSink for DiscardSink {
    fn persist(&mut self, _report: &CompanyReport) -> Result<()> {
        Ok(())
    }
}

/// Sink that keeps every persisted report, mostly useful in tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub reports: Vec<CompanyReport>,
}

impl DocumentSink for MemorySink {
    fn persist(&mut self, report: &CompanyReport) -> Result<()> {
        self.reports.push(report.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::{bind, Template};
    use crate::filter::{EntityGroup, Record};
    use crate::schema::CellValue;

    fn sample_report() -> CompanyReport {
        let template = Template::with_rate(0.36);
        let period = Period::new("August", 2026);
        let record = Record {
            employee: "Ana Maria Silva".to_string(),
            distance: 10.0,
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
            employee: record.employee.clone(),
            total_distance: record.distance,
            records: vec![record],
        };
        let section = bind(&template, "Alfa Lda", &group, &period);
        CompanyReport {
            company: "Alfa Lda".to_string(),
            period,
            sections: vec![section],
        }
    }

    #[test]
    fn test_report_file_name() {
        let report = sample_report();
        assert_eq!(report.file_name(), "August_Alfa Lda.xlsx");
    }

    #[test]
    fn test_pdf_file_name_replaces_spaces() {
        assert_eq!(pdf_file_name(" Ana Maria "), "Ana_Maria.pdf");
    }

    #[test]
    fn test_export_requests_are_period_and_company_scoped() {
        let report = sample_report();
        let requests = export_requests(&report);
        assert_eq!(requests.len(), 1);

        let request = &requests[0];
        assert_eq!(request.employee, "Ana Maria Silva");
        assert_eq!(
            request.target,
            PathBuf::from("August_2026")
                .join("Alfa Lda")
                .join("Ana_Maria_Silva.pdf")
        );
        assert!(request.page.landscape);
        assert!(request.page.fit_to_one_page);
        assert_eq!(request.page.margins.top, 0.5);
    }
}
