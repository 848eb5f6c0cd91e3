use crate::binder::{bind, Template};
use crate::chart::{build_chart_sheet, ChartSheet};
use crate::error::{ReportError, Result};
use crate::export::{export_requests, CompanyReport, DiscardSink, DocumentSink, ExportRequest};
use crate::filter::filter_table;
use crate::ledger::{LedgerEntry, LedgerStore};
use crate::rollup::{aggregate, RollupRow};
use crate::schema::{ColumnBindings, MasterWorkbook, Period, SourceTable};
use log::{debug, info, warn};

/// What a completed run produced: the per-company reports, which tables were
/// skipped or failed, the ledger state and the chart-ready rollups.
#[derive(Debug)]
pub struct RunSummary {
    pub period: Period,
    pub reports: Vec<CompanyReport>,
    pub skipped: Vec<String>,
    pub failures: Vec<String>,
    pub new_entries: Vec<LedgerEntry>,
    pub ledger_total: usize,
    pub rollup: Vec<RollupRow>,
    pub chart: ChartSheet,
    pub exports: Vec<ExportRequest>,
}

impl RunSummary {
    /// File names of the company documents this run created.
    pub fn created_documents(&self) -> Vec<String> {
        self.reports.iter().map(|r| r.file_name()).collect()
    }
}

/// Drives the pipeline end to end: filter each company table, render one
/// section per employee, persist the company document, append the computed
/// totals to the ledger, then recompute rollups and chart data from the full
/// ledger.
pub struct ReportOrchestrator {
    template: Template,
    bindings: ColumnBindings,
}

impl ReportOrchestrator {
    /// Validates the template layout up front; a bad coordinate map fails the
    /// construction, not some company halfway through a run.
    pub fn new(template: Template, bindings: ColumnBindings) -> Result<Self> {
        template.validate()?;
        Ok(Self { template, bindings })
    }

    /// Default layout and master headers, with the given per-km rate.
    pub fn with_defaults(rate: f64) -> Result<Self> {
        Self::new(Template::with_rate(rate), ColumnBindings::default())
    }

    pub fn run(
        &self,
        workbook: &MasterWorkbook,
        period: &Period,
        store: &mut dyn LedgerStore,
    ) -> Result<RunSummary> {
        self.run_with_sink(workbook, period, store, &mut DiscardSink)
    }

    /// Full run. A failure in one company's table is logged and charged to
    /// that company; the run continues with the next table.
    pub fn run_with_sink(
        &self,
        workbook: &MasterWorkbook,
        period: &Period,
        store: &mut dyn LedgerStore,
        sink: &mut dyn DocumentSink,
    ) -> Result<RunSummary> {
        info!(
            "generating mileage reports for {} ({} tables)",
            period,
            workbook.tables.len()
        );

        let mut reports = Vec::new();
        let mut skipped = Vec::new();
        let mut failures = Vec::new();
        let mut new_entries = Vec::new();

        for table in &workbook.tables {
            match self.process_company(table, period, store, sink) {
                Ok(Some((report, entries))) => {
                    info!(
                        "created {} with {} sections",
                        report.file_name(),
                        report.sections.len()
                    );
                    new_entries.extend(entries);
                    reports.push(report);
                }
                Ok(None) => {
                    debug!("skipping '{}': no valid mileage rows", table.company);
                    skipped.push(table.company.clone());
                }
                Err(e) => {
                    warn!("company '{}' failed: {}", table.company, e);
                    failures.push(table.company.clone());
                }
            }
        }

        let ledger = store.read_all()?;
        let rollup = aggregate(&ledger);
        let chart = build_chart_sheet(&rollup);
        let exports: Vec<ExportRequest> = reports.iter().flat_map(export_requests).collect();

        info!(
            "run complete: {} documents, {} skipped, {} failed, ledger at {} entries",
            reports.len(),
            skipped.len(),
            failures.len(),
            ledger.len()
        );

        Ok(RunSummary {
            period: period.clone(),
            reports,
            skipped,
            failures,
            new_entries,
            ledger_total: ledger.len(),
            rollup,
            chart,
            exports,
        })
    }

    fn process_company(
        &self,
        table: &SourceTable,
        period: &Period,
        store: &mut dyn LedgerStore,
        sink: &mut dyn DocumentSink,
    ) -> Result<Option<(CompanyReport, Vec<LedgerEntry>)>> {
        let groups = match filter_table(table, &self.bindings) {
            Some(groups) => groups,
            None => return Ok(None),
        };

        let sections = groups
            .iter()
            .map(|group| bind(&self.template, &table.company, group, period))
            .collect();

        let report = CompanyReport {
            company: table.company.clone(),
            period: period.clone(),
            sections,
        };

        sink.persist(&report)
            .map_err(|e| self.company_error(&table.company, e))?;

        let entries: Vec<LedgerEntry> = report
            .sections
            .iter()
            .map(|section| {
                LedgerEntry::from_section(section, &self.template.layout, period, &table.company)
            })
            .collect();

        store
            .append(&entries)
            .map_err(|e| self.company_error(&table.company, e))?;

        Ok(Some((report, entries)))
    }

    fn company_error(&self, company: &str, source: ReportError) -> ReportError {
        ReportError::CompanyError {
            company: company.to_string(),
            details: source.to_string(),
        }
    }
}
