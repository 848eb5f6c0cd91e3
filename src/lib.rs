//! # Mileage Report Builder
//!
//! A library for turning a master workbook of per-company mileage tables into
//! per-employee report documents, an append-only KPI ledger and chart-ready
//! rollups.
//!
//! ## Core Concepts
//!
//! - **Master workbook**: one table per company; each row is one trip with an
//!   employee name, a day of the month and a distance in km
//! - **Report section**: a populated copy of the fixed-layout template for one
//!   employee, with a 30-slot day grid and a computed total
//! - **Ledger**: the durable, append-only record of computed totals across all
//!   runs and periods; rerunning a period appends, it never overwrites
//! - **Rollup**: per (company, employee) sums over the full ledger, laid out
//!   as chart data for the external charting engine
//! - **External collaborators**: workbook files, PDF rendering and chart
//!   drawing stay outside this crate; it produces their typed requests
//!
//! ## Example
//!
//! ```rust,ignore
//! use mileage_report_builder::*;
//!
//! let workbook = load_master_json(std::path::Path::new("Master.json"))?;
//! let mut store = JsonFileLedger::new("KPIs/KPI.json");
//!
//! let summary = generate_reports(
//!     &workbook,
//!     &Period::current(),
//!     Template::with_rate(0.36),
//!     ColumnBindings::default(),
//!     &mut store,
//! )?;
//!
//! for name in summary.created_documents() {
//!     println!("created: {}", name);
//! }
//! ```

pub mod binder;
pub mod chart;
pub mod error;
pub mod export;
pub mod filter;
pub mod layout;
pub mod ledger;
pub mod orchestrator;
pub mod rollup;
pub mod schema;
pub mod source;

pub use binder::{bind, parse_day, section_title, ReportSection, Template, SECTION_TITLE_MAX};
pub use chart::{build_chart_sheet, BarChartSpec, ChartSheet, CompanyChartBlock, CHART_SHEET_NAME};
pub use error::{ReportError, Result};
pub use export::{
    export_requests, pdf_file_name, CompanyReport, DiscardSink, DocumentSink, ExportRequest,
    MemorySink, PageSetup,
};
pub use filter::{filter_table, EntityGroup, Record, EMPLOYEE_PLACEHOLDER};
pub use layout::{CellRef, Layout, DAY_SLOTS};
pub use ledger::{
    export_csv, merge, InMemoryLedger, JsonFileLedger, LedgerEntry, LedgerStore,
};
pub use orchestrator::{ReportOrchestrator, RunSummary};
pub use rollup::{aggregate, RollupRow};
pub use schema::{CellValue, ColumnBindings, MasterWorkbook, Period, SourceTable};
pub use source::{load_master_csv_dir, load_master_json};

/// Runs the whole pipeline once: filter, render, persist totals, rollup.
///
/// Convenience wrapper over [`ReportOrchestrator`]; use the orchestrator
/// directly to also persist company documents through a [`DocumentSink`].
pub fn generate_reports(
    workbook: &MasterWorkbook,
    period: &Period,
    template: Template,
    bindings: ColumnBindings,
    store: &mut dyn LedgerStore,
) -> Result<RunSummary> {
    let orchestrator = ReportOrchestrator::new(template, bindings)?;
    orchestrator.run(workbook, period, store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_to_end_processing() {
        let mut table = SourceTable::new(
            "Alfa Lda",
            vec![
                "Nome".to_string(),
                "KLM".to_string(),
                "Dia  {{dia}}".to_string(),
            ],
        );
        table.rows.push(vec![
            CellValue::from("Ana"),
            CellValue::Number(10.0),
            CellValue::Number(5.0),
        ]);
        table.rows.push(vec![
            CellValue::from("Bruno"),
            CellValue::Number(20.0),
            CellValue::Number(2.0),
        ]);
        let workbook = MasterWorkbook {
            tables: vec![table],
        };

        let mut store = InMemoryLedger::new();
        let summary = generate_reports(
            &workbook,
            &Period::new("May", 2026),
            Template::with_rate(0.36),
            ColumnBindings::default(),
            &mut store,
        )
        .unwrap();

        assert_eq!(summary.created_documents(), vec!["May_Alfa Lda.xlsx"]);
        assert_eq!(summary.ledger_total, 2);
        assert_eq!(summary.rollup.len(), 2);
        assert!(!summary.chart.is_empty());
    }

    #[test]
    fn test_invalid_layout_fails_fast() {
        let template = Template {
            layout: Layout {
                rate: CellRef::new('F', 15),
                ..Layout::default()
            },
            seed: Vec::new(),
        };

        let result = generate_reports(
            &MasterWorkbook::default(),
            &Period::new("May", 2026),
            template,
            ColumnBindings::default(),
            &mut InMemoryLedger::new(),
        );
        assert!(matches!(result, Err(ReportError::InvalidLayout(_))));
    }
}
