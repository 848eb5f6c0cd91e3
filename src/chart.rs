use crate::layout::CellRef;
use crate::rollup::RollupRow;
use serde::Serialize;

pub const CHART_SHEET_NAME: &str = "Charts";

/// Vertical gap left after each company block for the rendered chart.
const BLOCK_GAP_ROWS: u32 = 8;

/// A bar-chart request for the external charting engine: title, axis label,
/// plot size and the sheet ranges holding its data and category labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChartSpec {
    pub title: String,
    pub y_axis_title: String,
    pub height: f64,
    pub width: f64,
    /// Where the chart is anchored on the sheet, e.g. `E2`.
    pub anchor: String,
    /// Data range (km + value columns), header row included so the series
    /// take their titles from it.
    pub data_min_col: u32,
    pub data_max_col: u32,
    pub data_min_row: u32,
    pub data_max_row: u32,
    /// Category range (employee names).
    pub cats_min_col: u32,
    pub cats_min_row: u32,
    pub cats_max_row: u32,
}

/// One company's block on the chart sheet: a title row, a header row, the
/// per-employee data rows and the chart spec pointing at them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyChartBlock {
    pub company: String,
    pub title_row: u32,
    pub header_row: u32,
    pub data_first_row: u32,
    pub data_last_row: u32,
    pub rows: Vec<RollupRow>,
    pub chart: BarChartSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSheet {
    pub name: String,
    pub blocks: Vec<CompanyChartBlock>,
}

impl ChartSheet {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Lays the rollup out as one block per company, stacked down the sheet with
/// room for each rendered chart, and computes the cell ranges each chart
/// reads. An empty rollup produces an empty sheet and no charts.
pub fn build_chart_sheet(rollup: &[RollupRow]) -> ChartSheet {
    let mut blocks = Vec::new();
    let mut start_row: u32 = 1;

    let mut index = 0;
    while index < rollup.len() {
        let company = rollup[index].company.clone();
        let mut rows = Vec::new();
        while index < rollup.len() && rollup[index].company == company {
            rows.push(rollup[index].clone());
            index += 1;
        }

        let row_count = rows.len() as u32;
        let title_row = start_row;
        let header_row = start_row + 1;
        let data_first_row = header_row + 1;
        let data_last_row = header_row + row_count;

        let chart = BarChartSpec {
            title: format!("{} - Totals per Employee", company),
            y_axis_title: "KM / Value (€)".to_string(),
            height: 7.0,
            width: 15.0,
            anchor: CellRef::new('E', title_row + 1).to_string(),
            data_min_col: 2,
            data_max_col: 3,
            data_min_row: header_row,
            data_max_row: data_last_row,
            cats_min_col: 1,
            cats_min_row: data_first_row,
            cats_max_row: data_last_row,
        };

        blocks.push(CompanyChartBlock {
            company,
            title_row,
            header_row,
            data_first_row,
            data_last_row,
            rows,
            chart,
        });

        start_row = data_last_row + BLOCK_GAP_ROWS;
    }

    ChartSheet {
        name: CHART_SHEET_NAME.to_string(),
        blocks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(company: &str, employee: &str, km: f64, value: f64) -> RollupRow {
        RollupRow {
            company: company.to_string(),
            employee: employee.to_string(),
            km,
            value,
        }
    }

    #[test]
    fn test_empty_rollup_empty_sheet() {
        let sheet = build_chart_sheet(&[]);
        assert!(sheet.is_empty());
        assert_eq!(sheet.name, "Charts");
    }

    #[test]
    fn test_single_company_block_geometry() {
        let rollup = vec![
            row("Alfa", "Ana", 100.0, 36.0),
            row("Alfa", "Bruno", 20.0, 7.2),
        ];
        let sheet = build_chart_sheet(&rollup);
        assert_eq!(sheet.blocks.len(), 1);

        let block = &sheet.blocks[0];
        assert_eq!(block.title_row, 1);
        assert_eq!(block.header_row, 2);
        assert_eq!(block.data_first_row, 3);
        assert_eq!(block.data_last_row, 4);

        // the data range includes the header row so series pick up titles
        assert_eq!(block.chart.data_min_row, 2);
        assert_eq!(block.chart.data_max_row, 4);
        assert_eq!(block.chart.data_min_col, 2);
        assert_eq!(block.chart.data_max_col, 3);
        assert_eq!(block.chart.cats_min_row, 3);
        assert_eq!(block.chart.cats_max_row, 4);
        assert_eq!(block.chart.anchor, "E2");
        assert_eq!(block.chart.title, "Alfa - Totals per Employee");
    }

    #[test]
    fn test_blocks_stack_with_chart_gap() {
        let rollup = vec![
            row("Alfa", "Ana", 100.0, 36.0),
            row("Alfa", "Bruno", 20.0, 7.2),
            row("Beta", "Carla", 10.0, 3.6),
        ];
        let sheet = build_chart_sheet(&rollup);
        assert_eq!(sheet.blocks.len(), 2);

        let first = &sheet.blocks[0];
        let second = &sheet.blocks[1];
        assert_eq!(second.title_row, first.data_last_row + 8);
        assert_eq!(second.company, "Beta");
        assert_eq!(second.rows.len(), 1);
    }
}
