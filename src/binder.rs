use crate::filter::EntityGroup;
use crate::layout::{CellRef, Layout, DAY_SLOTS};
use crate::schema::{CellValue, Period};
use std::collections::{BTreeMap, BTreeSet};

static EMPTY_CELL: CellValue = CellValue::Empty;

/// Sheet titles in the exported workbook are capped at 31 characters.
pub const SECTION_TITLE_MAX: usize = 31;

/// The report template: a coordinate map plus the cells the template ships
/// pre-filled (the reimbursement rate, typically). Rendering copies the seed
/// into every fresh section, the way the office template is copied per
/// employee.
#[derive(Debug, Clone, Default)]
pub struct Template {
    pub layout: Layout,
    pub seed: Vec<(CellRef, CellValue)>,
}

impl Template {
    /// Default layout with the given per-km rate printed in the rate cell.
    pub fn with_rate(rate: f64) -> Self {
        let layout = Layout::default();
        let seed = vec![(layout.rate, CellValue::Number(rate))];
        Self { layout, seed }
    }

    pub fn validate(&self) -> crate::error::Result<()> {
        self.layout.validate()
    }
}

/// One rendered report section: a populated copy of the template for a single
/// employee.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSection {
    /// Sheet title, the employee name truncated to the 31-character cap.
    pub title: String,
    pub employee: String,
    cells: BTreeMap<CellRef, CellValue>,
}

impl ReportSection {
    fn new(employee: &str) -> Self {
        Self {
            title: section_title(employee),
            employee: employee.to_string(),
            cells: BTreeMap::new(),
        }
    }

    pub fn cell(&self, at: CellRef) -> &CellValue {
        self.cells.get(&at).unwrap_or(&EMPTY_CELL)
    }

    fn set(&mut self, at: CellRef, value: CellValue) {
        self.cells.insert(at, value);
    }

    fn blank(&mut self, at: CellRef) {
        self.cells.insert(at, CellValue::Empty);
    }

    pub fn cells(&self) -> impl Iterator<Item = (&CellRef, &CellValue)> {
        self.cells.iter()
    }
}

/// Truncates an employee name to a valid sheet title, respecting char
/// boundaries.
pub fn section_title(employee: &str) -> String {
    employee.chars().take(SECTION_TITLE_MAX).collect()
}

/// Parses a day-of-month cell into a grid day.
///
/// The contract is truncation, not rounding: `5.9` is day 5. Non-numeric
/// cells and days outside 1..=30 yield `None`; such records stay out of the
/// grid but still count toward the section total.
pub fn parse_day(cell: &CellValue) -> Option<u32> {
    let value = cell.as_f64()?;
    let day = value.trunc();
    if day < 1.0 || day > DAY_SLOTS as f64 {
        return None;
    }
    Some(day as u32)
}

fn header_or_blank(value: &CellValue) -> CellValue {
    if value.is_blank() {
        CellValue::Empty
    } else {
        value.clone()
    }
}

/// Renders one employee's records onto a fresh copy of the template.
///
/// Pure function of its inputs: header cells from the group's first record
/// (company always from the table identifier), one grid slot per parsed day,
/// every slot's day number written, unused slots blanked so no seed content
/// survives in them, and the group total in the total cell.
///
/// Two records on the same day overwrite each other's slot (last write wins)
/// while the total keeps both distances. Grid and total can therefore
/// diverge; see the day-collision note in DESIGN.md.
pub fn bind(
    template: &Template,
    company: &str,
    group: &EntityGroup,
    period: &Period,
) -> ReportSection {
    let layout = &template.layout;
    let mut section = ReportSection::new(&group.employee);

    for (at, value) in &template.seed {
        section.set(*at, value.clone());
    }

    let first = group.records.first();

    section.set(layout.company, CellValue::from(company));
    section.set(layout.employee, CellValue::from(group.employee.as_str()));

    if let Some(first) = first {
        section.set(layout.company_display, header_or_blank(&first.company_display));
        section.set(layout.company_address, header_or_blank(&first.company_address));
        section.set(layout.company_tax_id, header_or_blank(&first.company_tax_id));
        section.set(layout.employee_address, header_or_blank(&first.employee_address));
        section.set(layout.employee_tax_id, header_or_blank(&first.employee_tax_id));
        section.set(layout.vehicle, header_or_blank(&first.vehicle));

        let month = if first.month.is_blank() {
            CellValue::from(period.month.as_str())
        } else {
            first.month.clone()
        };
        let year = if first.year.is_blank() {
            CellValue::Number(period.year as f64)
        } else {
            first.year.clone()
        };
        section.set(layout.month, month);
        section.set(layout.year, year);
    }

    let mut used_days: BTreeSet<u32> = BTreeSet::new();
    for record in &group.records {
        let day = match parse_day(&record.day) {
            Some(day) => day,
            None => continue,
        };
        let row = layout.slot_row(day);

        section.set(CellRef::new(layout.day_col, row), CellValue::Number(day as f64));
        section.set(CellRef::new(layout.origin_col, row), record.origin.clone());
        section.set(
            CellRef::new(layout.destination_col, row),
            record.destination.clone(),
        );
        section.set(
            CellRef::new(layout.objective_time_col, row),
            record.objective_time.clone(),
        );
        section.set(
            CellRef::new(layout.distance_col, row),
            CellValue::Number(record.distance),
        );
        used_days.insert(day);
    }

    // Slot numbers are data in their own right; write all 30 and scrub the
    // data columns of every slot no record landed in.
    for day in 1..=DAY_SLOTS {
        let row = layout.slot_row(day);
        section.set(CellRef::new(layout.day_col, row), CellValue::Number(day as f64));
        if !used_days.contains(&day) {
            for col in layout.data_columns() {
                section.blank(CellRef::new(col, row));
            }
        }
    }

    section.set(layout.total, CellValue::Number(group.total_distance));

    section
}
