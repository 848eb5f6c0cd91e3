use crate::error::{ReportError, Result};
use std::fmt;

/// Number of day slots in a report section's grid. Slot `i` holds day `i`.
pub const DAY_SLOTS: u32 = 30;

/// A spreadsheet-style cell coordinate, e.g. `F40`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    pub col: char,
    pub row: u32,
}

impl CellRef {
    pub const fn new(col: char, row: u32) -> Self {
        Self { col, row }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.col, self.row)
    }
}

/// Immutable coordinate map of the report template.
///
/// The template itself is an external document; this descriptor records where
/// each bound field lands in it. Rendering never mutates a shared template
/// object, it produces a fresh section value from this map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub company: CellRef,
    pub company_display: CellRef,
    pub company_address: CellRef,
    pub company_tax_id: CellRef,
    pub month: CellRef,
    pub year: CellRef,
    pub employee: CellRef,
    pub employee_address: CellRef,
    pub employee_tax_id: CellRef,
    pub vehicle: CellRef,
    pub total: CellRef,
    pub rate: CellRef,

    /// First row of the 30-row day grid.
    pub grid_first_row: u32,
    pub day_col: char,
    pub origin_col: char,
    pub destination_col: char,
    pub objective_time_col: char,
    pub distance_col: char,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            company: CellRef::new('A', 3),
            company_display: CellRef::new('A', 4),
            company_address: CellRef::new('B', 5),
            company_tax_id: CellRef::new('C', 6),
            month: CellRef::new('E', 5),
            year: CellRef::new('F', 5),
            employee: CellRef::new('B', 45),
            employee_address: CellRef::new('B', 46),
            employee_tax_id: CellRef::new('E', 45),
            vehicle: CellRef::new('E', 46),
            total: CellRef::new('F', 40),
            rate: CellRef::new('D', 42),
            grid_first_row: 9,
            day_col: 'A',
            origin_col: 'B',
            destination_col: 'C',
            objective_time_col: 'D',
            distance_col: 'F',
        }
    }
}

impl Layout {
    pub fn grid_last_row(&self) -> u32 {
        self.grid_first_row + DAY_SLOTS - 1
    }

    /// Row holding the slot for a given day (day must be in 1..=DAY_SLOTS).
    pub fn slot_row(&self, day: u32) -> u32 {
        self.grid_first_row + day - 1
    }

    fn grid_columns(&self) -> [char; 5] {
        [
            self.day_col,
            self.origin_col,
            self.destination_col,
            self.objective_time_col,
            self.distance_col,
        ]
    }

    pub fn data_columns(&self) -> [char; 4] {
        [
            self.origin_col,
            self.destination_col,
            self.objective_time_col,
            self.distance_col,
        ]
    }

    fn named_cells(&self) -> [(&'static str, CellRef); 12] {
        [
            ("company", self.company),
            ("company_display", self.company_display),
            ("company_address", self.company_address),
            ("company_tax_id", self.company_tax_id),
            ("month", self.month),
            ("year", self.year),
            ("employee", self.employee),
            ("employee_address", self.employee_address),
            ("employee_tax_id", self.employee_tax_id),
            ("vehicle", self.vehicle),
            ("total", self.total),
            ("rate", self.rate),
        ]
    }

    fn grid_contains(&self, cell: CellRef) -> bool {
        cell.row >= self.grid_first_row
            && cell.row <= self.grid_last_row()
            && self.grid_columns().contains(&cell.col)
    }

    /// Checks the binding table against the grid band. Run once at startup so
    /// that a mislaid coordinate is a configuration error, not a silently
    /// overwritten cell at render time.
    pub fn validate(&self) -> Result<()> {
        if self.grid_first_row == 0 {
            return Err(ReportError::InvalidLayout(
                "day grid cannot start at row 0".to_string(),
            ));
        }

        let mut columns = self.grid_columns();
        columns.sort_unstable();
        if columns.windows(2).any(|pair| pair[0] == pair[1]) {
            return Err(ReportError::InvalidLayout(format!(
                "grid columns must be distinct, got {:?}",
                self.grid_columns()
            )));
        }

        for (name, cell) in self.named_cells() {
            if self.grid_contains(cell) {
                return Err(ReportError::InvalidLayout(format!(
                    "'{}' cell {} collides with the day grid (rows {}..={})",
                    name,
                    cell,
                    self.grid_first_row,
                    self.grid_last_row()
                )));
            }
        }

        Ok(())
    }
}
