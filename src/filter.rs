use crate::schema::{CellValue, ColumnBindings, SourceTable};
use log::debug;

/// Header placeholder that sometimes leaks into the employee column when the
/// template's own caption row is copied into the master data.
pub const EMPLOYEE_PLACEHOLDER: &str = "colaborador";

/// One source row viewed through the column bindings, kept only when its
/// distance is a positive number.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub employee: String,
    pub distance: f64,
    pub day: CellValue,
    pub origin: CellValue,
    pub destination: CellValue,
    pub objective_time: CellValue,
    pub company_display: CellValue,
    pub company_address: CellValue,
    pub company_tax_id: CellValue,
    pub month: CellValue,
    pub year: CellValue,
    pub employee_address: CellValue,
    pub employee_tax_id: CellValue,
    pub vehicle: CellValue,
}

/// All records of one employee within one company table.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityGroup {
    pub employee: String,
    pub records: Vec<Record>,
    pub total_distance: f64,
}

/// Resolved column indices for one table. Only the distance column is
/// required; everything else degrades to blank when absent.
struct BoundColumns {
    employee: Option<usize>,
    distance: usize,
    day: Option<usize>,
    origin: Option<usize>,
    destination: Option<usize>,
    objective_time: Option<usize>,
    company_display: Option<usize>,
    company_address: Option<usize>,
    company_tax_id: Option<usize>,
    month: Option<usize>,
    year: Option<usize>,
    employee_address: Option<usize>,
    employee_tax_id: Option<usize>,
    vehicle: Option<usize>,
}

impl BoundColumns {
    fn resolve(table: &SourceTable, bindings: &ColumnBindings) -> Option<Self> {
        Some(Self {
            distance: table.column_index(&bindings.distance)?,
            employee: table.column_index(&bindings.employee),
            day: table.column_index(&bindings.day),
            origin: table.column_index(&bindings.origin),
            destination: table.column_index(&bindings.destination),
            objective_time: table.column_index(&bindings.objective_time),
            company_display: table.column_index(&bindings.company_display),
            company_address: table.column_index(&bindings.company_address),
            company_tax_id: table.column_index(&bindings.company_tax_id),
            month: table.column_index(&bindings.month),
            year: table.column_index(&bindings.year),
            employee_address: table.column_index(&bindings.employee_address),
            employee_tax_id: table.column_index(&bindings.employee_tax_id),
            vehicle: table.column_index(&bindings.vehicle),
        })
    }
}

fn cell_or_empty(table: &SourceTable, row: usize, col: Option<usize>) -> CellValue {
    match col {
        Some(col) => table.cell(row, col).clone(),
        None => CellValue::Empty,
    }
}

/// Selects the valid records of a table and groups them by employee.
///
/// Returns `None` (skip, not an error) when the table has no distance
/// column, the distance column holds no values at all, or no row has a
/// positive distance. Groups keep first-seen employee order; groups named
/// after the header placeholder or with an empty name are dropped.
pub fn filter_table(table: &SourceTable, bindings: &ColumnBindings) -> Option<Vec<EntityGroup>> {
    let columns = BoundColumns::resolve(table, bindings)?;

    let all_blank = (0..table.rows.len()).all(|row| table.cell(row, columns.distance).is_blank());
    if all_blank {
        debug!("table '{}': distance column entirely empty", table.company);
        return None;
    }

    let mut groups: Vec<EntityGroup> = Vec::new();
    for row in 0..table.rows.len() {
        let distance = match table.cell(row, columns.distance).as_f64() {
            Some(d) if d > 0.0 => d,
            _ => continue,
        };

        let employee = cell_or_empty(table, row, columns.employee)
            .to_text()
            .trim()
            .to_string();

        let record = Record {
            employee: employee.clone(),
            distance,
            day: cell_or_empty(table, row, columns.day),
            origin: cell_or_empty(table, row, columns.origin),
            destination: cell_or_empty(table, row, columns.destination),
            objective_time: cell_or_empty(table, row, columns.objective_time),
            company_display: cell_or_empty(table, row, columns.company_display),
            company_address: cell_or_empty(table, row, columns.company_address),
            company_tax_id: cell_or_empty(table, row, columns.company_tax_id),
            month: cell_or_empty(table, row, columns.month),
            year: cell_or_empty(table, row, columns.year),
            employee_address: cell_or_empty(table, row, columns.employee_address),
            employee_tax_id: cell_or_empty(table, row, columns.employee_tax_id),
            vehicle: cell_or_empty(table, row, columns.vehicle),
        };

        match groups.iter_mut().find(|g| g.employee == employee) {
            Some(group) => {
                group.total_distance += record.distance;
                group.records.push(record);
            }
            None => groups.push(EntityGroup {
                employee,
                total_distance: record.distance,
                records: vec![record],
            }),
        }
    }

    if groups.is_empty() {
        debug!("table '{}': no rows with positive distance", table.company);
        return None;
    }

    groups.retain(|g| {
        !g.employee.is_empty() && !g.employee.eq_ignore_ascii_case(EMPLOYEE_PLACEHOLDER)
    });

    if groups.is_empty() {
        return None;
    }

    Some(groups)
}
