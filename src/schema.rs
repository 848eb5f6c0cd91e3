use chrono::Datelike;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

static EMPTY_CELL: CellValue = CellValue::Empty;

/// A single spreadsheet cell as it arrives from the master workbook.
///
/// Human-maintained sheets mix numbers, free text and blanks in the same
/// column, so every field is read through this type and coerced on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CellValue {
    #[schemars(description = "A numeric cell (distances, days, years, rates)")]
    Number(f64),

    #[schemars(description = "A text cell (names, addresses, tax ids)")]
    Text(String),

    #[schemars(description = "An empty/missing cell, serialized as null")]
    Empty,
}

impl CellValue {
    /// True for missing cells and for whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// Numeric view of the cell. Numeric-looking text is accepted because
    /// manually entered sheets frequently store numbers as strings.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            CellValue::Empty => None,
        }
    }

    /// Text view of the cell; numbers render without a trailing `.0`.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Text(s) => s.clone(),
            CellValue::Empty => String::new(),
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_string())
        }
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::from(s.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SourceTable {
    #[schemars(description = "Company name, taken from the sheet/table identifier")]
    pub company: String,

    #[schemars(description = "Ordered column headers; matched after trimming")]
    pub columns: Vec<String>,

    #[schemars(description = "Raw data rows. Rows may be ragged; missing cells read as empty")]
    pub rows: Vec<Vec<CellValue>>,
}

impl SourceTable {
    pub fn new(company: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            company: company.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Trims the company name and every column header in place.
    pub fn normalize(&mut self) {
        self.company = self.company.trim().to_string();
        for col in &mut self.columns {
            *col = col.trim().to_string();
        }
    }

    /// Index of a column by trimmed header match.
    pub fn column_index(&self, header: &str) -> Option<usize> {
        let wanted = header.trim();
        self.columns.iter().position(|c| c.trim() == wanted)
    }

    /// Cell at (row, column), tolerating ragged rows.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }
}

/// The master workbook: one table per company, in workbook order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct MasterWorkbook {
    pub tables: Vec<SourceTable>,
}

impl MasterWorkbook {
    pub fn normalize(&mut self) {
        for table in &mut self.tables {
            table.normalize();
        }
    }

    pub fn get(&self, company: &str) -> Option<&SourceTable> {
        self.tables.iter().find(|t| t.company == company)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(MasterWorkbook)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

/// Field-to-column-header binding table.
///
/// Lookups into a source table always go through these bindings rather than
/// ad-hoc header strings, so a misnamed column is an enumerable configuration
/// fact instead of a silent blank. Defaults match the production master
/// workbook headers, template placeholders included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ColumnBindings {
    #[schemars(description = "Employee name column; rows group into one report section per employee")]
    pub employee: String,

    #[schemars(description = "Distance column (km). Required: tables without it are skipped")]
    pub distance: String,

    #[schemars(description = "Day-of-month column, expected 1-30")]
    pub day: String,

    pub company_display: String,
    pub company_address: String,
    pub company_tax_id: String,
    pub month: String,
    pub year: String,
    pub origin: String,
    pub destination: String,
    pub objective_time: String,
    pub employee_address: String,
    pub employee_tax_id: String,
    pub vehicle: String,
}

impl Default for ColumnBindings {
    fn default() -> Self {
        Self {
            employee: "Nome".to_string(),
            distance: "KLM".to_string(),
            day: "Dia  {{dia}}".to_string(),
            company_display: "Nome Empresa {{empresa}}".to_string(),
            company_address: "Morada Empresa {{moradaempresa}}".to_string(),
            company_tax_id: "NIF Empresa {{nifempresa}}".to_string(),
            month: "Mes {{mes}}".to_string(),
            year: "Ano {{ano}}".to_string(),
            origin: "Local de Origem {{localdeorigem}}".to_string(),
            destination: "Local de Destino {{localdedestino}}".to_string(),
            objective_time: "Tempo Objectivo {{tempoobjectivo}}".to_string(),
            employee_address: "Morada {{morada}}".to_string(),
            employee_tax_id: "NIF Colaborador {{nifcolaborador}}".to_string(),
            vehicle: "Viatura {{viatura}}".to_string(),
        }
    }
}

/// The month/year label under which a run's documents and ledger entries are
/// filed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Period {
    #[schemars(description = "Month name, e.g. 'August'")]
    pub month: String,

    #[schemars(description = "Calendar year, e.g. 2026")]
    pub year: i32,
}

impl Period {
    pub fn new(month: impl Into<String>, year: i32) -> Self {
        Self {
            month: month.into(),
            year,
        }
    }

    /// Period for the wall-clock month the run happens in.
    pub fn current() -> Self {
        let now = chrono::Local::now();
        Self {
            month: now.format("%B").to_string(),
            year: now.year(),
        }
    }

    /// Directory name for this period's artifacts, e.g. `August_2026`.
    pub fn folder_name(&self) -> String {
        format!("{}_{}", self.month, self.year)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month, self.year)
    }
}
