//! Response normalization: service replies to flat, JSON-friendly records.
//!
//! Optional response fields the service leaves out become zero or empty
//! rather than errors. The only hard failures are replies that lack the one
//! member a tool exists to return (for example the id of a new sheet).

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::Serialize;

use crate::{
    error::{Result, SheetsError},
    translate::SharePlan,
    types::{
        AppendValuesResponse, BatchGetValuesResponse, BatchUpdateSpreadsheetResponse,
        BatchUpdateValuesResponse, CellValue, Permission, PermissionRole, PermissionType, Sheet,
        SheetProperties, Spreadsheet, UpdateValuesResponse, ValueRange,
    },
};

/// Result of a mutation that has nothing to report beyond success.
#[derive(Debug, Clone, Serialize, JsonSchema, PartialEq, Eq)]
pub struct StatusOutput {
    pub success: bool,
    pub message: String,
}

impl StatusOutput {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

// ============================================================================
// Spreadsheet metadata
// ============================================================================

#[derive(Debug, Clone, Serialize, JsonSchema, PartialEq, Eq)]
pub struct SheetSummary {
    pub sheet_id: i64,
    pub title: String,
    pub index: i64,
    pub row_count: i64,
    pub column_count: i64,
}

impl From<&SheetProperties> for SheetSummary {
    fn from(properties: &SheetProperties) -> Self {
        let grid = properties.grid_properties.clone().unwrap_or_default();
        Self {
            sheet_id: properties.sheet_id.unwrap_or_default(),
            title: properties.title.clone().unwrap_or_default(),
            index: properties.index.unwrap_or_default(),
            row_count: grid.row_count.unwrap_or_default(),
            column_count: grid.column_count.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SpreadsheetInfo {
    pub spreadsheet_id: String,
    pub title: String,
    pub url: String,
    pub locale: String,
    pub time_zone: String,
    pub sheets: Vec<SheetSummary>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CreatedSpreadsheet {
    pub spreadsheet_id: String,
    pub title: String,
    pub url: String,
    pub sheets: Vec<String>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SheetList {
    pub sheets: Vec<SheetSummary>,
}

/// Browser URL of a spreadsheet, preferring the one the service reports.
pub fn spreadsheet_url(spreadsheet: &Spreadsheet) -> String {
    spreadsheet.spreadsheet_url.clone().unwrap_or_else(|| {
        format!(
            "https://docs.google.com/spreadsheets/d/{}/edit",
            spreadsheet.spreadsheet_id
        )
    })
}

pub fn sheet_summaries(spreadsheet: &Spreadsheet) -> Vec<SheetSummary> {
    spreadsheet
        .sheets
        .iter()
        .map(|sheet| SheetSummary::from(&sheet.properties))
        .collect()
}

pub fn spreadsheet_info(spreadsheet: &Spreadsheet) -> SpreadsheetInfo {
    SpreadsheetInfo {
        spreadsheet_id: spreadsheet.spreadsheet_id.clone(),
        title: spreadsheet.properties.title.clone(),
        url: spreadsheet_url(spreadsheet),
        locale: spreadsheet.properties.locale.clone().unwrap_or_default(),
        time_zone: spreadsheet.properties.time_zone.clone().unwrap_or_default(),
        sheets: sheet_summaries(spreadsheet),
    }
}

pub fn created_spreadsheet(spreadsheet: &Spreadsheet) -> CreatedSpreadsheet {
    CreatedSpreadsheet {
        spreadsheet_id: spreadsheet.spreadsheet_id.clone(),
        title: spreadsheet.properties.title.clone(),
        url: spreadsheet_url(spreadsheet),
        sheets: spreadsheet
            .sheets
            .iter()
            .filter_map(|sheet| sheet.properties.title.clone())
            .collect(),
    }
}

/// Linear scan for the sheet whose title matches exactly.
pub fn find_sheet<'a>(spreadsheet: &'a Spreadsheet, title: &str) -> Option<&'a Sheet> {
    spreadsheet
        .sheets
        .iter()
        .find(|sheet| sheet.properties.title.as_deref() == Some(title))
}

/// Resolves a title to its sheet id.
///
/// # Errors
///
/// Returns [`SheetsError::SheetNotFound`] naming the title and spreadsheet
/// when no sheet matches.
pub fn sheet_id_for_title(spreadsheet: &Spreadsheet, title: &str) -> Result<i64> {
    find_sheet(spreadsheet, title)
        .and_then(|sheet| sheet.properties.sheet_id)
        .ok_or_else(|| SheetsError::SheetNotFound {
            title: title.to_string(),
            spreadsheet_id: spreadsheet.spreadsheet_id.clone(),
        })
}

// ============================================================================
// Structural replies
// ============================================================================

/// Properties of the sheet created by `addSheet` or `duplicateSheet`.
///
/// # Errors
///
/// Returns [`SheetsError::MalformedResponse`] when the first reply carries
/// neither.
pub fn new_sheet(response: &BatchUpdateSpreadsheetResponse) -> Result<SheetSummary> {
    response
        .replies
        .first()
        .and_then(|reply| reply.add_sheet.as_ref().or(reply.duplicate_sheet.as_ref()))
        .map(|reply| SheetSummary::from(&reply.properties))
        .ok_or_else(|| SheetsError::MalformedResponse("reply is missing the new sheet".into()))
}

/// Id of the chart created by `addChart`.
///
/// # Errors
///
/// Returns [`SheetsError::MalformedResponse`] when the reply has no chart id.
pub fn new_chart_id(response: &BatchUpdateSpreadsheetResponse) -> Result<i64> {
    response
        .replies
        .first()
        .and_then(|reply| reply.add_chart.as_ref())
        .and_then(|reply| reply.chart.chart_id)
        .ok_or_else(|| SheetsError::MalformedResponse("reply is missing the chart id".into()))
}

#[derive(Debug, Clone, Default, Serialize, JsonSchema, PartialEq, Eq)]
pub struct FindReplaceOutput {
    pub occurrences_changed: u64,
    pub values_changed: u64,
    pub formulas_changed: u64,
    pub rows_changed: u64,
    pub sheets_changed: u64,
}

/// Counters from a `findReplace` reply; no matches leaves them at zero.
pub fn find_replace_counts(response: &BatchUpdateSpreadsheetResponse) -> FindReplaceOutput {
    response
        .replies
        .first()
        .and_then(|reply| reply.find_replace.as_ref())
        .map(|counts| FindReplaceOutput {
            occurrences_changed: counts.occurrences_changed,
            values_changed: counts.values_changed,
            formulas_changed: counts.formulas_changed,
            rows_changed: counts.rows_changed,
            sheets_changed: counts.sheets_changed,
        })
        .unwrap_or_default()
}

// ============================================================================
// Charts
// ============================================================================

#[derive(Debug, Clone, Serialize, JsonSchema, PartialEq, Eq)]
pub struct ChartSummary {
    pub chart_id: i64,
    pub sheet: String,
    pub sheet_id: i64,
    pub title: String,
    pub anchor_row: u32,
    pub anchor_column: u32,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ChartList {
    pub charts: Vec<ChartSummary>,
}

/// Every embedded chart, in sheet order.
pub fn chart_summaries(spreadsheet: &Spreadsheet) -> Vec<ChartSummary> {
    spreadsheet
        .sheets
        .iter()
        .flat_map(|sheet| {
            let properties = &sheet.properties;
            sheet.charts.iter().filter_map(move |chart| {
                let anchor = chart
                    .position
                    .as_ref()
                    .and_then(|position| position.overlay_position.as_ref())
                    .and_then(|overlay| overlay.anchor_cell)
                    .unwrap_or_default();
                Some(ChartSummary {
                    chart_id: chart.chart_id?,
                    sheet: properties.title.clone().unwrap_or_default(),
                    sheet_id: properties.sheet_id.unwrap_or_default(),
                    title: chart
                        .spec
                        .as_ref()
                        .and_then(|spec| spec.title.clone())
                        .unwrap_or_default(),
                    anchor_row: anchor.row_index,
                    anchor_column: anchor.column_index,
                })
            })
        })
        .collect()
}

// ============================================================================
// Values
// ============================================================================

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ReadCellsOutput {
    /// The range the service actually read, in A1 notation.
    pub range: String,
    /// Row-major values; empty when the range holds no data.
    pub values: Vec<Vec<CellValue>>,
    pub row_count: usize,
    /// Width of the widest returned row.
    pub column_count: usize,
}

pub fn read_cells(requested: &str, response: ValueRange) -> ReadCellsOutput {
    let row_count = response.values.len();
    let column_count = response.values.iter().map(Vec::len).max().unwrap_or(0);
    ReadCellsOutput {
        range: response.range.unwrap_or_else(|| requested.to_string()),
        values: response.values,
        row_count,
        column_count,
    }
}

/// Values keyed by the caller's own range strings, in request order.
#[derive(Debug, Clone, Default, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct BatchReadOutput(pub IndexMap<String, Vec<Vec<CellValue>>>);

/// Pairs the i-th returned range with the i-th requested range.
///
/// The service may echo ranges in a different spelling (`'Sheet1'!A1:A2`),
/// so keys always come from the request. Missing trailing results map to an
/// empty matrix; a repeated request string keeps its last result.
pub fn batch_values(requested: &[String], response: BatchGetValuesResponse) -> BatchReadOutput {
    let mut returned = response.value_ranges.into_iter();
    let mut map = IndexMap::with_capacity(requested.len());
    for range in requested {
        let values = returned
            .next()
            .map(|value_range| value_range.values)
            .unwrap_or_default();
        map.insert(range.clone(), values);
    }
    BatchReadOutput(map)
}

#[derive(Debug, Clone, Serialize, JsonSchema, PartialEq, Eq)]
pub struct WriteCellsOutput {
    pub updated_range: String,
    pub updated_rows: u64,
    pub updated_columns: u64,
    pub updated_cells: u64,
}

impl From<UpdateValuesResponse> for WriteCellsOutput {
    fn from(response: UpdateValuesResponse) -> Self {
        Self {
            updated_range: response.updated_range,
            updated_rows: response.updated_rows,
            updated_columns: response.updated_columns,
            updated_cells: response.updated_cells,
        }
    }
}

#[derive(Debug, Clone, Serialize, JsonSchema, PartialEq, Eq)]
pub struct AppendRowsOutput {
    /// The table the rows were appended after, when the service reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_range: Option<String>,
    pub updated_range: String,
    pub updated_rows: u64,
    pub updated_cells: u64,
}

impl From<AppendValuesResponse> for AppendRowsOutput {
    fn from(response: AppendValuesResponse) -> Self {
        Self {
            table_range: response.table_range,
            updated_range: response.updates.updated_range,
            updated_rows: response.updates.updated_rows,
            updated_cells: response.updates.updated_cells,
        }
    }
}

#[derive(Debug, Clone, Serialize, JsonSchema, PartialEq, Eq)]
pub struct BatchWriteOutput {
    pub total_updated_rows: u64,
    pub total_updated_columns: u64,
    pub total_updated_cells: u64,
    pub total_updated_sheets: u64,
}

impl From<BatchUpdateValuesResponse> for BatchWriteOutput {
    fn from(response: BatchUpdateValuesResponse) -> Self {
        Self {
            total_updated_rows: response.total_updated_rows,
            total_updated_columns: response.total_updated_columns,
            total_updated_cells: response.total_updated_cells,
            total_updated_sheets: response.total_updated_sheets,
        }
    }
}

#[derive(Debug, Clone, Serialize, JsonSchema, PartialEq, Eq)]
pub struct LastRowOutput {
    /// 1-based number of the last row holding data in the column; 0 when
    /// the column is empty.
    pub last_row: u64,
    pub sheet: String,
    pub column: String,
}

/// Counts rows in a full-column read.
///
/// The values API trims trailing empty rows, so the length of the returned
/// list is the last row with data. Blank cells above it still count.
pub fn last_row(response: &ValueRange) -> u64 {
    u64::try_from(response.values.len()).unwrap_or(u64::MAX)
}

// ============================================================================
// Sharing
// ============================================================================

#[derive(Debug, Clone, Serialize, JsonSchema, PartialEq, Eq)]
pub struct ShareOutput {
    pub permission_id: String,
    pub role: PermissionRole,
    #[serde(rename = "type")]
    pub permission_type: PermissionType,
    /// Grantee address, or `anyone` for public link sharing.
    pub email: String,
}

pub fn shared(permission: Permission, plan: &SharePlan) -> ShareOutput {
    let requested = &plan.permission;
    ShareOutput {
        permission_id: permission.id,
        role: permission.role.unwrap_or(requested.role),
        permission_type: permission
            .permission_type
            .unwrap_or(requested.permission_type),
        email: match requested.permission_type {
            PermissionType::Anyone => "anyone".to_string(),
            PermissionType::User => requested.email_address.clone().unwrap_or_default(),
        },
    }
}
