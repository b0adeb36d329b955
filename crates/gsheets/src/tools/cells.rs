//! Cell value tools over the `spreadsheets.values` endpoints.
//!
//! Ranges are passed through in A1 notation exactly as the caller wrote them;
//! only `get_last_row` builds one itself.

use schemars::JsonSchema;
use serde::Deserialize;
use tracing::info;

use super::{SheetsToolbox, require_range, require_spreadsheet_id};
use crate::{
    a1,
    error::{Result, SheetsError, ensure_input},
    normalize::{
        self, AppendRowsOutput, BatchReadOutput, BatchWriteOutput, LastRowOutput, ReadCellsOutput,
        StatusOutput, WriteCellsOutput,
    },
    translate::{ListParam, MatrixParam},
    types::{BatchUpdateValuesRequest, CellValue, ValueInputOption, ValueRange, ValueRenderOption},
};

// ============================================================================
// Read Cells Tool
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReadCellsInput {
    /// The ID of the spreadsheet.
    pub spreadsheet_id: String,
    /// A1 range to read, e.g. `Sheet1!A1:D10` or `'My Sheet'!A:A`.
    #[serde(alias = "range_notation")]
    pub range: String,
    /// How values are rendered (default `FORMATTED_VALUE`).
    #[serde(default)]
    pub value_render_option: ValueRenderOption,
}

// ============================================================================
// Write Cells Tool
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct WriteCellsInput {
    /// The ID of the spreadsheet.
    pub spreadsheet_id: String,
    /// A1 range to write, e.g. `Sheet1!A1` (the block grows from its top-left
    /// cell).
    #[serde(alias = "range_notation")]
    pub range: String,
    /// Row-major values, as a 2D array or a JSON-encoded 2D array string.
    pub values: MatrixParam,
    /// How input is interpreted (default `USER_ENTERED`, so `=` starts a
    /// formula).
    #[serde(default)]
    pub value_input_option: ValueInputOption,
}

// ============================================================================
// Batch Read Tool
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct BatchReadInput {
    /// The ID of the spreadsheet.
    pub spreadsheet_id: String,
    /// A1 ranges, as a list or comma-separated string.
    pub ranges: ListParam,
    /// How values are rendered (default `FORMATTED_VALUE`).
    #[serde(default)]
    pub value_render_option: ValueRenderOption,
}

// ============================================================================
// Batch Write Tool
// ============================================================================

/// One block of a batch write.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RangeValues {
    /// A1 range of the block.
    pub range: String,
    /// Row-major values for the block.
    pub values: MatrixParam,
}

/// Batch write entries, given directly or as a JSON-encoded string.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum BatchDataParam {
    Entries(Vec<RangeValues>),
    Encoded(String),
}

impl BatchDataParam {
    fn into_entries(self) -> Result<Vec<RangeValues>> {
        match self {
            Self::Entries(entries) => Ok(entries),
            Self::Encoded(encoded) => serde_json::from_str(&encoded).map_err(|err| {
                SheetsError::validation(format!(
                    "data must be a JSON array of {{range, values}} objects: {err}"
                ))
            }),
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct BatchWriteInput {
    /// The ID of the spreadsheet.
    pub spreadsheet_id: String,
    /// Blocks to write, each `{range, values}`.
    pub data: BatchDataParam,
    /// How input is interpreted (default `USER_ENTERED`).
    #[serde(default)]
    pub value_input_option: ValueInputOption,
}

// ============================================================================
// Clear Cells Tool
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ClearCellsInput {
    /// The ID of the spreadsheet.
    pub spreadsheet_id: String,
    /// A1 range whose values are cleared; formatting is kept.
    #[serde(alias = "range_notation")]
    pub range: String,
}

// ============================================================================
// Append Rows Tool
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AppendRowsInput {
    /// The ID of the spreadsheet.
    pub spreadsheet_id: String,
    /// A1 range locating the table, e.g. `Sheet1!A:D`. Rows go after its last
    /// row with data.
    #[serde(alias = "range_notation")]
    pub range: String,
    /// Rows to append, as a 2D array or a JSON-encoded 2D array string.
    pub values: MatrixParam,
    /// How input is interpreted (default `USER_ENTERED`).
    #[serde(default)]
    pub value_input_option: ValueInputOption,
}

// ============================================================================
// Get Last Row Tool
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetLastRowInput {
    /// The ID of the spreadsheet.
    pub spreadsheet_id: String,
    /// Title of the sheet to inspect.
    #[serde(alias = "sheet")]
    pub sheet_name: String,
    /// Column letters to scan (default `A`).
    #[serde(default = "default_column")]
    pub column: String,
}

fn default_column() -> String {
    "A".to_string()
}

fn require_values(rows: &[Vec<CellValue>]) -> Result<()> {
    ensure_input!(!rows.is_empty(), "values must contain at least one row");
    Ok(())
}

impl SheetsToolbox {
    /// # Read Cells
    ///
    /// Reads a range and returns its values row by row.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is empty or the service rejects it.
    pub async fn read_cells(&self, input: ReadCellsInput) -> Result<ReadCellsOutput> {
        require_spreadsheet_id(&input.spreadsheet_id)?;
        require_range(&input.range)?;
        let response = self
            .handles
            .primary()
            .get_values(&input.spreadsheet_id, &input.range, input.value_render_option)
            .await?;
        Ok(normalize::read_cells(&input.range, response))
    }

    /// # Write Cells
    ///
    /// Overwrites a block of cells starting at the range's top-left cell.
    ///
    /// # Errors
    ///
    /// Returns an error if the values are not a 2D array, are empty, or the
    /// service rejects the write.
    pub async fn write_cells(&self, input: WriteCellsInput) -> Result<WriteCellsOutput> {
        require_spreadsheet_id(&input.spreadsheet_id)?;
        require_range(&input.range)?;
        let values = input.values.into_rows()?;
        require_values(&values)?;

        let body = ValueRange {
            range: Some(input.range.clone()),
            major_dimension: None,
            values,
        };
        let response = self
            .handles
            .primary()
            .update_values(
                &input.spreadsheet_id,
                &input.range,
                &body,
                input.value_input_option,
            )
            .await?;
        info!(range = %response.updated_range, cells = response.updated_cells, "wrote cells");
        Ok(response.into())
    }

    /// # Batch Read
    ///
    /// Reads several ranges in one call. The result maps each requested
    /// range string to its values.
    ///
    /// # Errors
    ///
    /// Returns an error if no ranges are given or the service rejects any of
    /// them.
    pub async fn batch_read(&self, input: BatchReadInput) -> Result<BatchReadOutput> {
        require_spreadsheet_id(&input.spreadsheet_id)?;
        let ranges = input.ranges.into_items();
        ensure_input!(!ranges.is_empty(), "ranges must contain at least one range");
        let response = self
            .handles
            .primary()
            .batch_get_values(&input.spreadsheet_id, &ranges, input.value_render_option)
            .await?;
        Ok(normalize::batch_values(&ranges, response))
    }

    /// # Batch Write
    ///
    /// Writes several blocks in one call.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is malformed or empty, or the service
    /// rejects any block.
    pub async fn batch_write(&self, input: BatchWriteInput) -> Result<BatchWriteOutput> {
        require_spreadsheet_id(&input.spreadsheet_id)?;
        let entries = input.data.into_entries()?;
        ensure_input!(!entries.is_empty(), "data must contain at least one block");

        let data = entries
            .into_iter()
            .map(|entry| {
                require_range(&entry.range)?;
                let values = entry.values.into_rows()?;
                require_values(&values)?;
                Ok(ValueRange {
                    range: Some(entry.range),
                    major_dimension: None,
                    values,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let body = BatchUpdateValuesRequest {
            value_input_option: input.value_input_option,
            data,
        };
        let response = self
            .handles
            .primary()
            .batch_update_values(&input.spreadsheet_id, &body)
            .await?;
        Ok(response.into())
    }

    /// # Clear Cells
    ///
    /// Removes the values in a range, keeping formatting.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is empty or the service rejects it.
    pub async fn clear_cells(&self, input: ClearCellsInput) -> Result<StatusOutput> {
        require_spreadsheet_id(&input.spreadsheet_id)?;
        require_range(&input.range)?;
        let response = self
            .handles
            .primary()
            .clear_values(&input.spreadsheet_id, &input.range)
            .await?;
        let cleared = response.cleared_range.unwrap_or(input.range);
        Ok(StatusOutput::ok(format!("Cleared {cleared}")))
    }

    /// # Append Rows
    ///
    /// Appends rows after the last row of the table found in the range.
    ///
    /// # Errors
    ///
    /// Returns an error if the values are malformed or empty, or the service
    /// rejects the append.
    pub async fn append_rows(&self, input: AppendRowsInput) -> Result<AppendRowsOutput> {
        require_spreadsheet_id(&input.spreadsheet_id)?;
        require_range(&input.range)?;
        let values = input.values.into_rows()?;
        require_values(&values)?;

        let body = ValueRange {
            range: None,
            major_dimension: None,
            values,
        };
        let response = self
            .handles
            .primary()
            .append_values(
                &input.spreadsheet_id,
                &input.range,
                &body,
                input.value_input_option,
            )
            .await?;
        Ok(response.into())
    }

    /// # Get Last Row
    ///
    /// Finds the 1-based number of the last row with data in one column.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is not valid letters or the service
    /// rejects the read (for example an unknown sheet).
    pub async fn get_last_row(&self, input: GetLastRowInput) -> Result<LastRowOutput> {
        require_spreadsheet_id(&input.spreadsheet_id)?;
        let sheet = input.sheet_name.trim();
        ensure_input!(!sheet.is_empty(), "sheet_name must not be empty");
        let column = input.column.trim().to_ascii_uppercase();
        ensure_input!(
            a1::column_index(&column).is_some(),
            "column '{}' is not a column letter reference",
            input.column
        );

        let range = a1::qualify(sheet, &format!("{column}:{column}"));
        let response = self
            .handles
            .primary()
            .get_values(&input.spreadsheet_id, &range, ValueRenderOption::FormattedValue)
            .await?;
        Ok(LastRowOutput {
            last_row: normalize::last_row(&response),
            sheet: sheet.to_string(),
            column,
        })
    }
}
