//! Row and column tools.

use schemars::JsonSchema;
use serde::Deserialize;

use super::{SheetsToolbox, require_spreadsheet_id};
use crate::{
    error::Result,
    normalize::StatusOutput,
    translate::{self, ColumnWidth, SheetSelector},
    types::Dimension,
};

// ============================================================================
// Insert / Delete Rows Tools
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RowsInput {
    /// The ID of the spreadsheet.
    pub spreadsheet_id: String,
    /// Numeric sheet id, or the sheet's title.
    #[serde(alias = "sheet_id", alias = "sheet_name")]
    pub sheet: SheetSelector,
    /// 0-based index of the first row (row 1 is index 0).
    pub start_index: u32,
    /// Number of rows.
    #[serde(alias = "count")]
    pub num_rows: u32,
}

// ============================================================================
// Insert / Delete Columns Tools
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ColumnsInput {
    /// The ID of the spreadsheet.
    pub spreadsheet_id: String,
    /// Numeric sheet id, or the sheet's title.
    #[serde(alias = "sheet_id", alias = "sheet_name")]
    pub sheet: SheetSelector,
    /// 0-based index of the first column (column A is index 0).
    pub start_index: u32,
    /// Number of columns.
    #[serde(alias = "count")]
    pub num_columns: u32,
}

// ============================================================================
// Set Column Width Tool
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SetColumnWidthInput {
    /// The ID of the spreadsheet.
    pub spreadsheet_id: String,
    /// Numeric sheet id, or the sheet's title.
    #[serde(alias = "sheet_id", alias = "sheet_name")]
    pub sheet: SheetSelector,
    /// 0-based first column.
    pub start_col: u32,
    /// 0-based end column, exclusive.
    pub end_col: u32,
    /// Width in pixels.
    pub width: u32,
}

impl SheetsToolbox {
    /// # Insert Rows
    ///
    /// Inserts empty rows before `start_index`. New rows copy the formatting
    /// of the row above, except at the top of the sheet.
    ///
    /// # Errors
    ///
    /// Returns an error if `num_rows` is zero, the sheet cannot be found, or
    /// the service rejects the request.
    pub async fn insert_rows(&self, input: RowsInput) -> Result<StatusOutput> {
        self.change_dimension(
            &input.spreadsheet_id,
            &input.sheet,
            Dimension::Rows,
            input.start_index,
            input.num_rows,
            true,
        )
        .await
    }

    /// # Delete Rows
    ///
    /// Deletes `num_rows` rows starting at `start_index`.
    ///
    /// # Errors
    ///
    /// Returns an error if `num_rows` is zero, the sheet cannot be found, or
    /// the service rejects the request.
    pub async fn delete_rows(&self, input: RowsInput) -> Result<StatusOutput> {
        self.change_dimension(
            &input.spreadsheet_id,
            &input.sheet,
            Dimension::Rows,
            input.start_index,
            input.num_rows,
            false,
        )
        .await
    }

    /// # Insert Columns
    ///
    /// Inserts empty columns before `start_index`.
    ///
    /// # Errors
    ///
    /// Returns an error if `num_columns` is zero, the sheet cannot be found,
    /// or the service rejects the request.
    pub async fn insert_columns(&self, input: ColumnsInput) -> Result<StatusOutput> {
        self.change_dimension(
            &input.spreadsheet_id,
            &input.sheet,
            Dimension::Columns,
            input.start_index,
            input.num_columns,
            true,
        )
        .await
    }

    /// # Delete Columns
    ///
    /// Deletes `num_columns` columns starting at `start_index`.
    ///
    /// # Errors
    ///
    /// Returns an error if `num_columns` is zero, the sheet cannot be found,
    /// or the service rejects the request.
    pub async fn delete_columns(&self, input: ColumnsInput) -> Result<StatusOutput> {
        self.change_dimension(
            &input.spreadsheet_id,
            &input.sheet,
            Dimension::Columns,
            input.start_index,
            input.num_columns,
            false,
        )
        .await
    }

    /// # Set Column Width
    ///
    /// Sets the pixel width of the columns `[start_col, end_col)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the column span is empty, the width is zero, the
    /// sheet cannot be found, or the service rejects the request.
    pub async fn set_column_width(&self, input: SetColumnWidthInput) -> Result<StatusOutput> {
        require_spreadsheet_id(&input.spreadsheet_id)?;
        let width = ColumnWidth::new(input.start_col, input.end_col, input.width)?;
        let sheet_id = self
            .resolve_sheet(&input.spreadsheet_id, &input.sheet)
            .await?;
        self.apply(&input.spreadsheet_id, width.into_request(sheet_id))
            .await?;
        Ok(StatusOutput::ok(format!(
            "Set width of columns {}-{} to {}px",
            input.start_col,
            input.end_col - 1,
            input.width
        )))
    }

    async fn change_dimension(
        &self,
        spreadsheet_id: &str,
        sheet: &SheetSelector,
        dimension: Dimension,
        start: u32,
        count: u32,
        insert: bool,
    ) -> Result<StatusOutput> {
        require_spreadsheet_id(spreadsheet_id)?;
        let span = translate::dimension_span(start, count)?;
        let sheet_id = self.resolve_sheet(spreadsheet_id, sheet).await?;
        let range = translate::dimension_range(sheet_id, dimension, span);
        let request = if insert {
            translate::insert_dimension(range)
        } else {
            translate::delete_dimension(range)
        };
        self.apply(spreadsheet_id, request).await?;

        let noun = match dimension {
            Dimension::Rows => "row(s)",
            Dimension::Columns => "column(s)",
        };
        let verb = if insert { "Inserted" } else { "Deleted" };
        Ok(StatusOutput::ok(format!(
            "{verb} {count} {noun} at index {start}"
        )))
    }
}
