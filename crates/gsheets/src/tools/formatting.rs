//! Cell formatting and merging.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{SheetsToolbox, require_spreadsheet_id};
use crate::{
    error::Result,
    normalize::StatusOutput,
    translate::{self, CellSpan, FormatSpec, SheetSelector},
    types::{HorizontalAlignment, MergeType},
};

// ============================================================================
// Format Cells Tool
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FormatCellsInput {
    /// The ID of the spreadsheet.
    pub spreadsheet_id: String,
    /// Numeric sheet id, or the sheet's title.
    #[serde(alias = "sheet_id", alias = "sheet_name")]
    pub sheet: SheetSelector,
    /// 0-based first row.
    pub start_row: u32,
    /// 0-based end row, exclusive.
    pub end_row: u32,
    /// 0-based first column.
    pub start_col: u32,
    /// 0-based end column, exclusive.
    pub end_col: u32,
    /// Set or clear bold text.
    #[serde(default)]
    pub bold: Option<bool>,
    /// Set or clear italic text.
    #[serde(default)]
    pub italic: Option<bool>,
    /// Font size in points; 0 leaves it unchanged.
    #[serde(default)]
    pub font_size: Option<u32>,
    /// Text color as `#RRGGBB`.
    #[serde(default)]
    pub font_color: Option<String>,
    /// Fill color as `#RRGGBB`.
    #[serde(default)]
    pub background_color: Option<String>,
    /// Horizontal alignment.
    #[serde(default, alias = "horizontal_alignment")]
    pub alignment: Option<HorizontalAlignment>,
}

#[derive(Debug, Clone, Serialize, JsonSchema, PartialEq, Eq)]
pub struct FormatCellsOutput {
    pub success: bool,
    pub message: String,
    /// Field paths that were written, in request order. Empty when nothing
    /// recognizable was requested.
    pub applied_fields: Vec<String>,
}

impl FormatCellsOutput {
    fn unchanged() -> Self {
        Self {
            success: true,
            message: "No formatting changes requested".to_string(),
            applied_fields: Vec::new(),
        }
    }
}

// ============================================================================
// Merge Cells Tool
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct MergeCellsInput {
    /// The ID of the spreadsheet.
    pub spreadsheet_id: String,
    /// Numeric sheet id, or the sheet's title.
    #[serde(alias = "sheet_id", alias = "sheet_name")]
    pub sheet: SheetSelector,
    /// 0-based first row.
    pub start_row: u32,
    /// 0-based end row, exclusive.
    pub end_row: u32,
    /// 0-based first column.
    pub start_col: u32,
    /// 0-based end column, exclusive.
    pub end_col: u32,
    /// How to merge (default `MERGE_ALL`).
    #[serde(default)]
    pub merge_type: MergeType,
}

impl SheetsToolbox {
    /// # Format Cells
    ///
    /// Applies text and fill formatting to a rectangular range. Only the
    /// given fields change. Colors that are not `#RRGGBB` are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is empty, the sheet cannot be found, or
    /// the service rejects the request. A call with no recognized fields
    /// succeeds without contacting the service.
    pub async fn format_cells(&self, input: FormatCellsInput) -> Result<FormatCellsOutput> {
        require_spreadsheet_id(&input.spreadsheet_id)?;
        let spec = FormatSpec {
            bold: input.bold,
            italic: input.italic,
            font_size: input.font_size,
            font_color: input.font_color,
            background_color: input.background_color,
            horizontal_alignment: input.alignment,
        };
        let (_, fields) = translate::cell_format(&spec);
        if fields.is_empty() {
            debug!("no recognized format fields; skipping request");
            return Ok(FormatCellsOutput::unchanged());
        }

        let span = CellSpan::new(input.start_row, input.end_row, input.start_col, input.end_col)?;
        let sheet_id = self
            .resolve_sheet(&input.spreadsheet_id, &input.sheet)
            .await?;
        let Some((request, fields)) = translate::repeat_cell(span.on_sheet(sheet_id), &spec) else {
            return Ok(FormatCellsOutput::unchanged());
        };
        self.apply(&input.spreadsheet_id, request).await?;
        Ok(FormatCellsOutput {
            success: true,
            message: format!("Formatted {} field(s)", fields.len()),
            applied_fields: fields.into_iter().map(ToString::to_string).collect(),
        })
    }

    /// # Merge Cells
    ///
    /// Merges a rectangular range into one cell, or one cell per row or
    /// column.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is empty, the sheet cannot be found, or
    /// the service rejects the request.
    pub async fn merge_cells(&self, input: MergeCellsInput) -> Result<StatusOutput> {
        require_spreadsheet_id(&input.spreadsheet_id)?;
        let span = CellSpan::new(input.start_row, input.end_row, input.start_col, input.end_col)?;
        let sheet_id = self
            .resolve_sheet(&input.spreadsheet_id, &input.sheet)
            .await?;
        self.apply(
            &input.spreadsheet_id,
            translate::merge_cells(span.on_sheet(sheet_id), input.merge_type),
        )
        .await?;
        Ok(StatusOutput::ok("Cells merged"))
    }
}
