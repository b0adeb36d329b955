//! Embedded chart tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{SheetsToolbox, require_spreadsheet_id};
use crate::{
    a1::A1Range,
    error::{Result, ensure_input},
    normalize::{self, ChartList, StatusOutput},
    translate::{self, ChartRequest, ColumnsParam, SheetSelector},
    types::{ChartType, GridCoordinate, GridRange},
};

// ============================================================================
// Create Chart Tool
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateChartInput {
    /// The ID of the spreadsheet.
    pub spreadsheet_id: String,
    /// Sheet the chart is placed on: numeric id or title.
    #[serde(alias = "sheet_id", alias = "sheet_name")]
    pub sheet: SheetSelector,
    /// Chart type (default `COLUMN`).
    #[serde(default)]
    pub chart_type: ChartType,
    /// A1 range holding the data, header row first, e.g. `Sheet1!A1:D20`.
    /// Without a sheet prefix the chart's own sheet is used.
    pub data_range: String,
    /// Chart title.
    #[serde(default)]
    pub title: Option<String>,
    /// 0-based row of the chart's top-left anchor cell.
    #[serde(default)]
    pub position_row: u32,
    /// 0-based column of the chart's top-left anchor cell (default 5, column F).
    #[serde(default = "default_position_col")]
    pub position_col: u32,
    /// Offset of the label column within the data range (default 0).
    #[serde(default)]
    pub domain_column: u32,
    /// Offsets of the value columns within the data range, as a list or
    /// comma-separated string. Defaults to every column after the domain
    /// column. Pie charts use only the first.
    #[serde(default)]
    pub series_columns: Option<ColumnsParam>,
}

fn default_position_col() -> u32 {
    5
}

#[derive(Debug, Clone, Serialize, JsonSchema, PartialEq, Eq)]
pub struct CreateChartOutput {
    pub chart_id: i64,
    pub sheet_id: i64,
    pub chart_type: ChartType,
    pub series_count: usize,
    pub anchor_row: u32,
    pub anchor_column: u32,
}

// ============================================================================
// List Charts Tool
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListChartsInput {
    /// The ID of the spreadsheet.
    pub spreadsheet_id: String,
}

// ============================================================================
// Delete Chart Tool
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteChartInput {
    /// The ID of the spreadsheet.
    pub spreadsheet_id: String,
    /// Chart id, as returned by `create_chart` or `list_charts`.
    pub chart_id: i64,
}

impl SheetsToolbox {
    /// # Create Chart
    ///
    /// Adds a 600x400 chart over a data range, anchored at a cell.
    ///
    /// # Errors
    ///
    /// Returns an error if the data range is not valid A1 notation or has no
    /// bounded columns, a column offset lies outside it, a sheet cannot be
    /// found, or the service rejects the request.
    pub async fn create_chart(&self, input: CreateChartInput) -> Result<CreateChartOutput> {
        require_spreadsheet_id(&input.spreadsheet_id)?;
        let parsed = A1Range::parse(&input.data_range)?;
        let series_columns = input
            .series_columns
            .map(ColumnsParam::into_offsets)
            .transpose()?;

        let sheet_id = self
            .resolve_sheet(&input.spreadsheet_id, &input.sheet)
            .await?;
        let data_sheet_id = match &parsed.sheet_title {
            Some(title) => {
                self.resolve_sheet(&input.spreadsheet_id, &SheetSelector::Title(title.clone()))
                    .await?
            }
            None => sheet_id,
        };
        let data = GridRange {
            sheet_id: data_sheet_id,
            start_row_index: parsed.start_row,
            end_row_index: parsed.end_row,
            start_column_index: parsed.start_column,
            end_column_index: parsed.end_column,
        };

        let plan = ChartRequest::plan(
            input.chart_type,
            &data,
            input.domain_column,
            series_columns,
        )?;
        let series_count = plan.series_count();
        let anchor = GridCoordinate {
            sheet_id,
            row_index: input.position_row,
            column_index: input.position_col,
        };
        let title = input.title.filter(|title| !title.trim().is_empty());
        let response = self
            .apply(&input.spreadsheet_id, plan.into_request(title, anchor))
            .await?;
        let chart_id = normalize::new_chart_id(&response)?;
        info!(spreadsheet_id = %input.spreadsheet_id, chart_id, "created chart");

        Ok(CreateChartOutput {
            chart_id,
            sheet_id,
            chart_type: input.chart_type,
            series_count,
            anchor_row: anchor.row_index,
            anchor_column: anchor.column_index,
        })
    }

    /// # List Charts
    ///
    /// Lists every embedded chart with its sheet, title, and anchor cell.
    ///
    /// # Errors
    ///
    /// Returns an error if the service rejects the request.
    pub async fn list_charts(&self, input: ListChartsInput) -> Result<ChartList> {
        require_spreadsheet_id(&input.spreadsheet_id)?;
        let metadata = self
            .handles
            .primary()
            .get_spreadsheet(&input.spreadsheet_id)
            .await?;
        Ok(ChartList {
            charts: normalize::chart_summaries(&metadata),
        })
    }

    /// # Delete Chart
    ///
    /// Removes an embedded chart.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is negative or the service rejects the
    /// request (for example an unknown chart).
    pub async fn delete_chart(&self, input: DeleteChartInput) -> Result<StatusOutput> {
        require_spreadsheet_id(&input.spreadsheet_id)?;
        ensure_input!(input.chart_id >= 0, "chart_id must not be negative");
        self.apply(&input.spreadsheet_id, translate::delete_chart(input.chart_id))
            .await?;
        Ok(StatusOutput::ok(format!("Chart {} deleted", input.chart_id)))
    }
}
