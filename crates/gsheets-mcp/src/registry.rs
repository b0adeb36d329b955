//! Tool registry: name, metadata, schemas, and a type-erased handler per
//! tool.
//!
//! Handlers deserialize a JSON argument object into the tool's input type,
//! call the matching [`SheetsToolbox`] method, and serialize the output
//! record back to JSON. The registry itself holds no credentials, so it can
//! be listed before any are resolved.

use std::{future::Future, pin::Pin, sync::Arc};

use gsheets::{
    SheetsError, SheetsToolbox,
    tools::{cells, charts, data, dimensions, formatting, sharing, sheets, spreadsheet},
};
use indexmap::IndexMap;
use rmcp::model::JsonObject;
use schemars::JsonSchema;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{info, instrument};

/// Errors raised while invoking a registered tool.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ToolCallError {
    /// The argument object does not match the tool's input schema.
    #[error("invalid arguments: {0}")]
    InvalidArguments(serde_json::Error),

    /// The tool ran and failed.
    #[error(transparent)]
    Tool(#[from] SheetsError),

    #[error("failed to serialize tool output: {0}")]
    Output(serde_json::Error),
}

/// Static description of one tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub input_schema: JsonObject,
    pub output_schema: JsonObject,
}

type ToolFuture = Pin<Box<dyn Future<Output = Result<serde_json::Value, ToolCallError>> + Send>>;
type ToolFn = Arc<dyn Fn(Arc<SheetsToolbox>, JsonObject) -> ToolFuture + Send + Sync>;

/// A registered tool: its metadata plus the handler that runs it.
#[derive(Clone)]
pub struct ToolHandle {
    info: ToolInfo,
    handler: ToolFn,
}

impl std::fmt::Debug for ToolHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolHandle")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

impl ToolHandle {
    pub fn info(&self) -> &ToolInfo {
        &self.info
    }

    /// Runs the tool against `toolbox` with the given argument object.
    ///
    /// # Errors
    ///
    /// Returns [`ToolCallError::InvalidArguments`] when the arguments do not
    /// decode, or [`ToolCallError::Tool`] when the tool itself fails.
    #[instrument(skip_all, fields(tool = self.info.name))]
    pub async fn call(
        &self,
        toolbox: Arc<SheetsToolbox>,
        arguments: JsonObject,
    ) -> Result<serde_json::Value, ToolCallError> {
        info!("calling tool");
        (self.handler)(toolbox, arguments).await
    }
}

/// Every tool, in registration order.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: IndexMap<&'static str, ToolHandle>,
}

/// Registers a toolbox method under its own name.
macro_rules! register_tool {
    ($registry:ident, $method:ident($input:ty), $title:literal, $description:literal) => {
        $registry.register(
            stringify!($method),
            $title,
            $description,
            |toolbox: Arc<SheetsToolbox>, input: $input| async move {
                toolbox.$method(input).await
            },
        );
    };
}

impl ToolRegistry {
    /// The full spreadsheet tool set.
    pub fn sheets() -> Self {
        let mut registry = Self::default();

        register_tool!(
            registry,
            create_spreadsheet(spreadsheet::CreateSpreadsheetInput),
            "Create Spreadsheet",
            "Creates a new spreadsheet, optionally with named sheets. Returns its id and URL."
        );
        register_tool!(
            registry,
            get_spreadsheet_info(spreadsheet::GetSpreadsheetInfoInput),
            "Get Spreadsheet Info",
            "Returns the title, URL, locale, and every sheet with its id, position, and grid size."
        );
        register_tool!(
            registry,
            list_sheets(sheets::ListSheetsInput),
            "List Sheets",
            "Lists every sheet with its numeric id, title, position, and grid size."
        );
        register_tool!(
            registry,
            create_sheet(sheets::CreateSheetInput),
            "Create Sheet",
            "Adds a sheet. Omit index (or pass a negative one) to append it at the end."
        );
        register_tool!(
            registry,
            delete_sheet(sheets::DeleteSheetInput),
            "Delete Sheet",
            "Permanently removes a sheet, addressed by numeric id or title."
        );
        register_tool!(
            registry,
            rename_sheet(sheets::RenameSheetInput),
            "Rename Sheet",
            "Changes a sheet's title. Its numeric id stays the same."
        );
        register_tool!(
            registry,
            duplicate_sheet(sheets::DuplicateSheetInput),
            "Duplicate Sheet",
            "Copies a sheet with its values and formatting and returns the copy's id."
        );
        register_tool!(
            registry,
            read_cells(cells::ReadCellsInput),
            "Read Cells",
            "Reads an A1 range (e.g. Sheet1!A1:D10) and returns its values row by row."
        );
        register_tool!(
            registry,
            write_cells(cells::WriteCellsInput),
            "Write Cells",
            "Writes a 2D array of values starting at the top-left cell of an A1 range. Values starting with = are formulas."
        );
        register_tool!(
            registry,
            batch_read(cells::BatchReadInput),
            "Batch Read",
            "Reads several A1 ranges in one call. The result maps each requested range to its values."
        );
        register_tool!(
            registry,
            batch_write(cells::BatchWriteInput),
            "Batch Write",
            "Writes several {range, values} blocks in one call."
        );
        register_tool!(
            registry,
            clear_cells(cells::ClearCellsInput),
            "Clear Cells",
            "Clears the values in an A1 range, keeping formatting."
        );
        register_tool!(
            registry,
            append_rows(cells::AppendRowsInput),
            "Append Rows",
            "Appends rows after the last row with data in the table found in an A1 range."
        );
        register_tool!(
            registry,
            insert_rows(dimensions::RowsInput),
            "Insert Rows",
            "Inserts empty rows before a 0-based row index."
        );
        register_tool!(
            registry,
            insert_columns(dimensions::ColumnsInput),
            "Insert Columns",
            "Inserts empty columns before a 0-based column index."
        );
        register_tool!(
            registry,
            delete_rows(dimensions::RowsInput),
            "Delete Rows",
            "Deletes rows starting at a 0-based row index."
        );
        register_tool!(
            registry,
            delete_columns(dimensions::ColumnsInput),
            "Delete Columns",
            "Deletes columns starting at a 0-based column index."
        );
        register_tool!(
            registry,
            set_column_width(dimensions::SetColumnWidthInput),
            "Set Column Width",
            "Sets the pixel width of a 0-based, end-exclusive span of columns."
        );
        register_tool!(
            registry,
            format_cells(formatting::FormatCellsInput),
            "Format Cells",
            "Applies bold, italic, font size, #RRGGBB colors, and alignment to a 0-based, end-exclusive range. Only the given fields change."
        );
        register_tool!(
            registry,
            merge_cells(formatting::MergeCellsInput),
            "Merge Cells",
            "Merges a 0-based, end-exclusive range into one cell, or one cell per row or column."
        );
        register_tool!(
            registry,
            create_chart(charts::CreateChartInput),
            "Create Chart",
            "Adds a chart over an A1 data range whose first row holds headers. The first column is the domain by default and every later column becomes a series."
        );
        register_tool!(
            registry,
            list_charts(charts::ListChartsInput),
            "List Charts",
            "Lists every embedded chart with its id, sheet, title, and anchor cell."
        );
        register_tool!(
            registry,
            delete_chart(charts::DeleteChartInput),
            "Delete Chart",
            "Removes an embedded chart by id."
        );
        register_tool!(
            registry,
            sort_range(data::SortRangeInput),
            "Sort Range",
            "Sorts the rows of a 0-based, end-exclusive range by one sheet column."
        );
        register_tool!(
            registry,
            find_replace(data::FindReplaceInput),
            "Find and Replace",
            "Replaces text in one sheet or across all sheets and reports how much changed."
        );
        register_tool!(
            registry,
            get_last_row(cells::GetLastRowInput),
            "Get Last Row",
            "Returns the 1-based number of the last row with data in a column (0 when empty)."
        );
        register_tool!(
            registry,
            share_spreadsheet(sharing::ShareSpreadsheetInput),
            "Share Spreadsheet",
            "Shares the spreadsheet with an email address, or with anyone who has the link."
        );

        registry
    }

    fn register<I, O, F, Fut>(
        &mut self,
        name: &'static str,
        title: &'static str,
        description: &'static str,
        call: F,
    ) where
        I: DeserializeOwned + JsonSchema + Send + 'static,
        O: Serialize + JsonSchema + 'static,
        F: Fn(Arc<SheetsToolbox>, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = gsheets::Result<O>> + Send + 'static,
    {
        let info = ToolInfo {
            name,
            title,
            description,
            input_schema: schema_object::<I>(),
            output_schema: schema_object::<O>(),
        };
        let handler: ToolFn = Arc::new(move |toolbox, arguments| {
            let input = serde_json::from_value::<I>(serde_json::Value::Object(arguments));
            let pending = input.map(|input| call(toolbox, input));
            Box::pin(async move {
                let output = pending.map_err(ToolCallError::InvalidArguments)?.await?;
                serde_json::to_value(output).map_err(ToolCallError::Output)
            })
        });
        self.tools.insert(name, ToolHandle { info, handler });
    }

    pub fn get(&self, name: &str) -> Option<&ToolHandle> {
        self.tools.get(name)
    }

    pub fn list(&self) -> impl Iterator<Item = &ToolInfo> {
        self.tools.values().map(ToolHandle::info)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// JSON schema of `T` as an object; an unrepresentable schema becomes `{}`.
fn schema_object<T: JsonSchema>() -> JsonObject {
    match serde_json::to_value(schemars::schema_for!(T)) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => JsonObject::default(),
    }
}
