//! Sorting and find/replace.

use schemars::JsonSchema;
use serde::Deserialize;
use tracing::info;

use super::{SheetsToolbox, require_spreadsheet_id};
use crate::{
    error::Result,
    normalize::{self, FindReplaceOutput, StatusOutput},
    translate::{self, CellSpan, FindReplace, SheetSelector},
    types::SortOrder,
};

// ============================================================================
// Sort Range Tool
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SortRangeInput {
    /// The ID of the spreadsheet.
    pub spreadsheet_id: String,
    /// Numeric sheet id, or the sheet's title.
    #[serde(alias = "sheet_id", alias = "sheet_name")]
    pub sheet: SheetSelector,
    /// 0-based first row. Put 1 here to keep a header row in place.
    pub start_row: u32,
    /// 0-based end row, exclusive.
    pub end_row: u32,
    /// 0-based first column.
    pub start_col: u32,
    /// 0-based end column, exclusive.
    pub end_col: u32,
    /// 0-based sheet column to sort by; must lie inside the range.
    pub sort_column: u32,
    /// Sort ascending (default) or descending.
    #[serde(default = "default_ascending")]
    pub ascending: bool,
}

fn default_ascending() -> bool {
    true
}

// ============================================================================
// Find Replace Tool
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FindReplaceInput {
    /// The ID of the spreadsheet.
    pub spreadsheet_id: String,
    /// Text (or pattern) to find.
    pub find: String,
    /// Replacement text; empty deletes the match.
    #[serde(default, alias = "replace")]
    pub replacement: String,
    /// Limit to one sheet by id or title. Omitted or a negative id searches
    /// every sheet.
    #[serde(default, alias = "sheet_id", alias = "sheet_name")]
    pub sheet: Option<SheetSelector>,
    #[serde(default)]
    pub match_case: bool,
    /// Only match cells whose entire content equals `find`.
    #[serde(default)]
    pub match_entire_cell: bool,
    /// Treat `find` as a regular expression.
    #[serde(default)]
    pub search_by_regex: bool,
    /// Also search inside formulas.
    #[serde(default)]
    pub include_formulas: bool,
}

impl SheetsToolbox {
    /// # Sort Range
    ///
    /// Sorts the rows of a rectangular range by one column.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is empty, the sort column lies outside
    /// it, the sheet cannot be found, or the service rejects the request.
    pub async fn sort_range(&self, input: SortRangeInput) -> Result<StatusOutput> {
        require_spreadsheet_id(&input.spreadsheet_id)?;
        let span = CellSpan::new(input.start_row, input.end_row, input.start_col, input.end_col)?;
        let (order, label) = if input.ascending {
            (SortOrder::Ascending, "ascending")
        } else {
            (SortOrder::Descending, "descending")
        };
        let sort = translate::sort_spec(&span, input.sort_column, order)?;
        let sheet_id = self
            .resolve_sheet(&input.spreadsheet_id, &input.sheet)
            .await?;
        let request = translate::sort_range(span.on_sheet(sheet_id), sort);
        self.apply(&input.spreadsheet_id, request).await?;
        Ok(StatusOutput::ok(format!(
            "Range sorted by column {} ({label})",
            input.sort_column
        )))
    }

    /// # Find Replace
    ///
    /// Replaces text in one sheet or across the whole spreadsheet and
    /// reports how much changed.
    ///
    /// # Errors
    ///
    /// Returns an error if `find` is empty, the sheet cannot be found, or the
    /// service rejects the request (for example an invalid regex).
    pub async fn find_replace(&self, input: FindReplaceInput) -> Result<FindReplaceOutput> {
        require_spreadsheet_id(&input.spreadsheet_id)?;
        let sheet_id = match input.sheet {
            None => None,
            Some(SheetSelector::Id(id)) => translate::non_negative(Some(id)),
            Some(selector) => Some(self.resolve_sheet(&input.spreadsheet_id, &selector).await?),
        };
        let request = translate::find_replace(FindReplace {
            find: input.find,
            replacement: input.replacement,
            sheet_id,
            match_case: input.match_case,
            match_entire_cell: input.match_entire_cell,
            search_by_regex: input.search_by_regex,
            include_formulas: input.include_formulas,
        })?;
        let response = self.apply(&input.spreadsheet_id, request).await?;
        let counts = normalize::find_replace_counts(&response);
        info!(
            spreadsheet_id = %input.spreadsheet_id,
            occurrences = counts.occurrences_changed,
            "find/replace finished"
        );
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    use super::*;
    use crate::tools::testing::*;

    async fn mount_reply(server: &MockServer, reply: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path(batch_update_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "spreadsheetId": SPREADSHEET_ID,
                "replies": [reply]
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_sort_range_descending() {
        let server = MockServer::start().await;
        mount_reply(&server, json!({})).await;

        let output = toolbox_for(&server)
            .sort_range(SortRangeInput {
                spreadsheet_id: SPREADSHEET_ID.to_string(),
                sheet: SheetSelector::Id(0),
                start_row: 1,
                end_row: 10,
                start_col: 0,
                end_col: 3,
                sort_column: 2,
                ascending: false,
            })
            .await
            .unwrap();

        assert_eq!(output.message, "Range sorted by column 2 (descending)");
        assert_eq!(
            sole_batch_request(&server).await,
            json!({"sortRange": {
                "range": {"sheetId": 0, "startRowIndex": 1, "endRowIndex": 10,
                    "startColumnIndex": 0, "endColumnIndex": 3},
                "sortSpecs": [{"dimensionIndex": 2, "sortOrder": "DESCENDING"}]
            }})
        );
    }

    #[tokio::test]
    async fn test_sort_column_outside_range_is_rejected() {
        let server = MockServer::start().await;

        let err = toolbox_for(&server)
            .sort_range(SortRangeInput {
                spreadsheet_id: SPREADSHEET_ID.to_string(),
                sheet: SheetSelector::Id(0),
                start_row: 0,
                end_row: 10,
                start_col: 2,
                end_col: 4,
                sort_column: 0,
                ascending: true,
            })
            .await
            .unwrap_err();

        assert!(err.is_caller_error());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_replace_across_all_sheets() {
        let server = MockServer::start().await;
        mount_reply(
            &server,
            json!({"findReplace": {"valuesChanged": 3, "occurrencesChanged": 4, "rowsChanged": 2, "sheetsChanged": 1}}),
        )
        .await;

        let input: FindReplaceInput = serde_json::from_value(json!({
            "spreadsheet_id": SPREADSHEET_ID,
            "find": "2023",
            "replace": "2024",
            "sheet_id": -1
        }))
        .unwrap();
        let output = toolbox_for(&server).find_replace(input).await.unwrap();

        assert_eq!(output.occurrences_changed, 4);
        assert_eq!(output.values_changed, 3);
        assert_eq!(output.formulas_changed, 0);
        assert_eq!(
            sole_batch_request(&server).await,
            json!({"findReplace": {
                "find": "2023",
                "replacement": "2024",
                "matchCase": false,
                "matchEntireCell": false,
                "searchByRegex": false,
                "includeFormulas": false,
                "allSheets": true
            }})
        );
    }

    #[tokio::test]
    async fn test_find_replace_scoped_by_title() {
        let server = MockServer::start().await;
        mount_metadata(&server).await;
        mount_reply(&server, json!({"findReplace": {}})).await;

        let output = toolbox_for(&server)
            .find_replace(FindReplaceInput {
                spreadsheet_id: SPREADSHEET_ID.to_string(),
                find: "old".to_string(),
                replacement: "new".to_string(),
                sheet: Some(SheetSelector::Title("Q1 Sales".to_string())),
                match_case: true,
                match_entire_cell: false,
                search_by_regex: false,
                include_formulas: false,
            })
            .await
            .unwrap();

        assert_eq!(output, FindReplaceOutput::default());
        let request = sole_batch_request(&server).await;
        assert_eq!(request["findReplace"]["sheetId"], json!(17));
        assert_eq!(request["findReplace"]["matchCase"], json!(true));
    }

    #[tokio::test]
    async fn test_sort_column_outside_range_fails_before_lookup() {
        let server = MockServer::start().await;
        let input: SortRangeInput = serde_json::from_value(json!({
            "spreadsheet_id": SPREADSHEET_ID,
            "sheet": "Q1 Sales",
            "start_row": 1,
            "end_row": 10,
            "start_col": 0,
            "end_col": 3,
            "sort_column": 5
        }))
        .unwrap();

        let err = toolbox_for(&server).sort_range(input).await.unwrap_err();

        assert!(err.is_caller_error());
        assert!(err.to_string().contains("sort_column (5)"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
