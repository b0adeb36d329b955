//! Sheet (tab) management tools.

use schemars::JsonSchema;
use serde::Deserialize;
use tracing::info;

use super::{SheetsToolbox, require_spreadsheet_id};
use crate::{
    error::Result,
    normalize::{self, SheetList, SheetSummary, StatusOutput},
    translate::{self, SheetSelector},
};

// ============================================================================
// List Sheets Tool
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListSheetsInput {
    /// The ID of the spreadsheet.
    pub spreadsheet_id: String,
}

// ============================================================================
// Create Sheet Tool
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateSheetInput {
    /// The ID of the spreadsheet.
    pub spreadsheet_id: String,
    /// Title of the new sheet.
    pub title: String,
    /// 0-based position among the sheets. Omitted or negative appends at the
    /// end; 0 inserts first.
    #[serde(default)]
    pub index: Option<i64>,
    /// Number of rows in the new sheet (service default when omitted).
    #[serde(default)]
    pub row_count: Option<u32>,
    /// Number of columns in the new sheet (service default when omitted).
    #[serde(default)]
    pub column_count: Option<u32>,
}

// ============================================================================
// Delete Sheet Tool
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteSheetInput {
    /// The ID of the spreadsheet.
    pub spreadsheet_id: String,
    /// Numeric sheet id, or the sheet's title.
    #[serde(alias = "sheet_id", alias = "sheet_name")]
    pub sheet: SheetSelector,
}

// ============================================================================
// Rename Sheet Tool
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RenameSheetInput {
    /// The ID of the spreadsheet.
    pub spreadsheet_id: String,
    /// Numeric sheet id, or the sheet's current title.
    #[serde(alias = "sheet_id", alias = "sheet_name")]
    pub sheet: SheetSelector,
    /// The new title.
    pub new_title: String,
}

// ============================================================================
// Duplicate Sheet Tool
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DuplicateSheetInput {
    /// The ID of the spreadsheet.
    pub spreadsheet_id: String,
    /// Numeric id or title of the sheet to copy.
    #[serde(alias = "sheet_id", alias = "sheet_name")]
    pub sheet: SheetSelector,
    /// Title of the copy; the service picks one when omitted.
    #[serde(default)]
    pub new_title: Option<String>,
    /// 0-based position of the copy. Omitted or negative lets the service
    /// place it.
    #[serde(default)]
    pub insert_index: Option<i64>,
}

impl SheetsToolbox {
    /// # List Sheets
    ///
    /// Lists every sheet with its id, title, position, and grid size.
    ///
    /// # Errors
    ///
    /// Returns an error if the service rejects the request.
    pub async fn list_sheets(&self, input: ListSheetsInput) -> Result<SheetList> {
        require_spreadsheet_id(&input.spreadsheet_id)?;
        let metadata = self
            .handles
            .primary()
            .get_spreadsheet(&input.spreadsheet_id)
            .await?;
        Ok(SheetList {
            sheets: normalize::sheet_summaries(&metadata),
        })
    }

    /// # Create Sheet
    ///
    /// Adds a new sheet to an existing spreadsheet.
    ///
    /// # Errors
    ///
    /// Returns an error if the title is empty, a grid dimension is zero, or
    /// the service rejects the request (for example a duplicate title).
    pub async fn create_sheet(&self, input: CreateSheetInput) -> Result<SheetSummary> {
        require_spreadsheet_id(&input.spreadsheet_id)?;
        let request = translate::add_sheet(
            &input.title,
            input.index,
            input.row_count,
            input.column_count,
        )?;
        let response = self.apply(&input.spreadsheet_id, request).await?;
        let sheet = normalize::new_sheet(&response)?;
        info!(spreadsheet_id = %input.spreadsheet_id, sheet_id = sheet.sheet_id, "created sheet");
        Ok(sheet)
    }

    /// # Delete Sheet
    ///
    /// Permanently removes a sheet and its contents.
    ///
    /// # Errors
    ///
    /// Returns an error if a title does not match any sheet or the service
    /// rejects the request (for example deleting the last sheet).
    pub async fn delete_sheet(&self, input: DeleteSheetInput) -> Result<StatusOutput> {
        require_spreadsheet_id(&input.spreadsheet_id)?;
        let sheet_id = self
            .resolve_sheet(&input.spreadsheet_id, &input.sheet)
            .await?;
        self.apply(&input.spreadsheet_id, translate::delete_sheet(sheet_id))
            .await?;
        Ok(StatusOutput::ok(format!("Sheet {sheet_id} deleted")))
    }

    /// # Rename Sheet
    ///
    /// Changes a sheet's title; its id stays the same.
    ///
    /// # Errors
    ///
    /// Returns an error if the new title is empty, the sheet cannot be found,
    /// or the service rejects the request.
    pub async fn rename_sheet(&self, input: RenameSheetInput) -> Result<StatusOutput> {
        require_spreadsheet_id(&input.spreadsheet_id)?;
        let new_title = translate::sheet_title(&input.new_title, "new_title")?;
        let sheet_id = self
            .resolve_sheet(&input.spreadsheet_id, &input.sheet)
            .await?;
        self.apply(
            &input.spreadsheet_id,
            translate::rename_sheet(sheet_id, new_title),
        )
        .await?;
        Ok(StatusOutput::ok(format!(
            "Sheet {sheet_id} renamed to '{new_title}'"
        )))
    }

    /// # Duplicate Sheet
    ///
    /// Copies a sheet, including values and formatting, within the same
    /// spreadsheet.
    ///
    /// # Errors
    ///
    /// Returns an error if the sheet cannot be found or the service rejects
    /// the request.
    pub async fn duplicate_sheet(&self, input: DuplicateSheetInput) -> Result<SheetSummary> {
        require_spreadsheet_id(&input.spreadsheet_id)?;
        let sheet_id = self
            .resolve_sheet(&input.spreadsheet_id, &input.sheet)
            .await?;
        let request =
            translate::duplicate_sheet(sheet_id, input.insert_index, input.new_title.as_deref());
        let response = self.apply(&input.spreadsheet_id, request).await?;
        normalize::new_sheet(&response)
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
    use crate::{error::SheetsError, tools::testing::*};

    async fn mount_batch_update(server: &MockServer, reply: serde_json::Value) {
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
    async fn test_list_sheets_returns_summaries() {
        let server = MockServer::start().await;
        mount_metadata(&server).await;

        let list = toolbox_for(&server)
            .list_sheets(ListSheetsInput {
                spreadsheet_id: SPREADSHEET_ID.to_string(),
            })
            .await
            .unwrap();

        let titles: Vec<_> = list.sheets.iter().map(|sheet| sheet.title.as_str()).collect();
        assert_eq!(titles, vec!["Sheet1", "Q1 Sales"]);
    }

    #[tokio::test]
    async fn test_create_sheet_at_index_zero_keeps_index() {
        let server = MockServer::start().await;
        mount_batch_update(
            &server,
            json!({"addSheet": {"properties": {"sheetId": 321, "title": "Data", "index": 0,
                "gridProperties": {"rowCount": 1000, "columnCount": 26}}}}),
        )
        .await;

        let sheet = toolbox_for(&server)
            .create_sheet(CreateSheetInput {
                spreadsheet_id: SPREADSHEET_ID.to_string(),
                title: "Data".to_string(),
                index: Some(0),
                row_count: None,
                column_count: None,
            })
            .await
            .unwrap();

        assert_eq!(sheet.sheet_id, 321);
        assert_eq!(sheet.row_count, 1000);
        assert_eq!(
            sole_batch_request(&server).await,
            json!({"addSheet": {"properties": {"title": "Data", "index": 0}}})
        );
    }

    #[tokio::test]
    async fn test_create_sheet_with_negative_index_appends() {
        let server = MockServer::start().await;
        mount_batch_update(
            &server,
            json!({"addSheet": {"properties": {"sheetId": 9, "title": "Tail", "index": 2}}}),
        )
        .await;

        toolbox_for(&server)
            .create_sheet(CreateSheetInput {
                spreadsheet_id: SPREADSHEET_ID.to_string(),
                title: "Tail".to_string(),
                index: Some(-1),
                row_count: None,
                column_count: None,
            })
            .await
            .unwrap();

        assert_eq!(
            sole_batch_request(&server).await,
            json!({"addSheet": {"properties": {"title": "Tail"}}})
        );
    }

    #[tokio::test]
    async fn test_rename_sheet_by_title_resolves_id_first() {
        let server = MockServer::start().await;
        mount_metadata(&server).await;
        mount_batch_update(&server, json!({})).await;

        let output = toolbox_for(&server)
            .rename_sheet(RenameSheetInput {
                spreadsheet_id: SPREADSHEET_ID.to_string(),
                sheet: SheetSelector::Title("Q1 Sales".to_string()),
                new_title: "Q1 Revenue".to_string(),
            })
            .await
            .unwrap();

        assert!(output.success);
        assert_eq!(
            sole_batch_request(&server).await,
            json!({"updateSheetProperties": {
                "properties": {"sheetId": 17, "title": "Q1 Revenue"},
                "fields": "title"
            }})
        );
    }

    #[tokio::test]
    async fn test_rename_unknown_title_sends_no_update() {
        let server = MockServer::start().await;
        mount_metadata(&server).await;
        Mock::given(method("POST"))
            .and(path(batch_update_path()))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = toolbox_for(&server)
            .rename_sheet(RenameSheetInput {
                spreadsheet_id: SPREADSHEET_ID.to_string(),
                sheet: SheetSelector::Title("Nope".to_string()),
                new_title: "Other".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, SheetsError::SheetNotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_sheet_by_id() {
        let server = MockServer::start().await;
        mount_batch_update(&server, json!({})).await;

        let output = toolbox_for(&server)
            .delete_sheet(DeleteSheetInput {
                spreadsheet_id: SPREADSHEET_ID.to_string(),
                sheet: SheetSelector::Id(17),
            })
            .await
            .unwrap();

        assert_eq!(output.message, "Sheet 17 deleted");
        assert_eq!(
            sole_batch_request(&server).await,
            json!({"deleteSheet": {"sheetId": 17}})
        );
    }

    #[tokio::test]
    async fn test_duplicate_sheet_returns_copy() {
        let server = MockServer::start().await;
        mount_batch_update(
            &server,
            json!({"duplicateSheet": {"properties": {"sheetId": 44, "title": "Copy", "index": 1}}}),
        )
        .await;

        let copy = toolbox_for(&server)
            .duplicate_sheet(DuplicateSheetInput {
                spreadsheet_id: SPREADSHEET_ID.to_string(),
                sheet: SheetSelector::Id(0),
                new_title: Some("Copy".to_string()),
                insert_index: Some(1),
            })
            .await
            .unwrap();

        assert_eq!(copy.sheet_id, 44);
        assert_eq!(
            sole_batch_request(&server).await,
            json!({"duplicateSheet": {"sourceSheetId": 0, "insertSheetIndex": 1, "newSheetName": "Copy"}})
        );
    }

    #[test]
    fn test_sheet_selector_accepts_legacy_field_names() {
        let input: DeleteSheetInput =
            serde_json::from_value(json!({"spreadsheet_id": "x", "sheet_id": 3})).unwrap();
        assert_eq!(input.sheet, SheetSelector::Id(3));

        let input: RenameSheetInput = serde_json::from_value(
            json!({"spreadsheet_id": "x", "sheet_name": "Data", "new_title": "Y"}),
        )
        .unwrap();
        assert_eq!(input.sheet, SheetSelector::Title("Data".to_string()));
    }

    #[tokio::test]
    async fn test_rename_blank_title_fails_before_lookup() {
        let server = MockServer::start().await;

        let err = toolbox_for(&server)
            .rename_sheet(RenameSheetInput {
                spreadsheet_id: SPREADSHEET_ID.to_string(),
                sheet: SheetSelector::Title("Q1 Sales".to_string()),
                new_title: "  ".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, SheetsError::Validation(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
