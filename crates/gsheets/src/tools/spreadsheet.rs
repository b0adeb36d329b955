//! Spreadsheet-level tools: creation and metadata.

use schemars::JsonSchema;
use serde::Deserialize;
use tracing::info;

use super::{SheetsToolbox, require_spreadsheet_id};
use crate::{
    error::{Result, ensure_input},
    normalize::{self, CreatedSpreadsheet, SpreadsheetInfo},
    translate::ListParam,
    types::{Sheet, SheetProperties, Spreadsheet, SpreadsheetProperties},
};

// ============================================================================
// Create Spreadsheet Tool
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateSpreadsheetInput {
    /// Title of the new spreadsheet.
    pub title: String,
    /// Names of the initial sheets, as a list or comma-separated string.
    /// When omitted the service creates a single default sheet.
    #[serde(default)]
    pub sheet_names: Option<ListParam>,
}

// ============================================================================
// Get Spreadsheet Info Tool
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetSpreadsheetInfoInput {
    /// The ID of the spreadsheet (from its URL).
    pub spreadsheet_id: String,
}

impl SheetsToolbox {
    /// # Create Spreadsheet
    ///
    /// Creates a new spreadsheet, optionally with named sheets.
    ///
    /// # Errors
    ///
    /// Returns an error if the title is empty or the service rejects the
    /// request.
    pub async fn create_spreadsheet(
        &self,
        input: CreateSpreadsheetInput,
    ) -> Result<CreatedSpreadsheet> {
        let title = input.title.trim();
        ensure_input!(!title.is_empty(), "title must not be empty");

        let sheets = input
            .sheet_names
            .map(ListParam::into_items)
            .unwrap_or_default()
            .into_iter()
            .map(|name| Sheet {
                properties: SheetProperties {
                    title: Some(name),
                    ..SheetProperties::default()
                },
                charts: Vec::new(),
            })
            .collect();
        let request = Spreadsheet {
            properties: SpreadsheetProperties {
                title: title.to_string(),
                ..SpreadsheetProperties::default()
            },
            sheets,
            ..Spreadsheet::default()
        };

        let created = self.handles.primary().create_spreadsheet(&request).await?;
        info!(spreadsheet_id = %created.spreadsheet_id, "created spreadsheet");
        Ok(normalize::created_spreadsheet(&created))
    }

    /// # Get Spreadsheet Info
    ///
    /// Returns the title, URL, locale, and every sheet with its id, position,
    /// and grid size.
    ///
    /// # Errors
    ///
    /// Returns an error if the spreadsheet id is empty or the service rejects
    /// the request.
    pub async fn get_spreadsheet_info(
        &self,
        input: GetSpreadsheetInfoInput,
    ) -> Result<SpreadsheetInfo> {
        require_spreadsheet_id(&input.spreadsheet_id)?;
        let metadata = self
            .handles
            .primary()
            .get_spreadsheet(&input.spreadsheet_id)
            .await?;
        Ok(normalize::spreadsheet_info(&metadata))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, header, method, path},
    };

    use super::*;
    use crate::{error::SheetsError, tools::testing::*};

    #[tokio::test]
    async fn test_create_spreadsheet_sends_named_sheets() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v4/spreadsheets"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_json(json!({
                "properties": {"title": "Budget"},
                "sheets": [
                    {"properties": {"title": "Data"}},
                    {"properties": {"title": "Summary"}}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "spreadsheetId": "new-id",
                "spreadsheetUrl": "https://docs.google.com/spreadsheets/d/new-id/edit",
                "properties": {"title": "Budget"},
                "sheets": [
                    {"properties": {"sheetId": 0, "title": "Data"}},
                    {"properties": {"sheetId": 1, "title": "Summary"}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let output = toolbox_for(&server)
            .create_spreadsheet(CreateSpreadsheetInput {
                title: "Budget".to_string(),
                sheet_names: Some(ListParam::Joined("Data, Summary".to_string())),
            })
            .await
            .unwrap();

        assert_eq!(output.spreadsheet_id, "new-id");
        assert_eq!(output.sheets, vec!["Data", "Summary"]);
        assert_eq!(
            output.url,
            "https://docs.google.com/spreadsheets/d/new-id/edit"
        );
    }

    #[tokio::test]
    async fn test_create_spreadsheet_without_sheet_names_omits_sheets() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v4/spreadsheets"))
            .and(body_json(json!({"properties": {"title": "Empty"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "spreadsheetId": "id2",
                "properties": {"title": "Empty"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let output = toolbox_for(&server)
            .create_spreadsheet(CreateSpreadsheetInput {
                title: "Empty".to_string(),
                sheet_names: None,
            })
            .await
            .unwrap();

        assert!(output.sheets.is_empty());
        assert_eq!(output.url, "https://docs.google.com/spreadsheets/d/id2/edit");
    }

    #[tokio::test]
    async fn test_create_spreadsheet_rejects_blank_title() {
        let server = MockServer::start().await;
        let err = toolbox_for(&server)
            .create_spreadsheet(CreateSpreadsheetInput {
                title: "  ".to_string(),
                sheet_names: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SheetsError::Validation(_)));
    }

    #[tokio::test]
    async fn test_get_spreadsheet_info_flattens_sheets() {
        let server = MockServer::start().await;
        mount_metadata(&server).await;

        let info = toolbox_for(&server)
            .get_spreadsheet_info(GetSpreadsheetInfoInput {
                spreadsheet_id: SPREADSHEET_ID.to_string(),
            })
            .await
            .unwrap();

        assert_eq!(info.title, "Budget");
        assert_eq!(info.locale, "en_US");
        assert_eq!(info.sheets.len(), 2);
        assert_eq!(info.sheets[1].sheet_id, 17);
        assert_eq!(info.sheets[1].column_count, 8);
    }

    #[test]
    fn test_create_spreadsheet_input_accepts_list_or_string() {
        let input: CreateSpreadsheetInput =
            serde_json::from_value(json!({"title": "T", "sheet_names": ["A", "B"]})).unwrap();
        assert_eq!(input.sheet_names.unwrap().into_items(), vec!["A", "B"]);

        let input: CreateSpreadsheetInput =
            serde_json::from_value(json!({"title": "T"})).unwrap();
        assert!(input.sheet_names.is_none());
    }
}
