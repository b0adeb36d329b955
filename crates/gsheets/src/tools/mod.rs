//! The toolbox: one async method per spreadsheet tool.
//!
//! Each method validates its input, translates it into one request (plus a
//! metadata fetch when a sheet is addressed by title), sends it through the
//! shared [`ServiceHandles`], and normalizes the reply.

use tracing::debug;

use crate::{
    client::ServiceHandles,
    credential::GoogleCredential,
    error::{Result, SheetsError, ensure_input},
    normalize,
    translate::SheetSelector,
    types::{BatchUpdateSpreadsheetResponse, Request},
};

pub mod cells;
pub mod charts;
pub mod data;
pub mod dimensions;
pub mod formatting;
pub mod sharing;
pub mod sheets;
pub mod spreadsheet;

/// Stateless tool surface over a pair of authorized service handles.
#[derive(Debug, Clone)]
pub struct SheetsToolbox {
    handles: ServiceHandles,
}

impl SheetsToolbox {
    pub fn new(handles: ServiceHandles) -> Self {
        Self { handles }
    }

    /// Builds the service handles from a resolved credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential carries an empty token or an
    /// invalid endpoint override.
    pub fn from_credential(credential: &GoogleCredential) -> Result<Self> {
        Ok(Self::new(ServiceHandles::from_credential(credential)?))
    }

    pub fn handles(&self) -> &ServiceHandles {
        &self.handles
    }

    /// Resolves a selector to a numeric sheet id.
    ///
    /// Ids pass through untouched; titles cost one metadata fetch. A title
    /// that matches no sheet but reads as a non-negative integer (`"17"`) is
    /// taken as a sheet id, so an exact title match still wins.
    async fn resolve_sheet(&self, spreadsheet_id: &str, sheet: &SheetSelector) -> Result<i64> {
        match sheet {
            SheetSelector::Id(id) => {
                ensure_input!(*id >= 0, "sheet id must not be negative");
                Ok(*id)
            }
            SheetSelector::Title(title) => {
                debug!(spreadsheet_id, title = %title, "resolving sheet title");
                let metadata = self.handles.primary().get_spreadsheet(spreadsheet_id).await?;
                let resolved = normalize::sheet_id_for_title(&metadata, title);
                if let Err(SheetsError::SheetNotFound { .. }) = &resolved
                    && let Some(id) = numeric_sheet_id(title)
                {
                    debug!(sheet_id = id, "no sheet titled {title:?}; using it as an id");
                    return Ok(id);
                }
                resolved
            }
        }
    }

    /// Sends a single structural request as its own batch.
    async fn apply(
        &self,
        spreadsheet_id: &str,
        request: Request,
    ) -> Result<BatchUpdateSpreadsheetResponse> {
        self.handles
            .primary()
            .batch_update(spreadsheet_id, vec![request])
            .await
    }
}

fn numeric_sheet_id(title: &str) -> Option<i64> {
    title.trim().parse::<i64>().ok().filter(|id| *id >= 0)
}

fn require_spreadsheet_id(spreadsheet_id: &str) -> Result<()> {
    ensure_input!(
        !spreadsheet_id.trim().is_empty(),
        "spreadsheet_id must not be empty"
    );
    Ok(())
}

fn require_range(range: &str) -> Result<()> {
    ensure_input!(!range.trim().is_empty(), "range must not be empty");
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use serde_json::{Value, json};
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    use super::SheetsToolbox;
    use crate::credential::GoogleCredential;

    pub(crate) const SPREADSHEET_ID: &str = "abc123";

    pub(crate) fn toolbox_for(server: &MockServer) -> SheetsToolbox {
        let credential = GoogleCredential::new("test-token").with_endpoints(
            format!("{}/v4", server.uri()),
            format!("{}/drive/v3", server.uri()),
        );
        SheetsToolbox::from_credential(&credential).expect("toolbox should build")
    }

    pub(crate) fn metadata_body() -> Value {
        json!({
            "spreadsheetId": SPREADSHEET_ID,
            "spreadsheetUrl": "https://docs.google.com/spreadsheets/d/abc123/edit",
            "properties": {"title": "Budget", "locale": "en_US", "timeZone": "Etc/GMT"},
            "sheets": [
                {"properties": {"sheetId": 0, "title": "Sheet1", "index": 0,
                    "gridProperties": {"rowCount": 1000, "columnCount": 26}}},
                {"properties": {"sheetId": 17, "title": "Q1 Sales", "index": 1,
                    "gridProperties": {"rowCount": 50, "columnCount": 8}}}
            ]
        })
    }

    pub(crate) async fn mount_metadata(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path(format!("/v4/spreadsheets/{SPREADSHEET_ID}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(metadata_body()))
            .mount(server)
            .await;
    }

    pub(crate) fn batch_update_path() -> String {
        format!("/v4/spreadsheets/{SPREADSHEET_ID}:batchUpdate")
    }

    /// Body of the only `batchUpdate` the server received.
    pub(crate) async fn sole_batch_request(server: &MockServer) -> Value {
        let requests = server
            .received_requests()
            .await
            .expect("request recording should be enabled");
        let batches: Vec<_> = requests
            .iter()
            .filter(|request| request.url.path().ends_with(":batchUpdate"))
            .collect();
        assert_eq!(batches.len(), 1, "expected exactly one batchUpdate");
        let body: Value = batches[0].body_json().expect("batch body should be JSON");
        let list = body["requests"].as_array().expect("requests array");
        assert_eq!(list.len(), 1, "expected exactly one request in the batch");
        list[0].clone()
    }
}
