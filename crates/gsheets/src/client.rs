//! Authorized HTTP clients for the Sheets and Drive APIs.

use reqwest::Method;
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    credential::{CredentialError, GoogleCredential},
    error::{Result, SheetsError},
    types::{
        AppendValuesResponse, BatchGetValuesResponse, BatchUpdateSpreadsheetRequest,
        BatchUpdateSpreadsheetResponse, BatchUpdateValuesRequest, BatchUpdateValuesResponse,
        ClearValuesResponse, Permission, PermissionRequest, Request, Spreadsheet,
        UpdateValuesResponse, ValueInputOption, ValueRange, ValueRenderOption,
    },
};

pub const DEFAULT_SHEETS_ENDPOINT: &str = "https://sheets.googleapis.com/v4";
pub const DEFAULT_DRIVE_ENDPOINT: &str = "https://www.googleapis.com/drive/v3";

/// The pair of authorized handles every tool works through.
///
/// Built once from a resolved credential and shared by reference; there is no
/// lazily-initialized global.
#[derive(Debug, Clone)]
pub struct ServiceHandles {
    sheets: SheetsClient,
    drive: DriveClient,
}

impl ServiceHandles {
    /// Builds both handles over one connection pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the access token is empty or an endpoint override
    /// is not an absolute URL.
    pub fn from_credential(credential: &GoogleCredential) -> Result<Self> {
        let http = reqwest::Client::new();
        let sheets = ApiClient::new(
            "Sheets",
            http.clone(),
            credential
                .sheets_endpoint
                .as_deref()
                .unwrap_or(DEFAULT_SHEETS_ENDPOINT),
            &credential.access_token,
        )?;
        let drive = ApiClient::new(
            "Drive",
            http,
            credential
                .drive_endpoint
                .as_deref()
                .unwrap_or(DEFAULT_DRIVE_ENDPOINT),
            &credential.access_token,
        )?;
        Ok(Self {
            sheets: SheetsClient { api: sheets },
            drive: DriveClient { api: drive },
        })
    }

    /// Spreadsheet-structure and cell-value operations.
    pub fn primary(&self) -> &SheetsClient {
        &self.sheets
    }

    /// File-permission operations.
    pub fn secondary(&self) -> &DriveClient {
        &self.drive
    }
}

// ============================================================================
// Sheets API
// ============================================================================

#[derive(Debug, Clone)]
pub struct SheetsClient {
    api: ApiClient,
}

impl SheetsClient {
    /// `POST spreadsheets`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects it.
    pub async fn create_spreadsheet(&self, spreadsheet: &Spreadsheet) -> Result<Spreadsheet> {
        let url = self.api.url_with_segments(&["spreadsheets"])?;
        self.api.send(Method::POST, url, Some(spreadsheet), &[]).await
    }

    /// `GET spreadsheets/{id}`, including sheet properties and charts.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects it.
    pub async fn get_spreadsheet(&self, spreadsheet_id: &str) -> Result<Spreadsheet> {
        let url = self.api.url_with_segments(&["spreadsheets", spreadsheet_id])?;
        self.api.send(Method::GET, url, None::<&()>, &[]).await
    }

    /// `POST spreadsheets/{id}:batchUpdate`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects it.
    pub async fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: Vec<Request>,
    ) -> Result<BatchUpdateSpreadsheetResponse> {
        let url = self
            .api
            .url_with_segments(&["spreadsheets", &format!("{spreadsheet_id}:batchUpdate")])?;
        let body = BatchUpdateSpreadsheetRequest { requests };
        self.api.send(Method::POST, url, Some(&body), &[]).await
    }

    /// `GET spreadsheets/{id}/values/{range}`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects it.
    pub async fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        render: ValueRenderOption,
    ) -> Result<ValueRange> {
        let url = self
            .api
            .url_with_segments(&["spreadsheets", spreadsheet_id, "values", range])?;
        let query = [("valueRenderOption", render.as_str().to_string())];
        self.api.send(Method::GET, url, None::<&()>, &query).await
    }

    /// `PUT spreadsheets/{id}/values/{range}`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects it.
    pub async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &ValueRange,
        input: ValueInputOption,
    ) -> Result<UpdateValuesResponse> {
        let url = self
            .api
            .url_with_segments(&["spreadsheets", spreadsheet_id, "values", range])?;
        let query = [("valueInputOption", input.as_str().to_string())];
        self.api.send(Method::PUT, url, Some(values), &query).await
    }

    /// `POST spreadsheets/{id}/values/{range}:append`, inserting new rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects it.
    pub async fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &ValueRange,
        input: ValueInputOption,
    ) -> Result<AppendValuesResponse> {
        let url = self.api.url_with_segments(&[
            "spreadsheets",
            spreadsheet_id,
            "values",
            &format!("{range}:append"),
        ])?;
        let query = [
            ("valueInputOption", input.as_str().to_string()),
            ("insertDataOption", "INSERT_ROWS".to_string()),
        ];
        self.api.send(Method::POST, url, Some(values), &query).await
    }

    /// `POST spreadsheets/{id}/values/{range}:clear`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects it.
    pub async fn clear_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<ClearValuesResponse> {
        let url = self.api.url_with_segments(&[
            "spreadsheets",
            spreadsheet_id,
            "values",
            &format!("{range}:clear"),
        ])?;
        let body = serde_json::Map::new();
        self.api.send(Method::POST, url, Some(&body), &[]).await
    }

    /// `GET spreadsheets/{id}/values:batchGet`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects it.
    pub async fn batch_get_values(
        &self,
        spreadsheet_id: &str,
        ranges: &[String],
        render: ValueRenderOption,
    ) -> Result<BatchGetValuesResponse> {
        let url = self
            .api
            .url_with_segments(&["spreadsheets", spreadsheet_id, "values:batchGet"])?;
        let mut query: Vec<(&str, String)> = ranges
            .iter()
            .map(|range| ("ranges", range.clone()))
            .collect();
        query.push(("valueRenderOption", render.as_str().to_string()));
        self.api.send(Method::GET, url, None::<&()>, &query).await
    }

    /// `POST spreadsheets/{id}/values:batchUpdate`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects it.
    pub async fn batch_update_values(
        &self,
        spreadsheet_id: &str,
        body: &BatchUpdateValuesRequest,
    ) -> Result<BatchUpdateValuesResponse> {
        let url = self
            .api
            .url_with_segments(&["spreadsheets", spreadsheet_id, "values:batchUpdate"])?;
        self.api.send(Method::POST, url, Some(body), &[]).await
    }
}

// ============================================================================
// Drive API
// ============================================================================

#[derive(Debug, Clone)]
pub struct DriveClient {
    api: ApiClient,
}

impl DriveClient {
    /// `POST files/{id}/permissions`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects it.
    pub async fn create_permission(
        &self,
        file_id: &str,
        permission: &PermissionRequest,
        send_notification_email: bool,
    ) -> Result<Permission> {
        let url = self
            .api
            .url_with_segments(&["files", file_id, "permissions"])?;
        let query = [(
            "sendNotificationEmail",
            send_notification_email.to_string(),
        )];
        self.api
            .send(Method::POST, url, Some(permission), &query)
            .await
    }
}

// ============================================================================
// HTTP plumbing
// ============================================================================

#[derive(Clone)]
struct ApiClient {
    service: &'static str,
    http: reqwest::Client,
    base_url: reqwest::Url,
    access_token: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("service", &self.service)
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    fn new(
        service: &'static str,
        http: reqwest::Client,
        endpoint: &str,
        access_token: &str,
    ) -> Result<Self> {
        if access_token.trim().is_empty() {
            return Err(SheetsError::Credential(CredentialError::Invalid(
                "access_token must not be empty".to_string(),
            )));
        }
        let base_url = normalize_base_url(endpoint)?;
        Ok(Self {
            service,
            http,
            base_url,
            access_token: access_token.trim().to_string(),
        })
    }

    fn url_with_segments(&self, segments: &[&str]) -> Result<reqwest::Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| SheetsError::InvalidEndpoint {
                    endpoint: self.base_url.to_string(),
                    reason: "base URL must be absolute".to_string(),
                })?;
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    async fn send<TReq: Serialize + ?Sized, TRes: DeserializeOwned>(
        &self,
        method: Method,
        url: reqwest::Url,
        body: Option<&TReq>,
        query: &[(&str, String)],
    ) -> Result<TRes> {
        debug!(service = self.service, %method, url = %url, "sending request");

        let mut request = self
            .http
            .request(method, url)
            .query(query)
            .bearer_auth(&self.access_token)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|source| self.transport(source))?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|source| self.transport(source))
        } else {
            let body = error_body(response.text().await);
            debug!(service = self.service, %status, "request rejected");
            Err(SheetsError::Remote {
                service: self.service,
                status,
                body,
            })
        }
    }

    fn transport(&self, source: reqwest::Error) -> SheetsError {
        SheetsError::Transport {
            service: self.service,
            source,
        }
    }
}

/// The rejection body, or a placeholder naming why it could not be read.
fn error_body(text: reqwest::Result<String>) -> String {
    text.unwrap_or_else(|err| format!("<unreadable body: {err}>"))
}

fn normalize_base_url(endpoint: &str) -> Result<reqwest::Url> {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(SheetsError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: "endpoint must not be empty".to_string(),
        });
    }
    reqwest::Url::parse(trimmed).map_err(|err| SheetsError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: err.to_string(),
    })
}
