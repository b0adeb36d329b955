//! # Google Sheets Tools
//!
//! Spreadsheet manipulation for agents, built on the Google Sheets v4 and
//! Drive v3 REST APIs. Every tool is an async method on [`SheetsToolbox`]
//! that takes a typed input and returns a flat, serializable output record.
//!
//! A tool call runs in three steps:
//!
//! 1. [`translate`] turns caller parameters into a request body. Indices are
//!    0-based with exclusive ends, negative ids and indices mean "not given",
//!    and loosely typed lists may be passed as JSON arrays or comma-separated
//!    strings.
//! 2. [`client`] sends it with the bearer token from a [`GoogleCredential`].
//! 3. [`normalize`] flattens the reply, defaulting fields the service left
//!    out.
//!
//! ## Tools
//!
//! | Group | Tools |
//! |-------|-------|
//! | Spreadsheet | `create_spreadsheet`, `get_spreadsheet_info` |
//! | Sheets | `list_sheets`, `create_sheet`, `delete_sheet`, `rename_sheet`, `duplicate_sheet` |
//! | Cells | `read_cells`, `write_cells`, `batch_read`, `batch_write`, `clear_cells`, `append_rows` |
//! | Dimensions | `insert_rows`, `insert_columns`, `delete_rows`, `delete_columns`, `set_column_width` |
//! | Formatting | `format_cells`, `merge_cells` |
//! | Charts | `create_chart`, `list_charts`, `delete_chart` |
//! | Data | `sort_range`, `find_replace`, `get_last_row` |
//! | Sharing | `share_spreadsheet` |
//!
//! ## Credentials
//!
//! ```toml
//! [credentials.google]
//! access_token = "ya29..."
//! # optional, for testing against a mock server
//! sheets_endpoint = "http://127.0.0.1:8080/v4"
//! drive_endpoint = "http://127.0.0.1:8080/drive/v3"
//! ```
//!
//! See [`CredentialSearch`] for where the file is looked up.
//!
//! ```ignore
//! let credential = CredentialSearch::from_env(None).resolve()?;
//! let toolbox = SheetsToolbox::from_credential(&credential)?;
//! let info = toolbox
//!     .get_spreadsheet_info(tools::spreadsheet::GetSpreadsheetInfoInput { spreadsheet_id: id })
//!     .await?;
//! ```

pub mod a1;
pub mod client;
pub mod credential;
pub mod error;
pub mod normalize;
pub mod tools;
pub mod translate;
pub mod types;

pub use client::{DriveClient, ServiceHandles, SheetsClient};
pub use credential::{CredentialError, CredentialSearch, CredentialSource, GoogleCredential};
pub use error::{Result, SheetsError};
pub use tools::SheetsToolbox;
