//! Drive sharing for spreadsheets.

use schemars::JsonSchema;
use serde::Deserialize;
use tracing::info;

use super::{SheetsToolbox, require_spreadsheet_id};
use crate::{
    error::Result,
    normalize::{self, ShareOutput},
    translate,
    types::PermissionRole,
};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ShareSpreadsheetInput {
    /// The ID of the spreadsheet (also its Drive file id).
    pub spreadsheet_id: String,
    /// Address to share with. The grantee is notified by email.
    #[serde(default)]
    pub email: Option<String>,
    /// Role to grant (default `reader`).
    #[serde(default)]
    pub role: PermissionRole,
    /// Share with anyone who has the link instead of a named user.
    #[serde(default)]
    pub make_public: bool,
}

impl SheetsToolbox {
    /// # Share Spreadsheet
    ///
    /// Grants access to a user by email, or to anyone with the link.
    ///
    /// # Errors
    ///
    /// Returns an error if neither an email nor `make_public` is given, or
    /// the service rejects the permission.
    pub async fn share_spreadsheet(&self, input: ShareSpreadsheetInput) -> Result<ShareOutput> {
        require_spreadsheet_id(&input.spreadsheet_id)?;
        let plan = translate::share_plan(input.email.as_deref(), input.make_public, input.role)?;
        let permission = self
            .handles
            .secondary()
            .create_permission(
                &input.spreadsheet_id,
                &plan.permission,
                plan.send_notification_email,
            )
            .await?;
        info!(spreadsheet_id = %input.spreadsheet_id, permission_id = %permission.id, "shared spreadsheet");
        Ok(normalize::shared(permission, &plan))
    }
}
