//! `gsheets-mcp check` command implementation.
//!
//! Verifies a setup end to end: finds the credentials, reports where they
//! came from, and reads one spreadsheet's metadata. Nothing is created or
//! modified.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use gsheets::{
    CredentialSearch, CredentialSource, SheetsError, SheetsToolbox,
    normalize::SpreadsheetInfo, tools::spreadsheet::GetSpreadsheetInfoInput,
};

/// Arguments for the `check` command.
#[derive(Args)]
pub struct CheckArgs {
    /// Spreadsheet to read as an access test.
    pub spreadsheet_id: String,

    /// Path to a credentials TOML file.
    #[arg(long, env = "GSHEETS_CREDENTIALS_PATH")]
    pub credentials: Option<PathBuf>,
}

/// Outcome of a setup check once credentials were found.
#[derive(Debug)]
struct SetupReport {
    source: CredentialSource,
    access: Result<SpreadsheetInfo, SheetsError>,
}

pub async fn run(args: &CheckArgs) -> Result<()> {
    eprintln!("{} Checking Google Sheets setup...", style("→").cyan());

    let search = CredentialSearch::from_env(args.credentials.clone());
    let report = match check_setup(&search, &args.spreadsheet_id).await {
        Ok(report) => report,
        Err(err) => {
            eprintln!("{} {err:#}", style("✗").red().bold());
            return Err(err);
        }
    };
    eprintln!(
        "{} Credentials: {}",
        style("✓").green().bold(),
        report.source
    );

    match report.access {
        Ok(info) => {
            eprintln!(
                "{} Read spreadsheet '{}' ({} sheet(s))",
                style("✓").green().bold(),
                info.title,
                info.sheets.len()
            );
            eprintln!("\n{} Setup looks good", style("✓").green().bold());
            Ok(())
        }
        Err(err) => {
            eprintln!(
                "{} Failed to read spreadsheet {}: {err}",
                style("✗").red().bold(),
                args.spreadsheet_id
            );
            if let Some(hint) = access_hint(&err) {
                eprintln!("\n{hint}");
            }
            Err(err).context("setup check failed")
        }
    }
}

async fn check_setup(search: &CredentialSearch, spreadsheet_id: &str) -> Result<SetupReport> {
    let (credential, source) = search
        .resolve_with_source()
        .context("failed to resolve Google credentials")?;
    let toolbox =
        SheetsToolbox::from_credential(&credential).context("failed to build API clients")?;
    let access = toolbox
        .get_spreadsheet_info(GetSpreadsheetInfoInput {
            spreadsheet_id: spreadsheet_id.to_string(),
        })
        .await;
    Ok(SetupReport { source, access })
}

/// Likely cause of a rejected access test, when the status points at one.
fn access_hint(err: &SheetsError) -> Option<String> {
    let SheetsError::Remote {
        service, status, ..
    } = err
    else {
        return None;
    };
    match status.as_u16() {
        401 => Some(
            "The access token was rejected. It may have expired; issue a new one \
             (for example with `gcloud auth print-access-token`)."
                .to_string(),
        ),
        403 => {
            let api = match *service {
                "Drive" => "drive.googleapis.com",
                _ => "sheets.googleapis.com",
            };
            Some(format!(
                "The Google {service} API may not be enabled for the token's project.\n  \
                 Enable it at https://console.cloud.google.com/apis/library/{api}\n  \
                 If it is enabled, share the spreadsheet with the account behind the token.\n  \
                 Changes can take a few minutes to propagate."
            ))
        }
        404 => Some("No spreadsheet with that id is visible to this account.".to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    use super::*;

    fn credentials_for(server: &MockServer, dir: &TempDir) -> PathBuf {
        let file = dir.path().join("credentials.toml");
        fs::write(
            &file,
            format!(
                "[credentials.google]\naccess_token = \"test-token\"\n\
                 sheets_endpoint = \"{uri}/v4\"\ndrive_endpoint = \"{uri}/drive/v3\"\n",
                uri = server.uri()
            ),
        )
        .unwrap();
        file
    }

    fn search_with(explicit_path: Option<PathBuf>, dir: &TempDir) -> CredentialSearch {
        CredentialSearch {
            explicit_path,
            access_token: None,
            working_dir: Some(dir.path().join("work")),
            config_dir: Some(dir.path().join("config")),
        }
    }

    #[tokio::test]
    async fn test_check_reports_source_and_reads_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/spreadsheets/abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "spreadsheetId": "abc123",
                "properties": {"title": "Budget"},
                "sheets": [{"properties": {"sheetId": 0, "title": "Sheet1", "index": 0}}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        let dir = TempDir::new().unwrap();
        let file = credentials_for(&server, &dir);

        let report = check_setup(&search_with(Some(file.clone()), &dir), "abc123")
            .await
            .unwrap();

        assert_eq!(report.source, CredentialSource::ExplicitFile(file));
        let info = report.access.unwrap();
        assert_eq!(info.title, "Budget");
        assert_eq!(info.sheets.len(), 1);
    }

    #[tokio::test]
    async fn test_check_forbidden_points_at_the_sheets_api() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/spreadsheets/abc123"))
            .respond_with(ResponseTemplate::new(403).set_body_string(
                r#"{"error": {"message": "Google Sheets API has not been used in project 42"}}"#,
            ))
            .mount(&server)
            .await;
        let dir = TempDir::new().unwrap();
        let file = credentials_for(&server, &dir);

        let report = check_setup(&search_with(Some(file), &dir), "abc123")
            .await
            .unwrap();

        let err = report.access.unwrap_err();
        let hint = access_hint(&err).expect("403 should carry a hint");
        assert!(hint.contains("Google Sheets API"));
        assert!(hint.contains("sheets.googleapis.com"));
    }

    #[tokio::test]
    async fn test_check_without_credentials_fails_before_any_request() {
        let dir = TempDir::new().unwrap();

        let err = check_setup(&search_with(None, &dir), "abc123")
            .await
            .unwrap_err();

        assert!(format!("{err:#}").contains("Google credentials not found"));
    }

    #[test]
    fn test_access_hint_by_status() {
        let remote = |service, status: u16| SheetsError::Remote {
            service,
            status: status.try_into().unwrap(),
            body: String::new(),
        };

        let drive = access_hint(&remote("Drive", 403)).unwrap();
        assert!(drive.contains("drive.googleapis.com"));
        assert!(access_hint(&remote("Sheets", 401)).unwrap().contains("expired"));
        assert!(access_hint(&remote("Sheets", 404)).is_some());
        assert!(access_hint(&remote("Sheets", 500)).is_none());
        assert!(access_hint(&SheetsError::Validation("x".to_string())).is_none());
    }
}
