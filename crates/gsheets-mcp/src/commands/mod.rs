//! CLI command implementations.

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use gsheets::{CredentialSearch, SheetsToolbox};

pub mod call;
pub mod check;
pub mod list;
pub mod serve;

/// Resolves credentials and builds the shared toolbox.
fn load_toolbox(credentials: Option<PathBuf>) -> Result<Arc<SheetsToolbox>> {
    let credential = CredentialSearch::from_env(credentials)
        .resolve()
        .context("failed to resolve Google credentials")?;
    let toolbox =
        SheetsToolbox::from_credential(&credential).context("failed to build API clients")?;
    Ok(Arc::new(toolbox))
}
