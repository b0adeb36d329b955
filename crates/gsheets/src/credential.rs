//! Credential resolution for the Google APIs.
//!
//! Tokens are issued out of band (for example by `gcloud auth
//! print-access-token` or a service-account token broker) and handed to the
//! server through a TOML credentials file or the environment:
//!
//! ```toml
//! [credentials.google]
//! access_token = "ya29...."
//! # Optional overrides, mostly useful for tests and proxies.
//! sheets_endpoint = "https://sheets.googleapis.com/v4"
//! drive_endpoint = "https://www.googleapis.com/drive/v3"
//! ```
//!
//! The resolution order is:
//! 1. Explicit path (`--credentials` or `GSHEETS_CREDENTIALS_PATH`)
//! 2. `GOOGLE_ACCESS_TOKEN` environment variable
//! 3. `credentials/credentials.toml` and `credentials.toml` in the current
//!    directory
//! 4. `gsheets-mcp/credentials.toml` in the user config directory

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::debug;

/// Environment variable naming an explicit credentials file.
pub const CREDENTIALS_PATH_ENV: &str = "GSHEETS_CREDENTIALS_PATH";
/// Environment variable carrying a bare access token.
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_ACCESS_TOKEN";

const PROVIDER: &str = "google";
const CREDENTIALS_FILE: &str = "credentials.toml";
const CONFIG_DIR_NAME: &str = "gsheets-mcp";

/// Errors that can occur while locating or loading credentials.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CredentialError {
    /// Nothing usable was found in any searched location.
    #[error(
        "Google credentials not found. Set GSHEETS_CREDENTIALS_PATH or GOOGLE_ACCESS_TOKEN, or create one of: {}",
        display_paths(.searched)
    )]
    NotFound { searched: Vec<PathBuf> },

    /// A credentials file exists but could not be read.
    #[error("failed to read credentials file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A credentials file is not valid TOML.
    #[error("failed to parse credentials file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The credentials are present but unusable.
    #[error("invalid credentials: {0}")]
    Invalid(String),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A resolved bearer token plus optional endpoint overrides.
#[derive(Clone, Deserialize)]
pub struct GoogleCredential {
    pub access_token: String,
    #[serde(default)]
    pub sheets_endpoint: Option<String>,
    #[serde(default)]
    pub drive_endpoint: Option<String>,
}

impl std::fmt::Debug for GoogleCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleCredential")
            .field("access_token", &"<redacted>")
            .field("sheets_endpoint", &self.sheets_endpoint)
            .field("drive_endpoint", &self.drive_endpoint)
            .finish()
    }
}

impl GoogleCredential {
    /// Creates a credential for the default Google endpoints.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            sheets_endpoint: None,
            drive_endpoint: None,
        }
    }

    /// Overrides both API base URLs.
    #[must_use]
    pub fn with_endpoints(
        mut self,
        sheets_endpoint: impl Into<String>,
        drive_endpoint: impl Into<String>,
    ) -> Self {
        self.sheets_endpoint = Some(sheets_endpoint.into());
        self.drive_endpoint = Some(drive_endpoint.into());
        self
    }

    /// Loads the `[credentials.google]` table from a credentials file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, has no
    /// `google` provider table, or carries an empty access token.
    pub fn load(path: &Path) -> Result<Self, CredentialError> {
        let contents = fs::read_to_string(path).map_err(|source| CredentialError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: CredentialsFile =
            toml::from_str(&contents).map_err(|source| CredentialError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let table = file.credentials.get(PROVIDER).cloned().ok_or_else(|| {
            CredentialError::Invalid(format!(
                "{} has no [credentials.{PROVIDER}] table",
                path.display()
            ))
        })?;
        let credential: Self = table.try_into().map_err(|source| CredentialError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        credential.validated()
    }

    fn validated(self) -> Result<Self, CredentialError> {
        if self.access_token.trim().is_empty() {
            return Err(CredentialError::Invalid(
                "access_token must not be empty".to_string(),
            ));
        }
        Ok(self)
    }
}

/// Where a resolved credential came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// The file named by `--credentials` or `GSHEETS_CREDENTIALS_PATH`.
    ExplicitFile(PathBuf),
    /// The `GOOGLE_ACCESS_TOKEN` environment variable.
    Environment,
    /// A file found in one of the default locations.
    DiscoveredFile(PathBuf),
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExplicitFile(path) => write!(f, "{} (explicit path)", path.display()),
            Self::Environment => write!(f, "{ACCESS_TOKEN_ENV} environment variable"),
            Self::DiscoveredFile(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CredentialsFile {
    #[serde(default)]
    credentials: HashMap<String, toml::Value>,
}

/// The set of places credentials are looked up in.
///
/// [`CredentialSearch::from_env`] captures the process environment; tests
/// build the struct directly so resolution never depends on global state.
#[derive(Debug, Clone, Default)]
pub struct CredentialSearch {
    /// Explicit file path; a missing file here is skipped like any other.
    pub explicit_path: Option<PathBuf>,
    /// Bare token taken from the environment.
    pub access_token: Option<String>,
    /// Directory searched for `credentials/credentials.toml` and
    /// `credentials.toml`.
    pub working_dir: Option<PathBuf>,
    /// Per-user configuration directory.
    pub config_dir: Option<PathBuf>,
}

impl CredentialSearch {
    /// Captures the search locations from the process environment.
    ///
    /// `explicit_path` takes precedence over `GSHEETS_CREDENTIALS_PATH`.
    pub fn from_env(explicit_path: Option<PathBuf>) -> Self {
        Self {
            explicit_path: explicit_path.or_else(|| {
                std::env::var(CREDENTIALS_PATH_ENV)
                    .ok()
                    .filter(|value| !value.trim().is_empty())
                    .map(PathBuf::from)
            }),
            access_token: std::env::var(ACCESS_TOKEN_ENV).ok(),
            working_dir: std::env::current_dir().ok(),
            config_dir: dirs::config_dir(),
        }
    }

    /// Candidate files, in resolution order.
    pub fn candidate_paths(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(path) = &self.explicit_path {
            paths.push(path.clone());
        }
        if let Some(dir) = &self.working_dir {
            paths.push(dir.join("credentials").join(CREDENTIALS_FILE));
            paths.push(dir.join(CREDENTIALS_FILE));
        }
        if let Some(dir) = &self.config_dir {
            paths.push(dir.join(CONFIG_DIR_NAME).join(CREDENTIALS_FILE));
        }
        paths
    }

    /// Resolves the first usable credential.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::NotFound`] when no location yields a
    /// credential, or the load error of the first file that exists but is
    /// unusable.
    pub fn resolve(&self) -> Result<GoogleCredential, CredentialError> {
        self.resolve_with_source().map(|(credential, _)| credential)
    }

    /// Like [`CredentialSearch::resolve`], also reporting which location
    /// supplied the credential.
    ///
    /// # Errors
    ///
    /// Same as [`CredentialSearch::resolve`].
    pub fn resolve_with_source(
        &self,
    ) -> Result<(GoogleCredential, CredentialSource), CredentialError> {
        if let Some(path) = &self.explicit_path
            && path.exists()
        {
            debug!(path = %path.display(), "loading credentials from explicit path");
            let credential = GoogleCredential::load(path)?;
            return Ok((credential, CredentialSource::ExplicitFile(path.clone())));
        }

        if let Some(token) = &self.access_token
            && !token.trim().is_empty()
        {
            debug!("using access token from {ACCESS_TOKEN_ENV}");
            return Ok((
                GoogleCredential::new(token.trim()),
                CredentialSource::Environment,
            ));
        }

        let searched = self.candidate_paths();
        for path in searched.iter().skip(usize::from(self.explicit_path.is_some())) {
            if path.exists() {
                debug!(path = %path.display(), "loading credentials");
                let credential = GoogleCredential::load(path)?;
                return Ok((credential, CredentialSource::DiscoveredFile(path.clone())));
            }
        }

        Err(CredentialError::NotFound { searched })
    }
}
