//! Configuration for a batch ingestion run.
//!
//! All run behaviour is controlled through [`RunConfig`], built via its
//! [`RunConfigBuilder`]. Keeping every knob in one struct makes it trivial to
//! construct configs in tests and to diff two runs to understand why their
//! outputs differ.
//!
//! # Placeholder detection
//! The distributed `.env.example` ships with `C:/path/to/...` placeholders.
//! A run against a placeholder path would create and then happily empty a
//! directory literally named `path/to`, so the builder rejects placeholder
//! values before anything touches the file system.

use crate::error::PipelineError;
use std::fmt;
use std::path::{Path, PathBuf};

/// Substrings that mark a path as an unedited template value.
const PLACEHOLDER_MARKERS: &[&str] = &["C:/path/to/", "/path/to/"];

/// Configuration for a batch ingestion run.
///
/// Built via [`RunConfig::builder()`].
///
/// # Example
/// ```rust
/// use paperfeed::RunConfig;
///
/// let config = RunConfig::builder()
///     .consume_dir("/scans/consume")
///     .output_dir("/scans/output")
///     .label("Xerox_Scan")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct RunConfig {
    /// Directory holding the multi-page source scans.
    pub consume_dir: PathBuf,

    /// Directory the single-page output files are written to.
    ///
    /// Exclusively owned by one run: the cleaner empties it at start, and the
    /// rename counter assumes nothing else writes into it mid-run.
    pub output_dir: PathBuf,

    /// Where processed source scans are moved when archiving is enabled.
    /// Defaults to `<consume_dir>/archived`.
    pub archive_dir: PathBuf,

    /// Base URL of the document-management API, e.g.
    /// `https://paperless.local/api/`. Required for upload and `--test-api`.
    pub api_base_url: Option<String>,

    /// API token, sent as `Authorization: Token <value>`.
    pub api_token: Option<String>,

    /// Optional PEM trust-anchor certificate for TLS verification (PUBKEY).
    pub trust_anchor: Option<PathBuf>,

    /// Fixed label embedded in every output filename. Default: `Xerox_Scan`.
    pub label: String,

    /// Upload the output files after processing.
    pub upload: bool,

    /// Move processed source scans to `archive_dir` after the run.
    pub archive: bool,

    /// Timeout applied to every HTTP call. Default: 30.
    ///
    /// The upload loop is fail-fast, so a single hung request would otherwise
    /// stall the whole run indefinitely.
    pub http_timeout_secs: u64,
}

impl RunConfig {
    /// Create a new builder for `RunConfig`.
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::default()
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("consume_dir", &self.consume_dir)
            .field("output_dir", &self.output_dir)
            .field("archive_dir", &self.archive_dir)
            .field("api_base_url", &self.api_base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("trust_anchor", &self.trust_anchor)
            .field("label", &self.label)
            .field("upload", &self.upload)
            .field("archive", &self.archive)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

/// Builder for [`RunConfig`].
#[derive(Debug, Default)]
pub struct RunConfigBuilder {
    consume_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    archive_dir: Option<PathBuf>,
    api_base_url: Option<String>,
    api_token: Option<String>,
    trust_anchor: Option<PathBuf>,
    label: Option<String>,
    upload: bool,
    archive: bool,
    http_timeout_secs: Option<u64>,
}

impl RunConfigBuilder {
    pub fn consume_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.consume_dir = Some(dir.into());
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn archive_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.archive_dir = Some(dir.into());
        self
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn trust_anchor(mut self, path: impl Into<PathBuf>) -> Self {
        self.trust_anchor = Some(path.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn upload(mut self, v: bool) -> Self {
        self.upload = v;
        self
    }

    pub fn archive(mut self, v: bool) -> Self {
        self.archive = v;
        self
    }

    pub fn http_timeout_secs(mut self, secs: u64) -> Self {
        self.http_timeout_secs = Some(secs);
        self
    }

    /// Build the configuration, validating constraints.
    ///
    /// Placeholder paths are rejected here, before any file-system access.
    pub fn build(self) -> Result<RunConfig, PipelineError> {
        let consume_dir = self.consume_dir.ok_or(PipelineError::MissingConfig {
            var: "CONSUME_FOLDER",
        })?;
        let output_dir = self.output_dir.ok_or(PipelineError::MissingConfig {
            var: "OUTPUT_FOLDER",
        })?;
        let archive_dir = self
            .archive_dir
            .unwrap_or_else(|| consume_dir.join("archived"));

        reject_placeholder("CONSUME_FOLDER", &consume_dir)?;
        reject_placeholder("OUTPUT_FOLDER", &output_dir)?;
        reject_placeholder("ARCHIVE_FOLDER", &archive_dir)?;

        let label = self.label.unwrap_or_else(|| "Xerox_Scan".to_string());
        if label.trim().is_empty() {
            return Err(PipelineError::InvalidConfig(
                "label must not be empty".into(),
            ));
        }

        let http_timeout_secs = self.http_timeout_secs.unwrap_or(30);
        if http_timeout_secs == 0 {
            return Err(PipelineError::InvalidConfig(
                "http timeout must be ≥ 1 second".into(),
            ));
        }

        Ok(RunConfig {
            consume_dir,
            output_dir,
            archive_dir,
            api_base_url: self.api_base_url,
            api_token: self.api_token,
            trust_anchor: self.trust_anchor,
            label,
            upload: self.upload,
            archive: self.archive,
            http_timeout_secs,
        })
    }
}

fn reject_placeholder(var: &str, path: &Path) -> Result<(), PipelineError> {
    let text = path.to_string_lossy();
    if PLACEHOLDER_MARKERS.iter().any(|m| text.contains(m)) {
        return Err(PipelineError::PlaceholderPath {
            var: var.to_string(),
            path: text.into_owned(),
        });
    }
    Ok(())
}
