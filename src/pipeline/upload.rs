//! Upload: post each output page to the document-management endpoint.
//!
//! ## Fail-fast, unlike the local stages
//!
//! Splitting and renaming shrug off individual failures because local work is
//! cheap to redo. Uploads are different: a failing endpoint fails for every
//! remaining file too, and hammering it with the rest of the batch only
//! produces duplicate partial state server-side. So the connectivity check
//! runs first (one authenticated GET, expect 200, no retries), and the first
//! failed POST aborts the remainder.

use crate::config::RunConfig;
use crate::error::PipelineError;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// HTTP client for one configured endpoint.
#[derive(Debug)]
pub struct Uploader {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

/// Outcome of one upload sweep.
///
/// Files posted before an abort stay posted, so the count is reported even
/// when the sweep ends in an error.
#[derive(Debug)]
pub struct UploadOutcome {
    /// Files successfully posted before the sweep ended.
    pub uploaded: usize,
    /// Why the sweep aborted, if it did.
    pub error: Option<PipelineError>,
}

impl Uploader {
    /// Build the client from configuration.
    ///
    /// Requires `api_base_url` and `api_token`; loads the PEM trust anchor
    /// (`PUBKEY`) into the TLS store when one is configured. The timeout
    /// applies to every request this uploader makes.
    pub fn from_config(config: &RunConfig) -> Result<Self, PipelineError> {
        let base_url = config
            .api_base_url
            .clone()
            .ok_or(PipelineError::MissingConfig { var: "API_BASE_URL" })?;
        let token = config
            .api_token
            .clone()
            .ok_or(PipelineError::MissingConfig { var: "API_TOKEN" })?;

        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .use_rustls_tls();

        if let Some(ref anchor) = config.trust_anchor {
            let pem = std::fs::read(anchor).map_err(|e| PipelineError::TrustAnchor {
                path: anchor.clone(),
                detail: e.to_string(),
            })?;
            let cert =
                reqwest::Certificate::from_pem(&pem).map_err(|e| PipelineError::TrustAnchor {
                    path: anchor.clone(),
                    detail: e.to_string(),
                })?;
            builder = builder.add_root_certificate(cert);
        }

        let client = builder
            .build()
            .map_err(|e| PipelineError::HttpClient(e.to_string()))?;

        // Paperless expects the POST endpoint relative to the API base.
        let base_url = if base_url.ends_with('/') {
            base_url
        } else {
            format!("{base_url}/")
        };

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    fn auth_header(&self) -> String {
        format!("Token {}", self.token)
    }

    /// Authenticated GET against the API base; anything but HTTP 200 fails.
    pub async fn check_connectivity(&self) -> Result<(), PipelineError> {
        let response = self
            .client
            .get(&self.base_url)
            .header(AUTHORIZATION, self.auth_header())
            .send()
            .await
            .map_err(|e| PipelineError::ConnectivityFailed {
                url: self.base_url.clone(),
                detail: e.to_string(),
            })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::ConnectivityFailed {
                url: self.base_url.clone(),
                detail: format!("HTTP {status}: {body}"),
            });
        }

        info!("API connection successful");
        Ok(())
    }

    /// Upload every regular file in `dir`, sorted by name, one POST each.
    ///
    /// Runs the connectivity check first. The first non-2xx response or
    /// network error aborts the remaining uploads; files already posted stay
    /// posted and are counted in the outcome either way.
    pub async fn upload_directory(&self, dir: &Path) -> UploadOutcome {
        if let Err(e) = self.check_connectivity().await {
            return UploadOutcome {
                uploaded: 0,
                error: Some(e),
            };
        }

        let files = match list_upload_files(dir) {
            Ok(files) => files,
            Err(e) => {
                return UploadOutcome {
                    uploaded: 0,
                    error: Some(e),
                }
            }
        };

        info!("There are {} files to be uploaded", files.len());

        let endpoint = format!("{}post_document/", self.base_url);
        let mut uploaded = 0;
        for (i, name) in files.iter().enumerate() {
            info!("{:02}/{} Uploading {name}", i + 1, files.len());
            if let Err(e) = self.upload_file(&endpoint, dir, name).await {
                return UploadOutcome {
                    uploaded,
                    error: Some(e),
                };
            }
            uploaded += 1;
        }

        UploadOutcome {
            uploaded,
            error: None,
        }
    }

    async fn upload_file(
        &self,
        endpoint: &str,
        dir: &Path,
        name: &str,
    ) -> Result<(), PipelineError> {
        let bytes = std::fs::read(dir.join(name)).map_err(|e| PipelineError::UploadFailed {
            file: name.to_string(),
            detail: format!("read failed: {e}"),
        })?;

        let part = multipart::Part::bytes(bytes)
            .file_name(name.to_string())
            .mime_str("application/pdf")
            .map_err(|e| PipelineError::UploadFailed {
                file: name.to_string(),
                detail: format!("mime: {e}"),
            })?;
        let form = multipart::Form::new().part("document", part);

        let response = self
            .client
            .post(endpoint)
            .header(AUTHORIZATION, self.auth_header())
            .multipart(form)
            .send()
            .await
            .map_err(|e| PipelineError::UploadFailed {
                file: name.to_string(),
                detail: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(PipelineError::UploadFailed {
                file: name.to_string(),
                detail: format!("HTTP {status}: {body}"),
            });
        }

        debug!("Successfully uploaded {name}. Response: {body}");
        Ok(())
    }
}

fn list_upload_files(dir: &Path) -> Result<Vec<String>, PipelineError> {
    let mut files: Vec<String> = std::fs::read_dir(dir)
        .map_err(|e| PipelineError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|e| e.file_name().into_string().ok())
        .collect();
    files.sort();
    Ok(files)
}
