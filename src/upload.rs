//! Remote upload client
//!
//! One multipart POST per file obtains an opaque processing handle
//! (`public_id`), which then addresses the uploaded asset in the derived
//! transform URL. The endpoint contract is vendor-defined: success is JSON
//! carrying `public_id`; failure is JSON carrying `error.message` or a bare
//! non-2xx status.

use crate::config::Config;
use crate::error::UploadError;
use crate::types::SourceFile;
use serde::Deserialize;
use tracing::debug;

/// Transform applied to every fetched asset
const UPSCALE_EFFECT: &str = "e_upscale";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FailureBody {
    error: Option<VendorError>,
}

#[derive(Debug, Deserialize)]
struct VendorError {
    message: String,
}

/// Client for the remote upload and transform endpoints
///
/// Holds the shared HTTP client plus the per-run account settings; cheap to
/// share across item tasks.
#[derive(Clone, Debug)]
pub struct UploadClient {
    client: reqwest::Client,
    upload_url: String,
    delivery_base: String,
    cloud_name: String,
    upload_preset: String,
    upload_tag: String,
}

impl UploadClient {
    /// Build a client from the run configuration
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        let upload_url = format!(
            "{}/{}/image/upload",
            config.endpoints.api_base.trim_end_matches('/'),
            config.cloud_name
        );
        Self {
            client,
            upload_url,
            delivery_base: config.endpoints.delivery_base.trim_end_matches('/').to_string(),
            cloud_name: config.cloud_name.clone(),
            upload_preset: config.upload_preset.clone(),
            upload_tag: config.upload_tag.clone(),
        }
    }

    /// Upload one file and return its processing handle
    ///
    /// Sends multipart `{file, upload_preset, tags}`. On a non-success
    /// response the vendor's `error.message` is preferred; the HTTP status
    /// code is the fallback.
    pub async fn upload(&self, file: &SourceFile) -> Result<String, UploadError> {
        let name = file.name().to_string();
        debug!(file = %name, size = file.len(), "uploading");

        let part = reqwest::multipart::Part::bytes(file.bytes().to_vec())
            .file_name(name.clone())
            .mime_str(file.mime())
            .map_err(|e| UploadError::Send {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone())
            .text("tags", self.upload_tag.clone());

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Send {
                name: name.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let vendor_message = response
                .json::<FailureBody>()
                .await
                .ok()
                .and_then(|body| body.error)
                .map(|e| e.message);
            return Err(match vendor_message {
                Some(message) => UploadError::Rejected { name, message },
                None => UploadError::Status {
                    name,
                    status: status.as_u16(),
                },
            });
        }

        let body: UploadResponse =
            response.json().await.map_err(|e| UploadError::Send {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        body.public_id
            .ok_or(UploadError::MissingHandle { name })
    }

    /// Derive the upscale transform URL for a processing handle
    pub fn transform_url(&self, public_id: &str) -> String {
        format!(
            "{}/{}/image/upload/{UPSCALE_EFFECT}/{public_id}",
            self.delivery_base, self.cloud_name
        )
    }

    /// Shared HTTP client, for the retry-wrapped transform fetch
    pub fn http(&self) -> &reqwest::Client {
        &self.client
    }
}
