//! HTTP client for the hosted image CDN (ImageKit-compatible API).
//!
//! Uploads are a two-step dance: fetch a short-lived signed credential from
//! the companion authorization endpoint, then multipart-POST the blob with
//! the credential attached. Credentials are single-use and time-boxed — the
//! remote rejects reuse — so a fresh triple is fetched immediately before
//! every upload and never cached.
//!
//! All calls carry the configured timeout; an elapsed timeout surfaces as
//! [`CdnError::Timeout`] so callers can tell a slow network from a rejected
//! request.

use super::{CdnError, CdnStore, UploadedFile};
use reqwest::StatusCode;
use reqwest::blocking::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;

/// Signed single-use upload credential from the authorization endpoint.
#[derive(Debug, Clone, Deserialize)]
struct AuthParams {
    token: String,
    expire: u64,
    signature: String,
}

/// Successful upload response body.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
    #[serde(rename = "fileId")]
    file_id: String,
}

/// Delete request body.
#[derive(Debug, serde::Serialize)]
struct DeleteRequest<'a> {
    #[serde(rename = "fileId")]
    file_id: &'a str,
}

pub struct ImageKitClient {
    http: reqwest::blocking::Client,
    auth_endpoint: String,
    upload_endpoint: String,
    delete_endpoint: String,
    public_key: String,
    timeout: Duration,
}

impl ImageKitClient {
    pub fn new(
        auth_endpoint: impl Into<String>,
        upload_endpoint: impl Into<String>,
        delete_endpoint: impl Into<String>,
        public_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CdnError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CdnError::Upload(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            auth_endpoint: auth_endpoint.into(),
            upload_endpoint: upload_endpoint.into(),
            delete_endpoint: delete_endpoint.into(),
            public_key: public_key.into(),
            timeout,
        })
    }

    /// Fetch a fresh signed credential. Called immediately before each
    /// upload; the result must not be reused.
    fn fetch_auth(&self) -> Result<AuthParams, CdnError> {
        let response = self
            .http
            .get(&self.auth_endpoint)
            .send()
            .map_err(|e| self.transport_error(e, "authorization"))?;

        if !response.status().is_success() {
            return Err(CdnError::Auth(format!(
                "authorization endpoint returned {}",
                response.status()
            )));
        }
        response
            .json::<AuthParams>()
            .map_err(|e| CdnError::Auth(format!("bad authorization response: {e}")))
    }

    /// Map a transport-level error, keeping timeouts distinct.
    fn transport_error(&self, e: reqwest::Error, what: &str) -> CdnError {
        if e.is_timeout() {
            CdnError::Timeout(self.timeout)
        } else {
            CdnError::Upload(format!("{what} request failed: {e}"))
        }
    }
}

impl CdnStore for ImageKitClient {
    fn upload(
        &self,
        blob: &[u8],
        folder: &str,
        file_name: &str,
    ) -> Result<UploadedFile, CdnError> {
        let auth = self.fetch_auth()?;

        let form = Form::new()
            .part("file", Part::bytes(blob.to_vec()).file_name(file_name.to_string()))
            .text("fileName", file_name.to_string())
            .text("publicKey", self.public_key.clone())
            .text("signature", auth.signature)
            .text("token", auth.token)
            .text("expire", auth.expire.to_string())
            .text("useUniqueFileName", "true")
            .text("folder", folder.to_string());

        let response = self
            .http
            .post(&self.upload_endpoint)
            .multipart(form)
            .send()
            .map_err(|e| self.transport_error(e, "upload"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(CdnError::Upload(format!(
                "upload endpoint returned {status}: {body}"
            )));
        }

        let parsed: UploadResponse = response
            .json()
            .map_err(|e| CdnError::Upload(format!("bad upload response: {e}")))?;
        Ok(UploadedFile {
            url: parsed.url,
            file_id: parsed.file_id,
        })
    }

    fn delete(&self, file_id: &str) -> Result<(), CdnError> {
        let response = self
            .http
            .delete(&self.delete_endpoint)
            .json(&DeleteRequest { file_id })
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    CdnError::Timeout(self.timeout)
                } else {
                    CdnError::Delete(format!("delete request failed: {e}"))
                }
            })?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(CdnError::NotFound),
            status => {
                let body = response.text().unwrap_or_default();
                Err(CdnError::Delete(format!(
                    "delete endpoint returned {status}: {body}"
                )))
            }
        }
    }
}
