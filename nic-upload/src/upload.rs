#![doc = "HTTP transport for NIC validation batches: bridges the core `BatchTransport` trait to a reqwest multipart POST."]
//
//! # Upload transport (CLI <-> Core)
//!
//! The core decides *what* goes into a batch (field names, order, bearer token);
//! this module decides *how* it goes on the wire.
//!
//! - Every [`FilePart`](nic_upload_core::contract::FilePart) becomes one multipart
//!   section carrying the file name and raw bytes.
//! - The bearer token is sent as `Authorization: Bearer <token>`.
//! - Any HTTP response, whatever its status, is returned as `Ok`; only a request that
//!   produced no response at all is an `Err`.

use std::time::Duration;

use async_trait::async_trait;
use nic_upload_core::contract::{BatchTransport, MultipartBatch, RawResponse, TransportError};
use reqwest::multipart::{Form, Part};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/api/upload";

pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// `timeout` bounds the whole request at the HTTP client level.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let endpoint = endpoint.into();
        tracing::info!(endpoint = %endpoint, timeout = ?timeout, "Initialized HTTP upload transport");
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_form(batch: &MultipartBatch) -> Form {
        batch.parts.iter().fold(Form::new(), |form, part| {
            let section = Part::bytes(part.file.content().to_vec())
                .file_name(part.file.name().to_string());
            form.part(part.field_name.clone(), section)
        })
    }
}

#[async_trait]
impl BatchTransport for HttpTransport {
    async fn send(&self, batch: &MultipartBatch) -> Result<RawResponse, TransportError> {
        tracing::info!(
            endpoint = %self.endpoint,
            parts = batch.parts.len(),
            "Posting multipart batch"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(batch.bearer.expose())
            .multipart(Self::build_form(batch))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, endpoint = %self.endpoint, "No response from upload endpoint");
                TransportError::Failed(e.to_string())
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            tracing::error!(error = ?e, status, "Failed to read upload response body");
            TransportError::Failed(format!("failed to read response body: {e}"))
        })?;

        tracing::info!(status, body_len = body.len(), "Upload endpoint answered");
        Ok(RawResponse { status, body })
    }
}
