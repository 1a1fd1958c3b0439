//! Batch submission: credential lookup, multipart assembly and the single POST.
//!
//! The submitter never interprets the server's answer; it only classifies what
//! happened on the wire into a [`SubmissionOutcome`] for the reconciler.

use std::time::Duration;

use tracing::{error, info, warn};

use crate::accumulator::WorkingFileSet;
use crate::contract::{
    BatchTransport, CredentialAccessor, FilePart, MultipartBatch, TransportError,
};

/// Form field every file is attached under.
pub const DEFAULT_FIELD_NAME: &str = "files";

/// Upper bound on a single upload before it is reported as a transport failure.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitterConfig {
    pub field_name: String,
    pub timeout: Duration,
}

impl Default for SubmitterConfig {
    fn default() -> Self {
        Self {
            field_name: DEFAULT_FIELD_NAME.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// What a submission attempt produced, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// No credential was stored; nothing was sent.
    NoCredential,
    /// The request was attempted but no response arrived.
    TransportError(String),
    /// The server answered. Any status code lands here.
    Response { status: u16, body: String },
}

pub struct BatchSubmitter<C, T> {
    credentials: C,
    transport: T,
    config: SubmitterConfig,
}

impl<C, T> BatchSubmitter<C, T>
where
    C: CredentialAccessor,
    T: BatchTransport,
{
    pub fn new(credentials: C, transport: T, config: SubmitterConfig) -> Self {
        Self {
            credentials,
            transport,
            config,
        }
    }

    pub fn config(&self) -> &SubmitterConfig {
        &self.config
    }

    /// Sends every file in `files` as one multipart POST.
    ///
    /// An empty set is sent as-is; deciding whether that makes sense is left to the server.
    pub async fn submit(&self, files: &WorkingFileSet) -> SubmissionOutcome {
        let Some(bearer) = self.credentials.get_credential() else {
            warn!(
                file_count = files.len(),
                "No access token stored, upload not attempted"
            );
            return SubmissionOutcome::NoCredential;
        };

        let batch = MultipartBatch {
            bearer,
            parts: files
                .iter()
                .map(|file| FilePart {
                    field_name: self.config.field_name.clone(),
                    file: file.clone(),
                })
                .collect(),
        };

        info!(
            file_count = batch.parts.len(),
            field_name = %self.config.field_name,
            timeout = ?self.config.timeout,
            "Submitting NIC validation batch"
        );

        let sent = tokio::time::timeout(self.config.timeout, self.transport.send(&batch)).await;
        match sent {
            Ok(Ok(response)) => {
                info!(
                    status = response.status,
                    body_len = response.body.len(),
                    "Upload endpoint responded"
                );
                SubmissionOutcome::Response {
                    status: response.status,
                    body: response.body,
                }
            }
            Ok(Err(e)) => {
                error!(error = %e, "Upload transport failed");
                SubmissionOutcome::TransportError(e.to_string())
            }
            Err(_) => {
                let e = TransportError::TimedOut(self.config.timeout);
                error!(error = %e, "Upload did not complete in time");
                SubmissionOutcome::TransportError(e.to_string())
            }
        }
    }
}
