//! # contract: seams between the upload core and the outside world
//!
//! This module defines the plain data types that cross the core boundary and the
//! traits the core calls out through:
//! - [`CredentialAccessor`]: read-only access to the stored bearer token.
//! - [`BatchTransport`]: performs the single multipart POST of a batch.
//! - [`StatusPresenter`]: renders the current working set and submission status.
//!
//! ## Mocking & Testing
//! - Every trait is annotated for `mockall`; mocks are exported with the
//!   `test-export-mocks` feature so integration tests can script outcomes.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::accumulator::WorkingFileSet;
use crate::reconcile::SubmissionStatus;

/// A file held in the working set: its display name and its raw bytes.
///
/// The content handle is shared, so cloning a `FileRef` never copies the file body.
#[derive(Clone, PartialEq, Eq)]
pub struct FileRef {
    name: String,
    content: Arc<[u8]>,
}

impl FileRef {
    pub fn new(name: impl Into<String>, content: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

impl fmt::Debug for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileRef")
            .field("name", &self.name)
            .field("bytes", &self.content.len())
            .finish()
    }
}

/// Opaque bearer token. `Debug` never prints the token itself.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for placing in an `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// One multipart section: a file attached under a form field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field_name: String,
    pub file: FileRef,
}

/// A fully assembled upload request, ready for a transport to put on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartBatch {
    /// Sent as `Authorization: Bearer <token>`.
    pub bearer: Credential,
    /// Parts in working-set order.
    pub parts: Vec<FilePart>,
}

/// Whatever the server answered, regardless of status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// The request never produced a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out after {0:?}")]
    TimedOut(std::time::Duration),
    #[error("{0}")]
    Failed(String),
}

/// Reads the stored bearer credential. Absence is a normal answer, not an error.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait CredentialAccessor: Send + Sync {
    fn get_credential(&self) -> Option<Credential>;
}

/// Sends one multipart batch to the upload endpoint.
///
/// Implementors return `Ok` for every HTTP response, including 4xx and 5xx;
/// `Err` is reserved for the case where no response arrived at all.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait BatchTransport: Send + Sync {
    async fn send(&self, batch: &MultipartBatch) -> Result<RawResponse, TransportError>;
}

/// Renders the session for a user. Implementations decide the medium.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait StatusPresenter {
    fn render(&mut self, files: &WorkingFileSet, status: &SubmissionStatus);
}
