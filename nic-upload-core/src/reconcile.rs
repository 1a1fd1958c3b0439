//! Reconciliation of a submission outcome into a status and a working-set action.
//!
//! | Outcome                                 | Status                          | Working set |
//! |-----------------------------------------|---------------------------------|-------------|
//! | `NoCredential`                          | `Failed(MissingCredential)`     | retain      |
//! | `TransportError(d)`                     | `Failed(Transport(d))`          | retain      |
//! | 2xx, no file listed                     | `Succeeded`                     | clear       |
//! | 2xx, files listed, all with 0 entries   | `CompletedWithInvalidEntries`   | clear       |
//! | 2xx, at least one entry for some file   | `CompletedWithInvalidEntries`   | retain      |
//! | 2xx, body is not the expected JSON      | `Failed(MalformedResponse)`     | retain      |
//! | non-2xx                                 | `Failed(Rejected { status })`   | retain      |
//!
//! Any listed file, even one with zero entries, is reported. A batch with invalid
//! entries is kept so the user can correct and resend it.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::submitter::SubmissionOutcome;

/// One validation error for one entry of a file. The server decides its shape.
pub type ErrorEntry = serde_json::Value;

/// Shown for every failure kind; the distinction stays in [`FailureReason`].
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to upload files. Please try again.";

/// Per-file validation errors, keyed and ordered by file name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvalidNicReport {
    files: BTreeMap<String, Vec<ErrorEntry>>,
}

#[derive(Deserialize)]
struct UploadResponseBody {
    #[serde(rename = "invalidNicDetails", default)]
    invalid_nic_details: Option<BTreeMap<String, Vec<ErrorEntry>>>,
}

impl InvalidNicReport {
    /// Parses a success body. A blank body, a missing `invalidNicDetails` field and a
    /// `null` field all yield an empty report.
    pub fn from_body(body: &str) -> Result<Self, serde_json::Error> {
        if body.trim().is_empty() {
            return Ok(Self::default());
        }
        let parsed: UploadResponseBody = serde_json::from_str(body)?;
        Ok(Self {
            files: parsed.invalid_nic_details.unwrap_or_default(),
        })
    }

    pub fn from_entries(files: BTreeMap<String, Vec<ErrorEntry>>) -> Self {
        Self { files }
    }

    /// Number of files the server reported on, including files with zero entries.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// `(file name, invalid entry count)` in file name order.
    pub fn counts(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.files
            .iter()
            .map(|(name, entries)| (name.as_str(), entries.len()))
    }

    pub fn count_for(&self, file_name: &str) -> Option<usize> {
        self.files.get(file_name).map(Vec::len)
    }

    pub fn entries_for(&self, file_name: &str) -> Option<&[ErrorEntry]> {
        self.files.get(file_name).map(Vec::as_slice)
    }

    pub fn total_invalid(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }

    pub fn has_invalid_entries(&self) -> bool {
        self.files.values().any(|entries| !entries.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureReason {
    #[error("no access token found")]
    MissingCredential,
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("upload rejected with HTTP status {status}")]
    Rejected { status: u16 },
    #[error("malformed upload response: {0}")]
    MalformedResponse(String),
}

impl FailureReason {
    /// The message a user sees. Deliberately the same for every reason.
    pub fn user_message(&self) -> &'static str {
        GENERIC_FAILURE_MESSAGE
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    InFlight,
    Succeeded,
    Failed(FailureReason),
    CompletedWithInvalidEntries(InvalidNicReport),
}

impl SubmissionStatus {
    /// Short name for log fields.
    pub fn label(&self) -> &'static str {
        match self {
            SubmissionStatus::Idle => "idle",
            SubmissionStatus::InFlight => "in_flight",
            SubmissionStatus::Succeeded => "succeeded",
            SubmissionStatus::Failed(_) => "failed",
            SubmissionStatus::CompletedWithInvalidEntries(_) => "completed_with_invalid_entries",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionStatus::Succeeded
                | SubmissionStatus::Failed(_)
                | SubmissionStatus::CompletedWithInvalidEntries(_)
        )
    }

    /// Whether a submit trigger should be live. False only while a submission is in flight.
    pub fn submit_enabled(&self) -> bool {
        !matches!(self, SubmissionStatus::InFlight)
    }

    /// The transfer itself went through, with or without invalid entries.
    pub fn transfer_succeeded(&self) -> bool {
        matches!(
            self,
            SubmissionStatus::Succeeded | SubmissionStatus::CompletedWithInvalidEntries(_)
        )
    }

    pub fn report(&self) -> Option<&InvalidNicReport> {
        match self {
            SubmissionStatus::CompletedWithInvalidEntries(report) => Some(report),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            SubmissionStatus::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkingSetAction {
    Clear,
    Retain,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub status: SubmissionStatus,
    pub action: WorkingSetAction,
}

impl Reconciliation {
    fn failed(reason: FailureReason) -> Self {
        Self {
            status: SubmissionStatus::Failed(reason),
            action: WorkingSetAction::Retain,
        }
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Maps a submission outcome to the status to show and what to do with the working set.
pub fn reconcile(outcome: SubmissionOutcome) -> Reconciliation {
    let reconciliation = match outcome {
        SubmissionOutcome::NoCredential => Reconciliation::failed(FailureReason::MissingCredential),
        SubmissionOutcome::TransportError(detail) => {
            Reconciliation::failed(FailureReason::Transport(detail))
        }
        SubmissionOutcome::Response { status, body } if is_success(status) => {
            match InvalidNicReport::from_body(&body) {
                Ok(report) if report.is_empty() => Reconciliation {
                    status: SubmissionStatus::Succeeded,
                    action: WorkingSetAction::Clear,
                },
                Ok(report) => {
                    info!(
                        files_reported = report.len(),
                        total_invalid = report.total_invalid(),
                        "Upload accepted with a per-file NIC report"
                    );
                    let action = if report.has_invalid_entries() {
                        WorkingSetAction::Retain
                    } else {
                        WorkingSetAction::Clear
                    };
                    Reconciliation {
                        status: SubmissionStatus::CompletedWithInvalidEntries(report),
                        action,
                    }
                }
                Err(e) => {
                    warn!(status, error = %e, "Upload succeeded but response body did not parse");
                    Reconciliation::failed(FailureReason::MalformedResponse(e.to_string()))
                }
            }
        }
        SubmissionOutcome::Response { status, body } => {
            debug!(status, body = %body, "Upload rejected by server");
            Reconciliation::failed(FailureReason::Rejected { status })
        }
    };

    info!(
        status = reconciliation.status.label(),
        action = ?reconciliation.action,
        "Reconciled submission outcome"
    );
    reconciliation
}
