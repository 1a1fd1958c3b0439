//! Upload session: the single owner of the working set and the submission status.
//!
//! Every mutation of the working set goes through here so that feedback from a
//! previous submission is dropped the moment the set changes. Submissions are split
//! into [`UploadSession::begin_submission`] and [`UploadSession::complete_submission`]
//! so the in-flight guard can be observed between the two; [`UploadSession::submit`]
//! runs both around a [`BatchSubmitter`].

use thiserror::Error;
use tracing::{info, warn};

use crate::accumulator::{FileSource, WorkingFileSet};
use crate::contract::{BatchTransport, CredentialAccessor, FileRef};
use crate::reconcile::{reconcile, InvalidNicReport, SubmissionStatus, WorkingSetAction};
use crate::submitter::{BatchSubmitter, SubmissionOutcome};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("a submission is already in flight")]
    SubmissionInFlight,
}

/// Proof that a submission was started, stamped with the working-set generation it
/// was started against. Consumed by [`UploadSession::complete_submission`].
#[derive(Debug)]
pub struct SubmissionTicket {
    generation: u64,
    files: WorkingFileSet,
}

impl SubmissionTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Snapshot of the files this submission carries.
    pub fn files(&self) -> &WorkingFileSet {
        &self.files
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionEffect {
    Applied,
    /// The outcome was dropped: the working set changed while the request was in
    /// flight, or no submission was in flight to complete.
    Discarded,
}

#[derive(Debug, Default)]
pub struct UploadSession {
    files: WorkingFileSet,
    status: SubmissionStatus,
    generation: u64,
}

impl UploadSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &WorkingFileSet {
        &self.files
    }

    pub fn status(&self) -> &SubmissionStatus {
        &self.status
    }

    pub fn report(&self) -> Option<&InvalidNicReport> {
        self.status.report()
    }

    /// Bumped by every change to the working set.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Appends `new_files` after the current set, keeping both orders.
    ///
    /// Always resets the status to `Idle`, even when `new_files` is empty.
    pub fn add_files<I>(&mut self, source: FileSource, new_files: I) -> &WorkingFileSet
    where
        I: IntoIterator<Item = FileRef>,
    {
        let added = self.files.append(new_files);
        self.mark_changed();
        info!(
            %source,
            added,
            file_count = self.files.len(),
            generation = self.generation,
            "Files added to working set"
        );
        &self.files
    }

    /// Empties the working set and resets the status to `Idle`.
    pub fn clear(&mut self) -> &WorkingFileSet {
        self.files.clear();
        self.mark_changed();
        info!(generation = self.generation, "Working set cleared");
        &self.files
    }

    /// Moves to `InFlight` and hands back a ticket for the current working set.
    ///
    /// Refused while another submission is in flight.
    pub fn begin_submission(&mut self) -> Result<SubmissionTicket, SessionError> {
        if matches!(self.status, SubmissionStatus::InFlight) {
            warn!(
                generation = self.generation,
                "Submission requested while one is already in flight"
            );
            return Err(SessionError::SubmissionInFlight);
        }

        let duplicates = self.files.duplicate_names();
        if !duplicates.is_empty() {
            warn!(
                ?duplicates,
                "Working set has duplicate file names; their report entries will share a key"
            );
        }

        self.status = SubmissionStatus::InFlight;
        info!(
            file_count = self.files.len(),
            generation = self.generation,
            "Submission started"
        );
        Ok(SubmissionTicket {
            generation: self.generation,
            files: self.files.clone(),
        })
    }

    /// Applies the reconciled outcome of the submission behind `ticket`.
    ///
    /// If the working set changed after the ticket was issued, or the session is not
    /// in flight, the outcome is discarded and the session is left untouched.
    pub fn complete_submission(
        &mut self,
        ticket: SubmissionTicket,
        outcome: SubmissionOutcome,
    ) -> CompletionEffect {
        if ticket.generation != self.generation {
            warn!(
                ticket_generation = ticket.generation,
                generation = self.generation,
                "Working set changed during upload, discarding its outcome"
            );
            return CompletionEffect::Discarded;
        }
        if !matches!(self.status, SubmissionStatus::InFlight) {
            warn!(
                status = self.status.label(),
                generation = self.generation,
                "No submission in flight, discarding outcome"
            );
            return CompletionEffect::Discarded;
        }

        let reconciliation = reconcile(outcome);
        if reconciliation.action == WorkingSetAction::Clear {
            self.files.clear();
            self.generation += 1;
        }
        self.status = reconciliation.status;
        info!(
            status = self.status.label(),
            file_count = self.files.len(),
            "Submission completed"
        );
        CompletionEffect::Applied
    }

    /// Submits the working set through `submitter` and applies the result.
    pub async fn submit<C, T>(
        &mut self,
        submitter: &BatchSubmitter<C, T>,
    ) -> Result<&SubmissionStatus, SessionError>
    where
        C: CredentialAccessor,
        T: BatchTransport,
    {
        let ticket = self.begin_submission()?;
        let outcome = submitter.submit(ticket.files()).await;
        self.complete_submission(ticket, outcome);
        Ok(&self.status)
    }

    fn mark_changed(&mut self) {
        self.generation += 1;
        self.status = SubmissionStatus::Idle;
    }
}
