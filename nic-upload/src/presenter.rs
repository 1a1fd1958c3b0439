//! Console rendering of the upload session.

use std::io::Write;

use nic_upload_core::accumulator::WorkingFileSet;
use nic_upload_core::contract::StatusPresenter;
use nic_upload_core::reconcile::SubmissionStatus;

pub const SUCCESS_MESSAGE: &str = "Files uploaded successfully!";

/// Writes human-readable status lines to any writer (stdout in the binary).
pub struct ConsolePresenter<W: Write> {
    out: W,
}

impl<W: Write> ConsolePresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_status(&mut self, files: &WorkingFileSet, status: &SubmissionStatus) -> std::io::Result<()> {
        match status {
            SubmissionStatus::Idle => {
                writeln!(self.out, "Files to upload:")?;
                for file in files {
                    writeln!(self.out, "  {}", file.name())?;
                }
            }
            SubmissionStatus::InFlight => writeln!(self.out, "Uploading...")?,
            SubmissionStatus::Succeeded => writeln!(self.out, "{SUCCESS_MESSAGE}")?,
            SubmissionStatus::Failed(reason) => writeln!(self.out, "{}", reason.user_message())?,
            SubmissionStatus::CompletedWithInvalidEntries(report) => {
                writeln!(self.out, "{SUCCESS_MESSAGE}")?;
                writeln!(self.out, "Invalid NIC count:")?;
                for (file_name, count) in report.counts() {
                    writeln!(self.out, "  {file_name} - {count} invalid NIC(s)")?;
                }
            }
        }
        self.out.flush()
    }
}

impl<W: Write> StatusPresenter for ConsolePresenter<W> {
    fn render(&mut self, files: &WorkingFileSet, status: &SubmissionStatus) {
        if let Err(e) = self.write_status(files, status) {
            tracing::warn!(error = %e, "Failed to write status to console");
        }
    }
}
