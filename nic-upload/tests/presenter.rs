use nic_upload::presenter::ConsolePresenter;
use nic_upload_core::accumulator::FileSource;
use nic_upload_core::contract::{FileRef, StatusPresenter};
use nic_upload_core::reconcile::{FailureReason, InvalidNicReport, SubmissionStatus};
use nic_upload_core::session::UploadSession;

fn rendered(session: &UploadSession, status: &SubmissionStatus) -> String {
    let mut presenter = ConsolePresenter::new(Vec::new());
    presenter.render(session.files(), status);
    String::from_utf8(presenter.into_inner()).unwrap()
}

fn session() -> UploadSession {
    let mut session = UploadSession::new();
    session.add_files(
        FileSource::Selection,
        vec![
            FileRef::new("nic1.png", b"1".to_vec()),
            FileRef::new("nic2.png", b"2".to_vec()),
        ],
    );
    session
}

#[test]
fn idle_lists_the_working_set() {
    let out = rendered(&session(), &SubmissionStatus::Idle);

    assert_eq!(out, "Files to upload:\n  nic1.png\n  nic2.png\n");
}

#[test]
fn in_flight_shows_progress() {
    assert_eq!(rendered(&session(), &SubmissionStatus::InFlight), "Uploading...\n");
}

#[test]
fn every_failure_renders_the_same_line() {
    let missing = rendered(
        &session(),
        &SubmissionStatus::Failed(FailureReason::MissingCredential),
    );
    let rejected = rendered(
        &session(),
        &SubmissionStatus::Failed(FailureReason::Rejected { status: 500 }),
    );

    assert_eq!(missing, "Failed to upload files. Please try again.\n");
    assert_eq!(missing, rejected);
}

#[test]
fn invalid_entries_are_counted_per_file() {
    let report = InvalidNicReport::from_body(
        r#"{"invalidNicDetails": {"nic2.png": [], "nic1.png": [{"line": 3}, {"line": 9}]}}"#,
    )
    .unwrap();

    let out = rendered(
        &session(),
        &SubmissionStatus::CompletedWithInvalidEntries(report),
    );

    assert_eq!(
        out,
        "Files uploaded successfully!\nInvalid NIC count:\n  nic1.png - 2 invalid NIC(s)\n  nic2.png - 0 invalid NIC(s)\n"
    );
}

#[test]
fn clean_success_has_no_count_section() {
    let out = rendered(&session(), &SubmissionStatus::Succeeded);

    assert_eq!(out, "Files uploaded successfully!\n");
}
