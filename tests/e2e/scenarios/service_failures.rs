use crate::harness::{Assertion, FileChangeMatch, Scenario, SubmitMatch};
use billed_core::FormState;

#[test]
fn test_upload_refused_with_404() {
    Scenario::new("upload_404")
        .employee_signs_in("a@a")
        .create_fails_with(404)
        .selects_receipt("test.jpg", b"jpg")
        .assert_file_change(FileChangeMatch::UploadFailed)
        .assert_no_upload()
        .assert_form_state(FormState::Idle)
        .assert(Assertion::HasError(true))
        .assert_calls(1, 0)
        .run()
        .unwrap();
}

#[test]
fn test_upload_refused_with_500_then_retried() {
    Scenario::new("upload_500_then_retry")
        .employee_signs_in("a@a")
        .create_fails_with(500)
        .selects_receipt("test.jpg", b"jpg")
        .assert_no_upload()
        .selects_receipt("test.jpg", b"jpg")
        .assert_file_change(FileChangeMatch::Uploaded)
        .assert(Assertion::BillId(Some("1234".to_string())))
        .assert(Assertion::HasError(false))
        .assert_calls(2, 0)
        .run()
        .unwrap();
}

#[test]
fn test_upload_offline() {
    Scenario::new("upload_offline")
        .employee_signs_in("a@a")
        .create_fails_offline()
        .selects_receipt("test.png", b"png")
        .assert_file_change(FileChangeMatch::UploadFailed)
        .assert_no_upload()
        .fills_bill("Vol", "2022-03-04", "348")
        .submits()
        .assert_submit(SubmitMatch::Invalid)
        .assert_calls(1, 0)
        .assert_navigations(0)
        .run()
        .unwrap();
}

#[test]
fn test_update_refused_does_not_navigate() {
    Scenario::new("update_500")
        .employee_signs_in("a@a")
        .selects_receipt("test.jpg", b"jpg")
        .fills_bill("Vol", "2022-03-04", "348")
        .update_fails_with(500)
        .submits()
        .assert_submit(SubmitMatch::UpdateFailed)
        .assert_navigations(0)
        .assert_bills_count(4)
        .assert_form_state(FormState::FileReady)
        .assert(Assertion::SubmitDisabled(false))
        .submits()
        .assert_submit(SubmitMatch::Submitted)
        .assert_navigations(1)
        .assert_bills_count(5)
        .assert_calls(1, 2)
        .run()
        .unwrap();
}

#[test]
fn test_second_submit_is_ignored() {
    Scenario::new("second_submit_ignored")
        .employee_signs_in("a@a")
        .selects_receipt("test.jpg", b"jpg")
        .fills_bill("Vol", "2022-03-04", "348")
        .submits()
        .submits()
        .assert_submit(SubmitMatch::Ignored)
        .assert_calls(1, 1)
        .assert_navigations(1)
        .assert_bills_count(5)
        .selects_receipt("late.jpg", b"jpg")
        .assert_file_change(FileChangeMatch::Ignored)
        .assert_calls(1, 1)
        .run()
        .unwrap();
}

#[test]
fn test_signed_out_user_cannot_upload() {
    Scenario::new("signed_out_upload")
        .employee_signs_in("a@a")
        .signs_out()
        .selects_receipt("test.jpg", b"jpg")
        .assert_file_change(FileChangeMatch::UploadFailed)
        .assert_form_state(FormState::Idle)
        .assert_calls(0, 0)
        .run()
        .unwrap();
}
