use crate::harness::{Assertion, Field, FileChangeMatch, Scenario, SubmitMatch};
use billed_core::FormState;

#[test]
fn test_new_bill_adds_a_row() {
    Scenario::new("new_bill_adds_a_row")
        .employee_signs_in("a@a")
        .assert_bills_count(4)
        .selects_receipt("test.jpg", b"\xff\xd8\xff\xe0")
        .assert_file_change(FileChangeMatch::Uploaded)
        .assert_uploaded(
            "1234",
            "https://localhost:3456/images/test.jpg",
            "test.jpg",
        )
        .assert_form_state(FormState::FileReady)
        .fills(Field::ExpenseType, "Transports")
        .fills_bill("Vol Paris Londres", "2022-03-04", "348")
        .fills(Field::Vat, "70")
        .submits()
        .assert_submit(SubmitMatch::Submitted)
        .assert_navigations(1)
        .assert_on_bills_page()
        .assert_bills_count(5)
        .assert(Assertion::BillsListContains {
            name: "Vol Paris Londres".to_string(),
        })
        .assert_calls(1, 1)
        .assert_form_state(FormState::Submitted)
        .assert(Assertion::SubmitDisabled(true))
        .run()
        .expect("scenario should pass");
}

#[test]
fn test_empty_pct_defaults_to_20() {
    Scenario::new("empty_pct_defaults_to_20")
        .employee_signs_in("a@a")
        .selects_receipt("test.png", b"png")
        .fills_bill("Hôtel", "2022-05-01", "120")
        .submits()
        .assert(Assertion::SubmittedPct(20))
        .run()
        .unwrap();
}

#[test]
fn test_explicit_pct_is_kept() {
    Scenario::new("explicit_pct_is_kept")
        .employee_signs_in("a@a")
        .selects_receipt("test.jpeg", b"jpeg")
        .fills_bill("Hôtel", "2022-05-01", "120")
        .fills(Field::Pct, "80")
        .submits()
        .assert(Assertion::SubmittedPct(80))
        .run()
        .unwrap();
}

#[test]
fn test_replacing_the_receipt_uploads_again() {
    Scenario::new("replacing_the_receipt")
        .employee_signs_in("a@a")
        .selects_receipt("first.jpg", b"one")
        .assert(Assertion::BillId(Some("1234".to_string())))
        .selects_receipt("second.PNG", b"two")
        .assert_uploaded(
            "1235",
            "https://localhost:3456/images/second.PNG",
            "second.PNG",
        )
        .assert(Assertion::InputHolds("second.PNG".to_string()))
        .fills_bill("Taxi", "2022-06-01", "35")
        .submits()
        .assert_submit(SubmitMatch::Submitted)
        .assert(Assertion::PendingDrafts(1))
        .assert_calls(2, 1)
        .run()
        .unwrap();
}

#[test]
fn test_bills_visible_per_role() {
    Scenario::new("bills_visible_per_role")
        .employee_signs_in("b@b")
        .assert_bills_count(0)
        .selects_receipt("test.jpg", b"jpg")
        .fills_bill("Train", "2022-07-01", "80")
        .submits()
        .assert_bills_count(1)
        .admin_signs_in("admin@billed.com")
        .assert_bills_count(5)
        .run()
        .unwrap();
}

#[test]
fn test_reload_starts_a_fresh_form() {
    Scenario::new("reload_starts_a_fresh_form")
        .employee_signs_in("a@a")
        .selects_receipt("test.jpg", b"jpg")
        .fills_bill("Train", "2022-07-01", "80")
        .submits()
        .reloads_page()
        .assert_form_state(FormState::Idle)
        .assert_no_upload()
        .assert(Assertion::SubmitDisabled(false))
        .selects_receipt("again.jpg", b"jpg")
        .assert(Assertion::BillId(Some("1235".to_string())))
        .run()
        .unwrap();
}
