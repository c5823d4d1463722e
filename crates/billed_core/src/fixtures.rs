//! Sample bills used to seed the in-memory service.

use crate::types::{Bill, BillStatus, ExpenseType};

/// Email owning every fixture bill.
pub const FIXTURE_EMAIL: &str = "a@a";

/// The four bills the application ships as sample data.
pub fn fixture_bills() -> Vec<Bill> {
    vec![
        Bill {
            id: Some("47qAXb6fIm2zOKkLzMro".to_string()),
            expense_type: ExpenseType::HotelEtLogement,
            name: "encore".to_string(),
            date: "2004-04-04".to_string(),
            amount: 400,
            vat: "80".to_string(),
            pct: 20,
            commentary: "séminaire billed".to_string(),
            file_url: Some(
                "https://localhost:3456/images/preview-facture-free-201801-pdf-1.jpg".to_string(),
            ),
            file_name: Some("preview-facture-free-201801-pdf-1.jpg".to_string()),
            status: BillStatus::Pending,
            comment_admin: Some("ok".to_string()),
            email: FIXTURE_EMAIL.to_string(),
        },
        Bill {
            id: Some("BeKy5Mo4jkmdfPGYpTxZ".to_string()),
            expense_type: ExpenseType::Transports,
            name: "test1".to_string(),
            date: "2001-01-01".to_string(),
            amount: 100,
            vat: String::new(),
            pct: 20,
            commentary: "plop".to_string(),
            file_url: Some("https://localhost:3456/images/1592770761.jpeg".to_string()),
            file_name: Some("1592770761.jpeg".to_string()),
            status: BillStatus::Refused,
            comment_admin: Some("en fait non".to_string()),
            email: FIXTURE_EMAIL.to_string(),
        },
        Bill {
            id: Some("UIUZtnPQvnbFnB0ozvJh".to_string()),
            expense_type: ExpenseType::ServicesEnLigne,
            name: "test3".to_string(),
            date: "2003-03-03".to_string(),
            amount: 300,
            vat: "60".to_string(),
            pct: 20,
            commentary: String::new(),
            file_url: Some("https://localhost:3456/images/facture-client-php.png".to_string()),
            file_name: Some("facture-client-php.png".to_string()),
            status: BillStatus::Accepted,
            comment_admin: Some("bon bah d'accord".to_string()),
            email: FIXTURE_EMAIL.to_string(),
        },
        Bill {
            id: Some("qcCK3SzECmaZAGRrHjaC".to_string()),
            expense_type: ExpenseType::RestaurantsEtBars,
            name: "test2".to_string(),
            date: "2002-02-02".to_string(),
            amount: 200,
            vat: "40".to_string(),
            pct: 20,
            commentary: "test2".to_string(),
            file_url: Some(
                "https://localhost:3456/images/preview-facture-free-201801-pdf-1.jpg".to_string(),
            ),
            file_name: Some("preview-facture-free-201801-pdf-1.jpg".to_string()),
            status: BillStatus::Refused,
            comment_admin: Some("pas la bonne facture".to_string()),
            email: FIXTURE_EMAIL.to_string(),
        },
    ]
}
