use std::sync::Arc;

use chrono::NaiveDate;
use inventory::{
    ConfigStore, DashboardView, Direction, Environment, FormController, LedgerClient,
    ReceiptFile, SubmissionState, SubmitForm, TransactionRecord,
    memory::{MemoryLedger, MemoryReceiptStore},
};
use tempfile::TempDir;

mod common;

struct Harness {
    _dir: TempDir,
    ledger: Arc<MemoryLedger>,
    receipts: Arc<MemoryReceiptStore>,
    controller: FormController,
}

fn harness() -> Harness {
    harness_with(MemoryLedger::new(), Environment::Production)
}

fn harness_with(ledger: MemoryLedger, environment: Environment) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    common::write_config(dir.path());
    let store = Arc::new(ConfigStore::from_dir(dir.path()));
    let ledger = Arc::new(ledger);
    let receipts = Arc::new(MemoryReceiptStore::new());
    let controller = FormController::new(store, ledger.clone(), receipts.clone())
        .with_environment(environment);
    Harness {
        _dir: dir,
        ledger,
        receipts,
        controller,
    }
}

fn form(animal: &str, category: &str, quantity: i64) -> SubmitForm {
    SubmitForm {
        animal_type: animal.to_string(),
        category: category.to_string(),
        quantity,
        day: "H".to_string(),
        ..Default::default()
    }
}

fn rec(category: &str, quantity: u32) -> TransactionRecord {
    TransactionRecord {
        date: NaiveDate::from_ymd_opt(2025, 6, 6).unwrap(),
        animal_type: "Goat".to_string(),
        category: category.to_string(),
        quantity,
        notes: None,
        receipt_url: None,
        vendor: None,
        receipt_number: None,
    }
}

#[tokio::test]
async fn every_configured_pair_appends_exactly_one_row() {
    let h = harness();
    let pairs = [("Goat", "Small"), ("Goat", "Large"), ("Cow", "A")];

    for (idx, (animal, category)) in pairs.iter().enumerate() {
        let state = h
            .controller
            .submit(Direction::Inbound, form(animal, category, 1))
            .await;
        assert!(state.is_success(), "{animal}/{category}: {state:?}");
        assert_eq!(h.ledger.records(Direction::Inbound).len(), idx + 1);
    }
    assert!(h.ledger.records(Direction::Outbound).is_empty());
}

#[tokio::test]
async fn record_uses_day_option_date() {
    let h = harness();
    let mut submit = form("Goat", "Small", 4);
    submit.day = "H-1".to_string();
    submit.notes = Some("  from the north pen ".to_string());
    submit.vendor = Some("Bu Sari".to_string());

    let state = h.controller.submit(Direction::Outbound, submit).await;
    assert!(state.is_success());

    let rows = h.ledger.records(Direction::Outbound);
    assert_eq!(rows.len(), 1);
    // Outbound Hari H is 2025-06-07.
    assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2025, 6, 6).unwrap());
    assert_eq!(rows[0].quantity, 4);
    assert_eq!(rows[0].notes.as_deref(), Some("from the north pen"));
    assert_eq!(rows[0].vendor.as_deref(), Some("Bu Sari"));
}

#[tokio::test]
async fn non_positive_quantity_makes_no_remote_call() {
    let h = harness();

    for quantity in [0, -3] {
        let mut submit = form("Goat", "Small", quantity);
        submit.receipt = Some(ReceiptFile {
            file_name: "nota.png".to_string(),
            bytes: vec![1, 2, 3],
        });
        let state = h.controller.submit(Direction::Inbound, submit).await;
        assert_eq!(
            state,
            SubmissionState::Idle {
                notice: Some("Quantity must be at least 1".to_string())
            }
        );
    }

    assert_eq!(h.ledger.append_calls(), 0);
    assert!(h.receipts.file_names().is_empty());
}

#[tokio::test]
async fn unknown_options_are_rejected() {
    let h = harness();

    let cases = [
        (form("Camel", "Small", 1), "animal_type: Camel"),
        (form("Cow", "Small", 1), "category: Small"),
        (
            SubmitForm {
                vendor: Some("Haji Umar".to_string()),
                ..form("Goat", "Small", 1)
            },
            "vendor: Haji Umar",
        ),
        (
            SubmitForm {
                day: "H+9".to_string(),
                ..form("Goat", "Small", 1)
            },
            "day: H+9",
        ),
    ];

    for (submit, detail) in cases {
        let state = h.controller.submit(Direction::Inbound, submit).await;
        let SubmissionState::Idle { notice: Some(notice) } = state else {
            panic!("expected a validation notice, got {state:?}");
        };
        assert!(notice.starts_with("Check the form"));
        assert!(notice.contains(detail), "{notice}");
    }
    assert_eq!(h.ledger.append_calls(), 0);
}

#[tokio::test]
async fn receipt_is_uploaded_before_append() {
    let h = harness();
    let mut submit = form("Cow", "A", 2);
    submit.receipt_number = Some("N-17".to_string());
    submit.receipt = Some(ReceiptFile {
        file_name: "IMG_0001.jpeg".to_string(),
        bytes: vec![0xff, 0xd8, 0xff],
    });

    let state = h.controller.submit(Direction::Inbound, submit).await;
    let SubmissionState::Success { receipt, .. } = state else {
        panic!("expected success, got {state:?}");
    };
    let link = receipt.unwrap();

    assert_eq!(h.receipts.file_names(), ["N-17.jpeg"]);
    let rows = h.ledger.records(Direction::Inbound);
    assert_eq!(rows[0].receipt_url.as_deref(), Some(link.0.as_str()));
    assert_eq!(rows[0].receipt_number.as_deref(), Some("N-17"));
}

#[tokio::test]
async fn upload_failure_skips_append() {
    let h = harness();
    h.receipts.fail_uploads(true);
    let mut submit = form("Cow", "A", 2);
    submit.receipt = Some(ReceiptFile {
        file_name: "nota.pdf".to_string(),
        bytes: vec![b'%'],
    });

    let state = h.controller.submit(Direction::Inbound, submit).await;
    let SubmissionState::Failed { message, receipt } = state else {
        panic!("expected failure, got {state:?}");
    };
    assert!(message.starts_with("Receipt upload failed"));
    assert_eq!(receipt, None);
    assert_eq!(h.ledger.append_calls(), 0);
}

#[tokio::test]
async fn write_failure_then_retry_appends_once() {
    let h = harness();
    h.ledger.fail_next_append();

    let state = h
        .controller
        .submit(Direction::Inbound, form("Goat", "Small", 3))
        .await;
    assert!(state.is_failed());
    let message = state.message().unwrap();
    assert!(message.starts_with("Something went wrong"));
    assert!(message.contains("simulated ledger outage"));
    assert!(h.ledger.records(Direction::Inbound).is_empty());

    let state = state.reset();
    assert_eq!(state, SubmissionState::Idle { notice: None });

    let retry = h
        .controller
        .submit(Direction::Inbound, form("Goat", "Small", 3))
        .await;
    assert!(retry.is_success());
    assert_eq!(h.ledger.records(Direction::Inbound).len(), 1);
    assert_eq!(h.ledger.append_calls(), 2);
}

#[tokio::test]
async fn write_failure_after_upload_mentions_receipt() {
    let h = harness();
    h.ledger.fail_next_append();
    let mut submit = form("Goat", "Small", 3);
    submit.receipt = Some(ReceiptFile {
        file_name: "nota.png".to_string(),
        bytes: vec![0x89, b'P', b'N', b'G'],
    });

    let state = h.controller.submit(Direction::Inbound, submit).await;
    let SubmissionState::Failed { message, receipt } = state else {
        panic!("expected failure, got {state:?}");
    };
    assert!(receipt.is_some());
    assert!(message.contains("receipt already uploaded"));
}

#[tokio::test]
async fn success_message_marks_development() {
    let dev = harness_with(MemoryLedger::new(), Environment::Development);
    let state = dev
        .controller
        .submit(Direction::Inbound, form("Goat", "Small", 1))
        .await;
    assert_eq!(state.message(), Some("Saved (DEV)"));

    let prod = harness();
    let state = prod
        .controller
        .submit(Direction::Inbound, form("Goat", "Small", 1))
        .await;
    assert_eq!(state.message(), Some("Saved"));
}

#[tokio::test]
async fn dashboard_nets_inbound_against_outbound() {
    let ledger = MemoryLedger::with_records(
        Direction::Inbound,
        vec![rec("Small", 5), rec("Small", 3)],
    );
    ledger
        .append(Direction::Outbound, &rec("Small", 2))
        .await
        .unwrap();
    let h = harness_with(ledger, Environment::Production);

    let DashboardView::Ready(summary) = h.controller.dashboard().await else {
        panic!("dashboard failed");
    };
    assert_eq!(summary.net("Goat", "Small"), 6);
    assert_eq!(h.ledger.read_calls(), 2);
}

#[tokio::test]
async fn dashboard_read_failure_is_reported() {
    let h = harness();
    h.ledger.fail_reads(true);

    let view = h.controller.dashboard().await;
    let DashboardView::Failed { message } = view else {
        panic!("expected failure");
    };
    assert!(message.starts_with("Something went wrong"));
}
