// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Bill registry integration tests: due dates, urgency, payment, autopay.

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use wallet_ledger_rs::dates::{self, DueStatus};
use wallet_ledger_rs::{
    AutoPayPatch, AutoPaySettings, BillDraft, TransactionKind, Wallet, WalletError,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn draft(name: &str, due: &str) -> BillDraft {
    BillDraft {
        name: name.into(),
        amount: dec!(89.99),
        due_date: due.into(),
        category: "Utilities".into(),
        ..BillDraft::default()
    }
}

#[test]
fn bill_due_in_three_days_is_urgent_not_past_due() {
    let mut wallet = Wallet::new();
    let bill_id = wallet.register_bill(draft("Electric", "May 15, 2025")).unwrap();

    let today = d(2025, 5, 12);
    let bill = wallet.bill(bill_id).unwrap();

    assert_eq!(bill.days_until_due(today), Ok(3));
    assert_eq!(wallet.bill_due_status(bill_id, today), Ok(DueStatus::Urgent));
}

#[test]
fn bill_past_due_after_slash_form_date() {
    let mut wallet = Wallet::new();
    let bill_id = wallet.register_bill(draft("Water", "04/01/2025")).unwrap();

    let today = d(2025, 4, 10);
    let bill = wallet.bill(bill_id).unwrap();

    assert_eq!(bill.days_until_due(today), Ok(-9));
    assert_eq!(wallet.bill_due_status(bill_id, today), Ok(DueStatus::PastDue));
}

#[test]
fn all_three_date_shapes_agree() {
    let comma = dates::parse_due_date("May 15, 2025").unwrap();
    let slash = dates::parse_due_date("05/15/2025").unwrap();
    let dash = dates::parse_due_date("2025-05-15").unwrap();

    assert_eq!(comma, slash);
    assert_eq!(slash, dash);
}

#[test]
fn malformed_due_date_does_not_break_the_bill_list() {
    let mut wallet = Wallet::new();
    wallet.register_bill(draft("Electric", "May 15, 2025")).unwrap();
    let broken_id = wallet.register_bill(draft("Mystery", "eventually")).unwrap();

    let today = d(2025, 5, 12);
    // The broken bill degrades to normal; listing every bill still works.
    assert_eq!(wallet.bill_due_status(broken_id, today), Ok(DueStatus::Normal));
    let statuses: Vec<_> = wallet
        .bills()
        .iter()
        .map(|b| b.due_status(today))
        .collect();
    assert_eq!(statuses, vec![DueStatus::Urgent, DueStatus::Normal]);
}

#[test]
fn paying_a_bill_settles_everything_at_once() {
    let mut wallet = Wallet::with_balance(dec!(200.00));
    let bill_id = wallet.register_bill(draft("Electric", "May 15, 2025")).unwrap();

    let tx = wallet.pay_bill(bill_id, dec!(89.99), "Utilities").unwrap();

    // Money moved, cashback credited at 5%, history written, flag flipped.
    assert_eq!(wallet.balance(), dec!(110.01));
    assert_eq!(wallet.cashback(), dec!(89.99) * dec!(0.05));
    assert_eq!(tx.kind, TransactionKind::Payment);
    assert_eq!(tx.recipient.as_deref(), Some("Electric"));

    let bill = wallet.bill(bill_id).unwrap();
    assert!(bill.is_paid);
    assert_eq!(bill.history.len(), 1);
    assert_eq!(bill.history[0].amount, dec!(89.99));
    assert_eq!(bill.history[0].status, "Paid");
    assert_eq!(bill.history[0].transaction_id, Some(tx.id));
}

#[test]
fn paying_an_unknown_bill_fails() {
    let mut wallet = Wallet::with_balance(dec!(200.00));
    let mut other = Wallet::new();
    let foreign_id = other.register_bill(draft("Electric", "May 15, 2025")).unwrap();

    assert_eq!(
        wallet.pay_bill(foreign_id, dec!(10.00), "Utilities"),
        Err(WalletError::BillNotFound)
    );
    assert_eq!(wallet.balance(), dec!(200.00));
    assert!(wallet.transactions().is_empty());
}

#[test]
fn paying_twice_appends_history_without_rearming() {
    let mut wallet = Wallet::with_balance(dec!(500.00));
    let bill_id = wallet.register_bill(draft("Electric", "May 15, 2025")).unwrap();

    wallet.pay_bill(bill_id, dec!(89.99), "Utilities").unwrap();
    wallet.pay_bill(bill_id, dec!(92.10), "Utilities").unwrap();

    let bill = wallet.bill(bill_id).unwrap();
    assert!(bill.is_paid);
    assert_eq!(bill.history.len(), 2);
    // Newest first.
    assert_eq!(bill.history[0].amount, dec!(92.10));
}

#[test]
fn payment_history_merges_matching_log_entries() {
    let mut wallet = Wallet::with_balance(dec!(500.00));
    let bill_id = wallet.register_bill(draft("Electric", "May 15, 2025")).unwrap();
    wallet.pay_bill(bill_id, dec!(89.99), "Utilities").unwrap();

    // A payment recorded outside the registry, matching by title.
    let stray = wallet_ledger_rs::Transaction::new(
        TransactionKind::Payment,
        "Electric",
        dec!(78.50),
        chrono::Utc::now(),
    );
    wallet.record_transaction(stray.clone()).unwrap();

    let history = wallet.bill_payment_history(bill_id).unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().any(|h| h.transaction_id == Some(stray.id)));

    // Re-running does not duplicate the registry entry.
    let again = wallet.bill_payment_history(bill_id).unwrap();
    assert_eq!(again.len(), 2);
}

#[test]
fn autopay_day_already_passed_schedules_next_month() {
    // Day 5, evaluated on the 10th: the charge lands next month.
    let mut settings = AutoPaySettings::new("Visa •••• 4242", 5);
    settings.enabled = true;
    settings.schedule(d(2025, 6, 10));

    let next = settings.next_payment_date_raw.unwrap();
    assert_eq!(next, d(2025, 7, 5));
    assert_eq!(settings.days_until_next(d(2025, 6, 10)), Some(25));
}

#[test]
fn autopay_day_ahead_schedules_this_month() {
    let mut settings = AutoPaySettings::new("Visa •••• 4242", 25);
    settings.enabled = true;
    settings.schedule(d(2025, 6, 10));

    assert_eq!(settings.next_payment_date_raw, Some(d(2025, 6, 25)));
}

#[test]
fn toggle_autopay_round_trip_preserves_settings() {
    let mut wallet = Wallet::new();
    let bill_id = wallet.register_bill(draft("Internet", "2025-07-01")).unwrap();

    wallet
        .update_auto_pay_settings(
            bill_id,
            AutoPayPatch {
                payment_method: Some("Amex •••• 1005".into()),
                payment_date: Some(28),
                last_payment_date: None,
            },
        )
        .unwrap();

    wallet.toggle_auto_pay(bill_id).unwrap(); // on
    {
        let settings = wallet.bill(bill_id).unwrap().auto_pay.as_ref().unwrap();
        assert!(settings.enabled);
        assert!(settings.next_payment_date_raw.is_some());
        assert!(settings.next_payment_date.is_some());
    }

    wallet.toggle_auto_pay(bill_id).unwrap(); // off
    let settings = wallet.bill(bill_id).unwrap().auto_pay.as_ref().unwrap();
    assert!(!settings.enabled);
    assert_eq!(settings.next_payment_date_raw, None);
    assert_eq!(settings.payment_method, "Amex •••• 1005");
    assert_eq!(settings.payment_date, 28);
}

#[test]
fn updating_day_reschedules_only_while_enabled() {
    let mut wallet = Wallet::new();
    let bill_id = wallet.register_bill(draft("Internet", "2025-07-01")).unwrap();
    wallet.toggle_auto_pay(bill_id).unwrap();
    let first = wallet
        .bill(bill_id)
        .unwrap()
        .auto_pay
        .as_ref()
        .unwrap()
        .next_payment_date_raw;

    wallet
        .update_auto_pay_settings(
            bill_id,
            AutoPayPatch {
                payment_date: Some(27),
                ..AutoPayPatch::default()
            },
        )
        .unwrap();

    let settings = wallet.bill(bill_id).unwrap().auto_pay.as_ref().unwrap();
    let rescheduled = settings.next_payment_date_raw.unwrap();
    assert_ne!(Some(rescheduled), first);
    assert_eq!(chrono::Datelike::day(&rescheduled), 27);
}
