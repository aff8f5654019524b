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

//! Bills and autopay.
//!
//! A [`Bill`] is a named recurring obligation with a free-text due date,
//! an optional [`AutoPaySettings`], and a payment-history sub-log. Bills
//! are registered and mutated (paid, autopay toggled), never deleted.

use crate::base::{BillId, TransactionId};
use crate::dates::{self, DueStatus};
use crate::error::WalletError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fallback payment method label when a bill has none configured.
pub const DEFAULT_PAYMENT_METHOD: &str = "Visa •••• 4242";

/// Fallback autopay day-of-month.
pub const DEFAULT_PAYMENT_DAY: u32 = 15;

/// One settled obligation cycle in a bill's history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillHistory {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<TransactionId>,
}

/// Recurring-charge configuration, owned exclusively by its bill.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AutoPaySettings {
    pub enabled: bool,
    pub payment_method: String,
    /// Day of month, 1-31. Clamped into short months when scheduling.
    pub payment_date: u32,
    /// Human-readable next charge date, e.g. "June 10, 2025".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_payment_date: Option<String>,
    /// Machine form of the next charge date. Kept alongside the display
    /// string so day counts never re-parse it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_payment_date_raw: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_payment_date: Option<NaiveDate>,
}

impl AutoPaySettings {
    pub fn new(payment_method: impl Into<String>, payment_date: u32) -> Self {
        Self {
            enabled: false,
            payment_method: payment_method.into(),
            payment_date,
            next_payment_date: None,
            next_payment_date_raw: None,
            last_payment_date: None,
        }
    }

    /// Computes and stores the next charge date relative to `today`.
    pub fn schedule(&mut self, today: NaiveDate) {
        let next = dates::next_autopay_date(self.payment_date, today);
        self.next_payment_date = Some(dates::long_date(next));
        self.next_payment_date_raw = Some(next);
    }

    /// Clears the computed schedule but keeps method and day for re-enabling.
    pub fn clear_schedule(&mut self) {
        self.next_payment_date = None;
        self.next_payment_date_raw = None;
    }

    /// Days from `today` until the next scheduled charge, if one is set.
    pub fn days_until_next(&self, today: NaiveDate) -> Option<i64> {
        self.next_payment_date_raw
            .map(|next| dates::days_until(next, today))
    }
}

/// Fields supplied when registering a bill. Identity and payment state are
/// assigned by the registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillDraft {
    pub name: String,
    pub amount: Decimal,
    pub due_date: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bill_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_pay: Option<AutoPaySettings>,
}

/// A named recurring obligation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bill {
    pub id: BillId,
    pub name: String,
    pub amount: Decimal,
    /// Free text; parsed on demand by [`Bill::due_date_parsed`].
    pub due_date: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_paid: bool,
    pub is_overdue: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bill_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub history: Vec<BillHistory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_pay: Option<AutoPaySettings>,
}

impl Bill {
    /// Builds a registered bill from a draft: fresh id, unpaid, not overdue.
    pub fn from_draft(draft: BillDraft) -> Self {
        Self {
            id: BillId::new(),
            name: draft.name,
            amount: draft.amount,
            due_date: draft.due_date,
            category: draft.category,
            description: draft.description,
            is_paid: false,
            is_overdue: false,
            logo_url: draft.logo_url,
            bill_number: draft.bill_number,
            account_number: draft.account_number,
            billing_period: draft.billing_period,
            payment_method: draft.payment_method,
            history: Vec::new(),
            auto_pay: draft.auto_pay,
        }
    }

    /// Parses the stored due date.
    ///
    /// # Errors
    ///
    /// [`WalletError::UnparseableDate`] when the text matches no accepted
    /// format. Callers listing bills degrade to non-urgent rather than
    /// failing the listing.
    pub fn due_date_parsed(&self) -> Result<NaiveDate, WalletError> {
        dates::parse_due_date(&self.due_date)
    }

    /// Days from `today` until the due date.
    pub fn days_until_due(&self, today: NaiveDate) -> Result<i64, WalletError> {
        Ok(dates::days_until(self.due_date_parsed()?, today))
    }

    /// Urgency relative to `today`; unparseable dates degrade to normal.
    pub fn due_status(&self, today: NaiveDate) -> DueStatus {
        match self.days_until_due(today) {
            Ok(days) => dates::due_status(days),
            Err(_) => DueStatus::Normal,
        }
    }

    /// Records a settled cycle: prepends a history entry and flips the paid
    /// flag. The flag is never re-armed for a new cycle by the registry; a
    /// later payment simply prepends another entry.
    pub fn record_payment(&mut self, entry: BillHistory) {
        self.history.insert(0, entry);
        self.is_paid = true;
    }
}
