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

//! Monetary events.
//!
//! A [`Transaction`] is immutable once created: corrections are modeled as
//! new offsetting transactions, never as edits to the log.

use crate::base::TransactionId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of monetary event a transaction records.
///
/// Serialized as the lowercase kind name, matching the stored snapshot shape.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Payment,
    Send,
    Receive,
    Withdrawal,
    Deposit,
    Swap,
    Buy,
    Sell,
    Cashback,
}

impl TransactionKind {
    /// Outflow kinds reduce the main balance and count toward budget spend.
    pub fn is_outflow(self) -> bool {
        matches!(self, Self::Payment | Self::Send | Self::Withdrawal)
    }

    /// Inflow kinds increase the main balance.
    pub fn is_inflow(self) -> bool {
        matches!(self, Self::Deposit | Self::Receive)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Payment => "payment",
            Self::Send => "send",
            Self::Receive => "receive",
            Self::Withdrawal => "withdrawal",
            Self::Deposit => "deposit",
            Self::Swap => "swap",
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::Cashback => "cashback",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry in the transaction log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub title: String,
    /// Non-negative, currency-scale amount. The sign of the balance effect
    /// comes from the kind, not the amount.
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Transaction {
    /// Creates a transaction with a fresh id and no optional fields.
    pub fn new(
        kind: TransactionKind,
        title: impl Into<String>,
        amount: Decimal,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            kind,
            title: title.into(),
            amount,
            date,
            recipient: None,
            description: None,
            category: None,
        }
    }

    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Signed main-balance effect, where one is statically known.
    ///
    /// For buys the amount records the fiat cost and for sells the fiat
    /// proceeds, so both carry a fixed sign. Swaps only move token balances
    /// and cashback redemptions depend on the redemption method, so neither
    /// has a log-replayable effect; both return `None`.
    pub fn signed_effect(&self) -> Option<Decimal> {
        match self.kind {
            TransactionKind::Deposit | TransactionKind::Receive | TransactionKind::Sell => {
                Some(self.amount)
            }
            TransactionKind::Payment
            | TransactionKind::Send
            | TransactionKind::Withdrawal
            | TransactionKind::Buy => Some(-self.amount),
            TransactionKind::Swap | TransactionKind::Cashback => None,
        }
    }
}
