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

//! # Wallet Ledger
//!
//! This library provides a client-side wallet ledger and derived-state
//! engine: a single state container holding balances, a transaction log,
//! bills with autopay schedules, budget categories, token holdings, and a
//! cashback accumulator, plus the rules that keep the derived figures
//! consistent as the log grows.
//!
//! ## Core Components
//!
//! - [`Wallet`]: the facade owning all state and invariant enforcement
//! - [`Ledger`]: append-only transaction log with date and category queries
//! - [`Bill`] / [`AutoPaySettings`]: recurring obligations and their schedules
//! - [`BudgetCategory`]: spending buckets with log-derived `spent` totals
//! - [`WalletError`]: typed failure reasons for every fallible operation
//! - [`Snapshot`] / [`SnapshotStore`]: the JSON persistence boundary
//!
//! ## Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use wallet_ledger_rs::Wallet;
//!
//! let mut wallet = Wallet::new();
//! wallet.deposit_money(dec!(100.00), Some("Paycheck")).unwrap();
//! let tx = wallet.send_money("Alice", dec!(40.00), None).unwrap();
//!
//! assert_eq!(wallet.balance(), dec!(60.00));
//! assert_eq!(tx.recipient.as_deref(), Some("Alice"));
//! ```
//!
//! ## Concurrency
//!
//! There is none: the wallet is a single-writer, in-memory value. Every
//! operation is a synchronous transform that either settles completely or
//! returns a typed error leaving the state untouched.

pub mod base;
pub mod bill;
pub mod budget;
pub mod contact;
pub mod dates;
pub mod error;
pub mod ledger;
pub mod matching;
pub mod snapshot;
pub mod token;
pub mod transaction;
pub mod wallet;

pub use base::{BillId, CategoryId, ContactId, PositionId, TransactionId};
pub use bill::{AutoPaySettings, Bill, BillDraft, BillHistory};
pub use budget::{BudgetCategory, BudgetCategoryDraft, BudgetStatus};
pub use contact::{Contact, ContactDraft};
pub use dates::DueStatus;
pub use error::WalletError;
pub use ledger::Ledger;
pub use snapshot::{FileStore, MemoryStore, Snapshot, SnapshotError, SnapshotStore};
pub use token::{StakingPosition, Token};
pub use transaction::{Transaction, TransactionKind};
pub use wallet::{AutoPayPatch, RedeemMethod, Wallet};
