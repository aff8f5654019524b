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

//! The transaction log.
//!
//! Append-mostly, insertion-ordered, newest first. Append is the only
//! mutation; there are no in-place edits and no deletes, so every derived
//! figure (budget spend, balance replay) can be recomputed from scratch at
//! any time.

use crate::matching;
use crate::transaction::Transaction;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Ordered collection of monetary events, newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Ledger {
    transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from stored entries (assumed newest first).
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }

    /// Prepends a transaction; the log reads newest first.
    pub fn append(&mut self, transaction: Transaction) {
        self.transactions.insert(0, transaction);
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Entries whose date falls within `[start, end]`, bounds inclusive.
    pub fn by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|tx| {
                let date = tx.date.date_naive();
                date >= start && date <= end
            })
            .collect()
    }

    /// Entries whose category label overlaps `label` (case-insensitive with
    /// normalized-containment fallback), optionally restricted to a date
    /// range. The range applies only when both bounds are given.
    pub fn by_category(
        &self,
        label: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|tx| {
                if let (Some(start), Some(end)) = (start, end) {
                    let date = tx.date.date_naive();
                    if date < start || date > end {
                        return false;
                    }
                }
                tx.category
                    .as_deref()
                    .is_some_and(|cat| matching::labels_overlap(cat, label))
            })
            .collect()
    }

    /// Outflow entries in the given calendar month.
    pub fn month_outflows(&self, year: i32, month: u32) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(move |tx| {
            let date = tx.date.date_naive();
            tx.kind.is_outflow() && date.year() == year && date.month() == month
        })
    }

    /// Net main-balance effect of replaying the log, over the kinds whose
    /// effect is statically known (see [`Transaction::signed_effect`]).
    pub fn net_flow(&self) -> Decimal {
        self.transactions
            .iter()
            .filter_map(Transaction::signed_effect)
            .sum()
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a Transaction;
    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.transactions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TransactionKind;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn tx_on(kind: TransactionKind, amount: Decimal, y: i32, m: u32, d: u32) -> Transaction {
        let date = Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap();
        Transaction::new(kind, "test", amount, date)
    }

    #[test]
    fn append_keeps_newest_first() {
        let mut ledger = Ledger::new();
        ledger.append(tx_on(TransactionKind::Deposit, dec!(1), 2025, 1, 1));
        ledger.append(tx_on(TransactionKind::Deposit, dec!(2), 2025, 1, 2));

        assert_eq!(ledger.transactions()[0].amount, dec!(2));
        assert_eq!(ledger.transactions()[1].amount, dec!(1));
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let mut ledger = Ledger::new();
        ledger.append(tx_on(TransactionKind::Payment, dec!(1), 2025, 3, 1));
        ledger.append(tx_on(TransactionKind::Payment, dec!(2), 2025, 3, 15));
        ledger.append(tx_on(TransactionKind::Payment, dec!(3), 2025, 3, 31));
        ledger.append(tx_on(TransactionKind::Payment, dec!(4), 2025, 4, 1));

        let d = |m, day| NaiveDate::from_ymd_opt(2025, m, day).unwrap();
        let hits = ledger.by_date_range(d(3, 1), d(3, 31));
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn category_query_uses_loose_matching() {
        let mut ledger = Ledger::new();
        ledger.append(
            tx_on(TransactionKind::Payment, dec!(10), 2025, 3, 1).with_category("Food & Drink"),
        );
        ledger.append(
            tx_on(TransactionKind::Payment, dec!(20), 2025, 3, 2).with_category("Utilities"),
        );
        ledger.append(tx_on(TransactionKind::Payment, dec!(30), 2025, 3, 3));

        let hits = ledger.by_category("fooddrink", None, None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].amount, dec!(10));
    }

    #[test]
    fn category_query_date_filter_needs_both_bounds() {
        let mut ledger = Ledger::new();
        ledger.append(
            tx_on(TransactionKind::Payment, dec!(10), 2025, 3, 1).with_category("Utilities"),
        );
        ledger.append(
            tx_on(TransactionKind::Payment, dec!(20), 2025, 5, 1).with_category("Utilities"),
        );

        let march = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let april = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();

        assert_eq!(ledger.by_category("Utilities", Some(march), Some(april)).len(), 1);
        // One bound alone does not filter.
        assert_eq!(ledger.by_category("Utilities", Some(march), None).len(), 2);
    }

    #[test]
    fn net_flow_replays_known_kinds() {
        let mut ledger = Ledger::new();
        ledger.append(tx_on(TransactionKind::Deposit, dec!(100), 2025, 3, 1));
        ledger.append(tx_on(TransactionKind::Send, dec!(40), 2025, 3, 2));
        ledger.append(tx_on(TransactionKind::Sell, dec!(15), 2025, 3, 3));
        ledger.append(tx_on(TransactionKind::Swap, dec!(999), 2025, 3, 4));

        assert_eq!(ledger.net_flow(), dec!(75));
    }

    #[test]
    fn month_outflows_filters_kind_and_month() {
        let mut ledger = Ledger::new();
        ledger.append(tx_on(TransactionKind::Payment, dec!(1), 2025, 3, 5));
        ledger.append(tx_on(TransactionKind::Deposit, dec!(2), 2025, 3, 6));
        ledger.append(tx_on(TransactionKind::Send, dec!(3), 2025, 2, 5));

        let march: Vec<_> = ledger.month_outflows(2025, 3).collect();
        assert_eq!(march.len(), 1);
        assert_eq!(march[0].amount, dec!(1));
    }
}
