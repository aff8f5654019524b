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

//! Benchmarks for the wallet ledger.
//!
//! Run with: cargo bench
//!
//! Benchmarks include:
//! - Spending recompute over growing transaction logs
//! - Mutator throughput (deposits, sends)
//! - Category matching over mixed label shapes

use chrono::{NaiveTime, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;
use wallet_ledger_rs::{Transaction, TransactionKind, Wallet};

// =============================================================================
// Helper Functions
// =============================================================================

const LABELS: &[&str] = &[
    "Utilities",
    "Food & Drink",
    "Food & Dining",
    "Netflix",
    "Gas Station",
    "Payroll",
];

/// A wallet whose log holds `size` current-month outflows with mixed labels.
fn wallet_with_log(size: usize) -> Wallet {
    let mut wallet = Wallet::new();
    let base = Utc::now()
        .date_naive()
        .and_time(NaiveTime::from_hms_opt(12, 0, 0).expect("valid time"))
        .and_utc();

    for i in 0..size {
        let tx = Transaction::new(
            TransactionKind::Payment,
            "bench",
            Decimal::new(1000 + i as i64, 2),
            base,
        )
        .with_category(LABELS[i % LABELS.len()]);
        wallet
            .record_transaction(tx)
            .expect("bench amounts are positive");
    }
    wallet
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_recompute_spending(c: &mut Criterion) {
    let mut group = c.benchmark_group("recompute_spending");
    for size in [100usize, 1_000, 5_000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut wallet = wallet_with_log(size);
            b.iter(|| {
                wallet.recompute_spending();
                black_box(wallet.budget_categories().len())
            });
        });
    }
    group.finish();
}

fn bench_deposit_throughput(c: &mut Criterion) {
    c.bench_function("deposit_money", |b| {
        let mut wallet = Wallet::new();
        b.iter(|| {
            wallet
                .deposit_money(black_box(Decimal::new(2500, 2)), None)
                .expect("deposit always succeeds")
        });
    });
}

fn bench_send_after_large_log(c: &mut Criterion) {
    c.bench_function("send_money_with_5k_log", |b| {
        let mut wallet = wallet_with_log(5_000);
        wallet
            .deposit_money(Decimal::new(1_000_000_000, 2), None)
            .expect("deposit always succeeds");
        b.iter(|| {
            wallet
                .send_money("Counterparty", black_box(Decimal::new(100, 2)), None)
                .expect("funded")
        });
    });
}

fn bench_category_query(c: &mut Criterion) {
    c.bench_function("query_by_category_5k", |b| {
        let wallet = wallet_with_log(5_000);
        b.iter(|| {
            black_box(
                wallet
                    .ledger()
                    .by_category(black_box("food & drink"), None, None)
                    .len(),
            )
        });
    });
}

criterion_group!(
    benches,
    bench_recompute_spending,
    bench_deposit_throughput,
    bench_send_after_large_log,
    bench_category_query,
);
criterion_main!(benches);
