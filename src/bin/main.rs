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

use chrono::{DateTime, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use csv::{ReaderBuilder, Trim, Writer};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::error::Error;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;
use wallet_ledger_rs::{
    AutoPayPatch, BillDraft, BillId, BudgetCategoryDraft, CategoryId, FileStore, PositionId,
    RedeemMethod, SnapshotStore, Transaction, TransactionKind, Wallet, dates,
};

/// Wallet Ledger - drive a snapshot-backed wallet from the command line
///
/// Loads the wallet snapshot (or starts a fresh one), applies the command,
/// and writes the snapshot back.
#[derive(Parser, Debug)]
#[command(name = "wallet-ledger-rs")]
#[command(about = "A client-side wallet ledger with bills, budgets, and cashback", long_about = None)]
struct Args {
    /// Path to the wallet snapshot file
    #[arg(long, global = true, default_value = "wallet-snapshot.json")]
    snapshot: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the main and cashback balances
    Balance,
    /// Send money to a recipient
    Send {
        recipient: String,
        amount: Decimal,
        #[arg(long)]
        description: Option<String>,
    },
    /// Deposit money into the main balance
    Deposit {
        amount: Decimal,
        #[arg(long)]
        description: Option<String>,
    },
    /// List bills with due status
    Bills,
    /// Register a new bill
    AddBill {
        name: String,
        amount: Decimal,
        /// Due date, e.g. "May 15, 2025", "05/15/2025", or "2025-05-15"
        #[arg(long)]
        due: String,
        #[arg(long)]
        category: String,
    },
    /// Pay a bill (defaults to its registered amount and category)
    PayBill {
        bill_id: BillId,
        #[arg(long)]
        amount: Option<Decimal>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Toggle autopay, or update its settings when options are given
    Autopay {
        bill_id: BillId,
        /// Day of month to charge (1-31)
        #[arg(long)]
        day: Option<u32>,
        #[arg(long)]
        method: Option<String>,
    },
    /// Redeem cashback into the wallet, the reward token, or a bank payout
    Redeem {
        amount: Decimal,
        #[arg(long, default_value = "wallet")]
        method: String,
    },
    /// List budget categories with spend, remaining, and status
    Budget,
    /// Add a budget category
    AddCategory {
        name: String,
        limit: Decimal,
        #[arg(long, default_value = "#4A8FE7")]
        color: String,
        #[arg(long, default_value = "Tag")]
        icon: String,
        /// Transaction-category label to match against
        #[arg(long)]
        label: Option<String>,
    },
    /// Change a budget category's limit
    SetLimit { category_id: CategoryId, limit: Decimal },
    /// List token holdings
    Tokens,
    /// Buy a token with the main balance
    Buy {
        symbol: String,
        amount: Decimal,
        price: Decimal,
    },
    /// Sell a token into the main balance
    Sell {
        symbol: String,
        amount: Decimal,
        price: Decimal,
    },
    /// Swap between two token holdings at the cross-price ratio
    Swap {
        from: String,
        to: String,
        amount: Decimal,
    },
    /// Stake a token amount
    Stake {
        symbol: String,
        amount: Decimal,
        #[arg(long, default_value = "5")]
        apy: Decimal,
    },
    /// Close a staking position, returning principal plus rewards
    Unstake { position_id: PositionId },
    /// Import transactions from a CSV statement
    ///
    /// Expected columns: kind,title,amount,date,category,recipient
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Export the transaction log as CSV to stdout
    Export,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut store = FileStore::new(&args.snapshot);

    let mut wallet = match store.load() {
        Ok(Some(snapshot)) => Wallet::from_snapshot(snapshot),
        Ok(None) => Wallet::new(),
        Err(e) => {
            eprintln!("Error reading snapshot '{}': {}", args.snapshot.display(), e);
            process::exit(1);
        }
    };

    if let Err(e) = run(args.command, &mut wallet) {
        eprintln!("Error: {e}");
        process::exit(1);
    }

    // Full-state write after every command settles.
    if let Err(e) = store.save(&wallet.snapshot()) {
        eprintln!("Error writing snapshot '{}': {}", args.snapshot.display(), e);
        process::exit(1);
    }
}

fn run(command: Command, wallet: &mut Wallet) -> Result<(), Box<dyn Error>> {
    let today = Utc::now().date_naive();

    match command {
        Command::Balance => {
            println!("balance:  {}", wallet.balance());
            println!("cashback: {}", wallet.cashback());
        }
        Command::Send {
            recipient,
            amount,
            description,
        } => {
            let tx = wallet.send_money(&recipient, amount, description.as_deref())?;
            println!("sent {} to {} (tx {})", tx.amount, recipient, tx.id);
        }
        Command::Deposit { amount, description } => {
            let tx = wallet.deposit_money(amount, description.as_deref())?;
            println!("deposited {} (tx {})", tx.amount, tx.id);
        }
        Command::Bills => {
            for bill in wallet.bills() {
                let due = match bill.days_until_due(today) {
                    Ok(days) => format!("{days} day(s)"),
                    Err(_) => "unparseable due date".to_string(),
                };
                println!(
                    "{}  {}  {}  due {}  [{:?}]{}",
                    bill.id,
                    bill.name,
                    bill.amount,
                    due,
                    bill.due_status(today),
                    if bill.is_paid { "  paid" } else { "" },
                );
            }
        }
        Command::AddBill {
            name,
            amount,
            due,
            category,
        } => {
            let id = wallet.register_bill(BillDraft {
                name,
                amount,
                due_date: due,
                category,
                ..BillDraft::default()
            })?;
            println!("registered bill {id}");
        }
        Command::PayBill {
            bill_id,
            amount,
            category,
        } => {
            let bill = wallet
                .bill(bill_id)
                .ok_or(wallet_ledger_rs::WalletError::BillNotFound)?;
            let amount = amount.unwrap_or(bill.amount);
            let category = category.unwrap_or_else(|| bill.category.clone());
            let tx = wallet.pay_bill(bill_id, amount, &category)?;
            println!("paid {} (tx {}), cashback now {}", tx.amount, tx.id, wallet.cashback());
        }
        Command::Autopay { bill_id, day, method } => {
            if day.is_none() && method.is_none() {
                wallet.toggle_auto_pay(bill_id)?;
            } else {
                wallet.update_auto_pay_settings(
                    bill_id,
                    AutoPayPatch {
                        payment_method: method,
                        payment_date: day,
                        last_payment_date: None,
                    },
                )?;
            }
            if let Some(settings) = wallet.bill(bill_id).and_then(|b| b.auto_pay.as_ref()) {
                match (&settings.next_payment_date, settings.days_until_next(today)) {
                    (Some(next), Some(days)) => {
                        println!("autopay on: next charge {next} ({days} day(s))")
                    }
                    _ => println!("autopay off (day {}, {})", settings.payment_date, settings.payment_method),
                }
            }
        }
        Command::Redeem { amount, method } => {
            let method: RedeemMethod = method
                .parse()
                .map_err(|_| "redeem method must be wallet, token, or bank")?;
            let tx = wallet.redeem_cashback(amount, method)?;
            println!("redeemed {} via {} (tx {})", tx.amount, method, tx.id);
        }
        Command::Budget => {
            for category in wallet.budget_categories() {
                println!(
                    "{}  {}  {} / {}  remaining {}  {:.1}%  [{:?}]",
                    category.id,
                    category.name,
                    category.spent,
                    category.limit,
                    category.remaining(),
                    category.percentage(),
                    category.status(),
                );
            }
            println!("overall: {:.1}%", wallet.overall_budget_percentage());
        }
        Command::AddCategory {
            name,
            limit,
            color,
            icon,
            label,
        } => {
            let id = wallet.add_budget_category(BudgetCategoryDraft {
                name,
                limit,
                color,
                icon,
                transaction_category: label,
            })?;
            println!("added category {id}");
        }
        Command::SetLimit { category_id, limit } => {
            wallet.set_budget_limit(category_id, limit)?;
            println!("limit set to {limit}");
        }
        Command::Tokens => {
            for token in wallet.tokens() {
                println!("{}  {}  {} @ {}", token.symbol, token.name, token.balance, token.price);
            }
        }
        Command::Buy { symbol, amount, price } => {
            let tx = wallet.buy_token(&symbol, amount, price)?;
            println!("bought {amount} {symbol} for {} (tx {})", tx.amount, tx.id);
        }
        Command::Sell { symbol, amount, price } => {
            let tx = wallet.sell_token(&symbol, amount, price)?;
            println!("sold {amount} {symbol} for {} (tx {})", tx.amount, tx.id);
        }
        Command::Swap { from, to, amount } => {
            let tx = wallet.swap_tokens(&from, &to, amount)?;
            println!("swapped {amount} {from} -> {to} (tx {})", tx.id);
        }
        Command::Stake { symbol, amount, apy } => {
            let id = wallet.add_staking_position(&symbol, amount, apy, today)?;
            println!("staked {amount} {symbol} (position {id})");
        }
        Command::Unstake { position_id } => {
            let payout = wallet.remove_staking_position(position_id)?;
            println!("unstaked, payout {payout}");
        }
        Command::Import { file } => {
            let handle = File::open(&file)
                .map_err(|e| format!("opening '{}': {e}", file.display()))?;
            let imported = import_transactions(wallet, BufReader::new(handle))?;
            println!("imported {imported} transaction(s)");
        }
        Command::Export => {
            write_transactions(wallet, std::io::stdout())?;
        }
    }

    Ok(())
}

/// Raw CSV record matching the statement import format.
///
/// Fields: `kind, title, amount, date, category, recipient`
#[derive(Debug, Deserialize)]
struct CsvRecord {
    kind: String,
    title: String,
    #[serde(deserialize_with = "csv::invalid_option")]
    amount: Option<Decimal>,
    date: String,
    category: Option<String>,
    recipient: Option<String>,
}

impl CsvRecord {
    /// Converts a CSV record into a transaction.
    ///
    /// Returns `None` for unknown kinds, missing amounts, or unparseable
    /// dates.
    fn into_transaction(self) -> Option<Transaction> {
        let kind = match self.kind.to_lowercase().as_str() {
            "payment" => TransactionKind::Payment,
            "send" => TransactionKind::Send,
            "receive" => TransactionKind::Receive,
            "withdrawal" => TransactionKind::Withdrawal,
            "deposit" => TransactionKind::Deposit,
            "swap" => TransactionKind::Swap,
            "buy" => TransactionKind::Buy,
            "sell" => TransactionKind::Sell,
            "cashback" => TransactionKind::Cashback,
            _ => return None,
        };
        let amount = self.amount?;
        let date = parse_statement_date(&self.date)?;

        let mut tx = Transaction::new(kind, self.title, amount, date);
        if let Some(category) = self.category.filter(|c| !c.is_empty()) {
            tx = tx.with_category(category);
        }
        if let Some(recipient) = self.recipient.filter(|r| !r.is_empty()) {
            tx = tx.with_recipient(recipient);
        }
        Some(tx)
    }
}

/// Accepts an RFC 3339 timestamp or any of the bill date shapes (taken as
/// midnight UTC).
fn parse_statement_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = dates::parse_due_date(raw).ok()?;
    Some(date.and_time(NaiveTime::MIN).and_utc())
}

/// Imports transactions from a CSV statement into the wallet's log.
///
/// Streaming: malformed rows and invalid records are skipped rather than
/// aborting the import. Returns the number of transactions recorded.
///
/// # Errors
///
/// Returns a CSV error if the reader fails or the CSV structure is invalid.
fn import_transactions<R: Read>(wallet: &mut Wallet, reader: R) -> Result<usize, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let mut imported = 0;
    for result in rdr.deserialize::<CsvRecord>() {
        match result {
            Ok(record) => {
                let Some(tx) = record.into_transaction() else {
                    #[cfg(debug_assertions)]
                    eprintln!("Skipping invalid statement record");
                    continue;
                };
                if wallet.record_transaction(tx).is_ok() {
                    imported += 1;
                }
            }
            Err(_e) => {
                #[cfg(debug_assertions)]
                eprintln!("Skipping malformed row: {_e}");
                continue;
            }
        }
    }

    Ok(imported)
}

/// Flat CSV row mirroring the import schema, so an export re-imports as-is.
#[derive(Debug, serde::Serialize)]
struct ExportRecord<'a> {
    kind: &'static str,
    title: &'a str,
    amount: Decimal,
    date: String,
    category: &'a str,
    recipient: &'a str,
}

/// Writes the transaction log as CSV, newest first.
///
/// # Errors
///
/// Returns a CSV error if writing fails.
fn write_transactions<W: std::io::Write>(wallet: &Wallet, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);
    for tx in wallet.transactions() {
        wtr.serialize(ExportRecord {
            kind: tx.kind.as_str(),
            title: &tx.title,
            amount: tx.amount,
            date: tx.date.to_rfc3339(),
            category: tx.category.as_deref().unwrap_or(""),
            recipient: tx.recipient.as_deref().unwrap_or(""),
        })?;
    }
    wtr.flush()?;
    Ok(())
}
