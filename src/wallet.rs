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

//! The wallet facade.
//!
//! [`Wallet`] is the single state container: balances, the transaction log,
//! bills, budget categories, token holdings, staking positions, and the
//! cashback accumulator all live here, and every mutation goes through one
//! of its methods.
//!
//! # Invariants
//!
//! - Every balance-affecting operation emits exactly one [`Transaction`]
//!   on success, and none on validation failure.
//! - The log is append-only; corrections are offsetting transactions.
//! - `spent` on every budget category is recomputed from the log after each
//!   log-changing mutation, never incremented in place.
//! - Failures are returned as [`WalletError`] values and leave the state
//!   untouched; nothing panics on bad input.
//!
//! # Single writer
//!
//! All operations are synchronous value transforms over one owned instance.
//! There is no interior locking because there is no parallelism: callers
//! that need sharing wrap the wallet themselves.

use crate::base::{BillId, CategoryId, ContactId, PositionId};
use crate::bill::{
    AutoPaySettings, Bill, BillDraft, BillHistory, DEFAULT_PAYMENT_DAY, DEFAULT_PAYMENT_METHOD,
};
use crate::budget::{self, BudgetCategory, BudgetCategoryDraft};
use crate::contact::{Contact, ContactDraft};
use crate::dates::DueStatus;
use crate::error::WalletError;
use crate::ledger::Ledger;
use crate::snapshot::Snapshot;
use crate::token::{
    self, REWARD_TOKEN_SYMBOL, StakingPosition, Token,
};
use crate::transaction::{Transaction, TransactionKind};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Destination for a cashback redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedeemMethod {
    /// Move the amount into the main balance.
    Wallet,
    /// Convert into the reward token at a 5% bonus.
    Token,
    /// Pay out externally; the amount leaves the system.
    Bank,
}

impl fmt::Display for RedeemMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Wallet => "wallet",
            Self::Token => "token",
            Self::Bank => "bank",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for RedeemMethod {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wallet" => Ok(Self::Wallet),
            "token" => Ok(Self::Token),
            "bank" => Ok(Self::Bank),
            _ => Err(WalletError::InvalidAmount),
        }
    }
}

/// Partial update for a bill's autopay settings. `None` fields keep their
/// current values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutoPayPatch {
    pub payment_method: Option<String>,
    pub payment_date: Option<u32>,
    pub last_payment_date: Option<NaiveDate>,
}

/// The single source of truth for wallet state.
#[derive(Debug, Clone, PartialEq)]
pub struct Wallet {
    balance: Decimal,
    ledger: Ledger,
    tokens: Vec<Token>,
    cashback: Decimal,
    staking_positions: Vec<StakingPosition>,
    contacts: Vec<Contact>,
    bills: Vec<Bill>,
    budget_categories: Vec<BudgetCategory>,
}

impl Wallet {
    /// Share of a qualifying payment credited as cashback.
    const CASHBACK_RATE: Decimal = dec!(0.05);

    /// An empty wallet with the starter budget categories.
    pub fn new() -> Self {
        Self::with_balance(Decimal::ZERO)
    }

    /// An empty wallet opened with an initial balance.
    pub fn with_balance(balance: Decimal) -> Self {
        Self {
            balance,
            ledger: Ledger::new(),
            tokens: Vec::new(),
            cashback: Decimal::ZERO,
            staking_positions: Vec::new(),
            contacts: Vec::new(),
            bills: Vec::new(),
            budget_categories: budget::default_categories(),
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn cashback(&self) -> Decimal {
        self.cashback
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.ledger.transactions()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn token(&self, symbol: &str) -> Option<&Token> {
        self.tokens.iter().find(|t| t.symbol == symbol)
    }

    pub fn bills(&self) -> &[Bill] {
        &self.bills
    }

    pub fn bill(&self, bill_id: BillId) -> Option<&Bill> {
        self.bills.iter().find(|b| b.id == bill_id)
    }

    pub fn budget_categories(&self) -> &[BudgetCategory] {
        &self.budget_categories
    }

    pub fn staking_positions(&self) -> &[StakingPosition] {
        &self.staking_positions
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Total spend over total budget, as a percentage.
    pub fn overall_budget_percentage(&self) -> Decimal {
        budget::overall_percentage(&self.budget_categories)
    }

    /// Urgency of a bill relative to `today`. Unparseable due dates degrade
    /// to [`DueStatus::Normal`] instead of failing the caller.
    ///
    /// # Errors
    ///
    /// [`WalletError::BillNotFound`] for an unknown id.
    pub fn bill_due_status(&self, bill_id: BillId, today: NaiveDate) -> Result<DueStatus, WalletError> {
        let bill = self.bill(bill_id).ok_or(WalletError::BillNotFound)?;
        Ok(bill.due_status(today))
    }

    // ------------------------------------------------------------------
    // Transactions and money movement
    // ------------------------------------------------------------------

    /// Appends an externally-described transaction to the log.
    ///
    /// The log is the source of truth for derived state, so spending totals
    /// are recomputed immediately. The main balance is not touched: this
    /// records an event, the dedicated mutators move money.
    ///
    /// # Errors
    ///
    /// [`WalletError::InvalidAmount`] for a negative amount.
    pub fn record_transaction(&mut self, transaction: Transaction) -> Result<(), WalletError> {
        if transaction.amount < Decimal::ZERO {
            warn!(amount = %transaction.amount, "rejecting negative transaction amount");
            return Err(WalletError::InvalidAmount);
        }
        debug!(kind = %transaction.kind, amount = %transaction.amount, "recording transaction");
        self.push_and_recompute(transaction);
        Ok(())
    }

    /// Sends money to a recipient.
    ///
    /// # Errors
    ///
    /// - [`WalletError::InvalidAmount`] - `amount <= 0`.
    /// - [`WalletError::InsufficientFunds`] - `amount` exceeds the balance.
    pub fn send_money(
        &mut self,
        recipient: &str,
        amount: Decimal,
        description: Option<&str>,
    ) -> Result<Transaction, WalletError> {
        ensure_positive(amount)?;
        if amount > self.balance {
            warn!(%amount, balance = %self.balance, "send exceeds balance");
            return Err(WalletError::InsufficientFunds);
        }

        let transaction = Transaction::new(
            TransactionKind::Send,
            description.unwrap_or("Money transfer"),
            amount,
            Utc::now(),
        )
        .with_recipient(recipient);

        self.balance -= amount;
        debug!(%recipient, %amount, "sent money");
        Ok(self.push_and_recompute(transaction))
    }

    /// Deposits money into the main balance.
    ///
    /// # Errors
    ///
    /// [`WalletError::InvalidAmount`] - `amount <= 0`.
    pub fn deposit_money(
        &mut self,
        amount: Decimal,
        description: Option<&str>,
    ) -> Result<Transaction, WalletError> {
        ensure_positive(amount)?;

        let transaction = Transaction::new(
            TransactionKind::Deposit,
            description.unwrap_or("Money deposit"),
            amount,
            Utc::now(),
        )
        .with_category("Deposit");

        self.balance += amount;
        debug!(%amount, "deposited money");
        Ok(self.push_and_recompute(transaction))
    }

    // ------------------------------------------------------------------
    // Bills
    // ------------------------------------------------------------------

    /// Registers a new bill. Bills start unpaid and are never deleted.
    ///
    /// # Errors
    ///
    /// [`WalletError::InvalidAmount`] for a non-positive bill amount.
    pub fn register_bill(&mut self, draft: BillDraft) -> Result<BillId, WalletError> {
        ensure_positive(draft.amount)?;
        let bill = Bill::from_draft(draft);
        let id = bill.id;
        debug!(bill = %bill.name, %id, "registered bill");
        self.bills.push(bill);
        Ok(id)
    }

    /// Pays a bill: moves money, credits cashback, appends to the bill's
    /// history, and flips the paid flag.
    ///
    /// Paying an already-paid bill is allowed and records another cycle's
    /// history entry; the paid flag is not re-armed between cycles.
    ///
    /// # Errors
    ///
    /// - [`WalletError::BillNotFound`]
    /// - [`WalletError::InvalidAmount`] - `amount <= 0`.
    /// - [`WalletError::InsufficientFunds`] - `amount` exceeds the balance.
    pub fn pay_bill(
        &mut self,
        bill_id: BillId,
        amount: Decimal,
        category: &str,
    ) -> Result<Transaction, WalletError> {
        ensure_positive(amount)?;
        if amount > self.balance {
            warn!(%amount, balance = %self.balance, "bill payment exceeds balance");
            return Err(WalletError::InsufficientFunds);
        }
        let now = Utc::now();
        let bill = self
            .bills
            .iter_mut()
            .find(|b| b.id == bill_id)
            .ok_or(WalletError::BillNotFound)?;

        let transaction = Transaction::new(TransactionKind::Payment, bill.name.clone(), amount, now)
            .with_recipient(bill.name.clone())
            .with_category(category);

        bill.record_payment(BillHistory {
            date: now.date_naive(),
            amount,
            status: "Paid".to_string(),
            transaction_id: Some(transaction.id),
        });

        self.balance -= amount;
        self.cashback += amount * Self::CASHBACK_RATE;
        debug!(%bill_id, %amount, cashback = %self.cashback, "paid bill");
        Ok(self.push_and_recompute(transaction))
    }

    /// Directly sets a bill's paid flag without moving money.
    ///
    /// # Errors
    ///
    /// [`WalletError::BillNotFound`] for an unknown id.
    pub fn set_bill_paid(&mut self, bill_id: BillId, is_paid: bool) -> Result<(), WalletError> {
        let bill = self.bill_mut(bill_id)?;
        bill.is_paid = is_paid;
        Ok(())
    }

    /// Toggles autopay for a bill, creating default settings on first use.
    ///
    /// Enabling computes the next charge date (this month if the configured
    /// day is still ahead, otherwise next month); disabling clears the
    /// schedule but keeps the method and day for re-enabling.
    ///
    /// # Errors
    ///
    /// [`WalletError::BillNotFound`] for an unknown id.
    pub fn toggle_auto_pay(&mut self, bill_id: BillId) -> Result<(), WalletError> {
        let today = Utc::now().date_naive();
        let bill = self.bill_mut(bill_id)?;
        let fallback_method = bill
            .payment_method
            .clone()
            .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string());

        let settings = bill
            .auto_pay
            .get_or_insert_with(|| AutoPaySettings::new(fallback_method, DEFAULT_PAYMENT_DAY));

        settings.enabled = !settings.enabled;
        if settings.enabled {
            settings.schedule(today);
        } else {
            settings.clear_schedule();
        }
        debug!(%bill_id, enabled = settings.enabled, "toggled autopay");
        Ok(())
    }

    /// Applies a partial autopay update, rescheduling when the enabled
    /// schedule's day-of-month changes.
    ///
    /// # Errors
    ///
    /// - [`WalletError::BillNotFound`]
    /// - [`WalletError::InvalidAmount`] - day-of-month outside 1-31.
    pub fn update_auto_pay_settings(
        &mut self,
        bill_id: BillId,
        patch: AutoPayPatch,
    ) -> Result<(), WalletError> {
        if let Some(day) = patch.payment_date {
            if !(1..=31).contains(&day) {
                warn!(day, "autopay day-of-month out of range");
                return Err(WalletError::InvalidAmount);
            }
        }

        let today = Utc::now().date_naive();
        let bill = self.bill_mut(bill_id)?;
        let fallback_method = bill
            .payment_method
            .clone()
            .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string());
        let settings = bill
            .auto_pay
            .get_or_insert_with(|| AutoPaySettings::new(fallback_method, DEFAULT_PAYMENT_DAY));

        if let Some(method) = patch.payment_method {
            settings.payment_method = method;
        }
        if let Some(last) = patch.last_payment_date {
            settings.last_payment_date = Some(last);
        }
        if let Some(day) = patch.payment_date {
            let changed = settings.payment_date != day;
            settings.payment_date = day;
            if changed && settings.enabled {
                settings.schedule(today);
            }
        }
        Ok(())
    }

    /// The bill's own history merged with matching payment transactions from
    /// the log (same title or recipient), deduplicated by transaction id,
    /// newest first.
    ///
    /// # Errors
    ///
    /// [`WalletError::BillNotFound`] for an unknown id.
    pub fn bill_payment_history(&self, bill_id: BillId) -> Result<Vec<BillHistory>, WalletError> {
        let bill = self.bill(bill_id).ok_or(WalletError::BillNotFound)?;
        let mut history = bill.history.clone();

        for tx in self.ledger.iter() {
            let matches_bill = tx.kind == TransactionKind::Payment
                && (tx.title == bill.name || tx.recipient.as_deref() == Some(bill.name.as_str()));
            if !matches_bill {
                continue;
            }
            let already_recorded = history
                .iter()
                .any(|entry| entry.transaction_id == Some(tx.id));
            if !already_recorded {
                history.push(BillHistory {
                    date: tx.date.date_naive(),
                    amount: tx.amount,
                    status: "Paid".to_string(),
                    transaction_id: Some(tx.id),
                });
            }
        }

        history.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(history)
    }

    // ------------------------------------------------------------------
    // Cashback
    // ------------------------------------------------------------------

    /// Redeems cashback through one of three destinations.
    ///
    /// All methods decrement the cashback balance by the pre-bonus `amount`;
    /// the token method credits a 5%-bonus-adjusted token amount funded from
    /// outside the accumulator.
    ///
    /// # Errors
    ///
    /// - [`WalletError::InvalidAmount`] - `amount <= 0`.
    /// - [`WalletError::InsufficientCashback`] - `amount` exceeds the
    ///   accumulated cashback.
    pub fn redeem_cashback(
        &mut self,
        amount: Decimal,
        method: RedeemMethod,
    ) -> Result<Transaction, WalletError> {
        ensure_positive(amount)?;
        if amount > self.cashback {
            warn!(%amount, cashback = %self.cashback, "redemption exceeds cashback");
            return Err(WalletError::InsufficientCashback);
        }

        let now = Utc::now();
        let transaction = match method {
            RedeemMethod::Wallet => {
                self.balance += amount;
                Transaction::new(TransactionKind::Cashback, "Cashback Redemption", amount, now)
            }
            RedeemMethod::Token => {
                let unit_price = self
                    .token(REWARD_TOKEN_SYMBOL)
                    .map(|t| t.price)
                    .unwrap_or_else(token::reward_token_fallback_price);
                let token_amount = amount * token::reward_token_bonus() / unit_price;
                if let Some(reward) = self.tokens.iter_mut().find(|t| t.symbol == REWARD_TOKEN_SYMBOL)
                {
                    reward.balance += token_amount;
                } else {
                    // No reward holding to credit; the conversion is dropped
                    // while the cashback is still spent.
                    warn!(%token_amount, "no reward token holding; conversion dropped");
                }
                Transaction::new(
                    TransactionKind::Cashback,
                    format!("Cashback to {REWARD_TOKEN_SYMBOL}"),
                    amount,
                    now,
                )
            }
            RedeemMethod::Bank => {
                Transaction::new(TransactionKind::Cashback, "Cashback to Bank", amount, now)
            }
        };

        self.cashback -= amount;
        debug!(%amount, %method, "redeemed cashback");
        Ok(self.push_and_recompute(transaction.with_category("Rewards")))
    }

    /// Drains the entire cashback balance into the main balance.
    ///
    /// # Errors
    ///
    /// [`WalletError::InvalidAmount`] when there is nothing to withdraw.
    pub fn withdraw_cashback(&mut self) -> Result<Transaction, WalletError> {
        self.redeem_cashback(self.cashback, RedeemMethod::Wallet)
    }

    // ------------------------------------------------------------------
    // Tokens
    // ------------------------------------------------------------------

    /// Adds a token to the tracked holdings, or refreshes the market fields
    /// of an existing one (balance is never overwritten here).
    pub fn track_token(&mut self, token: Token) {
        if let Some(existing) = self.tokens.iter_mut().find(|t| t.symbol == token.symbol) {
            existing.name = token.name;
            existing.price = token.price;
            existing.change = token.change;
            existing.icon_url = token.icon_url;
            existing.color = token.color;
        } else {
            self.tokens.push(token);
        }
    }

    /// Buys `amount` of a token at `price`, paying from the main balance.
    ///
    /// # Errors
    ///
    /// - [`WalletError::TokenNotFound`] - symbol is not tracked.
    /// - [`WalletError::InvalidAmount`] - non-positive amount or price.
    /// - [`WalletError::InsufficientFunds`] - cost exceeds the balance.
    pub fn buy_token(
        &mut self,
        symbol: &str,
        amount: Decimal,
        price: Decimal,
    ) -> Result<Transaction, WalletError> {
        ensure_positive(amount)?;
        ensure_positive(price)?;
        let cost = amount * price;
        if cost > self.balance {
            warn!(%cost, balance = %self.balance, "buy exceeds balance");
            return Err(WalletError::InsufficientFunds);
        }
        let token = self.token_mut(symbol)?;
        token.balance += amount;
        self.balance -= cost;

        let transaction = Transaction::new(
            TransactionKind::Buy,
            format!("Buy {symbol}"),
            cost,
            Utc::now(),
        )
        .with_description(format!("{amount} {symbol} @ {price}"));
        debug!(%symbol, %amount, %cost, "bought token");
        Ok(self.push_and_recompute(transaction))
    }

    /// Sells `amount` of a token at `price`, crediting the main balance.
    ///
    /// # Errors
    ///
    /// - [`WalletError::TokenNotFound`]
    /// - [`WalletError::InvalidAmount`] - non-positive amount or price.
    /// - [`WalletError::InsufficientTokenBalance`] - amount exceeds the holding.
    pub fn sell_token(
        &mut self,
        symbol: &str,
        amount: Decimal,
        price: Decimal,
    ) -> Result<Transaction, WalletError> {
        ensure_positive(amount)?;
        ensure_positive(price)?;
        let token = self.token_mut(symbol)?;
        if token.balance < amount {
            warn!(%symbol, %amount, held = %token.balance, "sell exceeds holding");
            return Err(WalletError::InsufficientTokenBalance);
        }
        token.balance -= amount;
        let proceeds = amount * price;
        self.balance += proceeds;

        let transaction = Transaction::new(
            TransactionKind::Sell,
            format!("Sell {symbol}"),
            proceeds,
            Utc::now(),
        )
        .with_description(format!("{amount} {symbol} @ {price}"));
        debug!(%symbol, %amount, %proceeds, "sold token");
        Ok(self.push_and_recompute(transaction))
    }

    /// Swaps between two token holdings at the cross-price ratio
    /// `from.price / to.price`. No slippage model; the main balance is not
    /// touched.
    ///
    /// # Errors
    ///
    /// - [`WalletError::TokenNotFound`] - either leg untracked.
    /// - [`WalletError::InvalidAmount`] - non-positive amount, identical
    ///   legs, or a to-token without a positive price.
    /// - [`WalletError::InsufficientTokenBalance`] - amount exceeds the
    ///   from-holding.
    pub fn swap_tokens(
        &mut self,
        from_symbol: &str,
        to_symbol: &str,
        amount: Decimal,
    ) -> Result<Transaction, WalletError> {
        ensure_positive(amount)?;
        if from_symbol == to_symbol {
            return Err(WalletError::InvalidAmount);
        }

        let from = self.token(from_symbol).ok_or(WalletError::TokenNotFound)?;
        let to = self.token(to_symbol).ok_or(WalletError::TokenNotFound)?;
        if from.balance < amount {
            warn!(%from_symbol, %amount, held = %from.balance, "swap exceeds holding");
            return Err(WalletError::InsufficientTokenBalance);
        }
        if to.price <= Decimal::ZERO {
            return Err(WalletError::InvalidAmount);
        }
        let rate = from.price / to.price;
        let to_amount = amount * rate;

        self.token_mut(from_symbol)?.balance -= amount;
        self.token_mut(to_symbol)?.balance += to_amount;

        let transaction = Transaction::new(
            TransactionKind::Swap,
            format!("Swap {from_symbol} to {to_symbol}"),
            amount,
            Utc::now(),
        )
        .with_description(format!("{amount} {from_symbol} -> {to_amount} {to_symbol}"));
        debug!(%from_symbol, %to_symbol, %amount, %to_amount, "swapped tokens");
        Ok(self.push_and_recompute(transaction))
    }

    // ------------------------------------------------------------------
    // Staking
    // ------------------------------------------------------------------

    /// Opens a staking position, moving the staked amount out of the token
    /// holding.
    ///
    /// # Errors
    ///
    /// - [`WalletError::TokenNotFound`]
    /// - [`WalletError::InvalidAmount`] - `amount <= 0`.
    /// - [`WalletError::InsufficientTokenBalance`]
    pub fn add_staking_position(
        &mut self,
        token_symbol: &str,
        amount: Decimal,
        apy: Decimal,
        start_date: NaiveDate,
    ) -> Result<PositionId, WalletError> {
        ensure_positive(amount)?;
        let token = self.token_mut(token_symbol)?;
        if token.balance < amount {
            warn!(%token_symbol, %amount, held = %token.balance, "stake exceeds holding");
            return Err(WalletError::InsufficientTokenBalance);
        }
        token.balance -= amount;

        let position = StakingPosition::new(token_symbol, amount, apy, start_date);
        let id = position.id;
        debug!(%token_symbol, %amount, %id, "opened staking position");
        self.staking_positions.push(position);
        Ok(id)
    }

    /// Closes a staking position, returning principal plus accrued rewards
    /// to the token holding. Returns the payout.
    ///
    /// # Errors
    ///
    /// - [`WalletError::PositionNotFound`]
    /// - [`WalletError::TokenNotFound`] - the staked token is no longer
    ///   tracked.
    pub fn remove_staking_position(&mut self, id: PositionId) -> Result<Decimal, WalletError> {
        let index = self
            .staking_positions
            .iter()
            .position(|p| p.id == id)
            .ok_or(WalletError::PositionNotFound)?;
        let payout = self.staking_positions[index].payout();
        let symbol = self.staking_positions[index].token_symbol.clone();

        self.token_mut(&symbol)?.balance += payout;
        self.staking_positions.remove(index);
        debug!(%symbol, %payout, "closed staking position");
        Ok(payout)
    }

    /// Changes a position's staked amount; the token holding absorbs the
    /// difference.
    ///
    /// # Errors
    ///
    /// - [`WalletError::PositionNotFound`]
    /// - [`WalletError::InvalidAmount`] - new amount non-positive.
    /// - [`WalletError::TokenNotFound`]
    /// - [`WalletError::InsufficientTokenBalance`] - increase exceeds the
    ///   holding.
    pub fn update_staking_position(
        &mut self,
        id: PositionId,
        new_amount: Decimal,
    ) -> Result<(), WalletError> {
        ensure_positive(new_amount)?;
        let position = self
            .staking_positions
            .iter()
            .find(|p| p.id == id)
            .ok_or(WalletError::PositionNotFound)?;
        let symbol = position.token_symbol.clone();
        let delta = new_amount - position.amount;

        let token = self.token_mut(&symbol)?;
        if delta > Decimal::ZERO && token.balance < delta {
            return Err(WalletError::InsufficientTokenBalance);
        }
        token.balance -= delta;

        // Position still exists; the earlier lookup proved it.
        if let Some(position) = self.staking_positions.iter_mut().find(|p| p.id == id) {
            position.amount = new_amount;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Contacts
    // ------------------------------------------------------------------

    pub fn add_contact(&mut self, draft: ContactDraft) -> ContactId {
        let contact = Contact::from_draft(draft);
        let id = contact.id;
        self.contacts.push(contact);
        id
    }

    // ------------------------------------------------------------------
    // Budget
    // ------------------------------------------------------------------

    /// Sets a category's budget ceiling.
    ///
    /// # Errors
    ///
    /// - [`WalletError::CategoryNotFound`]
    /// - [`WalletError::InvalidAmount`] - negative limit (zero is allowed).
    pub fn set_budget_limit(
        &mut self,
        category_id: CategoryId,
        limit: Decimal,
    ) -> Result<(), WalletError> {
        if limit < Decimal::ZERO {
            return Err(WalletError::InvalidAmount);
        }
        let category = self
            .budget_categories
            .iter_mut()
            .find(|c| c.id == category_id)
            .ok_or(WalletError::CategoryNotFound)?;
        category.limit = limit;
        Ok(())
    }

    /// Adds a budget category and computes its spend from the current log.
    ///
    /// # Errors
    ///
    /// [`WalletError::InvalidAmount`] - negative limit.
    pub fn add_budget_category(
        &mut self,
        draft: BudgetCategoryDraft,
    ) -> Result<CategoryId, WalletError> {
        if draft.limit < Decimal::ZERO {
            return Err(WalletError::InvalidAmount);
        }
        let category = BudgetCategory::from_draft(draft);
        let id = category.id;
        debug!(category = %category.name, %id, "added budget category");
        self.budget_categories.push(category);
        self.recompute_spending();
        Ok(id)
    }

    /// Removes a budget category.
    ///
    /// # Errors
    ///
    /// [`WalletError::CategoryNotFound`] for an unknown id.
    pub fn remove_budget_category(&mut self, category_id: CategoryId) -> Result<(), WalletError> {
        let index = self
            .budget_categories
            .iter()
            .position(|c| c.id == category_id)
            .ok_or(WalletError::CategoryNotFound)?;
        self.budget_categories.remove(index);
        Ok(())
    }

    /// Recomputes every category's spend from the log for the current month.
    /// Idempotent: repeated calls with an unchanged log are no-ops.
    pub fn recompute_spending(&mut self) {
        self.recompute_spending_at(Utc::now().date_naive());
    }

    /// Recompute relative to an explicit date; the month window follows it.
    pub fn recompute_spending_at(&mut self, today: NaiveDate) {
        budget::recompute_spending(&mut self.budget_categories, &self.ledger, today);
    }

    // ------------------------------------------------------------------
    // Snapshot lifecycle
    // ------------------------------------------------------------------

    /// Captures the full state as a serializable snapshot.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            balance: self.balance,
            transactions: self.ledger.transactions().to_vec(),
            tokens: self.tokens.clone(),
            cashback: self.cashback,
            staking_positions: self.staking_positions.clone(),
            contacts: self.contacts.clone(),
            bills: self.bills.clone(),
            budget_categories: self.budget_categories.clone(),
            error: None,
        }
    }

    /// Rehydrates a wallet from a snapshot, then recomputes spending
    /// unconditionally - stored `spent` values are advisory, the log wins.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut wallet = Self {
            balance: snapshot.balance,
            ledger: Ledger::from_transactions(snapshot.transactions),
            tokens: snapshot.tokens,
            cashback: snapshot.cashback,
            staking_positions: snapshot.staking_positions,
            contacts: snapshot.contacts,
            bills: snapshot.bills,
            budget_categories: snapshot.budget_categories,
        };
        wallet.recompute_spending();
        wallet
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn bill_mut(&mut self, bill_id: BillId) -> Result<&mut Bill, WalletError> {
        self.bills
            .iter_mut()
            .find(|b| b.id == bill_id)
            .ok_or(WalletError::BillNotFound)
    }

    fn token_mut(&mut self, symbol: &str) -> Result<&mut Token, WalletError> {
        self.tokens
            .iter_mut()
            .find(|t| t.symbol == symbol)
            .ok_or(WalletError::TokenNotFound)
    }

    /// Appends to the log and recomputes derived spend in the same call, so
    /// observers never see the two out of sync.
    fn push_and_recompute(&mut self, transaction: Transaction) -> Transaction {
        self.ledger.append(transaction.clone());
        self.recompute_spending();
        transaction
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared positivity check for monetary inputs.
fn ensure_positive(amount: Decimal) -> Result<(), WalletError> {
    if amount <= Decimal::ZERO {
        return Err(WalletError::InvalidAmount);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_autopay_creates_default_settings() {
        let mut wallet = Wallet::new();
        let bill_id = wallet
            .register_bill(BillDraft {
                name: "Internet".into(),
                amount: dec!(59.99),
                due_date: "2025-06-15".into(),
                category: "Utilities".into(),
                ..BillDraft::default()
            })
            .unwrap();

        wallet.toggle_auto_pay(bill_id).unwrap();
        let settings = wallet.bill(bill_id).unwrap().auto_pay.as_ref().unwrap();
        assert!(settings.enabled);
        assert_eq!(settings.payment_method, DEFAULT_PAYMENT_METHOD);
        assert_eq!(settings.payment_date, DEFAULT_PAYMENT_DAY);
        assert!(settings.next_payment_date_raw.is_some());

        wallet.toggle_auto_pay(bill_id).unwrap();
        let settings = wallet.bill(bill_id).unwrap().auto_pay.as_ref().unwrap();
        assert!(!settings.enabled);
        assert_eq!(settings.next_payment_date_raw, None);
        assert_eq!(settings.payment_date, DEFAULT_PAYMENT_DAY);
    }

    #[test]
    fn autopay_patch_rejects_out_of_range_day() {
        let mut wallet = Wallet::new();
        let bill_id = wallet
            .register_bill(BillDraft {
                name: "Internet".into(),
                amount: dec!(59.99),
                due_date: "2025-06-15".into(),
                category: "Utilities".into(),
                ..BillDraft::default()
            })
            .unwrap();

        let patch = AutoPayPatch {
            payment_date: Some(32),
            ..AutoPayPatch::default()
        };
        assert_eq!(
            wallet.update_auto_pay_settings(bill_id, patch),
            Err(WalletError::InvalidAmount)
        );
    }

    #[test]
    fn unknown_ids_surface_typed_errors() {
        let mut wallet = Wallet::new();
        assert_eq!(
            wallet.pay_bill(BillId::new(), dec!(1), "Utilities"),
            Err(WalletError::InsufficientFunds),
            "funds are checked before the bill lookup"
        );

        wallet.deposit_money(dec!(10), None).unwrap();
        assert_eq!(
            wallet.pay_bill(BillId::new(), dec!(1), "Utilities"),
            Err(WalletError::BillNotFound)
        );
        assert_eq!(wallet.toggle_auto_pay(BillId::new()), Err(WalletError::BillNotFound));
        assert_eq!(
            wallet.set_budget_limit(CategoryId::new(), dec!(10)),
            Err(WalletError::CategoryNotFound)
        );
        assert_eq!(
            wallet.remove_staking_position(PositionId::new()),
            Err(WalletError::PositionNotFound)
        );
        assert_eq!(
            wallet.buy_token("BTC", dec!(1), dec!(1)),
            Err(WalletError::TokenNotFound)
        );
    }

    #[test]
    fn failed_operation_leaves_state_untouched() {
        let mut wallet = Wallet::new();
        wallet.deposit_money(dec!(50), None).unwrap();
        let before_len = wallet.transactions().len();

        assert_eq!(
            wallet.send_money("Alice", dec!(100), None),
            Err(WalletError::InsufficientFunds)
        );
        assert_eq!(wallet.balance(), dec!(50));
        assert_eq!(wallet.transactions().len(), before_len);
    }

    #[test]
    fn swap_rejects_identical_legs() {
        let mut wallet = Wallet::new();
        wallet.track_token(Token::new("btc", "Bitcoin", "BTC", dec!(1), dec!(60000)));
        assert_eq!(
            wallet.swap_tokens("BTC", "BTC", dec!(0.5)),
            Err(WalletError::InvalidAmount)
        );
    }
}
