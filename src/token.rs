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

//! Token holdings and staking positions.

use crate::base::PositionId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Symbol of the reward token cashback converts into.
pub const REWARD_TOKEN_SYMBOL: &str = "LCRA";

/// Bonus multiplier applied when redeeming cashback into the reward token.
pub fn reward_token_bonus() -> Decimal {
    dec!(1.05)
}

/// Unit price assumed for the reward token when no holding carries one.
pub fn reward_token_fallback_price() -> Decimal {
    dec!(0.03)
}

/// A token holding: balance plus display metadata passed through to the UI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub balance: Decimal,
    pub price: Decimal,
    /// 24h price change percentage, display only.
    pub change: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Token {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        symbol: impl Into<String>,
        balance: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            symbol: symbol.into(),
            balance,
            price,
            change: Decimal::ZERO,
            icon_url: None,
            color: None,
        }
    }
}

/// A staked amount of one token, accruing rewards until removal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StakingPosition {
    pub id: PositionId,
    pub token_symbol: String,
    pub amount: Decimal,
    /// Annual percentage yield, display only; rewards accrue externally.
    pub apy: Decimal,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub rewards: Decimal,
}

impl StakingPosition {
    pub fn new(
        token_symbol: impl Into<String>,
        amount: Decimal,
        apy: Decimal,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: PositionId::new(),
            token_symbol: token_symbol.into(),
            amount,
            apy,
            start_date,
            end_date: None,
            rewards: Decimal::ZERO,
        }
    }

    /// Principal plus accrued rewards, returned to the holding on removal.
    pub fn payout(&self) -> Decimal {
        self.amount + self.rewards
    }
}
