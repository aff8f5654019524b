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

//! Error types for wallet operations.
//!
//! Every failure is a recoverable value: an operation that fails validation
//! leaves the wallet state untouched and returns the reason to the caller.
//! Nothing in this crate panics on bad input.

use thiserror::Error;

/// Wallet operation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// Amount is zero, negative, or otherwise out of range
    #[error("invalid amount (must be positive)")]
    InvalidAmount,

    /// Send or buy would exceed the main balance
    #[error("insufficient funds")]
    InsufficientFunds,

    /// Redemption would exceed the cashback balance
    #[error("insufficient cashback balance")]
    InsufficientCashback,

    /// Sell, swap, or stake would exceed a token holding
    #[error("insufficient token balance")]
    InsufficientTokenBalance,

    /// Referenced bill does not exist
    #[error("bill not found")]
    BillNotFound,

    /// Referenced budget category does not exist
    #[error("budget category not found")]
    CategoryNotFound,

    /// Referenced token symbol is not held in the wallet
    #[error("token not found")]
    TokenNotFound,

    /// Referenced staking position does not exist
    #[error("staking position not found")]
    PositionNotFound,

    /// Referenced contact does not exist
    #[error("contact not found")]
    ContactNotFound,

    /// A date string could not be parsed by any accepted format
    #[error("unparseable date")]
    UnparseableDate,
}

#[cfg(test)]
mod tests {
    use super::WalletError;

    #[test]
    fn error_display_messages() {
        assert_eq!(
            WalletError::InvalidAmount.to_string(),
            "invalid amount (must be positive)"
        );
        assert_eq!(WalletError::InsufficientFunds.to_string(), "insufficient funds");
        assert_eq!(
            WalletError::InsufficientCashback.to_string(),
            "insufficient cashback balance"
        );
        assert_eq!(
            WalletError::InsufficientTokenBalance.to_string(),
            "insufficient token balance"
        );
        assert_eq!(WalletError::BillNotFound.to_string(), "bill not found");
        assert_eq!(WalletError::CategoryNotFound.to_string(), "budget category not found");
        assert_eq!(WalletError::TokenNotFound.to_string(), "token not found");
        assert_eq!(WalletError::PositionNotFound.to_string(), "staking position not found");
        assert_eq!(WalletError::UnparseableDate.to_string(), "unparseable date");
    }

    #[test]
    fn errors_are_cloneable() {
        let error = WalletError::InsufficientCashback;
        let cloned = error.clone();
        assert_eq!(error, cloned);
    }
}
