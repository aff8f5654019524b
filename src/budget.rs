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

//! Budget categories and spend derivation.
//!
//! `spent` is never incremented in place. Every recompute recalculates every
//! category from scratch over the current calendar month of the log, so
//! duplicated or offsetting entries can never drift the totals - calling
//! [`recompute_spending`] twice with an unchanged log is a no-op.

use crate::base::CategoryId;
use crate::ledger::Ledger;
use crate::matching;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Color band for budget displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
    Normal,
    /// At or above 80% of the limit.
    Warning,
    /// At or above the limit.
    Critical,
}

/// Banding used uniformly across budget displays.
pub fn status_for(percentage: Decimal) -> BudgetStatus {
    if percentage >= dec!(100) {
        BudgetStatus::Critical
    } else if percentage >= dec!(80) {
        BudgetStatus::Warning
    } else {
        BudgetStatus::Normal
    }
}

/// A user-defined spending bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetCategory {
    pub id: CategoryId,
    /// Stable semantic key ("food", "utilities", ...) referenced by the
    /// keyword-bucket matcher; derived from the name for user categories.
    pub slug: String,
    pub name: String,
    pub limit: Decimal,
    /// Derived only; replaced wholesale by [`recompute_spending`].
    pub spent: Decimal,
    pub color: String,
    pub icon: String,
    /// Transaction-category label this bucket matches against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_category: Option<String>,
}

/// Fields supplied when adding a category; id and spend are assigned by the
/// engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetCategoryDraft {
    pub name: String,
    pub limit: Decimal,
    pub color: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_category: Option<String>,
}

impl BudgetCategory {
    pub fn from_draft(draft: BudgetCategoryDraft) -> Self {
        let slug = slugify(&draft.name);
        Self {
            id: CategoryId::new(),
            slug,
            name: draft.name,
            limit: draft.limit,
            spent: Decimal::ZERO,
            color: draft.color,
            icon: draft.icon,
            transaction_category: draft.transaction_category,
        }
    }

    pub fn remaining(&self) -> Decimal {
        self.limit - self.spent
    }

    /// Spend as a percentage of the limit; 0 when the limit is 0.
    pub fn percentage(&self) -> Decimal {
        if self.limit.is_zero() {
            Decimal::ZERO
        } else {
            self.spent / self.limit * dec!(100)
        }
    }

    pub fn status(&self) -> BudgetStatus {
        status_for(self.percentage())
    }
}

/// Lowercase kebab-case key from a display name: "Food & Dining" → "food-dining".
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if (c.is_whitespace() || c == '-' || c == '_') && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

/// Replaces every category's `spent` with the sum of this month's matching
/// outflows. Total and idempotent: no deltas, no accumulation.
pub fn recompute_spending(categories: &mut [BudgetCategory], ledger: &Ledger, today: NaiveDate) {
    for category in categories.iter_mut() {
        let Some(mapped) = category.transaction_category.as_deref() else {
            category.spent = Decimal::ZERO;
            continue;
        };

        let spent = ledger
            .month_outflows(today.year(), today.month())
            .filter(|tx| {
                tx.category
                    .as_deref()
                    .is_some_and(|cat| matching::label_matches(cat, mapped, &category.slug).is_some())
            })
            .map(|tx| tx.amount)
            .sum();
        category.spent = spent;
    }
}

/// Total spend over total budget as a percentage; 0 when nothing is budgeted.
pub fn overall_percentage(categories: &[BudgetCategory]) -> Decimal {
    let total_budget: Decimal = categories.iter().map(|c| c.limit).sum();
    if total_budget.is_zero() {
        return Decimal::ZERO;
    }
    let total_spent: Decimal = categories.iter().map(|c| c.spent).sum();
    total_spent / total_budget * dec!(100)
}

/// The starter category set for a fresh wallet, with the mapped labels the
/// mock transaction sources use.
pub fn default_categories() -> Vec<BudgetCategory> {
    let defaults: [(&str, &str, i64, &str, &str, &str); 6] = [
        ("utilities", "Utilities", 200, "#4A8FE7", "Zap", "Utilities"),
        ("food", "Food & Dining", 400, "#FF6B6B", "Coffee", "Food & Drink"),
        ("entertainment", "Entertainment", 150, "#9B59B6", "Music", "Entertainment"),
        ("transportation", "Transportation", 300, "#F39C12", "Car", "Transportation"),
        ("shopping", "Shopping", 250, "#E74C3C", "ShoppingBag", "Shopping"),
        ("health", "Health & Fitness", 100, "#2ECC71", "Heart", "Health & Fitness"),
    ];

    defaults
        .into_iter()
        .map(|(slug, name, limit, color, icon, mapped)| BudgetCategory {
            id: CategoryId::new(),
            slug: slug.to_string(),
            name: name.to_string(),
            limit: Decimal::from(limit),
            spent: Decimal::ZERO,
            color: color.to_string(),
            icon: icon.to_string(),
            transaction_category: Some(mapped.to_string()),
        })
        .collect()
}
