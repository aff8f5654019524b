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

//! Category label matching.
//!
//! Transaction categories and budget mappings are free text from several
//! sources ("Food & Drink", "Food & Dining", "food"), so matching runs a
//! pipeline of three strategies, first hit wins:
//!
//! 1. [`exact`](MatchTier::Exact) - trimmed, case-insensitive equality
//! 2. [`normalized`](MatchTier::Normalized) - strip `&`, whitespace, `-`,
//!    `_`, lowercase, then substring containment in either direction
//! 3. [`keyword`](MatchTier::Keyword) - a fixed table of topic buckets
//!
//! The loose containment tiers are intentional and load-bearing: mock and
//! imported labels never agree on punctuation. They are also a known source
//! of false positives ("gas" the fuel vs. "gas" the utility), which is why
//! each tier is separately named and testable rather than folded into one
//! opaque comparison.

/// Which strategy matched a pair of labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    Exact,
    Normalized,
    Keyword,
}

/// A topic bucket for tier-3 matching.
///
/// `name` doubles as the bucket's reference key: a budget category only
/// matches through a bucket when its slug or mapped label mentions the
/// bucket name.
#[derive(Debug, Clone, Copy)]
pub struct KeywordBucket {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
}

/// The keyword table, data not code, so buckets can be tested one by one.
pub const KEYWORD_BUCKETS: &[KeywordBucket] = &[
    KeywordBucket {
        name: "food",
        keywords: &["food", "dining", "drink", "restaurant", "grocery"],
    },
    KeywordBucket {
        name: "utilities",
        keywords: &["utilities", "electric", "water", "gas", "internet", "phone", "mobile"],
    },
    KeywordBucket {
        name: "entertainment",
        keywords: &["entertainment", "movie", "music", "streaming", "netflix", "spotify", "hulu"],
    },
    KeywordBucket {
        name: "transportation",
        keywords: &["transportation", "uber", "gas", "parking", "fuel"],
    },
    KeywordBucket {
        name: "shopping",
        keywords: &["shopping", "amazon", "store", "retail"],
    },
    KeywordBucket {
        name: "health",
        keywords: &["health", "fitness", "medical", "gym", "doctor"],
    },
];

/// Strips `&`, whitespace, hyphens, and underscores, lowercasing the rest.
///
/// `"Food & Drink"` and `"food-drink"` both normalize to `"fooddrink"`.
pub fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| !matches!(c, '&' | '-' | '_') && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Tier 1: trimmed, case-insensitive equality.
fn exact_match(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Tier 2: normalized containment in either direction.
///
/// Empty normalized forms never match; a label of pure punctuation must not
/// contain-match everything.
fn normalized_containment(a: &str, b: &str) -> bool {
    let na = normalize_label(a);
    let nb = normalize_label(b);
    if na.is_empty() || nb.is_empty() {
        return false;
    }
    na.contains(&nb) || nb.contains(&na)
}

/// Tier 3: keyword buckets.
///
/// A pair matches through a bucket when any bucket keyword appears in either
/// normalized label AND the category side (slug or mapped label) references
/// the bucket name.
fn keyword_match(tx_label: &str, mapped_label: &str, category_slug: &str) -> bool {
    let tx = normalize_label(tx_label);
    let mapped = normalize_label(mapped_label);
    let slug = normalize_label(category_slug);

    KEYWORD_BUCKETS.iter().any(|bucket| {
        let keyword_hit = bucket
            .keywords
            .iter()
            .any(|kw| tx.contains(kw) || mapped.contains(kw));
        keyword_hit && (slug.contains(bucket.name) || mapped.contains(bucket.name))
    })
}

/// Runs the full pipeline for budget matching.
///
/// `tx_label` is the transaction's category, `mapped_label` the budget
/// category's mapped transaction-category label, and `category_slug` the
/// budget category's stable slug ("food", "utilities", ...).
pub fn label_matches(tx_label: &str, mapped_label: &str, category_slug: &str) -> Option<MatchTier> {
    if exact_match(tx_label, mapped_label) {
        Some(MatchTier::Exact)
    } else if normalized_containment(tx_label, mapped_label) {
        Some(MatchTier::Normalized)
    } else if keyword_match(tx_label, mapped_label, category_slug) {
        Some(MatchTier::Keyword)
    } else {
        None
    }
}

/// Two-tier comparison for ledger category queries, where there is no budget
/// category (and so no slug) on the other side.
pub fn labels_overlap(a: &str, b: &str) -> bool {
    exact_match(a, b) || normalized_containment(a, b)
}
