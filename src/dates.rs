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

//! Bill date handling: free-text due-date parsing, day counts, and the
//! urgency policy.
//!
//! Due dates arrive as free text from several sources, so parsing accepts
//! three shapes in priority order, then falls back to generic construction:
//!
//! 1. `"May 15, 2025"` - month name (full or 3-letter, plus `Sept`), comma form
//! 2. `"05/15/2025"` - `MM/DD/YYYY` slash form
//! 3. `"2025-05-15"` - `YYYY-MM-DD` dash form
//! 4. fallback: an RFC 3339 datetime or plain ISO date string
//!
//! A string none of these accept parses to [`WalletError::UnparseableDate`];
//! callers degrade (skip the bill in date filters, treat it as non-urgent)
//! instead of aborting whatever larger operation they were doing.

use crate::error::WalletError;
use chrono::{DateTime, Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Urgency classification for a bill relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DueStatus {
    /// Due date already passed.
    PastDue,
    /// Due within the next three days (today counts).
    Urgent,
    Normal,
}

/// Month name to 1-based month number. Accepts full names, 3-letter
/// abbreviations, and `Sept`, case-insensitively.
fn month_number(name: &str) -> Option<u32> {
    let month = match name.to_ascii_lowercase().as_str() {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sep" | "sept" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// `"May 15, 2025"` - month-name comma form.
fn parse_comma_form(s: &str) -> Option<NaiveDate> {
    let (month_day, year) = s.split_once(',')?;
    let year: i32 = year.trim().parse().ok()?;

    let mut parts = month_day.trim().split_whitespace();
    let month = month_number(parts.next()?)?;
    let day: u32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    NaiveDate::from_ymd_opt(year, month, day)
}

/// `"MM/DD/YYYY"` - slash form.
fn parse_slash_form(s: &str) -> Option<NaiveDate> {
    let mut parts = s.split('/');
    let month: u32 = parts.next()?.trim().parse().ok()?;
    let day: u32 = parts.next()?.trim().parse().ok()?;
    let year: i32 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    NaiveDate::from_ymd_opt(year, month, day)
}

/// `"YYYY-MM-DD"` - dash form.
fn parse_dash_form(s: &str) -> Option<NaiveDate> {
    let mut parts = s.split('-');
    let year: i32 = parts.next()?.trim().parse().ok()?;
    let month: u32 = parts.next()?.trim().parse().ok()?;
    let day: u32 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parses a free-text due date.
///
/// # Errors
///
/// Returns [`WalletError::UnparseableDate`] when no accepted format matches.
pub fn parse_due_date(s: &str) -> Result<NaiveDate, WalletError> {
    let s = s.trim();

    let parsed = if s.contains(',') {
        parse_comma_form(s)
    } else if s.contains('/') {
        parse_slash_form(s)
    } else if s.contains('-') && !s.contains('T') {
        parse_dash_form(s)
    } else {
        // Generic fallback: transaction timestamps and other ISO strings.
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.date_naive())
            .ok()
            .or_else(|| s.parse::<NaiveDate>().ok())
    };

    parsed.ok_or(WalletError::UnparseableDate)
}

/// Whole days from `today` until `due`, negative once the date has passed.
///
/// Both operands are calendar dates (midnights), so the difference is exact
/// and timezone skew cannot shift a bill across a day boundary.
pub fn days_until(due: NaiveDate, today: NaiveDate) -> i64 {
    (due - today).num_days()
}

/// Urgency policy over a day count.
pub fn due_status(days_until_due: i64) -> DueStatus {
    if days_until_due < 0 {
        DueStatus::PastDue
    } else if days_until_due <= 3 {
        DueStatus::Urgent
    } else {
        DueStatus::Normal
    }
}

/// Next occurrence of a day-of-month autopay schedule.
///
/// If `day_of_month` has already come (or is today), the charge lands next
/// month; otherwise this month. Days past the end of the target month clamp
/// to its last day, so a day-31 schedule charges Feb 28 rather than rolling
/// into March.
pub fn next_autopay_date(day_of_month: u32, today: NaiveDate) -> NaiveDate {
    let (year, month) = if day_of_month <= today.day() {
        if today.month() == 12 {
            (today.year() + 1, 1)
        } else {
            (today.year(), today.month() + 1)
        }
    } else {
        (today.year(), today.month())
    };

    clamped_date(year, month, day_of_month)
}

/// `year-month-day`, with the day clamped into the month's length.
fn clamped_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day.max(1)).unwrap_or_else(|| {
        // Day beyond month end. The first of next month minus one day is
        // always valid.
        let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
        NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .expect("first of month is always valid")
            .checked_sub_days(Days::new(1))
            .expect("month start has a predecessor")
    })
}

/// Long-form display string for a scheduled date, e.g. `"June 10, 2025"`.
///
/// Matches the shape the human-readable autopay field has always stored;
/// everything downstream that needs arithmetic uses the raw date instead.
pub fn long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}
