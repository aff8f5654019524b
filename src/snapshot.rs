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

//! Snapshot persistence.
//!
//! The wallet's only I/O boundary: one versionless JSON blob, written
//! wholesale after each mutation settles and read wholesale at startup.
//! Rehydration always ends with a spending recompute, so a stale or
//! hand-edited `spent` value in the file can never survive a load.

use crate::bill::Bill;
use crate::budget::BudgetCategory;
use crate::contact::Contact;
use crate::token::{StakingPosition, Token};
use crate::transaction::Transaction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Errors at the persistence boundary.
///
/// Kept separate from [`WalletError`](crate::WalletError): these are I/O
/// faults, not validation outcomes, and are not comparable or cloneable.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// The full persisted state.
///
/// The `error` field is carried for compatibility with the historical
/// snapshot shape; mutators return results instead of storing failures, so
/// it is always `null` on save and ignored on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub balance: Decimal,
    pub transactions: Vec<Transaction>,
    pub tokens: Vec<Token>,
    pub cashback: Decimal,
    pub staking_positions: Vec<StakingPosition>,
    pub contacts: Vec<Contact>,
    pub bills: Vec<Bill>,
    pub budget_categories: Vec<BudgetCategory>,
    #[serde(default)]
    pub error: Option<String>,
}

/// The opaque blob store the wallet persists through.
pub trait SnapshotStore {
    /// Reads the stored snapshot; `None` when nothing was ever saved.
    fn load(&self) -> Result<Option<Snapshot>, SnapshotError>;

    /// Overwrites the stored snapshot wholesale.
    fn save(&mut self, snapshot: &Snapshot) -> Result<(), SnapshotError>;
}

/// Snapshot file on disk, pretty-printed JSON.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl SnapshotStore for FileStore {
    fn load(&self) -> Result<Option<Snapshot>, SnapshotError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let raw = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

/// In-memory store for tests and previews. Stores the serialized form so a
/// round trip exercises the real encoding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blob: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<Snapshot>, SnapshotError> {
        match &self.blob {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        self.blob = Some(serde_json::to_string(snapshot)?);
        Ok(())
    }
}
