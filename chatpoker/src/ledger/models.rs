//! Ledger data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::game::entities::{Chips, PlayerId};

/// Chat channel identifier.
pub type ChannelId = u64;

/// Tables are stored per owner under a name of the owner's choosing.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct TableKey {
    pub owner: PlayerId,
    pub name: String,
}

impl TableKey {
    #[must_use]
    pub fn new(owner: PlayerId, name: impl Into<String>) -> Self {
        Self {
            owner,
            name: name.into(),
        }
    }
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryDirection {
    Debit,
    Credit,
}

impl fmt::Display for EntryDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    Adjustment,
    FreeChips,
    Reset,
    Transfer,
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Adjustment => "adjustment",
            Self::FreeChips => "free_chips",
            Self::Reset => "reset",
            Self::Transfer => "transfer",
        };
        write!(f, "{repr}")
    }
}

/// One balance change, newest last in the ledger's history.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub player: PlayerId,
    pub amount: Chips,
    pub balance_after: Chips,
    pub direction: EntryDirection,
    pub entry_type: EntryType,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FreeChipsClaim {
    pub player: PlayerId,
    pub amount: Chips,
    pub balance_after: Chips,
    pub claimed_at: DateTime<Utc>,
    pub next_claim_at: DateTime<Utc>,
}
