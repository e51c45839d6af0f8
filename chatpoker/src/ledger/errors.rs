//! Ledger error types.

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::models::TableKey;
use crate::game::entities::Chips;

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum LedgerError {
    #[error("insufficient balance: available {available}, required {required}")]
    InsufficientBalance { available: Chips, required: Chips },

    #[error("amount must be positive")]
    InvalidAmount,

    #[error("balance overflow")]
    BalanceOverflow,

    #[error("owner already has the maximum of {limit} tables")]
    TableLimitReached { limit: usize },

    #[error("no table named {0}")]
    TableNotFound(TableKey),

    #[error("table {0} already exists")]
    TableExists(TableKey),

    #[error("free chips not available until {0}")]
    FaucetNotAvailable(DateTime<Utc>),
}

impl LedgerError {
    /// Seconds until the faucet opens again, if this is a cooldown error.
    #[must_use]
    pub fn retry_after_secs(&self) -> Option<i64> {
        match self {
            Self::FaucetNotAvailable(next) => Some((*next - Utc::now()).num_seconds().max(0)),
            _ => None,
        }
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
