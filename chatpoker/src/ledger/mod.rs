//! Chip ledger: player balances, stored table options and enabled channels.
//!
//! Tables talk to the ledger only through the [`Ledger`] trait. Buy-ins
//! debit it, cash-outs credit it; chips on the felt belong to the table
//! until then. [`MemoryLedger`] keeps everything in process memory.
//!
//! ## Example
//!
//! ```
//! use chatpoker::ledger::{Ledger, LedgerConfig, MemoryLedger};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ledger = MemoryLedger::new(LedgerConfig::default());
//!     let claim = ledger.claim_free_chips(7).await?;
//!     assert_eq!(ledger.get_chips(7).await?, claim.amount);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod memory;
pub mod models;

pub use errors::{LedgerError, LedgerResult};
pub use memory::{LedgerConfig, MemoryLedger};
pub use models::{ChannelId, EntryDirection, EntryType, FreeChipsClaim, LedgerEntry, TableKey};

use async_trait::async_trait;

use crate::{
    game::entities::{Chips, PlayerId},
    table::TableOptions,
};

/// Persistent chip and table-option store used by table sessions.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Current balance; unknown players have zero chips.
    async fn get_chips(&self, player: PlayerId) -> LedgerResult<Chips>;

    /// Credit `amount` and return the new balance.
    async fn add_chips(&self, player: PlayerId, amount: Chips) -> LedgerResult<Chips>;

    /// Debit `amount` and return the new balance. Fails without touching the
    /// balance when it does not cover `amount`.
    async fn remove_chips(&self, player: PlayerId, amount: Chips) -> LedgerResult<Chips>;

    async fn set_chips(&self, player: PlayerId, amount: Chips) -> LedgerResult<()>;

    /// Store options for a new table. Fails once the owner reaches the
    /// configured table limit.
    async fn create_table(&self, key: &TableKey, options: TableOptions) -> LedgerResult<()>;

    async fn table_options(&self, key: &TableKey) -> LedgerResult<TableOptions>;

    async fn delete_table(&self, key: &TableKey) -> LedgerResult<()>;

    async fn channel_enabled(&self, channel: ChannelId) -> LedgerResult<bool>;

    async fn enable_channel(&self, channel: ChannelId) -> LedgerResult<()>;

    async fn disable_channel(&self, channel: ChannelId) -> LedgerResult<()>;

    /// Hand out the periodic free chips, subject to a per-player cooldown.
    async fn claim_free_chips(&self, player: PlayerId) -> LedgerResult<FreeChipsClaim>;

    /// Move up to `amount` chips from `giver` to `receiver`. The amount is
    /// clamped to the giver's balance; returns what actually moved.
    async fn transfer(
        &self,
        giver: PlayerId,
        receiver: PlayerId,
        amount: Chips,
    ) -> LedgerResult<Chips>;

    /// Most recent entries for `player`, newest first.
    async fn entries(&self, player: PlayerId, limit: usize) -> LedgerResult<Vec<LedgerEntry>>;
}
