//! In-process ledger.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    Ledger,
    errors::{LedgerError, LedgerResult},
    models::{ChannelId, EntryDirection, EntryType, FreeChipsClaim, LedgerEntry, TableKey},
};
use crate::{
    game::entities::{Chips, PlayerId},
    table::TableOptions,
};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LedgerConfig {
    pub free_chips: Chips,
    pub free_chips_cooldown: Duration,
    pub max_tables_per_owner: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            free_chips: 1000,
            free_chips_cooldown: Duration::hours(1),
            max_tables_per_owner: 3,
        }
    }
}

impl LedgerConfig {
    /// Read `FREE_CHIPS`, `FREE_CHIPS_COOLDOWN_SECS` and
    /// `MAX_TABLES_PER_OWNER`, falling back to the defaults for anything
    /// missing or unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let free_chips = std::env::var("FREE_CHIPS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.free_chips);

        let free_chips_cooldown = std::env::var("FREE_CHIPS_COOLDOWN_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map_or(defaults.free_chips_cooldown, Duration::seconds);

        let max_tables_per_owner = std::env::var("MAX_TABLES_PER_OWNER")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_tables_per_owner);

        Self {
            free_chips,
            free_chips_cooldown,
            max_tables_per_owner,
        }
    }
}

/// Entries kept per player; older ones are dropped.
pub const ENTRIES_PER_PLAYER: usize = 100;

#[derive(Debug, Default)]
struct LedgerState {
    balances: HashMap<PlayerId, Chips>,
    entries: HashMap<PlayerId, VecDeque<LedgerEntry>>,
    next_claims: HashMap<PlayerId, DateTime<Utc>>,
    tables: BTreeMap<TableKey, TableOptions>,
    channels: HashSet<ChannelId>,
}

impl LedgerState {
    fn balance(&self, player: PlayerId) -> Chips {
        self.balances.get(&player).copied().unwrap_or(0)
    }

    fn record(
        &mut self,
        player: PlayerId,
        amount: Chips,
        direction: EntryDirection,
        entry_type: EntryType,
        description: Option<String>,
    ) {
        let entry = LedgerEntry {
            id: Uuid::new_v4(),
            player,
            amount,
            balance_after: self.balance(player),
            direction,
            entry_type,
            description,
            created_at: Utc::now(),
        };
        let history = self.entries.entry(player).or_default();
        if history.len() == ENTRIES_PER_PLAYER {
            history.pop_front();
        }
        history.push_back(entry);
    }

    fn credit(
        &mut self,
        player: PlayerId,
        amount: Chips,
        entry_type: EntryType,
        description: Option<String>,
    ) -> LedgerResult<Chips> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        let balance = self
            .balance(player)
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow)?;
        self.balances.insert(player, balance);
        self.record(player, amount, EntryDirection::Credit, entry_type, description);
        Ok(balance)
    }

    fn debit(
        &mut self,
        player: PlayerId,
        amount: Chips,
        entry_type: EntryType,
        description: Option<String>,
    ) -> LedgerResult<Chips> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        let available = self.balance(player);
        let balance = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                available,
                required: amount,
            })?;
        self.balances.insert(player, balance);
        self.record(player, amount, EntryDirection::Debit, entry_type, description);
        Ok(balance)
    }
}

/// Ledger kept in process memory behind a single lock, so every operation
/// is atomic with respect to the others.
#[derive(Debug)]
pub struct MemoryLedger {
    config: LedgerConfig,
    state: RwLock<LedgerState>,
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

impl MemoryLedger {
    #[must_use]
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            state: RwLock::new(LedgerState::default()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Sum of every balance held.
    pub async fn total_balance(&self) -> u64 {
        let state = self.state.read().await;
        state.balances.values().map(|&chips| u64::from(chips)).sum()
    }

    /// Stored table keys for `owner`.
    pub async fn tables_of(&self, owner: PlayerId) -> Vec<TableKey> {
        let state = self.state.read().await;
        state
            .tables
            .keys()
            .filter(|key| key.owner == owner)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn get_chips(&self, player: PlayerId) -> LedgerResult<Chips> {
        Ok(self.state.read().await.balance(player))
    }

    async fn add_chips(&self, player: PlayerId, amount: Chips) -> LedgerResult<Chips> {
        let mut state = self.state.write().await;
        state.credit(player, amount, EntryType::Adjustment, None)
    }

    async fn remove_chips(&self, player: PlayerId, amount: Chips) -> LedgerResult<Chips> {
        let mut state = self.state.write().await;
        state.debit(player, amount, EntryType::Adjustment, None)
    }

    async fn set_chips(&self, player: PlayerId, amount: Chips) -> LedgerResult<()> {
        let mut state = self.state.write().await;
        let previous = state.balances.insert(player, amount).unwrap_or(0);
        let direction = if amount >= previous {
            EntryDirection::Credit
        } else {
            EntryDirection::Debit
        };
        state.record(
            player,
            amount.abs_diff(previous),
            direction,
            EntryType::Reset,
            Some(format!("balance set to {amount}")),
        );
        Ok(())
    }

    async fn create_table(&self, key: &TableKey, options: TableOptions) -> LedgerResult<()> {
        let mut state = self.state.write().await;
        if state.tables.contains_key(key) {
            return Err(LedgerError::TableExists(key.clone()));
        }
        let owned = state.tables.keys().filter(|k| k.owner == key.owner).count();
        if owned >= self.config.max_tables_per_owner {
            return Err(LedgerError::TableLimitReached {
                limit: self.config.max_tables_per_owner,
            });
        }
        state.tables.insert(key.clone(), options);
        info!("stored table {key}");
        Ok(())
    }

    async fn table_options(&self, key: &TableKey) -> LedgerResult<TableOptions> {
        let state = self.state.read().await;
        state
            .tables
            .get(key)
            .cloned()
            .ok_or_else(|| LedgerError::TableNotFound(key.clone()))
    }

    async fn delete_table(&self, key: &TableKey) -> LedgerResult<()> {
        let mut state = self.state.write().await;
        state
            .tables
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| LedgerError::TableNotFound(key.clone()))
    }

    async fn channel_enabled(&self, channel: ChannelId) -> LedgerResult<bool> {
        Ok(self.state.read().await.channels.contains(&channel))
    }

    async fn enable_channel(&self, channel: ChannelId) -> LedgerResult<()> {
        self.state.write().await.channels.insert(channel);
        Ok(())
    }

    async fn disable_channel(&self, channel: ChannelId) -> LedgerResult<()> {
        self.state.write().await.channels.remove(&channel);
        Ok(())
    }

    async fn claim_free_chips(&self, player: PlayerId) -> LedgerResult<FreeChipsClaim> {
        let mut state = self.state.write().await;
        let claimed_at = Utc::now();
        if let Some(&next) = state.next_claims.get(&player)
            && claimed_at < next
        {
            return Err(LedgerError::FaucetNotAvailable(next));
        }

        let amount = self.config.free_chips;
        let balance_after = state.credit(
            player,
            amount,
            EntryType::FreeChips,
            Some("free chips".to_string()),
        )?;
        let next_claim_at = claimed_at + self.config.free_chips_cooldown;
        state.next_claims.insert(player, next_claim_at);
        debug!("player {player} claimed {amount} free chips");

        Ok(FreeChipsClaim {
            player,
            amount,
            balance_after,
            claimed_at,
            next_claim_at,
        })
    }

    async fn transfer(
        &self,
        giver: PlayerId,
        receiver: PlayerId,
        amount: Chips,
    ) -> LedgerResult<Chips> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        let mut state = self.state.write().await;
        let amount = amount.min(state.balance(giver));
        if amount == 0 || giver == receiver {
            return Ok(amount);
        }
        // Check the credit side first so a failure leaves both untouched.
        state
            .balance(receiver)
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow)?;
        state.debit(
            giver,
            amount,
            EntryType::Transfer,
            Some(format!("to {receiver}")),
        )?;
        state.credit(
            receiver,
            amount,
            EntryType::Transfer,
            Some(format!("from {giver}")),
        )?;
        info!("player {giver} gave {amount} chips to {receiver}");
        Ok(amount)
    }

    async fn entries(&self, player: PlayerId, limit: usize) -> LedgerResult<Vec<LedgerEntry>> {
        let state = self.state.read().await;
        Ok(state
            .entries
            .get(&player)
            .map(|history| history.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}
