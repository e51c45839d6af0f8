//! Table manager for spawning and managing multiple table actors.

use log::{info, warn};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tokio::sync::RwLock;

use super::{
    actor::{TableActor, TableHandle},
    config::{OptionsError, TableOptions},
    session::{SessionError, TableSession},
    view::TableView,
};
use crate::{
    game::entities::{Action, Chips, PlayerId, SeatIndex},
    ledger::{Ledger, LedgerError, TableKey},
};

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ManagerError {
    #[error("no table {0} is running")]
    TableNotFound(TableKey),
    #[error("table {0} is already running")]
    TableExists(TableKey),
    #[error("table {0} has closed")]
    TableClosed(TableKey),
    #[error(transparent)]
    Options(#[from] OptionsError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Registry of running tables, owned by the service process.
pub struct TableManager {
    /// Chip balances and stored table options
    ledger: Arc<dyn Ledger>,

    /// Running table handles
    tables: Arc<RwLock<HashMap<TableKey, TableHandle>>>,
}

impl TableManager {
    /// Create a new table manager
    ///
    /// # Arguments
    ///
    /// * `ledger` - Ledger backing buy-ins, cash-outs and stored options
    ///
    /// # Returns
    ///
    /// * `TableManager` - New table manager instance
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self {
            ledger,
            tables: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    #[must_use]
    pub fn ledger(&self) -> &Arc<dyn Ledger> {
        &self.ledger
    }

    /// Store options for a new table in the ledger
    ///
    /// # Arguments
    ///
    /// * `key` - Owner and name of the table
    /// * `options` - Table options
    ///
    /// # Returns
    ///
    /// * `Result<(), ManagerError>` - Invalid options or a ledger refusal
    ///   (name taken, owner at their table limit)
    pub async fn create_table(
        &self,
        key: &TableKey,
        options: TableOptions,
    ) -> Result<(), ManagerError> {
        options.validate()?;
        self.ledger.create_table(key, options).await?;
        info!("created table {key}");
        Ok(())
    }

    /// Spawn an actor for a stored table
    ///
    /// # Arguments
    ///
    /// * `key` - Owner and name of the table
    ///
    /// # Returns
    ///
    /// * `Result<TableHandle, ManagerError>` - Handle of the running table
    pub async fn open_table(&self, key: TableKey) -> Result<TableHandle, ManagerError> {
        let options = self.ledger.table_options(&key).await?;

        // Held across spawn so two opens of the same key can't race.
        let mut tables = self.tables.write().await;
        if let Some(handle) = tables.get(&key) {
            if !handle.is_closed() {
                return Err(ManagerError::TableExists(key));
            }
            warn!("replacing stopped table {key}");
        }

        let session = TableSession::new(key.to_string(), options, self.ledger.clone())?;
        let (actor, handle) = TableActor::new(key.clone(), session);
        tables.insert(key, handle.clone());
        drop(tables);

        tokio::spawn(async move {
            actor.run().await;
        });
        Ok(handle)
    }

    /// Get a table handle
    ///
    /// # Arguments
    ///
    /// * `key` - Owner and name of the table
    ///
    /// # Returns
    ///
    /// * `Option<TableHandle>` - Table handle if the table is running
    pub async fn get_table(&self, key: &TableKey) -> Option<TableHandle> {
        let tables = self.tables.read().await;
        tables.get(key).cloned()
    }

    async fn table(&self, key: &TableKey) -> Result<TableHandle, ManagerError> {
        self.get_table(key)
            .await
            .ok_or_else(|| ManagerError::TableNotFound(key.clone()))
    }

    /// Cash everybody out and stop a table
    ///
    /// A table with a hand in progress refuses to close and keeps running.
    ///
    /// # Arguments
    ///
    /// * `key` - Owner and name of the table
    ///
    /// # Returns
    ///
    /// * `Result<Vec<(PlayerId, Chips)>, ManagerError>` - Chips returned to each player
    pub async fn close_table(
        &self,
        key: &TableKey,
    ) -> Result<Vec<(PlayerId, Chips)>, ManagerError> {
        let handle = self.table(key).await?;
        let cashed = match handle.close().await {
            Ok(cashed) => cashed,
            Err(ManagerError::TableClosed(_)) => {
                warn!("table {key} had already stopped");
                Vec::new()
            }
            Err(err) => return Err(err),
        };

        let mut tables = self.tables.write().await;
        tables.remove(key);
        drop(tables);

        info!("closed table {key}, returned chips to {} players", cashed.len());
        Ok(cashed)
    }

    /// Close the table and remove its stored options
    pub async fn delete_table(&self, key: &TableKey) -> Result<(), ManagerError> {
        if self.get_table(key).await.is_some() {
            self.close_table(key).await?;
        }
        self.ledger.delete_table(key).await?;
        Ok(())
    }

    /// Keys of all running tables
    pub async fn table_keys(&self) -> Vec<TableKey> {
        let tables = self.tables.read().await;
        let mut keys: Vec<TableKey> = tables.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Get active table count
    pub async fn active_table_count(&self) -> usize {
        let tables = self.tables.read().await;
        tables.len()
    }

    /// Buy into a seat at a table
    ///
    /// # Arguments
    ///
    /// * `key` - Owner and name of the table
    /// * `player` - Player buying in
    /// * `seat` - Seat to take
    /// * `chips` - Chips moved from the ledger to the seat
    pub async fn buy_in(
        &self,
        key: &TableKey,
        player: PlayerId,
        seat: SeatIndex,
        chips: Chips,
    ) -> Result<(), ManagerError> {
        self.table(key).await?.buy_in(player, seat, chips).await
    }

    pub async fn add_on(
        &self,
        key: &TableKey,
        player: PlayerId,
        chips: Chips,
    ) -> Result<(), ManagerError> {
        self.table(key).await?.add_on(player, chips).await
    }

    pub async fn sit_in(&self, key: &TableKey, player: PlayerId) -> Result<(), ManagerError> {
        self.table(key).await?.sit_in(player).await
    }

    pub async fn sit_out(&self, key: &TableKey, player: PlayerId) -> Result<(), ManagerError> {
        self.table(key).await?.sit_out(player).await
    }

    pub async fn cash_out(&self, key: &TableKey, player: PlayerId) -> Result<Chips, ManagerError> {
        self.table(key).await?.cash_out(player).await
    }

    pub async fn start_hand(&self, key: &TableKey) -> Result<(), ManagerError> {
        self.table(key).await?.start_hand().await
    }

    /// Take an action for a player
    ///
    /// # Arguments
    ///
    /// * `key` - Owner and name of the table
    /// * `player` - Acting player
    /// * `action` - Fold, check, call, bet or all-in
    pub async fn take_action(
        &self,
        key: &TableKey,
        player: PlayerId,
        action: Action,
    ) -> Result<(), ManagerError> {
        self.table(key).await?.act(player, action).await
    }

    /// Get the table as seen by `viewer`
    pub async fn table_view(
        &self,
        key: &TableKey,
        viewer: Option<PlayerId>,
    ) -> Result<TableView, ManagerError> {
        self.table(key).await?.view(viewer).await
    }
}
