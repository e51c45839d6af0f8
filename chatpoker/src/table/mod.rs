//! Tables: options, the player-facing session around an engine, and the
//! async actor model that runs many of them.
//!
//! ## Architecture
//!
//! Each table runs in its own Tokio task with an mpsc message inbox. The
//! [`TableActor`] owns a [`TableSession`], which binds an engine to player
//! ids and to the chip ledger. The [`TableManager`] opens tables from
//! options stored in the ledger and routes requests to them.
//!
//! ## Example
//!
//! ```no_run
//! use chatpoker::{
//!     game::entities::Action,
//!     ledger::{Ledger, MemoryLedger, TableKey},
//!     table::{TableManager, TableOptions},
//! };
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let ledger = Arc::new(MemoryLedger::default());
//! let manager = TableManager::new(ledger.clone());
//! let key = TableKey::new(1, "lobby");
//! manager.create_table(&key, "20,100,0,2,1,0,6,30".parse::<TableOptions>()?).await?;
//! manager.open_table(key.clone()).await?;
//!
//! ledger.add_chips(42, 100).await?;
//! manager.buy_in(&key, 42, 0, 100).await?;
//! manager.sit_in(&key, 42).await?;
//! # manager.take_action(&key, 42, Action::Fold).await.ok();
//! # Ok(())
//! # }
//! ```

pub mod actor;
pub mod config;
pub mod manager;
pub mod messages;
pub mod session;
pub mod view;

pub use actor::{TableActor, TableHandle};
pub use config::{OptionField, OptionsError, TableOptions, TimeBank};
pub use manager::{ManagerError, TableManager};
pub use messages::{TableEvent, TableMessage};
pub use session::{RECENT_HANDS, SessionError, TableSession};
pub use view::{RecentHand, SeatView, TableView, Winner};
