//! # Chat Poker
//!
//! A No-Limit Texas Hold'em betting engine for tables hosted in chat
//! channels.
//!
//! The engine is a plain state machine over seat indices: it deals, takes
//! turns in order, moves the board along and settles side pots at showdown.
//! Everything around it (who sits where, where the chips come from, how long
//! a player may think) lives in the table layer, which runs every table as
//! its own Tokio actor.
//!
//! ## Core Modules
//!
//! - [`game`]: cards, hand evaluation, the betting engine and showdown
//! - [`table`]: table options, sessions, actors and the table manager
//! - [`ledger`]: chip balances and stored table options
//!
//! ## Example
//!
//! ```
//! use chatpoker::game::{Engine, EngineSettings};
//!
//! let mut engine = Engine::new(EngineSettings::default());
//! engine.buy_in(0, 100).unwrap();
//! engine.buy_in(1, 100).unwrap();
//! engine.sit_in(0).unwrap();
//! engine.sit_in(1).unwrap();
//! engine.deal().unwrap();
//! assert_eq!(engine.pot() + engine.current_bet(0) + engine.current_bet(1), 3);
//! ```

/// Cards, hand evaluation and the betting engine.
pub mod game;
pub use game::{Engine, EngineError, EngineSettings, HandResult};

/// Chip balances, stored tables and free chips.
pub mod ledger;
pub use ledger::{Ledger, LedgerError, MemoryLedger};

/// Table sessions and the actor model running them.
pub mod table;
pub use table::{TableManager, TableOptions, TableSession};
