//! Poker game engine - betting state machine and hand evaluation.
//!
//! - [`entities`]: cards, chips, streets, actions
//! - [`engine`]: seats, blinds, turn order and street progression
//! - [`showdown`]: layered side pots and pot distribution
//! - [`eval`]: hand strength behind the [`HandEvaluator`] trait

pub mod engine;
pub mod entities;
pub mod eval;
pub mod showdown;

pub use engine::{BlindPosts, Engine, EngineError, EngineSettings};
pub use eval::{HandEvaluator, StandardEvaluator};
pub use showdown::{HandResult, PotAward, RevealedHand};
