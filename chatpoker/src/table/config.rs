//! Table options.
//!
//! Options are validated before a table's engine is built and travel in a
//! compact wire form for command-line entry and display:
//! `minBuy,maxBuy,matchStack,bb,sb,ante,seats,timeBank`.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, time::Duration};
use thiserror::Error;

use crate::game::{
    EngineSettings,
    entities::{Blinds, Chips},
};

pub const MIN_SEATS: usize = 2;
pub const MAX_SEATS: usize = 9;
pub const MAX_BUY_IN_BB: u32 = 500;
pub const MIN_TIME_BANK_SECS: u32 = 10;

/// How long a seat gets to act before the table acts for it.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBank {
    Unlimited,
    Seconds(u32),
}

impl TimeBank {
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        match self {
            Self::Unlimited => None,
            Self::Seconds(secs) => Some(Duration::from_secs(u64::from(*secs))),
        }
    }
}

impl fmt::Display for TimeBank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlimited => write!(f, "-1"),
            Self::Seconds(secs) => write!(f, "{secs}"),
        }
    }
}

/// Option fields in wire order.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum OptionField {
    MinBuy,
    MaxBuy,
    MatchStack,
    BigBlind,
    SmallBlind,
    Ante,
    Seats,
    TimeBank,
}

impl OptionField {
    pub const ALL: [Self; 8] = [
        Self::MinBuy,
        Self::MaxBuy,
        Self::MatchStack,
        Self::BigBlind,
        Self::SmallBlind,
        Self::Ante,
        Self::Seats,
        Self::TimeBank,
    ];
}

impl fmt::Display for OptionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::MinBuy => "minBuy",
            Self::MaxBuy => "maxBuy",
            Self::MatchStack => "matchStack",
            Self::BigBlind => "bb",
            Self::SmallBlind => "sb",
            Self::Ante => "ante",
            Self::Seats => "seats",
            Self::TimeBank => "timeBank",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum OptionsError {
    #[error("expected {expected} comma-separated options, got {got}")]
    FieldCount { expected: usize, got: usize },
    #[error("{0} must be a whole number")]
    NotAnInteger(OptionField),
    #[error("{0} must be 0 or 1")]
    NotABoolean(OptionField),
    #[error("{field} {reason}")]
    OutOfRange {
        field: OptionField,
        reason: &'static str,
    },
}

fn out_of_range(field: OptionField, reason: &'static str) -> OptionsError {
    OptionsError::OutOfRange { field, reason }
}

/// Per-table configuration. Buy-in limits are in big blinds.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TableOptions {
    pub min_buy: u32,
    pub max_buy: u32,
    /// Raise the maximum buy-in to the largest stack at the table.
    pub match_stack: bool,
    pub big_blind: Chips,
    pub small_blind: Chips,
    pub ante: Chips,
    pub seats: usize,
    pub time_bank: TimeBank,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            min_buy: 20,
            max_buy: 100,
            match_stack: false,
            big_blind: 2,
            small_blind: 1,
            ante: 0,
            seats: 6,
            time_bank: TimeBank::Seconds(30),
        }
    }
}

impl TableOptions {
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.min_buy <= 5 {
            return Err(out_of_range(OptionField::MinBuy, "must be more than 5 big blinds"));
        }
        if self.min_buy >= self.max_buy {
            return Err(out_of_range(OptionField::MinBuy, "must be less than maxBuy"));
        }
        if self.max_buy > MAX_BUY_IN_BB {
            return Err(out_of_range(OptionField::MaxBuy, "must be at most 500 big blinds"));
        }
        if self.big_blind <= 1 {
            return Err(out_of_range(OptionField::BigBlind, "must be more than 1"));
        }
        if self.small_blind == 0 || self.small_blind > self.big_blind {
            return Err(out_of_range(OptionField::SmallBlind, "must be between 1 and bb"));
        }
        if self.ante > self.big_blind {
            return Err(out_of_range(OptionField::Ante, "must be at most bb"));
        }
        if !(MIN_SEATS..=MAX_SEATS).contains(&self.seats) {
            return Err(out_of_range(OptionField::Seats, "must be between 2 and 9"));
        }
        let table_max = u64::from(self.max_buy) * u64::from(self.big_blind) * self.seats as u64;
        if table_max > u64::from(Chips::MAX) {
            return Err(out_of_range(
                OptionField::BigBlind,
                "is too large for maxBuy stacks at every seat",
            ));
        }
        if let TimeBank::Seconds(secs) = self.time_bank
            && secs < MIN_TIME_BANK_SECS
        {
            return Err(out_of_range(
                OptionField::TimeBank,
                "must be at least 10 seconds, or -1 for unlimited",
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn blinds(&self) -> Blinds {
        Blinds {
            small: self.small_blind,
            big: self.big_blind,
            ante: self.ante,
        }
    }

    #[must_use]
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings::new(self.blinds(), self.seats)
    }

    #[must_use]
    pub fn min_buy_in_chips(&self) -> Chips {
        self.min_buy.saturating_mul(self.big_blind)
    }

    /// Largest stack a seat may hold after buying in or adding on, given
    /// the largest stack currently at the table.
    #[must_use]
    pub fn max_buy_in_chips(&self, largest_stack: Chips) -> Chips {
        let max = self.max_buy.saturating_mul(self.big_blind);
        if self.match_stack {
            max.max(largest_stack)
        } else {
            max
        }
    }
}

impl fmt::Display for TableOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{},{},{}",
            self.min_buy,
            self.max_buy,
            u8::from(self.match_stack),
            self.big_blind,
            self.small_blind,
            self.ante,
            self.seats,
            self.time_bank,
        )
    }
}

fn parse_int(field: OptionField, raw: &str) -> Result<i64, OptionsError> {
    raw.parse().map_err(|_| OptionsError::NotAnInteger(field))
}

fn parse_unsigned<T: TryFrom<i64>>(field: OptionField, raw: &str) -> Result<T, OptionsError> {
    let value = parse_int(field, raw)?;
    T::try_from(value).map_err(|_| out_of_range(field, "must not be negative"))
}

impl FromStr for TableOptions {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(',').map(str::trim).collect();
        if fields.len() != OptionField::ALL.len() {
            return Err(OptionsError::FieldCount {
                expected: OptionField::ALL.len(),
                got: fields.len(),
            });
        }

        let match_stack = match fields[2] {
            "0" => false,
            "1" => true,
            _ => return Err(OptionsError::NotABoolean(OptionField::MatchStack)),
        };
        let time_bank = match parse_int(OptionField::TimeBank, fields[7])? {
            -1 => TimeBank::Unlimited,
            secs => TimeBank::Seconds(u32::try_from(secs).map_err(|_| {
                out_of_range(OptionField::TimeBank, "must be seconds, or -1 for unlimited")
            })?),
        };
        let options = Self {
            min_buy: parse_unsigned(OptionField::MinBuy, fields[0])?,
            max_buy: parse_unsigned(OptionField::MaxBuy, fields[1])?,
            match_stack,
            big_blind: parse_unsigned(OptionField::BigBlind, fields[3])?,
            small_blind: parse_unsigned(OptionField::SmallBlind, fields[4])?,
            ante: parse_unsigned(OptionField::Ante, fields[5])?,
            seats: parse_unsigned(OptionField::Seats, fields[6])?,
            time_bank,
        };
        options.validate()?;
        Ok(options)
    }
}
