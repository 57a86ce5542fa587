//! # Timre Core Library
//!
//! This library holds the state engine behind the Timre habit and
//! screen-time tracker. Front ends (the `timre` CLI, a mobile shell) render
//! its state and call its operations; all bookkeeping lives here.
//!
//! ## Architecture
//!
//! - **Day engine**: owns goals, intentions, the completion history and the
//!   streak saver balance, and decides when a new effective day begins
//! - **Streaks**: current and longest streak are derived from the history on
//!   every read, never stored
//! - **Storage**: a key-value seam with SQLite and in-memory implementations,
//!   plus TOML-based configuration
//!
//! ## Key Components
//!
//! - [`DayStateEngine`]: the stateful engine
//! - [`CompletionHistory`]: streak derivation
//! - [`KeyValueStore`]: persistence trait
//! - [`Config`]: application configuration management

pub mod clock;
pub mod day;
pub mod engine;
pub mod error;
pub mod goal;
pub mod intention;
pub mod settings;
pub mod settlement;
pub mod storage;
pub mod streak;

pub use clock::{Clock, FixedClock, SystemClock};
pub use day::{effective_day, DayId, DAY_BOUNDARY_HOUR};
pub use engine::{DayStateEngine, DaySummary};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use goal::{AppGoal, GoalId, GoalUpdate, HabitGoal, NewGoal, RecurringGoal};
pub use intention::{savers_earned, Intention, IntentionId};
pub use settings::{Bedtime, Settings};
pub use settlement::{CompleteDayResult, Outcome};
pub use storage::{Config, KeyValueStore, MemoryStore, SqliteStore, StorageKey};
pub use streak::CompletionHistory;
