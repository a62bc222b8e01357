//! # habitkit — habit-state engine
//!
//! In-memory data model for habits and their per-date completion logs, pure
//! streak/statistics derivation, and achievement evaluation, coordinated
//! through a single mutation entry point so derived feedback never goes
//! stale relative to the raw logs.
//!
//! Persistence, time, and id generation are injected collaborators
//! ([`store::Persistence`], [`clock::Clock`], [`clock::IdSource`]); the
//! engine itself is synchronous and single-caller.

pub mod achievements;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod stats;
pub mod store;

pub use clock::{Clock, FixedClock, IdSource, SystemClock, UuidSource};
pub use engine::{Applied, Engine};
pub use error::{EngineError, EngineResult};
pub use models::{
    Achievement, Category, Challenge, CreateHabit, Difficulty, Habit, HabitTemplate, LogEntry,
    LogStatus, MoodEntry, UpdateHabit,
};
pub use stats::{DailySummary, StreakStats};
pub use store::{JsonFileStore, MemoryStore, Persistence};
