//! # Level Schema
//!
//! Wire DTOs for the decrypted level plaintext and the in-memory level model
//! built from them.
//!
//! ## Plaintext Layout
//! ```text
//! { "levels": [ { "level", "rows", "columns", "totalSlot",
//!                 "goals": [ { "goalType", "targetCount", "targetColor" } ],
//!                 "containers": [ color ],
//!                 "grid": [ [ cell, ... ], ... ] } ] }
//! ```
//! `grid` is column-major: the outer array holds columns, each inner array the
//! cells of that column from row 0 upwards.
//!
//! ## Tolerance
//! Missing keys take their default, `null` sequences read as empty and `null`
//! cells or columns become default cells. Only syntactically broken JSON or a
//! wrongly typed scalar is an error.

pub mod dto;
pub mod level;
pub mod types;

pub use dto::{CellDto, GateWaveDto, GoalDto, LevelCollectionDto, LevelConfigDto};
pub use level::{Cell, GateWave, Goal, Grid, Level};
pub use types::{ColorId, ElementType, GateDirection, GoalType};
