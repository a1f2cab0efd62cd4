//! `targetgrid-engine` - the target matrix edit engine.
//!
//! Pure engine crate: numeric input normalization, derived display
//! metrics, and the per-cell edit/diff/save state machine. No IO, no
//! network; the reconciliation layer drives the save lifecycle.

pub mod cell;
pub mod error;
pub mod input;
pub mod matrix;
pub mod metrics;

pub use cell::{CellState, TargetCell};
pub use error::EngineError;
pub use input::{format_amount, format_optional, parse_amount};
pub use matrix::{ChangeEntry, Matrix};
