use serde::{Deserialize, Serialize};

use crate::input;
use crate::metrics;

/// Edit-tracking state of a single target cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellState {
    /// In-memory value matches the last confirmed server value.
    #[default]
    Clean,
    /// Edited and not yet saved.
    Dirty,
    /// Part of an outstanding save batch.
    Saving,
    /// The server rejected this cell in the last batch; the edited value
    /// is preserved.
    SaveFailed,
}

/// One editable target value for an `(entity, metric)` pair.
///
/// `baseline` changes only on load or confirmed save. `reference` is the
/// prior-year actual, server-supplied, display-only; it is never written
/// back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetCell {
    /// Server row id, once the store has one.
    pub persisted_id: Option<i64>,
    /// User-editable value.
    pub current: Option<i64>,
    /// Last confirmed server value.
    pub baseline: Option<i64>,
    /// Prior-year actual for YoY display.
    pub reference: Option<i64>,
    pub state: CellState,
}

impl TargetCell {
    /// Cell as loaded from the store: clean, baseline = current.
    pub fn from_server(
        persisted_id: Option<i64>,
        value: Option<i64>,
        reference: Option<i64>,
    ) -> Self {
        Self {
            persisted_id,
            current: value,
            baseline: value,
            reference,
            state: CellState::Clean,
        }
    }

    /// A cell is clean iff its value matches the baseline.
    pub fn is_clean(&self) -> bool {
        self.current == self.baseline
    }

    /// Apply an edited value and recompute the state. Editing back to the
    /// baseline is a valid undo and returns the cell to `Clean`; this also
    /// clears a `SaveFailed` marker, since the failed payload no longer
    /// exists.
    pub(crate) fn set_current(&mut self, value: Option<i64>) {
        self.current = value;
        self.state = if self.is_clean() {
            CellState::Clean
        } else {
            CellState::Dirty
        };
    }

    /// Display text for the editable value; cleared cells render blank.
    pub fn display_text(&self) -> String {
        input::format_optional(self.current)
    }

    /// YoY percentage of the current value against the prior-year actual.
    pub fn yoy_rate(&self) -> Option<f64> {
        metrics::yoy_rate(
            self.current.map(|v| v as f64),
            self.reference.map(|v| v as f64),
        )
    }

    /// YoY absolute change of the current value against the prior-year
    /// actual.
    pub fn yoy_diff(&self) -> Option<f64> {
        metrics::yoy_diff(
            self.current.map(|v| v as f64),
            self.reference.map(|v| v as f64),
        )
    }
}
