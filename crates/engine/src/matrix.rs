//! The matrix edit-diff engine.
//!
//! A [`Matrix`] holds every target cell for one `(department, period)`
//! pair and tracks edits against the loaded baseline. Cells live in a
//! `BTreeMap` keyed `(entity_id, metric_id)`, which fixes the change-set
//! order: stable by entity, then metric.
//!
//! Save lifecycle: `begin_save` moves every `Dirty`/`SaveFailed` cell to
//! `Saving` as one batch and hands back the change set; exactly one of
//! `apply_outcome` (response arrived, per-item results) or `abort_save`
//! (transport failed, restore prior states untouched) closes the batch.

use std::collections::BTreeMap;

use serde::Serialize;
use targetgrid_fiscal::FiscalPeriod;

use crate::cell::{CellState, TargetCell};
use crate::error::EngineError;
use crate::input;

/// One modified cell, as handed to the reconciliation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEntry {
    pub entity_id: String,
    pub metric_id: String,
    pub persisted_id: Option<i64>,
    /// `None` means the operator explicitly cleared a stored value.
    pub new_value: Option<i64>,
    pub original_value: Option<i64>,
}

/// The outstanding save batch: which cells were sent and what state each
/// was in before, so a transport failure can restore them exactly.
#[derive(Debug)]
struct SaveBatch {
    entries: Vec<ChangeEntry>,
    prior: Vec<CellState>,
}

/// All target cells for one `(department, fiscal period)` pair.
///
/// Owned by a single editing session and replaced wholesale when the
/// period changes; there is no partial carry-over across periods.
#[derive(Debug)]
pub struct Matrix {
    department: String,
    period: FiscalPeriod,
    cells: BTreeMap<(String, String), TargetCell>,
    in_flight: Option<SaveBatch>,
}

impl Matrix {
    pub fn new(department: impl Into<String>, period: FiscalPeriod) -> Self {
        Self {
            department: department.into(),
            period,
            cells: BTreeMap::new(),
            in_flight: None,
        }
    }

    pub fn department(&self) -> &str {
        &self.department
    }

    pub fn period(&self) -> FiscalPeriod {
        self.period
    }

    /// Canonical period key of this matrix, as sent to the store.
    pub fn period_key(&self) -> String {
        self.period.key()
    }

    /// Install a cell as loaded from the store.
    pub fn insert_cell(
        &mut self,
        entity_id: impl Into<String>,
        metric_id: impl Into<String>,
        cell: TargetCell,
    ) {
        self.cells.insert((entity_id.into(), metric_id.into()), cell);
    }

    pub fn cell(&self, entity_id: &str, metric_id: &str) -> Option<&TargetCell> {
        self.cells
            .get(&(entity_id.to_string(), metric_id.to_string()))
    }

    /// Cells in deterministic `(entity, metric)` order.
    pub fn cells(&self) -> impl Iterator<Item = (&(String, String), &TargetCell)> {
        self.cells.iter()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn save_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Commit blurred input text to a cell.
    ///
    /// Parse failure leaves the cell's numeric state untouched and is the
    /// caller's cue to restore the last valid text. Blank input clears
    /// the value. Cells in an outstanding batch cannot be edited.
    pub fn commit_input(
        &mut self,
        entity_id: &str,
        metric_id: &str,
        text: &str,
    ) -> Result<(), EngineError> {
        let value = input::parse_amount(text)?;
        let cell = self
            .cells
            .get_mut(&(entity_id.to_string(), metric_id.to_string()))
            .ok_or_else(|| EngineError::UnknownCell {
                entity_id: entity_id.to_string(),
                metric_id: metric_id.to_string(),
            })?;

        if cell.state == CellState::Saving {
            return Err(EngineError::SaveInFlight);
        }

        cell.set_current(value);
        Ok(())
    }

    /// The modified cells, in entity-then-metric order.
    ///
    /// Defined over `Dirty` and `SaveFailed` cells only. A cell with no
    /// server row and no value is skipped: there is nothing to create. A
    /// cell cleared after having a stored baseline IS present, with
    /// `new_value == None`; absence from the set means "unchanged".
    pub fn change_set(&self) -> Vec<ChangeEntry> {
        self.cells
            .iter()
            .filter(|(_, cell)| {
                matches!(cell.state, CellState::Dirty | CellState::SaveFailed)
            })
            .filter(|(_, cell)| cell.persisted_id.is_some() || cell.current.is_some())
            .map(|((entity_id, metric_id), cell)| ChangeEntry {
                entity_id: entity_id.clone(),
                metric_id: metric_id.clone(),
                persisted_id: cell.persisted_id,
                new_value: cell.current,
                original_value: cell.baseline,
            })
            .collect()
    }

    /// Open a save batch: every `Dirty`/`SaveFailed` cell moves to
    /// `Saving` together. Returns the change set to send; empty if there
    /// is nothing to save (no batch is opened in that case).
    pub fn begin_save(&mut self) -> Result<Vec<ChangeEntry>, EngineError> {
        if self.in_flight.is_some() {
            return Err(EngineError::SaveInFlight);
        }

        let entries = self.change_set();
        if entries.is_empty() {
            return Ok(entries);
        }

        let mut prior = Vec::with_capacity(entries.len());
        for entry in &entries {
            let key = (entry.entity_id.clone(), entry.metric_id.clone());
            if let Some(cell) = self.cells.get_mut(&key) {
                prior.push(cell.state);
                cell.state = CellState::Saving;
            }
        }

        self.in_flight = Some(SaveBatch { entries: entries.clone(), prior });
        Ok(entries)
    }

    /// Close the batch with per-item results. `rejected` lists the
    /// `(entity, metric)` pairs the server refused; those cells move to
    /// `SaveFailed` with their edited value preserved. Every other
    /// batched cell re-baselines to the value that was sent and returns
    /// to `Clean`. Cells outside the batch are untouched.
    pub fn apply_outcome(&mut self, rejected: &[(String, String)]) -> Result<(), EngineError> {
        let batch = self.in_flight.take().ok_or(EngineError::NoSaveInFlight)?;

        for entry in &batch.entries {
            let key = (entry.entity_id.clone(), entry.metric_id.clone());
            let Some(cell) = self.cells.get_mut(&key) else {
                continue;
            };

            if rejected.contains(&key) {
                cell.state = CellState::SaveFailed;
            } else {
                cell.baseline = entry.new_value;
                cell.current = entry.new_value;
                cell.state = CellState::Clean;
            }
        }

        Ok(())
    }

    /// Close the batch after a transport-level failure: every batched
    /// cell returns to the exact state it had before `begin_save`. No
    /// values change; the whole change set stays eligible for wholesale
    /// retry.
    pub fn abort_save(&mut self) -> Result<(), EngineError> {
        let batch = self.in_flight.take().ok_or(EngineError::NoSaveInFlight)?;

        for (entry, prior) in batch.entries.iter().zip(batch.prior) {
            let key = (entry.entity_id.clone(), entry.metric_id.clone());
            if let Some(cell) = self.cells.get_mut(&key) {
                cell.state = prior;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period() -> FiscalPeriod {
        FiscalPeriod::from_fiscal(2025, 9).unwrap()
    }

    fn loaded_matrix() -> Matrix {
        let mut m = Matrix::new("retail", period());
        m.insert_cell(
            "Store-A",
            "sales",
            TargetCell::from_server(Some(11), Some(1_000_000), Some(950_000)),
        );
        m.insert_cell(
            "Store-A",
            "visits",
            TargetCell::from_server(Some(12), Some(40_000), None),
        );
        m.insert_cell("Store-B", "sales", TargetCell::from_server(None, None, None));
        m
    }

    #[test]
    fn change_set_empty_after_load() {
        let m = loaded_matrix();
        assert_eq!(m.cells().count(), 3);
        assert!(m.change_set().is_empty());
    }

    #[test]
    fn edit_then_undo_returns_clean() {
        let mut m = loaded_matrix();
        m.commit_input("Store-A", "sales", "1,100,000").unwrap();
        assert_eq!(m.cell("Store-A", "sales").unwrap().state, CellState::Dirty);
        assert_eq!(m.change_set().len(), 1);

        // Typing the baseline's formatted form back is an undo.
        m.commit_input("Store-A", "sales", "1,000,000").unwrap();
        assert_eq!(m.cell("Store-A", "sales").unwrap().state, CellState::Clean);
        assert!(m.change_set().is_empty());
    }

    #[test]
    fn invalid_input_preserves_numeric_state() {
        let mut m = loaded_matrix();
        m.commit_input("Store-A", "sales", "1,100,000").unwrap();

        let err = m.commit_input("Store-A", "sales", "12abc").unwrap_err();
        assert!(matches!(err, EngineError::InvalidNumericInput(_)));

        let cell = m.cell("Store-A", "sales").unwrap();
        assert_eq!(cell.current, Some(1_100_000));
        assert_eq!(cell.state, CellState::Dirty);
    }

    #[test]
    fn unknown_cell_is_an_error() {
        let mut m = loaded_matrix();
        let err = m.commit_input("Store-Z", "sales", "5").unwrap_err();
        assert!(matches!(err, EngineError::UnknownCell { .. }));
    }

    #[test]
    fn change_set_order_is_entity_then_metric() {
        let mut m = loaded_matrix();
        m.commit_input("Store-B", "sales", "500").unwrap();
        m.commit_input("Store-A", "visits", "41,000").unwrap();
        m.commit_input("Store-A", "sales", "1,100,000").unwrap();

        let keys: Vec<(String, String)> = m
            .change_set()
            .iter()
            .map(|e| (e.entity_id.clone(), e.metric_id.clone()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("Store-A".into(), "sales".into()),
                ("Store-A".into(), "visits".into()),
                ("Store-B".into(), "sales".into()),
            ]
        );
    }

    #[test]
    fn cleared_value_is_included_with_null() {
        let mut m = loaded_matrix();
        m.commit_input("Store-A", "visits", "").unwrap();

        let set = m.change_set();
        assert_eq!(set.len(), 1);
        assert_eq!(set[0].new_value, None);
        assert_eq!(set[0].original_value, Some(40_000));
        assert_eq!(set[0].persisted_id, Some(12));
    }

    #[test]
    fn unpersisted_empty_cell_is_excluded() {
        let mut m = loaded_matrix();
        // Type something into the never-persisted cell, then clear it.
        m.commit_input("Store-B", "sales", "300").unwrap();
        m.commit_input("Store-B", "sales", "").unwrap();
        assert!(m.change_set().is_empty());
    }

    #[test]
    fn save_lifecycle_success() {
        let mut m = loaded_matrix();
        m.commit_input("Store-A", "sales", "1,100,000").unwrap();

        let batch = m.begin_save().unwrap();
        assert_eq!(batch.len(), 1);
        assert!(m.save_in_flight());
        assert_eq!(m.cell("Store-A", "sales").unwrap().state, CellState::Saving);
        // Saving cells are not in a fresh change set.
        assert!(m.change_set().is_empty());

        m.apply_outcome(&[]).unwrap();
        let cell = m.cell("Store-A", "sales").unwrap();
        assert_eq!(cell.state, CellState::Clean);
        assert_eq!(cell.baseline, Some(1_100_000));
        assert!(!m.save_in_flight());
        assert!(m.change_set().is_empty());
    }

    #[test]
    fn rejected_cell_fails_without_blocking_siblings() {
        let mut m = loaded_matrix();
        m.commit_input("Store-A", "sales", "1,100,000").unwrap();
        m.commit_input("Store-A", "visits", "41,000").unwrap();

        m.begin_save().unwrap();
        m.apply_outcome(&[("Store-A".into(), "visits".into())]).unwrap();

        let ok = m.cell("Store-A", "sales").unwrap();
        assert_eq!(ok.state, CellState::Clean);
        assert_eq!(ok.baseline, Some(1_100_000));

        let failed = m.cell("Store-A", "visits").unwrap();
        assert_eq!(failed.state, CellState::SaveFailed);
        assert_eq!(failed.current, Some(41_000));
        assert_eq!(failed.baseline, Some(40_000));

        // The failed cell is still in the next change set for an explicit
        // resubmission.
        let set = m.change_set();
        assert_eq!(set.len(), 1);
        assert_eq!(set[0].metric_id, "visits");
    }

    #[test]
    fn abort_restores_prior_states_exactly() {
        let mut m = loaded_matrix();
        m.commit_input("Store-A", "sales", "1,100,000").unwrap();
        m.commit_input("Store-A", "visits", "41,000").unwrap();

        // First attempt: visits rejected.
        m.begin_save().unwrap();
        m.apply_outcome(&[("Store-A".into(), "visits".into())]).unwrap();
        m.commit_input("Store-A", "sales", "1,200,000").unwrap();

        // Second attempt dies on transport: Dirty stays Dirty, SaveFailed
        // stays SaveFailed, values untouched.
        m.begin_save().unwrap();
        m.abort_save().unwrap();

        assert_eq!(m.cell("Store-A", "sales").unwrap().state, CellState::Dirty);
        assert_eq!(
            m.cell("Store-A", "visits").unwrap().state,
            CellState::SaveFailed
        );
        assert_eq!(m.cell("Store-A", "sales").unwrap().current, Some(1_200_000));
        assert_eq!(m.change_set().len(), 2);
    }

    #[test]
    fn double_begin_save_is_rejected() {
        let mut m = loaded_matrix();
        m.commit_input("Store-A", "sales", "1").unwrap();
        m.begin_save().unwrap();
        assert_eq!(m.begin_save().unwrap_err(), EngineError::SaveInFlight);
    }

    #[test]
    fn edit_during_save_is_rejected() {
        let mut m = loaded_matrix();
        m.commit_input("Store-A", "sales", "1").unwrap();
        m.begin_save().unwrap();
        assert_eq!(
            m.commit_input("Store-A", "sales", "2").unwrap_err(),
            EngineError::SaveInFlight
        );
    }

    #[test]
    fn empty_change_set_opens_no_batch() {
        let mut m = loaded_matrix();
        assert!(m.begin_save().unwrap().is_empty());
        assert!(!m.save_in_flight());
        assert_eq!(m.apply_outcome(&[]).unwrap_err(), EngineError::NoSaveInFlight);
    }
}
