//! The editing session.
//!
//! One session owns one matrix for one `(department, period)` pair and is
//! the only writer to it. The session drives the whole reconciliation
//! cycle: load, edit, one batched save, per-item result application, and
//! wholesale replacement on period change. There is no optimistic-lock
//! exchange with the store; concurrent sessions editing the same cell are
//! last-write-wins, a documented limitation of the store contract.

use std::collections::BTreeMap;

use serde::Serialize;
use targetgrid_engine::{ChangeEntry, EngineError, Matrix, TargetCell};
use targetgrid_fiscal::FiscalPeriod;
use targetgrid_protocol::{ChangeItem, KpiDef, MatrixSnapshot};
use targetgrid_store_client::StoreClient;

use crate::error::SessionError;
use crate::snapshot::build_matrix;

/// Result of one batched save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
    pub created: u32,
    pub updated: u32,
    /// Per-cell rejections. Each one moved exactly that cell to
    /// `SaveFailed` without blocking its siblings.
    pub errors: Vec<CellRejection>,
}

/// One rejected cell from a save batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellRejection {
    pub entity_id: String,
    pub metric_id: String,
    pub message: String,
}

/// A single editing session over one target matrix.
#[derive(Debug)]
pub struct EditSession {
    kpis: Vec<KpiDef>,
    entity_names: BTreeMap<String, String>,
    matrix: Matrix,
}

impl EditSession {
    /// Open a session from an already-fetched snapshot. Every cell starts
    /// clean with the stored value as its baseline.
    pub fn open(department: &str, period: FiscalPeriod, snapshot: MatrixSnapshot) -> Self {
        let (matrix, entity_names) = build_matrix(department, period, &snapshot);
        Self { kpis: snapshot.kpis, entity_names, matrix }
    }

    /// Fetch the matrix from the store and open a session over it.
    pub fn load(
        client: &StoreClient,
        department: &str,
        period: FiscalPeriod,
    ) -> Result<Self, SessionError> {
        let snapshot = client.fetch_matrix(department, period)?;
        Ok(Self::open(department, period, snapshot))
    }

    pub fn department(&self) -> &str {
        self.matrix.department()
    }

    pub fn period(&self) -> FiscalPeriod {
        self.matrix.period()
    }

    /// KPI column definitions, in server order.
    pub fn kpis(&self) -> &[KpiDef] {
        &self.kpis
    }

    /// Display name for an entity row.
    pub fn entity_name(&self, entity_id: &str) -> Option<&str> {
        self.entity_names.get(entity_id).map(String::as_str)
    }

    pub fn cell(&self, entity_id: &str, metric_id: &str) -> Option<&TargetCell> {
        self.matrix.cell(entity_id, metric_id)
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// Commit blurred input text to a cell. Parse failures leave the cell
    /// untouched; the caller restores the last valid text.
    pub fn edit(
        &mut self,
        entity_id: &str,
        metric_id: &str,
        text: &str,
    ) -> Result<(), EngineError> {
        self.matrix.commit_input(entity_id, metric_id, text)
    }

    /// The pending change set, in entity-then-metric order.
    pub fn change_set(&self) -> Vec<ChangeEntry> {
        self.matrix.change_set()
    }

    pub fn save_in_flight(&self) -> bool {
        self.matrix.save_in_flight()
    }

    /// Reconcile every modified cell against the store in one batched
    /// request.
    ///
    /// Nothing to save is a successful no-op with no network call. On a
    /// response, batched cells re-baseline except the per-item rejections,
    /// which move to `SaveFailed` with their edited values preserved. On a
    /// transport or auth failure the batch is aborted: no cell changes,
    /// and the same change set can be resubmitted wholesale.
    pub fn save(&mut self, client: &StoreClient) -> Result<SaveOutcome, SessionError> {
        let entries = self.matrix.begin_save()?;
        if entries.is_empty() {
            return Ok(SaveOutcome::default());
        }

        let changes: Vec<ChangeItem> = entries.iter().map(to_change_item).collect();

        let response = match client.bulk_upsert(self.period(), changes) {
            Ok(response) => response,
            Err(err) => {
                self.matrix.abort_save()?;
                return Err(err.into());
            }
        };

        let rejected: Vec<(String, String)> = response
            .errors
            .iter()
            .map(|e| (e.entity_id.clone(), e.kpi_id.clone()))
            .collect();
        self.matrix.apply_outcome(&rejected)?;

        Ok(SaveOutcome {
            created: response.created_count,
            updated: response.updated_count,
            errors: response
                .errors
                .into_iter()
                .map(|e| CellRejection {
                    entity_id: e.entity_id,
                    metric_id: e.kpi_id,
                    message: e.message,
                })
                .collect(),
        })
    }

    /// Replace the matrix wholesale for a new period: fresh load, fresh
    /// baseline, no carry-over of edits. Rejected while a save is
    /// outstanding; the caller must wait and re-issue, never drop.
    pub fn switch_period(
        &mut self,
        period: FiscalPeriod,
        snapshot: MatrixSnapshot,
    ) -> Result<(), SessionError> {
        if self.matrix.save_in_flight() {
            return Err(SessionError::SaveInFlight);
        }

        let department = self.matrix.department().to_string();
        let (matrix, entity_names) = build_matrix(&department, period, &snapshot);
        self.matrix = matrix;
        self.entity_names = entity_names;
        self.kpis = snapshot.kpis;
        Ok(())
    }

    /// Wholesale refresh of the current period. Used after a save that
    /// created rows, to pick up the server-assigned ids.
    pub fn reload(&mut self, client: &StoreClient) -> Result<(), SessionError> {
        if self.matrix.save_in_flight() {
            return Err(SessionError::SaveInFlight);
        }

        let period = self.period();
        let snapshot = client.fetch_matrix(self.matrix.department(), period)?;
        self.switch_period(period, snapshot)
    }
}

fn to_change_item(entry: &ChangeEntry) -> ChangeItem {
    ChangeItem {
        entity_id: entry.entity_id.clone(),
        kpi_id: entry.metric_id.clone(),
        persisted_id: entry.persisted_id,
        value: entry.new_value,
    }
}
