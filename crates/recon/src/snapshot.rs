//! Snapshot-to-matrix construction.
//!
//! The store serves a sparse snapshot: rows only carry values for KPIs
//! that have data. The editing grid is dense; every `(entity, kpi)` pair
//! gets a cell so the operator can fill blanks, with never-persisted
//! cells starting empty and id-less.

use std::collections::BTreeMap;

use targetgrid_engine::{Matrix, TargetCell};
use targetgrid_fiscal::FiscalPeriod;
use targetgrid_protocol::MatrixSnapshot;

/// Build a dense matrix plus the entity display names from one snapshot.
/// Every cell starts `Clean` with `baseline` set to the stored value.
pub(crate) fn build_matrix(
    department: &str,
    period: FiscalPeriod,
    snapshot: &MatrixSnapshot,
) -> (Matrix, BTreeMap<String, String>) {
    let mut matrix = Matrix::new(department, period);
    let mut entity_names = BTreeMap::new();

    for row in &snapshot.rows {
        entity_names.insert(row.entity_id.clone(), row.entity_name.clone());

        for kpi in &snapshot.kpis {
            let cell = match row.values.get(&kpi.id) {
                Some(stored) => TargetCell::from_server(
                    stored.persisted_id,
                    stored.value,
                    stored.reference_value,
                ),
                None => TargetCell::default(),
            };
            matrix.insert_cell(row.entity_id.clone(), kpi.id.clone(), cell);
        }
    }

    (matrix, entity_names)
}
