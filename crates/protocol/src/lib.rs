//! Target Store Wire Contract - v1 Frozen JSON Format
//!
//! This crate defines the canonical request/response types for the target
//! store API. Keys are camelCase on the wire; the backend and every
//! editing screen parse this exact shape.
//!
//! The format is frozen. Changes require a bump of [`WIRE_VERSION`] and
//! backward-compatibility handling in the client.
//!
//! Two contract details worth calling out:
//!
//! - `period` is always the canonical `"YYYY-MM-01"` key produced by
//!   `targetgrid-fiscal`; no other period representation crosses the wire.
//! - In a bulk upsert, an item being PRESENT with `"value": null` means
//!   the operator explicitly cleared a stored target. Unchanged cells are
//!   simply absent from `changes`. `value` is therefore always serialized,
//!   never skipped.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Current wire version. Increment for breaking changes.
pub const WIRE_VERSION: u32 = 1;

// =============================================================================
// Matrix load
// =============================================================================

/// Full matrix for one `(department, period)` pair, as served by
/// `GET /api/targets/matrix`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixSnapshot {
    pub kpis: Vec<KpiDef>,
    pub rows: Vec<MatrixRow>,
}

/// One KPI column definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiDef {
    pub id: String,
    pub name: String,
    /// Display unit ("yen", "count", ...). Optional; absent for plain
    /// numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// One entity row with its per-KPI values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixRow {
    pub entity_id: String,
    pub entity_name: String,
    /// Keyed by KPI id. Sparse: entities without a row for a KPI simply
    /// omit the key.
    pub values: HashMap<String, CellSnapshot>,
}

/// Stored state of one cell.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellSnapshot {
    /// Server row id; null until the first save creates one.
    #[serde(default)]
    pub persisted_id: Option<i64>,
    /// The stored target value.
    #[serde(default)]
    pub value: Option<i64>,
    /// Prior-year actual. Always server-supplied; clients never fabricate
    /// or write it.
    #[serde(default)]
    pub reference_value: Option<i64>,
}

// =============================================================================
// Bulk upsert
// =============================================================================

/// The batched save request, `POST /api/targets/bulk-upsert`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkUpsertRequest {
    /// Canonical `"YYYY-MM-01"` period key.
    pub period: String,
    pub changes: Vec<ChangeItem>,
}

/// One modified cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeItem {
    pub entity_id: String,
    pub kpi_id: String,
    /// Null for rows the store has not created yet; the store upserts by
    /// `(entity, kpi, period)` either way.
    pub persisted_id: Option<i64>,
    /// Null means "explicitly cleared", which is why this field is never
    /// skipped during serialization.
    pub value: Option<i64>,
}

/// Per-batch result. The batch is a set of independent sub-operations:
/// `errors` lists the items the store refused while the rest were applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpsertResponse {
    #[serde(default)]
    pub created_count: u32,
    #[serde(default)]
    pub updated_count: u32,
    #[serde(default)]
    pub errors: Vec<UpsertError>,
}

/// A server-side rejection of one entity/metric pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertError {
    pub entity_id: String,
    pub kpi_id: String,
    pub message: String,
}

// =============================================================================
// Tests
// =============================================================================
