//! `targetgrid-recon` - the target reconciliation layer.
//!
//! Ties the matrix engine to the store client: an [`EditSession`] owns
//! one matrix, batches its modified cells into a single bulk upsert, and
//! applies the per-item results back to cell states. Each editing screen
//! (store KPIs, financial line items, channel and customer targets) is a
//! thin adapter over this one engine, supplying its own entity and
//! metric id space.

mod error;
mod session;
mod snapshot;

pub use error::SessionError;
pub use session::{CellRejection, EditSession, SaveOutcome};
