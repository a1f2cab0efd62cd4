#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Cell text did not normalize to a number. Local and recoverable:
    /// the cell keeps its previous numeric state.
    InvalidNumericInput(String),
    /// The addressed `(entity, metric)` pair is not in the matrix.
    UnknownCell { entity_id: String, metric_id: String },
    /// A save batch is already outstanding.
    SaveInFlight,
    /// Outcome applied or save aborted with no outstanding batch.
    NoSaveInFlight,
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNumericInput(text) => {
                write!(f, "not a number: {text:?}")
            }
            Self::UnknownCell { entity_id, metric_id } => {
                write!(f, "unknown cell: entity '{entity_id}', metric '{metric_id}'")
            }
            Self::SaveInFlight => write!(f, "a save is already in flight"),
            Self::NoSaveInFlight => write!(f, "no save in flight"),
        }
    }
}

impl std::error::Error for EngineError {}
