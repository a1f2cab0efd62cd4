use targetgrid_engine::EngineError;
use targetgrid_store_client::StoreError;

#[derive(Debug)]
pub enum SessionError {
    /// A save batch is outstanding; the requested operation would race it.
    SaveInFlight,
    /// Transport-level failure. No cell state changed; the whole change
    /// set remains eligible for wholesale retry.
    Network(String),
    /// The store rejected the token, or no credentials exist. Fatal to
    /// the current operation; recovery is an external concern.
    AuthRequired,
    /// The store refused the request wholesale (bad period, bad shape).
    Rejected(String),
    /// Unexpected status or unparseable response body.
    Protocol(String),
    /// Engine-level input or misuse error.
    Engine(EngineError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SaveInFlight => write!(f, "a save is already in flight"),
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::AuthRequired => write!(f, "authentication required"),
            Self::Rejected(msg) => write!(f, "request rejected: {msg}"),
            Self::Protocol(msg) => write!(f, "protocol error: {msg}"),
            Self::Engine(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<EngineError> for SessionError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::SaveInFlight => Self::SaveInFlight,
            other => Self::Engine(other),
        }
    }
}

impl From<StoreError> for SessionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Network(msg) => Self::Network(msg),
            StoreError::AuthRequired(_) | StoreError::NotAuthenticated => Self::AuthRequired,
            StoreError::Validation(msg) => Self::Rejected(msg),
            StoreError::Http(code, msg) => Self::Protocol(format!("HTTP {code}: {msg}")),
            StoreError::Parse(msg) | StoreError::Io(msg) => Self::Protocol(msg),
        }
    }
}
