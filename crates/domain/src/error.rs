use crate::order::OrderStatus;

/// Shared error type used across all AstroDesk crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Missing or malformed caller input. Recoverable; no state change.
    #[error("validation: {0}")]
    Validation(String),

    /// An external capability (geocoding, chart engine, LLM, delivery)
    /// failed. Aborts the current pipeline run.
    #[error("{capability}: {message}")]
    Capability {
        capability: &'static str,
        message: String,
    },

    /// A `query` order has used all of its user-authored chat turns.
    #[error("chat quota exhausted")]
    QuotaExceeded,

    /// An illegal lifecycle operation. Leaves order state unchanged.
    #[error("cannot {op} an order in status {from}")]
    InvalidTransition {
        from: OrderStatus,
        op: &'static str,
    },

    /// A payment confirmation we have already processed.
    #[error("duplicate payment event")]
    DuplicateEvent,

    /// Chat was requested before the order's analysis completed.
    #[error("order is not ready for chat")]
    OrderNotReady,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
