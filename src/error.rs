//! Error type for the drop cycle and its configuration

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DropError {
    /// Spawn requested with nothing left in the fruit queue.
    /// The queue is refilled on every release, so this points at a refill bug.
    #[error("Can't spawn next fruit because the fruit queue is empty")]
    EmptyQueue,

    #[error("A fruit is already held or falling")]
    PieceAlreadyActive,

    #[error("Invalid dropper config: {0}")]
    InvalidConfig(String),

    #[error("Failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    Json(#[from] serde_json::Error),
}
