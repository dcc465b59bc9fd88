//! Error types for the table host.

use crate::session::TableId;
use mille_engine::errors::GameError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Table not found: {0}")]
    SessionNotFound(TableId),
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("Table storage poisoned")]
    StoragePoisoned,
    #[error("Unknown AI strategy: {0}")]
    UnknownStrategy(String),
}

impl TableError {
    /// Machine-readable code, stable across message wording changes.
    pub fn code(&self) -> &'static str {
        match self {
            TableError::SessionNotFound(_) => "table_not_found",
            TableError::Game(GameError::Illegal(_)) => "illegal_move",
            TableError::Game(_) => "protocol_violation",
            TableError::StoragePoisoned => "storage_poisoned",
            TableError::UnknownStrategy(_) => "unknown_strategy",
        }
    }

    /// Rejections a client can recover from by choosing a different action.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TableError::Game(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mille_engine::rules::IllegalMove;

    #[test]
    fn codes_separate_illegal_moves_from_protocol_violations() {
        let illegal = TableError::from(GameError::Illegal(IllegalMove::NotRolling));
        assert_eq!(illegal.code(), "illegal_move");
        assert_eq!(illegal.to_string(), "You must play a Roll card first");
        assert!(illegal.is_recoverable());

        let protocol = TableError::from(GameError::NoPendingInterrupt);
        assert_eq!(protocol.code(), "protocol_violation");

        let missing = TableError::SessionNotFound("abc".into());
        assert_eq!(missing.to_string(), "Table not found: abc");
        assert!(!missing.is_recoverable());
    }
}
