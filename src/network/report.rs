use crate::moc::{UnitError, UnitExit, UnitKind, UnitResult};
use crate::network::handle::UnitId;
use std::fmt;

/// Final word of a unit thread, sent once when it leaves its loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitReport {
    pub id: UnitId,
    pub name: String,
    pub kind: UnitKind,
    /// Completed firings.
    pub firings: u64,
    pub outcome: UnitResult<UnitExit>,
}

impl UnitReport {
    #[inline]
    pub fn is_failure(&self) -> bool {
        self.outcome.is_err()
    }

    pub fn failure(&self) -> Option<UnitFailure> {
        match &self.outcome {
            Ok(_) => None,
            Err(error) => Some(UnitFailure {
                id: self.id,
                name: self.name.clone(),
                kind: self.kind,
                firings: self.firings,
                error: error.clone(),
            }),
        }
    }
}

/// A unit that stopped on a fault, and which one it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitFailure {
    pub id: UnitId,
    pub name: String,
    pub kind: UnitKind,
    pub firings: u64,
    pub error: UnitError,
}

impl fmt::Display for UnitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}) failed after {} firings: {}",
            self.kind, self.name, self.id, self.firings, self.error
        )
    }
}

impl std::error::Error for UnitFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
