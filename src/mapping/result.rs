//! Per-row mapping outcome.

use crate::error::{CsvMappingError, ErrorReason};

/// Outcome of mapping one row: exactly one of a populated entity or a structured error.
#[derive(Debug, Clone)]
pub enum CsvMappingResult<E> {
    Success { row_index: usize, entity: E },
    Failure { row_index: usize, error: CsvMappingError },
}

impl<E> CsvMappingResult<E> {
    /// Index of the source row.
    pub fn row_index(&self) -> usize {
        match self {
            Self::Success { row_index, .. } | Self::Failure { row_index, .. } => *row_index,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn entity(&self) -> Option<&E> {
        match self {
            Self::Success { entity, .. } => Some(entity),
            Self::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&CsvMappingError> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error, .. } => Some(error),
        }
    }

    /// Failure reason, if this row failed.
    pub fn reason(&self) -> Option<ErrorReason> {
        self.error().map(|e| e.reason)
    }

    pub fn ok(self) -> Option<E> {
        match self {
            Self::Success { entity, .. } => Some(entity),
            Self::Failure { .. } => None,
        }
    }

    pub fn err(self) -> Option<CsvMappingError> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error, .. } => Some(error),
        }
    }

    pub fn into_result(self) -> Result<E, CsvMappingError> {
        match self {
            Self::Success { entity, .. } => Ok(entity),
            Self::Failure { error, .. } => Err(error),
        }
    }
}

/// Split a result stream into `(row_index, entity)` successes and `(row_index, error)` failures,
/// each in arrival order.
pub fn partition_results<E, I>(results: I) -> (Vec<(usize, E)>, Vec<(usize, CsvMappingError)>)
where
    I: IntoIterator<Item = CsvMappingResult<E>>,
{
    let mut ok = Vec::new();
    let mut failed = Vec::new();
    for r in results {
        match r {
            CsvMappingResult::Success { row_index, entity } => ok.push((row_index, entity)),
            CsvMappingResult::Failure { row_index, error } => failed.push((row_index, error)),
        }
    }
    (ok, failed)
}
