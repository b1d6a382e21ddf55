//! Error types.
//!
//! Two families live here. [`MapError`] and [`NavError`] are structural:
//! bad input or a caller bug, returned as `Err` and never retried.
//! [`SearchFailure`] is an expected search outcome; it travels inside a
//! [`Route`](crate::Route) and its `Display` text is the route's status
//! message.

use thiserror::Error;

/// Malformed terrain source data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapError {
    #[error("map has no rows")]
    Empty,

    #[error("map row {row} contains no terrain digits")]
    EmptyRow { row: usize },

    #[error("map row {row} has {found} columns, expected {expected}")]
    InconsistentRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid terrain {ch:?} at row {row}, column {column}")]
    InvalidToken { row: usize, column: usize, ch: char },

    #[error("invalid world size {width}x{height}")]
    InvalidWorldSize { width: f32, height: f32 },
}

/// Structural navigation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NavError {
    #[error("position ({x}, {y}) is outside the grid")]
    OutOfBounds { x: f32, y: f32 },

    #[error("unknown terrain code {0}")]
    InvalidTerrain(u8),

    #[error("no end point specified")]
    NoDestination,

    #[error(transparent)]
    Map(#[from] MapError),
}

/// Which end of a requested route was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Endpoint {
    Start,
    Goal,
}

/// Why a search produced no waypoints.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchFailure {
    #[error("already at destination")]
    AlreadyAtDestination,

    #[error("invalid start point, please choose another")]
    InvalidStart,

    #[error("invalid end point, please choose another")]
    InvalidGoal,

    #[error("no path found")]
    NoPathFound,

    #[error("search abandoned after {0} expansions")]
    ExpansionLimit(usize),
}

impl SearchFailure {
    /// The rejected endpoint, for the two invalid-endpoint outcomes.
    pub fn endpoint(self) -> Option<Endpoint> {
        match self {
            Self::InvalidStart => Some(Endpoint::Start),
            Self::InvalidGoal => Some(Endpoint::Goal),
            _ => None,
        }
    }

    /// Whether waiting for the environment to change could make a retry
    /// succeed.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::NoPathFound | Self::ExpansionLimit(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_populated() {
        let all = [
            SearchFailure::AlreadyAtDestination,
            SearchFailure::InvalidStart,
            SearchFailure::InvalidGoal,
            SearchFailure::NoPathFound,
            SearchFailure::ExpansionLimit(10),
        ];
        for f in all {
            assert!(!f.to_string().is_empty());
        }
        assert_eq!(
            SearchFailure::AlreadyAtDestination.to_string(),
            "already at destination"
        );
    }

    #[test]
    fn endpoints() {
        assert_eq!(SearchFailure::InvalidStart.endpoint(), Some(Endpoint::Start));
        assert_eq!(SearchFailure::InvalidGoal.endpoint(), Some(Endpoint::Goal));
        assert_eq!(SearchFailure::NoPathFound.endpoint(), None);
        assert!(SearchFailure::NoPathFound.is_retryable());
        assert!(!SearchFailure::InvalidGoal.is_retryable());
    }

    #[test]
    fn map_error_converts() {
        let e: NavError = MapError::Empty.into();
        assert_eq!(e.to_string(), "map has no rows");
    }

    #[test]
    fn world_size_error_compares_by_value() {
        let bad = MapError::InvalidWorldSize {
            width: 0.0,
            height: 10.0,
        };
        assert_eq!(NavError::from(bad.clone()), NavError::Map(bad.clone()));
        assert_ne!(
            bad,
            MapError::InvalidWorldSize {
                width: 0.0,
                height: 20.0
            }
        );
        assert_eq!(bad.to_string(), "invalid world size 0x10");
    }
}
