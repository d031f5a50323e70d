//! Error types.
//!
//! Every fallible operation returns [`PlotResult`]. Variants are grouped by
//! [`ErrorKind`]: configuration mistakes surface at the call site, state
//! errors when an operation needs a surface it does not have, and domain
//! errors when no usable domain can be derived.

use crate::types::ComponentId;

/// Result alias used throughout the crate.
pub type PlotResult<T> = Result<T, PlotError>;

/// Broad classification of a [`PlotError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    State,
    Domain,
    Io,
}

/// Grid axis named in index errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Row,
    Column,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Row => f.write_str("row"),
            Axis::Column => f.write_str("column"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    /// A table cell already holds a component.
    #[error("cell ({row}, {col}) is already occupied")]
    CellOccupied { row: usize, col: usize },

    /// Row or column index past the end of the grid.
    #[error("{axis} index {index} out of range (len {len})")]
    IndexOutOfRange { axis: Axis, index: usize, len: usize },

    /// Weights must be finite and non-negative.
    #[error("invalid weight {0}")]
    InvalidWeight(f64),

    /// Paddings must be finite and non-negative.
    #[error("invalid padding {0}")]
    InvalidPadding(f64),

    /// A proportion outside its allowed interval.
    #[error("invalid {what} {value}")]
    InvalidProportion { what: &'static str, value: f64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Operation only valid on a root component.
    #[error("component {0} has a parent")]
    NotRoot(ComponentId),

    /// Adding the child would make a component its own ancestor.
    #[error("adding {child} under {parent} would create a cycle")]
    WouldCycle {
        parent: ComponentId,
        child: ComponentId,
    },

    #[error("component {0} is not a container")]
    NotAContainer(ComponentId),

    #[error("unknown component {0}")]
    UnknownComponent(ComponentId),

    /// The component is not bound to a surface.
    #[error("component {0} is not anchored")]
    Unanchored(ComponentId),

    /// The surface could not report a size for the root.
    #[error("surface of {0} has no measurable size")]
    Unmeasurable(ComponentId),

    /// Non-root layout needs an explicit origin and size.
    #[error("component {0} needs an explicit placement")]
    PlacementRequired(ComponentId),

    /// No valid extents and no default extent to fall back to.
    #[error("no valid extents to compute a domain from")]
    NoExtent,

    #[error("invalid domain: {0}")]
    InvalidDomain(String),

    /// An extent of the wrong shape for the scale (categories on a numeric scale).
    #[error("extent mismatch: {0}")]
    ExtentMismatch(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PlotError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlotError::CellOccupied { .. }
            | PlotError::IndexOutOfRange { .. }
            | PlotError::InvalidWeight(_)
            | PlotError::InvalidPadding(_)
            | PlotError::InvalidProportion { .. }
            | PlotError::InvalidConfig(_)
            | PlotError::NotRoot(_)
            | PlotError::WouldCycle { .. }
            | PlotError::NotAContainer(_)
            | PlotError::UnknownComponent(_) => ErrorKind::Configuration,
            PlotError::Unanchored(_)
            | PlotError::Unmeasurable(_)
            | PlotError::PlacementRequired(_) => ErrorKind::State,
            PlotError::NoExtent | PlotError::InvalidDomain(_) | PlotError::ExtentMismatch(_) => {
                ErrorKind::Domain
            }
            PlotError::Io(_) => ErrorKind::Io,
        }
    }
}

/// Reject NaN, infinities and negatives.
pub(crate) fn check_weight(weight: f64) -> PlotResult<f64> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(weight)
    } else {
        Err(PlotError::InvalidWeight(weight))
    }
}

pub(crate) fn check_padding(padding: f64) -> PlotResult<f64> {
    if padding.is_finite() && padding >= 0.0 {
        Ok(padding)
    } else {
        Err(PlotError::InvalidPadding(padding))
    }
}

/// Proportions live in [0, 1].
pub(crate) fn check_proportion(what: &'static str, value: f64) -> PlotResult<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(PlotError::InvalidProportion { what, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            PlotError::CellOccupied { row: 0, col: 1 }.kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            PlotError::Unanchored(ComponentId::new(0, 0)).kind(),
            ErrorKind::State
        );
        assert_eq!(PlotError::NoExtent.kind(), ErrorKind::Domain);
    }

    #[test]
    fn test_checks() {
        assert!(check_weight(2.0).is_ok());
        assert!(matches!(check_weight(-1.0), Err(PlotError::InvalidWeight(_))));
        assert!(matches!(check_weight(f64::NAN), Err(PlotError::InvalidWeight(_))));
        assert!(check_padding(0.0).is_ok());
        assert!(check_proportion("x alignment", 1.5).is_err());
    }

    #[test]
    fn test_messages() {
        let err = PlotError::IndexOutOfRange {
            axis: Axis::Row,
            index: 3,
            len: 2,
        };
        assert_eq!(err.to_string(), "row index 3 out of range (len 2)");
    }
}
