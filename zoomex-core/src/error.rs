use thiserror::Error;

/// Failures of the pure geometry layer.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeometryError {
    /// A view with a non-positive width or height cannot be partitioned.
    /// Fatal to the current trial.
    #[error("view dimensions must be positive, got {w}x{h}")]
    InvalidGeometry { w: f64, h: f64 },

    /// The requested flat cell index lies outside `[0, cols * rows)`.
    /// Caller error; the move must be rejected without mutating state.
    #[error("cell index {index} out of range for a {cells}-cell grid")]
    InvalidCellIndex { index: usize, cells: usize },
}
