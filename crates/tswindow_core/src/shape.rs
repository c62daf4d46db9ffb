//! Shape metadata for windowed batches.

use serde::{Deserialize, Serialize};

/// Shape of a batch of windows, `(B, S, D)`:
/// - `B`: Number of windows in the batch
/// - `S`: Steps kept per window
/// - `D`: Dimensions per step
///
/// # Example
///
/// ```rust
/// use tswindow_core::BatchShape;
///
/// let shape = BatchShape::from((4, 5, 2));
/// assert_eq!(shape.steps(), 5);
/// assert_eq!(shape.to_string(), "[4, 5, 2]");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchShape {
    batch: usize,
    steps: usize,
    dims: usize,
}

impl BatchShape {
    /// Create a shape.
    #[must_use]
    pub const fn new(batch: usize, steps: usize, dims: usize) -> Self {
        Self { batch, steps, dims }
    }

    /// Number of windows.
    #[must_use]
    pub const fn batch(&self) -> usize {
        self.batch
    }

    /// Steps per window.
    #[must_use]
    pub const fn steps(&self) -> usize {
        self.steps
    }

    /// Dimensions per step.
    #[must_use]
    pub const fn dims(&self) -> usize {
        self.dims
    }
}

impl std::fmt::Display for BatchShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}, {}]", self.batch, self.steps, self.dims)
    }
}

impl From<(usize, usize, usize)> for BatchShape {
    fn from((batch, steps, dims): (usize, usize, usize)) -> Self {
        Self::new(batch, steps, dims)
    }
}
