//! Action protocol of the game.
//!
//! An action is a [`FunctionCall`]: a function identifier plus a list of
//! argument lists. The agent issues only two functions, a fallback without
//! spatial arguments and a function acting on a point of the screen.
use crate::error::SkirmishError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a game function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct FunctionId(pub u16);

impl FunctionId {
    /// Selects the whole army. Issued when the spatial function is unavailable.
    pub const SELECT_ARMY: FunctionId = FunctionId(7);

    /// Attacks a point on the screen.
    pub const ATTACK_SCREEN: FunctionId = FunctionId(12);
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An action sent to the game.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FunctionCall {
    /// Function to invoke.
    pub function: FunctionId,

    /// Argument lists of the function.
    pub arguments: Vec<Vec<i32>>,
}

impl FunctionCall {
    /// Constructs a function call.
    pub fn new(function: FunctionId, arguments: Vec<Vec<i32>>) -> Self {
        Self {
            function,
            arguments,
        }
    }

    /// A call whose only argument is the "queued" flag, set to not queued.
    pub fn no_arg_queued(function: FunctionId) -> Self {
        Self::new(function, vec![vec![0]])
    }

    /// A non-queued call on the screen point `(x, y)`.
    ///
    /// `x` is the column and `y` the row of the point.
    pub fn at_point(function: FunctionId, x: i32, y: i32) -> Self {
        Self::new(function, vec![vec![0], vec![x, y]])
    }

    /// The screen point of the call, if it has one.
    pub fn point(&self) -> Option<(i32, i32)> {
        match self.arguments.get(1).map(|a| a.as_slice()) {
            Some([x, y]) => Some((*x, *y)),
            _ => None,
        }
    }
}

/// Row-major coordinates in a spatial grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpatialCoords {
    /// Row, the `y` coordinate of the game.
    pub row: i64,

    /// Column, the `x` coordinate of the game.
    pub col: i64,
}

impl SpatialCoords {
    /// Coordinates as the `(x, y)` pair expected by the game.
    ///
    /// The game lists points column first.
    pub fn to_xy(self) -> (i32, i32) {
        (self.col as i32, self.row as i32)
    }
}

/// Converts a flat index into row-major coordinates of a `(rows, cols)` grid.
pub fn unravel_coords(index: i64, shape: (i64, i64)) -> Result<SpatialCoords, SkirmishError> {
    let (rows, cols) = shape;
    if index < 0 || index >= rows * cols {
        return Err(SkirmishError::CoordsOutOfRange { index, rows, cols });
    }
    Ok(SpatialCoords {
        row: index / cols,
        col: index % cols,
    })
}

/// Applies [`unravel_coords`] to a batch of flat indices.
pub fn unravel_batch(
    indices: &[i64],
    shape: (i64, i64),
) -> Result<Vec<SpatialCoords>, SkirmishError> {
    indices.iter().map(|&ix| unravel_coords(ix, shape)).collect()
}
