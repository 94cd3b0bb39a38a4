//! Per-block solve status.

use std::fmt;

/// Outcome of one block after a batched solve.
///
/// The integer codes are stable and returned as-is across the host call
/// boundary by [`newton_raphson`](crate::newton_raphson).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum BlockStatus {
    /// Newton step norm fell below tolerance
    Converged = 1,
    /// Iteration budget ran out before convergence
    #[default]
    IterationLimit = -1,
    /// Last update pushed an unknown below the lower bound
    BelowMin = -2,
    /// Last update pushed an unknown above the upper bound
    AboveMax = -3,
    /// Block Jacobian was singular or the step was not finite
    Degenerate = -4,
}

impl BlockStatus {
    /// Integer status code.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Parse an integer status code.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::Converged),
            -1 => Some(Self::IterationLimit),
            -2 => Some(Self::BelowMin),
            -3 => Some(Self::AboveMax),
            -4 => Some(Self::Degenerate),
            _ => None,
        }
    }

    /// Whether the block converged on its last update.
    pub fn is_converged(self) -> bool {
        self == Self::Converged
    }
}

impl fmt::Display for BlockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Converged => "converged",
            Self::IterationLimit => "iteration limit reached",
            Self::BelowMin => "clamped at lower bound",
            Self::AboveMax => "clamped at upper bound",
            Self::Degenerate => "degenerate block Jacobian",
        };
        write!(f, "{}", s)
    }
}
