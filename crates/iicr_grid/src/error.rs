use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    TooFewPoints(usize),              // grids need at least two points
    InvalidRange(f64, f64),           // (start, end)
    NotMonotonic(usize),              // first index where x[i] < x[i-1]
    Negative(usize),                  // negative or non-finite value at index
    WidthMismatch { found: usize, expected: usize },
    InvalidWidth(usize),              // negative or non-finite dx at index
    InvalidPattern(String),
    PatternOverflow { offset: usize, available: usize },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::TooFewPoints(n) => {
                write!(f, "A time grid needs at least 2 points (got {})", n)
            }
            GridError::InvalidRange(start, end) => {
                write!(f, "Invalid time range: start = {}, end = {}", start, end)
            }
            GridError::NotMonotonic(i) => {
                write!(f, "Time grid decreases at position {}", i)
            }
            GridError::Negative(i) => {
                write!(f, "Negative or non-finite time at position {}", i)
            }
            GridError::WidthMismatch { found, expected } => {
                write!(f, "Got {} interval widths for a grid of {} points", found, expected)
            }
            GridError::InvalidWidth(i) => {
                write!(f, "Negative or non-finite interval width at position {}", i)
            }
            GridError::InvalidPattern(s) => {
                write!(f, "Invalid grouping pattern: {}", s)
            }
            GridError::PatternOverflow { offset, available } => {
                write!(f, "Grouping pattern reaches grid offset {} but only {} points are available",
                    offset, available)
            }
        }
    }
}

impl std::error::Error for GridError {}
